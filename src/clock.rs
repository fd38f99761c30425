//! Time sources.
//!
//! Everything time-dependent in the engine (identifier minting, tween progress,
//! debounce timers) reads time through [`Clock`] so tests can drive a
//! [`ManualClock`] instead of the wall clock.

use std::cell::Cell;
use std::rc::Rc;

/// A millisecond time source.
pub trait Clock {
    /// Milliseconds since the Unix epoch (or since an arbitrary origin for virtual clocks).
    fn now_ms(&self) -> f64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(not(feature = "web"))]
    fn now_ms(&self) -> f64 {
        let Ok(dur) = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) else {
            return 0.0;
        };
        dur.as_secs_f64() * 1000.0
    }

    #[cfg(feature = "web")]
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// Virtual clock advanced by hand. Clones share the same time cell.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start_ms: f64) -> Self {
        Self { now: Rc::new(Cell::new(start_ms)) }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}
