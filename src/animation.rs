//! Frame-driven tweens and countdown timers.
//!
//! One driver calls [`Scheduler::advance`] per animation frame with the
//! current time; nothing schedules its own next tick. Tweens report eased
//! progress to `on_step` and fire `on_end` once they reach 1.0. Timers are
//! keyed so a debounce can be pushed back with [`Scheduler::restart_timer`];
//! `advance` hands expired keys back to the caller instead of invoking
//! callbacks, which keeps timer handling inside the owner's `&mut self`.

#[cfg(test)]
#[path = "animation_test.rs"]
mod animation_test;

use std::fmt;

use tracing::trace;

/// Maps linear progress in `[0, 1]` to eased progress.
pub type Easing = fn(f64) -> f64;

#[must_use]
pub fn linear(t: f64) -> f64 {
    t
}

#[must_use]
pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

struct Tween {
    id: TweenId,
    start: f64,
    duration: f64,
    easing: Easing,
    on_step: Box<dyn FnMut(f64)>,
    on_end: Option<Box<dyn FnOnce()>>,
}

impl Tween {
    fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0)
    }

    fn finish(mut self) {
        (self.on_step)((self.easing)(1.0));
        if let Some(end) = self.on_end.take() {
            end();
        }
    }
}

#[derive(Debug, Clone)]
struct Timer<K> {
    key: K,
    due: f64,
}

pub struct Scheduler<K> {
    tweens: Vec<Tween>,
    timers: Vec<Timer<K>>,
    next_id: u64,
    now: f64,
}

impl<K: fmt::Debug> fmt::Debug for Scheduler<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("tweens", &self.tweens.iter().map(|t| t.id).collect::<Vec<_>>())
            .field("timers", &self.timers)
            .field("now", &self.now)
            .finish()
    }
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self { tweens: Vec::new(), timers: Vec::new(), next_id: 1, now: 0.0 }
    }
}

impl<K: PartialEq> Scheduler<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Time of the most recent [`Scheduler::advance`].
    #[must_use]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Move the scheduler time forward without stepping anything, so tweens
    /// and timers armed between frames start from the real time.
    pub fn sync_to(&mut self, now: f64) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Start a tween at the current scheduler time.
    pub fn animate(
        &mut self,
        duration_ms: f64,
        easing: Easing,
        on_step: impl FnMut(f64) + 'static,
        on_end: Option<Box<dyn FnOnce()>>,
    ) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.tweens.push(Tween {
            id,
            start: self.now,
            duration: duration_ms,
            easing,
            on_step: Box::new(on_step),
            on_end,
        });
        trace!(id = id.0, duration_ms, "animation: tween started");
        id
    }

    /// Stop a tween. `on_end` only runs when `finish` is set, after a final
    /// step at full progress.
    pub fn cancel(&mut self, id: TweenId, finish: bool) -> bool {
        let Some(pos) = self.tweens.iter().position(|t| t.id == id) else {
            return false;
        };
        let tween = self.tweens.remove(pos);
        if finish {
            tween.finish();
        }
        true
    }

    #[must_use]
    pub fn is_running(&self, id: TweenId) -> bool {
        self.tweens.iter().any(|t| t.id == id)
    }

    /// Arm a timer for `key`, `delay_ms` from the current scheduler time.
    pub fn after(&mut self, delay_ms: f64, key: K) {
        self.timers.push(Timer { key, due: self.now + delay_ms });
    }

    /// Replace any pending timer for `key` with a new one.
    pub fn restart_timer(&mut self, delay_ms: f64, key: K) {
        self.timers.retain(|t| t.key != key);
        self.after(delay_ms, key);
    }

    pub fn cancel_timer(&mut self, key: &K) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.key != *key);
        before != self.timers.len()
    }

    #[must_use]
    pub fn has_timer(&self, key: &K) -> bool {
        self.timers.iter().any(|t| t.key == *key)
    }

    /// Step every tween to `now` and return the keys of expired timers, in due order.
    pub fn advance(&mut self, now: f64) -> Vec<K> {
        self.now = now;

        let mut finished = Vec::new();
        for (idx, tween) in self.tweens.iter_mut().enumerate() {
            let t = tween.progress(now);
            if t >= 1.0 {
                finished.push(idx);
            } else {
                (tween.on_step)((tween.easing)(t));
            }
        }
        let mut done: Vec<Tween> = finished.into_iter().rev().map(|idx| self.tweens.remove(idx)).collect();
        done.reverse();
        for tween in done {
            tween.finish();
        }

        let (mut due, pending): (Vec<_>, Vec<_>) = self.timers.drain(..).partition(|t| t.due <= now);
        self.timers = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due));
        due.into_iter().map(|t| t.key).collect()
    }

    /// No tween running and no timer pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.tweens.is_empty() && self.timers.is_empty()
    }
}
