//! Object identifiers and the generators that mint them.
//!
//! DESIGN
//! ======
//! An [`Id`] is a 32-bit integer with a fixed 4-byte big-endian wire form.
//! Ids come from an explicit [`IdSource`] handed to whoever needs them, never
//! from a process-wide counter, so tests can seed or reset generation:
//!
//! - [`CounterIds`]: plain incrementing counter for transient per-session ids.
//! - [`TimeIds`]: packs milliseconds-within-the-current-hour (22 bits) with a
//!   10-bit random salt, checks the candidate against the set of live ids and
//!   keeps ids strictly increasing within one clock hour.

#[cfg(test)]
#[path = "id_test.rs"]
mod id_test;

use std::collections::HashSet;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

const MS_PER_HOUR: u64 = 3_600_000;
const SALT_BITS: u32 = 10;
const SALT_SPAN: u32 = 1 << SALT_BITS;

/// Error decoding an [`Id`] from bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("id must be exactly 4 bytes, got {0}")]
    Length(usize),
}

/// Process-unique object identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id(u32);

impl Id {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Fixed-width big-endian encoding.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// Decode from a byte slice that must hold exactly four bytes.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Length`] for any other slice length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdError> {
        let arr: [u8; 4] = bytes.try_into().map_err(|_| IdError::Length(bytes.len()))?;
        Ok(Self::from_bytes(arr))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that hands out fresh ids.
pub trait IdSource {
    fn next_id(&mut self) -> Id;

    /// Return `id` to the pool. Returns `false` if it was not live or the
    /// source does not track issued ids.
    fn release(&mut self, _id: Id) -> bool {
        false
    }
}

// =============================================================
// Counter
// =============================================================

/// Incrementing counter. Zero is never issued.
#[derive(Debug, Clone)]
pub struct CounterIds {
    next: u32,
}

impl CounterIds {
    #[must_use]
    pub fn starting_at(seed: u32) -> Self {
        Self { next: seed.max(1) }
    }

    /// Restart the sequence at `seed`.
    pub fn reset(&mut self, seed: u32) {
        self.next = seed.max(1);
    }
}

impl Default for CounterIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSource for CounterIds {
    fn next_id(&mut self) -> Id {
        let id = Id(self.next);
        self.next = self.next.checked_add(1).unwrap_or(1);
        id
    }
}

// =============================================================
// Time-based
// =============================================================

/// Time-derived ids, collision-checked against the live set.
pub struct TimeIds<C: Clock> {
    clock: C,
    rng: StdRng,
    live: HashSet<Id>,
    /// `(hour, raw)` of the last id issued.
    last: Option<(u64, u32)>,
}

impl<C: Clock> TimeIds<C> {
    /// Generator salted from the thread RNG.
    pub fn new(clock: C) -> Self {
        Self::from_rng(clock, StdRng::from_rng(&mut rand::rng()))
    }

    /// Deterministic generator for tests.
    pub fn with_seed(clock: C, seed: u64) -> Self {
        Self::from_rng(clock, StdRng::seed_from_u64(seed))
    }

    fn from_rng(clock: C, rng: StdRng) -> Self {
        Self { clock, rng, live: HashSet::new(), last: None }
    }

    /// Mark an externally minted id as taken so it is never reissued.
    pub fn reserve(&mut self, id: Id) -> bool {
        self.live.insert(id)
    }

    #[must_use]
    pub fn is_live(&self, id: Id) -> bool {
        self.live.contains(&id)
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn candidate(&mut self) -> (u64, u32) {
        let now = self.clock.now_ms().max(0.0) as u64;
        let hour = now / MS_PER_HOUR;
        // < 2^22, so the shifted value fits in 32 bits.
        let in_hour = (now % MS_PER_HOUR) as u32;
        let salt = self.rng.random_range(0..SALT_SPAN);
        (hour, (in_hour << SALT_BITS) | salt)
    }
}

impl<C: Clock> IdSource for TimeIds<C> {
    fn next_id(&mut self) -> Id {
        let (hour, mut raw) = self.candidate();
        if let Some((last_hour, last_raw)) = self.last
            && last_hour == hour
            && raw <= last_raw
        {
            raw = last_raw.wrapping_add(1);
        }
        while raw == 0 || self.live.contains(&Id(raw)) {
            raw = raw.wrapping_add(1);
        }
        self.last = Some((hour, raw));
        self.live.insert(Id(raw));
        Id(raw)
    }

    fn release(&mut self, id: Id) -> bool {
        self.live.remove(&id)
    }
}

impl<C: Clock> fmt::Debug for TimeIds<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeIds")
            .field("live", &self.live.len())
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}
