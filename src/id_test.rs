use super::*;
use crate::clock::ManualClock;

// =============================================================
// Id encoding
// =============================================================

#[test]
fn bytes_are_big_endian() {
    let id = Id::new(0x0102_0304);
    assert_eq!(id.to_bytes(), [1, 2, 3, 4]);
    assert_eq!(Id::from_bytes([1, 2, 3, 4]), id);
}

#[test]
fn from_slice_rejects_wrong_length() {
    assert_eq!(Id::from_slice(&[0, 0, 0, 7]), Ok(Id::new(7)));
    assert_eq!(Id::from_slice(&[1, 2, 3]), Err(IdError::Length(3)));
    assert_eq!(Id::from_slice(&[1, 2, 3, 4, 5]), Err(IdError::Length(5)));
}

#[test]
fn display_is_raw_number() {
    assert_eq!(Id::new(42).to_string(), "42");
}

// =============================================================
// CounterIds
// =============================================================

#[test]
fn counter_starts_at_seed_and_increments() {
    let mut ids = CounterIds::starting_at(10);
    assert_eq!(ids.next_id(), Id::new(10));
    assert_eq!(ids.next_id(), Id::new(11));
    ids.reset(3);
    assert_eq!(ids.next_id(), Id::new(3));
}

#[test]
fn counter_never_issues_zero() {
    let mut ids = CounterIds::starting_at(0);
    assert_eq!(ids.next_id(), Id::new(1));
    let mut wrap = CounterIds::starting_at(u32::MAX);
    assert_eq!(wrap.next_id(), Id::new(u32::MAX));
    assert_eq!(wrap.next_id(), Id::new(1));
}

// =============================================================
// TimeIds
// =============================================================

#[test]
fn time_ids_strictly_increase_within_one_millisecond() {
    let clock = ManualClock::new(1_000_000.0);
    let mut ids = TimeIds::with_seed(clock, 7);
    let mut prev = ids.next_id();
    for _ in 0..50 {
        let next = ids.next_id();
        assert!(next > prev, "{next} should follow {prev}");
        prev = next;
    }
    assert_eq!(ids.live_count(), 51);
}

#[test]
fn time_ids_encode_ms_within_hour() {
    let clock = ManualClock::new(3_600_000.0 * 5.0 + 1234.0);
    let mut ids = TimeIds::with_seed(clock, 1);
    let id = ids.next_id();
    assert_eq!(id.raw() >> 10, 1234);
}

#[test]
fn time_ids_skip_reserved_ids() {
    let clock = ManualClock::new(0.0);
    let mut probe = TimeIds::with_seed(clock.clone(), 99);
    let first = probe.next_id();

    let mut ids = TimeIds::with_seed(clock, 99);
    assert!(ids.reserve(first));
    let issued = ids.next_id();
    assert_ne!(issued, first);
    assert!(ids.is_live(issued));
}

#[test]
fn time_ids_release_frees_slot() {
    let clock = ManualClock::new(500.0);
    let mut ids = TimeIds::with_seed(clock, 3);
    let id = ids.next_id();
    assert!(ids.release(id));
    assert!(!ids.release(id));
    assert!(!ids.is_live(id));
}

#[test]
fn time_ids_restart_ordering_each_hour() {
    let clock = ManualClock::new(3_600_000.0 - 1.0);
    let mut ids = TimeIds::with_seed(clock.clone(), 5);
    let late = ids.next_id();
    clock.advance(2.0);
    let early_next_hour = ids.next_id();
    assert!(early_next_hour < late);
}

#[test]
fn counter_ids_do_not_track_releases() {
    let mut ids = CounterIds::default();
    let id = ids.next_id();
    assert!(!ids.release(id));
}
