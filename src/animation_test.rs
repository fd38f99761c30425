#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;

type Log = Rc<RefCell<Vec<String>>>;

fn logged_tween(sched: &mut Scheduler<&'static str>, log: &Log, duration: f64) -> TweenId {
    let steps = Rc::clone(log);
    let end = Rc::clone(log);
    sched.animate(
        duration,
        linear,
        move |t| steps.borrow_mut().push(format!("{t:.2}")),
        Some(Box::new(move || end.borrow_mut().push("end".into()))),
    )
}

// =============================================================
// Easing
// =============================================================

#[test]
fn easings_hit_endpoints() {
    assert_eq!(linear(0.25), 0.25);
    assert_eq!(ease_out_cubic(0.0), 0.0);
    assert_eq!(ease_out_cubic(1.0), 1.0);
    assert!(ease_out_cubic(0.5) > 0.5);
}

// =============================================================
// Tweens
// =============================================================

#[test]
fn tween_steps_then_ends_once() {
    let log = Log::default();
    let mut sched = Scheduler::new();
    let id = logged_tween(&mut sched, &log, 100.0);
    sched.advance(50.0);
    assert!(sched.is_running(id));
    sched.advance(100.0);
    sched.advance(150.0);
    assert!(!sched.is_running(id));
    assert_eq!(*log.borrow(), vec!["0.50", "1.00", "end"]);
    assert!(sched.is_idle());
}

#[test]
fn tween_starts_at_last_advance_time() {
    let log = Log::default();
    let mut sched = Scheduler::new();
    sched.advance(1000.0);
    logged_tween(&mut sched, &log, 100.0);
    sched.advance(1025.0);
    assert_eq!(*log.borrow(), vec!["0.25"]);
}

#[test]
fn cancel_skips_on_end() {
    let log = Log::default();
    let mut sched = Scheduler::new();
    let id = logged_tween(&mut sched, &log, 100.0);
    sched.advance(10.0);
    assert!(sched.cancel(id, false));
    sched.advance(200.0);
    assert_eq!(*log.borrow(), vec!["0.10"]);
    assert!(!sched.cancel(id, false));
}

#[test]
fn cancel_with_finish_completes_immediately() {
    let log = Log::default();
    let mut sched = Scheduler::new();
    let id = logged_tween(&mut sched, &log, 100.0);
    assert!(sched.cancel(id, true));
    assert_eq!(*log.borrow(), vec!["1.00", "end"]);
}

#[test]
fn zero_duration_finishes_on_first_advance() {
    let log = Log::default();
    let mut sched = Scheduler::new();
    logged_tween(&mut sched, &log, 0.0);
    sched.advance(0.0);
    assert_eq!(*log.borrow(), vec!["1.00", "end"]);
}

#[test]
fn simultaneous_tweens_end_in_start_order() {
    let log = Log::default();
    let mut sched: Scheduler<&'static str> = Scheduler::new();
    for name in ["a", "b"] {
        let end = Rc::clone(&log);
        sched.animate(10.0, linear, |_| {}, Some(Box::new(move || end.borrow_mut().push(name.into()))));
    }
    sched.advance(10.0);
    assert_eq!(*log.borrow(), vec!["a", "b"]);
}

// =============================================================
// Timers
// =============================================================

#[test]
fn timers_expire_in_due_order() {
    let mut sched = Scheduler::new();
    sched.after(30.0, "late");
    sched.after(10.0, "early");
    assert!(sched.advance(5.0).is_empty());
    assert_eq!(sched.advance(40.0), vec!["early", "late"]);
    assert!(sched.is_idle());
}

#[test]
fn restart_pushes_debounce_back() {
    let mut sched = Scheduler::new();
    sched.after(250.0, "zoom");
    sched.advance(200.0);
    sched.restart_timer(250.0, "zoom");
    assert!(sched.advance(300.0).is_empty());
    assert!(sched.has_timer(&"zoom"));
    assert_eq!(sched.advance(450.0), vec!["zoom"]);
}

#[test]
fn cancel_timer_reports_removal() {
    let mut sched = Scheduler::new();
    sched.after(10.0, "x");
    assert!(sched.cancel_timer(&"x"));
    assert!(!sched.cancel_timer(&"x"));
    assert!(sched.advance(100.0).is_empty());
}

#[test]
fn sync_to_moves_time_forward_only() {
    let mut sched = Scheduler::new();
    sched.sync_to(500.0);
    sched.after(100.0, "t");
    sched.sync_to(100.0);
    assert_eq!(sched.now(), 500.0);
    assert!(sched.advance(550.0).is_empty());
    assert_eq!(sched.advance(600.0), vec!["t"]);
}
