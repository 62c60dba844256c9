//! Integration tests for the fixed-window pacer.
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use paloma::pacer::FixedWindowPacer;

#[test]
fn full_budget_then_denial_until_window_elapses() {
    let pacer = FixedWindowPacer::new(4, Duration::from_millis(300));

    for _ in 0..4 {
        assert!(pacer.try_acquire());
    }
    assert!(!pacer.try_acquire());
    assert!(pacer.time_until_next_allowed() > Duration::ZERO);

    thread::sleep(Duration::from_millis(350));

    assert_eq!(pacer.time_until_next_allowed(), Duration::ZERO);
    assert!(pacer.try_acquire());
}

#[test]
fn concurrent_callers_never_overdraw_the_budget() {
    let pacer = Arc::new(FixedWindowPacer::new(10, Duration::from_secs(60)));

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let pacer = pacer.clone();
            thread::spawn(move || pacer.try_acquire())
        })
        .collect();

    let granted = handles
        .into_iter()
        .map(|handle| handle.join())
        .filter(|result| matches!(result, Ok(true)))
        .count();

    assert_eq!(granted, 10);
    assert_eq!(pacer.remaining(), 0);
}

#[test]
fn refill_is_all_or_nothing() {
    let pacer = FixedWindowPacer::new(3, Duration::from_millis(200));
    for _ in 0..3 {
        assert!(pacer.try_acquire());
    }

    // Partway through the window nothing comes back.
    thread::sleep(Duration::from_millis(80));
    assert_eq!(pacer.remaining(), 0);

    // After the window the whole budget is back at once.
    thread::sleep(Duration::from_millis(150));
    assert_eq!(pacer.remaining(), 3);
}

#[test]
fn window_boundary_permits_a_short_burst() {
    // Spending the tail of one window and the head of the next is allowed:
    // that is what fixed-window pacing trades away for simplicity.
    let pacer = FixedWindowPacer::new(2, Duration::from_millis(200));
    assert!(pacer.try_acquire());
    assert!(pacer.try_acquire());

    thread::sleep(Duration::from_millis(220));

    assert!(pacer.try_acquire());
    assert!(pacer.try_acquire());
    assert!(!pacer.try_acquire());
}

#[test]
fn reset_opens_a_fresh_window() {
    let pacer = FixedWindowPacer::new(1, Duration::from_secs(60));
    assert!(pacer.try_acquire());
    assert!(!pacer.try_acquire());

    pacer.reset();

    assert_eq!(pacer.time_until_next_allowed(), Duration::ZERO);
    assert!(pacer.try_acquire());
}
