use chrono::Duration;
use reltime::RelativeTime;
use std::collections::HashSet;
use std::thread;

#[test]
fn test_now_is_non_decreasing_serial() {
    // Equal consecutive readings are fine; the timer may be coarser than 1ns.
    let mut prev = reltime::now();
    for i in 0..10_000 {
        let current = reltime::now();
        assert!(
            current >= prev,
            "Time {} ({}) should not be less than time {} ({})",
            i,
            current,
            i as i64 - 1,
            prev
        );
        prev = current;
    }
}

#[test]
fn test_sub_after_one_millisecond() {
    let t0 = reltime::now();
    thread::sleep(std::time::Duration::from_millis(1));
    let t1 = reltime::now();

    let elapsed = t1.sub(t0);

    assert!(elapsed > Duration::zero(), "duration should be positive, got {}", elapsed);
    assert!(elapsed >= Duration::microseconds(1), "duration too small: {}", elapsed);
    assert!(elapsed <= Duration::seconds(1), "duration too large: {}", elapsed);
}

#[test]
fn test_after_and_before_across_sleep() {
    let now = reltime::now();
    thread::sleep(std::time::Duration::from_millis(1));
    let later = reltime::now();

    assert!(later.is_after(now));
    assert!(!now.is_after(later));
    assert!(now.is_before(later));
    assert!(!later.is_before(now));
}

#[test]
fn test_deadline_one_second_out() {
    let start = std::time::Instant::now();
    let deadline = reltime::now().add(Duration::seconds(1));
    let now = reltime::now();
    let window = Duration::from_std(start.elapsed()).expect("elapsed fits");

    let remaining = deadline - now;

    assert!(remaining <= Duration::seconds(1));
    assert!(remaining >= Duration::seconds(1) - window);
}

#[test]
fn test_epoch_is_captured_once() {
    assert_eq!(reltime::epoch(), reltime::epoch());
    assert_eq!(reltime::try_epoch(), Ok(reltime::epoch()));
}

#[test]
fn test_concurrent_first_access_sees_one_epoch() {
    let handles: Vec<_> = (0..8).map(|_| thread::spawn(reltime::epoch)).collect();

    let epochs: HashSet<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();

    assert_eq!(epochs.len(), 1);
    assert!(epochs.contains(&reltime::epoch()));
}

#[test]
fn test_elapsed_and_wall_clock_round_trip() {
    let t = reltime::now();
    thread::sleep(std::time::Duration::from_millis(2));

    assert!(t.elapsed() >= Duration::milliseconds(2));

    let epoch = reltime::epoch();
    assert_eq!(RelativeTime::ZERO.to_wall_clock(epoch), epoch);
    assert!(t.to_wall_clock(epoch) >= epoch);
}
