use ferrous_support::Latch;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

const SETTLE: Duration = Duration::from_millis(25);

#[test]
fn zero_count_latch_starts_open() {
    let latch = Latch::new(0);
    latch.wait();
    assert!(latch.wait_for(Duration::from_millis(1)));
}

#[test]
fn closed_latch_times_out() {
    let latch = Latch::new(1);
    let start = Instant::now();
    assert!(!latch.wait_for(Duration::from_millis(50)));
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[test]
fn counting_down_to_zero_opens_the_latch() {
    let latch = Latch::new(3);
    latch.count_down(1);
    latch.count_down(2);
    latch.wait();
}

// Two waiters stay blocked through the first two countdowns and both pass
// on the third.
#[test]
fn waiters_pass_only_when_counter_reaches_zero() {
    let latch = Latch::new(3);
    let released = AtomicUsize::new(0);

    crossbeam_utils::thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(|_| {
                    latch.wait();
                    released.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        latch.count_down(1);
        latch.count_down(1);
        std::thread::sleep(SETTLE);
        assert_eq!(released.load(Ordering::SeqCst), 0, "latch opened early");

        latch.count_down(1);
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(released.load(Ordering::SeqCst), 2);
    })
    .unwrap();
}

// post() re-closes the latch exactly when it moves the counter off zero.
#[test]
fn post_reopens_the_countdown() {
    let latch = Latch::new(1);

    latch.count_down(1);
    assert!(latch.wait_for(Duration::from_millis(1))); // open

    latch.post(1);
    assert!(!latch.wait_for(Duration::from_millis(10))); // closed again

    latch.count_down(1);
    assert!(latch.wait_for(Duration::from_millis(1)));
}

#[test]
fn post_on_a_closed_latch_raises_the_bar() {
    let latch = Latch::new(1);
    latch.post(1); // counter now 2, still closed

    latch.count_down(1);
    assert!(!latch.wait_for(Duration::from_millis(10)));

    latch.count_down(1);
    assert!(latch.wait_for(Duration::from_millis(1)));
}

#[test]
fn late_waiters_pass_an_open_latch() {
    let latch = Latch::new(2);
    latch.count_down(2);

    crossbeam_utils::thread::scope(|scope| {
        for _ in 0..3 {
            scope.spawn(|_| latch.wait());
        }
    })
    .unwrap();
}

#[test]
fn timed_wait_observes_a_late_open() {
    let latch = Latch::new(1);

    crossbeam_utils::thread::scope(|scope| {
        scope.spawn(|_| {
            std::thread::sleep(SETTLE);
            latch.count_down(1);
        });

        let start = Instant::now();
        assert!(latch.wait_for(Duration::from_secs(5)));
        assert!(start.elapsed() >= SETTLE);
    })
    .unwrap();
}

#[test]
fn reuse_across_cycles() {
    let latch = Latch::new(1);

    for _ in 0..3 {
        assert!(!latch.wait_for(Duration::from_millis(5)));
        latch.count_down(1);
        latch.wait();
        latch.post(1); // arm the next cycle
    }
}
