use ferrous_support::Semaphore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

const SETTLE: Duration = Duration::from_millis(25);
const GENEROUS: Duration = Duration::from_secs(5);

#[test]
fn initial_count_admits_without_blocking() {
    let semaphore = Semaphore::new(2);
    semaphore.wait_then_decrement();
    semaphore.wait_then_decrement();
    // Both admits consumed; the next one must time out
    assert!(!semaphore.wait_for_then_decrement(Duration::from_millis(10)));
}

#[test]
fn post_before_wait_is_not_lost() {
    let semaphore = Semaphore::new(0);
    semaphore.post(1);
    semaphore.wait_then_decrement();
    assert!(!semaphore.wait_for_then_decrement(Duration::from_millis(10)));
}

#[test]
fn timed_out_wait_does_not_consume_an_admit() {
    let semaphore = Semaphore::new(0);

    let start = Instant::now();
    assert!(!semaphore.wait_for_then_decrement(Duration::from_millis(50)));
    assert!(start.elapsed() >= Duration::from_millis(50));

    // The failed wait gave its optimistic decrement back: a single post
    // still admits exactly one thread.
    semaphore.post(1);
    assert!(semaphore.wait_for_then_decrement(GENEROUS));
    assert!(!semaphore.wait_for_then_decrement(Duration::from_millis(10)));
}

#[test]
fn timed_wait_succeeds_when_posted_in_time() {
    let semaphore = Semaphore::new(0);

    crossbeam_utils::thread::scope(|scope| {
        scope.spawn(|_| {
            std::thread::sleep(SETTLE);
            semaphore.post(1);
        });

        assert!(semaphore.wait_for_then_decrement(GENEROUS));
    })
    .unwrap();
}

// Three waiters, two admits: exactly two pass, the third stays parked until
// one more admit arrives.
#[test]
fn post_admits_no_more_threads_than_posted() {
    let semaphore = Semaphore::new(0);
    let admitted = AtomicUsize::new(0);

    crossbeam_utils::thread::scope(|scope| {
        let handles: Vec<_> = (0..3)
            .map(|_| {
                scope.spawn(|_| {
                    semaphore.wait_then_decrement();
                    admitted.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        std::thread::sleep(SETTLE);
        assert_eq!(admitted.load(Ordering::SeqCst), 0);

        semaphore.post(2);
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(admitted.load(Ordering::SeqCst), 2);

        semaphore.post(1);
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(admitted.load(Ordering::SeqCst), 3);
    })
    .unwrap();
}

// Conservation: across any interleaving, admits posted = admits consumed +
// admits left over.
#[test]
fn admits_are_conserved_under_contention() {
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 4;
    const PER_PRODUCER: usize = 50;
    const PER_CONSUMER: usize = 50;

    let semaphore = Semaphore::new(0);

    crossbeam_utils::thread::scope(|scope| {
        for _ in 0..PRODUCERS {
            scope.spawn(|_| {
                for _ in 0..PER_PRODUCER {
                    semaphore.post(1);
                }
            });
        }
        let consumers: Vec<_> = (0..CONSUMERS)
            .map(|_| {
                scope.spawn(|_| {
                    for _ in 0..PER_CONSUMER {
                        semaphore.wait_then_decrement();
                    }
                })
            })
            .collect();
        for consumer in consumers {
            consumer.join().unwrap();
        }
    })
    .unwrap();

    // PRODUCERS * PER_PRODUCER posts, CONSUMERS * PER_CONSUMER consumed;
    // with equal totals the count must be back at zero.
    assert!(!semaphore.wait_for_then_decrement(Duration::from_millis(10)));
}

#[test]
fn batched_post_admits_a_batch_of_waiters() {
    let semaphore = Semaphore::new(0);

    crossbeam_utils::thread::scope(|scope| {
        let handles: Vec<_> = (0..5)
            .map(|_| scope.spawn(|_| semaphore.wait_then_decrement()))
            .collect();

        std::thread::sleep(SETTLE);
        semaphore.post(5);
        for handle in handles {
            handle.join().unwrap();
        }
    })
    .unwrap();
}

#[test]
fn timed_and_untimed_waiters_mix() {
    let semaphore = Semaphore::new(0);
    let timed_out = AtomicUsize::new(0);

    crossbeam_utils::thread::scope(|scope| {
        // One waiter that will give up quickly
        let quitter = scope.spawn(|_| {
            if !semaphore.wait_for_then_decrement(Duration::from_millis(50)) {
                timed_out.fetch_add(1, Ordering::SeqCst);
            }
        });
        // One waiter that holds out
        let stayer = scope.spawn(|_| semaphore.wait_then_decrement());

        quitter.join().unwrap();
        assert_eq!(timed_out.load(Ordering::SeqCst), 1);

        // The quitter restored its decrement, so one post releases the
        // remaining waiter.
        semaphore.post(1);
        stayer.join().unwrap();
    })
    .unwrap();
}
