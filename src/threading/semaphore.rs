//! Counting semaphore.

use std::cmp;
use std::sync::atomic::{AtomicIsize, AtomicU32, Ordering};
use std::time::{Duration, Instant};

use crate::platform::{self, WakeReason};

const CONTESTED: u32 = 0;
const UNCONTESTED: u32 = 1;

/// A counting semaphore admitting N concurrent threads.
///
/// The admit counter is decremented optimistically: a waiter first takes its
/// admit and only parks when the counter was exhausted, so the counter may
/// transiently dip below zero while threads are queued. The separate wait
/// word tracks whether the semaphore is contested (`0`) or not (`1`);
/// waiters park on that word and [`post`](Semaphore::post) hands each
/// released admit to exactly one parked thread.
///
/// Every successful [`wait_then_decrement`](Semaphore::wait_then_decrement)
/// synchronizes-with the `post` that provided its admit.
///
/// # Examples
///
/// ```rust
/// use ferrous_support::Semaphore;
/// use std::sync::Arc;
///
/// let semaphore = Arc::new(Semaphore::new(0));
/// let worker = {
///     let semaphore = semaphore.clone();
///     std::thread::spawn(move || semaphore.wait_then_decrement())
/// };
///
/// semaphore.post(1);
/// worker.join().unwrap();
/// ```
pub struct Semaphore {
    admits: AtomicIsize,
    word: AtomicU32,
}

impl Semaphore {
    /// Creates a semaphore with the given number of initial admits.
    pub fn new(initial_count: usize) -> Self {
        Self {
            admits: AtomicIsize::new(initial_count as isize),
            word: AtomicU32::new(UNCONTESTED),
        }
    }

    /// Increments the admit counter by `count`, waking up to `count` parked
    /// threads.
    pub fn post(&self, count: usize) {
        let previous = self.admits.fetch_add(count as isize, Ordering::Release);
        if previous < 0 {
            // Parked threads are pending. If they are now all covered, flip
            // the word back so threads between their decrement and the
            // kernel wait notice the change instead of going to sleep.
            if previous + count as isize >= 0 {
                self.word.store(UNCONTESTED, Ordering::Release);
            }
            // One directed wake per released admit. A broadcast would admit
            // more threads than were posted.
            let wakeups = cmp::min(count as isize, -previous);
            for _ in 0..wakeups {
                platform::wake_one(&self.word);
            }
        }
    }

    /// Consumes one admit, blocking until one is available.
    pub fn wait_then_decrement(&self) {
        let previous = self.admits.fetch_sub(1, Ordering::SeqCst);
        if previous > 0 {
            return; // Took an admit lock-free
        }

        // The semaphore just became (or already was) contested. The first
        // thread over the edge flips the word so later posts know to wake;
        // this briefly wakes threads already parked, which re-check and
        // park again.
        if previous == 0 {
            let _ = self.word.compare_exchange(
                UNCONTESTED,
                CONTESTED,
                Ordering::SeqCst,
                Ordering::SeqCst,
            );
        }

        loop {
            match platform::wait(&self.word, CONTESTED) {
                // Either the semaphore stopped being contested or a post
                // handed this thread its admit directly.
                WakeReason::ValueChanged | WakeReason::WokenUp => return,
                _ => continue,
            }
        }
    }

    /// Timed variant of [`wait_then_decrement`](Semaphore::wait_then_decrement).
    ///
    /// Returns `true` once an admit was consumed. On timeout, returns
    /// `false` and leaves the admit count as it was before the call.
    pub fn wait_for_then_decrement(&self, timeout: Duration) -> bool {
        let previous = self.admits.fetch_sub(1, Ordering::SeqCst);
        if previous > 0 {
            return true;
        }

        if previous == 0 {
            let _ = self.word.compare_exchange(
                UNCONTESTED,
                CONTESTED,
                Ordering::SeqCst,
                Ordering::SeqCst,
            );
        }

        let deadline = Instant::now() + timeout;
        loop {
            match platform::wait_until(&self.word, CONTESTED, deadline) {
                WakeReason::ValueChanged | WakeReason::WokenUp => return true,
                WakeReason::TimedOut => {
                    // Give the optimistically taken admit back. If this was
                    // the last parked thread, the semaphore is no longer
                    // contested.
                    let previous = self.admits.fetch_add(1, Ordering::Release);
                    if previous == -1 {
                        let _ = self.word.compare_exchange(
                            CONTESTED,
                            UNCONTESTED,
                            Ordering::SeqCst,
                            Ordering::SeqCst,
                        );
                    }
                    return false;
                }
                WakeReason::Spurious => continue,
            }
        }
    }
}
