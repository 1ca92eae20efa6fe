//! Countdown barrier.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::platform::{self, WakeReason};

const CLOSED: u32 = 0;
const OPEN: u32 = 1;

/// A countdown latch; waiters pass once the counter reaches zero.
///
/// The counter starts at an initial value, is decreased by
/// [`count_down`](Latch::count_down) and can be raised again with
/// [`post`](Latch::post), which re-closes an open latch. Every successful
/// [`wait`](Latch::wait) synchronizes-with the `count_down` that brought the
/// counter to zero.
///
/// Races between `post` and `count_down` are resolved in favor of waking:
/// whenever the wait word has to be corrected, the latch prefers a spurious
/// wake-up (waiters re-check the counter) over a spurious block (which
/// nothing would ever resolve).
///
/// # Examples
///
/// ```rust
/// use ferrous_support::Latch;
/// use std::sync::Arc;
///
/// let latch = Arc::new(Latch::new(2));
/// let waiter = {
///     let latch = latch.clone();
///     std::thread::spawn(move || latch.wait())
/// };
///
/// latch.count_down(1);
/// latch.count_down(1);
/// waiter.join().unwrap();
/// ```
pub struct Latch {
    countdown: AtomicUsize,
    word: AtomicU32,
}

impl Latch {
    /// Creates a latch that opens after `initial_count` countdowns.
    ///
    /// A latch created with a count of zero starts out open.
    pub fn new(initial_count: usize) -> Self {
        Self {
            countdown: AtomicUsize::new(initial_count),
            word: AtomicU32::new(if initial_count > 0 { CLOSED } else { OPEN }),
        }
    }

    /// Increments the countdown by `count`, re-closing the latch if it was
    /// open.
    pub fn post(&self, count: usize) {
        let previous = self.countdown.fetch_add(count, Ordering::Release);
        if previous == 0 {
            if count > 0 {
                self.word.store(CLOSED, Ordering::Release);
            }
            // A count_down racing with the store above may have brought the
            // counter back to zero and seen the closed word; re-check so
            // its waiters are not left blocked.
            if self.countdown.load(Ordering::Acquire) == 0 {
                self.word.store(OPEN, Ordering::Release);
            }
        }
    }

    /// Decrements the countdown by `count`; when it reaches zero, opens the
    /// latch and wakes all waiters.
    ///
    /// Decrementing below zero is a usage error.
    pub fn count_down(&self, count: usize) {
        let previous = self.countdown.fetch_sub(count, Ordering::Release);
        debug_assert!(
            previous >= count,
            "latch counter must remain zero or positive"
        );
        if previous == count {
            if count > 0 {
                self.word.store(OPEN, Ordering::Release);
            }
            platform::wake_all(&self.word);
        }
    }

    /// Blocks until the counter is observed as zero.
    pub fn wait(&self) {
        let mut countdown = self.countdown.load(Ordering::Acquire);
        loop {
            if countdown == 0 {
                return;
            }
            platform::wait(&self.word, CLOSED);

            countdown = self.countdown.load(Ordering::Acquire);
            if countdown > 0 {
                // Spurious wake-up: re-close the word so this loop does not
                // spin, then re-check the counter once more in case a
                // racing count_down just opened the latch.
                self.word.store(CLOSED, Ordering::Release);
                countdown = self.countdown.load(Ordering::Acquire);
                if countdown == 0 {
                    self.word.store(OPEN, Ordering::Release);
                }
            }
        }
    }

    /// Blocks until the counter reaches zero or the timeout elapses on the
    /// monotonic clock. Returns `true` if the latch was observed open.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut countdown = self.countdown.load(Ordering::Acquire);
        loop {
            if countdown == 0 {
                return true;
            }
            if let WakeReason::TimedOut = platform::wait_until(&self.word, CLOSED, deadline) {
                return self.countdown.load(Ordering::Acquire) == 0;
            }

            countdown = self.countdown.load(Ordering::Acquire);
            if countdown > 0 {
                self.word.store(CLOSED, Ordering::Release);
                countdown = self.countdown.load(Ordering::Acquire);
                if countdown == 0 {
                    self.word.store(OPEN, Ordering::Release);
                }
            }
        }
    }
}
