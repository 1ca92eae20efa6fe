//! Manual-reset boolean barrier.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use crate::platform::{self, WakeReason};

const CLOSED: u32 = 0;
const OPEN: u32 = 1;

/// A gate threads can wait on until it is opened.
///
/// A gate is either open or closed. Any number of threads may block in
/// [`wait`](Gate::wait) while it is closed; [`open`](Gate::open) releases all
/// of them at once and lets every later waiter pass until the gate is closed
/// again. Both transitions are idempotent.
///
/// A thread that observes the gate open also observes every memory write
/// that happened before the `open()` call (the state word is written with
/// release ordering and read with acquire ordering).
///
/// # Examples
///
/// ```rust
/// use ferrous_support::Gate;
/// use std::sync::Arc;
///
/// let gate = Arc::new(Gate::new(false));
/// let waiter = {
///     let gate = gate.clone();
///     std::thread::spawn(move || gate.wait())
/// };
///
/// gate.open();
/// waiter.join().unwrap();
/// ```
pub struct Gate {
    word: AtomicU32,
}

impl Gate {
    /// Creates a gate in the given initial state.
    pub fn new(open: bool) -> Self {
        Self {
            word: AtomicU32::new(if open { OPEN } else { CLOSED }),
        }
    }

    /// Opens the gate, releasing all current waiters. Idempotent.
    pub fn open(&self) {
        self.word.store(OPEN, Ordering::Release);
        platform::wake_all(&self.word);
    }

    /// Closes the gate so future [`wait`](Gate::wait) calls block. Idempotent.
    ///
    /// Closing does not interact with threads already past the gate.
    pub fn close(&self) {
        self.word.store(CLOSED, Ordering::Release);
    }

    /// Opens or closes the gate.
    pub fn set(&self, opened: bool) {
        if opened {
            self.open();
        } else {
            self.close();
        }
    }

    /// Blocks until the gate is observed open.
    pub fn wait(&self) {
        loop {
            if self.word.load(Ordering::Acquire) == OPEN {
                return;
            }
            platform::wait(&self.word, CLOSED);
        }
    }

    /// Blocks until the gate opens or the timeout elapses on the monotonic
    /// clock. Returns `true` if the gate was observed open.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.word.load(Ordering::Acquire) == OPEN {
                return true;
            }
            if let WakeReason::TimedOut = platform::wait_until(&self.word, CLOSED, deadline) {
                return self.word.load(Ordering::Acquire) == OPEN;
            }
        }
    }
}
