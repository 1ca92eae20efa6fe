//! Minimal portable interface over kernel-level address-based waiting.
//!
//! The synchronization primitives in [`threading`](crate::threading) keep
//! their state in a 32-bit atomic word and block through this module. The
//! backend is selected at build time: the Linux futex syscall, Windows
//! `WaitOnAddress`, or a mutex-and-condvar table on everything else (also
//! selectable everywhere with the `fallback` cargo feature).
//!
//! Waits are allowed to wake spuriously; callers re-check their condition
//! and sleep again. Wakes issued after a release-store to the word reliably
//! reach any waiter that observed the pre-store value, because `wait` only
//! parks while the word still compares equal to `expected`.

use std::sync::atomic::AtomicU32;
use std::time::Instant;

#[cfg(all(
    any(target_os = "linux", target_os = "android"),
    not(feature = "fallback")
))]
mod linux;
#[cfg(all(
    any(target_os = "linux", target_os = "android"),
    not(feature = "fallback")
))]
use linux as imp;

#[cfg(all(windows, not(feature = "fallback")))]
mod windows;
#[cfg(all(windows, not(feature = "fallback")))]
use windows as imp;

#[cfg(any(
    feature = "fallback",
    not(any(target_os = "linux", target_os = "android", windows))
))]
mod fallback;
#[cfg(any(
    feature = "fallback",
    not(any(target_os = "linux", target_os = "android", windows))
))]
use fallback as imp;

/// Why a [`wait`] or [`wait_until`] call returned.
///
/// `WokenUp` reports a directed wake from [`wake_one`] or [`wake_all`]; it is
/// distinct from `Spurious` because a directed wake can carry meaning (the
/// semaphore treats it as a handed-over ticket) even when the word itself did
/// not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// The word no longer holds the expected value.
    ValueChanged,
    /// A `wake_one`/`wake_all` call released this thread.
    WokenUp,
    /// The thread resumed for an unrelated reason; re-check and wait again.
    Spurious,
    /// The deadline elapsed (timed waits only).
    TimedOut,
}

/// Blocks the calling thread while `word` holds `expected`.
///
/// Returns immediately with [`WakeReason::ValueChanged`] when the word
/// differs at the time of the call. `EINTR`-style interruptions are retried
/// internally; unexpected platform failures panic.
#[inline]
pub fn wait(word: &AtomicU32, expected: u32) -> WakeReason {
    imp::wait(word, expected)
}

/// Like [`wait`], bounded by a deadline on the monotonic clock.
///
/// Backends that only accept relative timeouts recompute the remaining time
/// from `deadline` on every retry, so wall-clock adjustments never affect
/// the wait.
#[inline]
pub fn wait_until(word: &AtomicU32, expected: u32, deadline: Instant) -> WakeReason {
    imp::wait_until(word, expected, deadline)
}

/// Wakes at most one thread blocked on `word`.
#[inline]
pub fn wake_one(word: &AtomicU32) {
    imp::wake_one(word)
}

/// Wakes every thread blocked on `word`.
#[inline]
pub fn wake_all(word: &AtomicU32) {
    imp::wake_all(word)
}
