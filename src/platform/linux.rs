//! Futex backend, used directly via kernel syscall.

use std::ptr;
use std::sync::atomic::AtomicU32;
use std::time::{Duration, Instant};

use super::WakeReason;

pub(crate) fn wait(word: &AtomicU32, expected: u32) -> WakeReason {
    loop {
        let r = unsafe {
            futex(
                word_ptr(word),
                libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
                expected as i32,
                ptr::null(),
            )
        };
        if r == 0 {
            return WakeReason::WokenUp;
        }
        match errno() {
            libc::EAGAIN => return WakeReason::ValueChanged,
            libc::EINTR => continue,
            e => panic!("futex(FUTEX_WAIT) failed unexpectedly: errno {}", e),
        }
    }
}

pub(crate) fn wait_until(word: &AtomicU32, expected: u32, deadline: Instant) -> WakeReason {
    loop {
        // FUTEX_WAIT takes a relative timeout; recompute it from the
        // monotonic deadline on every retry.
        let remaining = match deadline.checked_duration_since(Instant::now()) {
            Some(remaining) if !remaining.is_zero() => remaining,
            _ => return WakeReason::TimedOut,
        };
        let timeout = timespec_from(remaining);
        let r = unsafe {
            futex(
                word_ptr(word),
                libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
                expected as i32,
                &timeout,
            )
        };
        if r == 0 {
            return WakeReason::WokenUp;
        }
        match errno() {
            libc::EAGAIN => return WakeReason::ValueChanged,
            libc::ETIMEDOUT => return WakeReason::TimedOut,
            libc::EINTR => continue,
            e => panic!("futex(FUTEX_WAIT) failed unexpectedly: errno {}", e),
        }
    }
}

pub(crate) fn wake_one(word: &AtomicU32) {
    wake(word, 1);
}

pub(crate) fn wake_all(word: &AtomicU32) {
    wake(word, i32::MAX);
}

fn wake(word: &AtomicU32, max_threads_to_wake: i32) {
    let r = unsafe {
        futex(
            word_ptr(word),
            libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
            max_threads_to_wake,
            ptr::null(),
        )
    };
    debug_assert!(r >= 0, "futex(FUTEX_WAKE) failed: errno {}", errno());
}

fn word_ptr(word: &AtomicU32) -> *mut libc::c_int {
    word as *const AtomicU32 as *mut libc::c_int
}

fn timespec_from(duration: Duration) -> libc::timespec {
    libc::timespec {
        tv_sec: duration.as_secs().min(libc::time_t::MAX as u64) as libc::time_t,
        tv_nsec: duration.subsec_nanos() as libc::c_long,
    }
}

fn errno() -> libc::c_int {
    #[cfg(target_os = "linux")]
    unsafe {
        *libc::__errno_location()
    }
    #[cfg(target_os = "android")]
    unsafe {
        *libc::__errno()
    }
}

unsafe fn futex(
    uaddr: *mut libc::c_int,
    futex_op: libc::c_int,
    val: libc::c_int,
    timeout: *const libc::timespec,
) -> libc::c_long {
    libc::syscall(
        libc::SYS_futex,
        uaddr,
        futex_op,
        val,
        timeout,
        ptr::null_mut::<libc::c_void>(),
        0,
    )
}
