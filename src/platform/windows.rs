//! WaitOnAddress backend (Windows 8+).

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use winapi::shared::minwindef::{DWORD, FALSE};
use winapi::shared::winerror::ERROR_TIMEOUT;
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::synchapi::{WaitOnAddress, WakeByAddressAll, WakeByAddressSingle};
use winapi::um::winbase::INFINITE;
use winapi::um::winnt::PVOID;

use super::WakeReason;

pub(crate) fn wait(word: &AtomicU32, expected: u32) -> WakeReason {
    wait_with(word, expected, INFINITE)
}

pub(crate) fn wait_until(word: &AtomicU32, expected: u32, deadline: Instant) -> WakeReason {
    // WaitOnAddress takes a relative timeout in milliseconds; recompute it
    // from the monotonic deadline so wall-clock changes cannot shorten or
    // stretch the wait.
    let remaining = match deadline.checked_duration_since(Instant::now()) {
        Some(remaining) if !remaining.is_zero() => remaining,
        _ => return WakeReason::TimedOut,
    };
    let milliseconds = remaining
        .as_millis()
        .saturating_add(1)
        .min(u128::from(INFINITE - 1)) as DWORD;
    wait_with(word, expected, milliseconds)
}

fn wait_with(word: &AtomicU32, expected: u32, milliseconds: DWORD) -> WakeReason {
    let mut compare = expected;
    let r = unsafe {
        WaitOnAddress(
            word as *const AtomicU32 as PVOID,
            &mut compare as *mut u32 as PVOID,
            std::mem::size_of::<u32>(),
            milliseconds,
        )
    };
    if r == FALSE {
        let error = unsafe { GetLastError() };
        if error == ERROR_TIMEOUT {
            return WakeReason::TimedOut;
        }
        panic!("WaitOnAddress failed unexpectedly: error {}", error);
    }
    if word.load(Ordering::Acquire) != expected {
        WakeReason::ValueChanged
    } else {
        // The word compares equal again; either a directed wake or the rare
        // changed-and-changed-back return. Report the wake, callers with a
        // stricter condition re-check it anyway.
        WakeReason::WokenUp
    }
}

pub(crate) fn wake_one(word: &AtomicU32) {
    unsafe { WakeByAddressSingle(word as *const AtomicU32 as PVOID) };
}

pub(crate) fn wake_all(word: &AtomicU32) {
    unsafe { WakeByAddressAll(word as *const AtomicU32 as PVOID) };
}
