//! Mutex-and-condvar backend for platforms without an address wait facility.
//!
//! Waiters park in a small hashed table of buckets. Each bucket records, per
//! word address, how many threads are waiting and how many directed wake
//! tokens have been handed out but not yet consumed; that bookkeeping keeps
//! `wake_one` exact even though a bucket's condvar has to be notified
//! broadcast-style (two words can hash to the same bucket, so waking a
//! single condvar waiter could release the wrong one).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Instant;

use super::WakeReason;

const BUCKET_COUNT: usize = 64;

struct Bucket {
    state: Mutex<Vec<AddressRecord>>,
    wakeups: Condvar,
}

struct AddressRecord {
    address: usize,
    waiters: usize,
    tokens: usize,
}

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_BUCKET: Bucket = Bucket {
    state: Mutex::new(Vec::new()),
    wakeups: Condvar::new(),
};

static BUCKETS: [Bucket; BUCKET_COUNT] = [EMPTY_BUCKET; BUCKET_COUNT];

fn bucket_for(address: usize) -> &'static Bucket {
    &BUCKETS[(address / std::mem::align_of::<AtomicU32>()) % BUCKET_COUNT]
}

fn find_record<'a>(
    state: &'a mut MutexGuard<'_, Vec<AddressRecord>>,
    address: usize,
) -> Option<&'a mut AddressRecord> {
    state.iter_mut().find(|record| record.address == address)
}

pub(crate) fn wait(word: &AtomicU32, expected: u32) -> WakeReason {
    wait_inner(word, expected, None)
}

pub(crate) fn wait_until(word: &AtomicU32, expected: u32, deadline: Instant) -> WakeReason {
    wait_inner(word, expected, Some(deadline))
}

fn wait_inner(word: &AtomicU32, expected: u32, deadline: Option<Instant>) -> WakeReason {
    let address = word as *const AtomicU32 as usize;
    let bucket = bucket_for(address);

    let mut state = bucket.state.lock().unwrap();
    // The word is re-checked under the bucket lock: a waker stores the new
    // value before calling wake_*, and wake_* takes this lock, so a waiter
    // that saw the old value here cannot miss the matching notification.
    if word.load(Ordering::Acquire) != expected {
        return WakeReason::ValueChanged;
    }
    match find_record(&mut state, address) {
        Some(record) => record.waiters += 1,
        None => state.push(AddressRecord {
            address,
            waiters: 1,
            tokens: 0,
        }),
    }

    let reason = loop {
        if word.load(Ordering::Acquire) != expected {
            break WakeReason::ValueChanged;
        }
        if let Some(record) = find_record(&mut state, address) {
            if record.tokens > 0 {
                record.tokens -= 1;
                break WakeReason::WokenUp;
            }
        }
        match deadline {
            Some(deadline) => {
                let remaining = match deadline.checked_duration_since(Instant::now()) {
                    Some(remaining) if !remaining.is_zero() => remaining,
                    _ => break WakeReason::TimedOut,
                };
                state = bucket.wakeups.wait_timeout(state, remaining).unwrap().0;
            }
            None => {
                state = bucket.wakeups.wait(state).unwrap();
            }
        }
    };

    if let Some(index) = state.iter().position(|record| record.address == address) {
        state[index].waiters -= 1;
        if state[index].waiters == 0 {
            // Tokens nobody is left to consume leave with the last waiter.
            state.remove(index);
        }
    }
    reason
}

pub(crate) fn wake_one(word: &AtomicU32) {
    let address = word as *const AtomicU32 as usize;
    let bucket = bucket_for(address);
    let mut state = bucket.state.lock().unwrap();
    if let Some(record) = find_record(&mut state, address) {
        if record.tokens < record.waiters {
            record.tokens += 1;
        }
    }
    drop(state);
    bucket.wakeups.notify_all();
}

pub(crate) fn wake_all(word: &AtomicU32) {
    let address = word as *const AtomicU32 as usize;
    let bucket = bucket_for(address);
    let mut state = bucket.state.lock().unwrap();
    if let Some(record) = find_record(&mut state, address) {
        record.tokens = record.waiters;
    }
    drop(state);
    bucket.wakeups.notify_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    #[test]
    fn wait_returns_immediately_on_changed_word() {
        let word = AtomicU32::new(1);
        assert_eq!(wait(&word, 0), WakeReason::ValueChanged);
    }

    #[test]
    fn timed_wait_times_out() {
        let word = AtomicU32::new(0);
        let deadline = Instant::now() + Duration::from_millis(10);
        assert_eq!(wait_until(&word, 0, deadline), WakeReason::TimedOut);
    }

    #[test]
    fn wake_one_releases_a_single_waiter() {
        let word = AtomicU32::new(0);
        crossbeam_utils::thread::scope(|scope| {
            let handle = scope.spawn(|_| wait(&word, 0));
            std::thread::sleep(Duration::from_millis(25));
            wake_one(&word);
            assert_eq!(handle.join().unwrap(), WakeReason::WokenUp);
        })
        .unwrap();
    }

    #[test]
    fn wake_with_no_waiters_is_lost() {
        let word = AtomicU32::new(0);
        wake_one(&word);
        let deadline = Instant::now() + Duration::from_millis(10);
        assert_eq!(wait_until(&word, 0, deadline), WakeReason::TimedOut);
    }
}
