//! Retry-with-jittered-backoff for optimistic transaction conflicts.
//!
//! The store itself never retries; `Conflict` is always returned to the
//! caller. This helper is what callers wrap their commit loop in, matching
//! the error table's policy of retrying a lost optimistic transaction
//! internally before surfacing it. It's generic over the caller's error
//! type via [`IsConflict`] so a higher-level crate whose error enum wraps
//! `StoreError::Conflict` among other cases can reuse this same backoff
//! loop instead of reimplementing it.

use crate::error::StoreError;
use rand::Rng;
use std::thread;
use std::time::Duration;

const BASE_DELAY_MS: u64 = 2;
const MAX_DELAY_MS: u64 = 50;

/// Whether an error represents a lost optimistic transaction, and is
/// therefore worth retrying, as opposed to any other failure.
pub trait IsConflict {
    fn is_conflict(&self) -> bool;
}

impl IsConflict for StoreError {
    fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict)
    }
}

/// Run `attempt` up to `max_retries + 1` times, retrying only on errors
/// where [`IsConflict::is_conflict`] holds, with jittered exponential
/// backoff between attempts. Any other error, or exhausting the retry
/// budget, is returned immediately.
pub fn with_conflict_retry<T, E: IsConflict>(
    max_retries: u32,
    mut attempt: impl FnMut() -> Result<T, E>,
) -> Result<T, E> {
    let mut tries = 0;
    loop {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_conflict() && tries < max_retries => {
                let backoff_ms = (BASE_DELAY_MS.saturating_shl(tries)).min(MAX_DELAY_MS);
                let jittered = rand::thread_rng().gen_range(0..=backoff_ms.max(1));
                thread::sleep(Duration::from_millis(jittered));
                tries += 1;
            }
            Err(other) => return Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn succeeds_immediately_without_retry() {
        let result = with_conflict_retry(3, || Ok::<_, StoreError>(42));
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn retries_on_conflict_until_success() {
        let calls = Cell::new(0);
        let result = with_conflict_retry(5, || {
            let n = calls.get() + 1;
            calls.set(n);
            if n < 3 {
                Err(StoreError::Conflict)
            } else {
                Ok(n)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn surfaces_conflict_after_exhausting_budget() {
        let result = with_conflict_retry(2, || Err::<i32, _>(StoreError::Conflict));
        assert!(matches!(result, Err(StoreError::Conflict)));
    }

    #[test]
    fn non_conflict_errors_are_never_retried() {
        let calls = Cell::new(0);
        let result = with_conflict_retry(5, || {
            calls.set(calls.get() + 1);
            Err::<i32, _>(StoreError::NotFound)
        });
        assert!(matches!(result, Err(StoreError::NotFound)));
        assert_eq!(calls.get(), 1);
    }
}
