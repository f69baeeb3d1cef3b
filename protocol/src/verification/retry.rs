//! Bounded retry for synchronous store writes.

use std::fmt::Display;
use std::thread;

use crate::config::RetryPolicy;

/// The operation kept failing until the policy ran out.
#[derive(Debug)]
pub(crate) struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Run `op` until it succeeds or `policy.max_attempts` is reached, sleeping
/// the policy's backoff between attempts.
pub(crate) fn retry_sync<T, E, F>(
    policy: &RetryPolicy,
    operation: &str,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => {
                return Err(RetryExhausted {
                    attempts: attempt,
                    last_error: e,
                });
            }
            Err(e) => {
                let delay = policy.backoff_after(attempt);
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "store write failed, retrying"
                );
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeds_after_transient_failures() {
        let mut calls = 0;
        let result: Result<u32, RetryExhausted<String>> =
            retry_sync(&RetryPolicy::immediate(3), "test", || {
                calls += 1;
                if calls < 3 {
                    Err("flaky".to_string())
                } else {
                    Ok(calls)
                }
            });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let result: Result<(), RetryExhausted<String>> =
            retry_sync(&RetryPolicy::immediate(4), "test", || {
                calls += 1;
                Err(format!("failure {calls}"))
            });
        let err = result.unwrap_err();
        assert_eq!(err.attempts, 4);
        assert_eq!(err.last_error, "failure 4");
        assert_eq!(calls, 4);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let mut calls = 0;
        let _ = retry_sync(&RetryPolicy::immediate(0), "test", || {
            calls += 1;
            Err::<(), _>("nope")
        });
        assert_eq!(calls, 1);
    }
}
