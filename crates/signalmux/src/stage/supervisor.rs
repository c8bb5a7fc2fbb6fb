// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Restart-with-backoff supervision for a single stage (§4.7, §5).
//!
//! Backoff formula grounded on the QUIC transport's reconnection state
//! (`crates/hdds/src/transport/quic/io_thread.rs::ReconnectState`):
//! `delay = min(base * 2^attempt, max)`. Jitter is dropped here — that
//! transport needed it to avoid a reconnect thundering herd across many
//! peers; a single in-process stage restarting has no such herd to
//! desynchronize.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cooperative stop signal shared between a supervisor and the stage loop
/// it drives (§5 "each stage exposes a stop signal").
#[derive(Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Restart policy for a supervised stage.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// `None` means retry indefinitely until the stop signal fires.
    pub max_attempts: Option<u32>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self { base_delay: Duration::from_millis(50), max_delay: Duration::from_secs(30), max_attempts: None }
    }
}

impl BackoffPolicy {
    #[must_use]
    fn delay_for(&self, attempt: u32) -> Duration {
        let scale = 1u64 << attempt.min(20);
        self.base_delay.saturating_mul(scale as u32).min(self.max_delay)
    }
}

/// Runs `body` in a loop, restarting it with exponential backoff whenever
/// it returns `Err` (§4.7 "a stage whose run returns an error ... is
/// restarted by the supervisor with exponential backoff"). Stops cleanly
/// on `Ok(())` or when `stop` has been signalled.
///
/// Returns the number of restart attempts performed.
pub fn supervise<E: std::fmt::Display>(
    name: &str,
    policy: BackoffPolicy,
    stop: &StopSignal,
    mut body: impl FnMut() -> Result<(), E>,
) -> u32 {
    let mut attempt = 0u32;
    loop {
        if stop.is_stopped() {
            return attempt;
        }
        match body() {
            Ok(()) => return attempt,
            Err(err) => {
                log::error!("stage '{name}' failed (attempt {attempt}): {err}");
                if let Some(max) = policy.max_attempts {
                    if attempt + 1 >= max {
                        log::error!("stage '{name}' exceeded max restart attempts ({max}), giving up");
                        return attempt + 1;
                    }
                }
                std::thread::sleep(policy.delay_for(attempt));
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps_at_max() {
        let policy = BackoffPolicy { base_delay: Duration::from_millis(10), max_delay: Duration::from_millis(35), max_attempts: None };
        assert_eq!(policy.delay_for(0), Duration::from_millis(10));
        assert_eq!(policy.delay_for(1), Duration::from_millis(20));
        assert_eq!(policy.delay_for(2), Duration::from_millis(35)); // would be 40, capped
        assert_eq!(policy.delay_for(3), Duration::from_millis(35));
    }

    #[test]
    fn stops_restarting_once_stop_signal_fires() {
        let stop = StopSignal::new();
        let stop_for_body = stop.clone();
        let mut calls = 0u32;
        let attempts = supervise::<String>(
            "test",
            BackoffPolicy { base_delay: Duration::from_millis(1), max_delay: Duration::from_millis(2), max_attempts: None },
            &stop,
            move || {
                calls += 1;
                if calls >= 3 {
                    stop_for_body.stop();
                }
                Err("boom".to_string())
            },
        );
        assert!(attempts >= 2);
    }

    #[test]
    fn clean_return_stops_without_restarting() {
        let stop = StopSignal::new();
        let attempts = supervise::<String>("test", BackoffPolicy::default(), &stop, || Ok(()));
        assert_eq!(attempts, 0);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let stop = StopSignal::new();
        let attempts = supervise::<String>(
            "test",
            BackoffPolicy { base_delay: Duration::from_millis(1), max_delay: Duration::from_millis(1), max_attempts: Some(2) },
            &stop,
            || Err("boom".to_string()),
        );
        assert_eq!(attempts, 2);
    }
}
