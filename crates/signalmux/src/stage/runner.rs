// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drives filter and output stages against their subscriber inbox (§4.7).
//!
//! Per-message failures are logged and counted but never abort the stage
//! loop — only a disconnected inbox (the router shutting down) ends
//! `run` cleanly. This mirrors `hdds-router`'s distinction between a
//! per-route error (`Route::record_error`, logged and counted) and the
//! router's own `run` loop exiting.

use super::error::StageError;
use super::traits::{Encoder, Filter, Outcome, Sink};
use crate::pool::{Carrier, QueueCursor};
use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Per-stage error/delivery counters surfaced alongside a subscriber's own
/// delivered/dropped counts (§9.5).
#[derive(Debug, Default)]
pub struct RunnerStats {
    pub processed: AtomicU64,
    pub errors: AtomicU64,
}

impl RunnerStats {
    #[must_use]
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Drives a [`Filter`] stage: reads carriers from `inbox`, calls
/// `filter.process`, forwards any injected carriers to `router_input`, and
/// always recycles the delivered carrier afterward. Returns when `inbox`
/// disconnects (the router was dropped) or `should_stop` reports true.
pub fn run_filter(
    filter: &mut dyn Filter,
    inbox: &Receiver<Carrier>,
    router_input: &Sender<Carrier>,
    stats: &RunnerStats,
    should_stop: &dyn Fn() -> bool,
) -> Result<(), StageError> {
    loop {
        if should_stop() {
            return Ok(());
        }
        let carrier = match inbox.recv_timeout(POLL_INTERVAL) {
            Ok(carrier) => carrier,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        };

        let mut inject = |injected: Carrier| {
            let _ = router_input.send(injected);
        };
        match filter.process(carrier.clone(), &mut inject) {
            Ok(()) => {
                stats.processed.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                stats.errors.fetch_add(1, Ordering::Relaxed);
                log::warn!("filter stage error: {err}");
            }
        }
        carrier.recycle();
    }
}

/// Acknowledges a delivered carrier's queue cursor so the owning input can
/// advance its durable read position (§4.7 `updateCursor`).
pub trait CursorSink: Send {
    fn update_cursor(&mut self, cursor: QueueCursor);
}

/// Drives an [`Output`](super::traits::Sink) stage: for each delivered
/// carrier, encodes its message and writes the result to `sink`. On
/// success (or `Outcome::UserAbort`, which is treated the same way for
/// cursor-advance purposes) the carrier's cursor is acknowledged and the
/// carrier recycled.
pub fn run_output(
    encoder: &dyn Encoder,
    sink: &mut dyn Sink,
    inbox: &Receiver<Carrier>,
    cursor_sink: &mut dyn CursorSink,
    stats: &RunnerStats,
    should_stop: &dyn Fn() -> bool,
) -> Result<(), StageError> {
    loop {
        if should_stop() {
            return Ok(());
        }
        let carrier = match inbox.recv_timeout(POLL_INTERVAL) {
            Ok(carrier) => carrier,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        };

        let message = carrier.message();
        let outcome = encoder.encode(&message).and_then(|encoded| match encoded {
            Some(bytes) => sink.write(&bytes),
            None => Ok(Outcome::Delivered),
        });

        match outcome {
            Ok(Outcome::Delivered | Outcome::UserAbort) => {
                stats.processed.fetch_add(1, Ordering::Relaxed);
                if let Some(cursor) = carrier.cursor() {
                    cursor_sink.update_cursor(cursor);
                }
            }
            Err(err) => {
                stats.errors.fetch_add(1, Ordering::Relaxed);
                log::warn!("output stage error: {err}");
            }
        }
        carrier.recycle();
    }
}
