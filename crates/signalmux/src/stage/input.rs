// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drives an input stage (§4.7, §6.4): pulls raw records from a [`Source`],
//! acquires a carrier from the pool, runs it through an optional
//! [`Decoder`], stamps the queue cursor, and hands the result to the
//! router.

use super::error::StageError;
use super::runner::RunnerStats;
use super::traits::Decoder;
use crate::pool::{Carrier, PacketPool, QueueCursor};
use crossbeam::channel::Sender;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// A raw record pulled from a [`Source`], paired with the cursor that
/// acknowledges it once downstream processing completes.
type SourceRecord = (Vec<u8>, Option<QueueCursor>);

/// Where an input stage pulls raw bytes from — a file tail, a socket
/// accept loop, a journal reader. Returning `Ok(None)` means "no record
/// available right now, keep polling"; it is not end-of-stream.
pub trait Source: Send {
    fn read(&mut self) -> Result<Option<SourceRecord>, StageError>;
}

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs an input's pull loop until `should_stop` reports true. Pool
/// exhaustion is not an error: the loop simply waits and retries,
/// matching §4.5's non-blocking-acquire-plus-caller-backoff contract.
///
/// Per-record decode failures are logged, counted in `stats`, and the
/// carrier is released back to the pool — they never abort the stage
/// (§4.7, §7; see [`StageError`]'s own doc comment).
pub fn run_input(
    source: &mut dyn Source,
    decoder: Option<&dyn Decoder>,
    pool: &PacketPool,
    router_input: &Sender<Carrier>,
    stats: &RunnerStats,
    should_stop: &dyn Fn() -> bool,
) -> Result<(), StageError> {
    loop {
        if should_stop() {
            return Ok(());
        }
        let Some((bytes, cursor)) = source.read()? else {
            std::thread::sleep(POLL_INTERVAL);
            continue;
        };

        let Some(carrier) = pool.acquire() else {
            std::thread::sleep(POLL_INTERVAL);
            continue;
        };
        carrier.with_bytes(|buf| *buf = bytes);
        if let Some(cursor) = cursor {
            carrier.set_cursor(cursor);
        }

        let carriers = match decoder {
            Some(decoder) => match decoder.decode(carrier.clone()) {
                Ok(carriers) => carriers,
                Err(err) => {
                    stats.errors.fetch_add(1, Ordering::Relaxed);
                    log::warn!("input stage decode error: {err}");
                    carrier.release_unmatched();
                    continue;
                }
            },
            None => vec![carrier],
        };
        stats.processed.fetch_add(1, Ordering::Relaxed);
        for carrier in carriers {
            if router_input.send(carrier).is_err() {
                return Ok(());
            }
        }
    }
}
