// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end stage-runner lifecycle: an input stage feeds the router, a
//! filter and an output each subscribe to part of the traffic, and a
//! supervised stage restarts with backoff after a failure.

use signalmux::message::Message;
use signalmux::stage::{
    run_filter, run_input, run_output, supervise, BackoffPolicy, CursorSink, Decoder, Encoder, Filter, Outcome, RunnerStats,
    Sink, Source, StageError, StopSignal,
};
use signalmux::{compile, Carrier, OverflowPolicy, PacketPool, QueueCursor, Router};
use std::time::Duration;

struct LineSource {
    lines: Vec<&'static str>,
    exhausted: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl Source for LineSource {
    fn read(&mut self) -> Result<Option<(Vec<u8>, Option<QueueCursor>)>, StageError> {
        if self.lines.is_empty() {
            self.exhausted.store(true, std::sync::atomic::Ordering::Relaxed);
            return Ok(None);
        }
        let line = self.lines.remove(0);
        Ok(Some((line.as_bytes().to_vec(), Some(vec![self.lines.len() as u8]))))
    }
}

struct PlainDecoder;
impl Decoder for PlainDecoder {
    fn decode(&self, carrier: Carrier) -> Result<Vec<Carrier>, StageError> {
        carrier.with_message(|m| {
            let bytes = carrier_bytes(&carrier);
            m.payload = Some(String::from_utf8(bytes).unwrap());
            m.message_type = Some("LOG".into());
        });
        Ok(vec![carrier])
    }
}

fn carrier_bytes(carrier: &Carrier) -> Vec<u8> {
    carrier.with_bytes(|b| b.clone())
}

struct CountingFilter {
    count: usize,
}
impl Filter for CountingFilter {
    fn process(&mut self, _carrier: Carrier, _inject: &mut dyn FnMut(Carrier)) -> Result<(), StageError> {
        self.count += 1;
        Ok(())
    }
}

struct RecordingSink {
    lines: Vec<String>,
}
impl Sink for RecordingSink {
    fn write(&mut self, bytes: &[u8]) -> Result<Outcome, StageError> {
        self.lines.push(String::from_utf8_lossy(bytes).into_owned());
        Ok(Outcome::Delivered)
    }
}

struct PassthroughEncoder;
impl Encoder for PassthroughEncoder {
    fn encode(&self, message: &Message) -> Result<Option<Vec<u8>>, StageError> {
        Ok(message.payload.clone().map(String::into_bytes))
    }
}

struct LastCursor(Option<QueueCursor>);
impl CursorSink for LastCursor {
    fn update_cursor(&mut self, cursor: QueueCursor) {
        self.0 = Some(cursor);
    }
}

#[test]
fn input_decoder_router_filter_output_pipeline_delivers_every_line() {
    let pool = PacketPool::new(8);
    let router = Router::new();

    let filter_handle = router.register("counter", compile("TRUE").unwrap(), 8, OverflowPolicy::Block);
    let output_handle = router.register("sink", compile("Type == 'LOG'").unwrap(), 8, OverflowPolicy::Block);

    // The input stage hands decoded carriers to this channel; routing
    // them is normally `Router::run`'s job on its own thread, driven
    // synchronously here to keep the test deterministic.
    let (decoded_tx, decoded_rx) = crossbeam::channel::unbounded();
    let exhausted = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let mut source = LineSource { lines: vec!["one", "two", "three"], exhausted: exhausted.clone() };
    let input_stats = RunnerStats::default();
    run_input(&mut source, Some(&PlainDecoder), &pool, &decoded_tx, &input_stats, &|| {
        exhausted.load(std::sync::atomic::Ordering::Relaxed)
    })
    .unwrap();
    assert_eq!(input_stats.processed(), 3);
    drop(decoded_tx);

    while let Ok(carrier) = decoded_rx.try_recv() {
        router.route(&carrier);
    }

    let mut filter = CountingFilter { count: 0 };
    let (noop_tx, _noop_rx) = crossbeam::channel::unbounded();
    let stats = RunnerStats::default();
    run_filter(&mut filter, filter_handle.inbox(), &noop_tx, &stats, &|| filter_handle.inbox().is_empty()).unwrap();
    assert_eq!(filter.count, 3);

    let mut sink = RecordingSink { lines: Vec::new() };
    let mut cursor_sink = LastCursor(None);
    let output_stats = RunnerStats::default();
    run_output(&PassthroughEncoder, &mut sink, output_handle.inbox(), &mut cursor_sink, &output_stats, &|| {
        output_handle.inbox().is_empty()
    })
    .unwrap();

    assert_eq!(sink.lines, vec!["one".to_string(), "two".to_string(), "three".to_string()]);
    assert!(cursor_sink.0.is_some());
}

#[test]
fn supervisor_restarts_a_failing_stage_with_backoff_then_stops() {
    let stop = StopSignal::new();
    let stop_for_body = stop.clone();
    let mut attempts_seen = 0;
    let restarts = supervise::<String>(
        "flaky-output",
        BackoffPolicy { base_delay: Duration::from_millis(1), max_delay: Duration::from_millis(4), max_attempts: None },
        &stop,
        move || {
            attempts_seen += 1;
            if attempts_seen >= 3 {
                stop_for_body.stop();
            }
            Err("sink unavailable".to_string())
        },
    );
    assert!(restarts >= 2);
    assert!(stop.is_stopped());
}
