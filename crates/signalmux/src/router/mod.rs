// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The router (§3.3's consumer, §4.6): the fan-out coordinator that
//! matches every carrier against the subscriber registry and delivers it
//! to each matching filter/output inbox.
//!
//! Grounded on `hdds-router`'s `Route`/`RouteStats` shape
//! (`crates/hdds-router/src/route.rs`) for per-subscriber statistics, and
//! on the crate's existing `arc-swap`/`crossbeam` dependency pair for the
//! copy-on-write registry and bounded inboxes — §5 calls for synchronous,
//! thread-per-stage scheduling ("cooperatively single-threaded... only
//! suspends at channel sends/receives"), so this uses blocking
//! `crossbeam::channel` rather than an async runtime (see DESIGN.md).

mod subscriber;

pub use subscriber::{OverflowPolicy, Subscriber, SubscriberHandle, SubscriberStats, SubscriberStatsSnapshot};

use crate::matcher::Matcher;
use crate::pool::Carrier;
use arc_swap::ArcSwap;
use crossbeam::channel::{Receiver, Sender};
use std::sync::Arc;

/// The fan-out coordinator (§4.6). Owns the subscriber registry and a
/// single input channel that inputs/decoders feed carriers into.
pub struct Router {
    registry: ArcSwap<Vec<Arc<Subscriber>>>,
    input_tx: Sender<Carrier>,
    input_rx: Receiver<Carrier>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        let (input_tx, input_rx) = crossbeam::channel::unbounded();
        Self { registry: ArcSwap::from_pointee(Vec::new()), input_tx, input_rx }
    }

    /// The sending half of the router's single input channel — the handle
    /// inputs/decoders use to contribute carriers.
    #[must_use]
    pub fn input_sender(&self) -> Sender<Carrier> {
        self.input_tx.clone()
    }

    /// Register a new subscriber (filter or output) with `inbox_capacity`
    /// and `overflow` policy, returning the handle the stage runner uses
    /// to read deliveries.
    pub fn register(
        &self,
        name: impl Into<String>,
        matcher: Matcher,
        inbox_capacity: usize,
        overflow: OverflowPolicy,
    ) -> SubscriberHandle {
        let (subscriber, handle) = Subscriber::new(name.into(), matcher, inbox_capacity, overflow);
        self.registry.rcu(|current| {
            let mut next = (**current).clone();
            next.push(Arc::clone(&subscriber));
            Arc::new(next)
        });
        handle
    }

    /// Remove a subscriber by name — used both for hot-reload and for the
    /// `PROCESS_NOT_ROUTER_FATAL` path (§9.5): a subscriber whose matcher
    /// errors mid-evaluation is removed rather than wedging the router.
    pub fn unregister(&self, name: &str) {
        self.registry.rcu(|current| {
            let next: Vec<Arc<Subscriber>> = current.iter().filter(|s| s.name() != name).cloned().collect();
            Arc::new(next)
        });
    }

    #[must_use]
    pub fn subscriber_names(&self) -> Vec<String> {
        self.registry.load().iter().map(|s| s.name().to_string()).collect()
    }

    /// Route a single carrier: evaluate every current subscriber's matcher
    /// against it, deliver to each match per its overflow policy, and
    /// release the carrier immediately if nothing matched (§4.6 steps 1-4).
    ///
    /// Returns the names of any subscribers removed this call because
    /// their matcher errored mid-evaluation.
    pub fn route(&self, carrier: &Carrier) -> Vec<String> {
        // Step 1: snapshot under copy-on-write so a concurrent hot-reload
        // never blocks or is seen half-applied by this routing pass.
        let subscribers = self.registry.load();
        let message = carrier.message();

        let mut matched_any = false;
        let mut failed: Vec<String> = Vec::new();

        for subscriber in subscribers.iter() {
            match subscriber.matcher().evaluate(&message) {
                Ok(true) => {
                    matched_any = true;
                    carrier.mark_delivered();
                    subscriber.deliver(carrier.clone());
                }
                Ok(false) => {}
                Err(_err) => {
                    failed.push(subscriber.name().to_string());
                }
            }
        }

        if !failed.is_empty() {
            for name in &failed {
                self.unregister(name);
            }
        }
        if !matched_any {
            carrier.release_unmatched();
        }
        failed
    }

    /// Run the routing loop on the current thread: read carriers from the
    /// input channel and route each one until the channel is closed (all
    /// `Sender`s, including this router's own clone, have been dropped).
    pub fn run(&self) {
        while let Ok(carrier) = self.input_rx.recv() {
            self.route(&carrier);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::compile;
    use crate::pool::PacketPool;

    fn carrier_with(pool: &PacketPool, message_type: &str, severity: i32) -> Carrier {
        let carrier = pool.acquire().unwrap();
        carrier.with_message(|m| {
            m.message_type = Some(message_type.into());
            m.severity = Some(severity);
        });
        carrier
    }

    #[test]
    fn e4_fans_out_to_every_matching_subscriber() {
        let pool = PacketPool::new(4);
        let router = Router::new();

        let low_severity = router.register("low-severity", compile("Severity < 5").unwrap(), 8, OverflowPolicy::Block);
        let exact_type = router.register("exact-type", compile("Type == 'X'").unwrap(), 8, OverflowPolicy::Block);
        let catch_all = router.register("catch-all", compile("TRUE").unwrap(), 8, OverflowPolicy::Block);

        let carrier = carrier_with(&pool, "X", 3);
        router.route(&carrier);

        assert_eq!(carrier.outstanding(), 3);
        assert!(low_severity.inbox().try_recv().is_ok());
        assert!(exact_type.inbox().try_recv().is_ok());
        assert!(catch_all.inbox().try_recv().is_ok());

        assert!(low_severity.inbox().try_recv().is_err());
        carrier.recycle();
        carrier.recycle();
        carrier.recycle();
        assert_eq!(carrier.outstanding(), 0);
        assert_eq!(pool.available(), 4);
    }

    #[test]
    fn unmatched_carrier_is_released_immediately() {
        let pool = PacketPool::new(1);
        let router = Router::new();
        router.register("never", compile("Type == 'nope'").unwrap(), 4, OverflowPolicy::Block);

        let carrier = carrier_with(&pool, "X", 0);
        router.route(&carrier);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn drop_policy_counts_drops_instead_of_blocking() {
        let pool = PacketPool::new(4);
        let router = Router::new();
        let handle = router.register("full", compile("TRUE").unwrap(), 1, OverflowPolicy::Drop);

        let first = carrier_with(&pool, "a", 0);
        router.route(&first);
        let second = carrier_with(&pool, "b", 0);
        router.route(&second);

        assert_eq!(handle.stats().snapshot().dropped, 1);
        assert_eq!(second.outstanding(), 0); // dropped delivery decremented back to zero
    }

    #[test]
    fn block_policy_recycles_instead_of_leaking_when_inbox_is_disconnected() {
        let pool = PacketPool::new(1);
        let router = Router::new();
        let handle = router.register("abandoned", compile("TRUE").unwrap(), 4, OverflowPolicy::Block);
        drop(handle); // drops the inbox receiver, disconnecting the subscriber's sender

        let carrier = carrier_with(&pool, "a", 0);
        router.route(&carrier);

        assert_eq!(carrier.outstanding(), 0);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn erroring_matcher_removes_its_subscriber() {
        let pool = PacketPool::new(1);
        let router = Router::new();
        router.register("bad", compile("Fields[n] =~ /1/").unwrap(), 4, OverflowPolicy::Block);

        let carrier = pool.acquire().unwrap();
        carrier.with_message(|m| m.add_field(crate::message::Field::new("n", 1_i64, "")));

        let failed = router.route(&carrier);
        assert_eq!(failed, vec!["bad".to_string()]);
        assert!(router.subscriber_names().is_empty());
    }
}
