// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single routed subscriber: its matcher, bounded inbox, overflow
//! policy, and delivery statistics.
//!
//! Statistics shape grounded on `hdds-router`'s `RouteStats`/
//! `RouteStatsSnapshot` (`crates/hdds-router/src/route.rs`): atomic
//! counters behind the live subscriber, a plain snapshot struct handed
//! out to callers (the admin/reporting surface, per §9.5).

use crate::matcher::Matcher;
use crate::pool::Carrier;
use crossbeam::channel::{Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// What to do when a subscriber's inbox is full (§4.6, §9.5).
///
/// Filters default to `Block` (the pipeline backs up rather than silently
/// drop what's being filtered for); outputs default to `Drop` (a stalled
/// downstream output must not stall delivery to every other subscriber).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    Block,
    Drop,
}

/// Delivery counters for one subscriber.
#[derive(Debug, Default)]
pub struct SubscriberStats {
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl SubscriberStats {
    #[must_use]
    pub fn snapshot(&self) -> SubscriberStatsSnapshot {
        SubscriberStatsSnapshot {
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a subscriber's delivery counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberStatsSnapshot {
    pub delivered: u64,
    pub dropped: u64,
}

/// A registered matcher plus its bounded inbox (§4.6). Lives inside the
/// router's copy-on-write registry as an `Arc`.
pub struct Subscriber {
    name: String,
    matcher: Matcher,
    inbox_tx: Sender<Carrier>,
    overflow: OverflowPolicy,
    stats: Arc<SubscriberStats>,
}

impl Subscriber {
    pub(super) fn new(
        name: String,
        matcher: Matcher,
        inbox_capacity: usize,
        overflow: OverflowPolicy,
    ) -> (Arc<Self>, SubscriberHandle) {
        let (inbox_tx, inbox_rx) = crossbeam::channel::bounded(inbox_capacity.max(1));
        let stats = Arc::new(SubscriberStats::default());
        let subscriber = Arc::new(Self { name, matcher, inbox_tx, overflow, stats: Arc::clone(&stats) });
        let handle = SubscriberHandle { inbox_rx, stats };
        (subscriber, handle)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(super) fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Deliver a carrier per this subscriber's overflow policy. The caller
    /// has already called [`Carrier::mark_delivered`]; whenever the carrier
    /// isn't actually handed to the inbox — a full `Drop` inbox, or a
    /// disconnected inbox under either policy (the stage runner dropped
    /// its receiver) — this undoes that by recycling the carrier
    /// immediately so the non-delivery never leaks an outstanding count.
    pub(super) fn deliver(&self, carrier: Carrier) {
        match self.overflow {
            OverflowPolicy::Block => match self.inbox_tx.send(carrier) {
                Ok(()) => {
                    self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(crossbeam::channel::SendError(carrier)) => {
                    carrier.recycle();
                }
            },
            OverflowPolicy::Drop => match self.inbox_tx.try_send(carrier) {
                Ok(()) => {
                    self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Full(carrier)) => {
                    self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                    carrier.recycle();
                }
                Err(TrySendError::Disconnected(carrier)) => {
                    carrier.recycle();
                }
            },
        }
    }
}

/// The consumer-side handle returned by [`super::Router::register`]: the
/// stage runner reads deliveries from `inbox()` and inspects `stats()`.
pub struct SubscriberHandle {
    inbox_rx: Receiver<Carrier>,
    stats: Arc<SubscriberStats>,
}

impl SubscriberHandle {
    #[must_use]
    pub fn inbox(&self) -> &Receiver<Carrier> {
        &self.inbox_rx
    }

    #[must_use]
    pub fn stats(&self) -> &SubscriberStats {
        &self.stats
    }
}
