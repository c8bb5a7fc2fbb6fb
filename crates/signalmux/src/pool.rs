// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The packet pool (§3.2, §4.5): a fixed-capacity pool of reusable
//! [`Carrier`]s circulated through the pipeline.
//!
//! Grounded on `RxPool`'s lock-free-freelist-plus-exhaustion-counter
//! design (`crates/hdds/src/core/discovery/multicast/pool.rs`), adapted
//! from fixed MTU-sized byte buffers to carriers that each own a
//! [`Message`], a raw byte buffer, an optional queue cursor, and an
//! outstanding-deliveries counter.

use crate::message::Message;
use crossbeam::queue::ArrayQueue;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Opaque token an input stage attaches to a carrier so that, once the
/// carrier's delivery is fully acknowledged, the input's durable read
/// position (a disk journal, a file offset, a Kafka offset, ...) can be
/// advanced. The core treats this as an opaque byte blob; interpreting it
/// is the input stage's concern (§4.7, §5).
pub type QueueCursor = Vec<u8>;

struct Slot {
    message: Mutex<Message>,
    msg_bytes: Mutex<Vec<u8>>,
    cursor: Mutex<Option<QueueCursor>>,
    outstanding: AtomicUsize,
}

impl Slot {
    fn fresh() -> Self {
        Self {
            message: Mutex::new(Message::new()),
            msg_bytes: Mutex::new(Vec::new()),
            cursor: Mutex::new(None),
            outstanding: AtomicUsize::new(0),
        }
    }

    fn reset(&self) {
        *self.message.lock() = Message::new();
        self.msg_bytes.lock().clear();
        *self.cursor.lock() = None;
    }
}

/// A carrier: the unit circulated through the pipeline (§3.2). Cloning a
/// `Carrier` clones the handle (an `Arc`), not the underlying message —
/// this is how the router hands the same in-flight carrier to several
/// subscriber inboxes during fan-out while tracking one shared
/// outstanding-deliveries counter.
#[derive(Clone)]
pub struct Carrier {
    slot: Arc<Slot>,
    pool: Arc<PoolInner>,
    index: usize,
}

impl Carrier {
    /// Run `f` with exclusive access to this carrier's message.
    pub fn with_message<R>(&self, f: impl FnOnce(&mut Message) -> R) -> R {
        f(&mut self.slot.message.lock())
    }

    /// A snapshot copy of this carrier's current message.
    #[must_use]
    pub fn message(&self) -> Message {
        self.slot.message.lock().clone()
    }

    /// Run `f` with exclusive access to this carrier's raw byte buffer
    /// (pre-decode bytes, or re-encoded bytes staged for an output).
    pub fn with_bytes<R>(&self, f: impl FnOnce(&mut Vec<u8>) -> R) -> R {
        f(&mut self.slot.msg_bytes.lock())
    }

    pub fn set_cursor(&self, cursor: QueueCursor) {
        *self.slot.cursor.lock() = Some(cursor);
    }

    #[must_use]
    pub fn cursor(&self) -> Option<QueueCursor> {
        self.slot.cursor.lock().clone()
    }

    /// Number of deliveries this carrier is still outstanding for.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.slot.outstanding.load(Ordering::Acquire)
    }

    /// Called by the router once per matched subscriber, before enqueuing
    /// the delivery into that subscriber's inbox.
    pub(crate) fn mark_delivered(&self) {
        self.slot.outstanding.fetch_add(1, Ordering::AcqRel);
    }

    /// Called by a subscriber once it has finished processing a delivered
    /// carrier. Idempotent in the sense described in §3.2: decrements the
    /// counter and returns the carrier to the pool only on the transition
    /// to zero.
    pub fn recycle(&self) {
        if self.slot.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.pool.free(self.index, &self.slot);
        }
    }

    /// Called by the router when no subscriber matched: the carrier was
    /// never handed off, so there is no decrement to perform — release it
    /// straight back to the pool.
    pub(crate) fn release_unmatched(&self) {
        debug_assert_eq!(self.outstanding(), 0);
        self.pool.free(self.index, &self.slot);
    }
}

struct PoolInner {
    slots: Vec<Arc<Slot>>,
    freelist: ArrayQueue<usize>,
    exhausted_count: AtomicU64,
}

impl PoolInner {
    fn free(&self, index: usize, slot: &Slot) {
        slot.reset();
        // Capacity-sized queue backed by `slots.len()` indices: push can
        // only fail if an index were freed twice, which would itself be a
        // bug in a caller holding a carrier it already recycled.
        let _ = self.freelist.push(index);
    }
}

/// A fixed-capacity pool of `N` reusable [`Carrier`]s (§4.5).
#[derive(Clone)]
pub struct PacketPool {
    inner: Arc<PoolInner>,
}

impl PacketPool {
    /// Create a pool with `capacity` carriers, all initially available.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let slots: Vec<Arc<Slot>> = (0..capacity).map(|_| Arc::new(Slot::fresh())).collect();
        let freelist = ArrayQueue::new(capacity.max(1));
        for i in 0..capacity {
            let _ = freelist.push(i);
        }
        Self {
            inner: Arc::new(PoolInner { slots, freelist, exhausted_count: AtomicU64::new(0) }),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.slots.len()
    }

    /// Acquire a freshly reset carrier, or `None` if the pool is
    /// exhausted (every carrier is still outstanding somewhere in the
    /// pipeline). Never blocks — callers that want to wait poll or use
    /// their own backoff, matching the non-blocking freelist pop of
    /// `RxPool::acquire`.
    #[must_use]
    pub fn acquire(&self) -> Option<Carrier> {
        match self.inner.freelist.pop() {
            Some(index) => Some(Carrier { slot: Arc::clone(&self.inner.slots[index]), pool: Arc::clone(&self.inner), index }),
            None => {
                self.inner.exhausted_count.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Number of times [`PacketPool::acquire`] found no free carrier.
    #[must_use]
    pub fn exhausted_count(&self) -> u64 {
        self.inner.exhausted_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn available(&self) -> usize {
        self.inner.freelist.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_returns_a_zeroed_carrier() {
        let pool = PacketPool::new(2);
        let carrier = pool.acquire().unwrap();
        assert_eq!(carrier.outstanding(), 0);
        assert_eq!(carrier.message(), Message::new());
    }

    #[test]
    fn exhaustion_is_counted_and_acquire_returns_none() {
        let pool = PacketPool::new(1);
        let _held = pool.acquire().unwrap();
        assert!(pool.acquire().is_none());
        assert_eq!(pool.exhausted_count(), 1);
    }

    #[test]
    fn recycle_returns_to_zero_frees_the_carrier_for_reuse() {
        let pool = PacketPool::new(1);
        let carrier = pool.acquire().unwrap();
        carrier.mark_delivered();
        carrier.mark_delivered();
        carrier.with_message(|m| m.message_type = Some("x".into()));

        carrier.recycle();
        assert_eq!(pool.available(), 0); // still one outstanding delivery
        carrier.recycle();
        assert_eq!(pool.available(), 1);

        let reused = pool.acquire().unwrap();
        assert_eq!(reused.message(), Message::new()); // reset on release
    }

    #[test]
    fn unmatched_carrier_releases_immediately() {
        let pool = PacketPool::new(1);
        let carrier = pool.acquire().unwrap();
        carrier.release_unmatched();
        assert_eq!(pool.available(), 1);
    }
}
