//! # In-Memory Audit Log
//!
//! Append-only event log with live fan-out. Records are kept in a `Vec` for
//! replay and sent over a `tokio::sync::broadcast` channel to whoever is
//! watching (leaderboards, timelines). Slow subscribers lag; the log itself
//! never drops a record.

use crate::domain::value_objects::Address;
use crate::events::AuditRecord;
use crate::ports::outbound::AuditPublisher;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// Default broadcast capacity.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

/// In-memory audit log.
pub struct InMemoryAuditLog {
    records: RwLock<Vec<AuditRecord>>,
    sender: broadcast::Sender<AuditRecord>,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryAuditLog {
    /// Log with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }

    /// Log with an explicit channel capacity (clamped to at least 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            records: RwLock::new(Vec::new()),
            sender,
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Receives every record appended after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuditRecord> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All records, in append order.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.read().clone()
    }

    /// Records indexed by `identity`, in append order.
    #[must_use]
    pub fn records_for(&self, identity: Address) -> Vec<AuditRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| r.event.indexed_sender() == Some(identity))
            .cloned()
            .collect()
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for InMemoryAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditPublisher for InMemoryAuditLog {
    async fn publish(&self, mut record: AuditRecord) -> usize {
        // Sequence assignment and send share the lock so subscribers observe
        // append order.
        let mut records = self.records.write();
        record.sequence = records.len() as u64;
        records.push(record.clone());
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let topic = record.event.topic();
        match self.sender.send(record) {
            Ok(receivers) => {
                debug!(topic, receivers, "Audit record published");
                receivers
            }
            Err(_) => {
                debug!(topic, "Audit record logged (no subscribers)");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

// =============================================================================
// TESTS
// =============================================================================
