// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only in-process event log

use bh_core::{Clock, CorrelationId, DomainEvent, EventId, EventRecord};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Consumer of appended events.
///
/// Sinks are notified after the append is durable in the log, outside the
/// log's internal lock. Implementations must not block for long; slow
/// consumers should hand off to their own channel.
pub trait EventSink: Send + Sync {
    fn accept(&self, record: &EventRecord);
}

struct LogInner {
    next_seq: u64,
    last_epoch_ms: u64,
    records: Vec<EventRecord>,
}

/// Totally ordered, append-only record of all domain events.
///
/// Guarantees within one process instance: sequence numbers are dense and
/// increasing, timestamps are monotonic non-decreasing (ties permitted),
/// records are never mutated or deleted.
pub struct EventLog<C: Clock> {
    clock: C,
    inner: Mutex<LogInner>,
    sinks: RwLock<Vec<Arc<dyn EventSink>>>,
}

impl<C: Clock> EventLog<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            inner: Mutex::new(LogInner { next_seq: 1, last_epoch_ms: 0, records: Vec::new() }),
            sinks: RwLock::new(Vec::new()),
        }
    }

    /// Seed the log with records from a previous run (journal replay).
    ///
    /// Sequence numbering and the monotonic-timestamp floor continue from
    /// the replayed tail. Sinks are not notified for replayed records.
    pub fn with_history(clock: C, records: Vec<EventRecord>) -> Self {
        let next_seq = records.last().map(|r| r.seq + 1).unwrap_or(1);
        let last_epoch_ms = records.last().map(|r| r.epoch_ms).unwrap_or(0);
        Self {
            clock,
            inner: Mutex::new(LogInner { next_seq, last_epoch_ms, records }),
            sinks: RwLock::new(Vec::new()),
        }
    }

    /// Append one event, assigning its identity, sequence number, and
    /// monotonic timestamp. Returns the completed record.
    pub fn append(
        &self,
        correlation: CorrelationId,
        caused_by: Option<EventId>,
        event: DomainEvent,
    ) -> EventRecord {
        let record = {
            let mut inner = self.inner.lock();
            let epoch_ms = self.clock.epoch_ms().max(inner.last_epoch_ms);
            let record = EventRecord {
                id: EventId::new(),
                seq: inner.next_seq,
                correlation,
                caused_by,
                aggregate: event.aggregate(),
                epoch_ms,
                event,
            };
            inner.next_seq += 1;
            inner.last_epoch_ms = epoch_ms;
            inner.records.push(record.clone());
            record
        };

        tracing::debug!(seq = record.seq, "{}", record.event.log_summary());

        for sink in self.sinks.read().iter() {
            sink.accept(&record);
        }
        record
    }

    /// The last `n` records, in chronological order.
    pub fn recent(&self, n: usize) -> Vec<EventRecord> {
        let inner = self.inner.lock();
        let start = inner.records.len().saturating_sub(n);
        inner.records[start..].to_vec()
    }

    /// Snapshot of the entire history, in chronological order.
    pub fn all(&self) -> Vec<EventRecord> {
        self.inner.lock().records.clone()
    }

    /// Every record carrying `correlation`, in log order. This is the
    /// deterministic replay order for one triggering event's causal chain.
    pub fn by_correlation(&self, correlation: CorrelationId) -> Vec<EventRecord> {
        self.inner
            .lock()
            .records
            .iter()
            .filter(|r| r.correlation == correlation)
            .cloned()
            .collect()
    }

    pub fn last(&self) -> Option<EventRecord> {
        self.inner.lock().records.last().cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a sink for all subsequently appended events.
    pub fn subscribe(&self, sink: Arc<dyn EventSink>) {
        self.sinks.write().push(sink);
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
