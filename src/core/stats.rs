//! Batch statistics sinks.
//!
//! The scheduler reports deferred items so batch-level telemetry stays
//! consistent, plus a few informational hooks. Sinks never influence
//! scheduling and their failures are their own business.

use std::collections::VecDeque;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::core::item::{ItemId, WorkItem};
use crate::util::clock::now_ms;

/// Kind of a recorded stats event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsAction {
    /// Item joined the scheduler with a batch.
    Tracked,
    /// Item is about to be dispatched.
    Dispatched {
        /// Dispatch was forced by the liveness timer.
        due_to_timeout: bool,
    },
    /// Item was dropped without loading.
    Deferred,
}

/// Stats event structure.
#[derive(Debug, Clone)]
pub struct StatsEvent {
    /// Batch the item arrived with, when known.
    pub batch: Option<Uuid>,
    /// Related item.
    pub item: ItemId,
    /// What happened.
    pub action: StatsAction,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Receives batch statistics from the scheduler.
pub trait StatsSink: Send + Sync {
    /// An item was permanently dropped for this scheduler.
    fn on_item_deferred(&self, item: &WorkItem);

    /// A batch was accepted.
    fn on_items_tracked(&self, batch: Uuid, items: &[WorkItem]) {
        let _ = (batch, items);
    }

    /// An item is about to be dispatched.
    fn on_will_dispatch(&self, item: &WorkItem, due_to_timeout: bool) {
        let _ = (item, due_to_timeout);
    }
}

/// Sink that turns stats into `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatsSink;

impl StatsSink for TracingStatsSink {
    fn on_item_deferred(&self, item: &WorkItem) {
        tracing::info!(item = %item.id, "item deferred");
    }

    fn on_items_tracked(&self, batch: Uuid, items: &[WorkItem]) {
        tracing::debug!(%batch, count = items.len(), "batch tracked");
    }

    fn on_will_dispatch(&self, item: &WorkItem, due_to_timeout: bool) {
        tracing::debug!(item = %item.id, due_to_timeout, "dispatching item");
    }
}

/// In-memory sink for testing and dev, keeping the latest events.
pub struct InMemoryStatsSink {
    events: Mutex<VecDeque<StatsEvent>>,
    max_events: usize,
}

impl InMemoryStatsSink {
    /// Create a sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(1024))),
            max_events,
        }
    }

    /// Snapshot of stored events.
    pub fn events(&self) -> Vec<StatsEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Items deferred so far, in order.
    pub fn deferred(&self) -> Vec<ItemId> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.action == StatsAction::Deferred)
            .map(|e| e.item)
            .collect()
    }

    /// Number of dispatches forced by the liveness timer.
    pub fn timeout_dispatches(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| {
                e.action
                    == StatsAction::Dispatched {
                        due_to_timeout: true,
                    }
            })
            .count()
    }

    fn record(&self, batch: Option<Uuid>, item: ItemId, action: StatsAction) {
        let mut events = self.events.lock();
        if self.max_events == 0 {
            return;
        }
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(StatsEvent {
            batch,
            item,
            action,
            created_at_ms: now_ms(),
        });
    }
}

impl StatsSink for InMemoryStatsSink {
    fn on_item_deferred(&self, item: &WorkItem) {
        self.record(None, item.id, StatsAction::Deferred);
    }

    fn on_items_tracked(&self, batch: Uuid, items: &[WorkItem]) {
        for item in items {
            self.record(Some(batch), item.id, StatsAction::Tracked);
        }
    }

    fn on_will_dispatch(&self, item: &WorkItem, due_to_timeout: bool) {
        self.record(None, item.id, StatsAction::Dispatched { due_to_timeout });
    }
}
