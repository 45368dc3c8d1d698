//! Serializable request/response models for embedding the scheduler behind
//! an API.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::{BatchCoordinator, WorkItem};

pub use crate::core::SchedulerSnapshot;

/// One item of a submitted batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRequest {
    /// Item identifier.
    pub id: u64,
    /// Foreground item.
    #[serde(default)]
    pub priority: bool,
    /// Seconds since the item was last active, if known.
    #[serde(default)]
    pub idle_secs: Option<u64>,
    /// Importance score.
    #[serde(default)]
    pub priority_score: u32,
}

impl ItemRequest {
    /// Convert into a work item, resolving idle age against `now`.
    pub fn into_item(self, now: Instant) -> WorkItem {
        let mut item = WorkItem::new(self.id).with_priority_score(self.priority_score);
        item.is_priority = self.priority;
        if let Some(last) = self
            .idle_secs
            .and_then(|secs| now.checked_sub(Duration::from_secs(secs)))
        {
            item = item.with_last_active(last);
        }
        item
    }
}

/// Batch submission payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSubmission {
    /// Items in submission order.
    pub items: Vec<ItemRequest>,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Submit a batch through a coordinator and report the resulting state.
pub fn submit_batch(
    coordinator: &BatchCoordinator,
    req: BatchSubmission,
    now: Instant,
) -> Result<SchedulerSnapshot, String> {
    let items = req
        .items
        .into_iter()
        .map(|item| item.into_item(now))
        .collect();
    coordinator
        .submit(items)
        .map(|scheduler| scheduler.snapshot())
        .map_err(|e| e.to_string())
}

/// Return a health payload.
pub const fn health() -> Health {
    Health { ok: true }
}
