//! Work item model and the small value types shared by every component.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Opaque identity of a unit of deferred work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// A unit of deferred work as submitted to the scheduler.
///
/// Only `id` participates in identity. The remaining fields are the per-item
/// snapshot the admission policy reads.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Identity of the external work.
    pub id: ItemId,
    /// Foreground item; allowed to load during the exclusive phase.
    pub is_priority: bool,
    /// When the item was last in use, if known. Drives the idle-age threshold.
    pub last_active: Option<Instant>,
    /// Importance score. Drives the priority-score threshold.
    pub priority_score: u32,
}

impl WorkItem {
    /// Background item with no activity information and a zero score.
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            is_priority: false,
            last_active: None,
            priority_score: 0,
        }
    }

    /// Foreground item.
    pub fn priority(id: impl Into<ItemId>) -> Self {
        Self {
            is_priority: true,
            ..Self::new(id)
        }
    }

    /// Set the last-active instant.
    #[must_use]
    pub fn with_last_active(mut self, at: Instant) -> Self {
        self.last_active = Some(at);
        self
    }

    /// Set the priority score.
    #[must_use]
    pub fn with_priority_score(mut self, score: u32) -> Self {
        self.priority_score = score;
        self
    }
}

impl PartialEq for WorkItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WorkItem {}

/// Loading state as reported by the load tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// Not loaded, or the load was aborted.
    Unloaded,
    /// Load in progress.
    Loading,
    /// Load finished.
    Loaded,
}

/// System memory pressure signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureLevel {
    /// No pressure.
    None,
    /// Resources are getting scarce.
    Moderate,
    /// Resources are exhausted.
    Critical,
}

/// Which of the three scheduler sets currently holds an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemPhase {
    /// Waiting for admission.
    Pending,
    /// Dispatched, waiting for the tracker to confirm the load began.
    DispatchRequested,
    /// Confirmed loading.
    Running,
}

/// What the owner should do with its handle once an outermost call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Work remains; keep the handle.
    Active,
    /// Every item drained; drop the handle.
    Finished,
}

impl Disposition {
    /// True once the scheduler has drained.
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}
