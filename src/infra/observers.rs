//! Weak observer registry shared by the in-memory event sources.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::core::SubscriptionId;

/// Subscribers held weakly. Dropped observers are pruned on the next
/// notification.
pub(crate) struct ObserverList<T: ?Sized> {
    entries: Mutex<Vec<(SubscriptionId, Weak<T>)>>,
    next_id: AtomicU64,
}

impl<T: ?Sized> ObserverList<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn subscribe(&self, observer: Weak<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) {
        self.entries.lock().retain(|(sub, _)| *sub != id);
    }

    /// Live observers. The registry lock is released before the caller
    /// notifies anyone, so observers may subscribe or unsubscribe re-entrantly.
    pub(crate) fn live(&self) -> Vec<Arc<T>> {
        let mut entries = self.entries.lock();
        entries.retain(|(_, weak)| weak.strong_count() > 0);
        entries.iter().filter_map(|(_, weak)| weak.upgrade()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }
}
