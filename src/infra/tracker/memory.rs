//! In-memory load tracker.

use std::collections::HashMap;
use std::sync::Weak;

use parking_lot::Mutex;
use tracing::trace;

use crate::core::{ItemId, LoadObserver, LoadState, LoadTracker, SubscriptionId};
use crate::infra::observers::ObserverList;

/// Tracker whose states are driven by whoever performs the work.
///
/// Observers are notified after the state map is released, so they may read
/// the tracker (or drive further transitions) from inside the callback.
pub struct InMemoryLoadTracker {
    states: Mutex<HashMap<ItemId, LoadState>>,
    observers: ObserverList<dyn LoadObserver>,
}

impl InMemoryLoadTracker {
    /// Empty tracker; every item starts unloaded.
    pub fn new() -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            observers: ObserverList::new(),
        }
    }

    /// Record `item` as being in `state`, notifying observers on change.
    /// Returns the previous state.
    pub fn transition(&self, item: impl Into<ItemId>, state: LoadState) -> LoadState {
        let item = item.into();
        let old = {
            let mut states = self.states.lock();
            let old = states.get(&item).copied().unwrap_or(LoadState::Unloaded);
            if old == state {
                return old;
            }
            states.insert(item, state);
            old
        };
        trace!(%item, ?old, new = ?state, "load state changed");
        for observer in self.observers.live() {
            observer.on_loading_state_change(item, old, state);
        }
        old
    }

    /// Forget `item`. Observers hear about it only if it was known.
    pub fn stop_tracking(&self, item: impl Into<ItemId>) {
        let item = item.into();
        let last = self.states.lock().remove(&item);
        if let Some(last) = last {
            for observer in self.observers.live() {
                observer.on_stop_tracking(item, last);
            }
        }
    }

    /// Items currently loading.
    pub fn loading_count(&self) -> usize {
        self.count(LoadState::Loading)
    }

    /// Items currently loaded.
    pub fn loaded_count(&self) -> usize {
        self.count(LoadState::Loaded)
    }

    /// Live subscribers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn count(&self, state: LoadState) -> usize {
        self.states.lock().values().filter(|s| **s == state).count()
    }
}

impl Default for InMemoryLoadTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadTracker for InMemoryLoadTracker {
    fn current_state(&self, id: ItemId) -> LoadState {
        self.states
            .lock()
            .get(&id)
            .copied()
            .unwrap_or(LoadState::Unloaded)
    }

    fn subscribe(&self, observer: Weak<dyn LoadObserver>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.observers.unsubscribe(id);
    }
}
