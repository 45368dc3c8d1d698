//! Load tracker seam: the source of truth for whether an item is loading.

use std::sync::Weak;

use crate::core::item::{ItemId, LoadState};

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Receives loading transitions from a [`LoadTracker`].
pub trait LoadObserver: Send + Sync {
    /// An item moved between loading states.
    fn on_loading_state_change(&self, id: ItemId, old: LoadState, new: LoadState);
    /// The tracker forgot about an item (e.g. it was closed).
    fn on_stop_tracking(&self, id: ItemId, last: LoadState);
}

/// Event source reporting item loading state.
///
/// Observers are held weakly; an observer that has been dropped is skipped.
pub trait LoadTracker: Send + Sync {
    /// Current state of `id`. Unknown items read as [`LoadState::Unloaded`].
    fn current_state(&self, id: ItemId) -> LoadState;
    /// Register an observer.
    fn subscribe(&self, observer: Weak<dyn LoadObserver>) -> SubscriptionId;
    /// Remove an observer. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}
