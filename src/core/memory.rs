//! Memory pressure seam.

use std::sync::Weak;

use crate::core::item::PressureLevel;
use crate::core::tracker::SubscriptionId;

/// Receives pressure level changes.
pub trait MemoryPressureObserver: Send + Sync {
    /// The system pressure level changed.
    fn on_memory_pressure(&self, level: PressureLevel);
}

/// Source of memory pressure signals.
pub trait MemoryMonitor: Send + Sync {
    /// Level right now. Read before every dispatch.
    fn current_level(&self) -> PressureLevel;
    /// Register an observer, held weakly.
    fn subscribe(&self, observer: Weak<dyn MemoryPressureObserver>) -> SubscriptionId;
    /// Remove an observer.
    fn unsubscribe(&self, id: SubscriptionId);
}
