//! Memory pressure source driven by explicit signals.

use std::sync::Weak;

use parking_lot::Mutex;
use tracing::debug;

use crate::core::{MemoryMonitor, MemoryPressureObserver, PressureLevel, SubscriptionId};
use crate::infra::observers::ObserverList;

/// Monitor whose level is set by the embedder (or a test).
pub struct InMemoryPressureMonitor {
    level: Mutex<PressureLevel>,
    observers: ObserverList<dyn MemoryPressureObserver>,
}

impl InMemoryPressureMonitor {
    /// Monitor reporting no pressure.
    pub fn new() -> Self {
        Self {
            level: Mutex::new(PressureLevel::None),
            observers: ObserverList::new(),
        }
    }

    /// Record `level` and broadcast it. Every signal is delivered, repeated
    /// levels included.
    pub fn signal(&self, level: PressureLevel) {
        *self.level.lock() = level;
        debug!(?level, "memory pressure signalled");
        for observer in self.observers.live() {
            observer.on_memory_pressure(level);
        }
    }

    /// Change the polled level without notifying anyone.
    pub fn set_level(&self, level: PressureLevel) {
        *self.level.lock() = level;
    }
}

impl Default for InMemoryPressureMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMonitor for InMemoryPressureMonitor {
    fn current_level(&self) -> PressureLevel {
        *self.level.lock()
    }

    fn subscribe(&self, observer: Weak<dyn MemoryPressureObserver>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.observers.unsubscribe(id);
    }
}
