//! Timer fired by hand.

use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::{LivenessTimer, TimerTarget};

#[derive(Debug, Default, Clone, Copy)]
struct Armed {
    delay: Option<Duration>,
    starts: usize,
    stops: usize,
}

/// Records what the scheduler asks for and fires only when told to.
///
/// Pair it with [`ManualClock`](crate::util::clock::ManualClock): advance the
/// clock to the deadline, then call [`ManualTimer::fire`].
#[derive(Default)]
pub struct ManualTimer {
    armed: Mutex<Armed>,
    target: Mutex<Option<Weak<dyn TimerTarget>>>,
}

impl ManualTimer {
    /// Idle timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an expiry is pending.
    pub fn is_armed(&self) -> bool {
        self.armed.lock().delay.is_some()
    }

    /// Delay of the pending expiry.
    pub fn delay(&self) -> Option<Duration> {
        self.armed.lock().delay
    }

    /// Number of `start` calls.
    pub fn start_count(&self) -> usize {
        self.armed.lock().starts
    }

    /// Number of `stop` calls.
    pub fn stop_count(&self) -> usize {
        self.armed.lock().stops
    }

    /// Deliver the pending expiry, if any. Returns whether the target ran.
    pub fn fire(&self) -> bool {
        if self.armed.lock().delay.take().is_none() {
            return false;
        }
        let target = self.target.lock().as_ref().and_then(Weak::upgrade);
        match target {
            Some(target) => {
                target.on_timer_fired();
                true
            }
            None => false,
        }
    }

    /// Deliver an expiry whether or not one is pending, as a late timer would.
    pub fn fire_unconditionally(&self) {
        self.armed.lock().delay = None;
        let target = self.target.lock().as_ref().and_then(Weak::upgrade);
        if let Some(target) = target {
            target.on_timer_fired();
        }
    }
}

impl LivenessTimer for ManualTimer {
    fn bind(&self, target: Weak<dyn TimerTarget>) {
        *self.target.lock() = Some(target);
    }

    fn start(&self, delay: Duration) {
        let mut armed = self.armed.lock();
        armed.delay = Some(delay);
        armed.starts += 1;
    }

    fn stop(&self) {
        let mut armed = self.armed.lock();
        armed.delay = None;
        armed.stops += 1;
    }
}
