//! Liveness timer seam.
//!
//! The scheduler owns the deadline arithmetic and the "skip re-arm when the
//! deadline is unchanged" check; a timer only has to wait and call back.

use std::sync::Weak;
use std::time::Duration;

/// Callback target of a [`LivenessTimer`].
pub trait TimerTarget: Send + Sync {
    /// The armed delay elapsed.
    fn on_timer_fired(&self);
}

/// Cancellable one-shot timer.
pub trait LivenessTimer: Send + Sync {
    /// Attach the target fired on expiry. Called once by the scheduler after
    /// construction. Timers driven by hand may ignore it.
    fn bind(&self, target: Weak<dyn TimerTarget>) {
        let _ = target;
    }

    /// Fire once after `delay`, replacing any pending expiry.
    fn start(&self, delay: Duration);

    /// Cancel any pending expiry.
    fn stop(&self);
}
