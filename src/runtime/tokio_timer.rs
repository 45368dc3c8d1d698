//! Tokio-backed liveness timer and clock.

use std::sync::Weak;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::AbortHandle;
use tracing::trace;

use crate::core::{LivenessTimer, TimerTarget};
use crate::util::clock::Clock;

/// Clock that follows tokio's time, including paused test time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// One-shot timer that sleeps on a tokio runtime and then calls its target.
///
/// Use it together with [`TokioClock`] so the scheduler's deadline check and
/// the sleep agree on what "now" is.
pub struct TokioTimer {
    handle: tokio::runtime::Handle,
    target: Mutex<Option<Weak<dyn TimerTarget>>>,
    pending: Mutex<Option<AbortHandle>>,
}

impl TokioTimer {
    /// Timer spawning on `handle`.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle,
            target: Mutex::new(None),
            pending: Mutex::new(None),
        }
    }

    /// Timer bound to the runtime of the calling task.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }

    /// Whether a sleep is outstanding.
    pub fn is_armed(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl LivenessTimer for TokioTimer {
    fn bind(&self, target: Weak<dyn TimerTarget>) {
        *self.target.lock() = Some(target);
    }

    fn start(&self, delay: Duration) {
        let Some(target) = self.target.lock().clone() else {
            tracing::warn!("timer started before a target was bound");
            return;
        };
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(target) = target.upgrade() {
                target.on_timer_fired();
            }
        });
        trace!(?delay, "timer armed");
        if let Some(previous) = self.pending.lock().replace(task.abort_handle()) {
            previous.abort();
        }
    }

    fn stop(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        if let Some(task) = self.pending.get_mut().take() {
            task.abort();
        }
    }
}
