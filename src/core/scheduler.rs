//! Staggered work scheduler.
//!
//! Every tracked item lives in exactly one of three sets:
//!
//! - `pending`: FIFO of items not yet dispatched,
//! - `dispatch_requested`: dispatched, waiting for the tracker to confirm,
//! - `running`: confirmed loading, ordered by `(dispatch time, id)`.
//!
//! Items move `pending -> dispatch_requested -> running -> (gone)`, or straight
//! into `running` when they were already loading at submission. The liveness
//! timer is armed exactly when loading is enabled, something is pending and
//! something is running; it expires relative to the earliest running item and
//! its period doubles after every forced timeout.
//!
//! All state sits behind a [`ReentrantMutex`]: one thread drives the scheduler
//! at a time, and that thread may re-enter it from inside any call-out (a
//! launcher that reports progress synchronously, a timer that is already
//! overdue). Interior borrows are released before every call-out. Public entry
//! points bump a depth counter; the drain check that ends the scheduler's life
//! runs only when the counter returns to zero, so disposal never happens while
//! one of its own frames is still on the stack.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::{Mutex, ReentrantMutex};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::delegate::Delegate;
use crate::core::error::SchedulerError;
use crate::core::item::{Disposition, ItemId, ItemPhase, LoadState, PressureLevel, WorkItem};
use crate::core::launcher::WorkLauncher;
use crate::core::memory::{MemoryMonitor, MemoryPressureObserver};
use crate::core::policy::{AdmissionPolicy, UNBOUNDED};
use crate::core::stats::StatsSink;
use crate::core::timer::{LivenessTimer, TimerTarget};
use crate::core::tracker::{LoadObserver, LoadTracker, SubscriptionId};
use crate::util::clock::Clock;

/// External components the scheduler talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Platform cap, timeouts and load-start notifications.
    pub delegate: Arc<dyn Delegate>,
    /// Source of truth for loading state.
    pub tracker: Arc<dyn LoadTracker>,
    /// Starts the work behind admitted items.
    pub launcher: Arc<dyn WorkLauncher>,
    /// Receives deferred items and dispatch notices.
    pub stats: Arc<dyn StatsSink>,
    /// Liveness timer.
    pub timer: Arc<dyn LivenessTimer>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Optional memory pressure source.
    pub memory: Option<Arc<dyn MemoryMonitor>>,
}

/// Point-in-time view of scheduler bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    /// Items waiting for admission.
    pub pending: usize,
    /// Items dispatched but not confirmed.
    pub dispatch_requested: usize,
    /// Items confirmed loading.
    pub running: usize,
    /// Items ever counted as started.
    pub scheduled_count: usize,
    /// Resolved cap, if resolved.
    pub concurrency_cap: Option<usize>,
    /// Current timeout multiplier.
    pub backoff_multiplier: u32,
    /// Whether new dispatches are allowed.
    pub loading_enabled: bool,
    /// Whether the exclusive phase is over.
    pub first_item_completed: bool,
    /// Whether the liveness timer is armed.
    pub timer_armed: bool,
    /// Whether the scheduler drained and was disposed.
    pub finished: bool,
}

struct SchedulerState {
    pending: VecDeque<WorkItem>,
    dispatch_requested: HashSet<ItemId>,
    running: BTreeSet<(Instant, ItemId)>,
    scheduled_count: usize,
    concurrency_cap: Option<usize>,
    backoff_multiplier: u32,
    loading_enabled: bool,
    first_item_completed: bool,
    armed_deadline: Option<Instant>,
    started: bool,
    finished: bool,
    tracker_subscription: Option<SubscriptionId>,
    memory_subscription: Option<SubscriptionId>,
}

impl SchedulerState {
    fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            dispatch_requested: HashSet::new(),
            running: BTreeSet::new(),
            scheduled_count: 0,
            concurrency_cap: None,
            backoff_multiplier: 1,
            loading_enabled: true,
            first_item_completed: false,
            armed_deadline: None,
            started: false,
            finished: false,
            tracker_subscription: None,
            memory_subscription: None,
        }
    }

    fn in_flight(&self) -> usize {
        self.running.len() + self.dispatch_requested.len()
    }

    fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.dispatch_requested.is_empty() && self.running.is_empty()
    }

    fn timer_wanted(&self) -> bool {
        self.loading_enabled && !self.pending.is_empty() && !self.running.is_empty()
    }

    fn phase_of(&self, id: ItemId) -> Option<ItemPhase> {
        if self.dispatch_requested.contains(&id) {
            Some(ItemPhase::DispatchRequested)
        } else if self.running.iter().any(|(_, r)| *r == id) {
            Some(ItemPhase::Running)
        } else if self.pending.iter().any(|i| i.id == id) {
            Some(ItemPhase::Pending)
        } else {
            None
        }
    }

    /// Drop `id` from whichever set holds it. Returns false if untracked.
    fn remove(&mut self, id: ItemId) -> bool {
        if self.dispatch_requested.remove(&id) {
            return true;
        }
        if let Some(entry) = self.running.iter().find(|(_, r)| *r == id).copied() {
            self.running.remove(&entry);
            return true;
        }
        if let Some(pos) = self.pending.iter().position(|i| i.id == id) {
            self.pending.remove(pos);
            return true;
        }
        false
    }

    /// Index of the next pending item allowed to dispatch under the capacity
    /// rule and the exclusive phase.
    fn next_eligible(&self) -> Option<usize> {
        let in_flight = self.in_flight();
        if in_flight >= self.concurrency_cap.unwrap_or(UNBOUNDED) {
            return None;
        }
        if self.first_item_completed {
            return (!self.pending.is_empty()).then_some(0);
        }
        // Exclusive phase: foreground items only, except that an idle
        // scheduler with no foreground work may start its first item.
        let first_priority = self.pending.iter().position(|i| i.is_priority);
        if in_flight == 0 && first_priority.is_none() && !self.pending.is_empty() {
            return Some(0);
        }
        first_priority
    }
}

struct Core {
    state: RefCell<SchedulerState>,
    policy: RefCell<AdmissionPolicy>,
    depth: Cell<usize>,
}

type FinishedHook = Box<dyn FnOnce() + Send>;

/// Bounded-concurrency scheduler for one or more overlapping batches.
pub struct WorkScheduler {
    core: ReentrantMutex<Core>,
    deps: Collaborators,
    scheduled_load_limit: usize,
    on_finished: Mutex<Option<FinishedHook>>,
}

impl WorkScheduler {
    /// Create a scheduler and subscribe it to its event sources.
    ///
    /// `scheduled_load_limit` stops loading once that many items were counted
    /// as started (`0` = no limit).
    pub fn new(
        policy: AdmissionPolicy,
        deps: Collaborators,
        scheduled_load_limit: usize,
    ) -> Arc<Self> {
        let scheduler = Arc::new(Self {
            core: ReentrantMutex::new(Core {
                state: RefCell::new(SchedulerState::new()),
                policy: RefCell::new(policy),
                depth: Cell::new(0),
            }),
            deps,
            scheduled_load_limit,
            on_finished: Mutex::new(None),
        });

        let observer: Weak<dyn LoadObserver> = Arc::downgrade(&scheduler) as Weak<dyn LoadObserver>;
        let tracker_subscription = scheduler.deps.tracker.subscribe(observer);
        let memory_subscription = scheduler.deps.memory.as_ref().map(|monitor| {
            let observer: Weak<dyn MemoryPressureObserver> =
                Arc::downgrade(&scheduler) as Weak<dyn MemoryPressureObserver>;
            monitor.subscribe(observer)
        });
        let target: Weak<dyn TimerTarget> = Arc::downgrade(&scheduler) as Weak<dyn TimerTarget>;
        scheduler.deps.timer.bind(target);

        {
            let core = scheduler.core.lock();
            let mut state = core.state.borrow_mut();
            state.tracker_subscription = Some(tracker_subscription);
            state.memory_subscription = memory_subscription;
        }
        scheduler
    }

    /// Register a callback fired once, when the scheduler drains.
    pub fn on_finished(&self, hook: impl FnOnce() + Send + 'static) {
        *self.on_finished.lock() = Some(Box::new(hook));
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    /// Submit a batch. Items already loading go straight to `running`; the
    /// rest queue in order. The first submission resolves the concurrency cap.
    ///
    /// The batch is rejected as a whole if any item is already tracked or
    /// repeated, or if the scheduler has been disposed.
    pub fn submit_batch(&self, items: Vec<WorkItem>) -> Result<Disposition, SchedulerError> {
        if items.is_empty() {
            return Err(SchedulerError::EmptyBatch);
        }
        let (result, disposition) = self.enter(|core| self.submit_locked(core, items));
        result.map(|()| disposition)
    }

    /// Try to dispatch more pending items.
    pub fn maybe_dispatch_more(&self) -> Disposition {
        self.enter(|core| self.dispatch_locked(core, false)).1
    }

    /// Loading-state transition reported by the tracker.
    pub fn on_progress(&self, id: ItemId, old: LoadState, new: LoadState) -> Disposition {
        self.enter(|core| {
            debug!(item = %id, ?old, ?new, "progress");
            match new {
                LoadState::Loading => self.mark_loading(core, id),
                LoadState::Loaded | LoadState::Unloaded => self.mark_completed(core, id),
            }
            self.start_timer_if_needed(core);
            self.dispatch_locked(core, false);
        })
        .1
    }

    /// The tracker stopped tracking `id`; forget it without ending the
    /// exclusive phase.
    pub fn on_stop_tracking(&self, id: ItemId) -> Disposition {
        self.enter(|core| {
            if core.state.borrow_mut().remove(id) {
                debug!(item = %id, "item no longer tracked externally");
            }
            self.start_timer_if_needed(core);
            self.dispatch_locked(core, false);
        })
        .1
    }

    /// Memory pressure signal. Anything above `none` stops loading and defers
    /// every pending item.
    pub fn on_memory_pressure(&self, level: PressureLevel) -> Disposition {
        self.enter(|core| {
            if level != PressureLevel::None {
                warn!(?level, "memory pressure, stopping loads");
                self.set_loading_locked(core, false);
            }
        })
        .1
    }

    /// Enable or disable dispatching.
    ///
    /// Disabling defers every pending item and stops treating running items
    /// as timeout sources; dispatched work is never cancelled. Re-enabling
    /// resumes dispatch for items submitted afterwards.
    pub fn set_loading_enabled(&self, enabled: bool) -> Disposition {
        self.enter(|core| self.set_loading_locked(core, enabled)).1
    }

    /// Liveness timeout: double the backoff, stop waiting on the earliest
    /// running item and dispatch one more item regardless of capacity.
    ///
    /// Ignored when there is nothing to advance (disabled, nothing pending or
    /// nothing running).
    pub fn force_timeout(&self) -> Disposition {
        self.enter(|core| self.force_timeout_locked(core)).1
    }

    /// Replace the concurrency cap. Only allowed outside any scheduler call.
    pub fn override_concurrency_cap(&self, cap: usize) -> Result<(), SchedulerError> {
        let core = self.core.lock();
        if core.depth.get() != 0 {
            return Err(SchedulerError::ReentrantReconfiguration);
        }
        core.state.borrow_mut().concurrency_cap = Some(cap.max(1));
        debug!(cap, "concurrency cap overridden");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Items waiting for admission.
    pub fn pending_len(&self) -> usize {
        self.read(|s| s.pending.len())
    }

    /// Pending item ids in dispatch order.
    pub fn pending_items(&self) -> Vec<ItemId> {
        self.read(|s| s.pending.iter().map(|i| i.id).collect())
    }

    /// Items dispatched but not yet confirmed loading.
    pub fn dispatch_requested_len(&self) -> usize {
        self.read(|s| s.dispatch_requested.len())
    }

    /// Items confirmed loading.
    pub fn running_len(&self) -> usize {
        self.read(|s| s.running.len())
    }

    /// `running + dispatch_requested`.
    pub fn in_flight_len(&self) -> usize {
        self.read(SchedulerState::in_flight)
    }

    /// Items ever counted as started.
    pub fn scheduled_count(&self) -> usize {
        self.read(|s| s.scheduled_count)
    }

    /// Resolved concurrency cap, once a batch has been submitted.
    pub fn concurrency_cap(&self) -> Option<usize> {
        self.read(|s| s.concurrency_cap)
    }

    /// Current timeout multiplier.
    pub fn backoff_multiplier(&self) -> u32 {
        self.read(|s| s.backoff_multiplier)
    }

    /// Whether dispatching is enabled.
    pub fn is_loading_enabled(&self) -> bool {
        self.read(|s| s.loading_enabled)
    }

    /// Whether the exclusive phase has ended.
    pub fn first_item_completed(&self) -> bool {
        self.read(|s| s.first_item_completed)
    }

    /// Instant the liveness timer is armed for.
    pub fn timer_deadline(&self) -> Option<Instant> {
        self.read(|s| s.armed_deadline)
    }

    /// Whether the scheduler drained and was disposed.
    pub fn is_finished(&self) -> bool {
        self.read(|s| s.finished)
    }

    /// Number of scheduler calls currently on the stack.
    pub fn reentrancy_depth(&self) -> usize {
        self.core.lock().depth.get()
    }

    /// Items admitted by the scheduler's policy so far.
    pub fn items_started(&self) -> usize {
        let core = self.core.lock();
        let started = core.policy.borrow().items_started();
        started
    }

    /// Which set holds `id`, if any.
    pub fn item_phase(&self, id: ItemId) -> Option<ItemPhase> {
        self.read(|s| s.phase_of(id))
    }

    /// Snapshot of all counters and flags.
    pub fn snapshot(&self) -> SchedulerSnapshot {
        self.read(|s| SchedulerSnapshot {
            pending: s.pending.len(),
            dispatch_requested: s.dispatch_requested.len(),
            running: s.running.len(),
            scheduled_count: s.scheduled_count,
            concurrency_cap: s.concurrency_cap,
            backoff_multiplier: s.backoff_multiplier,
            loading_enabled: s.loading_enabled,
            first_item_completed: s.first_item_completed,
            timer_armed: s.armed_deadline.is_some(),
            finished: s.finished,
        })
    }

    /// Check set exclusivity and, outside any call, timer and disposal
    /// consistency.
    pub fn verify_invariants(&self) -> Result<(), SchedulerError> {
        let core = self.core.lock();
        let state = core.state.borrow();

        let mut seen = HashSet::new();
        let tracked = state
            .pending
            .iter()
            .map(|i| i.id)
            .chain(state.dispatch_requested.iter().copied())
            .chain(state.running.iter().map(|(_, id)| *id));
        for id in tracked {
            if !seen.insert(id) {
                return Err(SchedulerError::InvariantViolation(format!(
                    "{id} is held by more than one set"
                )));
            }
        }

        if core.depth.get() == 0 {
            if state.timer_wanted() != state.armed_deadline.is_some() {
                return Err(SchedulerError::InvariantViolation(format!(
                    "timer armed = {}, expected {}",
                    state.armed_deadline.is_some(),
                    state.timer_wanted()
                )));
            }
            if state.finished != (state.started && state.is_drained()) {
                return Err(SchedulerError::InvariantViolation(
                    "disposal flag disagrees with drained sets".into(),
                ));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals. Everything below runs with the core lock held and depth > 0.
    // ------------------------------------------------------------------

    fn read<R>(&self, f: impl FnOnce(&SchedulerState) -> R) -> R {
        let core = self.core.lock();
        let state = core.state.borrow();
        f(&state)
    }

    /// Run `op` as a counted entry. On the way out of the outermost entry the
    /// timer invariant is restored and the drain check runs.
    fn enter<R>(&self, op: impl FnOnce(&Core) -> R) -> (R, Disposition) {
        let guard = self.core.lock();
        let core: &Core = &guard;
        core.depth.set(core.depth.get() + 1);
        let out = op(core);
        self.start_timer_if_needed(core);
        let depth = core.depth.get() - 1;
        core.depth.set(depth);
        if depth != 0 {
            return (out, Disposition::Active);
        }
        let disposition = self.settle(core);
        (out, disposition)
    }

    fn settle(&self, core: &Core) -> Disposition {
        let (tracker_subscription, memory_subscription, was_armed, scheduled) = {
            let mut state = core.state.borrow_mut();
            if state.finished {
                return Disposition::Finished;
            }
            if !state.started || !state.is_drained() {
                return Disposition::Active;
            }
            state.finished = true;
            (
                state.tracker_subscription.take(),
                state.memory_subscription.take(),
                state.armed_deadline.take().is_some(),
                state.scheduled_count,
            )
        };

        if was_armed {
            self.deps.timer.stop();
        }
        if let Some(id) = tracker_subscription {
            self.deps.tracker.unsubscribe(id);
        }
        if let (Some(monitor), Some(id)) = (self.deps.memory.as_ref(), memory_subscription) {
            monitor.unsubscribe(id);
        }
        info!(scheduled, "all items drained, scheduler finished");

        let hook = self.on_finished.lock().take();
        if let Some(hook) = hook {
            hook();
        }
        Disposition::Finished
    }

    fn submit_locked(&self, core: &Core, items: Vec<WorkItem>) -> Result<(), SchedulerError> {
        {
            let state = core.state.borrow();
            if state.finished {
                return Err(SchedulerError::Disposed);
            }
            let mut seen = HashSet::with_capacity(items.len());
            for item in &items {
                if !seen.insert(item.id) || state.phase_of(item.id).is_some() {
                    return Err(SchedulerError::DuplicateItem(item.id));
                }
            }
        }

        let batch = Uuid::new_v4();
        self.resolve_concurrency_cap(core);
        core.state.borrow_mut().started = true;
        self.deps.stats.on_items_tracked(batch, &items);

        let count = items.len();
        for item in items {
            self.add_item(core, item);
        }
        info!(%batch, count, pending = core.state.borrow().pending.len(), "batch submitted");

        self.start_timer_if_needed(core);
        self.dispatch_locked(core, false);
        Ok(())
    }

    fn resolve_concurrency_cap(&self, core: &Core) {
        if core.state.borrow().concurrency_cap.is_some() {
            return;
        }
        let platform = match self.deps.delegate.max_simultaneous_loads() {
            0 => UNBOUNDED,
            n => n,
        };
        let policy_cap = core.policy.borrow().concurrency_cap();
        let cap = platform.min(policy_cap).max(1);
        core.state.borrow_mut().concurrency_cap = Some(cap);
        debug!(cap, "concurrency cap resolved");
    }

    fn add_item(&self, core: &Core, item: WorkItem) {
        let load_state = self.deps.tracker.current_state(item.id);
        if load_state == LoadState::Unloaded {
            core.state.borrow_mut().pending.push_back(item);
            return;
        }

        // Started outside our control: count it, track it only while loading.
        let now = self.deps.clock.now();
        {
            let mut state = core.state.borrow_mut();
            state.scheduled_count += 1;
            if load_state == LoadState::Loading {
                state.running.insert((now, item.id));
            }
        }
        core.policy.borrow_mut().notify_admitted();
        self.deps.delegate.notify_load_started();
        debug!(item = %item.id, ?load_state, "item already started");
    }

    fn mark_loading(&self, core: &Core, id: ItemId) {
        let now = self.deps.clock.now();
        let started_externally = {
            let mut state = core.state.borrow_mut();
            if state.dispatch_requested.remove(&id) {
                state.running.insert((now, id));
                false
            } else if let Some(pos) = state.pending.iter().position(|i| i.id == id) {
                state.pending.remove(pos);
                state.running.insert((now, id));
                state.scheduled_count += 1;
                true
            } else {
                return;
            }
        };
        if started_externally {
            core.policy.borrow_mut().notify_admitted();
            self.deps.delegate.notify_load_started();
            debug!(item = %id, "pending item started externally");
        }
    }

    fn mark_completed(&self, core: &Core, id: ItemId) {
        let mut state = core.state.borrow_mut();
        // Any finished load ends the exclusive phase, tracked or not.
        state.first_item_completed = true;
        if state.remove(id) {
            debug!(item = %id, in_flight = state.in_flight(), "item completed");
        }
    }

    fn set_loading_locked(&self, core: &Core, enabled: bool) {
        let changed = {
            let mut state = core.state.borrow_mut();
            let changed = state.loading_enabled != enabled;
            state.loading_enabled = enabled;
            changed
        };

        if enabled {
            if changed {
                info!("loading enabled");
                self.start_timer_if_needed(core);
                self.dispatch_locked(core, false);
            }
            return;
        }

        // Loads started before or while disabled no longer count toward
        // timeouts, otherwise they could all expire together on re-enable.
        let deferred: Vec<WorkItem> = {
            let mut state = core.state.borrow_mut();
            state.running.clear();
            state.pending.drain(..).collect()
        };
        if changed || !deferred.is_empty() {
            info!(deferred = deferred.len(), "loading disabled");
        }
        for item in &deferred {
            self.deps.stats.on_item_deferred(item);
        }
        self.start_timer_if_needed(core);
    }

    fn should_stop_loading(&self, core: &Core) -> bool {
        if self.scheduled_load_limit != 0
            && core.state.borrow().scheduled_count >= self.scheduled_load_limit
        {
            return true;
        }
        self.deps
            .memory
            .as_ref()
            .is_some_and(|m| m.current_level() != PressureLevel::None)
    }

    /// Dispatch while capacity allows. With `forced` the first dispatch skips
    /// the capacity rule and the exclusive phase.
    fn dispatch_locked(&self, core: &Core, mut forced: bool) {
        debug_assert!(core.depth.get() > 0);
        loop {
            {
                let state = core.state.borrow();
                if !state.loading_enabled || state.pending.is_empty() {
                    return;
                }
            }
            // Checked before every dispatch so pressure takes effect at once.
            if self.should_stop_loading(core) {
                warn!("load limit or memory pressure reached, stopping loads");
                self.set_loading_locked(core, false);
                return;
            }

            let next = {
                let mut state = core.state.borrow_mut();
                let index = if forced { Some(0) } else { state.next_eligible() };
                index.and_then(|i| state.pending.remove(i))
            };
            let Some(item) = next else {
                return;
            };

            let decision = core.policy.borrow().evaluate(&item, self.deps.clock.now());
            if !decision.is_admit() {
                info!(item = %item.id, ?decision, "item rejected by admission policy");
                self.deps.stats.on_item_deferred(&item);
                continue;
            }

            {
                let mut state = core.state.borrow_mut();
                state.dispatch_requested.insert(item.id);
                state.scheduled_count += 1;
            }
            core.policy.borrow_mut().notify_admitted();
            self.deps.stats.on_will_dispatch(&item, forced);
            self.deps.delegate.notify_load_started();
            debug!(item = %item.id, forced, priority = item.is_priority, "dispatching item");
            forced = false;

            // The launcher may re-enter us, so the timer invariant has to
            // hold before control leaves.
            self.start_timer_if_needed(core);
            self.deps.launcher.launch(&item);
        }
    }

    fn force_timeout_locked(&self, core: &Core) {
        let (expired, multiplier, was_armed) = {
            let mut state = core.state.borrow_mut();
            if !state.timer_wanted() {
                debug!("forced timeout ignored, nothing to advance");
                return;
            }
            let was_armed = state.armed_deadline.take().is_some();
            state.first_item_completed = true;
            state.backoff_multiplier = state.backoff_multiplier.saturating_mul(2);
            // Only bookkeeping advances; the external work keeps going.
            let expired = state.running.pop_first().map(|(_, id)| id);
            (expired, state.backoff_multiplier, was_armed)
        };
        if was_armed {
            self.deps.timer.stop();
        }
        if let Some(id) = expired {
            warn!(item = %id, multiplier, "load timed out, forcing next dispatch");
        }
        self.dispatch_locked(core, true);
        self.start_timer_if_needed(core);
    }

    fn start_timer_if_needed(&self, core: &Core) {
        let (earliest, first_done, multiplier, armed) = {
            let state = core.state.borrow();
            let earliest = if state.timer_wanted() {
                state.running.first().map(|(at, _)| *at)
            } else {
                None
            };
            (
                earliest,
                state.first_item_completed,
                state.backoff_multiplier,
                state.armed_deadline,
            )
        };

        let Some(earliest) = earliest else {
            if armed.is_some() {
                core.state.borrow_mut().armed_deadline = None;
                self.deps.timer.stop();
            }
            return;
        };

        let base = if first_done {
            self.deps.delegate.timeout_period()
        } else {
            self.deps.delegate.first_item_timeout()
        };
        let Some(deadline) = earliest.checked_add(base.saturating_mul(multiplier)) else {
            warn!(multiplier, "liveness deadline out of range, timer left idle");
            if armed.is_some() {
                core.state.borrow_mut().armed_deadline = None;
                self.deps.timer.stop();
            }
            return;
        };
        // Same target as the pending expiry: let it fire.
        if armed == Some(deadline) {
            return;
        }

        core.state.borrow_mut().armed_deadline = Some(deadline);
        self.deps.timer.stop();
        let delay = deadline.saturating_duration_since(self.deps.clock.now());
        if delay.is_zero() {
            self.force_timeout_locked(core);
        } else {
            debug!(?delay, multiplier, "liveness timer armed");
            self.deps.timer.start(delay);
        }
    }
}

impl LoadObserver for WorkScheduler {
    fn on_loading_state_change(&self, id: ItemId, old: LoadState, new: LoadState) {
        self.on_progress(id, old, new);
    }

    fn on_stop_tracking(&self, id: ItemId, _last: LoadState) {
        Self::on_stop_tracking(self, id);
    }
}

impl MemoryPressureObserver for WorkScheduler {
    fn on_memory_pressure(&self, level: PressureLevel) {
        Self::on_memory_pressure(self, level);
    }
}

impl TimerTarget for WorkScheduler {
    fn on_timer_fired(&self) {
        self.enter(|core| {
            let deadline = core.state.borrow().armed_deadline;
            match deadline {
                Some(at) if self.deps.clock.now() >= at => self.force_timeout_locked(core),
                _ => debug!("stale timer expiry ignored"),
            }
        });
    }
}

impl std::fmt::Debug for WorkScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkScheduler")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}
