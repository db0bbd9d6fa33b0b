//! The action policy contract and two concrete policies.
//!
//! A single mutex protects *both* the FSM's `state`/`next_state` fields
//! and whatever buffers the policy owns - the mutex and the action
//! policy are the only concurrent surface. [`Cell`] is that one mutex's
//! guarded payload: the driver's bookkeeping plus the policy's own
//! resource, so a policy callback that needs to touch its buffers is
//! working under the exact lock the driver already holds, not a second
//! one.

use std::sync::{Condvar, MutexGuard};

use crate::tables::StagePlan;

/// The payload behind a [`crate::PortFsm`]'s single mutex: the driver's
/// `state`/`next_state` bookkeeping plus whatever resource the
/// injected policy needs under the same lock.
pub struct Cell<St, R> {
    /// Current committed state.
    pub(crate) state: St,
    /// Scratch "next state" field, exposed for testing.
    pub(crate) next_state: St,
    /// Policy-owned resource (buffers, counters, ...).
    pub resource: R,
}

/// The pluggable component that implements blocking, signalling, and
/// data-moving primitives invoked by the driver.
///
/// Every callback receives the lock the driver is holding for the
/// duration of the current `event()` call. Implementations must uphold
/// this contract:
///
/// - `on_source_wait` / `on_sink_wait` atomically release the lock, wait
///   on a condition, and re-acquire the lock before returning. Spurious
///   wakes are permitted provided the driver is called again.
/// - `notify_source` / `notify_sink` signal the relevant condition
///   without releasing the lock.
/// - `on_source_move` / `on_sink_move` perform data movement and must
///   not release the lock.
/// - `on_ac_return` unwinds back to the caller; the driver short-circuits
///   after this returns.
pub trait ActionPolicy<S: StagePlan> {
    /// Resource type stored in [`Cell::resource`] - opaque to the
    /// driver, meaningful only to the policy (e.g. slot buffers,
    /// move counters).
    type Resource;

    /// Block the source until room is available, releasing the lock
    /// for the duration of the wait.
    fn on_source_wait<'a>(
        &self,
        guard: MutexGuard<'a, Cell<S::State, Self::Resource>>,
    ) -> MutexGuard<'a, Cell<S::State, Self::Resource>>;

    /// Block the sink until an item is available, releasing the lock
    /// for the duration of the wait.
    fn on_sink_wait<'a>(
        &self,
        guard: MutexGuard<'a, Cell<S::State, Self::Resource>>,
    ) -> MutexGuard<'a, Cell<S::State, Self::Resource>>;

    /// Wake a source waiting on [`Self::on_source_wait`]. Must not
    /// release the lock.
    fn notify_source(&self, guard: &MutexGuard<'_, Cell<S::State, Self::Resource>>);

    /// Wake a sink waiting on [`Self::on_sink_wait`]. Must not release
    /// the lock.
    fn notify_sink(&self, guard: &MutexGuard<'_, Cell<S::State, Self::Resource>>);

    /// Physically relocate an item out of the source slot. Must not
    /// release the lock.
    fn on_source_move(&self, guard: &mut MutexGuard<'_, Cell<S::State, Self::Resource>>);

    /// Physically relocate an item into the sink slot. Must not release
    /// the lock.
    fn on_sink_move(&self, guard: &mut MutexGuard<'_, Cell<S::State, Self::Resource>>);

    /// Unwind back to the caller. The driver short-circuits immediately
    /// after this returns (the `ac_return` action).
    fn on_ac_return(&self, guard: &MutexGuard<'_, Cell<S::State, Self::Resource>>);
}

/// A policy whose every callback is a no-op.
///
/// With a pass-through policy, the final state after a sequence of
/// events is a pure function of that sequence, because no callback can
/// block, retry, or otherwise introduce nondeterminism.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThroughPolicy;

impl<S: StagePlan> ActionPolicy<S> for PassThroughPolicy {
    type Resource = ();

    fn on_source_wait<'a>(
        &self,
        guard: MutexGuard<'a, Cell<S::State, ()>>,
    ) -> MutexGuard<'a, Cell<S::State, ()>> {
        guard
    }

    fn on_sink_wait<'a>(
        &self,
        guard: MutexGuard<'a, Cell<S::State, ()>>,
    ) -> MutexGuard<'a, Cell<S::State, ()>> {
        guard
    }

    fn notify_source(&self, _guard: &MutexGuard<'_, Cell<S::State, ()>>) {}

    fn notify_sink(&self, _guard: &MutexGuard<'_, Cell<S::State, ()>>) {}

    fn on_source_move(&self, _guard: &mut MutexGuard<'_, Cell<S::State, ()>>) {}

    fn on_sink_move(&self, _guard: &mut MutexGuard<'_, Cell<S::State, ()>>) {}

    fn on_ac_return(&self, _guard: &MutexGuard<'_, Cell<S::State, ()>>) {}
}

/// Move counters shared under the driver's mutex by [`BlockingPolicy`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MoveCounters {
    /// Number of times an item was moved out of the source slot.
    pub source_moves: u64,
    /// Number of times an item was moved into the sink slot.
    pub sink_moves: u64,
}

/// A real producer/consumer policy built on two [`Condvar`]s.
///
/// Tracks [`MoveCounters`] under the driver's own lock so tests and
/// demos can assert on it; actual payload movement is left to the
/// caller's own buffers - this core never touches payloads directly.
pub struct BlockingPolicy {
    source_ready: Condvar,
    sink_ready: Condvar,
}

impl Default for BlockingPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockingPolicy {
    /// Construct a policy with fresh, unsignalled condition variables.
    pub fn new() -> Self {
        Self {
            source_ready: Condvar::new(),
            sink_ready: Condvar::new(),
        }
    }
}

impl<S: StagePlan> ActionPolicy<S> for BlockingPolicy {
    type Resource = MoveCounters;

    fn on_source_wait<'a>(
        &self,
        guard: MutexGuard<'a, Cell<S::State, MoveCounters>>,
    ) -> MutexGuard<'a, Cell<S::State, MoveCounters>> {
        self.source_ready.wait(guard).expect("mutex poisoned")
    }

    fn on_sink_wait<'a>(
        &self,
        guard: MutexGuard<'a, Cell<S::State, MoveCounters>>,
    ) -> MutexGuard<'a, Cell<S::State, MoveCounters>> {
        self.sink_ready.wait(guard).expect("mutex poisoned")
    }

    fn notify_source(&self, _guard: &MutexGuard<'_, Cell<S::State, MoveCounters>>) {
        self.source_ready.notify_all();
    }

    fn notify_sink(&self, _guard: &MutexGuard<'_, Cell<S::State, MoveCounters>>) {
        self.sink_ready.notify_all();
    }

    fn on_source_move(&self, guard: &mut MutexGuard<'_, Cell<S::State, MoveCounters>>) {
        guard.resource.source_moves += 1;
    }

    fn on_sink_move(&self, guard: &mut MutexGuard<'_, Cell<S::State, MoveCounters>>) {
        guard.resource.sink_moves += 1;
    }

    fn on_ac_return(&self, _guard: &MutexGuard<'_, Cell<S::State, MoveCounters>>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::TwoStage;
    use std::sync::Mutex;

    #[test]
    fn pass_through_wait_returns_same_guard_without_blocking() {
        let mutex = Mutex::new(Cell {
            state: crate::state::TwoStageState::St00,
            next_state: crate::state::TwoStageState::St00,
            resource: (),
        });
        let guard = mutex.lock().unwrap();
        let policy = PassThroughPolicy;
        let guard = <PassThroughPolicy as ActionPolicy<TwoStage>>::on_source_wait(&policy, guard);
        assert_eq!(guard.state, crate::state::TwoStageState::St00);
    }

    #[test]
    fn blocking_policy_move_counters_increment_under_lock() {
        let mutex = Mutex::new(Cell {
            state: crate::state::TwoStageState::St10,
            next_state: crate::state::TwoStageState::St10,
            resource: MoveCounters::default(),
        });
        let policy = BlockingPolicy::new();
        let mut guard = mutex.lock().unwrap();
        <BlockingPolicy as ActionPolicy<TwoStage>>::on_source_move(&policy, &mut guard);
        <BlockingPolicy as ActionPolicy<TwoStage>>::on_sink_move(&policy, &mut guard);
        assert_eq!(guard.resource.source_moves, 1);
        assert_eq!(guard.resource.sink_moves, 1);
    }
}
