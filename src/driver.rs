//! The mutex-protected event driver (spec §4.2, §4.3).

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::action::PortAction;
use crate::event::PortEvent;
use crate::policy::{ActionPolicy, Cell};
use crate::tables::StagePlan;
use crate::__port_fsm_log;

/// Process-wide, monotonically increasing event counter (spec §9):
/// diagnostic only, shared across every [`PortFsm`] instance in the
/// process.
static EVENT_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_counter() -> u64 {
    EVENT_COUNTER.fetch_add(1, Ordering::Relaxed) + 1
}

/// Which phase an action is being applied in - controls whether a
/// `source_move`/`sink_move` triggers the post-move collapse (spec §4.3,
/// entry phase only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionPhase {
    Exit,
    Entry,
}

/// A mutex-protected producer/consumer port state machine, generic over
/// a compile-time stage count `S` and an injected action policy `P`
/// (spec §9).
///
/// Construct with [`PortFsm::new`], drive it with [`PortFsm::do_fill`],
/// [`PortFsm::do_push`], [`PortFsm::do_pull`], [`PortFsm::do_drain`], and
/// observe it with [`PortFsm::state`].
pub struct PortFsm<S: StagePlan, P: ActionPolicy<S>> {
    cell: Mutex<Cell<S::State, P::Resource>>,
    policy: P,
    debug: AtomicBool,
}

impl<S: StagePlan, P: ActionPolicy<S>> PortFsm<S, P> {
    /// Construct a new port state machine in the initial state (all
    /// slots empty), with a default-initialised policy resource.
    pub fn new(policy: P) -> Self
    where
        P::Resource: Default,
    {
        Self::with_resource(policy, P::Resource::default())
    }

    /// Construct a new port state machine with an explicit initial
    /// policy resource.
    pub fn with_resource(policy: P, resource: P::Resource) -> Self {
        Self {
            cell: Mutex::new(Cell {
                state: S::initial(),
                next_state: S::initial(),
                resource,
            }),
            policy,
            debug: AtomicBool::new(false),
        }
    }

    /// The source deposits an item into its slot.
    pub fn do_fill(&self, msg: Option<&str>) {
        self.event(PortEvent::SourceFill, msg)
    }

    /// An item advances one step from the source side toward the sink
    /// side.
    pub fn do_push(&self, msg: Option<&str>) {
        self.event(PortEvent::SourcePush, msg)
    }

    /// The sink removes an item from its slot.
    pub fn do_drain(&self, msg: Option<&str>) {
        self.event(PortEvent::SinkDrain, msg)
    }

    /// An item advances into the sink's slot.
    pub fn do_pull(&self, msg: Option<&str>) {
        self.event(PortEvent::SinkPull, msg)
    }

    /// Reserved no-op hook (spec §4.2 step 2, §5, §9): the tables route
    /// `shutdown` to `error` from every state, but the driver intercepts
    /// and suppresses the transition. Preserved as observed behaviour.
    pub fn shutdown(&self, msg: Option<&str>) {
        self.event(PortEvent::Shutdown, msg)
    }

    /// The currently committed state.
    pub fn state(&self) -> S::State {
        self.lock().state
    }

    /// The scratch "next state" field (spec §3); exposed for testing.
    pub fn next_state(&self) -> S::State {
        self.lock().next_state
    }

    /// Force the committed state; for testing only (spec §6).
    pub fn set_state(&self, state: S::State) {
        self.lock().state = state;
    }

    /// Force the scratch "next state" field; for testing only (spec §6).
    pub fn set_next_state(&self, state: S::State) {
        self.lock().next_state = state;
    }

    /// Enable per-instance trace emission on every subsequent call,
    /// regardless of whether a diagnostic message is supplied (spec §6).
    pub fn enable_debug(&self) {
        self.debug.store(true, Ordering::Relaxed);
    }

    /// Disable per-instance trace emission (spec §6); calls with a
    /// non-empty message still trace.
    pub fn disable_debug(&self) {
        self.debug.store(false, Ordering::Relaxed);
    }

    /// Borrow the injected policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Run a closure against the policy's resource under the driver's
    /// own lock - useful in tests and demos that want to observe move
    /// counters or similar bookkeeping without racing the driver.
    pub fn inspect_resource<T>(&self, f: impl FnOnce(&P::Resource) -> T) -> T {
        f(&self.lock().resource)
    }

    fn lock(&self) -> MutexGuard<'_, Cell<S::State, P::Resource>> {
        self.cell.lock().expect("port fsm mutex poisoned")
    }

    /// The single event-processing entry point every `do_*` wrapper
    /// dispatches to (spec §4.2).
    fn event(&self, evt: PortEvent, msg: Option<&str>) {
        let counter = next_counter();
        let trace_enabled = self.debug.load(Ordering::Relaxed) || msg.is_some_and(|m| !m.is_empty());

        let mut guard = self.lock();

        // Step 1: compute next state + both actions from the state as of
        // entry to this call, and record next_state in the shared scratch
        // field (spec §3: next_state is FSM instance state, not a private
        // local - a concurrent event() interleaved during a later wait
        // can observe and overwrite it).
        let old_state = guard.state;
        let next_state_val = S::next(old_state, evt);
        let exit_action = S::exit_action(old_state, evt);
        let preview_entry_action = S::entry_action(next_state_val, evt);
        guard.next_state = next_state_val;

        self.maybe_trace(
            trace_enabled,
            "on-event-start",
            counter,
            msg,
            evt,
            old_state,
            exit_action,
            preview_entry_action,
            next_state_val,
        );

        // Step 2: shutdown is a reserved no-op. Must not mutate `state`.
        if evt == PortEvent::Shutdown {
            return;
        }

        self.maybe_trace(
            trace_enabled,
            "pre-exit",
            counter,
            msg,
            evt,
            old_state,
            exit_action,
            preview_entry_action,
            next_state_val,
        );

        // Step 4: exit phase.
        let (mut guard, exit_short_circuit) =
            self.apply_action(ActionPhase::Exit, exit_action, guard);

        self.maybe_trace(
            trace_enabled,
            "post-exit",
            counter,
            msg,
            evt,
            guard.state,
            exit_action,
            preview_entry_action,
            guard.next_state,
        );

        if exit_short_circuit {
            return;
        }

        // Step 5: commit. Reads the scratch field, which may have moved
        // while this call was parked in a wait (see the comment above).
        guard.state = guard.next_state;

        // Step 6: recompute the entry action against the just-committed
        // state, not the step-1 preview (spec §9 open question). Must
        // happen before the pre-entry trace below, since an exit-phase
        // wait can change the effective state and the preview would
        // otherwise report the wrong entry action.
        let entry_action = S::entry_action(guard.state, evt);

        self.maybe_trace(
            trace_enabled,
            "pre-entry",
            counter,
            msg,
            evt,
            guard.state,
            exit_action,
            entry_action,
            guard.next_state,
        );

        // Step 7: entry phase, with post-move collapse (spec §4.3).
        let (guard, entry_short_circuit) =
            self.apply_action(ActionPhase::Entry, entry_action, guard);

        if entry_short_circuit {
            return;
        }

        self.maybe_trace(
            trace_enabled,
            "post-entry",
            counter,
            msg,
            evt,
            guard.state,
            exit_action,
            entry_action,
            guard.next_state,
        );
    }

    /// Apply one exit- or entry-phase action. Returns the (possibly
    /// reacquired, after a wait) guard and whether the caller short
    /// -circuited on `ac_return`.
    ///
    /// Kept as its own method so the `ac_return` and logic-fault branches
    /// - neither reachable through the shipped tables - are directly
    /// unit-testable (spec §9's open question: tests must not assume
    /// `ac_return` is unreachable).
    fn apply_action<'a>(
        &self,
        phase: ActionPhase,
        action: PortAction,
        mut guard: MutexGuard<'a, Cell<S::State, P::Resource>>,
    ) -> (MutexGuard<'a, Cell<S::State, P::Resource>>, bool) {
        match action {
            PortAction::None => {}
            PortAction::AcReturn => {
                self.policy.on_ac_return(&guard);
                return (guard, true);
            }
            PortAction::SourceMove => {
                self.policy.on_source_move(&mut guard);
                if phase == ActionPhase::Entry {
                    guard.state = S::collapse(guard.state);
                }
            }
            PortAction::SinkMove => {
                self.policy.on_sink_move(&mut guard);
                if phase == ActionPhase::Entry {
                    guard.state = S::collapse(guard.state);
                }
            }
            PortAction::NotifySource => self.policy.notify_source(&guard),
            PortAction::NotifySink => self.policy.notify_sink(&guard),
            PortAction::SourceWait => {
                guard = self.policy.on_source_wait(guard);
            }
            PortAction::SinkWait => {
                guard = self.policy.on_sink_wait(guard);
            }
            PortAction::Error => Self::logic_fault(phase, action),
        }
        (guard, false)
    }

    /// Spec §7: an action outside the declared exit/entry alphabet is a
    /// fatal logic fault that unwinds the caller. `PortAction::Error` is
    /// the one declared-but-never-tabulated sentinel that reaches here;
    /// this should be unreachable through the shipped tables.
    fn logic_fault(phase: ActionPhase, action: PortAction) -> ! {
        panic!(
            "port-fsm: {:?} phase produced action `{}`, which is outside the \
             declared exit/entry alphabet - this is a logic fault",
            phase,
            action.name()
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn maybe_trace(
        &self,
        enabled: bool,
        phase: &str,
        counter: u64,
        msg: Option<&str>,
        evt: PortEvent,
        state: S::State,
        exit_action: PortAction,
        entry_action: PortAction,
        next_state: S::State,
    ) {
        if !enabled {
            return;
        }
        __port_fsm_log!(
            "port-fsm phase={} counter={} msg={:?} event={} state={} exit_action={} entry_action={} next_state={}",
            phase,
            counter,
            msg.unwrap_or(""),
            evt.name(),
            state,
            exit_action.name(),
            entry_action.name(),
            next_state
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PassThroughPolicy;
    use crate::state::TwoStageState;
    use crate::tables::TwoStage;

    fn fresh() -> PortFsm<TwoStage, PassThroughPolicy> {
        PortFsm::new(PassThroughPolicy)
    }

    #[test]
    fn starts_in_all_empty_state() {
        let fsm = fresh();
        assert_eq!(fsm.state(), TwoStageState::St00);
    }

    #[test]
    fn fill_then_push_moves_and_collapses_to_st01() {
        let fsm = fresh();
        fsm.do_fill(None);
        assert_eq!(fsm.state(), TwoStageState::St10);
        fsm.do_push(None);
        assert_eq!(fsm.state(), TwoStageState::St01);
    }

    #[test]
    fn shutdown_never_changes_state() {
        let fsm = fresh();
        fsm.do_fill(None);
        assert_eq!(fsm.state(), TwoStageState::St10);
        fsm.shutdown(None);
        assert_eq!(fsm.state(), TwoStageState::St10);
    }

    #[test]
    fn set_state_and_set_next_state_are_testing_hooks() {
        let fsm = fresh();
        fsm.set_state(TwoStageState::St11);
        fsm.set_next_state(TwoStageState::St01);
        assert_eq!(fsm.state(), TwoStageState::St11);
        assert_eq!(fsm.next_state(), TwoStageState::St01);
    }

    #[test]
    fn debug_toggle_does_not_panic_without_logging_feature() {
        let fsm = fresh();
        fsm.enable_debug();
        fsm.do_fill(None);
        fsm.disable_debug();
        fsm.do_push(Some("trace this one"));
    }

    #[test]
    fn ac_return_short_circuits_without_touching_state() {
        let fsm = fresh();
        let guard = fsm.lock();
        let (_, short_circuited) = fsm.apply_action(ActionPhase::Exit, PortAction::AcReturn, guard);
        assert!(short_circuited);
    }

    #[test]
    #[should_panic(expected = "logic fault")]
    fn error_action_is_a_fatal_logic_fault() {
        let fsm = fresh();
        let guard = fsm.lock();
        let _ = fsm.apply_action(ActionPhase::Exit, PortAction::Error, guard);
    }

    /// P4: an entry-phase move action always leaves the state at a
    /// collapsed target, even from a state the tables would never reach
    /// via this particular event (spec §4.3's collapse is unconditional
    /// on phase, not on how the state got there).
    #[test]
    fn entry_phase_source_move_collapses_two_stage_state() {
        let fsm = fresh();
        fsm.set_state(TwoStageState::St10);
        let guard = fsm.lock();
        let (guard, short_circuited) =
            fsm.apply_action(ActionPhase::Entry, PortAction::SourceMove, guard);
        assert!(!short_circuited);
        assert_eq!(guard.state, TwoStageState::St01);
    }

    #[test]
    fn exit_phase_move_action_does_not_collapse() {
        let fsm = fresh();
        fsm.set_state(TwoStageState::St10);
        let guard = fsm.lock();
        let (guard, _) = fsm.apply_action(ActionPhase::Exit, PortAction::SourceMove, guard);
        assert_eq!(guard.state, TwoStageState::St10);
    }

    /// Spec §3's mutex invariant: the lock is never held past the return
    /// of a `do_*` call.
    #[test]
    fn mutex_is_released_after_event_returns() {
        let fsm = fresh();
        fsm.do_fill(None);
        assert!(fsm.cell.try_lock().is_ok());
    }
}
