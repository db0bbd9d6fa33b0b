//! Canonical end-to-end scenarios from the specification's testable
//! properties section, run against a fresh FSM with a pass-through
//! policy so no callback can block, retry, or otherwise perturb the
//! sequence.

use port_fsm::{PassThroughPolicy, PortFsm, ThreeStage, ThreeStageState, TwoStage, TwoStageState};

fn two_stage() -> PortFsm<TwoStage, PassThroughPolicy> {
    PortFsm::new(PassThroughPolicy)
}

fn three_stage() -> PortFsm<ThreeStage, PassThroughPolicy> {
    PortFsm::new(PassThroughPolicy)
}

/// Scenario 1: two-stage `fill, push, pull, drain` ends back at `st_00`,
/// passing through the post-move collapse on `push`.
#[test]
fn two_stage_fill_push_pull_drain_returns_to_empty() {
    let fsm = two_stage();
    assert_eq!(fsm.state(), TwoStageState::St00);

    fsm.do_fill(None);
    assert_eq!(fsm.state(), TwoStageState::St10);

    fsm.do_push(None);
    assert_eq!(fsm.state(), TwoStageState::St01);

    fsm.do_pull(None);
    assert_eq!(fsm.state(), TwoStageState::St01);

    fsm.do_drain(None);
    assert_eq!(fsm.state(), TwoStageState::St00);
}

/// Scenario 2: two-stage `pull, fill, push, drain` - the leading `pull`
/// triggers a `sink_wait` from `st_00`; with a pass-through policy the
/// wait returns immediately and the state is left unchanged.
#[test]
fn two_stage_leading_pull_waits_then_unchanged_sequence_continues() {
    let fsm = two_stage();

    fsm.do_pull(None);
    assert_eq!(fsm.state(), TwoStageState::St00);

    fsm.do_fill(None);
    assert_eq!(fsm.state(), TwoStageState::St10);

    fsm.do_push(None);
    assert_eq!(fsm.state(), TwoStageState::St01);

    fsm.do_drain(None);
    assert_eq!(fsm.state(), TwoStageState::St00);
}

/// Scenario 3: three-stage, a second `fill` from `st_100` is illegal
/// (the tables route it to `error`); with a pass-through policy (no
/// `source_wait` discipline) the error transition is actually observed.
#[test]
fn three_stage_double_fill_without_wait_discipline_reaches_error() {
    let fsm = three_stage();

    fsm.do_fill(None);
    assert_eq!(fsm.state(), ThreeStageState::St100);

    fsm.do_fill(None);
    assert_eq!(fsm.state(), ThreeStageState::Error);
}

/// Scenario 4: three-stage `fill, push, pull, drain` collapses to
/// `st_001` on push, has no collapse on pull (already at the collapsed
/// target), and returns to `st_000` on drain.
#[test]
fn three_stage_fill_push_pull_drain_returns_to_empty() {
    let fsm = three_stage();

    fsm.do_fill(None);
    assert_eq!(fsm.state(), ThreeStageState::St100);

    fsm.do_push(None);
    assert_eq!(fsm.state(), ThreeStageState::St001);

    fsm.do_pull(None);
    assert_eq!(fsm.state(), ThreeStageState::St001);

    fsm.do_drain(None);
    assert_eq!(fsm.state(), ThreeStageState::St000);
}

/// Scenario 5: three-stage pipelined `fill, push, fill, push, pull,
/// drain, pull, drain` - repeated fills at `st_001` yield `st_101`, then
/// collapse during the second push.
#[test]
fn three_stage_pipelined_fills_collapse_on_second_push() {
    let fsm = three_stage();

    fsm.do_fill(None);
    assert_eq!(fsm.state(), ThreeStageState::St100);

    fsm.do_push(None);
    assert_eq!(fsm.state(), ThreeStageState::St001);

    fsm.do_fill(None);
    assert_eq!(fsm.state(), ThreeStageState::St101);

    fsm.do_push(None);
    assert_eq!(fsm.state(), ThreeStageState::St011);

    fsm.do_pull(None);
    assert_eq!(fsm.state(), ThreeStageState::St011);

    fsm.do_drain(None);
    assert_eq!(fsm.state(), ThreeStageState::St010);

    fsm.do_pull(None);
    assert_eq!(fsm.state(), ThreeStageState::St001);

    fsm.do_drain(None);
    assert_eq!(fsm.state(), ThreeStageState::St000);
}

/// Scenario 6: `shutdown` never changes state, in either stage count.
#[test]
fn shutdown_is_neutral_in_both_stage_counts() {
    let two = two_stage();
    two.do_fill(None);
    assert_eq!(two.state(), TwoStageState::St10);
    two.shutdown(None);
    assert_eq!(two.state(), TwoStageState::St10);

    let three = three_stage();
    three.do_fill(None);
    assert_eq!(three.state(), ThreeStageState::St100);
    three.shutdown(None);
    assert_eq!(three.state(), ThreeStageState::St100);
}

/// P1 (determinism): the final state after a sequence is a pure function
/// of that sequence when the policy is pass-through.
#[test]
fn determinism_same_sequence_same_final_state() {
    use port_fsm::PortEvent::*;

    let sequence = [SourceFill, SourcePush, SourceFill, SinkPull, SinkDrain];

    let run = || {
        let fsm = three_stage();
        for evt in sequence {
            match evt {
                SourceFill => fsm.do_fill(None),
                SourcePush => fsm.do_push(None),
                SinkDrain => fsm.do_drain(None),
                SinkPull => fsm.do_pull(None),
                Shutdown => fsm.shutdown(None),
            }
        }
        fsm.state()
    };

    assert_eq!(run(), run());
}
