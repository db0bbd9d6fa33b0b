//! Transition, exit-action and entry-action tables, and the `StagePlan`
//! trait that lets [`crate::PortFsm`] stay a single generic driver over
//! either stage count.
//!
//! The tables below are the authoritative definition of every
//! transition; do not "simplify" or "fix" an entry without re-checking
//! it against every row it touches.

use crate::action::PortAction;
use crate::event::PortEvent;
use crate::state::{ThreeStageState, TwoStageState};

/// A compile-time stage-count plan: the associated state alphabet plus
/// the three tables and the post-move collapse rule that go with it.
///
/// One zero-sized type implements this per stage count ([`TwoStage`],
/// [`ThreeStage`]); [`crate::PortFsm`] is generic over `S: StagePlan`
/// rather than over a runtime stage count, matching spec §9's
/// "do not expose the stage count dynamically unless required".
pub trait StagePlan {
    /// The state alphabet for this stage count.
    type State: Copy + Eq + core::fmt::Debug + core::fmt::Display;

    /// The initial state: all slots empty.
    fn initial() -> Self::State;

    /// `next_table[state][event]` (spec §4.1).
    fn next(state: Self::State, event: PortEvent) -> Self::State;

    /// `exit_table[state][event]` (spec §4.1).
    fn exit_action(state: Self::State, event: PortEvent) -> PortAction;

    /// `entry_table[state][event]` (spec §4.1). The driver calls this
    /// with the *next* state and the *current* event, per spec §4.2 step 1
    /// and step 6 - see spec §9's open question on this lookup shape.
    fn entry_action(state: Self::State, event: PortEvent) -> PortAction;

    /// Post-move state collapse (spec §4.3), applied after an
    /// entry-phase `source_move`/`sink_move`.
    fn collapse(state: Self::State) -> Self::State;
}

/// Stage-count marker for a two-stage port: one source slot, one sink
/// slot, one intermediate hop.
#[derive(Debug, Clone, Copy)]
pub struct TwoStage;

use TwoStageState as S2;

const S2_N: usize = 6;
const EV_N: usize = 5;

#[rustfmt::skip]
const TWO_STAGE_NEXT: [[S2; EV_N]; S2_N] = [
    // fill,     push,     drain,    pull,     shutdown
    [S2::St10, S2::St00, S2::Error, S2::St00, S2::Error], // st_00
    [S2::St11, S2::St01, S2::St00,  S2::St01, S2::Error], // st_01
    [S2::Error, S2::St01, S2::Error, S2::St01, S2::Error], // st_10
    [S2::Error, S2::St11, S2::St10,  S2::St11, S2::Error], // st_11
    [S2::Error, S2::Error, S2::Error, S2::Error, S2::Error], // error
    [S2::Error, S2::Error, S2::Error, S2::Error, S2::Error], // done
];

#[rustfmt::skip]
const TWO_STAGE_EXIT: [[PortAction; EV_N]; S2_N] = {
    use PortAction::*;
    [
        [None, None, None, SinkWait, None],   // st_00
        [None, None, None, None, None],        // st_01
        [None, SourceMove, None, SinkMove, None], // st_10
        [None, SourceWait, None, None, None],  // st_11
        [None, None, None, None, None],        // error
        [None, None, None, None, None],        // done
    ]
};

#[rustfmt::skip]
const TWO_STAGE_ENTRY: [[PortAction; EV_N]; S2_N] = {
    use PortAction::*;
    [
        [None, None, NotifySource, None, None], // st_00
        [None, None, None, None, None],          // st_01
        [NotifySink, SourceMove, NotifySource, SinkMove, None], // st_10
        [NotifySink, None, None, None, None],    // st_11
        [None, None, None, None, None],          // error
        [None, None, None, None, None],          // done
    ]
};

impl StagePlan for TwoStage {
    type State = TwoStageState;

    fn initial() -> Self::State {
        TwoStageState::St00
    }

    fn next(state: Self::State, event: PortEvent) -> Self::State {
        TWO_STAGE_NEXT[state.index()][event.index()]
    }

    fn exit_action(state: Self::State, event: PortEvent) -> PortAction {
        TWO_STAGE_EXIT[state.index()][event.index()]
    }

    fn entry_action(state: Self::State, event: PortEvent) -> PortAction {
        TWO_STAGE_ENTRY[state.index()][event.index()]
    }

    fn collapse(_state: Self::State) -> Self::State {
        // Two-stage: the only valid post-move configuration is st_01.
        TwoStageState::St01
    }
}

/// Stage-count marker for a three-stage port: one source slot, one
/// middle slot, one sink slot, two intermediate hops.
#[derive(Debug, Clone, Copy)]
pub struct ThreeStage;

use ThreeStageState as S3;

const S3_N: usize = 10;

#[rustfmt::skip]
const THREE_STAGE_NEXT: [[S3; EV_N]; S3_N] = [
    // fill,      push,      drain,     pull,      shutdown
    [S3::St100, S3::St000, S3::Error,  S3::St000, S3::Error], // st_000
    [S3::St101, S3::St001, S3::St000,  S3::St001, S3::Error], // st_001
    [S3::St110, S3::St001, S3::Error,  S3::St001, S3::Error], // st_010
    [S3::St111, S3::St011, S3::St010,  S3::St011, S3::Error], // st_011
    [S3::Error, S3::St001, S3::Error,  S3::St001, S3::Error], // st_100
    [S3::Error, S3::St011, S3::St100,  S3::St011, S3::Error], // st_101
    [S3::Error, S3::St011, S3::Error,  S3::St011, S3::Error], // st_110
    [S3::Error, S3::St111, S3::St110,  S3::St111, S3::Error], // st_111
    [S3::Error, S3::Error, S3::Error,  S3::Error, S3::Error], // error
    [S3::Error, S3::Error, S3::Error,  S3::Error, S3::Error], // done
];

#[rustfmt::skip]
const THREE_STAGE_EXIT: [[PortAction; EV_N]; S3_N] = {
    use PortAction::*;
    [
        [None, None, None, SinkWait, None],          // st_000
        [None, None, None, None, None],               // st_001
        [None, SourceMove, None, SinkMove, None],      // st_010
        [None, None, None, None, None],                // st_011
        [None, SourceMove, None, SinkMove, None],      // st_100
        [None, SourceMove, None, SinkMove, None],      // st_101
        [None, SourceMove, None, SinkMove, None],      // st_110
        [None, SourceWait, None, None, None],          // st_111
        [None, None, None, None, None],                // error
        [None, None, None, None, None],                // done
    ]
};

#[rustfmt::skip]
const THREE_STAGE_ENTRY: [[PortAction; EV_N]; S3_N] = {
    use PortAction::*;
    [
        [None, None, NotifySource, None, None],                       // st_000
        [None, None, None, None, None],                                 // st_001
        [None, SourceMove, NotifySource, SinkMove, None],               // st_010
        [None, None, None, None, None],                                 // st_011
        [NotifySink, SourceMove, NotifySource, SinkMove, None],         // st_100
        [NotifySink, SourceMove, None, SinkMove, None],                 // st_101
        [NotifySink, SourceMove, NotifySource, SinkMove, None],         // st_110
        [NotifySink, None, None, None, None],                           // st_111
        [None, None, None, None, None],                                 // error
        [None, None, None, None, None],                                 // done
    ]
};

impl StagePlan for ThreeStage {
    type State = ThreeStageState;

    fn initial() -> Self::State {
        ThreeStageState::St000
    }

    fn next(state: Self::State, event: PortEvent) -> Self::State {
        THREE_STAGE_NEXT[state.index()][event.index()]
    }

    fn exit_action(state: Self::State, event: PortEvent) -> PortAction {
        THREE_STAGE_EXIT[state.index()][event.index()]
    }

    fn entry_action(state: Self::State, event: PortEvent) -> PortAction {
        THREE_STAGE_ENTRY[state.index()][event.index()]
    }

    fn collapse(state: Self::State) -> Self::State {
        match state {
            ThreeStageState::St010 | ThreeStageState::St100 => ThreeStageState::St001,
            ThreeStageState::St110 | ThreeStageState::St101 => ThreeStageState::St011,
            other => other,
        }
    }
}
