//! # port-fsm: Mutex-Protected Port State Machine
//!
//! A table-driven, policy-injected finite state machine that coordinates
//! producer/consumer handoff across a bounded staging area with either
//! one intermediate slot (two-stage) or two intermediate slots
//! (three-stage).
//!
//! ## Design Philosophy
//!
//! - **Table-Driven:** next-state, exit-action, and entry-action are
//!   immutable lookup tables, not branching logic - the tables are the
//!   single source of truth for what each transition does.
//! - **Policy Injection:** blocking, signalling, and data-movement are
//!   supplied by a caller-provided [`ActionPolicy`], generic and
//!   statically dispatched (no `dyn`).
//! - **Single Mutex:** one lock protects both the driver's bookkeeping
//!   and the policy's resource for the entire duration of an event,
//!   including any wait the policy performs.
//! - **Stage-Count Generic:** the same driver serves both two-stage and
//!   three-stage pipes via the [`StagePlan`] trait; stage count is
//!   chosen at compile time, not threaded through as a runtime value.
//!
//! ## Quick Start
//!
//! ```
//! use port_fsm::{PortFsm, PassThroughPolicy, TwoStage, TwoStageState};
//!
//! let fsm: PortFsm<TwoStage, PassThroughPolicy> = PortFsm::new(PassThroughPolicy);
//! assert_eq!(fsm.state(), TwoStageState::St00);
//!
//! fsm.do_fill(None);
//! assert_eq!(fsm.state(), TwoStageState::St10);
//!
//! fsm.do_push(None);
//! assert_eq!(fsm.state(), TwoStageState::St01); // post-move collapse
//!
//! fsm.do_pull(None);
//! fsm.do_drain(None);
//! assert_eq!(fsm.state(), TwoStageState::St00);
//! ```
//!
//! ## Real producer/consumer usage
//!
//! For actual cross-thread blocking, pair the driver with
//! [`BlockingPolicy`], which parks waiting threads on a pair of
//! [`std::sync::Condvar`]s rather than returning immediately. See
//! `demos/two_stage_pipe.rs` and `demos/three_stage_pipe.rs`.
//!
//! ## What this crate deliberately does not do
//!
//! It does not schedule tasks, build node graphs, or move data payloads
//! - it only signals when a move is allowed. Those concerns belong to
//! the policy and to the caller.

mod action;
mod driver;
mod event;
mod logging;
mod policy;
mod state;
mod tables;

pub use action::PortAction;
pub use driver::PortFsm;
pub use event::PortEvent;
pub use policy::{ActionPolicy, BlockingPolicy, Cell, MoveCounters, PassThroughPolicy};
pub use state::{ThreeStageState, TwoStageState};
pub use tables::{StagePlan, ThreeStage, TwoStage};
