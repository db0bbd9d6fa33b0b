//! # Logging Example: Tracing Every Port Transition
//!
//! Demonstrates the optional `logging` feature: when enabled, every
//! `event()` call emits `log::trace!` records for its on-event-start,
//! pre-exit, post-exit, pre-entry, and post-entry phases, keyed by a
//! process-wide monotonic counter. Without the feature, none of this
//! code is compiled in - zero cost.
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=trace cargo run --example logging --features logging
//! ```

use port_fsm::{PassThroughPolicy, PortFsm, TwoStage, TwoStageState};

fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Trace)
        .format_timestamp_millis()
        .init();
}

fn main() {
    println!("=== Logging Example: Port FSM Instrumentation ===\n");

    init_logger();

    println!("Run with RUST_LOG=trace to see every phase of each transition.\n");

    let fsm: PortFsm<TwoStage, PassThroughPolicy> = PortFsm::new(PassThroughPolicy);
    fsm.enable_debug();

    assert_eq!(fsm.state(), TwoStageState::St00);
    fsm.do_fill(Some("operator loaded the source slot"));
    fsm.do_push(Some("operator advanced the item toward the sink"));
    fsm.do_pull(Some("operator checked the sink slot"));
    fsm.do_drain(Some("operator drained the sink slot"));
    assert_eq!(fsm.state(), TwoStageState::St00);

    fsm.shutdown(Some("operator requested shutdown"));
    assert_eq!(fsm.state(), TwoStageState::St00);

    println!("\nDone. final state = {}", fsm.state());
}
