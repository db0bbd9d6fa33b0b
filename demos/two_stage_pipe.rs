//! # Two-Stage Pipe Example
//!
//! Drives a [`TwoStage`] port from a producer thread and a consumer
//! thread, using [`BlockingPolicy`] so each side genuinely parks on a
//! condition variable rather than busy-waiting. Grounded on the
//! `Arc<Mutex<...>>` two-thread shape from the teacher's
//! `concurrent_threads` example, adapted from task dispatch to a bounded
//! staging pipe.
//!
//! The producer and consumer hand off over a rendezvous channel, one
//! item per round - the port itself gives a caller no fill-side
//! backpressure (only `push`, from a full source slot, actually blocks),
//! so a disciplined caller alternates the two sides rather than racing
//! them.
//!
//! ## Running
//!
//! ```bash
//! cargo run --example two_stage_pipe
//! ```

use std::sync::mpsc::sync_channel;
use std::sync::Arc;
use std::thread;

use port_fsm::{BlockingPolicy, PortFsm, TwoStage};

const ITEMS: u32 = 5;

fn main() {
    println!("=== Two-Stage Pipe: {ITEMS} items through a single source/sink port ===\n");

    let fsm: Arc<PortFsm<TwoStage, BlockingPolicy>> =
        Arc::new(PortFsm::with_resource(BlockingPolicy::new(), Default::default()));

    let (pushed_tx, pushed_rx) = sync_channel::<u32>(0);
    let (drained_tx, drained_rx) = sync_channel::<()>(0);

    let producer = {
        let fsm = Arc::clone(&fsm);
        thread::spawn(move || {
            for item in 1..=ITEMS {
                fsm.do_fill(Some(&format!("producer filling item {item}")));
                fsm.do_push(Some(&format!("producer pushing item {item}")));
                println!("  producer: item {item} pushed toward the sink");
                pushed_tx.send(item).expect("consumer thread gone");
                drained_rx.recv().expect("consumer thread gone");
            }
        })
    };

    let consumer = {
        let fsm = Arc::clone(&fsm);
        thread::spawn(move || {
            for _ in 1..=ITEMS {
                let item = pushed_rx.recv().expect("producer thread gone");
                fsm.do_pull(Some(&format!("consumer pulling for item {item}")));
                fsm.do_drain(Some(&format!("consumer draining item {item}")));
                println!("  consumer: item {item} drained");
                drained_tx.send(()).expect("producer thread gone");
            }
        })
    };

    producer.join().expect("producer thread panicked");
    consumer.join().expect("consumer thread panicked");

    fsm.inspect_resource(|counters| {
        println!(
            "\nDone. final state = {}, source_moves = {}, sink_moves = {}",
            fsm.state(),
            counters.source_moves,
            counters.sink_moves
        );
    });
}
