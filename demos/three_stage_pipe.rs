//! # Three-Stage Pipe Example
//!
//! Same producer/consumer shape as `two_stage_pipe`, but over a
//! [`ThreeStage`] port (source slot, middle slot, sink slot). Each round
//! is a disciplined full round trip - `fill`, `push`, `pull`, `drain` -
//! handed off over a rendezvous channel, so every transition observed by
//! either thread matches the sequential scenario already exercised in
//! the integration test suite.
//!
//! ## Running
//!
//! ```bash
//! cargo run --example three_stage_pipe
//! ```

use std::sync::mpsc::sync_channel;
use std::sync::Arc;
use std::thread;

use port_fsm::{BlockingPolicy, PortFsm, ThreeStage};

const ITEMS: u32 = 5;

fn main() {
    println!("=== Three-Stage Pipe: {ITEMS} items through source -> middle -> sink ===\n");

    let fsm: Arc<PortFsm<ThreeStage, BlockingPolicy>> =
        Arc::new(PortFsm::with_resource(BlockingPolicy::new(), Default::default()));

    let (pushed_tx, pushed_rx) = sync_channel::<u32>(0);
    let (drained_tx, drained_rx) = sync_channel::<()>(0);

    let producer = {
        let fsm = Arc::clone(&fsm);
        thread::spawn(move || {
            for item in 1..=ITEMS {
                fsm.do_fill(Some(&format!("producer filling item {item}")));
                fsm.do_push(Some(&format!("producer pushing item {item} into the middle slot")));
                println!("  producer: item {item} now in the middle slot");
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
                fsm.do_pull(Some(&format!("consumer pulling item {item} into the sink slot")));
                fsm.do_drain(Some(&format!("consumer draining item {item}")));
                println!("  consumer: item {item} drained");
                drained_tx.send(()).expect("producer thread gone");
            }
        })
    };

    producer.join().expect("producer thread panicked");
    consumer.join().expect("consumer thread panicked");

    println!("\nDone. final state = {}", fsm.state());
}
