//! Batch-replay latency harness.
//!
//! Replays a feed (a JSONL file given as the first argument, or the
//! built-in synthetic feed) through a fresh book repeatedly, timing each
//! batch of ten rows. Reports hdrhistogram percentiles plus the
//! mean/sd/score summary.

use std::time::Instant;

use hdrhistogram::Histogram;
use tickgrid::replay::{parse_jsonl, synthetic_feed, FeedCommand};
use tickgrid::Engine;

const BATCH_SIZE: usize = 10;
const REPLAYS: usize = 200;
const SYNTHETIC_ROWS: usize = 20_000;
const PRICE_MULT: u32 = 100;

fn main() {
    let feed = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).unwrap_or_else(|err| {
                eprintln!("cannot read feed file {path}: {err}");
                std::process::exit(1);
            });
            parse_jsonl(&text, PRICE_MULT).unwrap_or_else(|err| {
                eprintln!("cannot decode feed file {path}: {err}");
                std::process::exit(1);
            })
        }
        None => synthetic_feed(SYNTHETIC_ROWS),
    };

    println!("Replaying {} rows x {} rounds (batch = {})...", feed.len(), REPLAYS, BATCH_SIZE);

    let mut engine = Engine::new();
    engine.set_execution_handler(|_| {});
    engine.warm_up();

    let mut histogram = Histogram::<u64>::new_with_bounds(1, 1_000_000_000, 3).unwrap();
    let mut batch_ns = Vec::with_capacity(REPLAYS * (feed.len() / BATCH_SIZE + 1));
    let mut rejected = 0u64;

    for _ in 0..REPLAYS {
        engine.reset();

        for batch in feed.chunks(BATCH_SIZE) {
            let begin = Instant::now();
            for command in batch {
                match *command {
                    FeedCommand::Limit(order) => {
                        if engine.limit(order).is_err() {
                            rejected += 1;
                        }
                    }
                    FeedCommand::Cancel(id) => engine.cancel(id),
                }
            }
            let ns = begin.elapsed().as_nanos() as u64;

            histogram.record(ns.max(1)).unwrap_or(());
            batch_ns.push(ns);
        }
    }

    let samples = batch_ns.len() as f64;
    let mean = batch_ns.iter().map(|&n| n as f64).sum::<f64>() / samples;
    let variance = batch_ns
        .iter()
        .map(|&n| {
            let centered = n as f64 - mean;
            centered * centered
        })
        .sum::<f64>()
        / samples;
    let sd = variance.sqrt();

    println!("\n=== Batch Latency Report (ns per {BATCH_SIZE}-row batch) ===");
    println!("Batches:   {}", batch_ns.len());
    println!("Rejected:  {rejected}");
    println!("---------------------------");
    println!("Min:    {:8} ns", histogram.min());
    println!("P50:    {:8} ns", histogram.value_at_quantile(0.50));
    println!("P90:    {:8} ns", histogram.value_at_quantile(0.90));
    println!("P99:    {:8} ns", histogram.value_at_quantile(0.99));
    println!("P99.9:  {:8} ns", histogram.value_at_quantile(0.999));
    println!("Max:    {:8} ns", histogram.max());
    println!("---------------------------");
    println!("mean(latency) = {mean:.1} ns, sd(latency) = {sd:.1} ns");
    println!("score = {:.1} (0.5 * (mean + sd); lower is better)", 0.5 * (mean + sd));
}
