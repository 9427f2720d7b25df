//! §10.1.0 Overview — batch signing throughput
//! Usage:
//!   cargo run --release --bin ABSIGN_perftest -- [rounds=10000] [threads=0]
//! One signer call per work item, nothing shared but the constant tables;
//! rayon fans the batch out across the pool.

use std::time::Instant;

use anyhow::Result;
use rand::Rng;
use rayon::prelude::*;

use absign::signer::window_jitter;
use absign::Signer;

fn main() -> Result<()> {
    // Args
    let args: Vec<String> = std::env::args().collect();
    let rounds: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(10_000);
    let threads: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(0);
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    // Pre-generate inputs so the timed section is signing only.
    let mut rng = rand::thread_rng();
    let jobs: Vec<(String, u64, u64, [u32; 3])> = (0..rounds)
        .map(|i| {
            let params = format!("aid=6383&device_platform=webapp&item={i}");
            let start: u64 = 1_700_000_000_000 + i as u64;
            let end = start + window_jitter(&mut rng);
            let seeds = [
                rng.gen_range(0..10000),
                rng.gen_range(0..10000),
                rng.gen_range(0..10000),
            ];
            (params, start, end, seeds)
        })
        .collect();

    let t0 = Instant::now();
    let tokens: Vec<String> = jobs
        .par_iter()
        .map(|(params, start, end, seeds)| {
            // fresh signer per item: one exclusive owner per in-flight call
            Signer::new()
                .sign_with(params, "GET", *start, *end, *seeds)
                .expect("sign")
        })
        .collect();
    let dt = t0.elapsed();

    let total_bytes: usize = tokens.iter().map(|t| t.len()).sum();
    let per_sec = rounds as f64 / dt.as_secs_f64();
    println!(
        "signed {} tokens in {:.3}s  ({:.0} tokens/s, {:.2} MiB of output)",
        rounds,
        dt.as_secs_f64(),
        per_sec,
        total_bytes as f64 / (1024.0 * 1024.0)
    );

    // spot determinism: re-sign the first job serially and compare
    if let Some((params, start, end, seeds)) = jobs.first() {
        let again = Signer::new().sign_with(params, "GET", *start, *end, *seeds)?;
        assert_eq!(&again, &tokens[0], "parallel and serial tokens diverged");
        println!("determinism spot-check OK");
    }
    Ok(())
}
