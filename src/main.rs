// Performance measurement for Rbt instances. Measure:
// * Concurrent load, N writer threads sharing one instance, each
//   inserting M random keys.
// * Get operation on every key loaded, from the same N threads.
//
// For each phase log the throughput, then validate the tree and log its
// depth statistics.
//
// Usage: rbt-perf [n_threads] [n_ops_per_thread]

use std::{
    env,
    error::Error,
    sync::Arc,
    thread,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use log::{info, warn};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use rbt_index::Rbt;

const N_THREADS: usize = 4;
const N_OPS: usize = 250_000;

fn main() -> Result<(), Box<dyn Error>> {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let mut args = env::args().skip(1);
    let n_threads = match args.next() {
        Some(arg) => arg.parse::<usize>()?,
        None => N_THREADS,
    };
    let n_ops = match args.next() {
        Some(arg) => arg.parse::<usize>()?,
        None => N_OPS,
    };

    let rbt = Arc::new(Rbt::new("rbt-perf"));
    let seed = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();

    info!(target: "rbtprf", "seed {}", seed);

    let start = Instant::now();
    let writers: Vec<thread::JoinHandle<Result<Vec<[u8; 8]>, rbt_index::Error>>> = (0..n_threads)
        .map(|t| {
            let rbt = Arc::clone(&rbt);
            let seed = thread_seed(seed, t);
            thread::spawn(move || load(&rbt, seed, n_ops))
        })
        .collect();

    let mut loaded = vec![];
    for writer in writers.into_iter() {
        match writer.join() {
            Ok(keys) => loaded.push(keys?),
            Err(_) => return Err("writer thread panicked".into()),
        }
    }
    log_throughput("insert", n_threads * n_ops, start);

    let start = Instant::now();
    let readers: Vec<thread::JoinHandle<usize>> = loaded
        .into_iter()
        .map(|keys| {
            let rbt = Arc::clone(&rbt);
            thread::spawn(move || keys.iter().filter(|k| rbt.get(&k[..]).is_some()).count())
        })
        .collect();
    let mut found = 0;
    for reader in readers.into_iter() {
        match reader.join() {
            Ok(n) => found += n,
            Err(_) => return Err("reader thread panicked".into()),
        }
    }
    log_throughput("get", n_threads * n_ops, start);
    info!(target: "rbtprf", "found {} keys, index has {} entries", found, rbt.len());
    if rbt.len() != n_threads * n_ops {
        warn!(
            target: "rbtprf",
            "{} of {} inserts were updates to an existing key",
            n_threads * n_ops - rbt.len(),
            n_threads * n_ops
        );
    }

    let stats = rbt.validate()?;
    info!(
        target: "rbtprf",
        "validated {} entries, node size {} blacks {:?}",
        stats.entries(),
        stats.node_size(),
        stats.blacks()
    );
    if let Some(depths) = stats.depths() {
        depths.pretty_print("  ");
    }
    Ok(())
}

// spread thread number into the high bits, the generator forces the
// low bit of its state, seeds that differ only there collide.
fn thread_seed(seed: u128, t: usize) -> [u8; 16] {
    (seed ^ ((t as u128) << 64)).to_le_bytes()
}

fn load(rbt: &Rbt, seed: [u8; 16], n_ops: usize) -> Result<Vec<[u8; 8]>, rbt_index::Error> {
    let mut rng = SmallRng::from_seed(seed);
    let mut keys = Vec::with_capacity(n_ops);
    for _ in 0..n_ops {
        let key = rng.gen::<u64>().to_be_bytes();
        let value = rng.gen::<u64>().to_le_bytes();
        rbt.insert(&key, &value)?;
        keys.push(key);
    }
    Ok(keys)
}

fn log_throughput(op: &str, n: usize, start: Instant) {
    let elapsed = start.elapsed();
    let rate = (n as f64) / elapsed.as_secs_f64().max(1e-9);
    info!(
        target: "rbtprf",
        "{} {} ops in {:?}, {:.0} ops/sec", op, n, elapsed, rate
    );
}

#[cfg(test)]
mod main_test;
