use std::{collections::HashSet, sync::Arc, thread};

use rand::{rngs::SmallRng, Rng, SeedableRng};

use rbt_index::Rbt;

use super::{load, thread_seed};

#[test]
fn test_thread_seed() {
    let n_threads = 8;
    for &seed in [0_u128, 1, 42, 0xdead_beef, u128::max_value()].iter() {
        let mut keys = HashSet::new();
        for t in 0..n_threads {
            let mut rng = SmallRng::from_seed(thread_seed(seed, t));
            (0..64).for_each(|_| {
                keys.insert(rng.gen::<u64>());
            });
        }
        assert_eq!(keys.len(), n_threads * 64, "seed {}", seed);
    }
}

#[test]
fn test_load() {
    let (n_threads, n_ops) = (4, 1000);
    let rbt = Arc::new(Rbt::new("test-perf"));

    let writers: Vec<thread::JoinHandle<Vec<[u8; 8]>>> = (0..n_threads)
        .map(|t| {
            let rbt = Arc::clone(&rbt);
            let seed = thread_seed(42, t);
            thread::spawn(move || load(&rbt, seed, n_ops).unwrap())
        })
        .collect();

    let mut loaded = vec![];
    for writer in writers.into_iter() {
        let keys = writer.join().unwrap();
        assert_eq!(keys.len(), n_ops);
        loaded.extend(keys);
    }

    assert_eq!(rbt.len(), n_threads * n_ops);
    assert!(rbt.validate().is_ok());
    for key in loaded.iter() {
        assert!(rbt.get(&key[..]).is_some());
    }
}
