//! Races between creators and readers

use pair_registry::{InMemoryDeployer, PairRegistry, RegistryError, RegistryEvent};
use pair_types::{EthAddress, InitCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;

fn registry() -> (PairRegistry, Arc<InMemoryDeployer>) {
    let host = Arc::new(InMemoryDeployer::new());
    let registry = PairRegistry::new(
        EthAddress::from_low_u64(0xfac7),
        EthAddress::from_low_u64(0xd3),
        InitCode::new(vec![0x60, 0x80]),
        host.clone(),
    );
    (registry, host)
}

#[test]
fn test_racing_creators_exactly_one_wins() {
    let (registry, host) = registry();
    let a = EthAddress::from_low_u64(1);
    let b = EthAddress::from_low_u64(2);
    let barrier = Barrier::new(THREADS);
    let wins = AtomicUsize::new(0);
    let duplicates = AtomicUsize::new(0);
    let events = registry.subscribe();

    thread::scope(|s| {
        for i in 0..THREADS {
            let (registry, barrier, wins, duplicates) = (&registry, &barrier, &wins, &duplicates);
            s.spawn(move || {
                barrier.wait();
                // Half the threads use the reverse order
                let result = if i % 2 == 0 {
                    registry.create_pair(a, b)
                } else {
                    registry.create_pair(b, a)
                };
                match result {
                    Ok(_) => wins.fetch_add(1, Ordering::SeqCst),
                    Err(RegistryError::PairAlreadyExists { .. }) => {
                        duplicates.fetch_add(1, Ordering::SeqCst)
                    }
                    Err(other) => panic!("unexpected error: {other}"),
                };
            });
        }
    });

    assert_eq!(wins.load(Ordering::SeqCst), 1);
    assert_eq!(duplicates.load(Ordering::SeqCst), THREADS - 1);
    assert_eq!(registry.all_pairs_length(), 1);
    assert_eq!(host.len(), 1);

    assert!(matches!(events.try_recv(), Ok(RegistryEvent::PairCreated(_))));
    assert!(events.try_recv().is_err());
}

#[test]
fn test_parallel_distinct_pairs_keep_dense_indices() {
    let (registry, _) = registry();
    let per_thread = 20u64;

    thread::scope(|s| {
        for t in 0..THREADS as u64 {
            let registry = &registry;
            s.spawn(move || {
                for i in 0..per_thread {
                    let base = 1_000 * (t + 1);
                    registry
                        .create_pair(EthAddress::from_low_u64(base), EthAddress::from_low_u64(base + i + 1))
                        .unwrap();
                }
            });
        }
    });

    let pairs = registry.pairs();
    assert_eq!(pairs.len() as u64, THREADS as u64 * per_thread);
    for (i, record) in pairs.iter().enumerate() {
        assert_eq!(record.index, i as u64);
        assert_eq!(registry.get_pair(record.token1, record.token0), Some(record.pair));
    }
}

#[test]
fn test_readers_never_see_unrecorded_pairs() {
    let (registry, host) = registry();
    let total = 200u64;

    thread::scope(|s| {
        let registry = &registry;
        let host = &host;
        s.spawn(move || {
            for i in 0..total {
                registry
                    .create_pair(EthAddress::from_low_u64(1), EthAddress::from_low_u64(i + 2))
                    .unwrap();
            }
        });

        for _ in 0..3 {
            s.spawn(move || loop {
                let len = registry.all_pairs_length();
                // Every listed pair is fully materialized and bound
                for index in 0..len {
                    let record = registry.pair_record(index).unwrap();
                    let instance = host.instance(record.pair).unwrap();
                    assert_eq!(instance.token0(), Some(record.token0));
                }
                if len == total {
                    break;
                }
            });
        }
    });
}

#[test]
fn test_only_one_admin_transfer_from_same_holder() {
    let (registry, _) = registry();
    let holder = EthAddress::from_low_u64(0xd3);
    let barrier = Barrier::new(THREADS);
    let wins = AtomicUsize::new(0);

    thread::scope(|s| {
        for i in 0..THREADS as u64 {
            let (registry, barrier, wins) = (&registry, &barrier, &wins);
            s.spawn(move || {
                barrier.wait();
                if registry
                    .set_fee_to_setter(holder, EthAddress::from_low_u64(0x100 + i))
                    .is_ok()
                {
                    wins.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(wins.load(Ordering::SeqCst), 1);
    assert_ne!(registry.fee_to_setter(), holder);
    assert_eq!(registry.stats().unauthorized_attempts, THREADS as u64 - 1);
}

#[test]
fn test_events_arrive_in_commit_order() {
    let (registry, _) = registry();
    let events = registry.subscribe();
    let per_thread = 50u64;
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for t in 0..THREADS as u64 {
            let (registry, barrier) = (&registry, &barrier);
            s.spawn(move || {
                barrier.wait();
                let base = 10_000 * (t + 1);
                for i in 0..per_thread {
                    registry
                        .create_pair(EthAddress::from_low_u64(base), EthAddress::from_low_u64(base + i + 1))
                        .unwrap();
                    // Interleave admin changes from the current holder
                    let holder = registry.fee_to_setter();
                    let _ = registry.set_fee_to_setter(holder, EthAddress::from_low_u64(base + i));
                }
            });
        }
    });

    let mut next_index = 0u64;
    let mut holder = EthAddress::from_low_u64(0xd3);
    for event in events.try_iter() {
        match event {
            RegistryEvent::PairCreated(created) => {
                assert_eq!(created.index, next_index);
                assert_eq!(registry.all_pairs(created.index).unwrap(), created.pair);
                next_index += 1;
            }
            RegistryEvent::FeeToSetterChanged { previous, current } => {
                // Each change starts from the holder the previous one left
                assert_eq!(previous, holder);
                holder = current;
            }
        }
    }
    assert_eq!(next_index, THREADS as u64 * per_thread);
    assert_eq!(holder, registry.fee_to_setter());
}
