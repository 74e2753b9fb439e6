//! Worker pool integration tests: ordering, determinism, error delivery.

use pointbatch_assemble::{Assembled, AssemblerConfig, BatchAssembler};
use pointbatch_core::{Array, Record, Value};
use pointbatch_loader::{CollatePool, PoolConfig, PoolError, TaskError, Ticket};
use pointbatch_test_utils::{counted_values, record_values};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn pool(workers: usize, assembler: AssemblerConfig) -> CollatePool {
    CollatePool::new(PoolConfig {
        worker_count: Some(workers),
        queue_depth: 2,
        assembler,
    })
    .unwrap()
}

#[test]
fn results_come_back_in_submission_order() {
    let mut pool = pool(4, AssemblerConfig::default());
    let batch_sizes = [3usize, 1, 5, 2, 4, 6, 1, 2];

    // Interleave submit and recv so the bounded queue never fills up.
    let mut received = Vec::new();
    for (i, &n) in batch_sizes.iter().enumerate() {
        let counts: Vec<usize> = (0..n).map(|k| k + 1).collect();
        let ticket = pool.submit(record_values(&counts, i as u64)).unwrap();
        assert_eq!(ticket, Ticket(i as u64));
        if pool.in_flight() > 2 {
            received.push(pool.recv().unwrap());
        }
    }
    while pool.in_flight() > 0 {
        received.push(pool.recv().unwrap());
    }

    for (i, done) in received.iter().enumerate() {
        assert_eq!(done.ticket, Ticket(i as u64));
        let batch = match &done.result {
            Ok(Assembled::Batch(b)) => b,
            other => panic!("unexpected result {other:?}"),
        };
        assert_eq!(batch.offset().unwrap().len(), batch_sizes[i]);
    }
    pool.shutdown().unwrap();
}

#[test]
fn mixing_depends_on_ticket_not_worker() {
    let config = AssemblerConfig {
        mix_prob: 0.5,
        seed: 99,
        ..Default::default()
    };
    let samples = record_values(&[2, 2, 2, 2], 0);

    let mut pool = pool(3, config.clone());
    let mut pooled = Vec::new();
    for _ in 0..12 {
        pool.submit(samples.clone()).unwrap();
        pooled.push(pool.recv().unwrap().result.unwrap());
    }

    for (ticket, got) in pooled.into_iter().enumerate() {
        let rng = ChaCha8Rng::seed_from_u64(config.seed ^ ticket as u64);
        let mut reference = BatchAssembler::with_rng(config.clone(), rng).unwrap();
        assert_eq!(got, reference.assemble(&samples).unwrap());
    }
}

#[test]
fn dynamic_batches_through_the_pool() {
    let config = AssemblerConfig {
        dynamic_batching: true,
        max_points_per_batch: 6,
        ..Default::default()
    };
    let mut pool = pool(2, config);
    pool.submit(counted_values(&[5, 4, 3, 2, 1], 0)).unwrap();
    let batches = pool.recv().unwrap().result.unwrap().into_batches();
    assert_eq!(batches.len(), 3);
}

#[test]
fn assembly_errors_are_reported_per_ticket() {
    let mut pool = pool(2, AssemblerConfig::default());
    pool.submit(vec![Value::from("not a record")]).unwrap();
    pool.submit(record_values(&[1, 2], 0)).unwrap();

    assert!(matches!(
        pool.recv().unwrap().result,
        Err(TaskError::Assemble(_))
    ));
    assert!(pool.recv().unwrap().result.is_ok());
}

#[test]
fn shutdown_with_batches_in_flight() {
    let mut pool = pool(2, AssemblerConfig::default());
    pool.submit(record_values(&[3, 4], 0)).unwrap();
    pool.submit(record_values(&[5], 1)).unwrap();
    assert_eq!(pool.in_flight(), 2);
    assert_eq!(pool.shutdown(), Ok(()));
}

#[test]
fn drop_with_batches_in_flight_joins_workers() {
    let mut pool = pool(2, AssemblerConfig::default());
    for seed in 0..2 {
        pool.submit(record_values(&[2, 2, 2], seed)).unwrap();
    }
    drop(pool);
}

#[test]
fn overflowing_offsets_do_not_stall_the_pool() {
    let mut pool = pool(2, AssemblerConfig::default());
    let record = |n: i64| Value::from(Record::new().with("offset", Array::vector_i64(vec![n])));
    pool.submit(vec![record(i64::MAX), record(1)]).unwrap();
    pool.submit(record_values(&[1, 2], 0)).unwrap();

    assert!(matches!(
        pool.recv().unwrap().result,
        Err(TaskError::Assemble(_))
    ));
    assert!(pool.recv().unwrap().result.is_ok());
}

#[test]
fn recv_without_work_is_an_error() {
    let mut pool = pool(1, AssemblerConfig::default());
    assert_eq!(pool.recv().unwrap_err(), PoolError::NothingPending);
}

#[test]
fn invalid_config_is_rejected() {
    let result = CollatePool::new(PoolConfig {
        queue_depth: 0,
        ..Default::default()
    });
    assert!(matches!(result, Err(PoolError::ZeroQueueDepth)));
}

#[test]
fn worker_count_is_respected() {
    let pool = pool(3, AssemblerConfig::default());
    assert_eq!(pool.worker_count(), 3);
}
