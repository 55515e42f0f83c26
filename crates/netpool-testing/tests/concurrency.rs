//! Concurrent access to a shared pool.
//!
//! Many tasks race for the same endpoint on a multi-threaded runtime. The mock
//! probe yields, so tasks interleave inside the unlocked window of `acquire`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use netpool::{Connection, Endpoint, Pool, PoolConfig};
use netpool_testing::{MockConnector, at, init_tracing};
use tokio::sync::Barrier;

const TIMEOUT: Duration = Duration::from_secs(5);

fn shared_pool(connector: &MockConnector) -> Arc<Pool<MockConnector>> {
    init_tracing();
    Arc::new(Pool::new(connector.clone(), PoolConfig::default()).unwrap())
}

async fn seed_idle(pool: &Pool<MockConnector>, endpoint: &Endpoint, count: usize) -> HashSet<u64> {
    let mut records = Vec::new();
    for _ in 0..count {
        records.push(pool.acquire(endpoint, at(0), TIMEOUT).await.unwrap());
    }
    let ids = records.iter().map(|r| r.id().get()).collect();
    for record in records {
        pool.release(record, at(1));
    }
    ids
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_acquires_split_between_reuse_and_dial() {
    const TASKS: usize = 16;
    const IDLE: usize = 5;

    let connector = MockConnector::new();
    let pool = shared_pool(&connector);
    let endpoint = Endpoint::new("db1", 27017);

    let seeded = seed_idle(&pool, &endpoint, IDLE).await;
    assert_eq!(pool.idle_count(&endpoint), IDLE);
    connector.set_dial_delay(Duration::from_millis(5));

    let barrier = Arc::new(Barrier::new(TASKS));
    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let pool = Arc::clone(&pool);
        let barrier = Arc::clone(&barrier);
        let endpoint = endpoint.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            pool.acquire(&endpoint, at(2), TIMEOUT).await.unwrap()
        }));
    }

    let mut records = Vec::new();
    for handle in handles {
        records.push(handle.await.unwrap());
    }

    let ids: HashSet<u64> = records.iter().map(|r| r.id().get()).collect();
    assert_eq!(ids.len(), TASKS, "a record was handed to two tasks");
    assert_eq!(ids.intersection(&seeded).count(), IDLE);
    assert_eq!(connector.dials(), IDLE + (TASKS - IDLE));
    assert_eq!(pool.metrics().reuses, IDLE as u64);
    assert_eq!(pool.status().in_use, TASKS);
    assert_eq!(pool.idle_count(&endpoint), 0);

    for record in records {
        pool.release(record, at(3));
    }
    assert_eq!(pool.idle_count(&endpoint), TASKS);
    assert_eq!(pool.status().in_use, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_scoped_handles_across_endpoints() {
    const TASKS: usize = 24;
    const ROUNDS: usize = 10;

    let connector = MockConnector::new();
    let pool = shared_pool(&connector);
    let endpoints: Vec<Endpoint> = (0..3).map(|i| Endpoint::new(format!("db{i}"), 27017)).collect();

    let mut handles = Vec::new();
    for task in 0..TASKS {
        let pool = Arc::clone(&pool);
        let endpoint = endpoints[task % endpoints.len()].clone();
        handles.push(tokio::spawn(async move {
            for round in 0..ROUNDS {
                let conn = pool.get(&endpoint, at(1), TIMEOUT).await.unwrap();
                assert_eq!(conn.endpoint(), &endpoint);
                tokio::task::yield_now().await;
                // Every third use ends in an "error" and is discarded.
                if (task + round) % 3 == 0 {
                    drop(conn);
                } else {
                    conn.finish(at(2));
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let status = pool.status();
    assert_eq!(status.in_use, 0);
    assert_eq!(status.idle, connector.open_connections());
    assert!(status.idle <= TASKS);

    let metrics = pool.metrics();
    assert_eq!(metrics.checkouts_successful, (TASKS * ROUNDS) as u64);
    assert_eq!(metrics.connections_created as usize, connector.dials());
    assert_eq!(
        metrics.reuses + metrics.connections_created,
        metrics.checkouts_successful
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_close_all_in_use_cancels_in_flight_connections() {
    const TASKS: usize = 8;

    let connector = MockConnector::new();
    let pool = shared_pool(&connector);
    let endpoint = Endpoint::new("db1", 27017);

    let acquired = Arc::new(Barrier::new(TASKS + 1));
    let cancelled = Arc::new(Barrier::new(TASKS + 1));
    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let pool = Arc::clone(&pool);
        let endpoint = endpoint.clone();
        let acquired = Arc::clone(&acquired);
        let cancelled = Arc::clone(&cancelled);
        handles.push(tokio::spawn(async move {
            let mut conn = pool.get(&endpoint, at(0), TIMEOUT).await.unwrap();
            acquired.wait().await;
            cancelled.wait().await;
            // The in-flight request notices the shutdown and gives up.
            let alive = conn.is_still_connected().await.unwrap();
            assert!(!alive);
        }));
    }

    acquired.wait().await;
    assert_eq!(pool.status().in_use, TASKS);
    pool.close_all_in_use_connections();
    assert_eq!(pool.status().in_use, TASKS);
    assert!(connector.links().iter().all(|l| l.is_shut_down()));
    cancelled.wait().await;

    for handle in handles {
        handle.await.unwrap();
    }
    assert!(pool.status().is_empty());
    assert_eq!(connector.open_connections(), 0);
}
