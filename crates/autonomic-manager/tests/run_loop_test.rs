//! Async cadence driver: interval ticks, external triggers, and shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use autonomic_core::config::AutonomicConfig;
use autonomic_core::pattern::CanonicalEquivalence;
use autonomic_core::traits::IPatternStore;
use autonomic_core::{Observation, ObservationValue, PatternId, StructuralDescription};
use autonomic_manager::{ActionQueue, AutonomicManager};
use autonomic_storage::StorageEngine;

fn event(value: &str) -> Observation {
    Observation::from([("event".to_string(), ObservationValue::from(value))])
}

fn manager() -> Arc<AutonomicManager> {
    let mut config = AutonomicConfig::default();
    // Long cadence: after the immediate first tick, only triggers run iterations.
    config.manager.cadence_secs = 3_600;
    let store =
        Arc::new(StorageEngine::open_in_memory(Arc::new(CanonicalEquivalence::default())).unwrap());
    Arc::new(AutonomicManager::new(config, store, Arc::new(ActionQueue::new())).unwrap())
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn runs_on_first_tick_and_on_trigger_until_shutdown() {
    let manager = manager();
    for subject in ["web-1", "web-2", "web-3"] {
        manager.observe(subject, event("login_failure")).unwrap();
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let driver = tokio::spawn(Arc::clone(&manager).run(shutdown_rx));

    wait_until(|| manager.metrics().iterations_completed >= 1).await;

    manager.observe("web-4", event("login_failure")).unwrap();
    manager.trigger();
    wait_until(|| manager.metrics().iterations_completed >= 2).await;

    shutdown_tx.send(true).unwrap();
    driver.await.unwrap();

    let id = PatternId::derive(
        &StructuralDescription::co_occurrence([("event", "login_failure")]),
        0,
    )
    .unwrap();
    let pattern = manager.store().get(&id).unwrap().unwrap();
    assert!(pattern.is_accepted());
    assert_eq!(pattern.evidence_count, 4);
    assert!(!manager.is_running());
    assert_eq!(manager.history().len(), 2);
}

#[tokio::test]
async fn shutdown_before_start_returns_immediately() {
    let manager = manager();
    let (_shutdown_tx, shutdown_rx) = watch::channel(true);
    Arc::clone(&manager).run(shutdown_rx).await;
    assert_eq!(manager.metrics().iterations_started, 0);
}

#[tokio::test]
async fn dropping_the_shutdown_sender_stops_the_loop() {
    let manager = manager();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let driver = tokio::spawn(Arc::clone(&manager).run(shutdown_rx));
    wait_until(|| manager.metrics().iterations_completed >= 1).await;
    drop(shutdown_tx);
    driver.await.unwrap();
    assert_eq!(manager.metrics().iterations_completed, 1);
}
