//! Readiness poller tests
//!
//! Run on a paused clock so attempt counts and elapsed time are exact.

mod common;

use common::MockBridge;
use logforge::config::PollTimings;
use logforge::error::BridgeError;
use logforge::models::EnvStatus;
use logforge::orchestrator::readiness::{self, ReadinessEvent, ReadinessStatus};
use logforge::ui::ShellEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn test_ready_on_last_attempt() {
    let bridge = MockBridge::new();
    bridge.script_env((0..59).map(|_| Ok(EnvStatus::pending())));
    bridge.script_env([Ok(EnvStatus::ready())]);
    let (tx, _rx) = mpsc::unbounded_channel();

    let started = Instant::now();
    let state = readiness::spawn(bridge.clone(), &PollTimings::default(), tx).join().await.unwrap();

    assert_eq!(state.status, ReadinessStatus::Ready);
    assert_eq!(state.attempt, 60);
    assert_eq!(bridge.calls("GetEnvironmentReady"), 60);
    assert_eq!(started.elapsed(), Duration::from_secs(59));
}

#[tokio::test(start_paused = true)]
async fn test_never_ready_times_out_without_trailing_sleep() {
    let bridge = MockBridge::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let started = Instant::now();
    let state = readiness::spawn(bridge.clone(), &PollTimings::default(), tx).join().await.unwrap();

    assert_eq!(state.status, ReadinessStatus::TimedOut);
    assert_eq!(state.attempt, 60);
    assert_eq!(bridge.calls("GetEnvironmentReady"), 60);
    assert_eq!(started.elapsed(), Duration::from_secs(59));

    // No 61st query, however long we wait.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(bridge.calls("GetEnvironmentReady"), 60);

    assert_eq!(rx.recv().await, Some(ShellEvent::Readiness(ReadinessEvent::Started)));
    match rx.recv().await {
        Some(ShellEvent::Readiness(ReadinessEvent::Finished(finished))) => assert_eq!(finished, state),
        other => panic!("expected Finished, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_reported_error_stops_immediately() {
    let bridge = MockBridge::new();
    bridge.script_env([Ok(EnvStatus::pending()), Ok(EnvStatus::failed("pip install failed"))]);
    let (tx, _rx) = mpsc::unbounded_channel();

    let state = readiness::spawn(bridge.clone(), &PollTimings::default(), tx).join().await.unwrap();

    assert_eq!(state.status, ReadinessStatus::Error("pip install failed".to_string()));
    assert_eq!(state.attempt, 2);
    assert_eq!(bridge.calls("GetEnvironmentReady"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_bridge_failures_are_swallowed() {
    let bridge = MockBridge::new();
    bridge.script_env([
        Err(BridgeError::new("connection refused")),
        Err(BridgeError::new("connection refused")),
        Ok(EnvStatus::ready()),
    ]);
    let (tx, _rx) = mpsc::unbounded_channel();

    let state = readiness::spawn(bridge.clone(), &PollTimings::default(), tx).join().await.unwrap();

    assert_eq!(state.status, ReadinessStatus::Ready);
    assert_eq!(state.attempt, 3);
}

#[tokio::test(start_paused = true)]
async fn test_custom_budget_is_honoured() {
    let bridge = MockBridge::new();
    let timings = PollTimings { readiness_max_attempts: 5, readiness_interval_ms: 200, ..PollTimings::default() };
    let (tx, _rx) = mpsc::unbounded_channel();

    let started = Instant::now();
    let state = readiness::spawn(bridge.clone(), &timings, tx).join().await.unwrap();

    assert_eq!(state.status, ReadinessStatus::TimedOut);
    assert_eq!(bridge.calls("GetEnvironmentReady"), 5);
    assert_eq!(started.elapsed(), Duration::from_millis(800));
}
