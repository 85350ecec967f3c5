//! Tests for error types

use triage_dispatch::core::{DispatchError, EngineError, FailureKind, WorkerError};

#[test]
fn test_store_error() {
    let err = DispatchError::Store("connection refused".to_string());
    assert_eq!(format!("{}", err), "store error: connection refused");
}

#[test]
fn test_exploration_diverged_error() {
    let err = DispatchError::ExplorationDiverged { limit: 64 };
    assert_eq!(format!("{}", err), "exploration did not converge after 64 steps");
}

#[test]
fn test_worker_panicked_error() {
    let err = DispatchError::WorkerPanicked("task 3 panicked".to_string());
    assert_eq!(format!("{}", err), "worker panicked: task 3 panicked");
}

#[test]
fn test_expected_worker_error() {
    let err = WorkerError::expected(FailureKind::CannotExploit, "no register control");
    assert_eq!(format!("{}", err), "cannot exploit: no register control");
}

#[test]
fn test_fatal_worker_error_is_transparent() {
    let err: WorkerError = DispatchError::Harness("vm unreachable".to_string()).into();
    assert_eq!(format!("{}", err), "harness error: vm unreachable");
}

#[test]
fn test_hard_engine_error_becomes_fatal() {
    let err: WorkerError = EngineError::Hard("tracer crashed".to_string()).into();
    match err {
        WorkerError::Fatal(DispatchError::Engine(reason)) => assert_eq!(reason, "tracer crashed"),
        other => panic!("unexpected {other:?}"),
    }
}
