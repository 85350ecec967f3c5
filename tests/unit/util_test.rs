//! Tests for utility functions

use triage_dispatch::util::{now_ms, JobKind, PovType, Tristate};

#[test]
fn test_tristate_default_unknown() {
    assert_eq!(Tristate::default(), Tristate::Unknown);
}

#[test]
fn test_tristate_from_bool() {
    assert_eq!(Tristate::from(true), Tristate::Yes);
    assert_eq!(Tristate::from(false), Tristate::No);
}

#[test]
fn test_job_kind_display() {
    assert_eq!(JobKind::CrashTriage.to_string(), "crash_triage");
    assert_eq!(JobKind::Type1Fuzz.to_string(), "type1_fuzz");
    assert_eq!(JobKind::TestRun.to_string(), "test_run");
}

#[test]
fn test_job_kind_serde_matches_display() {
    for kind in [JobKind::CrashTriage, JobKind::Type1Fuzz, JobKind::TestRun] {
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, format!("\"{kind}\""));
    }
}

#[test]
fn test_pov_type_display() {
    assert_eq!(PovType::Type1.to_string(), "type1");
    assert_eq!(PovType::Type2.to_string(), "type2");
}

#[test]
fn test_now_ms_advances() {
    let a = now_ms();
    let b = now_ms();
    assert!(b >= a);
}

#[test]
fn test_init_tracing_is_idempotent() {
    triage_dispatch::util::init_tracing();
    triage_dispatch::util::init_tracing();
}
