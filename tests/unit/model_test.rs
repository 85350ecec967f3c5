//! Tests for job descriptors and domain objects

use triage_dispatch::core::{
    CrashingInput, Job, JobPayload, JobStatus, NewExploit, ResourceLimits, TargetBinary,
    TestOutcome, TestRequest,
};
use triage_dispatch::util::{JobKind, PovType, Tristate};

fn binary() -> TargetBinary {
    TargetBinary {
        id: 5,
        path: "/cbs/target".into(),
    }
}

#[test]
fn test_crash_job_starts_pending() {
    let job = Job::crash(
        1,
        JobKind::CrashTriage,
        binary(),
        CrashingInput::new(9, b"AAAA".to_vec()),
    );
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.limits, ResourceLimits { cpu: 1, memory_gb: 2 });
    let JobPayload::Crash(crash) = &job.payload else {
        panic!("expected crash payload");
    };
    assert_eq!(crash.exploitable, Tristate::Unknown);
    assert_eq!(crash.explorable, Tristate::Unknown);
    assert!(!crash.triaged);
}

#[test]
fn test_test_run_job_kind() {
    let job = Job::test_run(
        2,
        binary(),
        TestRequest {
            test_case_id: 4,
            blob: b"x".to_vec(),
        },
    );
    assert_eq!(job.kind, JobKind::TestRun);
    assert!(matches!(job.payload, JobPayload::TestRun(_)));
}

#[test]
fn test_exploit_key_ignores_blob() {
    let mut exploit = NewExploit {
        binary: 5,
        job: 1,
        pov_type: PovType::Type2,
        method: "leak_stdout".to_string(),
        blob: b"first".to_vec(),
    };
    let key = exploit.key();
    exploit.blob = b"second".to_vec();
    assert_eq!(exploit.key(), key);
}

#[test]
fn test_job_json_shape() {
    let job = Job::crash(
        3,
        JobKind::Type1Fuzz,
        binary(),
        CrashingInput::new(3, b"B".to_vec()),
    );
    let value = serde_json::to_value(&job).unwrap();
    assert_eq!(value["kind"], "type1_fuzz");
    assert_eq!(value["status"], "pending");

    let back: Job = serde_json::from_value(value).unwrap();
    assert_eq!(back, job);
}

#[test]
fn test_test_outcome_tagging() {
    let value = serde_json::to_value(TestOutcome::Crashed { signal: 11 }).unwrap();
    assert_eq!(value["crashed"]["signal"], 11);
}
