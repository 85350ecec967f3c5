//! Job descriptors and the domain objects Workers read and persist.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::util::serde::{ArtifactId, BinaryId, JobId, JobKind, PovType, TestCaseId, Tristate};

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting to be claimed.
    #[default]
    Pending,
    /// Claimed by a scheduler; processing in progress.
    Busy,
    /// Worker finished with a recorded result.
    Completed,
    /// Worker recorded a domain failure.
    Failed,
}

/// Target binary a job runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetBinary {
    /// Binary identifier.
    pub id: BinaryId,
    /// Filesystem path of the binary.
    pub path: PathBuf,
}

/// Per-job resource limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// CPU cores.
    pub cpu: u32,
    /// Memory in gigabytes.
    pub memory_gb: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self { cpu: 1, memory_gb: 2 }
    }
}

/// A test input known to crash the target, plus its analysis flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashingInput {
    /// Test case identifier.
    pub id: TestCaseId,
    /// Raw input bytes.
    pub blob: Vec<u8>,
    /// Whether the engine can build a proof of vulnerability from it.
    pub exploitable: Tristate,
    /// Whether the engine can perturb it into a more useful state.
    pub explorable: Tristate,
    /// Set once triage has run to completion.
    pub triaged: bool,
}

impl CrashingInput {
    /// A fresh, unanalysed crashing input.
    pub fn new(id: TestCaseId, blob: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            blob: blob.into(),
            exploitable: Tristate::Unknown,
            explorable: Tristate::Unknown,
            triaged: false,
        }
    }
}

/// Request to run an existing test case on an execution resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRequest {
    /// Test case to run.
    pub test_case_id: TestCaseId,
    /// Input bytes fed to the target.
    pub blob: Vec<u8>,
}

/// Work carried by a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPayload {
    /// A crashing input to analyse.
    Crash(CrashingInput),
    /// A test-execution request.
    TestRun(TestRequest),
}

/// One unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: JobId,
    /// Selects the Worker.
    pub kind: JobKind,
    /// Target binary.
    pub binary: TargetBinary,
    /// Work payload.
    pub payload: JobPayload,
    /// Resource limits.
    pub limits: ResourceLimits,
    /// Current status.
    pub status: JobStatus,
}

impl Job {
    /// A pending crash-analysis job of the given kind.
    pub fn crash(id: JobId, kind: JobKind, binary: TargetBinary, crash: CrashingInput) -> Self {
        Self {
            id,
            kind,
            binary,
            payload: JobPayload::Crash(crash),
            limits: ResourceLimits::default(),
            status: JobStatus::Pending,
        }
    }

    /// A pending test-execution job.
    pub fn test_run(id: JobId, binary: TargetBinary, request: TestRequest) -> Self {
        Self {
            id,
            kind: JobKind::TestRun,
            binary,
            payload: JobPayload::TestRun(request),
            limits: ResourceLimits::default(),
            status: JobStatus::Pending,
        }
    }
}

/// Identity of an exploit; at most one artifact exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExploitKey {
    /// Originating job.
    pub job: JobId,
    /// Exploit type.
    pub pov_type: PovType,
    /// Engine method that produced it.
    pub method: String,
}

/// Exploit to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExploit {
    /// Target binary.
    pub binary: BinaryId,
    /// Originating job.
    pub job: JobId,
    /// Exploit type.
    pub pov_type: PovType,
    /// Engine method identifier.
    pub method: String,
    /// Serialized exploit.
    pub blob: Vec<u8>,
}

impl NewExploit {
    /// Identity used for idempotent creation.
    pub fn key(&self) -> ExploitKey {
        ExploitKey {
            job: self.job,
            pov_type: self.pov_type,
            method: self.method.clone(),
        }
    }
}

/// A persisted exploit. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploitArtifact {
    /// Store-assigned identifier.
    pub id: ArtifactId,
    /// Target binary.
    pub binary: BinaryId,
    /// Originating job.
    pub job: JobId,
    /// Exploit type.
    pub pov_type: PovType,
    /// Engine method identifier.
    pub method: String,
    /// Serialized exploit.
    pub blob: Vec<u8>,
    /// Creation timestamp (ms since epoch).
    pub created_at_ms: u128,
}

/// Result of an idempotent exploit write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExploitWrite {
    /// A new artifact was created.
    Created(ArtifactId),
    /// An artifact with the same identity already existed.
    Existing(ArtifactId),
}

/// A newly discovered input produced while exploring a crash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedTestCase {
    /// Store-assigned identifier.
    pub id: TestCaseId,
    /// Target binary.
    pub binary: BinaryId,
    /// Originating job.
    pub job: JobId,
    /// Input bytes.
    pub blob: Vec<u8>,
}

/// Outcome of running a test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestOutcome {
    /// The target exited normally.
    Passed,
    /// The target crashed with the given signal.
    Crashed {
        /// Terminating signal number.
        signal: i32,
    },
    /// The test could not be run at all.
    Unrunnable {
        /// Why it could not run.
        reason: String,
    },
}
