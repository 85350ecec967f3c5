//! Shared identifiers and small serializable enums.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Job identifier assigned by the job backend.
pub type JobId = u64;

/// Target binary identifier.
pub type BinaryId = u64;

/// Test case identifier (crashing inputs and derived test cases share this space).
pub type TestCaseId = u64;

/// Identifier the artifact store assigns to a persisted exploit.
pub type ArtifactId = uuid::Uuid;

/// Job kinds, one Worker per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Full crash triage: classify, explore, synthesize exploits.
    CrashTriage,
    /// One-shot register-control fuzzing against a crash.
    Type1Fuzz,
    /// Run a test case against a target on an execution resource.
    TestRun,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrashTriage => write!(f, "crash_triage"),
            Self::Type1Fuzz => write!(f, "type1_fuzz"),
            Self::TestRun => write!(f, "test_run"),
        }
    }
}

/// Tri-state analysis flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tristate {
    /// Not yet determined.
    #[default]
    Unknown,
    /// Determined true.
    Yes,
    /// Determined false.
    No,
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        if value {
            Self::Yes
        } else {
            Self::No
        }
    }
}

/// Proof-of-vulnerability type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PovType {
    /// Register-control exploit.
    Type1,
    /// Information-leak exploit.
    Type2,
}

impl fmt::Display for PovType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type1 => write!(f, "type1"),
            Self::Type2 => write!(f, "type2"),
        }
    }
}
