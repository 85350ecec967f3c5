//! Persistence for derived artifacts and crash flags.

use crate::core::error::DispatchError;
use crate::core::model::{CrashingInput, ExploitWrite, NewExploit, TestOutcome};
use crate::util::serde::{BinaryId, JobId, TestCaseId};

/// External persistence layer.
///
/// Every call is synchronous and durable on return. Failures surface as
/// [`DispatchError::Store`] and are never swallowed by callers.
pub trait ArtifactStore: Send + Sync {
    /// Persist an exploit. Must be idempotent on [`NewExploit::key`]: a
    /// second write with the same identity returns [`ExploitWrite::Existing`].
    fn create_exploit(&self, exploit: NewExploit) -> Result<ExploitWrite, DispatchError>;

    /// Persist a newly discovered input and return its identifier.
    fn create_test_case(
        &self,
        binary: BinaryId,
        job: JobId,
        blob: Vec<u8>,
    ) -> Result<TestCaseId, DispatchError>;

    /// Persist the analysis flags of a crashing input.
    fn save_crash(&self, crash: &CrashingInput) -> Result<(), DispatchError>;

    /// Persist the result of running a test case.
    fn record_test_outcome(
        &self,
        job: JobId,
        test_case: TestCaseId,
        outcome: &TestOutcome,
    ) -> Result<(), DispatchError>;
}
