//! Source of pending jobs.

use async_trait::async_trait;

use crate::core::error::DispatchError;
use crate::core::model::{Job, JobStatus};

/// External collaborator that lists and claims jobs.
///
/// The source is the single source of truth for "pending": a job that is not
/// claimed this cycle is simply observed again on the next `list_pending`.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Jobs currently waiting to be processed.
    async fn list_pending(&self) -> Result<Vec<Job>, DispatchError>;

    /// Atomically mark `job` busy. Returns `true` iff this caller now owns
    /// exclusive processing rights.
    async fn claim(&self, job: &Job) -> Result<bool, DispatchError>;

    /// Report the terminal status of a claimed job.
    async fn finish(&self, job: &Job, status: JobStatus) -> Result<(), DispatchError>;
}
