//! Run a test case against its target on an execution resource.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::core::artifact_store::ArtifactStore;
use crate::core::error::{DispatchError, FailureKind, WorkerError};
use crate::core::model::{Job, JobPayload, TargetBinary, TestOutcome, TestRequest};
use crate::core::resource_pool::ResourceHandle;
use crate::core::worker::{run_blocking, settle, WorkOutcome, Worker};
use crate::util::serde::JobKind;

/// External capability that executes a test on a provisioned resource.
pub trait TestHarness: Send + Sync {
    /// Run `request` against `binary` on `resource`.
    fn execute(
        &self,
        resource: &ResourceHandle,
        binary: &TargetBinary,
        request: &TestRequest,
    ) -> Result<TestOutcome, DispatchError>;
}

/// Worker for [`JobKind::TestRun`] jobs.
#[derive(Clone)]
pub struct TestRunWorker {
    harness: Arc<dyn TestHarness>,
    store: Arc<dyn ArtifactStore>,
}

impl TestRunWorker {
    /// Create the Worker.
    pub fn new(harness: Arc<dyn TestHarness>, store: Arc<dyn ArtifactStore>) -> Self {
        Self { harness, store }
    }

    fn execute(
        &self,
        job: &Job,
        request: &TestRequest,
        resource: &ResourceHandle,
    ) -> Result<(), WorkerError> {
        debug!(job_id = job.id, test_case_id = request.test_case_id, %resource, "running test");
        let outcome = self.harness.execute(resource, &job.binary, request)?;
        self.store
            .record_test_outcome(job.id, request.test_case_id, &outcome)?;
        if let TestOutcome::Unrunnable { reason } = outcome {
            return Err(WorkerError::expected(FailureKind::InvalidPrecondition, reason));
        }
        Ok(())
    }
}

#[async_trait]
impl Worker for TestRunWorker {
    fn kind(&self) -> JobKind {
        JobKind::TestRun
    }

    async fn run(&self, job: &Job, resource: &ResourceHandle) -> Result<WorkOutcome, DispatchError> {
        let JobPayload::TestRun(request) = &job.payload else {
            return Err(DispatchError::PayloadMismatch(format!(
                "job {} of kind {} carries a crash payload",
                job.id, job.kind
            )));
        };
        let worker = self.clone();
        let (owned, request, resource) = (job.clone(), request.clone(), resource.clone());
        run_blocking(job, move || {
            let result = worker.execute(&owned, &request, &resource);
            // The outcome record already holds the failure.
            settle(&owned, result, || Ok(()))
        })
        .await
    }
}
