//! Worker contract and per-kind registry.
//!
//! A Worker owns the mapping from a domain outcome to persisted state. Its
//! inner routine returns [`WorkerError`]; the outer boundary ([`settle`])
//! persists a failure state for the expected kinds and lets everything else
//! propagate as a [`DispatchError`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::{DispatchError, FailureKind, WorkerError};
use crate::core::model::{CrashingInput, Job, JobPayload};
use crate::core::resource_pool::ResourceHandle;
use crate::util::serde::JobKind;

/// How a Worker run ended, when it did not fail fatally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkOutcome {
    /// Domain logic ran to completion and its results were persisted.
    Completed,
    /// An expected failure was caught and a failure state was persisted.
    DomainFailure {
        /// Which expected kind occurred.
        kind: FailureKind,
        /// Detail from the inner routine.
        reason: String,
    },
}

/// One domain routine per job kind.
///
/// `run` must persist a terminal state for the job's domain object on every
/// non-fatal exit path. An `Err` means an infrastructure or programming fault
/// that the scheduler should surface.
#[async_trait]
pub trait Worker: Send + Sync {
    /// Job kind this Worker handles.
    fn kind(&self) -> JobKind;

    /// Process `job` while holding `resource`.
    async fn run(&self, job: &Job, resource: &ResourceHandle) -> Result<WorkOutcome, DispatchError>;
}

/// Outer boundary of the two-phase Worker pattern.
///
/// `Ok` becomes [`WorkOutcome::Completed`]. An expected failure calls
/// `persist_failure` (whose own errors are fatal), logs, and becomes
/// [`WorkOutcome::DomainFailure`]. A fatal error is returned unchanged.
pub fn settle<F>(
    job: &Job,
    result: Result<(), WorkerError>,
    persist_failure: F,
) -> Result<WorkOutcome, DispatchError>
where
    F: FnOnce() -> Result<(), DispatchError>,
{
    match result {
        Ok(()) => Ok(WorkOutcome::Completed),
        Err(WorkerError::Expected { kind, reason }) => {
            persist_failure()?;
            tracing::error!(job_id = job.id, kind = %kind, "{reason}");
            Ok(WorkOutcome::DomainFailure { kind, reason })
        }
        Err(WorkerError::Fatal(err)) => Err(err),
    }
}

/// Run a Worker's synchronous body on tokio's blocking thread pool.
///
/// Engine, store and harness calls block for as long as the analysis takes
/// and must not occupy an async worker thread. A panic in `body` surfaces as
/// [`DispatchError::WorkerPanicked`].
pub async fn run_blocking<F>(job: &Job, body: F) -> Result<WorkOutcome, DispatchError>
where
    F: FnOnce() -> Result<WorkOutcome, DispatchError> + Send + 'static,
{
    tokio::task::spawn_blocking(body).await.map_err(|err| {
        tracing::error!(job_id = job.id, error = %err, "blocking worker body did not complete");
        DispatchError::WorkerPanicked(err.to_string())
    })?
}

/// Borrow the crashing input out of a crash job.
pub fn crash_payload(job: &Job) -> Result<&CrashingInput, DispatchError> {
    match &job.payload {
        JobPayload::Crash(crash) => Ok(crash),
        JobPayload::TestRun(_) => Err(DispatchError::PayloadMismatch(format!(
            "job {} of kind {} carries a test-run payload",
            job.id, job.kind
        ))),
    }
}

/// Workers indexed by the job kind they handle.
#[derive(Default, Clone)]
pub struct WorkerRegistry {
    workers: HashMap<JobKind, Arc<dyn Worker>>,
}

impl WorkerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a Worker under its own kind, replacing any previous one.
    pub fn register(&mut self, worker: Arc<dyn Worker>) {
        let kind = worker.kind();
        if self.workers.insert(kind, worker).is_some() {
            tracing::warn!(kind = %kind, "replaced previously registered worker");
        }
    }

    /// Worker for `kind`, if one is registered.
    pub fn get(&self, kind: JobKind) -> Option<Arc<dyn Worker>> {
        self.workers.get(&kind).cloned()
    }

    /// Registered kinds.
    pub fn kinds(&self) -> Vec<JobKind> {
        self.workers.keys().copied().collect()
    }

    /// True if no Worker is registered.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
