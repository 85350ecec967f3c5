//! In-memory job source for development and testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::error::DispatchError;
use crate::core::job_source::JobSource;
use crate::core::model::{Job, JobStatus};
use crate::util::serde::JobId;

/// Job table keyed by id. Listing returns pending jobs in id order; claiming
/// flips `Pending` to `Busy` under the table lock.
#[derive(Default)]
pub struct InMemoryJobSource {
    jobs: Mutex<BTreeMap<JobId, Job>>,
    polls: AtomicU64,
}

impl InMemoryJobSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a job.
    pub fn push(&self, job: Job) {
        self.jobs.lock().insert(job.id, job);
    }

    /// Current status of a job.
    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        self.jobs.lock().get(&id).map(|job| job.status)
    }

    /// Number of `list_pending` calls served.
    pub fn polls(&self) -> u64 {
        self.polls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl JobSource for InMemoryJobSource {
    async fn list_pending(&self) -> Result<Vec<Job>, DispatchError> {
        self.polls.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .jobs
            .lock()
            .values()
            .filter(|job| job.status == JobStatus::Pending)
            .cloned()
            .collect())
    }

    async fn claim(&self, job: &Job) -> Result<bool, DispatchError> {
        let mut jobs = self.jobs.lock();
        match jobs.get_mut(&job.id) {
            Some(stored) if stored.status == JobStatus::Pending => {
                stored.status = JobStatus::Busy;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(DispatchError::JobSource(format!("unknown job {}", job.id))),
        }
    }

    async fn finish(&self, job: &Job, status: JobStatus) -> Result<(), DispatchError> {
        let mut jobs = self.jobs.lock();
        let stored = jobs
            .get_mut(&job.id)
            .ok_or_else(|| DispatchError::JobSource(format!("unknown job {}", job.id)))?;
        stored.status = status;
        Ok(())
    }
}
