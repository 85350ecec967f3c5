//! Bounded polling scheduler with a fixed idle-retry budget.
//!
//! Each cycle lists pending jobs. For every job with a registered Worker the
//! scheduler takes a free resource (skipping the job if none is free), claims
//! the job, and dispatches it. The batch's dispatches run concurrently and the
//! cycle joins all of them. A non-empty listing resets the retry budget; an
//! empty one sleeps `loiter / max_retries` and spends one retry. The run ends
//! when the budget reaches zero.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::core::error::DispatchError;
use crate::core::job_source::JobSource;
use crate::core::model::{Job, JobStatus};
use crate::core::resource_pool::{ExecutionResourcePool, ResourceHandle};
use crate::core::worker::{WorkOutcome, Worker, WorkerRegistry};

/// Default total idle budget in seconds.
pub const LOITER_SECONDS: u64 = 300;

/// Default number of consecutive empty polls before the scheduler exits.
pub const MAX_RETRIES: u32 = 10_000;

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Polling, with this many idle retries left.
    Running {
        /// Remaining idle retries.
        retries_remaining: u32,
    },
    /// Sleeping one idle interval after an empty poll.
    IdleSleeping {
        /// Remaining idle retries, before this sleep is charged.
        retries_remaining: u32,
    },
    /// The run has ended.
    Terminated,
}

/// What happened during one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Jobs the source listed.
    pub pending: usize,
    /// Jobs claimed and handed to a Worker.
    pub dispatched: usize,
    /// Jobs skipped because no resource was free.
    pub skipped_no_resource: usize,
    /// Jobs another caller claimed first.
    pub claims_lost: usize,
    /// Jobs whose kind has no registered Worker.
    pub unroutable: usize,
    /// Dispatches that ended in a recorded domain failure.
    pub domain_failures: usize,
}

/// Totals over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    /// Poll cycles executed.
    pub cycles: u64,
    /// Cycles that found no pending jobs.
    pub idle_cycles: u64,
    /// Jobs handed to a Worker.
    pub dispatched: u64,
    /// Jobs skipped because no resource was free.
    pub skipped_no_resource: u64,
    /// Claims lost to another caller.
    pub claims_lost: u64,
    /// Jobs left untouched for lack of a Worker.
    pub unroutable: u64,
    /// Dispatches that ended in a recorded domain failure.
    pub domain_failures: u64,
}

impl SchedulerReport {
    fn absorb(&mut self, cycle: &CycleOutcome) {
        self.cycles += 1;
        if cycle.pending == 0 {
            self.idle_cycles += 1;
        }
        self.dispatched += widen(cycle.dispatched);
        self.skipped_no_resource += widen(cycle.skipped_no_resource);
        self.claims_lost += widen(cycle.claims_lost);
        self.unroutable += widen(cycle.unroutable);
        self.domain_failures += widen(cycle.domain_failures);
    }
}

fn widen(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

/// A resource held for one dispatch; returned to the pool on drop, which
/// covers Worker errors and panics as well as normal completion.
struct Checkout {
    pool: Arc<ExecutionResourcePool>,
    handle: ResourceHandle,
}

impl Checkout {
    fn take(pool: &Arc<ExecutionResourcePool>) -> Option<Self> {
        pool.acquire().map(|handle| Self {
            pool: Arc::clone(pool),
            handle,
        })
    }
}

impl Drop for Checkout {
    fn drop(&mut self) {
        self.pool.release(self.handle.clone());
    }
}

/// Single-process scheduler driving Workers against one resource pool.
pub struct PollingScheduler {
    source: Arc<dyn JobSource>,
    pool: Arc<ExecutionResourcePool>,
    workers: WorkerRegistry,
    max_retries: u32,
    idle_interval: Duration,
    state: Mutex<SchedulerState>,
}

impl PollingScheduler {
    /// Create a scheduler with the default loiter budget and retry count.
    pub fn new(
        source: Arc<dyn JobSource>,
        pool: Arc<ExecutionResourcePool>,
        workers: WorkerRegistry,
    ) -> Self {
        Self {
            source,
            pool,
            workers,
            max_retries: MAX_RETRIES,
            idle_interval: Duration::from_secs(LOITER_SECONDS) / MAX_RETRIES,
            state: Mutex::new(SchedulerState::Running {
                retries_remaining: MAX_RETRIES,
            }),
        }
    }

    /// Set the idle budget: `max_retries` empty polls spread over `loiter`.
    ///
    /// `max_retries` of zero is clamped to one.
    #[must_use]
    pub fn with_idle_budget(mut self, loiter: Duration, max_retries: u32) -> Self {
        let max_retries = max_retries.max(1);
        self.max_retries = max_retries;
        self.idle_interval = loiter / max_retries;
        *self.state.get_mut() = SchedulerState::Running {
            retries_remaining: max_retries,
        };
        self
    }

    /// Sleep taken after each empty poll.
    pub const fn idle_interval(&self) -> Duration {
        self.idle_interval
    }

    /// Consecutive empty polls tolerated before exiting.
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        *self.state.lock()
    }

    /// The shared resource pool.
    pub fn pool(&self) -> &Arc<ExecutionResourcePool> {
        &self.pool
    }

    fn set_state(&self, state: SchedulerState) {
        *self.state.lock() = state;
    }

    /// Poll until the idle budget is spent.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error from the job source or a Worker; the run
    /// stops at that point with every resource returned to the pool.
    pub async fn run(&self) -> Result<SchedulerReport, DispatchError> {
        let mut report = SchedulerReport::default();
        let mut retries_remaining = self.max_retries;

        info!(
            max_retries = self.max_retries,
            idle_interval_ms = u64::try_from(self.idle_interval.as_millis()).unwrap_or(u64::MAX),
            capacity = self.pool.capacity(),
            "starting polling scheduler"
        );

        while retries_remaining > 0 {
            self.set_state(SchedulerState::Running { retries_remaining });

            let cycle = match self.poll_once().await {
                Ok(cycle) => cycle,
                Err(err) => {
                    error!(error = %err, "fatal error, stopping scheduler");
                    self.set_state(SchedulerState::Terminated);
                    return Err(err);
                }
            };
            report.absorb(&cycle);

            if cycle.pending > 0 {
                retries_remaining = self.max_retries;
                if cycle.dispatched == 0 {
                    // Nothing runnable; avoid spinning on the source.
                    tokio::time::sleep(self.idle_interval).await;
                }
            } else {
                self.set_state(SchedulerState::IdleSleeping { retries_remaining });
                tokio::time::sleep(self.idle_interval).await;
                retries_remaining -= 1;
            }
        }

        self.set_state(SchedulerState::Terminated);
        info!(
            cycles = report.cycles,
            dispatched = report.dispatched,
            "exiting scheduler as there are no jobs to run"
        );
        Ok(report)
    }

    /// Run exactly one poll cycle.
    ///
    /// # Errors
    ///
    /// Returns a fatal error from the job source or a Worker after all of
    /// the cycle's dispatches have finished.
    pub async fn poll_once(&self) -> Result<CycleOutcome, DispatchError> {
        let jobs = self.source.list_pending().await?;
        let mut cycle = CycleOutcome {
            pending: jobs.len(),
            ..CycleOutcome::default()
        };
        if jobs.is_empty() {
            debug!("no pending jobs");
            return Ok(cycle);
        }
        debug!(pending = jobs.len(), "found pending jobs");

        let mut fatal = None;
        let mut tasks = JoinSet::new();

        for job in jobs {
            let Some(worker) = self.workers.get(job.kind) else {
                warn!(job_id = job.id, kind = %job.kind, "no worker registered for job kind");
                cycle.unroutable += 1;
                continue;
            };

            let Some(checkout) = Checkout::take(&self.pool) else {
                debug!(job_id = job.id, "no free execution resource, skipping job for now");
                cycle.skipped_no_resource += 1;
                continue;
            };

            match self.source.claim(&job).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!(job_id = job.id, "job already claimed elsewhere");
                    cycle.claims_lost += 1;
                    continue;
                }
                Err(err) => {
                    fatal = Some(err);
                    break;
                }
            }

            debug!(job_id = job.id, resource = %checkout.handle, "dispatching job");
            let source = Arc::clone(&self.source);
            tasks.spawn(dispatch(worker, source, job, checkout));
            cycle.dispatched += 1;
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(WorkOutcome::Completed)) => {}
                Ok(Ok(WorkOutcome::DomainFailure { .. })) => cycle.domain_failures += 1,
                Ok(Err(err)) => {
                    error!(error = %err, "worker failed fatally");
                    fatal.get_or_insert(err);
                }
                Err(join_err) => {
                    error!(error = %join_err, "worker task did not complete");
                    fatal.get_or_insert(DispatchError::WorkerPanicked(join_err.to_string()));
                }
            }
        }

        fatal.map_or(Ok(cycle), Err)
    }
}

async fn dispatch(
    worker: Arc<dyn Worker>,
    source: Arc<dyn JobSource>,
    job: Job,
    checkout: Checkout,
) -> Result<WorkOutcome, DispatchError> {
    let outcome = worker.run(&job, &checkout.handle).await?;
    drop(checkout);

    let status = match outcome {
        WorkOutcome::Completed => JobStatus::Completed,
        WorkOutcome::DomainFailure { .. } => JobStatus::Failed,
    };
    source.finish(&job, status).await?;
    debug!(job_id = job.id, ?status, "job finished");
    Ok(outcome)
}
