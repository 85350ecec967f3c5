//! Full crash triage: classify, leak, explore, then synthesize exploits.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::core::artifact_store::ArtifactStore;
use crate::core::engine::{AnalysisEngine, CrashAnalysis, CrashType, Exploit};
use crate::core::error::{DispatchError, EngineError, FailureKind, WorkerError};
use crate::core::model::{CrashingInput, ExploitWrite, Job, NewExploit};
use crate::core::resource_pool::ResourceHandle;
use crate::core::worker::{crash_payload, run_blocking, settle, WorkOutcome, Worker};
use crate::util::serde::{JobKind, PovType, Tristate};

/// Default cap on exploration steps per crash.
pub const DEFAULT_MAX_EXPLORE_STEPS: usize = 64;

/// Triage Worker for [`JobKind::CrashTriage`] jobs.
///
/// On success the crashing input ends with `triaged = true`; on an expected
/// failure it ends with `exploitable = No` and `explorable = No`. Either flag
/// write is the last durable action of the attempt. Fatal errors leave the
/// flags untouched.
#[derive(Clone)]
pub struct CrashTriageWorker {
    engine: Arc<dyn AnalysisEngine>,
    store: Arc<dyn ArtifactStore>,
    max_explore_steps: usize,
}

impl CrashTriageWorker {
    /// Create a triage Worker with the default exploration cap.
    pub fn new(engine: Arc<dyn AnalysisEngine>, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            engine,
            store,
            max_explore_steps: DEFAULT_MAX_EXPLORE_STEPS,
        }
    }

    /// Override the exploration cap.
    #[must_use]
    pub fn with_max_explore_steps(mut self, steps: usize) -> Self {
        self.max_explore_steps = steps;
        self
    }

    fn triage(&self, job: &Job, crash: &CrashingInput) -> Result<(), WorkerError> {
        info!(
            job_id = job.id,
            crash_id = crash.id,
            binary_id = job.binary.id,
            "beginning crash triage"
        );

        let mut session = self.engine.open_crash(&job.binary.path, &crash.blob)?;

        if !session.exploitable()? && !session.explorable()? {
            return Err(WorkerError::expected(
                FailureKind::InvalidPrecondition,
                "crash was not exploitable or explorable",
            ));
        }

        if session.crash_type() == CrashType::ArbitraryRead {
            self.leak_flag(job, session.as_mut())?;
        }

        let explored = self.drain_exploration(job, session.as_mut())?;
        if explored > 0 {
            debug!(job_id = job.id, steps = explored, "exploration drained");
        }

        let exploits = session.exploit()?;
        if exploits.is_unproductive() {
            error!(
                job_id = job.id,
                "crash had symptoms of exploitability, but no exploits could be built"
            );
        }
        debug!(
            job_id = job.id,
            type1 = exploits.register_setters.len(),
            type2 = exploits.leakers.len(),
            "exploits derived"
        );

        for exploit in &exploits.register_setters {
            self.persist_exploit(job, PovType::Type1, exploit.as_ref())?;
        }
        for exploit in &exploits.leakers {
            self.persist_exploit(job, PovType::Type2, exploit.as_ref())?;
        }

        let mut triaged = crash.clone();
        triaged.triaged = true;
        self.store.save_crash(&triaged)?;
        info!(job_id = job.id, crash_id = crash.id, "crash triaged");
        Ok(())
    }

    fn settle_triage(&self, job: &Job) -> Result<WorkOutcome, DispatchError> {
        let crash = crash_payload(job)?;
        let result = self.triage(job, crash);
        settle(job, result, || {
            let mut failed = crash.clone();
            failed.exploitable = Tristate::No;
            failed.explorable = Tristate::No;
            self.store.save_crash(&failed)
        })
    }

    /// Best effort: a refusal from the engine is logged, not raised.
    fn leak_flag(&self, job: &Job, session: &mut dyn CrashAnalysis) -> Result<(), WorkerError> {
        match session.point_to_flag() {
            Ok(blob) => {
                let id = self.store.create_test_case(job.binary.id, job.id, blob)?;
                info!(job_id = job.id, test_case_id = id, "stored flag-leaking test case");
                Ok(())
            }
            Err(EngineError::CannotExploit(reason)) => {
                warn!(
                    job_id = job.id,
                    %reason,
                    "crash was an arbitrary-read but was unable to point read at flag page"
                );
                Ok(())
            }
            Err(other) => Err(other.into()),
        }
    }

    fn drain_exploration(
        &self,
        job: &Job,
        session: &mut dyn CrashAnalysis,
    ) -> Result<usize, WorkerError> {
        let mut steps = 0;
        while session.explorable()? {
            if steps == self.max_explore_steps {
                return Err(DispatchError::ExplorationDiverged {
                    limit: self.max_explore_steps,
                }
                .into());
            }
            info!(job_id = job.id, step = steps + 1, "exploring crash");
            let blob = session.explore()?;
            self.store.create_test_case(job.binary.id, job.id, blob)?;
            steps += 1;
        }
        Ok(steps)
    }

    fn persist_exploit(
        &self,
        job: &Job,
        pov_type: PovType,
        exploit: &dyn Exploit,
    ) -> Result<(), WorkerError> {
        let method = exploit.method_name().to_string();
        let write = self.store.create_exploit(NewExploit {
            binary: job.binary.id,
            job: job.id,
            pov_type,
            method: method.clone(),
            blob: exploit.dump_binary()?,
        })?;
        match write {
            ExploitWrite::Created(id) => {
                info!(job_id = job.id, %pov_type, %method, artifact_id = %id, "exploit added");
            }
            ExploitWrite::Existing(id) => {
                debug!(job_id = job.id, %pov_type, %method, artifact_id = %id, "exploit already recorded");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Worker for CrashTriageWorker {
    fn kind(&self) -> JobKind {
        JobKind::CrashTriage
    }

    async fn run(&self, job: &Job, resource: &ResourceHandle) -> Result<WorkOutcome, DispatchError> {
        debug!(job_id = job.id, %resource, "crash triage worker starting");
        let worker = self.clone();
        let owned = job.clone();
        run_blocking(job, move || worker.settle_triage(&owned)).await
    }
}
