//! One-shot register-control fuzzing against a crash.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::core::artifact_store::ArtifactStore;
use crate::core::engine::AnalysisEngine;
use crate::core::error::{DispatchError, FailureKind, WorkerError};
use crate::core::model::{CrashingInput, Job, NewExploit};
use crate::core::resource_pool::ResourceHandle;
use crate::core::worker::{crash_payload, run_blocking, settle, WorkOutcome, Worker};
use crate::util::serde::{JobKind, PovType, Tristate};

/// Method name recorded on exploits produced by this Worker.
pub const TYPE1_FUZZER_METHOD: &str = "type1fuzzer";

/// Worker for [`JobKind::Type1Fuzz`] jobs. Explorability is not its concern:
/// an expected failure only sets `exploitable = No`.
#[derive(Clone)]
pub struct Type1FuzzWorker {
    engine: Arc<dyn AnalysisEngine>,
    store: Arc<dyn ArtifactStore>,
}

impl Type1FuzzWorker {
    /// Create the Worker.
    pub fn new(engine: Arc<dyn AnalysisEngine>, store: Arc<dyn ArtifactStore>) -> Self {
        Self { engine, store }
    }

    fn fuzz(&self, job: &Job, crash: &CrashingInput) -> Result<(), WorkerError> {
        info!(
            job_id = job.id,
            crash_id = crash.id,
            binary_id = job.binary.id,
            "type1 fuzzer beginning to exploit crash"
        );

        let fuzzer = self.engine.type1_fuzzer(&job.binary.path, &crash.blob)?;
        if !fuzzer.exploitable()? {
            return Err(WorkerError::expected(
                FailureKind::InvalidPrecondition,
                "crash was not exploitable",
            ));
        }
        info!(job_id = job.id, "crash was able to be exploited");

        self.store.create_exploit(NewExploit {
            binary: job.binary.id,
            job: job.id,
            pov_type: PovType::Type1,
            method: TYPE1_FUZZER_METHOD.to_string(),
            blob: fuzzer.dump_binary()?,
        })?;
        Ok(())
    }
}

#[async_trait]
impl Worker for Type1FuzzWorker {
    fn kind(&self) -> JobKind {
        JobKind::Type1Fuzz
    }

    async fn run(&self, job: &Job, _resource: &ResourceHandle) -> Result<WorkOutcome, DispatchError> {
        let worker = self.clone();
        let owned = job.clone();
        run_blocking(job, move || {
            let crash = crash_payload(&owned)?;
            let result = worker.fuzz(&owned, crash);
            settle(&owned, result, || {
                let mut failed = crash.clone();
                failed.exploitable = Tristate::No;
                worker.store.save_crash(&failed)
            })
        })
        .await
    }
}
