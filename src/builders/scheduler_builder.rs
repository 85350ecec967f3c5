//! Builder that wires a [`PollingScheduler`] from a [`DispatchConfig`].

use std::sync::Arc;

use crate::config::DispatchConfig;
use crate::core::artifact_store::ArtifactStore;
use crate::core::engine::AnalysisEngine;
use crate::core::error::DispatchError;
use crate::core::job_source::JobSource;
use crate::core::resource_pool::ExecutionResourcePool;
use crate::core::scheduler::PollingScheduler;
use crate::core::worker::{Worker, WorkerRegistry};
use crate::core::workers::{CrashTriageWorker, TestHarness, TestRunWorker, Type1FuzzWorker};

/// Collects a config, a job source, an optional pool and Workers.
pub struct SchedulerBuilder {
    config: DispatchConfig,
    source: Arc<dyn JobSource>,
    pool: Option<Arc<ExecutionResourcePool>>,
    workers: WorkerRegistry,
}

impl SchedulerBuilder {
    /// Start a builder.
    pub fn new(config: DispatchConfig, source: Arc<dyn JobSource>) -> Self {
        Self {
            config,
            source,
            pool: None,
            workers: WorkerRegistry::new(),
        }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Use an externally provisioned pool instead of `pool_capacity` default handles.
    #[must_use]
    pub fn with_pool(mut self, pool: Arc<ExecutionResourcePool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Register an arbitrary Worker.
    #[must_use]
    pub fn with_worker(mut self, worker: Arc<dyn Worker>) -> Self {
        self.workers.register(worker);
        self
    }

    /// Register the crash-triage and type 1 fuzzing Workers.
    #[must_use]
    pub fn with_crash_workers(
        self,
        engine: Arc<dyn AnalysisEngine>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        let triage = CrashTriageWorker::new(Arc::clone(&engine), Arc::clone(&store))
            .with_max_explore_steps(self.config.max_explore_steps);
        let fuzz = Type1FuzzWorker::new(engine, store);
        self.with_worker(Arc::new(triage)).with_worker(Arc::new(fuzz))
    }

    /// Register the test-execution Worker.
    #[must_use]
    pub fn with_test_worker(
        self,
        harness: Arc<dyn TestHarness>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        self.with_worker(Arc::new(TestRunWorker::new(harness, store)))
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidConfig`] if the configuration is
    /// invalid or no Worker was registered.
    pub fn build(self) -> Result<PollingScheduler, DispatchError> {
        self.config
            .validate()
            .map_err(|e| DispatchError::InvalidConfig(format!("config invalid: {e}")))?;
        if self.workers.is_empty() {
            return Err(DispatchError::InvalidConfig("no workers registered".into()));
        }

        let pool = self
            .pool
            .unwrap_or_else(|| Arc::new(ExecutionResourcePool::new(self.config.pool_capacity)));
        tracing::info!(
            capacity = pool.capacity(),
            kinds = ?self.workers.kinds(),
            "building polling scheduler"
        );

        Ok(PollingScheduler::new(self.source, pool, self.workers)
            .with_idle_budget(self.config.loiter(), self.config.max_retries))
    }
}
