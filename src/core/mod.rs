//! Core dispatch abstractions: resource pool, Worker contract, scheduler.

pub mod artifact_store;
pub mod engine;
pub mod error;
pub mod job_source;
pub mod model;
pub mod resource_pool;
pub mod scheduler;
pub mod worker;
pub mod workers;

pub use artifact_store::ArtifactStore;
pub use engine::{AnalysisEngine, CrashAnalysis, CrashType, Exploit, ExploitSet, PovFuzzer};
pub use error::{AppResult, DispatchError, EngineError, FailureKind, WorkerError};
pub use job_source::JobSource;
pub use model::{
    CrashingInput, DerivedTestCase, ExploitArtifact, ExploitKey, ExploitWrite, Job, JobPayload,
    JobStatus, NewExploit, ResourceLimits, TargetBinary, TestOutcome, TestRequest,
};
pub use resource_pool::{ExecutionResourcePool, PoolStats, ResourceHandle};
pub use scheduler::{CycleOutcome, PollingScheduler, SchedulerReport, SchedulerState};
pub use worker::{WorkOutcome, Worker, WorkerRegistry};
pub use workers::{CrashTriageWorker, TestHarness, TestRunWorker, Type1FuzzWorker};
