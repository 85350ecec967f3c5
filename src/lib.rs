//! # Triage Dispatch
//!
//! Job dispatch and execution-resource scheduling for an automated
//! crash-triage pipeline.
//!
//! Jobs (a crashing test case, or a test-execution request) arrive from a
//! [`JobSource`](core::JobSource). Each job is matched to one handle from a
//! bounded [`ExecutionResourcePool`](core::ExecutionResourcePool), claimed
//! exactly once, run through the [`Worker`](core::Worker) registered for its
//! kind, and its outcome recorded through an
//! [`ArtifactStore`](core::ArtifactStore), including the case where analysis
//! decides the input is not useful and that decision is the result.
//!
//! ## Pieces
//!
//! - **ExecutionResourcePool**: fixed set of exclusively-usable handles with
//!   non-blocking acquire and set-semantics release.
//! - **PollingScheduler**: lists pending jobs, acquires, claims, dispatches,
//!   and releases. Empty polls sleep `loiter / max_retries` and spend one
//!   retry; any non-empty poll resets the budget. Exits when the budget is gone.
//! - **Workers**: [`CrashTriageWorker`](core::CrashTriageWorker),
//!   [`Type1FuzzWorker`](core::Type1FuzzWorker) and
//!   [`TestRunWorker`](core::TestRunWorker). Expected domain failures are
//!   persisted as flags on the crashing input; infrastructure faults
//!   propagate and stop the run.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use triage_dispatch::builders::SchedulerBuilder;
//! use triage_dispatch::config::DispatchConfig;
//! use triage_dispatch::infra::{InMemoryArtifactStore, InMemoryJobSource};
//!
//! let source = Arc::new(InMemoryJobSource::new());
//! let store = Arc::new(InMemoryArtifactStore::default());
//! let scheduler = SchedulerBuilder::new(DispatchConfig::from_env()?, source)
//!     .with_crash_workers(my_engine, store)
//!     .build()?;
//! let report = scheduler.run().await?;
//! ```
//!
//! For complete scenarios, see `tests/scheduler_test.rs` and
//! `tests/triage_worker_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core dispatch abstractions and resource accounting.
pub mod core;
/// Configuration for pool capacity and scheduler budgets.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Infrastructure adapters for job sources and artifact stores.
pub mod infra;
/// Shared utilities.
pub mod util;
