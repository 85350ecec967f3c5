//! Error types for dispatch and worker operations.
//!
//! Two layers: [`DispatchError`] is the infrastructure/fatal taxonomy that
//! aborts a scheduler run, and [`WorkerError`] is the tagged enumeration a
//! Worker's outer boundary pattern-matches to tell domain-negative outcomes
//! apart from faults.

use std::fmt;

use thiserror::Error;

/// Infrastructure and fatal errors. These propagate to the scheduler.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The artifact store rejected or failed a write.
    #[error("store error: {0}")]
    Store(String),
    /// The job source could not be queried or a claim failed outright.
    #[error("job source error: {0}")]
    JobSource(String),
    /// The analysis engine failed in a way that is not a domain outcome.
    #[error("engine error: {0}")]
    Engine(String),
    /// The test harness failed to run on the execution resource.
    #[error("harness error: {0}")]
    Harness(String),
    /// Exploration did not converge within the configured step budget.
    #[error("exploration did not converge after {limit} steps")]
    ExplorationDiverged {
        /// Configured step budget.
        limit: usize,
    },
    /// A Worker received a payload it cannot process.
    #[error("payload mismatch: {0}")]
    PayloadMismatch(String),
    /// A dispatched Worker task panicked.
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),
    /// Configuration values are invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Expected domain-failure kinds caught at a Worker's outer boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The engine declined to exploit, or the crash was not usable.
    CannotExploit,
    /// Exploitation preconditions were unmet.
    InvalidPrecondition,
    /// The engine's trace diverged from the recorded crash.
    TraceDivergence,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CannotExploit => write!(f, "cannot exploit"),
            Self::InvalidPrecondition => write!(f, "invalid precondition"),
            Self::TraceDivergence => write!(f, "trace divergence"),
        }
    }
}

/// Error produced by a Worker's inner routine.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// A domain-negative outcome; recovered by persisting a failure state.
    #[error("{kind}: {reason}")]
    Expected {
        /// Which expected kind occurred.
        kind: FailureKind,
        /// Human-readable detail.
        reason: String,
    },
    /// Anything else; propagated past the Worker boundary.
    #[error(transparent)]
    Fatal(#[from] DispatchError),
}

impl WorkerError {
    /// Shorthand for an expected failure.
    pub fn expected(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self::Expected {
            kind,
            reason: reason.into(),
        }
    }
}

/// Errors reported by the analysis engine capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The engine cannot exploit this crash.
    #[error("cannot exploit: {0}")]
    CannotExploit(String),
    /// Tracing the input diverged from the recorded crash.
    #[error("trace divergence: {0}")]
    TraceDivergence(String),
    /// Engine-level hard failure.
    #[error("{0}")]
    Hard(String),
}

impl From<EngineError> for WorkerError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::CannotExploit(reason) => Self::expected(FailureKind::CannotExploit, reason),
            EngineError::TraceDivergence(reason) => {
                Self::expected(FailureKind::TraceDivergence, reason)
            }
            EngineError::Hard(reason) => Self::Fatal(DispatchError::Engine(reason)),
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
