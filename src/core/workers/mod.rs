//! Concrete Workers, one per job kind.

pub mod test_run;
pub mod triage;
pub mod type1_fuzz;

pub use test_run::{TestHarness, TestRunWorker};
pub use triage::CrashTriageWorker;
pub use type1_fuzz::Type1FuzzWorker;
