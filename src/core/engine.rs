//! Capabilities consumed from the external crash-analysis engine.
//!
//! The engine itself lives outside this crate. Workers only see these traits;
//! an [`AnalysisEngine`] opens per-crash sessions against a target binary.

use std::path::Path;

use crate::core::error::EngineError;

/// Vulnerability classification reported for a crash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashType {
    /// Attacker controls the instruction pointer.
    IpOverwrite,
    /// Attacker controls a write target.
    ArbitraryWrite,
    /// Attacker controls a read address.
    ArbitraryRead,
    /// Null dereference.
    NullDereference,
    /// Anything else.
    Uncategorized,
}

/// One exploit the engine derived.
pub trait Exploit: Send {
    /// Engine technique that produced this exploit.
    fn method_name(&self) -> &str;

    /// Serialized proof of vulnerability.
    fn dump_binary(&self) -> Result<Vec<u8>, EngineError>;
}

/// Exploits derived from a crash.
#[derive(Default)]
pub struct ExploitSet {
    /// Register-control (type 1) exploits.
    pub register_setters: Vec<Box<dyn Exploit>>,
    /// Information-leak (type 2) exploits.
    pub leakers: Vec<Box<dyn Exploit>>,
    /// Engine's preferred type 1 exploit, if any.
    pub best_type1: Option<Box<dyn Exploit>>,
    /// Engine's preferred type 2 exploit, if any.
    pub best_type2: Option<Box<dyn Exploit>>,
}

impl ExploitSet {
    /// True when the engine could not build a single preferred exploit.
    pub const fn is_unproductive(&self) -> bool {
        self.best_type1.is_none() && self.best_type2.is_none()
    }
}

/// Analysis session over one crashing input.
pub trait CrashAnalysis: Send {
    /// Can a proof of vulnerability be derived directly?
    fn exploitable(&self) -> Result<bool, EngineError>;

    /// Can the crash be perturbed into a more useful state?
    fn explorable(&self) -> Result<bool, EngineError>;

    /// Classification of the crash.
    fn crash_type(&self) -> CrashType;

    /// Take one exploration step and return the newly discovered input.
    fn explore(&mut self) -> Result<Vec<u8>, EngineError>;

    /// Build an input that points the arbitrary read at the protected flag data.
    fn point_to_flag(&mut self) -> Result<Vec<u8>, EngineError>;

    /// Derive every exploit available for the current crash state.
    fn exploit(&mut self) -> Result<ExploitSet, EngineError>;
}

/// Single-technique register-control fuzzer over one crashing input.
pub trait PovFuzzer: Send {
    /// Did fuzzing yield a working exploit?
    fn exploitable(&self) -> Result<bool, EngineError>;

    /// Serialized proof of vulnerability.
    fn dump_binary(&self) -> Result<Vec<u8>, EngineError>;
}

/// Entry point into the analysis engine.
pub trait AnalysisEngine: Send + Sync {
    /// Open a triage session for `input` crashing `binary`.
    fn open_crash(&self, binary: &Path, input: &[u8]) -> Result<Box<dyn CrashAnalysis>, EngineError>;

    /// Run the type 1 crash fuzzer for `input` crashing `binary`.
    fn type1_fuzzer(&self, binary: &Path, input: &[u8]) -> Result<Box<dyn PovFuzzer>, EngineError>;
}
