//! Shared test doubles: a scripted analysis engine, a scripted job source and
//! a recording Worker.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use triage_dispatch::core::{
    AnalysisEngine, CrashAnalysis, CrashType, CrashingInput, DispatchError, EngineError, Exploit,
    ExploitSet, Job, JobSource, JobStatus, PovFuzzer, ResourceHandle, TargetBinary, WorkOutcome,
    Worker,
};
use triage_dispatch::util::serde::{JobId, JobKind};

// ============================================================================
// FIXTURES
// ============================================================================

pub fn binary() -> TargetBinary {
    TargetBinary {
        id: 42,
        path: "/cbs/qualifier_event/ccf3d301/ccf3d301_01".into(),
    }
}

pub fn crash_job(id: JobId, kind: JobKind) -> Job {
    Job::crash(
        id,
        kind,
        binary(),
        CrashingInput::new(id, b"1\nBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB\n1\n1\n1\n".to_vec()),
    )
}

// ============================================================================
// SCRIPTED ENGINE
// ============================================================================

/// Deterministic description of how the engine behaves for every crash.
#[derive(Clone)]
pub struct CrashScript {
    pub exploitable: bool,
    /// `explorable()` is true until this many `explore()` calls have happened.
    pub explore_steps: usize,
    pub explorable_forever: bool,
    pub crash_type: CrashType,
    pub flag_leak: Result<Vec<u8>, EngineError>,
    pub register_setters: Vec<&'static str>,
    pub leakers: Vec<&'static str>,
    pub exploit_error: Option<EngineError>,
    pub open_error: Option<EngineError>,
    pub fuzz_exploitable: bool,
    /// Wall-clock time `open_crash` blocks for, like a real tracer would.
    pub open_delay: Duration,
}

impl Default for CrashScript {
    fn default() -> Self {
        Self {
            exploitable: true,
            explore_steps: 0,
            explorable_forever: false,
            crash_type: CrashType::IpOverwrite,
            flag_leak: Err(EngineError::CannotExploit("no flag page".into())),
            register_setters: Vec::new(),
            leakers: Vec::new(),
            exploit_error: None,
            open_error: None,
            fuzz_exploitable: true,
            open_delay: Duration::ZERO,
        }
    }
}

pub struct StubExploit {
    method: String,
}

impl StubExploit {
    fn boxed(method: &str) -> Box<dyn Exploit> {
        Box::new(Self {
            method: method.to_string(),
        })
    }
}

impl Exploit for StubExploit {
    fn method_name(&self) -> &str {
        &self.method
    }

    fn dump_binary(&self) -> Result<Vec<u8>, EngineError> {
        Ok(format!("pov:{}", self.method).into_bytes())
    }
}

struct ScriptedSession {
    script: CrashScript,
    explored: usize,
}

impl CrashAnalysis for ScriptedSession {
    fn exploitable(&self) -> Result<bool, EngineError> {
        Ok(self.script.exploitable)
    }

    fn explorable(&self) -> Result<bool, EngineError> {
        Ok(self.script.explorable_forever || self.explored < self.script.explore_steps)
    }

    fn crash_type(&self) -> CrashType {
        self.script.crash_type
    }

    fn explore(&mut self) -> Result<Vec<u8>, EngineError> {
        self.explored += 1;
        Ok(format!("explored-{}", self.explored).into_bytes())
    }

    fn point_to_flag(&mut self) -> Result<Vec<u8>, EngineError> {
        self.script.flag_leak.clone()
    }

    fn exploit(&mut self) -> Result<ExploitSet, EngineError> {
        if let Some(err) = &self.script.exploit_error {
            return Err(err.clone());
        }
        Ok(ExploitSet {
            register_setters: self.script.register_setters.iter().map(|m| StubExploit::boxed(m)).collect(),
            leakers: self.script.leakers.iter().map(|m| StubExploit::boxed(m)).collect(),
            best_type1: self.script.register_setters.first().map(|m| StubExploit::boxed(m)),
            best_type2: self.script.leakers.first().map(|m| StubExploit::boxed(m)),
        })
    }
}

struct ScriptedFuzzer {
    exploitable: bool,
}

impl PovFuzzer for ScriptedFuzzer {
    fn exploitable(&self) -> Result<bool, EngineError> {
        Ok(self.exploitable)
    }

    fn dump_binary(&self) -> Result<Vec<u8>, EngineError> {
        Ok(b"pov:type1fuzzer".to_vec())
    }
}

pub struct ScriptedEngine {
    script: CrashScript,
    opened: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new(script: CrashScript) -> Arc<Self> {
        Arc::new(Self {
            script,
            opened: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Most `open_crash` calls that were in flight at the same time.
    pub fn peak_concurrent_opens(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl AnalysisEngine for ScriptedEngine {
    fn open_crash(&self, _binary: &Path, _input: &[u8]) -> Result<Box<dyn CrashAnalysis>, EngineError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(active, Ordering::SeqCst);
        std::thread::sleep(self.script.open_delay);
        self.active.fetch_sub(1, Ordering::SeqCst);
        if let Some(err) = &self.script.open_error {
            return Err(err.clone());
        }
        Ok(Box::new(ScriptedSession {
            script: self.script.clone(),
            explored: 0,
        }))
    }

    fn type1_fuzzer(&self, _binary: &Path, _input: &[u8]) -> Result<Box<dyn PovFuzzer>, EngineError> {
        if let Some(err) = &self.script.open_error {
            return Err(err.clone());
        }
        Ok(Box::new(ScriptedFuzzer {
            exploitable: self.script.fuzz_exploitable,
        }))
    }
}

// ============================================================================
// SCRIPTED JOB SOURCE
// ============================================================================

/// Serves one pre-arranged batch per poll, then empty batches.
#[derive(Default)]
pub struct ScriptedSource {
    batches: Mutex<VecDeque<Vec<Job>>>,
    grant_claims: bool,
    polls: AtomicU64,
    finished: Mutex<Vec<(JobId, JobStatus)>>,
}

impl ScriptedSource {
    pub fn new(batches: Vec<Vec<Job>>) -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(batches.into()),
            grant_claims: true,
            ..Self::default()
        })
    }

    /// A source whose every claim is lost to another scheduler.
    pub fn refusing(batches: Vec<Vec<Job>>) -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(batches.into()),
            grant_claims: false,
            ..Self::default()
        })
    }

    pub fn polls(&self) -> u64 {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> Vec<(JobId, JobStatus)> {
        self.finished.lock().clone()
    }
}

#[async_trait]
impl JobSource for ScriptedSource {
    async fn list_pending(&self) -> Result<Vec<Job>, DispatchError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(self.batches.lock().pop_front().unwrap_or_default())
    }

    async fn claim(&self, _job: &Job) -> Result<bool, DispatchError> {
        Ok(self.grant_claims)
    }

    async fn finish(&self, job: &Job, status: JobStatus) -> Result<(), DispatchError> {
        self.finished.lock().push((job.id, status));
        Ok(())
    }
}

// ============================================================================
// RECORDING WORKER
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Complete,
    Fatal,
    Panic,
}

/// Records which resource each job ran on.
pub struct RecordingWorker {
    kind: JobKind,
    behavior: Behavior,
    runs: Mutex<Vec<(JobId, String)>>,
}

impl RecordingWorker {
    pub fn new(kind: JobKind, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            kind,
            behavior,
            runs: Mutex::new(Vec::new()),
        })
    }

    pub fn runs(&self) -> Vec<(JobId, String)> {
        self.runs.lock().clone()
    }
}

#[async_trait]
impl Worker for RecordingWorker {
    fn kind(&self) -> JobKind {
        self.kind
    }

    async fn run(&self, job: &Job, resource: &ResourceHandle) -> Result<WorkOutcome, DispatchError> {
        self.runs.lock().push((job.id, resource.name().to_string()));
        tokio::task::yield_now().await;
        match self.behavior {
            Behavior::Complete => Ok(WorkOutcome::Completed),
            Behavior::Fatal => Err(DispatchError::Store("database unavailable".into())),
            Behavior::Panic => panic!("worker bug"),
        }
    }
}
