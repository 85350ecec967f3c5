//! In-memory artifact store for development and testing.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::core::artifact_store::ArtifactStore;
use crate::core::error::DispatchError;
use crate::core::model::{
    CrashingInput, DerivedTestCase, ExploitArtifact, ExploitKey, ExploitWrite, NewExploit,
    TestOutcome,
};
use crate::util::clock::now_ms;
use crate::util::serde::{BinaryId, JobId, TestCaseId};

/// Recorded run of a test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcomeRecord {
    /// Job that ran the test.
    pub job: JobId,
    /// Test case that ran.
    pub test_case: TestCaseId,
    /// What happened.
    pub outcome: TestOutcome,
}

#[derive(Default)]
struct Tables {
    exploits: HashMap<ExploitKey, ExploitArtifact>,
    test_cases: Vec<DerivedTestCase>,
    crashes: HashMap<TestCaseId, CrashingInput>,
    crash_writes: usize,
    test_outcomes: Vec<TestOutcomeRecord>,
    next_test_case: TestCaseId,
}

/// Artifact store backed by maps under one mutex. Exploit creation is keyed
/// on [`ExploitKey`], so repeated writes of the same exploit are no-ops.
pub struct InMemoryArtifactStore {
    tables: Mutex<Tables>,
}

impl InMemoryArtifactStore {
    /// Create an empty store. Derived test case ids start at `first_test_case_id`
    /// so they do not collide with crash ids the caller already uses.
    pub fn new(first_test_case_id: TestCaseId) -> Self {
        Self {
            tables: Mutex::new(Tables {
                next_test_case: first_test_case_id,
                ..Tables::default()
            }),
        }
    }

    /// Snapshot of persisted exploits, oldest first.
    pub fn exploits(&self) -> Vec<ExploitArtifact> {
        let mut all: Vec<_> = self.tables.lock().exploits.values().cloned().collect();
        all.sort_by_key(|e| (e.created_at_ms, e.job, e.method.clone()));
        all
    }

    /// Snapshot of derived test cases in creation order.
    pub fn test_cases(&self) -> Vec<DerivedTestCase> {
        self.tables.lock().test_cases.clone()
    }

    /// Last saved state of a crashing input.
    pub fn crash(&self, id: TestCaseId) -> Option<CrashingInput> {
        self.tables.lock().crashes.get(&id).cloned()
    }

    /// Number of crash flag writes served.
    pub fn crash_writes(&self) -> usize {
        self.tables.lock().crash_writes
    }

    /// Recorded test outcomes in order.
    pub fn test_outcomes(&self) -> Vec<TestOutcomeRecord> {
        self.tables.lock().test_outcomes.clone()
    }
}

impl Default for InMemoryArtifactStore {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn create_exploit(&self, exploit: NewExploit) -> Result<ExploitWrite, DispatchError> {
        let key = exploit.key();
        let mut tables = self.tables.lock();
        if let Some(existing) = tables.exploits.get(&key) {
            return Ok(ExploitWrite::Existing(existing.id));
        }
        let id = uuid::Uuid::new_v4();
        tables.exploits.insert(
            key,
            ExploitArtifact {
                id,
                binary: exploit.binary,
                job: exploit.job,
                pov_type: exploit.pov_type,
                method: exploit.method,
                blob: exploit.blob,
                created_at_ms: now_ms(),
            },
        );
        Ok(ExploitWrite::Created(id))
    }

    fn create_test_case(
        &self,
        binary: BinaryId,
        job: JobId,
        blob: Vec<u8>,
    ) -> Result<TestCaseId, DispatchError> {
        let mut tables = self.tables.lock();
        let id = tables.next_test_case;
        tables.next_test_case += 1;
        tables.test_cases.push(DerivedTestCase {
            id,
            binary,
            job,
            blob,
        });
        Ok(id)
    }

    fn save_crash(&self, crash: &CrashingInput) -> Result<(), DispatchError> {
        let mut tables = self.tables.lock();
        tables.crashes.insert(crash.id, crash.clone());
        tables.crash_writes += 1;
        Ok(())
    }

    fn record_test_outcome(
        &self,
        job: JobId,
        test_case: TestCaseId,
        outcome: &TestOutcome,
    ) -> Result<(), DispatchError> {
        self.tables.lock().test_outcomes.push(TestOutcomeRecord {
            job,
            test_case,
            outcome: outcome.clone(),
        });
        Ok(())
    }
}
