//! Bounded pool of exclusively-usable execution resources.
//!
//! Handles are created once at construction and only ever move between the
//! free set and their holders. Every mutation happens inside a single
//! `parking_lot::Mutex` critical section, so membership test and removal are
//! atomic with respect to each other.

use std::collections::HashSet;
use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Opaque token granting exclusive use of one execution environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHandle {
    slot: usize,
    name: String,
}

impl ResourceHandle {
    /// Create a handle for pool slot `slot` with a display name.
    pub fn new(slot: usize, name: impl Into<String>) -> Self {
        Self {
            slot,
            name: name.into(),
        }
    }

    /// Pool slot this handle occupies.
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// Display name, e.g. `vm-0`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Total handles owned by the pool.
    pub capacity: usize,
    /// Handles currently free.
    pub free: usize,
    /// Handles currently held by callers.
    pub outstanding: usize,
}

/// Fixed-size pool of [`ResourceHandle`]s with non-blocking acquire.
#[derive(Debug)]
pub struct ExecutionResourcePool {
    /// Every handle this pool issued; release of anything else is ignored.
    members: HashSet<ResourceHandle>,
    free: Mutex<HashSet<ResourceHandle>>,
}

impl ExecutionResourcePool {
    /// Create a pool of `capacity` handles named `vm-0` .. `vm-{capacity-1}`.
    pub fn new(capacity: usize) -> Self {
        Self::from_handles((0..capacity).map(|slot| ResourceHandle::new(slot, format!("vm-{slot}"))))
    }

    /// Create a pool from externally provisioned handles. Duplicates collapse.
    pub fn from_handles(handles: impl IntoIterator<Item = ResourceHandle>) -> Self {
        let members: HashSet<ResourceHandle> = handles.into_iter().collect();
        let free = members.clone();
        tracing::debug!(capacity = members.len(), "execution resource pool created");
        Self {
            members,
            free: Mutex::new(free),
        }
    }

    /// Take a free handle, or `None` if every handle is in use. Never blocks
    /// waiting for a release; callers decide their own retry policy.
    pub fn acquire(&self) -> Option<ResourceHandle> {
        let mut free = self.free.lock();
        let handle = free.iter().next().cloned()?;
        free.remove(&handle);
        drop(free);
        tracing::trace!(resource = %handle, "resource acquired");
        Some(handle)
    }

    /// Return a handle to the free set.
    ///
    /// Releasing an already-free handle is a no-op; releasing a handle this
    /// pool never issued is ignored with a warning. Neither changes capacity.
    pub fn release(&self, handle: ResourceHandle) {
        if !self.members.contains(&handle) {
            tracing::warn!(resource = %handle, "ignoring release of foreign resource handle");
            return;
        }
        let inserted = self.free.lock().insert(handle.clone());
        if inserted {
            tracing::trace!(resource = %handle, "resource released");
        } else {
            tracing::warn!(resource = %handle, "resource released twice");
        }
    }

    /// Total handles owned by the pool.
    pub fn capacity(&self) -> usize {
        self.members.len()
    }

    /// Number of free handles right now.
    pub fn available(&self) -> usize {
        self.free.lock().len()
    }

    /// Occupancy snapshot.
    pub fn stats(&self) -> PoolStats {
        let free = self.available();
        PoolStats {
            capacity: self.capacity(),
            free,
            outstanding: self.capacity() - free,
        }
    }
}
