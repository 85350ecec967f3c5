//! Artifact store backends.

pub mod memory;

pub use memory::InMemoryArtifactStore;
