//! Infrastructure adapters for job sources and artifact stores.

pub mod source;
pub mod store;

pub use source::InMemoryJobSource;
pub use store::InMemoryArtifactStore;
