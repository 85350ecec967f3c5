//! Job source backends.

pub mod memory;

pub use memory::InMemoryJobSource;
