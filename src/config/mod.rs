//! Configuration models for the resource pool and scheduler budgets.

pub mod dispatch;

pub use dispatch::DispatchConfig;
