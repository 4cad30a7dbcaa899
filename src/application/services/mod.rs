//! Application services - Business logic orchestration

pub mod reconciler;

pub use reconciler::{CommandReconciler, ReconcileReport};
