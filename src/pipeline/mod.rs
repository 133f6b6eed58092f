//! Pipeline Workflow
//!
//! The five-stage state machine, the session repair procedure, and the
//! one-shot guard protecting side effects from duplicate initialization.

mod controller;
mod repair;

pub use controller::{PipelineController, RepairOutcome};
pub use repair::OperationGuard;
