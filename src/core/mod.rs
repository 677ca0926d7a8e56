//! Pipeline engine: classification, retry, state, validation, and the
//! orchestration loop that ties them together

pub mod classify;
pub mod orchestrator;
pub mod processor;
pub mod retry;
pub mod state;
pub mod summary;
pub mod validation;

pub use orchestrator::Orchestrator;
pub use processor::{AttemptMode, PeriodProcessor};
pub use summary::PipelineSummary;
