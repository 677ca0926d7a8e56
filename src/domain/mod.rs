//! Core domain types and models

pub mod errors;
pub mod outcome;
pub mod period;
pub mod result;
pub mod table;

pub use errors::{SourceError, StrataError};
pub use outcome::{PeriodResult, ProcessingStage};
pub use period::Period;
pub use result::Result;
pub use table::{Cell, DataTable};
