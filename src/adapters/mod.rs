//! External-world adapters: the analytical source and the export sinks

pub mod sinks;
pub mod source;
