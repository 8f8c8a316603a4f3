//! Utility modules shared by the pipeline tasks.

pub mod exec;
pub mod fs;
pub mod log;
