//! CLI subcommand implementations.

pub mod analyze;
pub mod file;
pub mod gaps;
pub mod report;
