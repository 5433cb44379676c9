//! CLI subcommand implementations.

mod input;
pub mod intervals;
pub mod report;
pub mod slo;
pub mod timeline;
