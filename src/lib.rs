//! Build stability across multiple CI sources.
//!
//! [`parser::parse_all`] turns a descriptor string into CI sources and
//! [`stability::aggregate`] turns a build history into stability metrics.
//! The remaining modules wire both together for the `cistab` binary.

pub mod auth;
pub mod builds;
pub mod collect;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod measures;
pub mod parser;
pub mod report;
pub mod sources;
pub mod stability;
