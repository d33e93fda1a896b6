//! Inspection tooling for CSV captures written by `rdtsc-runtime`.

pub mod error;
pub mod report;
