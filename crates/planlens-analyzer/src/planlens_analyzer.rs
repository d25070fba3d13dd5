//! PlanLens Analyzer - Execution plan ingestion and analysis
//!
//! This crate provides functionality for:
//! - Parsing EXPLAIN output (JSON, column tables, indented text) into one plan tree
//! - Rolling up runtime, memory and size statistics
//! - Rule-based insights over a parsed plan
//! - Bounded plan digests for an external analysis service

pub mod assistant;
pub mod digest;
pub mod docs;
pub mod explain;
pub mod insights;

pub use assistant::*;
pub use digest::*;
pub use docs::*;
pub use explain::*;
pub use insights::*;
