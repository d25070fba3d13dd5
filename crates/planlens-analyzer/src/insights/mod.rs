//! Plan Insights Module
//!
//! Evaluates threshold rules over a parsed plan and reports severity-tagged
//! findings: runtime hot spots, row-estimate skew, memory pressure, and the
//! warnings recorded while parsing.

mod generator;

pub use generator::*;
