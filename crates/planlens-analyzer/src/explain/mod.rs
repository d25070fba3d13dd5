//! Plan Ingestion Module
//!
//! This module turns raw EXPLAIN output into the canonical plan model:
//! - Tree-data (JSON with nested "Plans")
//! - Tabular text (A-time / E-rows column tables)
//! - Indented tracer text (the default)
//!
//! # Example
//!
//! ```
//! use planlens_analyzer::explain::{parse_plan, ParseOptions};
//!
//! let json = r#"{"Plan": {"Node Type": "Seq Scan", "Actual Rows": 10000, "Plan Rows": 10000, "Actual Total Time": 380}}"#;
//! let execution = parse_plan(json, ParseOptions::default()).unwrap();
//! assert_eq!(execution.nodes[0].name, "Seq Scan");
//! assert_eq!(execution.stats.total_time_ms, 380);
//! ```

pub mod dialect;
pub mod error;
pub mod execution;
pub mod json;
pub mod normalize;
pub mod plan;
pub mod stats;
pub mod tabular;
pub mod text;
pub mod units;

pub use dialect::detect_dialect;
pub use error::ExplainError;
pub use execution::{ParseOptions, PlanFormat, build_execution, parse_plan, sniff_format};
pub use json::parse_json_plan;
pub use normalize::{NodeDraft, ROW_SKEW_WARNING, TreeNode, assign_levels, nest_by_level};
pub use plan::{
    ExecutionStats, PlanDialect, PlanExecution, PlanMetric, PlanNode, PlanNodeIterator,
    PlanProperties, PlanSource, PlanSummary, PropertyValue,
};
pub use stats::{PlanStatistics, aggregate};
pub use tabular::parse_tabular_plan;
pub use text::parse_indented_plan;
