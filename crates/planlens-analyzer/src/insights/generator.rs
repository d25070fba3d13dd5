//! Insight Generator
//!
//! Rules run per node in pre-order (parents before children, siblings in
//! plan order), followed by one plan-level memory rule. Nothing is
//! deduplicated: identical nodes produce identical findings.
//!
//! # Examples
//!
//! ```
//! use planlens_analyzer::explain::{parse_plan, ParseOptions};
//! use planlens_analyzer::insights::{evaluate, InsightSeverity};
//!
//! let plan = parse_plan(
//!     r#"{"Plan": {"Node Type": "Hash Join", "Actual Rows": 5400, "Plan Rows": 2400}}"#,
//!     ParseOptions::default(),
//! )
//! .unwrap();
//!
//! let insights = evaluate(Some(&plan));
//! assert!(insights.iter().any(|i| i.severity == InsightSeverity::Warn));
//! ```

use crate::explain::{PlanExecution, PlanNode};
use serde::{Deserialize, Serialize};

/// Severity of a plan insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSeverity {
    /// Informational observation
    Info,
    /// May impact performance
    Warn,
    /// Should be addressed first
    Critical,
}

impl InsightSeverity {
    /// Returns true if this is a critical issue
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Critical)
    }

    /// Returns the severity as a display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Critical => "critical",
        }
    }
}

/// One finding about a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInsight {
    /// Stable id derived from the rule and the node it concerns
    pub id: String,
    pub title: String,
    pub severity: InsightSeverity,
    pub details: String,
    /// Id of the node the insight refers to, for lookup only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_ref: Option<String>,
}

/// Limits that trigger insights
///
/// The defaults are the product thresholds; callers normally use
/// [`evaluate`], which applies them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightThresholds {
    /// Share of total plan time (0.0 - 1.0) above which a node dominates
    pub runtime_share: f64,
    /// Actual rows above this multiple of the estimate count as skew
    pub row_skew_factor: f64,
    /// Per-node memory in MB above which memory pressure is reported
    #[serde(rename = "nodeMemoryMB")]
    pub node_memory_mb: f64,
    /// Whole-plan memory in MB above which memory pressure is reported
    #[serde(rename = "planMemoryMB")]
    pub plan_memory_mb: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            runtime_share: 0.35,
            row_skew_factor: 2.0,
            node_memory_mb: 256.0,
            plan_memory_mb: 2048.0,
        }
    }
}

impl InsightThresholds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runtime_share(mut self, share: f64) -> Self {
        self.runtime_share = share;
        self
    }

    pub fn with_row_skew_factor(mut self, factor: f64) -> Self {
        self.row_skew_factor = factor;
        self
    }

    pub fn with_node_memory_mb(mut self, mb: f64) -> Self {
        self.node_memory_mb = mb;
        self
    }

    pub fn with_plan_memory_mb(mut self, mb: f64) -> Self {
        self.plan_memory_mb = mb;
        self
    }
}

/// Evaluates a plan with the default thresholds
///
/// An absent plan yields no insights.
pub fn evaluate(execution: Option<&PlanExecution>) -> Vec<PlanInsight> {
    evaluate_with(execution, &InsightThresholds::default())
}

/// Evaluates a plan with custom thresholds
pub fn evaluate_with(
    execution: Option<&PlanExecution>,
    thresholds: &InsightThresholds,
) -> Vec<PlanInsight> {
    let Some(execution) = execution else {
        return Vec::new();
    };

    let total_time_ms = execution.stats.total_time_ms as f64;
    let mut insights = Vec::new();
    for node in execution.iter_nodes() {
        node_insights(node, total_time_ms, thresholds, &mut insights);
    }

    let total_memory_mb = execution.stats.total_memory_mb;
    if total_memory_mb as f64 > thresholds.plan_memory_mb {
        insights.push(PlanInsight {
            id: format!("plan-memory-{}", execution.summary.id),
            title: "Plan level memory pressure".into(),
            severity: InsightSeverity::Warn,
            details: format!(
                "Total memory {total_memory_mb} MB. Review operators or increase resource pool limits."
            ),
            node_ref: None,
        });
    }

    tracing::debug!(count = insights.len(), "evaluated plan insights");
    insights
}

/// Applies the per-node rules to one node
fn node_insights(
    node: &PlanNode,
    total_time_ms: f64,
    thresholds: &InsightThresholds,
    insights: &mut Vec<PlanInsight>,
) {
    let metrics = &node.metrics;
    let insight = |rule: &str, title: String, severity, details: String| PlanInsight {
        id: format!("{rule}-{}", node.id),
        title,
        severity,
        details,
        node_ref: Some(node.id.clone()),
    };

    let runtime_share = if total_time_ms > 0.0 {
        metrics.actual_time_ms / total_time_ms
    } else {
        0.0
    };
    if runtime_share > thresholds.runtime_share {
        insights.push(insight(
            "runtime",
            format!("{} dominates runtime", node.name),
            InsightSeverity::Critical,
            format!(
                "{:.1}% of execution time spent on {}. Investigate predicates or indexes.",
                runtime_share * 100.0,
                node.name
            ),
        ));
    }

    if metrics.is_row_skewed(thresholds.row_skew_factor) {
        insights.push(insight(
            "row-skew",
            format!("{} row skew", node.name),
            InsightSeverity::Warn,
            format!(
                "Actual rows {} vs estimate {}. Refresh statistics or adjust join order.",
                metrics.actual_rows, metrics.estimated_rows
            ),
        ));
    }

    if let Some(memory_mb) = metrics.memory_mb
        && memory_mb > thresholds.node_memory_mb
    {
        insights.push(insight(
            "memory",
            format!("{} high memory usage", node.name),
            InsightSeverity::Warn,
            format!(
                "{memory_mb} MB allocated; consider increasing work_mem or reducing hash build size."
            ),
        ));
    }

    for (idx, warning) in node.warnings.iter().enumerate() {
        insights.push(insight(
            &format!("warning-{idx}"),
            warning.clone(),
            InsightSeverity::Info,
            format!("{}: {warning}", node.name),
        ));
    }
}
