//! Indented-Text Parser
//!
//! Parses the human-readable tracer output, where nesting is conveyed only by
//! indentation and each line reads "name  (metrics)":
//!
//! ```text
//! Aggregate  (actual time=750)
//!   ->  Hash Join  (rows=5400)
//!     ->  Seq Scan on orders  (rows=10000)
//! ```
//!
//! Two columns of indentation make one level. Every non-blank line becomes a
//! node, and the flat sequence is nested with
//! [`nest_by_level`](crate::explain::normalize::nest_by_level).

use crate::explain::error::{ExplainError, Result};
use crate::explain::normalize::{NodeDraft, assign_levels, nest_by_level};
use crate::explain::plan::{PlanMetric, PlanNode};
use crate::explain::units::{as_count, capture_number, parse_memory_mb};
use regex::Regex;
use std::sync::LazyLock;

/// Columns of indentation per tree level
const INDENT_WIDTH: usize = 2;

/// Separates the operator name from its metrics
const METRICS_BOUNDARY: &str = "  (";

static ROWS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)rows=([0-9.]+)").expect("valid regex"));

static PLAN_ROWS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)plan rows=([0-9.]+)").expect("valid regex"));

static ACTUAL_GROUP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)actual[^)]*").expect("valid regex"));

static ACTUAL_TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)actual time=([0-9.]+)").expect("valid regex"));

static COST_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)cost=([0-9]+(?:\.[0-9]+)?)\.\.").expect("valid regex"));

static MEMORY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)memory\s*[=:]\s*([0-9.]+\s*(?:kb|mb|gb|k|m|g)?)").expect("valid regex")
});

/// Parses indented plan text into a forest
pub fn parse_indented_plan(text: &str) -> Result<Vec<PlanNode>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ExplainError::EmptyInput);
    }

    let flat = trimmed
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line);

    let mut roots = nest_by_level(flat);
    assign_levels(&mut roots, 0);
    tracing::debug!(roots = roots.len(), "nested indented plan");
    Ok(roots)
}

/// Converts one line into a level-tagged node
fn parse_line(line: &str) -> (usize, PlanNode) {
    let indent = line.len() - line.trim_start().len();
    let level = indent / INDENT_WIDTH;

    let cleaned = line.trim().trim_start_matches("->").trim_start();
    let (name, metrics_text) = match cleaned.find(METRICS_BOUNDARY) {
        Some(idx) => (&cleaned[..idx], &cleaned[idx + 2..]),
        None => (cleaned, ""),
    };

    let node = NodeDraft::new(name)
        .with_metrics(extract_metrics(metrics_text))
        .with_property("raw", line)
        .into_node(level);
    (level, node)
}

/// Reads labeled figures from the parenthesized part of a line
///
/// A `rows=` inside an `actual ...` group is the actual row count; otherwise
/// the first `rows=` on the line is used for both actual and estimate.
pub fn extract_metrics(text: &str) -> PlanMetric {
    let first_rows = capture_number(text, &ROWS_REGEX);
    let actual_rows = ACTUAL_GROUP_REGEX
        .find(text)
        .and_then(|group| capture_number(group.as_str(), &ROWS_REGEX))
        .or(first_rows);
    let estimated_rows = capture_number(text, &PLAN_ROWS_REGEX).or(first_rows);

    PlanMetric {
        actual_rows: actual_rows.and_then(as_count).unwrap_or(0),
        estimated_rows: estimated_rows.and_then(as_count).unwrap_or(0),
        actual_time_ms: capture_number(text, &ACTUAL_TIME_REGEX).unwrap_or(0.0),
        estimated_time_ms: capture_number(text, &COST_REGEX).unwrap_or(0.0),
        memory_mb: MEMORY_REGEX
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| parse_memory_mb(m.as_str())),
        executor_id: None,
    }
}

#[cfg(test)]
mod tests;
