//! Tabular-Text Parser
//!
//! Parses the column-table rendering produced by `EXPLAIN PERFORMANCE` on
//! distributed clusters:
//!
//! ```text
//!  id |          operation           | A-time | A-rows | E-rows | Peak Memory | E-costs
//! ----+------------------------------+--------+--------+--------+-------------+--------
//!   1 | ->  Streaming (type: GATHER) | 12.5   | 100    | 100    | 80KB        | 30.10
//! ```
//!
//! Columns are separated by pipes when the header uses them, and by runs of
//! two or more spaces otherwise; every row is split by the header's rule so
//! an operation cell like "->  Streaming" stays whole. Row depth comes from
//! dotted ids ("1.2.1" is two levels below "1"). Input without a
//! recognizable header is handed to the indented parser instead of being
//! rejected.

use crate::explain::error::{ExplainError, Result};
use crate::explain::normalize::{NodeDraft, assign_levels, nest_by_level};
use crate::explain::plan::{PlanMetric, PlanNode, PlanProperties, PropertyValue};
use crate::explain::text::parse_indented_plan;
use crate::explain::units::{parse_count, parse_leading_number, parse_memory_mb, parse_time_cell};
use regex::Regex;
use std::sync::LazyLock;

/// Marker tokens that identify the tabular rendering during format sniffing
pub const TIME_MARKER: &str = "A-time";
pub const ROW_ESTIMATE_MARKER: &str = "E-rows";

static PIPE_SPLIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\|\s*").expect("valid regex"));

static SPACE_SPLIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

static SEPARATOR_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+|=\s]+$").expect("valid regex"));

/// Returns true when the text carries both tabular marker tokens
pub fn looks_tabular(text: &str) -> bool {
    text.contains(TIME_MARKER) && text.contains(ROW_ESTIMATE_MARKER)
}

/// Parses tabular plan text into a forest
///
/// Rows whose column count differs from the header are skipped.
pub fn parse_tabular_plan(text: &str) -> Result<Vec<PlanNode>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ExplainError::EmptyInput);
    }

    let lines: Vec<&str> = trimmed
        .lines()
        .map(clean_line)
        .filter(|line| !line.is_empty() && !SEPARATOR_LINE_REGEX.is_match(line))
        .collect();

    let Some(header_idx) = lines.iter().position(|line| is_header(line)) else {
        tracing::warn!("no tabular header found, parsing as indented text");
        return parse_indented_plan(trimmed);
    };

    let delimiter = ColumnDelimiter::for_header(lines[header_idx]);
    let headers: Vec<String> = delimiter
        .split(lines[header_idx])
        .into_iter()
        .map(|h| h.to_lowercase())
        .collect();

    let mut flat = Vec::new();
    for (offset, line) in lines[header_idx + 1..].iter().enumerate() {
        let columns = delimiter.split(line);
        if columns.len() != headers.len() {
            tracing::debug!(
                expected = headers.len(),
                found = columns.len(),
                "skipping tabular row with mismatched columns"
            );
            continue;
        }

        let row: PlanProperties = headers
            .iter()
            .cloned()
            .zip(columns.into_iter().map(PropertyValue::from))
            .collect();
        flat.push(row_to_node(row, offset + 1));
    }

    let mut roots = nest_by_level(flat);
    assign_levels(&mut roots, 0);
    tracing::debug!(roots = roots.len(), "nested tabular plan");
    Ok(roots)
}

/// Trims a line and drops framing pipes at either end
fn clean_line(line: &str) -> &str {
    line.trim().trim_matches('|').trim()
}

fn is_header(line: &str) -> bool {
    let lowered = line.to_lowercase();
    lowered.contains("operation") && lowered.contains(&TIME_MARKER.to_lowercase())
}

/// Column separator chosen from the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnDelimiter {
    Pipe,
    Spaces,
}

impl ColumnDelimiter {
    fn for_header(header: &str) -> Self {
        if header.contains('|') {
            Self::Pipe
        } else {
            Self::Spaces
        }
    }

    fn split(self, line: &str) -> Vec<&str> {
        let regex = match self {
            Self::Pipe => &*PIPE_SPLIT_REGEX,
            Self::Spaces => &*SPACE_SPLIT_REGEX,
        };
        regex.split(line).map(str::trim).collect()
    }
}

/// Builds a level-tagged node from one header-keyed row
fn row_to_node(row: PlanProperties, step: usize) -> (usize, PlanNode) {
    let cell = |key: &str| row.get(key).and_then(|v| v.as_str()).map(str::trim);

    let name = cell("operation")
        .or_else(|| cell("node"))
        .map(String::from)
        .unwrap_or_else(|| format!("Step {step}"));

    let level = cell("id")
        .filter(|id| !id.is_empty())
        .map(|id| id.split('.').count() - 1)
        .unwrap_or(0);

    let metrics = PlanMetric {
        actual_rows: cell("a-rows")
            .or_else(|| cell("rows"))
            .and_then(parse_count)
            .unwrap_or(0),
        estimated_rows: cell("e-rows")
            .or_else(|| cell("rows"))
            .and_then(parse_count)
            .unwrap_or(0),
        actual_time_ms: cell("a-time").and_then(parse_time_cell).unwrap_or(0.0),
        estimated_time_ms: cell("e-costs")
            .and_then(parse_leading_number)
            .unwrap_or(0.0),
        memory_mb: cell("peak memory").and_then(parse_memory_mb),
        executor_id: cell("dn")
            .or_else(|| cell("node"))
            .filter(|dn| !dn.is_empty())
            .map(String::from),
    };

    let mut draft = NodeDraft::new(name).with_metrics(metrics);
    draft.properties = row;
    (level, draft.into_node(level))
}
