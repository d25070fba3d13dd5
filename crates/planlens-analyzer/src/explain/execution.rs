//! Execution Record Builder and ingestion entry point
//!
//! [`parse_plan`] sniffs the input format, runs the matching parser and
//! wraps the resulting node forest in a [`PlanExecution`].
//!
//! # Examples
//!
//! ```
//! use planlens_analyzer::explain::{parse_plan, ParseOptions, PlanFormat, sniff_format};
//!
//! let text = "Aggregate  (actual time=750)\n  ->  Hash Join  (rows=5400)";
//! assert_eq!(sniff_format(text), PlanFormat::Indented);
//!
//! let execution = parse_plan(text, ParseOptions::default()).unwrap();
//! assert_eq!(execution.summary.title, "Aggregate");
//! assert_eq!(execution.stats.node_count, 2);
//! ```

use crate::explain::dialect::detect_dialect;
use crate::explain::error::{ExplainError, Result};
use crate::explain::json::parse_json_plan;
use crate::explain::plan::{PlanDialect, PlanExecution, PlanNode, PlanSource, PlanSummary};
use crate::explain::stats::aggregate;
use crate::explain::tabular::{looks_tabular, parse_tabular_plan};
use crate::explain::text::parse_indented_plan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title used when neither the caller nor the plan provides one
const FALLBACK_TITLE: &str = "Imported Plan";

/// Fingerprint base used when the slug comes out empty
const FALLBACK_FINGERPRINT: &str = "plan";

/// Maximum length of the slug part of a fingerprint
const FINGERPRINT_SLUG_LEN: usize = 40;

/// Number of id characters appended to a fingerprint
const FINGERPRINT_ID_LEN: usize = 8;

/// Caller-supplied metadata for one ingestion
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptions {
    /// Overrides dialect detection
    pub dialect_hint: Option<PlanDialect>,
    pub title: Option<String>,
    pub source: Option<PlanSource>,
    /// Overrides the capture timestamp (defaults to now)
    pub captured_at: Option<DateTime<Utc>>,
    /// Query text associated with the plan
    pub sql_text: Option<String>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(mut self, dialect: PlanDialect) -> Self {
        self.dialect_hint = Some(dialect);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_source(mut self, source: PlanSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_captured_at(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = Some(captured_at);
        self
    }

    pub fn with_sql_text(mut self, sql: impl Into<String>) -> Self {
        self.sql_text = Some(sql.into());
        self
    }
}

/// Textual shape of an EXPLAIN dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanFormat {
    /// JSON with nested "Plans"
    TreeData,
    /// Column table with A-time / E-rows headers
    Tabular,
    /// Indented tracer output
    Indented,
}

/// Picks the parser for a piece of plan text
///
/// Order matters: structured payloads first, then the tabular markers, and
/// indented text for everything else.
pub fn sniff_format(text: &str) -> PlanFormat {
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        PlanFormat::TreeData
    } else if looks_tabular(trimmed) {
        PlanFormat::Tabular
    } else {
        PlanFormat::Indented
    }
}

/// Parses raw plan text into a complete execution record
///
/// Fails with [`ExplainError::EmptyInput`] for blank input and with
/// [`ExplainError::MalformedInput`] when a JSON payload cannot be decoded or
/// has no root plan.
pub fn parse_plan(raw: &str, options: ParseOptions) -> Result<PlanExecution> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ExplainError::EmptyInput);
    }

    let dialect = options
        .dialect_hint
        .unwrap_or_else(|| detect_dialect(text));
    let format = sniff_format(text);
    tracing::debug!(?format, %dialect, bytes = text.len(), "parsing execution plan");

    let nodes = match format {
        PlanFormat::TreeData => parse_json_plan(text)?,
        PlanFormat::Tabular => parse_tabular_plan(text)?,
        PlanFormat::Indented => parse_indented_plan(text)?,
    };

    Ok(build_execution(nodes, dialect, options, raw))
}

/// Wraps a normalized node forest in an execution record
///
/// Generates the summary id, derives title and fingerprint, and recomputes
/// the stats from the forest.
pub fn build_execution(
    nodes: Vec<PlanNode>,
    dialect: PlanDialect,
    options: ParseOptions,
    plan_source: &str,
) -> PlanExecution {
    let summary_id = Uuid::new_v4().to_string();
    let stats = aggregate(&nodes).to_execution_stats();

    let sql_text = options
        .sql_text
        .map(|sql| sql.trim().to_string())
        .filter(|sql| !sql.is_empty());
    let title = options
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| nodes.first().map(|root| root.name.clone()))
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());
    let sql_fingerprint = fingerprint(sql_text.as_deref().unwrap_or(&title), &summary_id);

    tracing::debug!(
        id = %summary_id,
        node_count = stats.node_count,
        total_time_ms = stats.total_time_ms,
        "built plan execution"
    );

    PlanExecution {
        summary: PlanSummary {
            id: summary_id,
            captured_at: options.captured_at.unwrap_or_else(Utc::now),
            dialect,
            source: options.source.unwrap_or_default(),
            sql_fingerprint,
            title,
            sql_text: sql_text.clone(),
        },
        plan_source: plan_source.to_string(),
        plan_query: sql_text,
        nodes,
        stats,
    }
}

/// Builds "<slug>-<first id characters>"
fn fingerprint(base: &str, id: &str) -> String {
    let slug = slugify(base);
    let slug = if slug.is_empty() {
        FALLBACK_FINGERPRINT
    } else {
        slug.as_str()
    };
    let short_id: String = id.chars().take(FINGERPRINT_ID_LEN).collect();
    format!("{slug}-{short_id}")
}

/// Lower-cases, joins words with dashes and drops anything outside [a-z0-9-]
pub fn slugify(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .take(FINGERPRINT_SLUG_LEN)
        .collect()
}
