//! Digest Compactor
//!
//! Every list in a [`PlanDigest`] is capped, and the query text is collapsed
//! and excerpted once it exceeds [`MAX_SQL_CHARS`], so the digest stays small
//! no matter how large the plan is.
//!
//! # Examples
//!
//! ```
//! use planlens_analyzer::digest::compact;
//! use planlens_analyzer::explain::{parse_plan, ParseOptions};
//!
//! let plan = parse_plan(
//!     "Aggregate  (actual time=750)\n  ->  Seq Scan on orders  (rows=10000)",
//!     ParseOptions::new().with_sql_text("SELECT  count(*)\n FROM orders"),
//! )
//! .unwrap();
//!
//! let digest = compact(&plan);
//! assert_eq!(digest.sql.preview.as_deref(), Some("SELECT count(*) FROM orders"));
//! assert_eq!(digest.stats.depth, 2);
//! ```

use crate::explain::stats::forest_depth;
use crate::explain::{PlanDialect, PlanExecution, PlanNode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Character budget for the query preview
pub const MAX_SQL_CHARS: usize = 1400;

/// Cap on every per-node list
pub const MAX_NODES: usize = 14;

/// Cap on the operator-name histogram
pub const MAX_NODE_TYPES: usize = 12;

/// Estimate ratio above which a node is listed as skewed
pub const SKEW_RATIO: f64 = 1.8;

const SQL_HEAD_SHARE: f64 = 0.65;
const SQL_TAIL_SHARE: f64 = 0.25;
const SQL_ELLIPSIS: &str = " ... ";

/// Compacted query text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlDigest {
    /// Character count of the whitespace-collapsed text
    pub length: usize,
    pub preview: Option<String>,
    pub fingerprint: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestStats {
    pub node_count: usize,
    pub total_time_ms: u64,
    #[serde(rename = "totalMemoryMB")]
    pub total_memory_mb: u64,
    pub depth: usize,
}

/// Flat view of one node with a back-reference to its parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDigest {
    pub id: String,
    pub name: String,
    pub level: usize,
    pub parent_id: Option<String>,
    pub actual_rows: u64,
    pub estimated_rows: u64,
    pub actual_time_ms: f64,
    pub estimated_time_ms: f64,
    #[serde(
        rename = "memoryMB",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub memory_mb: Option<f64>,
    pub estimate_ratio: Option<f64>,
}

impl NodeDigest {
    fn from_node(node: &PlanNode, parent_id: Option<&str>) -> Self {
        let metrics = &node.metrics;
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            level: node.level,
            parent_id: parent_id.map(str::to_string),
            actual_rows: metrics.actual_rows,
            estimated_rows: metrics.estimated_rows,
            actual_time_ms: metrics.actual_time_ms,
            estimated_time_ms: metrics.estimated_time_ms,
            memory_mb: metrics.memory_mb,
            estimate_ratio: metrics.estimate_ratio(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTypeCount {
    pub name: String,
    pub count: usize,
}

/// A parser warning carried over from a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestWarning {
    pub node_id: String,
    pub node_name: String,
    pub warning: String,
}

/// Bounded projection of a plan execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDigest {
    pub dialect: PlanDialect,
    pub sql: SqlDigest,
    pub stats: DigestStats,
    pub top_nodes_by_time: Vec<NodeDigest>,
    pub top_nodes_by_rows: Vec<NodeDigest>,
    pub skewed_nodes: Vec<NodeDigest>,
    pub node_type_counts: Vec<NodeTypeCount>,
    pub warnings: Vec<DigestWarning>,
}

/// Compacts an execution into a digest
pub fn compact(execution: &PlanExecution) -> PlanDigest {
    let mut flattened = Vec::new();
    flatten(&execution.nodes, None, &mut flattened);

    let digests: Vec<NodeDigest> = flattened
        .iter()
        .map(|&(node, parent_id)| NodeDigest::from_node(node, parent_id))
        .collect();

    let top_nodes_by_time = top_by(&digests, |a, b| b.actual_time_ms.total_cmp(&a.actual_time_ms));
    let top_nodes_by_rows = top_by(&digests, |a, b| b.actual_rows.cmp(&a.actual_rows));

    let mut skewed_nodes: Vec<NodeDigest> = digests
        .iter()
        .filter(|d| d.estimate_ratio.is_some_and(|ratio| ratio > SKEW_RATIO))
        .cloned()
        .collect();
    skewed_nodes.sort_by(|a, b| ratio_of(b).total_cmp(&ratio_of(a)));
    skewed_nodes.truncate(MAX_NODES);

    let warnings = flattened
        .iter()
        .flat_map(|&(node, _)| {
            node.warnings.iter().map(move |warning| DigestWarning {
                node_id: node.id.clone(),
                node_name: node.name.clone(),
                warning: warning.clone(),
            })
        })
        .take(MAX_NODES)
        .collect();

    let stats = &execution.stats;
    let digest = PlanDigest {
        dialect: execution.summary.dialect,
        sql: compact_sql(
            execution.summary.sql_text.as_deref(),
            &execution.summary.sql_fingerprint,
        ),
        stats: DigestStats {
            node_count: stats.node_count,
            total_time_ms: stats.total_time_ms,
            total_memory_mb: stats.total_memory_mb,
            depth: forest_depth(&execution.nodes),
        },
        top_nodes_by_time,
        top_nodes_by_rows,
        skewed_nodes,
        node_type_counts: node_type_counts(&digests),
        warnings,
    };

    tracing::debug!(
        nodes = digests.len(),
        skewed = digest.skewed_nodes.len(),
        truncated = digest.sql.truncated,
        "compacted plan digest"
    );
    digest
}

/// Collapses whitespace in the query text and excerpts it when over budget
///
/// An over-budget text is replaced by its first 65% and last 25% of the
/// budget joined with `" ... "`; `length` always reports the collapsed size.
pub fn compact_sql(sql_text: Option<&str>, fingerprint: &str) -> SqlDigest {
    let collapsed = sql_text
        .map(|sql| sql.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    if collapsed.is_empty() {
        return SqlDigest {
            length: 0,
            preview: None,
            fingerprint: fingerprint.to_string(),
            truncated: false,
        };
    }

    let length = collapsed.chars().count();
    if length <= MAX_SQL_CHARS {
        return SqlDigest {
            length,
            preview: Some(collapsed),
            fingerprint: fingerprint.to_string(),
            truncated: false,
        };
    }

    let head_len = (MAX_SQL_CHARS as f64 * SQL_HEAD_SHARE) as usize;
    let tail_len = (MAX_SQL_CHARS as f64 * SQL_TAIL_SHARE) as usize;
    let head: String = collapsed.chars().take(head_len).collect();
    let tail: String = collapsed.chars().skip(length - tail_len).collect();

    SqlDigest {
        length,
        preview: Some(format!("{head}{SQL_ELLIPSIS}{tail}")),
        fingerprint: fingerprint.to_string(),
        truncated: true,
    }
}

/// Pre-order flattening with the parent id of each node
fn flatten<'a>(
    nodes: &'a [PlanNode],
    parent_id: Option<&'a str>,
    acc: &mut Vec<(&'a PlanNode, Option<&'a str>)>,
) {
    for node in nodes {
        acc.push((node, parent_id));
        flatten(&node.children, Some(node.id.as_str()), acc);
    }
}

/// Stable sort then cap; ties keep traversal order
fn top_by(
    digests: &[NodeDigest],
    compare: impl FnMut(&NodeDigest, &NodeDigest) -> Ordering,
) -> Vec<NodeDigest> {
    let mut sorted = digests.to_vec();
    sorted.sort_by(compare);
    sorted.truncate(MAX_NODES);
    sorted
}

fn ratio_of(digest: &NodeDigest) -> f64 {
    digest.estimate_ratio.unwrap_or(0.0)
}

fn node_type_counts(digests: &[NodeDigest]) -> Vec<NodeTypeCount> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for digest in digests {
        *counts.entry(digest.name.as_str()).or_default() += 1;
    }

    let mut histogram: Vec<NodeTypeCount> = counts
        .into_iter()
        .map(|(name, count)| NodeTypeCount {
            name: name.to_string(),
            count,
        })
        .collect();
    histogram.sort_by(|a, b| b.count.cmp(&a.count));
    histogram.truncate(MAX_NODE_TYPES);
    histogram
}
