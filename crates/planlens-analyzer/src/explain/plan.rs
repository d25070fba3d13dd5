//! Plan Model - Data structures for representing ingested execution plans
//!
//! This module defines the canonical plan model shared by every format parser:
//! the per-operator [`PlanNode`] tree, its [`PlanMetric`] values, and the
//! [`PlanExecution`] record that wraps one ingestion.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Database product family that produced the plan text
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlanDialect {
    /// openGauss (the primary dialect)
    #[default]
    OpenGauss,
    /// GaussDB(DWS), the distributed warehouse flavour
    Dws,
}

impl PlanDialect {
    /// Returns the lower-case tag used in serialized records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenGauss => "opengauss",
            Self::Dws => "dws",
        }
    }

    /// Parses a dialect tag, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "opengauss" => Some(Self::OpenGauss),
            "dws" => Some(Self::Dws),
            _ => None,
        }
    }
}

impl fmt::Display for PlanDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the plan text reached the engine
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PlanSource {
    /// Pasted or uploaded by the user
    #[default]
    ManualImport,
    /// Captured by running EXPLAIN over a live connection
    LiveConnection,
}

impl PlanSource {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "manual-import" | "manual" | "upload" => Some(Self::ManualImport),
            "live-connection" | "live" | "connection" => Some(Self::LiveConnection),
            _ => None,
        }
    }
}

/// Runtime and estimate figures attached to one plan node
///
/// Every field defaults to zero (or absent) when the source format does not
/// carry it. Memory stays `None` when unknown and is never coerced to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetric {
    pub actual_rows: u64,
    pub estimated_rows: u64,
    pub actual_time_ms: f64,
    pub estimated_time_ms: f64,
    #[serde(rename = "memoryMB", default, skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<f64>,
    /// Distributed-execution node or shard that reported this operator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor_id: Option<String>,
}

impl PlanMetric {
    /// Returns true when actual rows exceed `factor` times the estimate
    pub fn is_row_skewed(&self, factor: f64) -> bool {
        self.actual_rows as f64 > self.estimated_rows as f64 * factor
    }

    /// Ratio of actual to estimated rows, or `None` when there is no estimate
    pub fn estimate_ratio(&self) -> Option<f64> {
        if self.estimated_rows == 0 {
            None
        } else {
            Some(self.actual_rows as f64 / self.estimated_rows as f64)
        }
    }
}

/// Scalar value stored in a node's property map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PropertyValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// Format-specific attributes of a node, in source order
pub type PlanProperties = IndexMap<String, PropertyValue>;

/// A single operator in the plan tree
///
/// Children are owned by their parent and kept in parse order. A node's
/// `level` is always its parent's level plus one; roots sit at level 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanNode {
    /// Opaque token generated at parse time
    pub id: String,
    /// Operator label, e.g. "Hash Join"
    pub name: String,
    pub level: usize,
    pub children: Vec<PlanNode>,
    pub metrics: PlanMetric,
    pub properties: PlanProperties,
    /// Observations recorded while parsing (row-estimate skew and the like)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Lookup key into the operator documentation table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_key: Option<String>,
}

impl PlanNode {
    /// Returns the total number of nodes in this subtree (including self)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Returns the maximum depth of this subtree
    pub fn depth(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
        }
    }

    /// Returns true if this is a leaf node (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns an iterator over this subtree (depth-first, parents first)
    pub fn iter(&self) -> PlanNodeIterator<'_> {
        PlanNodeIterator::new(std::slice::from_ref(self))
    }
}

/// Metadata about one ingestion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub id: String,
    pub captured_at: DateTime<Utc>,
    pub dialect: PlanDialect,
    pub source: PlanSource,
    /// Display and dedup aid; not guaranteed to be unique
    pub sql_fingerprint: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_text: Option<String>,
}

/// Rolled-up figures for a whole plan, rounded to whole units
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStats {
    pub total_time_ms: u64,
    #[serde(rename = "totalMemoryMB")]
    pub total_memory_mb: u64,
    pub node_count: usize,
}

/// One ingested plan: summary, verbatim source, node forest and stats
///
/// Built once per ingestion and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanExecution {
    pub summary: PlanSummary,
    /// The original input, kept for re-analysis and debugging
    pub plan_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_query: Option<String>,
    /// Normally a single root, but several are tolerated
    pub nodes: Vec<PlanNode>,
    pub stats: ExecutionStats,
}

impl PlanExecution {
    /// Returns the first root node, if any
    pub fn root(&self) -> Option<&PlanNode> {
        self.nodes.first()
    }

    /// Returns an iterator over all nodes in the forest (depth-first)
    pub fn iter_nodes(&self) -> PlanNodeIterator<'_> {
        PlanNodeIterator::new(&self.nodes)
    }

    /// Finds a node by its id
    pub fn find_node(&self, id: &str) -> Option<&PlanNode> {
        self.iter_nodes().find(|n| n.id == id)
    }

    /// Finds all nodes whose name starts with the given operator label
    pub fn find_nodes_by_name(&self, name: &str) -> Vec<&PlanNode> {
        self.iter_nodes()
            .filter(|n| n.name.starts_with(name))
            .collect()
    }
}

/// Iterator for traversing plan nodes depth-first
pub struct PlanNodeIterator<'a> {
    stack: Vec<&'a PlanNode>,
}

impl<'a> PlanNodeIterator<'a> {
    fn new(roots: &'a [PlanNode]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for PlanNodeIterator<'a> {
    type Item = &'a PlanNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so we visit them in order
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests;
