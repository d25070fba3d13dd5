//! Plan Tree Normalizer
//!
//! Every parser describes an operator as a [`NodeDraft`] and hands it to
//! [`NodeDraft::into_node`], which assigns identity, documentation key and
//! parse-time warnings. Parsers that read a flat, level-tagged sequence share
//! [`nest_by_level`] to rebuild the tree.

use crate::docs::doc_key_for;
use crate::explain::plan::{PlanMetric, PlanNode, PlanProperties, PropertyValue};
use uuid::Uuid;

/// Warning attached to nodes whose actual rows exceed twice the estimate
pub const ROW_SKEW_WARNING: &str = "Actual rows exceed estimates significantly";

/// Parse-time row skew factor
const ROW_SKEW_FACTOR: f64 = 2.0;

/// Name used when a source line or object carries no operator label
const FALLBACK_NAME: &str = "Operator";

/// Operator description produced by a format parser before normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDraft {
    pub name: String,
    pub metrics: PlanMetric,
    pub properties: PlanProperties,
    pub children: Vec<PlanNode>,
}

impl NodeDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_metrics(mut self, metrics: PlanMetric) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<PlanNode>) -> Self {
        self.children = children;
        self
    }

    /// Converts the draft into a canonical node at the given depth
    pub fn into_node(self, level: usize) -> PlanNode {
        let name = normalize_name(&self.name);
        let mut warnings = Vec::new();
        if self.metrics.is_row_skewed(ROW_SKEW_FACTOR) {
            warnings.push(ROW_SKEW_WARNING.to_string());
        }
        PlanNode {
            id: Uuid::new_v4().to_string(),
            doc_key: Some(doc_key_for(&name)),
            name,
            level,
            children: self.children,
            metrics: self.metrics,
            properties: self.properties,
            warnings,
        }
    }
}

/// Strips traversal markers and surrounding whitespace from an operator label
fn normalize_name(raw: &str) -> String {
    let name = raw.trim().trim_start_matches("->").trim();
    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// A value that can own an ordered list of children
pub trait TreeNode {
    fn push_child(&mut self, child: Self);
}

impl TreeNode for PlanNode {
    fn push_child(&mut self, child: Self) {
        self.children.push(child);
    }
}

/// Nests a flat sequence of `(level, node)` pairs into a forest
///
/// Keeps a stack of the most recent node at each open level. Each new node
/// first closes every open entry whose level is greater than or equal to its
/// own, then becomes a child of whatever remains on top of the stack (or a
/// new root). Sibling order follows input order.
pub fn nest_by_level<T: TreeNode>(items: impl IntoIterator<Item = (usize, T)>) -> Vec<T> {
    let mut roots: Vec<T> = Vec::new();
    let mut stack: Vec<(usize, T)> = Vec::new();

    for (level, node) in items {
        while stack.last().is_some_and(|(open, _)| *open >= level) {
            close_top(&mut stack, &mut roots);
        }
        stack.push((level, node));
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }

    roots
}

/// Pops the top of the stack and attaches it to its parent or the roots
fn close_top<T: TreeNode>(stack: &mut Vec<(usize, T)>, roots: &mut Vec<T>) {
    let Some((_, child)) = stack.pop() else {
        return;
    };
    match stack.last_mut() {
        Some((_, parent)) => parent.push_child(child),
        None => roots.push(child),
    }
}

/// Rewrites node levels from their position in the tree
///
/// Indentation or id columns may skip levels; after this pass every child
/// sits exactly one level below its parent.
pub fn assign_levels(nodes: &mut [PlanNode], level: usize) {
    for node in nodes {
        node.level = level;
        assign_levels(&mut node.children, level + 1);
    }
}
