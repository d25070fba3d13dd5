//! Statistics Aggregator
//!
//! Rolls reported per-node figures up over a whole forest. Time is the plain
//! sum of every node's reported time (parents already include their inputs,
//! so nested work is counted more than once); memory sums known quantities
//! and treats unknown ones as zero.

use crate::explain::plan::{ExecutionStats, PlanNode};
use serde::{Deserialize, Serialize};

/// Unrounded totals over a plan forest
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanStatistics {
    pub total_time_ms: f64,
    #[serde(rename = "totalMemoryMB")]
    pub total_memory_mb: f64,
    pub node_count: usize,
    /// Number of levels on the longest root-to-leaf path
    pub depth: usize,
}

impl PlanStatistics {
    /// Rounds the totals to whole units for the execution record
    pub fn to_execution_stats(&self) -> ExecutionStats {
        ExecutionStats {
            total_time_ms: round_whole(self.total_time_ms),
            total_memory_mb: round_whole(self.total_memory_mb),
            node_count: self.node_count,
        }
    }
}

fn round_whole(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// Computes totals over every node in the forest
pub fn aggregate(nodes: &[PlanNode]) -> PlanStatistics {
    let mut stats = PlanStatistics {
        depth: forest_depth(nodes),
        ..PlanStatistics::default()
    };
    for node in nodes {
        accumulate(node, &mut stats);
    }
    stats
}

fn accumulate(node: &PlanNode, stats: &mut PlanStatistics) {
    stats.node_count += 1;
    stats.total_time_ms += node.metrics.actual_time_ms;
    stats.total_memory_mb += node.metrics.memory_mb.unwrap_or(0.0);
    for child in &node.children {
        accumulate(child, stats);
    }
}

/// Returns the number of levels in the deepest tree of the forest
pub fn forest_depth(nodes: &[PlanNode]) -> usize {
    nodes.iter().map(PlanNode::depth).max().unwrap_or(0)
}

#[cfg(test)]
mod tests;
