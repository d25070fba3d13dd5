//! Tests for the statistics aggregator

use super::*;
use crate::explain::normalize::NodeDraft;
use crate::explain::plan::PlanMetric;
use pretty_assertions::assert_eq;

fn node(time: f64, memory: Option<f64>, children: Vec<PlanNode>) -> PlanNode {
    NodeDraft::new("Op")
        .with_metrics(PlanMetric {
            actual_time_ms: time,
            memory_mb: memory,
            ..PlanMetric::default()
        })
        .with_children(children)
        .into_node(0)
}

#[test]
fn test_sums_every_node() {
    let forest = vec![node(
        750.0,
        Some(48.0),
        vec![node(640.0, Some(96.0), vec![node(380.0, None, vec![])])],
    )];

    let stats = aggregate(&forest);

    assert_eq!(stats.node_count, 3);
    assert_eq!(stats.total_time_ms, 1770.0);
    assert_eq!(stats.total_memory_mb, 144.0);
    assert_eq!(stats.depth, 3);
}

#[test]
fn test_absent_memory_is_not_mutated() {
    let forest = vec![node(1.0, None, vec![])];
    let _ = aggregate(&forest);
    assert_eq!(forest[0].metrics.memory_mb, None);
}

#[test]
fn test_multiple_roots() {
    let forest = vec![
        node(1.0, None, vec![node(1.0, None, vec![])]),
        node(2.0, Some(1.5), vec![]),
    ];

    let stats = aggregate(&forest);

    assert_eq!(stats.node_count, 3);
    assert_eq!(stats.depth, 2);
    assert_eq!(stats.total_memory_mb, 1.5);
}

#[test]
fn test_empty_forest() {
    assert_eq!(aggregate(&[]), PlanStatistics::default());
}

#[test]
fn test_rounding_to_execution_stats() {
    let stats = PlanStatistics {
        total_time_ms: 1234.6,
        total_memory_mb: 204.4,
        node_count: 6,
        depth: 3,
    };

    assert_eq!(
        stats.to_execution_stats(),
        ExecutionStats {
            total_time_ms: 1235,
            total_memory_mb: 204,
            node_count: 6,
        }
    );
}
