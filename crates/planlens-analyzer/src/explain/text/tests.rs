//! Tests for the indented text parser

use super::*;
use crate::explain::normalize::ROW_SKEW_WARNING;
use crate::explain::plan::PropertyValue;
use indoc::indoc;
use pretty_assertions::assert_eq;

fn assert_levels_consistent(nodes: &[PlanNode], level: usize) {
    for node in nodes {
        assert_eq!(node.level, level, "level mismatch at {}", node.name);
        assert_levels_consistent(&node.children, level + 1);
    }
}

#[test]
fn test_parse_three_level_chain() {
    let text = "Aggregate  (actual time=750)\n  ->  Hash Join  (rows=5400)\n    ->  Seq Scan on orders  (rows=10000)";

    let roots = parse_indented_plan(text).expect("parse failed");

    assert_eq!(roots.len(), 1);
    let aggregate = &roots[0];
    assert_eq!(aggregate.name, "Aggregate");
    assert_eq!(aggregate.level, 0);
    assert_eq!(aggregate.metrics.actual_time_ms, 750.0);

    let join = &aggregate.children[0];
    assert_eq!(join.name, "Hash Join");
    assert_eq!(join.level, 1);
    assert_eq!(join.metrics.actual_rows, 5400);
    assert_eq!(join.metrics.estimated_rows, 5400);

    let scan = &join.children[0];
    assert_eq!(scan.name, "Seq Scan on orders");
    assert_eq!(scan.level, 2);
    assert_eq!(scan.metrics.actual_rows, 10000);
    assert!(scan.children.is_empty());
}

#[test]
fn test_raw_line_is_retained() {
    let roots = parse_indented_plan("Limit  (cost=0.00..1.00 rows=1)").expect("parse failed");
    assert_eq!(
        roots[0].properties.get("raw"),
        Some(&PropertyValue::Text("Limit  (cost=0.00..1.00 rows=1)".into()))
    );
}

#[test]
fn test_explain_analyze_line() {
    let line = "Hash Join  (cost=12.50..48.75 rows=100 width=8) (actual time=0.41..7.25 rows=450 loops=1)";

    let node = &parse_indented_plan(line).expect("parse failed")[0];

    assert_eq!(node.name, "Hash Join");
    assert_eq!(node.metrics.estimated_time_ms, 12.5);
    assert_eq!(node.metrics.estimated_rows, 100);
    assert_eq!(node.metrics.actual_rows, 450);
    assert_eq!(node.metrics.actual_time_ms, 7.25);
    assert_eq!(node.warnings, vec![ROW_SKEW_WARNING.to_string()]);
}

#[test]
fn test_plan_rows_label_wins_for_estimate() {
    let metrics = extract_metrics("(rows=300 plan rows=100)");
    assert_eq!(metrics.actual_rows, 300);
    assert_eq!(metrics.estimated_rows, 100);
}

#[test]
fn test_memory_quantity() {
    assert_eq!(extract_metrics("(memory=96MB)").memory_mb, Some(96.0));
    assert_eq!(extract_metrics("(Peak Memory: 2GB)").memory_mb, Some(2048.0));
    assert_eq!(extract_metrics("(rows=1)").memory_mb, None);
}

#[test]
fn test_line_without_metrics() {
    let node = &parse_indented_plan("Result").expect("parse failed")[0];
    assert_eq!(node.name, "Result");
    assert_eq!(node.metrics, PlanMetric::default());
}

#[test]
fn test_siblings_and_blank_lines() {
    let text = indoc! {"
        Hash Join  (rows=10)

          ->  Seq Scan on orders  (rows=10)
          ->  Hash  (rows=5)
            ->  Seq Scan on users  (rows=5)
    "};

    let roots = parse_indented_plan(text).expect("parse failed");

    assert_eq!(roots.len(), 1);
    let names: Vec<&str> = roots[0].children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Seq Scan on orders", "Hash"]);
    assert_eq!(roots[0].children[1].children[0].name, "Seq Scan on users");
    assert_eq!(roots[0].node_count(), 4);
}

#[test]
fn test_indent_jumps_keep_levels_consistent() {
    let text = indoc! {"
        Gather  (rows=10)
          ->  Hash Join  (rows=10)
                ->  Seq Scan on a  (rows=10)
          ->  Seq Scan on b  (rows=1)
    "};

    let roots = parse_indented_plan(text).expect("parse failed");

    assert_levels_consistent(&roots, 0);
    assert_eq!(roots[0].children.len(), 2);
    assert_eq!(roots[0].children[0].children[0].level, 2);
}

#[test]
fn test_multiple_roots() {
    let roots = parse_indented_plan("Sort\nLimit").expect("parse failed");
    assert_eq!(roots.len(), 2);
}

#[test]
fn test_empty_input() {
    assert_eq!(parse_indented_plan(" \n\t "), Err(ExplainError::EmptyInput));
}
