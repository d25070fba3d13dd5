//! Tests for the Plan Model

use super::*;
use crate::explain::normalize::NodeDraft;
use pretty_assertions::assert_eq;

fn sample_tree() -> PlanNode {
    // Build a tree:
    //       Hash Join
    //      /         \
    //   Seq Scan     Hash
    //                  |
    //               Seq Scan
    let inner_scan = NodeDraft::new("Seq Scan on users").into_node(2);
    let hash = NodeDraft::new("Hash")
        .with_children(vec![inner_scan])
        .into_node(1);
    let outer_scan = NodeDraft::new("Seq Scan on orders").into_node(1);
    NodeDraft::new("Hash Join")
        .with_children(vec![outer_scan, hash])
        .into_node(0)
}

fn sample_execution(nodes: Vec<PlanNode>) -> PlanExecution {
    PlanExecution {
        summary: PlanSummary {
            id: "summary".into(),
            captured_at: Utc::now(),
            dialect: PlanDialect::OpenGauss,
            source: PlanSource::ManualImport,
            sql_fingerprint: "plan-summary".into(),
            title: "Plan".into(),
            sql_text: None,
        },
        plan_source: String::new(),
        plan_query: None,
        nodes,
        stats: ExecutionStats::default(),
    }
}

#[test]
fn test_node_count_and_depth() {
    let root = sample_tree();

    assert_eq!(root.node_count(), 4);
    assert_eq!(root.depth(), 3);
    assert!(!root.is_leaf());
    assert!(root.children[0].is_leaf());
}

#[test]
fn test_iterator_is_pre_order() {
    let root = sample_tree();

    let names: Vec<&str> = root.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Hash Join", "Seq Scan on orders", "Hash", "Seq Scan on users"]
    );
}

#[test]
fn test_forest_iteration_and_lookup() {
    let execution = sample_execution(vec![sample_tree(), NodeDraft::new("Limit").into_node(0)]);

    let names: Vec<&str> = execution.iter_nodes().map(|n| n.name.as_str()).collect();
    assert_eq!(names.len(), 5);
    assert_eq!(names.last(), Some(&"Limit"));

    let hash_id = execution.nodes[0].children[1].id.clone();
    assert_eq!(
        execution.find_node(&hash_id).map(|n| n.name.as_str()),
        Some("Hash")
    );
    assert!(execution.find_node("missing").is_none());
    assert_eq!(execution.find_nodes_by_name("Seq Scan").len(), 2);
    assert_eq!(execution.root().map(|n| n.name.as_str()), Some("Hash Join"));
}

#[test]
fn test_estimate_ratio() {
    let metric = PlanMetric {
        actual_rows: 5400,
        estimated_rows: 2400,
        ..PlanMetric::default()
    };
    assert_eq!(metric.estimate_ratio(), Some(2.25));
    assert!(metric.is_row_skewed(2.0));

    let no_estimate = PlanMetric {
        actual_rows: 10,
        ..PlanMetric::default()
    };
    assert_eq!(no_estimate.estimate_ratio(), None);
}

mod serialization_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_metric_field_names() {
        let metric = PlanMetric {
            actual_rows: 1,
            estimated_rows: 2,
            actual_time_ms: 3.0,
            estimated_time_ms: 4.0,
            memory_mb: Some(5.0),
            executor_id: Some("dn_1".into()),
        };

        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "actualRows": 1,
                "estimatedRows": 2,
                "actualTimeMs": 3.0,
                "estimatedTimeMs": 4.0,
                "memoryMB": 5.0,
                "executorId": "dn_1"
            })
        );
    }

    #[test]
    fn test_absent_memory_is_omitted() {
        let json = serde_json::to_value(PlanMetric::default()).unwrap();
        assert!(json.get("memoryMB").is_none());
    }

    #[test]
    fn test_enum_tags() {
        assert_eq!(serde_json::to_string(&PlanDialect::Dws).unwrap(), "\"dws\"");
        assert_eq!(
            serde_json::to_string(&PlanDialect::OpenGauss).unwrap(),
            "\"opengauss\""
        );
        assert_eq!(
            serde_json::to_string(&PlanSource::LiveConnection).unwrap(),
            "\"live-connection\""
        );
    }

    #[test]
    fn test_property_values_are_untagged() {
        let value: PropertyValue = serde_json::from_str("36").unwrap();
        assert_eq!(value, PropertyValue::Number(36.0));
        let value: PropertyValue = serde_json::from_str("\"Inner\"").unwrap();
        assert_eq!(value.as_str(), Some("Inner"));
        let value: PropertyValue = serde_json::from_str("true").unwrap();
        assert_eq!(value, PropertyValue::Flag(true));
    }

    #[test]
    fn test_property_value_accessors() {
        assert_eq!(PropertyValue::Number(72.0).as_f64(), Some(72.0));
        assert_eq!(PropertyValue::Number(72.0).as_str(), None);
        assert_eq!(PropertyValue::Text("72".into()).as_f64(), None);
        assert_eq!(PropertyValue::Flag(true).as_f64(), None);
        assert_eq!(PropertyValue::Flag(true).as_str(), None);
    }

    #[test]
    fn test_execution_round_trip() {
        let execution = sample_execution(vec![sample_tree()]);
        let json = serde_json::to_string(&execution).unwrap();
        let parsed: PlanExecution = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, execution);
    }
}

#[test]
fn test_dialect_and_source_parsing() {
    assert_eq!(PlanDialect::parse("DWS"), Some(PlanDialect::Dws));
    assert_eq!(PlanDialect::parse("openGauss"), Some(PlanDialect::OpenGauss));
    assert_eq!(PlanDialect::parse("mysql"), None);
    assert_eq!(PlanSource::parse("upload"), Some(PlanSource::ManualImport));
    assert_eq!(
        PlanSource::parse("live-connection"),
        Some(PlanSource::LiveConnection)
    );
    assert_eq!(PlanDialect::Dws.to_string(), "dws");
}
