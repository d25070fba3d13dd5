//! Tree-Data Parser
//!
//! Parses the structured JSON form of EXPLAIN output, where each node names
//! its operator in "Node Type" and nests its inputs in a "Plans" list:
//!
//! ```text
//! [{"Plan": {"Node Type": "Hash Join", "Plan Rows": 500, "Plans": [...]}}]
//! ```
//!
//! # Examples
//!
//! ```
//! use planlens_analyzer::explain::json::parse_json_plan;
//!
//! let nodes = parse_json_plan(r#"{"Plan": {"Node Type": "Seq Scan", "Actual Rows": 10}}"#).unwrap();
//! assert_eq!(nodes[0].name, "Seq Scan");
//! assert_eq!(nodes[0].metrics.actual_rows, 10);
//! ```

use crate::explain::error::{ExplainError, Result};
use crate::explain::normalize::NodeDraft;
use crate::explain::plan::{PlanMetric, PlanNode, PropertyValue};
use crate::explain::units::{as_count, parse_leading_number, parse_memory_mb};
use serde_json::Value;

/// Attributes copied verbatim into a node's properties when present
const PROPERTY_KEYS: [&str; 10] = [
    "Join Type",
    "Relation Name",
    "Alias",
    "Index Name",
    "Filter",
    "Hash Cond",
    "Merge Cond",
    "Recheck Cond",
    "Group Key",
    "Plan Width",
];

/// Parses a JSON plan document into a single-root forest
///
/// Accepts either an object (optionally wrapping the root in "Plan") or an
/// array whose first element does.
pub fn parse_json_plan(json: &str) -> Result<Vec<PlanNode>> {
    let trimmed = json.trim();
    if trimmed.is_empty() {
        return Err(ExplainError::EmptyInput);
    }

    let value: Value = serde_json::from_str(trimmed)?;

    let container = match &value {
        Value::Array(items) => items.first().ok_or_else(ExplainError::missing_plan)?,
        other => other,
    };
    let plan_obj = root_plan(container).ok_or_else(ExplainError::missing_plan)?;

    Ok(vec![convert_node(plan_obj, 0)?])
}

/// Returns the object holding the root operator
fn root_plan(container: &Value) -> Option<&Value> {
    if let Some(plan) = container.get("Plan") {
        return plan.is_object().then_some(plan);
    }
    container
        .get("Node Type")
        .is_some()
        .then_some(container)
}

/// Converts one JSON plan object (and its "Plans") at the given depth
fn convert_node(value: &Value, level: usize) -> Result<PlanNode> {
    if !value.is_object() {
        return Err(ExplainError::MalformedInput(format!(
            "plan node at level {level} is not an object"
        )));
    }

    let children = match value.get("Plans") {
        Some(Value::Array(plans)) => plans
            .iter()
            .map(|child| convert_node(child, level + 1))
            .collect::<Result<Vec<_>>>()?,
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            return Err(ExplainError::MalformedInput(
                "\"Plans\" must be a list of plan nodes".into(),
            ));
        }
    };

    let metrics = PlanMetric {
        actual_rows: count_field(value, "Actual Rows"),
        estimated_rows: count_field(value, "Plan Rows"),
        actual_time_ms: number_field(value, "Actual Total Time")
            .or_else(|| number_field(value, "Actual Startup Time"))
            .unwrap_or(0.0),
        estimated_time_ms: number_field(value, "Total Cost").unwrap_or(0.0),
        memory_mb: value
            .get("Peak Memory Usage")
            .or_else(|| value.get("Memory Used"))
            .and_then(memory_field),
        executor_id: value
            .get("DN Name")
            .and_then(|v| v.as_str())
            .map(String::from),
    };

    let name = value
        .get("Node Type")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    let mut draft = NodeDraft::new(name)
        .with_metrics(metrics)
        .with_children(children);
    for key in PROPERTY_KEYS {
        if let Some(property) = value.get(key).and_then(property_value) {
            draft.properties.insert(key.to_string(), property);
        }
    }

    Ok(draft.into_node(level))
}

/// Reads a numeric field, accepting numbers and strings with a leading number
///
/// Strings such as "12.5 ms" read as 12.5; "NaN" and "inf" are rejected.
fn number_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_number(s),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn count_field(value: &Value, key: &str) -> u64 {
    number_field(value, key).and_then(as_count).unwrap_or(0)
}

fn memory_field(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_memory_mb(s),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Converts a JSON attribute into a scalar property
///
/// Lists (such as "Group Key") are joined with ", ".
fn property_value(value: &Value) -> Option<PropertyValue> {
    match value {
        Value::String(s) => Some(PropertyValue::Text(s.clone())),
        Value::Number(n) => n.as_f64().map(PropertyValue::Number),
        Value::Bool(b) => Some(PropertyValue::Flag(*b)),
        Value::Array(items) => Some(PropertyValue::Text(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        )),
        Value::Null | Value::Object(_) => None,
    }
}
