//! Terminal rendering for plans, insights and documentation

use comfy_table::{Cell, Table, presets::UTF8_FULL};
use planlens_analyzer::{DocEntry, PlanExecution, PlanInsight, PlanNode};

const INDENT: &str = "  ";
const CHILD_MARKER: &str = "-> ";

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header);
    table
}

/// Indented operator label, e.g. "    -> Seq Scan"
pub fn tree_label(node: &PlanNode) -> String {
    if node.level == 0 {
        node.name.clone()
    } else {
        format!("{}{CHILD_MARKER}{}", INDENT.repeat(node.level), node.name)
    }
}

fn format_ms(value: f64) -> String {
    format!("{value:.2}")
}

fn format_memory(memory_mb: Option<f64>) -> String {
    memory_mb
        .map(|mb| format!("{mb:.1} MB"))
        .unwrap_or_else(|| "-".to_string())
}

/// The plan tree as a table, one row per node in pre-order
pub fn render_plan(execution: &PlanExecution) -> String {
    let mut table = new_table(vec![
        "Operator", "Level", "Actual Rows", "Est. Rows", "Time (ms)", "Memory", "Executor",
    ]);
    for node in execution.iter_nodes() {
        let metrics = &node.metrics;
        table.add_row(vec![
            Cell::new(tree_label(node)),
            Cell::new(node.level),
            Cell::new(metrics.actual_rows),
            Cell::new(metrics.estimated_rows),
            Cell::new(format_ms(metrics.actual_time_ms)),
            Cell::new(format_memory(metrics.memory_mb)),
            Cell::new(metrics.executor_id.as_deref().unwrap_or("-")),
        ]);
    }
    table.to_string()
}

/// One-line summary of the execution record
pub fn render_summary(execution: &PlanExecution) -> String {
    let summary = &execution.summary;
    let stats = &execution.stats;
    format!(
        "{} [{}] fingerprint={} nodes={} total_time={} ms total_memory={} MB",
        summary.title,
        summary.dialect,
        summary.sql_fingerprint,
        stats.node_count,
        stats.total_time_ms,
        stats.total_memory_mb
    )
}

pub fn render_insights(insights: &[PlanInsight]) -> String {
    if insights.is_empty() {
        return "No insights".to_string();
    }
    let mut table = new_table(vec!["Severity", "Title", "Details"]);
    for insight in insights {
        table.add_row(vec![
            insight.severity.as_str(),
            insight.title.as_str(),
            insight.details.as_str(),
        ]);
    }
    table.to_string()
}

pub fn render_doc_list(entries: &[DocEntry]) -> String {
    let mut table = new_table(vec!["Key", "Title", "Source"]);
    for entry in entries {
        table.add_row(vec![entry.key, entry.title, entry.source_url]);
    }
    table.to_string()
}

pub fn render_doc(entry: &DocEntry) -> String {
    let mut out = format!("{}\n\n{}\n", entry.title, entry.summary);
    if !entry.optimization.is_empty() {
        out.push_str("\nOptimization:\n");
        for step in entry.optimization {
            out.push_str(&format!("- {step}\n"));
        }
    }
    out.push_str(&format!("\nSource: {}\n", entry.source_url));
    out
}
