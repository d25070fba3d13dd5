//! Operator documentation lookup
//!
//! Nodes carry a `doc_key` computed from their operator name. The key
//! indexes a small static table of tuning notes; unmapped operators still
//! get a key (lower-cased, whitespace replaced by underscores) so callers can
//! plug in their own documentation source.

use serde::Serialize;

/// Tuning notes for one operator family
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocEntry {
    pub key: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
    pub optimization: &'static [&'static str],
    pub source_url: &'static str,
}

const DOC_KEY_MAP: &[(&str, &str)] = &[
    ("Aggregate", "aggregate"),
    ("Hash Aggregate", "aggregate"),
    ("Hash Join", "hash_join"),
    ("Nested Loop", "nest_loop"),
    ("Seq Scan", "seq_scan"),
    ("Index Scan", "index_scan"),
    ("Bitmap Heap Scan", "bitmap_heap"),
    ("Bitmap Index Scan", "bitmap_index"),
];

static DOCS: &[DocEntry] = &[
    DocEntry {
        key: "aggregate",
        title: "Aggregate",
        summary: "Combines rows using group keys; watch for large hash tables or partial aggregate opportunities in distributed coordinators.",
        optimization: &[
            "Consider pushing aggregates down to DNs or using pre-aggregated materialized views",
            "Ensure grouping keys leverage distribution to avoid re-partitioning",
        ],
        source_url: "https://docs.opengauss.org/en/docs/latest/docs/Developerguide/sql-aggregate.html",
    },
    DocEntry {
        key: "hash_join",
        title: "Hash Join",
        summary: "Builds a hash table from the smaller input and probes with the other; sensitive to work_mem sizing and skewed rows.",
        optimization: &[
            "Verify join keys are selective and stats are fresh (ANALYZE)",
            "Increase work_mem or enable spill-friendly operators when hash table exceeds memory",
            "Distribute tables on common keys in DWS to reduce network shuffle",
        ],
        source_url: "https://support.huaweicloud.com/devg-dws/dws_04_0401.html",
    },
    DocEntry {
        key: "seq_scan",
        title: "Sequential Scan",
        summary: "Reads an entire table; acceptable for analytic scans but problematic for OLTP-style filters when stats mispredict.",
        optimization: &[
            "Ensure predicates can use indexes or partition pruning",
            "Consider columnar storage or projections to reduce IO",
        ],
        source_url: "https://docs.opengauss.org/en/docs/latest/docs/Developerguide/sql-select.html",
    },
    DocEntry {
        key: "index_scan",
        title: "Index Scan",
        summary: "Traverses a B-Tree index and fetches heap rows; random IO can dominate when many rows are returned.",
        optimization: &[
            "Cover the query using index-only scans if possible",
            "Monitor heap fetch vs index hits to size buffer pools",
        ],
        source_url: "https://support.huaweicloud.com/intl/en-us/devg-opengauss/",
    },
];

/// Returns the documentation key for an operator name
///
/// Known operators map to a fixed key; anything else is lower-cased with
/// whitespace runs replaced by underscores.
pub fn doc_key_for(name: &str) -> String {
    let name = name.trim();
    DOC_KEY_MAP
        .iter()
        .find(|(operator, _)| *operator == name)
        .map(|(_, key)| (*key).to_string())
        .unwrap_or_else(|| {
            name.to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("_")
        })
}

/// Looks up the documentation entry for a key
pub fn lookup_doc(key: &str) -> Option<&'static DocEntry> {
    DOCS.iter().find(|entry| entry.key == key)
}

/// Returns every documentation entry
pub fn list_docs() -> &'static [DocEntry] {
    DOCS
}
