//! Chat-completion response parsing
//!
//! Services often wrap the requested JSON in prose or code fences, and
//! individual fields may be missing or mistyped. Parsing is lenient: the
//! first well-formed JSON object in the message is taken and every field
//! falls back to an empty or neutral value.

use super::error::{AssistantError, Result};
use crate::insights::InsightSeverity;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const FALLBACK_FINDING_TITLE: &str = "Insight";

/// Overall verdict on a plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanQualityRating {
    Good,
    #[default]
    NeedsAttention,
    Critical,
}

impl PlanQualityRating {
    /// Unknown ratings map to `NeedsAttention`
    pub fn parse(s: &str) -> Self {
        match s {
            "good" => Self::Good,
            "critical" => Self::Critical,
            _ => Self::NeedsAttention,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::NeedsAttention => "needs_attention",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanQuality {
    pub rating: PlanQualityRating,
    pub rationale: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiFinding {
    pub title: String,
    pub severity: InsightSeverity,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiRecommendation {
    pub action: String,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiIndexHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub columns: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSource {
    pub title: String,
    pub url: String,
    pub reason: String,
}

/// Structured analysis returned by the service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsightResult {
    pub summary: String,
    pub plan_quality: PlanQuality,
    pub findings: Vec<AiFinding>,
    pub recommendations: Vec<AiRecommendation>,
    pub index_hints: Vec<AiIndexHint>,
    pub follow_ups: Vec<String>,
    pub sources: Vec<AiSource>,
}

impl AiInsightResult {
    /// Builds a result from an arbitrary JSON object, filling gaps with defaults
    pub fn from_json(payload: &Map<String, Value>) -> Self {
        let plan_quality = payload
            .get("planQuality")
            .and_then(Value::as_object)
            .map(|quality| PlanQuality {
                rating: quality
                    .get("rating")
                    .and_then(Value::as_str)
                    .map(PlanQualityRating::parse)
                    .unwrap_or_default(),
                rationale: string_list(quality.get("rationale")),
            })
            .unwrap_or_default();

        Self {
            summary: text_field(payload, "summary"),
            plan_quality,
            findings: objects(payload, "findings")
                .map(|item| AiFinding {
                    title: optional_text(item, "title")
                        .unwrap_or_else(|| FALLBACK_FINDING_TITLE.to_string()),
                    severity: item
                        .get("severity")
                        .and_then(Value::as_str)
                        .map(parse_severity)
                        .unwrap_or(InsightSeverity::Info),
                    detail: text_field(item, "detail"),
                    evidence: optional_text(item, "evidence"),
                })
                .collect(),
            recommendations: objects(payload, "recommendations")
                .map(|item| AiRecommendation {
                    action: text_field(item, "action"),
                    rationale: text_field(item, "rationale"),
                    impact: optional_text(item, "impact"),
                })
                .collect(),
            index_hints: objects(payload, "indexHints")
                .map(|item| AiIndexHint {
                    table: optional_text(item, "table"),
                    columns: string_list(item.get("columns")),
                    reason: text_field(item, "reason"),
                })
                .collect(),
            follow_ups: string_list(payload.get("followUps")),
            sources: objects(payload, "sources")
                .map(|item| AiSource {
                    title: text_field(item, "title"),
                    url: text_field(item, "url"),
                    reason: text_field(item, "reason"),
                })
                .collect(),
        }
    }
}

/// Unknown severities map to `Info`
fn parse_severity(s: &str) -> InsightSeverity {
    match s {
        "critical" => InsightSeverity::Critical,
        "warn" => InsightSeverity::Warn,
        _ => InsightSeverity::Info,
    }
}

fn optional_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    optional_text(object, key).unwrap_or_default()
}

/// String elements of an array; anything that is not an array is empty
fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Object elements of the array under `key`
fn objects<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    object
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Finds the first well-formed JSON object in free text
///
/// The whole text is tried first; otherwise each `{` is tried as the start
/// of an object, so leading prose, code fences and trailing remarks are
/// skipped.
pub fn extract_json_object(content: &str) -> Option<Map<String, Value>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(Value::Object(object)) = serde_json::from_str(trimmed) {
        return Some(object);
    }

    trimmed.match_indices('{').find_map(|(start, _)| {
        let mut stream = serde_json::Deserializer::from_str(&trimmed[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(object))) => Some(object),
            _ => None,
        }
    })
}

/// Reads the assistant message text from a chat-completion response body
///
/// Both complete (`message`) and streamed (`delta`) choice shapes are
/// accepted.
pub fn message_content(body: &str) -> Result<String> {
    let response: Value = serde_json::from_str(body)
        .map_err(|e| AssistantError::InvalidResponse(e.to_string()))?;
    let choice = response.get("choices").and_then(|choices| choices.get(0));

    let content = choice
        .and_then(|c| c.pointer("/message/content"))
        .and_then(Value::as_str)
        .or_else(|| {
            choice
                .and_then(|c| c.pointer("/delta/content"))
                .and_then(Value::as_str)
        })
        .filter(|content| !content.trim().is_empty())
        .ok_or(AssistantError::MissingContent)?;

    Ok(content.to_string())
}

/// Parses the message text into an analysis result
pub fn parse_insight_content(content: &str) -> Result<AiInsightResult> {
    let payload = extract_json_object(content).ok_or_else(|| {
        AssistantError::InvalidResponse("no JSON object in message content".into())
    })?;
    Ok(AiInsightResult::from_json(&payload))
}

/// Parses a full chat-completion response body into an analysis result
pub fn parse_chat_response(body: &str) -> Result<AiInsightResult> {
    let content = message_content(body)?;
    let result = parse_insight_content(&content);
    if let Err(err) = &result {
        tracing::warn!(error = %err, "analysis response could not be parsed");
    }
    result
}

#[cfg(test)]
mod tests;
