//! Chat-completion request construction
//!
//! # Examples
//!
//! ```
//! use planlens_analyzer::assistant::chat_endpoint;
//!
//! assert_eq!(
//!     chat_endpoint("https://api.example.com/v1/").as_deref(),
//!     Some("https://api.example.com/v1/chat/completions")
//! );
//! assert_eq!(chat_endpoint("   "), None);
//! ```

use super::error::{AssistantError, Result};
use crate::digest::{PlanDigest, compact};
use crate::explain::PlanExecution;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub const DWS_TUNING_DOC: &str = "https://support.huaweicloud.com/devg-dws/dws_04_0401.html";
pub const OPENGAUSS_TUNING_DOC: &str =
    "https://docs.opengauss.org/zh/docs/latest/performance_tuning_guide/sql_optimization.html";

const DIGEST_NOTE: &str = "Digest is intentionally compact; do not request full SQL or plan.";

const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 900;

const COMPLETIONS_SUFFIX: &str = "/chat/completions";
const VERSION_SUFFIX: &str = "/v1";

/// Instructions sent as the system message
pub const SYSTEM_PROMPT: &str = concat!(
    "You are a senior database performance analyst. ",
    "Given a compact JSON digest of SQL and execution plan, produce a concise, structured analysis. ",
    "Prioritize accuracy, avoid speculation, and explicitly call out assumptions. ",
    "Use the database-specific performance tuning documentation when dialect matches: ",
    "dws -> https://support.huaweicloud.com/devg-dws/dws_04_0401.html ",
    "opengauss -> https://docs.opengauss.org/zh/docs/latest/performance_tuning_guide/sql_optimization.html ",
    "If you can access the web, consult the relevant doc and reflect key guidance. ",
    "If web access is unavailable, leave sources empty and add a follow-up note to review the official doc. ",
    "Return ONLY valid JSON with the schema: ",
    "{summary: string, planQuality: {rating: 'good'|'needs_attention'|'critical', rationale: string[]}, ",
    "findings: {title:string,severity:'info'|'warn'|'critical',detail:string,evidence?:string}[], ",
    "recommendations: {action:string,rationale:string,impact?:string}[], ",
    "indexHints: {table?:string,columns:string[],reason:string}[], ",
    "followUps: string[], ",
    "sources: {title:string,url:string,reason:string}[]}. ",
    "Respond in Chinese when locale is 'zh', otherwise respond in English."
);

/// Connection settings for the analysis service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: String::new(),
        }
    }
}

impl AiSettings {
    /// True when base URL, API key and model are all non-blank
    pub fn is_configured(&self) -> bool {
        [&self.base_url, &self.api_key, &self.model]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// Full chat-completion URL derived from the base URL
    pub fn endpoint(&self) -> Option<String> {
        chat_endpoint(&self.base_url)
    }

    /// Value of the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.api_key.trim())
    }
}

/// Resolves the chat-completion URL for a base URL
///
/// Trailing slashes are dropped. A URL already ending in `/chat/completions`
/// is used as is, `/v1` gets `/chat/completions` appended, and anything else
/// gets `/v1/chat/completions`. A blank URL has no endpoint.
pub fn chat_endpoint(base_url: &str) -> Option<String> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let endpoint = if trimmed.ends_with(COMPLETIONS_SUFFIX) {
        trimmed.to_string()
    } else if trimmed.ends_with(VERSION_SUFFIX) {
        format!("{trimmed}{COMPLETIONS_SUFFIX}")
    } else {
        format!("{trimmed}{VERSION_SUFFIX}{COMPLETIONS_SUFFIX}")
    };
    Some(endpoint)
}

/// Per-dialect tuning guide links forwarded with every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningDocs {
    pub dws: String,
    pub opengauss: String,
}

impl Default for TuningDocs {
    fn default() -> Self {
        Self {
            dws: DWS_TUNING_DOC.to_string(),
            opengauss: OPENGAUSS_TUNING_DOC.to_string(),
        }
    }
}

/// The document sent as the user message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPayload {
    pub locale: String,
    pub digest: PlanDigest,
    pub tuning_docs: TuningDocs,
    pub note: String,
}

impl AnalysisPayload {
    pub fn new(digest: PlanDigest, locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            digest,
            tuning_docs: TuningDocs::default(),
            note: DIGEST_NOTE.to_string(),
        }
    }

    /// Compacts the execution and wraps the digest
    pub fn from_execution(execution: &PlanExecution, locale: impl Into<String>) -> Self {
        Self::new(compact(execution), locale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Body of a chat-completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

/// Builds the request body for a payload
///
/// Fails when the settings have no usable endpoint or are incomplete.
pub fn chat_request_body(settings: &AiSettings, payload: &AnalysisPayload) -> Result<ChatRequest> {
    if settings.endpoint().is_none() {
        return Err(AssistantError::MissingEndpoint);
    }
    if !settings.is_configured() {
        return Err(AssistantError::NotConfigured);
    }

    let user_message =
        serde_json::to_string(payload).map_err(|e| AssistantError::Encode(e.to_string()))?;

    tracing::debug!(
        model = %settings.model,
        bytes = user_message.len(),
        "built analysis request"
    );

    Ok(ChatRequest {
        model: settings.model.trim().to_string(),
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
        messages: vec![
            ChatMessage {
                role: ChatRole::System,
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: user_message,
            },
        ],
    })
}
