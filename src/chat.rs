//! AI assistant chat proxy.
//!
//! Forwards chat requests to the external assistant backend. When the
//! backend is unreachable or answers with something that is not a chat
//! completion, a templated reply is returned instead, chosen by the first
//! keyword found in the message.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::state::ResolvedApi;
use crate::types::AssistantConfig;

/// Path appended to the API base when no assistant endpoint is configured.
pub const DEFAULT_ASSISTANT_PATH: &str = "/ai-assistant/chat";

const FALLBACK_MODEL: &str = "afriai-assistant-fallback";

/// Incoming chat request from the dashboard widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub assistant_name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_filter: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub innovation_context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChoice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Chat-completion-shaped response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
    pub usage: ChatUsage,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Message must not be empty")]
    EmptyMessage,
}

/// Topic of a templated reply, matched in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTopic {
    Funding,
    Similar,
    Impact,
    Trend,
    Research,
    General,
}

impl ReplyTopic {
    const KEYWORDS: [(&'static str, ReplyTopic); 5] = [
        ("funding", ReplyTopic::Funding),
        ("similar", ReplyTopic::Similar),
        ("impact", ReplyTopic::Impact),
        ("trend", ReplyTopic::Trend),
        ("research", ReplyTopic::Research),
    ];

    pub fn for_message(message: &str) -> Self {
        let lowered = message.to_lowercase();
        Self::KEYWORDS
            .iter()
            .find(|(keyword, _)| lowered.contains(*keyword))
            .map(|(_, topic)| *topic)
            .unwrap_or(ReplyTopic::General)
    }
}

fn canned_reply(topic: ReplyTopic, assistant_name: &str) -> String {
    match topic {
        ReplyTopic::Funding => "Funding for African AI innovation is concentrated in a few hubs. \
            Nigeria, Kenya, South Africa and Egypt account for most disclosed rounds, with \
            fintech, healthcare and agritech leading. Grant programmes and development finance \
            remain important for early-stage teams, while venture rounds cluster at seed and \
            Series A. Check the funding dashboard for country and sector breakdowns."
            .to_string(),
        ReplyTopic::Similar => "Several innovations in the database address comparable problems. \
            Look for projects in the same sector and country first, then widen to neighbouring \
            markets with similar infrastructure. The innovations explorer lets you filter by \
            sector, stage and technology to compare approaches side by side."
            .to_string(),
        ReplyTopic::Impact => "Impact is easiest to assess through reach and outcomes: users \
            served, cost savings, and measurable improvements such as diagnosis times or crop \
            yields. Many listed innovations report pilot results; verified entries carry \
            outcome data you can compare across countries."
            .to_string(),
        ReplyTopic::Trend => "Recent trends include growth in local-language models, AI for \
            climate-smart agriculture, and health diagnostics on low-cost devices. Publication \
            volume has risen year over year, and collaboration between universities and \
            startups is increasing across the continent."
            .to_string(),
        ReplyTopic::Research => "African AI research output is growing steadily, led by \
            institutions in South Africa, Nigeria, Kenya and Egypt. Active areas include natural \
            language processing for African languages, computer vision for agriculture and \
            healthcare, and responsible AI policy. The publications dashboard tracks authors, \
            venues and citation trends."
            .to_string(),
        ReplyTopic::General => format!(
            "I'm {}, here to help you explore African AI innovation. Ask me about funding, \
             similar innovations, impact, trends or research, and I'll point you to the \
             relevant data.",
            assistant_name
        ),
    }
}

fn approx_tokens(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

/// Templated completion used when the assistant backend is unavailable.
pub fn fallback_completion(request: &ChatRequest) -> ChatCompletion {
    let topic = ReplyTopic::for_message(&request.message);
    let content = canned_reply(topic, &request.assistant_name);
    let prompt_tokens = approx_tokens(&request.message);
    let completion_tokens = approx_tokens(&content);

    ChatCompletion {
        id: format!("chatcmpl-{}", uuid::Uuid::new_v4()),
        object: "chat.completion".to_string(),
        created: Utc::now().timestamp(),
        model: FALLBACK_MODEL.to_string(),
        choices: vec![ChatChoice {
            index: 0,
            message: ChatMessage {
                role: "assistant".to_string(),
                content,
            },
            finish_reason: "stop".to_string(),
        }],
        usage: ChatUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        },
    }
}

pub struct AssistantProxy {
    client: reqwest::Client,
    endpoint: String,
    timeout_secs: u64,
}

impl AssistantProxy {
    pub fn new(config: &AssistantConfig, api: &ResolvedApi) -> Result<Self, FetchError> {
        let endpoint = match config.endpoint.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!("{}{}", api.endpoint_base(), DEFAULT_ASSISTANT_PATH),
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Decode and check a raw request body.
    pub fn parse_request(body: &[u8]) -> Result<ChatRequest, ChatError> {
        let request: ChatRequest =
            serde_json::from_slice(body).map_err(|e| ChatError::InvalidBody(e.to_string()))?;
        if request.message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        Ok(request)
    }

    async fn forward(&self, request: &ChatRequest) -> Result<serde_json::Value, FetchError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout_secs))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::http_status(status, body));
        }

        let value: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout_secs))?;

        if value.get("choices").map(|c| c.is_array()).unwrap_or(false) {
            Ok(value)
        } else {
            Err(FetchError::InvalidPayload(
                "assistant response has no choices".to_string(),
            ))
        }
    }

    /// Backend completion when available, templated completion otherwise.
    pub async fn respond(&self, request: &ChatRequest) -> serde_json::Value {
        match self.forward(request).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!(
                    "Assistant proxy: backend unavailable for {}, using templated reply: {}",
                    request.assistant_name,
                    e
                );
                serde_json::to_value(fallback_completion(request)).unwrap_or_default()
            }
        }
    }
}
