//! Language-model classification of submitted text
//!
//! The model is asked for a strict JSON object with a headline, summary,
//! location, category and two scores. Replies are tolerated when wrapped in
//! prose or code fences: the object between the first `{` and the last `}`
//! is parsed and every missing field gets a default.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::policy::NEUTRAL_SCORE;
use super::truncate_chars;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1";

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

pub const MODEL_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters of the submitted text used as a fallback headline
pub const HEADLINE_CHARS: usize = 50;

pub const DEFAULT_CATEGORY: &str = "general";

pub const DEFAULT_COUNTRY: &str = "India";

const SYSTEM_PROMPT: &str = "You output only valid JSON.";

/// Classifier errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Model reply contained no JSON object")]
    NoJson,

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Classification of one piece of news text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAnalysis {
    pub headline: String,
    pub summary: String,
    pub district: String,
    pub state: String,
    pub country: String,
    pub category: String,
    pub credibility: f64,
    pub fake_prob: f64,
    /// Set when the values came from a model rather than the fallback
    #[serde(skip)]
    pub model_generated: bool,
}

impl AgentAnalysis {
    /// Deterministic record used when no model output is available
    pub fn fallback(text: &str) -> Self {
        Self {
            headline: fallback_headline(text),
            summary: text.to_string(),
            district: String::new(),
            state: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            credibility: NEUTRAL_SCORE,
            fake_prob: NEUTRAL_SCORE,
            model_generated: false,
        }
    }

    /// `(credibility, fake_prob)` when produced by a model
    pub fn model_scores(&self) -> Option<(f64, f64)> {
        self.model_generated
            .then_some((self.credibility, self.fake_prob))
    }

    /// Build from a model reply, filling gaps from `text`
    pub fn from_model_reply(raw: &str, text: &str) -> Result<Self, ClassifierError> {
        let json = extract_json_object(raw).ok_or(ClassifierError::NoJson)?;
        let value: Value =
            serde_json::from_str(json).map_err(|e| ClassifierError::Parse(e.to_string()))?;
        let obj = value
            .as_object()
            .ok_or_else(|| ClassifierError::Parse("reply is not a JSON object".to_string()))?;

        let field = |key: &str| -> Option<String> {
            obj.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            headline: field("headline").unwrap_or_else(|| fallback_headline(text)),
            summary: field("summary").unwrap_or_else(|| text.to_string()),
            district: field("district").unwrap_or_default(),
            state: field("state").unwrap_or_default(),
            country: field("country").unwrap_or_default(),
            category: field("category").unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            credibility: score(obj.get("credibility")),
            fake_prob: score(obj.get("fake_prob")),
            model_generated: true,
        })
    }
}

/// First 50 characters, with an ellipsis when the text was longer
pub fn fallback_headline(text: &str) -> String {
    let head = truncate_chars(text, HEADLINE_CHARS);
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head.to_string()
    }
}

/// Score from a number or numeric string, clamped to [0, 1]
fn score(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
        .unwrap_or(NEUTRAL_SCORE)
}

/// Slice between the first `{` and the last `}` inclusive
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Prompt sent as the user message
pub fn build_prompt(text: &str) -> String {
    format!(
        r#"You are a news intelligence system and fact checking expert.

Return STRICT JSON only.
No explanation.
No markdown.
No extra text.
Focus on credibility and fake probability, judged against the current news situation.

JSON format:
{{
  "headline": "",
  "summary": "",
  "district": "",
  "state": "",
  "country": "",
  "category": "",
  "credibility": number between 0 and 1,
  "fake_prob": number between 0 and 1
}}

Text:
{}
"#,
        text
    )
}

/// Something that classifies news text
#[async_trait]
pub trait NewsClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<AgentAnalysis, ClassifierError>;
}

// ========================================
// OpenAI-compatible chat completion
// ========================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Chat-completion classifier (Groq by default)
pub struct LlmClassifier {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl LlmClassifier {
    pub fn new(api_key: &str) -> Result<Self, ClassifierError> {
        let http = reqwest::Client::builder()
            .timeout(MODEL_TIMEOUT)
            .build()
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        Ok(Self {
            api_key: api_key.to_string(),
            http,
            base_url: GROQ_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap, ClassifierError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| ClassifierError::Network(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl NewsClassifier for LlmClassifier {
    async fn classify(&self, text: &str) -> Result<AgentAnalysis, ClassifierError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(text),
                },
            ],
            temperature: 0.0,
        };

        debug!(model = %self.model, "Classification request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api(status.as_u16(), error_text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(e.to_string()))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ClassifierError::NoJson)?;

        AgentAnalysis::from_model_reply(content.trim(), text)
    }
}
