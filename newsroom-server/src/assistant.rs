//! Chat assistant backed by a hosted vector-search assistant
//!
//! The end-user chatbot forwards each message to a Pinecone assistant and
//! returns its reply verbatim.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const PINECONE_ASSISTANT_URL: &str = "https://prod-1-data.ke.pinecone.io";
const USER_AGENT: &str = concat!("newsroom/", env!("CARGO_PKG_VERSION"));

pub const ASSISTANT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Answers a single chat message
#[async_trait]
pub trait ChatAssistant: Send + Sync {
    async fn chat(&self, message: &str) -> Result<String, AssistantError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: String,
}

/// Pinecone assistant chat client
pub struct PineconeAssistant {
    http: reqwest::Client,
    api_key: String,
    assistant_name: String,
    base_url: String,
}

impl PineconeAssistant {
    pub fn new(api_key: &str, assistant_name: &str) -> Result<Self, AssistantError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(ASSISTANT_TIMEOUT)
            .build()
            .map_err(|e| AssistantError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            assistant_name: assistant_name.to_string(),
            base_url: PINECONE_ASSISTANT_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ChatAssistant for PineconeAssistant {
    async fn chat(&self, message: &str) -> Result<String, AssistantError> {
        let url = format!("{}/assistant/chat/{}", self.base_url, self.assistant_name);
        let request = ChatRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: message,
            }],
            stream: false,
        };

        debug!(url = %url, "Assistant chat request");

        let response = self
            .http
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api(status.as_u16(), error_text));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::Parse(e.to_string()))?;

        Ok(reply.message.content)
    }
}
