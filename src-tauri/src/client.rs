//! Chat-completion client for OpenAI-compatible providers

use async_trait::async_trait;
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::models::{Message, Settings};

pub const MAX_TOKENS: u32 = 2048;

const REFERER: &str = "tauri://localhost";
const TITLE: &str = "Overlay Chat";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("{0}")]
    Transport(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("{0}")]
    Api(String),
    #[error("Unexpected response from provider: {0}")]
    Malformed(String),
}

impl ChatError {
    /// Text shown in the conversation when a turn fails
    pub fn to_chat_content(&self) -> String {
        format!("Error: {}. Please check your API key in settings.", self)
    }
}

/// Where to send a request and how to authenticate it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub url: String,
    pub api_key: String,
}

impl From<&Settings> for ProviderEndpoint {
    fn from(settings: &Settings) -> Self {
        Self {
            url: settings.api_provider_url.clone(),
            api_key: settings.api_key.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            max_tokens: MAX_TOKENS,
            messages,
        }
    }
}

/// Outcome of interpreting a provider response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Reply(String),
    ApiError(String),
    Malformed,
}

/// Turns a decoded response body into a reply or an error
///
/// The reply and the error are read independently, so an odd shape in one
/// never hides the other.
pub fn parse_completion(body: Value) -> Completion {
    if let Some(content) = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
    {
        return Completion::Reply(content.to_string());
    }

    match body.get("error") {
        Some(Value::Object(error)) => Completion::ApiError(
            error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown API error")
                .to_string(),
        ),
        Some(Value::String(message)) if !message.is_empty() => {
            Completion::ApiError(message.clone())
        }
        _ => Completion::Malformed,
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends one request and returns the assistant's reply text
    async fn complete(
        &self,
        endpoint: &ProviderEndpoint,
        request: &ChatRequest,
    ) -> Result<String, ChatError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn build_request(
        &self,
        endpoint: &ProviderEndpoint,
        request: &ChatRequest,
    ) -> Result<reqwest::Request, ChatError> {
        self.client
            .post(endpoint.url.as_str())
            .header("Authorization", format!("Bearer {}", endpoint.api_key))
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE)
            .header("Content-Type", "application/json")
            .json(request)
            .build()
            .map_err(|e| ChatError::Transport(e.to_string()))
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn complete(
        &self,
        endpoint: &ProviderEndpoint,
        request: &ChatRequest,
    ) -> Result<String, ChatError> {
        info!(
            "[chat] POST {} model={} messages={}",
            endpoint.url,
            request.model,
            request.messages.len()
        );
        let http_request = self.build_request(endpoint, request)?;
        let response = self
            .client
            .execute(http_request)
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        // Error objects usually arrive with a non-2xx status; the body is authoritative.
        let body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(ChatError::Malformed(e.to_string())),
            Err(_) => {
                warn!("[chat] provider returned {} with a non-JSON body", status);
                return Err(ChatError::Status(status.as_u16()));
            }
        };

        match parse_completion(body) {
            Completion::Reply(content) => Ok(content),
            Completion::ApiError(message) => {
                warn!("[chat] provider error ({}): {}", status, message);
                Err(ChatError::Api(message))
            }
            Completion::Malformed if !status.is_success() => {
                Err(ChatError::Status(status.as_u16()))
            }
            Completion::Malformed => Err(ChatError::Malformed(
                "missing choices[0].message.content".to_string(),
            )),
        }
    }
}
