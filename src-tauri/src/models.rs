//! Data models shared between the host, the bridge and the UI

use serde::{Deserialize, Serialize};

/// User-editable connection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default, alias = "apiProvider")]
    pub api_provider_url: String,
    #[serde(default)]
    pub model_name: String,
}

impl Settings {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single chat message, immutable once appended to a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Conversation state pushed to the UI on every change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub loading: bool,
    pub generation: u64,
}

/// Requested window size; missing or zero dimensions keep the current value
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct WindowSize {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}
