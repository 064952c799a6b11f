//! Model Client Types
//!
//! Shared request/response types for hosted model providers: chat messages,
//! provider configuration, completions and the pipeline error taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::System => write!(f, "system"),
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub api_key: String,
    pub organization: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_temperature() -> f32 {
    0.5
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

impl ModelConfig {
    pub fn new(api_key: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            organization: organization.into(),
            temperature: default_temperature(),
            model: default_model(),
            base_url: default_base_url(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Every failure the pipeline can surface, end to end: endpoint gating,
/// provider errors, response validation and client-side retry/abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    FeatureDisabled,
    InvalidAuth,
    InvalidApiKey,
    InvalidOrg,
    Unauthorized,
    InvalidRequest,
    InvalidAction,
    RateLimit,
    QuotaExceeded,
    Overloaded,
    EmptyResponse,
    InvalidModelResponse,
    ParsingError,
    GenericError,
    Aborted,
    RetryLimitReached,
}

impl ErrorKind {
    /// Transient failures worth another attempt. Validation and
    /// configuration failures are not; the user has to act first.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::GenericError | ErrorKind::RateLimit | ErrorKind::Overloaded
        )
    }
}

/// A failed pipeline step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub status: u16,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(kind: ErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn empty_response() -> Self {
        Self::new(ErrorKind::EmptyResponse, 500, "")
    }

    pub fn invalid_model_response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidModelResponse, 500, message)
    }

    pub fn parsing_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParsingError, 500, message)
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::GenericError, 500, message)
    }

    pub fn aborted() -> Self {
        Self::new(ErrorKind::Aborted, 499, "")
    }

    pub fn retry_limit_reached() -> Self {
        Self::new(ErrorKind::RetryLimitReached, 500, "")
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({}): {}", self.kind, self.status, self.message)
    }
}

/// A successful completion: one generated message per requested choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub choices: Vec<String>,
}

impl Completion {
    pub fn first_choice(&self) -> &str {
        self.choices.first().map(String::as_str).unwrap_or("")
    }
}

/// Outcome of one model invocation
pub type ModelOutcome = Result<Completion, ErrorResponse>;
