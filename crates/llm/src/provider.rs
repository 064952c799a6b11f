//! Model Provider Trait
//!
//! Defines the common interface for hosted model providers and the mapping
//! from provider HTTP failures to the pipeline error taxonomy.

use async_trait::async_trait;

use super::types::{ChatMessage, ErrorKind, ErrorResponse, ModelOutcome};

/// Trait that all model providers implement.
///
/// Provides a unified interface for:
/// - Chat completions (request)
/// - Image generation (generate_image)
#[async_trait]
pub trait Model: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Send a conversation and get a completion.
    async fn request(&self, messages: Vec<ChatMessage>) -> ModelOutcome;

    /// Generate a single image and return its URL.
    async fn generate_image(&self, prompt: &str) -> Result<String, ErrorResponse>;
}

/// Map a provider HTTP failure to an error kind.
///
/// The 401/429/503 phrases are the provider's documented error messages;
/// anything unrecognized degrades to `generic_error`.
pub fn parse_provider_error(status: u16, message: &str) -> ErrorKind {
    let phrases: &[(&str, ErrorKind)] = match status {
        401 => &[
            ("Invalid Authentication", ErrorKind::InvalidAuth),
            ("Incorrect API key provided", ErrorKind::InvalidApiKey),
            (
                "You must be a member of an organization to use the API",
                ErrorKind::InvalidOrg,
            ),
        ],
        429 => &[
            ("Rate limit reached for requests", ErrorKind::RateLimit),
            (
                "You exceeded your current quota, please check your plan and billing details",
                ErrorKind::QuotaExceeded,
            ),
        ],
        503 => &[(
            "The engine is currently overloaded, please try again later",
            ErrorKind::Overloaded,
        )],
        _ => &[],
    };

    phrases
        .iter()
        .find(|(phrase, _)| message.starts_with(phrase))
        .map(|(_, kind)| *kind)
        .unwrap_or(ErrorKind::GenericError)
}

/// Build the error response for a provider HTTP failure.
pub fn provider_error(status: u16, message: impl Into<String>) -> ErrorResponse {
    let message = message.into();
    ErrorResponse::new(parse_provider_error(status, &message), status, message)
}
