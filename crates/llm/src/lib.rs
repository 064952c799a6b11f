//! Webforge LLM
//!
//! Hosted model client for the generation pipeline: the `Model` trait, the
//! GPT provider implementation, the provider error taxonomy and the shared
//! HTTP client factory.

pub mod http_client;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use openai::GptModel;
pub use provider::{parse_provider_error, provider_error, Model};
pub use types::*;
