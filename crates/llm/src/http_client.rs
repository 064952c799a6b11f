//! HTTP Client Factory
//!
//! Provides a factory function for building the reqwest client shared by
//! model providers.

use std::time::Duration;

/// Build a `reqwest::Client` for provider calls.
///
/// Proxies from the environment are ignored; generation requests go straight
/// to the provider. The generous timeout covers slow multi-section
/// completions.
pub fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(120))
        .build()
        .expect("failed to build reqwest client")
}
