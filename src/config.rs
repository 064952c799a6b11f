//! Service Configuration
//!
//! Environment-driven configuration for the generation endpoint: feature
//! flag, provider credentials and production-mode error sanitization.

use serde::{Deserialize, Serialize};

/// Configuration for the generation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Master switch for the whole AI feature
    #[serde(default = "default_enabled")]
    pub ai_enabled: bool,
    /// Provider API key (`OPENAI_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Provider organization id, must start with `org-` (`OPENAI_ORG`)
    #[serde(default)]
    pub organization: Option<String>,
    /// When set, chain error messages are replaced with a generic one
    #[serde(default)]
    pub production: bool,
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_enabled() -> bool {
    true
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            ai_enabled: default_enabled(),
            api_key: None,
            organization: None,
            production: false,
            model: default_model(),
        }
    }
}

impl ServiceConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        let flag = |name: &str| {
            std::env::var(name)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false)
        };
        Self {
            ai_enabled: std::env::var("WEBFORGE_AI_DISABLED").is_err(),
            api_key: std::env::var("OPENAI_KEY").ok().filter(|v| !v.is_empty()),
            organization: std::env::var("OPENAI_ORG").ok().filter(|v| !v.is_empty()),
            production: flag("WEBFORGE_PRODUCTION"),
            model: std::env::var("WEBFORGE_MODEL").unwrap_or_else(|_| default_model()),
        }
    }

    pub fn with_credentials(
        mut self,
        api_key: impl Into<String>,
        organization: impl Into<String>,
    ) -> Self {
        self.api_key = Some(api_key.into());
        self.organization = Some(organization.into());
        self
    }
}
