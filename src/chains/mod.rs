//! Generation Chains
//!
//! One chain per generation stage. Every chain takes a model and a mutable
//! context, performs at most one model round trip, validates the output and
//! returns either typed artifacts or a classified failure.

pub mod customize;
pub mod scaffold;
pub mod sections;
pub mod theme;
pub mod tweak;
pub mod ui;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use webforge_llm::{ChatMessage, ErrorResponse, Model};

use crate::error::AppResult;
use crate::store::Build;

/// Read access to the current builder document, implemented by the document
/// store in-process and by an HTTP client when the chain runs server side.
#[async_trait]
pub trait BuildApi: Send + Sync {
    async fn get_build(&self, project_id: &str, build_id: Option<&str>) -> AppResult<Build>;
}

/// Everything a chain needs besides the model
pub struct ChainContext {
    /// Named prompt variables; chains add their own before formatting
    pub prompts: HashMap<String, String>,
    /// Prior conversation, prepended by chains that support follow-ups
    pub messages: Vec<ChatMessage>,
    pub project_id: String,
    pub build_id: Option<String>,
    /// The instance the user is working in
    pub instance_id: String,
    pub api: Arc<dyn BuildApi>,
}

impl ChainContext {
    pub fn new(api: Arc<dyn BuildApi>, project_id: impl Into<String>) -> Self {
        Self {
            prompts: HashMap::new(),
            messages: Vec::new(),
            project_id: project_id.into(),
            build_id: None,
            instance_id: String::new(),
            api,
        }
    }

    pub fn with_prompt(mut self, key: &str, value: impl Into<String>) -> Self {
        self.prompts.insert(key.to_string(), value.into());
        self
    }

    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = instance_id.into();
        self
    }
}

/// Successful chain output
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSuccess {
    /// The exchanges that produced the output, for conversation replay
    pub llm_messages: Vec<Vec<ChatMessage>>,
    /// Raw artifacts (JSON or JSX) as returned by the model
    pub code: Vec<String>,
    /// Parsed, validated artifacts
    pub json: Vec<Value>,
}

/// Outcome of one chain run
pub type ChainResult = Result<ChainSuccess, ErrorResponse>;

/// A generation stage
#[async_trait]
pub trait Chain: Send + Sync {
    async fn run(&self, model: &dyn Model, context: &mut ChainContext) -> ChainResult;
}

/// Extract the contents of a fenced code block from a model message.
///
/// Prefers a block tagged with `lang`, falls back to the first bare fence,
/// and finally accepts a message that is nothing but code. Returns an empty
/// string when no code is found.
pub fn get_code(message: &str, lang: &str) -> String {
    if let Some(start) = message.find(&format!("```{lang}")) {
        let after_tag = start + 3 + lang.len();
        if let Some(len) = message[after_tag..].find("```") {
            return message[after_tag..after_tag + len].trim().to_string();
        }
        // Unterminated fence: take the rest
        return message[after_tag..].trim().to_string();
    }

    if let Some(start) = message.find("```") {
        let mut after_tag = start + 3;
        // Skip a language tag on the opening fence
        if let Some(newline) = message[after_tag..].find('\n') {
            let tag = message[after_tag..after_tag + newline].trim();
            if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric()) {
                after_tag += newline + 1;
            }
        }
        if let Some(len) = message[after_tag..].find("```") {
            return message[after_tag..after_tag + len].trim().to_string();
        }
        return message[after_tag..].trim().to_string();
    }

    let trimmed = message.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') || trimmed.starts_with('<') {
        return trimmed.to_string();
    }
    String::new()
}

#[cfg(test)]
pub(crate) mod testing {
    //! Stub implementations shared by chain tests.

    use super::*;
    use std::sync::Mutex;
    use webforge_llm::{Completion, ModelOutcome};

    /// A model that replays canned choices, one completion per request.
    pub struct StubModel {
        responses: Mutex<Vec<ModelOutcome>>,
        pub requests: Mutex<Vec<Vec<ChatMessage>>>,
        pub image_url: String,
    }

    impl StubModel {
        pub fn new(responses: Vec<ModelOutcome>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
                image_url: "https://img.test/1".to_string(),
            }
        }

        pub fn replying(message: &str) -> Self {
            Self::new(vec![Ok(Completion {
                choices: vec![message.to_string()],
            })])
        }
    }

    #[async_trait]
    impl Model for StubModel {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn request(&self, messages: Vec<ChatMessage>) -> ModelOutcome {
            self.requests.lock().unwrap().push(messages);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(Completion {
                    choices: vec![String::new()],
                })
            } else {
                responses.remove(0)
            }
        }

        async fn generate_image(&self, _prompt: &str) -> Result<String, ErrorResponse> {
            Ok(self.image_url.clone())
        }
    }

    /// A build API serving a fixed snapshot.
    pub struct StubBuildApi {
        pub build: Build,
    }

    #[async_trait]
    impl BuildApi for StubBuildApi {
        async fn get_build(&self, _project_id: &str, _build_id: Option<&str>) -> AppResult<Build> {
            Ok(self.build.clone())
        }
    }

    pub fn empty_build() -> Build {
        Build {
            root_instance_id: "root".to_string(),
            instances: vec![crate::store::Instance {
                id: "root".to_string(),
                component: "Body".to_string(),
                children: Vec::new(),
            }],
            style_sources: Vec::new(),
        }
    }

    pub fn context_with(api: Arc<dyn BuildApi>, request: &str) -> ChainContext {
        ChainContext::new(api, "project-1")
            .with_prompt("request", request)
            .with_instance_id("root")
    }
}
