//! Shared fixtures for the integration suite.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use webforge::chains::BuildApi;
use webforge::error::AppResult;
use webforge::service::ModelProvider;
use webforge::store::{Build, ComponentMeta, Instance};
use webforge::ServiceConfig;
use webforge_llm::{
    ChatMessage, Completion, ErrorResponse, Model, ModelConfig, ModelOutcome,
};

/// A model that replays a scripted list of completions.
pub struct ScriptedModel {
    responses: Mutex<Vec<ModelOutcome>>,
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<ModelOutcome>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(message: &str) -> Self {
        Self::new(vec![Ok(Completion {
            choices: vec![message.to_string()],
        })])
    }
}

#[async_trait]
impl Model for ScriptedModel {
    fn name(&self) -> &'static str {
        "scripted"
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
        Ok("https://img.test/1".to_string())
    }
}

/// Hands each stage the next scripted completion.
pub struct QueueProvider {
    responses: Mutex<Vec<ModelOutcome>>,
}

impl QueueProvider {
    pub fn replying(messages: &[&str]) -> Self {
        Self {
            responses: Mutex::new(
                messages
                    .iter()
                    .map(|m| {
                        Ok(Completion {
                            choices: vec![m.to_string()],
                        })
                    })
                    .collect(),
            ),
        }
    }
}

impl ModelProvider for QueueProvider {
    fn model(&self, _config: ModelConfig) -> Arc<dyn Model> {
        let mut responses = self.responses.lock().unwrap();
        let next = if responses.is_empty() {
            Ok(Completion {
                choices: vec![String::new()],
            })
        } else {
            responses.remove(0)
        };
        Arc::new(ScriptedModel::new(vec![next]))
    }
}

/// Serves one fixed build snapshot.
pub struct FixedBuildApi {
    pub build: Build,
}

#[async_trait]
impl BuildApi for FixedBuildApi {
    async fn get_build(&self, _project_id: &str, _build_id: Option<&str>) -> AppResult<Build> {
        Ok(self.build.clone())
    }
}

pub fn empty_build() -> Build {
    Build {
        root_instance_id: "root".to_string(),
        instances: vec![Instance {
            id: "root".to_string(),
            component: "Body".to_string(),
            children: Vec::new(),
        }],
        style_sources: Vec::new(),
    }
}

pub fn metas() -> HashMap<String, ComponentMeta> {
    let mut metas = HashMap::new();
    metas.insert("Body".to_string(), ComponentMeta::container());
    metas.insert("Box".to_string(), ComponentMeta::container());
    metas.insert("Heading".to_string(), ComponentMeta::container());
    metas.insert("Text".to_string(), ComponentMeta::container());
    metas.insert("Image".to_string(), ComponentMeta::leaf());
    metas
}

pub fn service_config() -> ServiceConfig {
    ServiceConfig {
        ai_enabled: true,
        api_key: Some("sk-test".to_string()),
        organization: Some("org-test".to_string()),
        production: false,
        model: "gpt-3.5-turbo".to_string(),
    }
}

/// A complete raw theme as the theme stage would emit it.
pub fn raw_theme_json() -> String {
    let scale = |hex: &str| {
        json!({
            "base": hex, "elevate": hex, "primary": hex, "secondary": hex,
            "accent": hex, "muted": hex, "destructive": hex,
        })
    };
    webforge_core::with_defaults(json!({
        "backgroundColor": scale("#ffffff"),
        "color": scale("#1f2937"),
        "border": scale("#e5e7eb"),
        "boxShadowColor": scale("#00000040"),
        "gradientColorStops": [
            ["#f43f5e", "#f97316"],
            ["#3b82f6", "#8b5cf6"],
            ["#10b981", "#14b8a6"],
        ],
        "fontFamily": { "base": ["Inter"], "headings": ["Sora"] },
    }))
    .to_string()
}

/// The palette alone, fenced the way the model replies.
pub fn theme_reply() -> String {
    let scale = |hex: &str| {
        json!({
            "base": hex, "elevate": hex, "primary": hex, "secondary": hex,
            "accent": hex, "muted": hex, "destructive": hex,
        })
    };
    let palette = json!({
        "backgroundColor": scale("#ffffff"),
        "color": scale("#1f2937"),
        "border": scale("#e5e7eb"),
        "boxShadowColor": scale("#00000040"),
        "gradientColorStops": [
            ["#f43f5e", "#f97316"],
            ["#3b82f6", "#8b5cf6"],
            ["#10b981", "#14b8a6"],
        ],
        "fontFamily": { "base": ["Inter"], "headings": ["Sora"] },
    });
    format!("```json\n{palette}\n```")
}
