//! Generation Service
//!
//! The request-facing layer: validates and gates incoming generation
//! requests, picks the model configuration per stage, dispatches the
//! requested stages in order and shapes the per-stage response envelopes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use webforge_llm::{ErrorKind, ErrorResponse, GptModel, Model, ModelConfig};

use crate::chains::{
    sections::SectionsChain, theme::ThemeChain, ui::UiChain, BuildApi, Chain, ChainContext,
};
use crate::config::ServiceConfig;

/// Stages the endpoint can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Theme,
    Sections,
    Ui,
}

impl Stage {
    fn parse(name: &str) -> Option<Stage> {
        match name {
            "theme" => Some(Stage::Theme),
            "sections" => Some(Stage::Sections),
            "ui" => Some(Stage::Ui),
            _ => None,
        }
    }

    /// Sections planning wants a tighter temperature than the creative
    /// stages.
    fn temperature(self) -> f32 {
        match self {
            Stage::Theme => 0.5,
            Stage::Sections => 0.25,
            Stage::Ui => 0.5,
        }
    }
}

/// One generation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    pub project_id: String,
    #[serde(default)]
    pub build_id: Option<String>,
    pub instance_id: String,
    pub steps: Vec<String>,
    /// Raw theme JSON when the ui stage runs without a theme stage
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub color_mode: Option<String>,
}

/// Per-stage response envelope
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StepResponse {
    Success {
        step: Stage,
        success: bool,
        code: Vec<String>,
        json: Vec<Value>,
    },
    Failure {
        step: Stage,
        success: bool,
        #[serde(flatten)]
        error: ErrorResponse,
    },
}

/// Builds a model from a per-request configuration. Seam for tests.
pub trait ModelProvider: Send + Sync {
    fn model(&self, config: ModelConfig) -> Arc<dyn Model>;
}

/// The hosted provider
pub struct GptProvider;

impl ModelProvider for GptProvider {
    fn model(&self, config: ModelConfig) -> Arc<dyn Model> {
        Arc::new(GptModel::new(config))
    }
}

/// Project-level authorization
pub trait Permit: Send + Sync {
    fn has_permit(&self, project_id: &str) -> bool;
}

/// Grants everything; in-process single-user deployments
pub struct OpenPermit;

impl Permit for OpenPermit {
    fn has_permit(&self, _project_id: &str) -> bool {
        true
    }
}

pub struct GenerateService {
    config: ServiceConfig,
    provider: Arc<dyn ModelProvider>,
    api: Arc<dyn BuildApi>,
    permits: Arc<dyn Permit>,
}

impl GenerateService {
    pub fn new(
        config: ServiceConfig,
        provider: Arc<dyn ModelProvider>,
        api: Arc<dyn BuildApi>,
        permits: Arc<dyn Permit>,
    ) -> Self {
        Self {
            config,
            provider,
            api,
            permits,
        }
    }

    /// Check every request gate in order and return the parsed stages.
    fn gate(&self, request: &GenerateRequest) -> Result<Vec<Stage>, ErrorResponse> {
        if !self.config.ai_enabled {
            return Err(ErrorResponse::new(
                ErrorKind::FeatureDisabled,
                503,
                "The feature is not available",
            ));
        }
        let api_key = self.config.api_key.as_deref().unwrap_or("");
        if api_key.is_empty() {
            return Err(ErrorResponse::new(
                ErrorKind::InvalidApiKey,
                401,
                "Invalid API key",
            ));
        }
        let organization = self.config.organization.as_deref().unwrap_or("");
        if !organization.starts_with("org-") {
            return Err(ErrorResponse::new(
                ErrorKind::InvalidOrg,
                401,
                "Invalid organization",
            ));
        }
        if request.prompt.trim().is_empty()
            || request.project_id.is_empty()
            || request.instance_id.is_empty()
            || request.steps.is_empty()
        {
            return Err(ErrorResponse::new(
                ErrorKind::InvalidRequest,
                400,
                "Invalid request",
            ));
        }
        if !self.permits.has_permit(&request.project_id) {
            return Err(ErrorResponse::new(
                ErrorKind::Unauthorized,
                401,
                "You don't have edit access to this project",
            ));
        }
        request
            .steps
            .iter()
            .map(|name| {
                Stage::parse(name).ok_or_else(|| {
                    ErrorResponse::new(
                        ErrorKind::InvalidAction,
                        404,
                        format!("Invalid step {name}"),
                    )
                })
            })
            .collect()
    }

    fn model_for(&self, stage: Stage) -> Arc<dyn Model> {
        let config = ModelConfig::new(
            self.config.api_key.clone().unwrap_or_default(),
            self.config.organization.clone().unwrap_or_default(),
        )
        .with_model(self.config.model.clone())
        .with_temperature(stage.temperature());
        self.provider.model(config)
    }

    fn failure(&self, step: Stage, mut error: ErrorResponse) -> StepResponse {
        // Provider and parsing details stay out of production responses
        if self.config.production {
            error.message = "An error occurred.".to_string();
        }
        StepResponse::Failure {
            step,
            success: false,
            error,
        }
    }

    /// Run the requested stages in order, threading the theme through.
    /// Processing stops at the first failed stage.
    pub async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<Vec<StepResponse>, ErrorResponse> {
        let stages = self.gate(&request)?;
        info!(
            project = %request.project_id,
            stages = stages.len(),
            "generation request accepted"
        );

        let mut context = ChainContext::new(self.api.clone(), request.project_id.clone())
            .with_prompt("request", request.prompt.clone())
            .with_instance_id(request.instance_id.clone());
        context.build_id = request.build_id.clone();
        if let Some(theme) = &request.theme {
            context.prompts.insert("theme".to_string(), theme.clone());
        }
        if let Some(color_mode) = &request.color_mode {
            context
                .prompts
                .insert("colorMode".to_string(), color_mode.clone());
        }

        let mut responses = Vec::new();
        for stage in stages {
            let model = self.model_for(stage);
            let chain: Box<dyn Chain> = match stage {
                Stage::Theme => Box::new(ThemeChain),
                Stage::Sections => Box::new(SectionsChain),
                Stage::Ui => Box::new(UiChain),
            };
            match chain.run(model.as_ref(), &mut context).await {
                Ok(success) => {
                    if stage == Stage::Theme {
                        if let Some(raw) = success.code.first() {
                            context.prompts.insert("theme".to_string(), raw.clone());
                        }
                    }
                    responses.push(StepResponse::Success {
                        step: stage,
                        success: true,
                        code: success.code,
                        json: success.json,
                    });
                }
                Err(error) => {
                    warn!(step = ?stage, error = %error, "generation stage failed");
                    responses.push(self.failure(stage, error));
                    break;
                }
            }
        }
        Ok(responses)
    }
}
