//! Scaffold Chain
//!
//! Deterministic starting point for a fresh page: one design token per
//! library component, resolved from the theme's base styles, plus an empty
//! section skeleton to drop generated content into. No model round trip.

use async_trait::async_trait;
use tracing::debug;
use webforge_core::{
    EmbedTemplate, RawTheme, TemplateChild, TemplateInstance, Theme, Token,
};
use webforge_llm::{ErrorResponse, Model};

use crate::chains::{Chain, ChainContext, ChainResult, ChainSuccess};
use crate::components::{self, ColorMode};

/// Components that get a page-wide token on scaffold
pub const SCAFFOLD_TOKEN_COMPONENTS: [&str; 6] =
    ["Box", "Heading", "Text", "Button", "Link", "Image"];

/// One token per scaffolded component, carrying its base styles.
pub fn scaffold_tokens(theme: &Theme, color_mode: ColorMode) -> Vec<Token> {
    SCAFFOLD_TOKEN_COMPONENTS
        .iter()
        .filter_map(|component| {
            let styles = components::styles(component, "base", theme, color_mode)?;
            if styles.is_empty() {
                return None;
            }
            Some(Token::new(
                format!("scaffold:{}", component.to_lowercase()),
                (*component).to_string(),
                styles,
            ))
        })
        .collect()
}

/// The empty page skeleton: a section container wrapping a content column.
pub fn scaffold_template() -> EmbedTemplate {
    vec![TemplateChild::Instance(TemplateInstance {
        component: "Box".to_string(),
        children: vec![TemplateChild::Instance(
            TemplateInstance::new("Box"),
        )],
        ..TemplateInstance::new("Box")
    })]
}

pub struct ScaffoldChain;

#[async_trait]
impl Chain for ScaffoldChain {
    async fn run(&self, _model: &dyn Model, context: &mut ChainContext) -> ChainResult {
        let raw_theme = context
            .prompts
            .get("theme")
            .ok_or_else(|| ErrorResponse::parsing_error("Invalid theme"))?;
        let raw: RawTheme = serde_json::from_str(raw_theme)
            .map_err(|_| ErrorResponse::parsing_error("Invalid theme"))?;
        let theme =
            Theme::from_raw(&raw).map_err(|_| ErrorResponse::parsing_error("Invalid theme"))?;

        let color_mode = match context.prompts.get("colorMode").map(String::as_str) {
            Some("dark") => ColorMode::Dark,
            _ => ColorMode::Light,
        };
        let tokens = scaffold_tokens(&theme, color_mode);
        debug!(tokens = tokens.len(), "page scaffolded");

        Ok(ChainSuccess {
            llm_messages: Vec::new(),
            code: Vec::new(),
            json: vec![
                serde_json::to_value(tokens)
                    .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?,
                serde_json::to_value(scaffold_template())
                    .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?,
            ],
        })
    }
}
