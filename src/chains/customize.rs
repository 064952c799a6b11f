//! Customize Chain
//!
//! Turns a freeform styling request into token overrides. The model sees
//! the design tokens attached to the current build and the customizable
//! slice of the theme, and answers with `property:themePath` pairs per
//! token. Everything it returns is resolved against the actual theme;
//! unknown tokens, properties and paths are dropped rather than failing
//! the stage.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use webforge_core::{
    is_override, override_id, RawTheme, StyleDecl, Theme, Token, BORDER_RADIUS_KEYS,
    COLOR_SCALE_KEYS, FONT_SIZE_KEYS,
};
use webforge_llm::{ChatMessage, ErrorResponse, Model};

use crate::chains::{get_code, Chain, ChainContext, ChainResult, ChainSuccess};
use crate::prompt::{format_prompt, CUSTOMIZE_SYSTEM_TEMPLATE, CUSTOMIZE_USER_TEMPLATE};
use crate::store::StyleSource;

/// The only properties overrides may touch
pub const CUSTOMIZABLE_PROPERTIES: [&str; 5] = [
    "backgroundColor",
    "color",
    "borderRadius",
    "fontSize",
    "fontFamily",
];

/// Every dotted theme path an override value may reference.
fn theme_paths() -> Vec<String> {
    let mut paths = Vec::new();
    for property in ["backgroundColor", "color"] {
        paths.extend(COLOR_SCALE_KEYS.iter().map(|name| format!("{property}.{name}")));
    }
    paths.extend(BORDER_RADIUS_KEYS.iter().map(|name| format!("borderRadius.{name}")));
    paths.extend(FONT_SIZE_KEYS.iter().map(|name| format!("fontSize.{name}")));
    paths.push("fontFamily.base".to_string());
    paths.push("fontFamily.headings".to_string());
    paths
}

/// Resolve the model's `property:path` pairs into override tokens. Tokens
/// the build does not carry, non-customizable properties and unknown theme
/// paths are silently dropped.
pub fn resolve_token_overrides(
    theme: &Theme,
    base_tokens: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, Vec<String>>,
) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (name, entries) in overrides {
        let Some(base_id) = base_tokens.get(name) else {
            continue;
        };
        let mut styles = Vec::new();
        for entry in entries {
            let Some((property, path)) = entry.split_once(':') else {
                continue;
            };
            let property = property.trim();
            if !CUSTOMIZABLE_PROPERTIES.contains(&property) {
                continue;
            }
            let Some(value) = theme.lookup(path.trim()) else {
                continue;
            };
            styles.push(StyleDecl::new(property, value));
        }
        if !styles.is_empty() {
            tokens.push(Token {
                id: override_id(base_id),
                name: name.clone(),
                styles,
            });
        }
    }
    tokens
}

pub struct CustomizeChain;

#[async_trait]
impl Chain for CustomizeChain {
    async fn run(&self, model: &dyn Model, context: &mut ChainContext) -> ChainResult {
        let raw_theme = context
            .prompts
            .get("theme")
            .ok_or_else(|| ErrorResponse::parsing_error("Invalid theme"))?;
        let raw: RawTheme = serde_json::from_str(raw_theme)
            .map_err(|_| ErrorResponse::parsing_error("Invalid theme"))?;
        let theme =
            Theme::from_raw(&raw).map_err(|_| ErrorResponse::parsing_error("Invalid theme"))?;

        let build = context
            .api
            .get_build(&context.project_id, context.build_id.as_deref())
            .await
            .map_err(|err| ErrorResponse::generic(err.to_string()))?;
        // Base tokens only; overrides are never themselves overridden
        let base_tokens: BTreeMap<String, String> = build
            .style_sources
            .iter()
            .filter_map(|source| match source {
                StyleSource::Token { id, name } if !is_override(id) => {
                    Some((name.clone(), id.clone()))
                }
                _ => None,
            })
            .collect();

        let mut vars = context.prompts.clone();
        vars.insert(
            "theme".to_string(),
            serde_json::to_string(&theme_paths())
                .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?,
        );
        vars.insert(
            "customizableProperties".to_string(),
            CUSTOMIZABLE_PROPERTIES
                .iter()
                .map(|p| format!("\"{p}\""))
                .collect::<Vec<_>>()
                .join(" | "),
        );
        vars.insert(
            "tokens".to_string(),
            base_tokens.keys().cloned().collect::<Vec<_>>().join(","),
        );

        let mut messages = vec![ChatMessage::system(format_prompt(
            &vars,
            CUSTOMIZE_SYSTEM_TEMPLATE,
        ))];
        messages.extend(context.messages.clone());
        messages.push(ChatMessage::user(format_prompt(
            &vars,
            CUSTOMIZE_USER_TEMPLATE,
        )));

        let completion = model.request(messages.clone()).await?;
        let choice = completion.first_choice().to_string();
        let code = get_code(&choice, "json");
        if code.is_empty() {
            return Err(ErrorResponse::empty_response());
        }

        let value: Value =
            serde_json::from_str(&code).map_err(|_| ErrorResponse::parsing_error(code.clone()))?;
        let overrides: BTreeMap<String, Vec<String>> = serde_json::from_value(value)
            .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?;

        let tokens = resolve_token_overrides(&theme, &base_tokens, &overrides);
        debug!(tokens = tokens.len(), "token overrides resolved");

        messages.push(ChatMessage::assistant(choice));
        Ok(ChainSuccess {
            llm_messages: vec![messages],
            code: vec![code],
            json: vec![serde_json::to_value(tokens)
                .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?],
        })
    }
}
