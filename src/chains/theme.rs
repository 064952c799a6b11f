//! Theme Chain
//!
//! Asks the model for a palette, gradients and font stacks, merges the fixed
//! design-system scales underneath, and returns the typed theme in both raw
//! and token form.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use webforge_core::{to_tokens_theme, with_defaults, RawTheme, Theme};
use webforge_llm::{ChatMessage, ErrorResponse, Model};

use crate::chains::{get_code, Chain, ChainContext, ChainResult, ChainSuccess};
use crate::prompt::{format_prompt, THEME_TEMPLATE, THEME_TYPES};

pub struct ThemeChain;

#[async_trait]
impl Chain for ThemeChain {
    async fn run(&self, model: &dyn Model, context: &mut ChainContext) -> ChainResult {
        let mut vars = context.prompts.clone();
        vars.insert("types".to_string(), THEME_TYPES.to_string());
        let prompt = format_prompt(&vars, THEME_TEMPLATE);

        let mut messages = context.messages.clone();
        messages.push(ChatMessage::user(prompt));

        let completion = model.request(messages.clone()).await?;
        let choice = completion.first_choice().to_string();
        let code = get_code(&choice, "json");
        if code.is_empty() {
            return Err(ErrorResponse::empty_response());
        }

        let palette: Value =
            serde_json::from_str(&code).map_err(|_| ErrorResponse::parsing_error(code.clone()))?;
        let raw: RawTheme = serde_json::from_value(with_defaults(palette))
            .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?;
        let theme =
            Theme::from_raw(&raw).map_err(|err| ErrorResponse::parsing_error(err.to_string()))?;
        debug!(model = model.name(), "theme generated");

        let raw_json = serde_json::to_string(&theme.to_raw())
            .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?;

        messages.push(ChatMessage::assistant(choice));
        Ok(ChainSuccess {
            llm_messages: vec![messages],
            code: vec![raw_json],
            json: vec![to_tokens_theme(&theme, None)],
        })
    }
}
