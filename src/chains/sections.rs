//! Sections Chain
//!
//! Splits a full-page request into independent section descriptions and
//! builds one self-contained generation prompt per section. Requests that
//! are not about a full page succeed with no prompts; the caller then runs
//! the UI stage once with the original request.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use webforge_llm::{ChatMessage, ErrorResponse, Model};

use crate::chains::{get_code, Chain, ChainContext, ChainResult, ChainSuccess};
use crate::prompt::{format_prompt, SECTIONS_TEMPLATE, SECTION_PROMPT_TEMPLATE};

#[derive(Debug, Deserialize)]
struct FullPage {
    subject: String,
    sections: Vec<String>,
}

/// Per-section prompts carrying the shared subject.
pub fn section_prompts(subject: &str, sections: &[String]) -> Vec<String> {
    sections
        .iter()
        .map(|section| {
            let vars = [
                ("subject".to_string(), subject.to_string()),
                ("section".to_string(), section.clone()),
            ]
            .into_iter()
            .collect();
            format_prompt(&vars, SECTION_PROMPT_TEMPLATE)
        })
        .collect()
}

pub struct SectionsChain;

#[async_trait]
impl Chain for SectionsChain {
    async fn run(&self, model: &dyn Model, context: &mut ChainContext) -> ChainResult {
        let prompt = format_prompt(&context.prompts, SECTIONS_TEMPLATE);
        let mut messages = context.messages.clone();
        messages.push(ChatMessage::user(prompt));

        let completion = model.request(messages.clone()).await?;
        let choice = completion.first_choice().to_string();
        let code = get_code(&choice, "json");
        if code.is_empty() {
            return Err(ErrorResponse::empty_response());
        }

        let value: Value =
            serde_json::from_str(&code).map_err(|_| ErrorResponse::parsing_error(code.clone()))?;

        let prompts = if value.get("type").and_then(Value::as_str) == Some("full-page") {
            let page: FullPage = serde_json::from_value(value)
                .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?;
            let subject = if page.subject.trim().is_empty() {
                context
                    .prompts
                    .get("request")
                    .cloned()
                    .unwrap_or_default()
            } else {
                page.subject
            };
            debug!(sections = page.sections.len(), "request split into sections");
            section_prompts(&subject, &page.sections)
        } else {
            Vec::new()
        };

        messages.push(ChatMessage::assistant(choice));
        Ok(ChainSuccess {
            llm_messages: vec![messages],
            code: vec![code],
            json: vec![serde_json::to_value(prompts)
                .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::testing::{context_with, empty_build, StubBuildApi, StubModel};
    use std::sync::Arc;
    use webforge_llm::ErrorKind;

    fn context() -> ChainContext {
        context_with(
            Arc::new(StubBuildApi {
                build: empty_build(),
            }),
            "a landing page for a bakery",
        )
    }

    #[tokio::test]
    async fn full_page_yields_one_prompt_per_section() {
        let model = StubModel::replying(
            r#"```json
{"type":"full-page","subject":"a bakery","sections":["hero with a tagline","menu highlights"]}
```"#,
        );
        let success = SectionsChain.run(&model, &mut context()).await.unwrap();
        let prompts: Vec<String> = serde_json::from_value(success.json[0].clone()).unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("a bakery"));
        assert!(prompts[0].contains("hero with a tagline"));
        assert!(prompts[1].contains("menu highlights"));
    }

    #[tokio::test]
    async fn other_requests_yield_no_prompts() {
        let model = StubModel::replying("```json\n{\"type\":\"other\"}\n```");
        let success = SectionsChain.run(&model, &mut context()).await.unwrap();
        let prompts: Vec<String> = serde_json::from_value(success.json[0].clone()).unwrap();
        assert!(prompts.is_empty());
    }

    #[tokio::test]
    async fn empty_subject_falls_back_to_the_request() {
        let model = StubModel::replying(
            "```json\n{\"type\":\"full-page\",\"subject\":\"\",\"sections\":[\"hero\"]}\n```",
        );
        let success = SectionsChain.run(&model, &mut context()).await.unwrap();
        let prompts: Vec<String> = serde_json::from_value(success.json[0].clone()).unwrap();
        assert!(prompts[0].contains("a landing page for a bakery"));
    }

    #[tokio::test]
    async fn broken_json_is_parsing_error() {
        let model = StubModel::replying("```json\n{\"type\":\n```");
        let err = SectionsChain.run(&model, &mut context()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParsingError);
    }
}
