//! UI Chain
//!
//! Generates a JSX fragment for one section, parses it into a template,
//! resolves variant styling against the theme and resolves image
//! placeholders. The model only ever sees the component list and the raw
//! theme; styling is applied locally.

use async_trait::async_trait;
use tracing::debug;
use webforge_core::{
    for_each_instance_mut, validate_template, EmbedTemplate, StyleDecl, StyleValue, TemplateProp,
    Theme,
};
use webforge_llm::{ChatMessage, ErrorResponse, Model};

use crate::chains::{get_code, Chain, ChainContext, ChainResult, ChainSuccess};
use crate::components::{self, ColorMode};
use crate::images;
use crate::jsx;
use crate::prompt::{format_prompt, UI_SYSTEM_TEMPLATE, UI_USER_TEMPLATE};

/// Replace `variants` props with concrete style declarations.
///
/// Variants apply on top of `base` and later variants win, except
/// `backgroundImage` where layers from every variant stack up.
pub fn resolve_styles(template: &mut EmbedTemplate, theme: &Theme, color_mode: ColorMode) {
    for_each_instance_mut(template, &mut |instance| {
        let mut names = vec!["base".to_string()];
        if let Some(TemplateProp::StringArray { value, .. }) = instance.prop("variants") {
            names.extend(value.clone());
        }
        instance.remove_prop("variants");
        names.reverse();

        let mut resolved: Vec<StyleDecl> = Vec::new();
        for name in &names {
            let Some(decls) = components::styles(&instance.component, name, theme, color_mode)
            else {
                continue;
            };
            for decl in decls {
                match resolved.iter_mut().find(|d| d.property == decl.property) {
                    Some(existing) if decl.property == "backgroundImage" => {
                        if let (
                            StyleValue::Layers { value: layers },
                            StyleValue::Layers { value: extra },
                        ) = (&mut existing.value, decl.value)
                        {
                            layers.extend(extra);
                        }
                    }
                    Some(_) => {}
                    None => resolved.push(decl),
                }
            }
        }
        if !resolved.is_empty() {
            instance.styles = Some(resolved);
        }
    });
}

fn color_mode(context: &ChainContext) -> ColorMode {
    match context.prompts.get("colorMode").map(String::as_str) {
        Some("dark") => ColorMode::Dark,
        _ => ColorMode::Light,
    }
}

pub struct UiChain;

#[async_trait]
impl Chain for UiChain {
    async fn run(&self, model: &dyn Model, context: &mut ChainContext) -> ChainResult {
        let raw_theme = context
            .prompts
            .get("theme")
            .ok_or_else(|| ErrorResponse::parsing_error("Invalid theme"))?;
        let raw: webforge_core::RawTheme =
            serde_json::from_str(raw_theme).map_err(|_| ErrorResponse::parsing_error("Invalid theme"))?;
        let theme =
            Theme::from_raw(&raw).map_err(|_| ErrorResponse::parsing_error("Invalid theme"))?;
        // Re-serialized so the prompt always carries a normalized theme
        let theme_json = serde_json::to_string(&raw)
            .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?;

        let mut vars = context.prompts.clone();
        vars.insert("components".to_string(), components::prompt_listing());
        vars.insert("theme".to_string(), theme_json);
        let system = format_prompt(&vars, UI_SYSTEM_TEMPLATE);
        let user = format_prompt(&vars, UI_USER_TEMPLATE);

        let mut messages = vec![ChatMessage::system(system)];
        messages.extend(context.messages.clone());
        messages.push(ChatMessage::user(user));

        let completion = model.request(messages.clone()).await?;
        let choice = completion.first_choice().to_string();
        let code = get_code(&choice, "jsx");
        if code.is_empty() {
            return Err(ErrorResponse::empty_response());
        }
        if !code.starts_with('<') || !code.ends_with('>') {
            return Err(ErrorResponse::invalid_model_response(code));
        }

        let mut template =
            jsx::parse(&code).map_err(|err| ErrorResponse::parsing_error(err.to_string()))?;
        validate_template(&template)
            .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?;

        resolve_styles(&mut template, &theme, color_mode(context));

        let descriptions = images::collect_descriptions(&template);
        let urls = images::generate_image_urls(&descriptions);
        images::insert_image_urls(&mut template, &descriptions, &urls);
        debug!(images = descriptions.len(), "ui fragment generated");

        validate_template(&template)
            .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?;

        messages.push(ChatMessage::assistant(choice));
        Ok(ChainSuccess {
            llm_messages: vec![messages],
            code: vec![code],
            json: vec![serde_json::to_value(&template)
                .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::testing::{context_with, empty_build, StubBuildApi, StubModel};
    use serde_json::json;
    use std::sync::Arc;
    use webforge_core::{with_defaults, TemplateChild};
    use webforge_llm::ErrorKind;

    fn raw_theme_json() -> String {
        let scale = |hex: &str| {
            json!({
                "base": hex, "elevate": hex, "primary": hex, "secondary": hex,
                "accent": hex, "muted": hex, "destructive": hex,
            })
        };
        with_defaults(json!({
            "backgroundColor": scale("#ffffff"),
            "color": scale("#111111"),
            "border": scale("#dddddd"),
            "boxShadowColor": scale("#00000040"),
            "gradientColorStops": [
                ["#ff0000", "#00ff00"],
                ["#0000ff", "#ff00ff"],
                ["#ffff00", "#00ffff"],
            ],
            "fontFamily": { "base": ["Inter"], "headings": ["Sora"] },
        }))
        .to_string()
    }

    fn context() -> ChainContext {
        let mut context = context_with(
            Arc::new(StubBuildApi {
                build: empty_build(),
            }),
            "a hero section",
        );
        context
            .prompts
            .insert("theme".to_string(), raw_theme_json());
        context
    }

    fn first_instance(template: &EmbedTemplate) -> &webforge_core::TemplateInstance {
        match &template[0] {
            TemplateChild::Instance(instance) => instance,
            other => panic!("expected instance, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolves_variants_into_styles() {
        let model = StubModel::replying(
            "```jsx\n<Box variants={[\"sectionContainer\"]}><Heading variants={[\"hero\"]}>Hi</Heading></Box>\n```",
        );
        let success = UiChain.run(&model, &mut context()).await.unwrap();
        let template: EmbedTemplate = serde_json::from_value(success.json[0].clone()).unwrap();
        let root = first_instance(&template);
        assert!(root.prop("variants").is_none());
        let styles = root.styles.as_deref().unwrap();
        // sectionContainer wins over base for the padding sides it sets
        assert!(styles.iter().any(|d| d.property == "paddingTop"));
        assert!(styles.iter().any(|d| d.property == "display"));
    }

    #[tokio::test]
    async fn later_variants_win_per_property() {
        let model =
            StubModel::replying("```jsx\n<Button variants={[\"round\", \"square\"]}>Go</Button>\n```");
        let success = UiChain.run(&model, &mut context()).await.unwrap();
        let template: EmbedTemplate = serde_json::from_value(success.json[0].clone()).unwrap();
        let styles = first_instance(&template).styles.as_deref().unwrap();
        let radius = styles
            .iter()
            .find(|d| d.property == "borderTopLeftRadius")
            .unwrap();
        // square pins the radius to 0px and beats round
        match &radius.value {
            StyleValue::Unit(unit) => assert_eq!(unit.value, 0.0),
            other => panic!("expected unit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn images_get_urls_and_clean_alts() {
        let model = StubModel::replying(
            "```jsx\n<Box><Image alt=\"600x400: a lighthouse at dusk\" /></Box>\n```",
        );
        let success = UiChain.run(&model, &mut context()).await.unwrap();
        let template: EmbedTemplate = serde_json::from_value(success.json[0].clone()).unwrap();
        let root = first_instance(&template);
        let TemplateChild::Instance(image) = &root.children[0] else {
            panic!("expected image");
        };
        assert_eq!(
            image.prop("alt").unwrap().as_str(),
            Some("a lighthouse at dusk")
        );
        let src = image.prop("src").unwrap().as_str().unwrap();
        assert!(src.contains("w=600&h=400"));
    }

    #[tokio::test]
    async fn non_jsx_reply_is_invalid_model_response() {
        let model = StubModel::replying("```jsx\nconst a = 1;\n```");
        let err = UiChain.run(&model, &mut context()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidModelResponse);
    }

    #[tokio::test]
    async fn missing_theme_is_rejected() {
        let model = StubModel::replying("```jsx\n<Box></Box>\n```");
        let mut context = context();
        context.prompts.remove("theme");
        let err = UiChain.run(&model, &mut context).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParsingError);
        assert_eq!(err.message, "Invalid theme");
    }

    #[tokio::test]
    async fn broken_jsx_is_parsing_error() {
        let model = StubModel::replying("```jsx\n<Box><Heading></Box>\n```");
        let err = UiChain.run(&model, &mut context()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParsingError);
    }
}
