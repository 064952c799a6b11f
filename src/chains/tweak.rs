//! Tweak Chain
//!
//! Edits the selected instance subtree through a closed set of transform
//! operations. The model never returns executable code; it answers with a
//! JSON list of operations that are applied locally and re-validated.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use webforge_core::{
    for_each_instance_mut, validate_template, EmbedTemplate, StyleDecl, StyleValue, TemplateChild,
    TemplateInstance, TemplateProp,
};
use webforge_llm::{ChatMessage, ErrorKind, ErrorResponse, Model};

use crate::chains::{get_code, Chain, ChainContext, ChainResult, ChainSuccess};
use crate::components;
use crate::prompt::{format_prompt, TWEAK_SYSTEM_TEMPLATE};

/// One edit to the selection. With `component` set the operation applies to
/// every matching instance in the subtree, otherwise to the selection root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TweakOp {
    SetProp {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        component: Option<String>,
        name: String,
        value: Value,
    },
    RemoveProp {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        component: Option<String>,
        name: String,
    },
    SetStyle {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        component: Option<String>,
        property: String,
        value: StyleValue,
    },
    RemoveStyle {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        component: Option<String>,
        property: String,
    },
    SetText {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        component: Option<String>,
        value: String,
    },
}

impl TweakOp {
    fn component(&self) -> Option<&str> {
        match self {
            TweakOp::SetProp { component, .. }
            | TweakOp::RemoveProp { component, .. }
            | TweakOp::SetStyle { component, .. }
            | TweakOp::RemoveStyle { component, .. }
            | TweakOp::SetText { component, .. } => component.as_deref(),
        }
    }

    fn apply(&self, instance: &mut TemplateInstance) {
        match self {
            TweakOp::SetProp { name, value, .. } => {
                instance.set_prop(json_prop(name.clone(), value.clone()));
            }
            TweakOp::RemoveProp { name, .. } => instance.remove_prop(name),
            TweakOp::SetStyle {
                property, value, ..
            } => instance.set_style(StyleDecl::new(property.clone(), value.clone())),
            TweakOp::RemoveStyle { property, .. } => instance.remove_style(property),
            TweakOp::SetText { value, .. } => {
                instance
                    .children
                    .retain(|child| !matches!(child, TemplateChild::Text { .. }));
                instance.children.push(TemplateChild::Text {
                    value: value.clone(),
                });
            }
        }
    }
}

fn json_prop(name: String, value: Value) -> TemplateProp {
    match value {
        Value::String(value) => TemplateProp::String { name, value },
        Value::Bool(value) => TemplateProp::Boolean { name, value },
        Value::Number(number) => TemplateProp::Number {
            name,
            value: number.as_f64().unwrap_or(0.0),
        },
        value => TemplateProp::Json { name, value },
    }
}

/// Apply operations to the selection. Scoped operations visit the whole
/// subtree; unscoped ones touch only the root instance.
pub fn apply_ops(template: &mut EmbedTemplate, ops: &[TweakOp]) {
    for op in ops {
        match op.component() {
            Some(component) => {
                for_each_instance_mut(template, &mut |instance| {
                    if instance.component == component {
                        op.apply(instance);
                    }
                });
            }
            None => {
                if let Some(TemplateChild::Instance(root)) = template
                    .iter_mut()
                    .find(|child| matches!(child, TemplateChild::Instance(_)))
                {
                    op.apply(root);
                }
            }
        }
    }
}

pub struct TweakChain;

#[async_trait]
impl Chain for TweakChain {
    async fn run(&self, model: &dyn Model, context: &mut ChainContext) -> ChainResult {
        let selected = context.prompts.get("selectedInstance").ok_or_else(|| {
            ErrorResponse::new(ErrorKind::InvalidRequest, 400, "no selected instance")
        })?;
        let mut template: EmbedTemplate = serde_json::from_str(selected).map_err(|err| {
            ErrorResponse::new(ErrorKind::InvalidRequest, 400, err.to_string())
        })?;

        let mut vars = context.prompts.clone();
        vars.insert("components".to_string(), components::prompt_listing());
        vars.entry("colorMode".to_string())
            .or_insert_with(|| "light".to_string());
        let system = format_prompt(&vars, TWEAK_SYSTEM_TEMPLATE);

        let mut messages = vec![ChatMessage::system(system)];
        messages.extend(context.messages.clone());
        messages.push(ChatMessage::user(
            context.prompts.get("request").cloned().unwrap_or_default(),
        ));

        let completion = model.request(messages.clone()).await?;
        let choice = completion.first_choice().to_string();
        let code = get_code(&choice, "json");
        if code.is_empty() {
            return Err(ErrorResponse::empty_response());
        }

        let ops: Vec<TweakOp> =
            serde_json::from_str(&code).map_err(|_| ErrorResponse::parsing_error(code.clone()))?;
        apply_ops(&mut template, &ops);
        validate_template(&template)
            .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?;
        debug!(ops = ops.len(), "tweak operations applied");

        messages.push(ChatMessage::assistant(choice));
        Ok(ChainSuccess {
            llm_messages: vec![messages],
            code: vec![code],
            json: vec![serde_json::to_value(&template)
                .map_err(|err| ErrorResponse::parsing_error(err.to_string()))?],
        })
    }
}
