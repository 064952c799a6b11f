//! Embeddable Templates
//!
//! The instance-tree fragments that generation stages produce and the merge
//! layer inserts into a document. A template is a list of children; each
//! child is a component instance, a text node, or a reference to an existing
//! instance by id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::style::StyleDecl;

/// A property on a template instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TemplateProp {
    String { name: String, value: String },
    Number { name: String, value: f64 },
    Boolean { name: String, value: bool },
    #[serde(rename = "string[]")]
    StringArray { name: String, value: Vec<String> },
    Json { name: String, value: Value },
}

impl TemplateProp {
    pub fn name(&self) -> &str {
        match self {
            TemplateProp::String { name, .. }
            | TemplateProp::Number { name, .. }
            | TemplateProp::Boolean { name, .. }
            | TemplateProp::StringArray { name, .. }
            | TemplateProp::Json { name, .. } => name,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TemplateProp::String { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// A component instance inside a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateInstance {
    pub component: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TemplateChild>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<TemplateProp>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Vec<StyleDecl>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<String>>,
}

impl TemplateInstance {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            children: Vec::new(),
            props: None,
            styles: None,
            tokens: None,
        }
    }

    pub fn prop(&self, name: &str) -> Option<&TemplateProp> {
        self.props
            .as_deref()
            .and_then(|props| props.iter().find(|p| p.name() == name))
    }

    pub fn set_prop(&mut self, prop: TemplateProp) {
        let props = self.props.get_or_insert_with(Vec::new);
        if let Some(existing) = props.iter_mut().find(|p| p.name() == prop.name()) {
            *existing = prop;
        } else {
            props.push(prop);
        }
    }

    pub fn remove_prop(&mut self, name: &str) {
        if let Some(props) = self.props.as_mut() {
            props.retain(|p| p.name() != name);
        }
    }

    pub fn set_style(&mut self, decl: StyleDecl) {
        let styles = self.styles.get_or_insert_with(Vec::new);
        if let Some(existing) = styles.iter_mut().find(|d| d.property == decl.property) {
            *existing = decl;
        } else {
            styles.push(decl);
        }
    }

    pub fn remove_style(&mut self, property: &str) {
        if let Some(styles) = self.styles.as_mut() {
            styles.retain(|d| d.property != property);
        }
    }
}

/// One node in a template tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TemplateChild {
    Instance(TemplateInstance),
    Text { value: String },
    Id { value: String },
}

/// A generated fragment: the children to insert under a drop target
pub type EmbedTemplate = Vec<TemplateChild>;

/// Visit every instance in the template, depth first.
pub fn for_each_instance(template: &EmbedTemplate, f: &mut impl FnMut(&TemplateInstance)) {
    for child in template {
        if let TemplateChild::Instance(instance) = child {
            f(instance);
            for_each_instance(&instance.children, f);
        }
    }
}

/// Visit every instance mutably, depth first.
pub fn for_each_instance_mut(
    template: &mut EmbedTemplate,
    f: &mut impl FnMut(&mut TemplateInstance),
) {
    for child in template {
        if let TemplateChild::Instance(instance) = child {
            f(instance);
            for_each_instance_mut(&mut instance.children, f);
        }
    }
}

/// Structural validation. An invalid template is rejected whole; partial
/// trees never reach the document.
pub fn validate(template: &EmbedTemplate) -> CoreResult<()> {
    for child in template {
        match child {
            TemplateChild::Instance(instance) => {
                if instance.component.is_empty() {
                    return Err(CoreError::template("instance with empty component name"));
                }
                if let Some(props) = instance.props.as_deref() {
                    if props.iter().any(|p| p.name().is_empty()) {
                        return Err(CoreError::template(format!(
                            "unnamed prop on {}",
                            instance.component
                        )));
                    }
                }
                if let Some(styles) = instance.styles.as_deref() {
                    if styles.iter().any(|d| d.property.is_empty()) {
                        return Err(CoreError::template(format!(
                            "style declaration without property on {}",
                            instance.component
                        )));
                    }
                }
                validate(&instance.children)?;
            }
            TemplateChild::Id { value } => {
                if value.is_empty() {
                    return Err(CoreError::template("empty instance id reference"));
                }
            }
            TemplateChild::Text { .. } => {}
        }
    }
    Ok(())
}
