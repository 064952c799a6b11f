//! Document Store
//!
//! The builder document as an in-process transactional store: instances,
//! style sources, style declarations and the selected-instance pointer.
//! Mutations happen inside all-or-nothing transactions; the merge layer
//! builds on top of this boundary.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;
use webforge_core::{EmbedTemplate, StyleDecl, TemplateChild, TemplateInstance, TemplateProp};

use crate::error::{AppError, AppResult};

/// A child of a document instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InstanceChild {
    Id { value: String },
    Text { value: String },
}

/// One component instance in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub component: String,
    #[serde(default)]
    pub children: Vec<InstanceChild>,
}

/// A source of style declarations attached to instances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StyleSource {
    Token { id: String, name: String },
    Local { id: String },
}

impl StyleSource {
    pub fn id(&self) -> &str {
        match self {
            StyleSource::Token { id, .. } | StyleSource::Local { id } => id,
        }
    }
}

/// The ordered style sources applied to one instance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleSourceSelection {
    pub values: Vec<String>,
}

/// One stored style declaration, owned by a style source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredStyleDecl {
    pub style_source_id: String,
    #[serde(flatten)]
    pub decl: StyleDecl,
}

/// Key for the styles map
pub fn style_decl_key(style_source_id: &str, property: &str) -> String {
    format!("{style_source_id}:{property}")
}

/// Per-component nesting rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMeta {
    /// Whether the component accepts children at all
    pub container: bool,
    /// Components that may never appear among this component's ancestors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub banned_ancestors: Vec<String>,
}

impl ComponentMeta {
    pub fn container() -> Self {
        Self {
            container: true,
            banned_ancestors: Vec::new(),
        }
    }

    pub fn leaf() -> Self {
        Self {
            container: false,
            banned_ancestors: Vec::new(),
        }
    }
}

/// Where a template fragment gets inserted
#[derive(Debug, Clone, PartialEq)]
pub struct DropTarget {
    pub parent_id: String,
    pub position: usize,
}

/// The mutable document state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    pub root_instance_id: String,
    pub instances: BTreeMap<String, Instance>,
    pub style_sources: BTreeMap<String, StyleSource>,
    /// Instance id -> ordered style source ids
    pub style_source_selections: BTreeMap<String, StyleSourceSelection>,
    pub styles: BTreeMap<String, StoredStyleDecl>,
    /// Selected instance first, then its ancestors up to the root
    pub selected_instance_path: Vec<String>,
}

/// A read-only snapshot handed to chains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub root_instance_id: String,
    pub instances: Vec<Instance>,
    pub style_sources: Vec<StyleSource>,
}

/// In-process transactional document store
pub struct DocumentStore {
    metas: HashMap<String, ComponentMeta>,
    data: Mutex<StoreData>,
}

impl DocumentStore {
    /// Create a store with a single root instance of the given component.
    pub fn new(root_component: &str, metas: HashMap<String, ComponentMeta>) -> Self {
        let root_id = new_instance_id();
        let mut data = StoreData {
            root_instance_id: root_id.clone(),
            selected_instance_path: vec![root_id.clone()],
            ..StoreData::default()
        };
        data.instances.insert(
            root_id.clone(),
            Instance {
                id: root_id,
                component: root_component.to_string(),
                children: Vec::new(),
            },
        );
        Self {
            metas,
            data: Mutex::new(data),
        }
    }

    pub fn meta(&self, component: &str) -> Option<&ComponentMeta> {
        self.metas.get(component)
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> StoreData {
        self.lock().clone()
    }

    pub fn root_instance_id(&self) -> String {
        self.lock().root_instance_id.clone()
    }

    pub fn selected_instance_path(&self) -> Vec<String> {
        self.lock().selected_instance_path.clone()
    }

    pub fn select_instance(&self, path: Vec<String>) {
        self.lock().selected_instance_path = path;
    }

    /// Snapshot in the shape chains consume.
    pub fn build(&self) -> Build {
        let data = self.lock();
        Build {
            root_instance_id: data.root_instance_id.clone(),
            instances: data.instances.values().cloned().collect(),
            style_sources: data.style_sources.values().cloned().collect(),
        }
    }

    /// Run `f` against a working copy; commit only if it succeeds.
    pub fn create_transaction(
        &self,
        f: impl FnOnce(&mut StoreData) -> AppResult<()>,
    ) -> AppResult<()> {
        let mut guard = self.lock_result()?;
        let mut working = guard.clone();
        f(&mut working)?;
        *guard = working;
        Ok(())
    }

    /// Walk the selected path from the selection upward and return the first
    /// instance that accepts children and violates no nesting rule.
    pub fn find_closest_droppable_target(&self, data: &StoreData) -> Option<DropTarget> {
        let path = &data.selected_instance_path;
        for (depth, id) in path.iter().enumerate() {
            let instance = data.instances.get(id)?;
            let meta = self.metas.get(&instance.component);
            let container = meta.map(|m| m.container).unwrap_or(false);
            if !container {
                continue;
            }
            let banned = meta.map(|m| m.banned_ancestors.as_slice()).unwrap_or(&[]);
            let ancestors = &path[depth + 1..];
            let violates = ancestors.iter().any(|ancestor_id| {
                data.instances
                    .get(ancestor_id)
                    .map(|ancestor| banned.contains(&ancestor.component))
                    .unwrap_or(false)
            });
            if violates {
                continue;
            }
            return Some(DropTarget {
                parent_id: id.clone(),
                position: instance.children.len(),
            });
        }
        None
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreData> {
        // A poisoned lock means a panic mid-transaction; the working copy
        // was discarded so the committed state is still consistent.
        match self.data.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_result(&self) -> AppResult<std::sync::MutexGuard<'_, StoreData>> {
        Ok(self.lock())
    }
}

fn new_instance_id() -> String {
    Uuid::new_v4().to_string()
}

/// Materialize a template fragment under `target`, returning the ids of the
/// created top-level instances in template order.
pub fn insert_template(
    data: &mut StoreData,
    template: &EmbedTemplate,
    target: &DropTarget,
) -> AppResult<Vec<String>> {
    let mut created = Vec::new();
    let mut new_children = Vec::new();
    for child in template {
        let inserted = insert_child(data, child)?;
        if let InstanceChild::Id { value } = &inserted {
            created.push(value.clone());
        }
        new_children.push(inserted);
    }

    let parent = data
        .instances
        .get_mut(&target.parent_id)
        .ok_or_else(|| AppError::not_found(format!("drop target {}", target.parent_id)))?;
    let position = target.position.min(parent.children.len());
    parent.children.splice(position..position, new_children);

    debug!(
        parent = %target.parent_id,
        position,
        instances = created.len(),
        "inserted template fragment"
    );
    Ok(created)
}

fn insert_child(data: &mut StoreData, child: &TemplateChild) -> AppResult<InstanceChild> {
    match child {
        TemplateChild::Text { value } => Ok(InstanceChild::Text {
            value: value.clone(),
        }),
        TemplateChild::Id { value } => Ok(InstanceChild::Id {
            value: value.clone(),
        }),
        TemplateChild::Instance(instance) => {
            let id = new_instance_id();
            let mut children = Vec::new();
            for nested in &instance.children {
                children.push(insert_child(data, nested)?);
            }
            data.instances.insert(
                id.clone(),
                Instance {
                    id: id.clone(),
                    component: instance.component.clone(),
                    children,
                },
            );

            let mut selection = StyleSourceSelection::default();
            if let Some(styles) = instance.styles.as_deref() {
                if !styles.is_empty() {
                    let source_id = new_instance_id();
                    data.style_sources.insert(
                        source_id.clone(),
                        StyleSource::Local {
                            id: source_id.clone(),
                        },
                    );
                    for decl in styles {
                        data.styles.insert(
                            style_decl_key(&source_id, &decl.property),
                            StoredStyleDecl {
                                style_source_id: source_id.clone(),
                                decl: decl.clone(),
                            },
                        );
                    }
                    selection.values.push(source_id);
                }
            }
            if let Some(tokens) = instance.tokens.as_deref() {
                // Token ids are attached in front of local styles so local
                // declarations keep the last word.
                let mut values = tokens.to_vec();
                values.append(&mut selection.values);
                selection.values = values;
            }
            if !selection.values.is_empty() {
                data.style_source_selections.insert(id.clone(), selection);
            }

            Ok(InstanceChild::Id { value: id })
        }
    }
}

/// Rebuild the template fragment rooted at `instance_id`, including local
/// styles, for chains that edit existing content.
pub fn instance_to_template(data: &StoreData, instance_id: &str) -> AppResult<EmbedTemplate> {
    let instance = data
        .instances
        .get(instance_id)
        .ok_or_else(|| AppError::not_found(format!("instance {instance_id}")))?;

    let mut template_instance = TemplateInstance::new(instance.component.clone());

    if let Some(selection) = data.style_source_selections.get(instance_id) {
        let mut styles = Vec::new();
        let mut tokens = Vec::new();
        for source_id in &selection.values {
            match data.style_sources.get(source_id) {
                Some(StyleSource::Local { .. }) => {
                    styles.extend(
                        data.styles
                            .values()
                            .filter(|stored| &stored.style_source_id == source_id)
                            .map(|stored| stored.decl.clone()),
                    );
                }
                Some(StyleSource::Token { id, .. }) => tokens.push(id.clone()),
                None => {}
            }
        }
        if !styles.is_empty() {
            template_instance.styles = Some(styles);
        }
        if !tokens.is_empty() {
            template_instance.tokens = Some(tokens);
        }
    }

    for child in &instance.children {
        match child {
            InstanceChild::Text { value } => template_instance.children.push(TemplateChild::Text {
                value: value.clone(),
            }),
            InstanceChild::Id { value } => {
                let mut nested = instance_to_template(data, value)?;
                template_instance.children.append(&mut nested);
            }
        }
    }

    Ok(vec![TemplateChild::Instance(template_instance)])
}

/// Read a string prop off a template instance (test and tooling helper).
pub fn string_prop<'a>(instance: &'a TemplateInstance, name: &str) -> Option<&'a str> {
    instance.prop(name).and_then(TemplateProp::as_str)
}
