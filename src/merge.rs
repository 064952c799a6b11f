//! Section Merging
//!
//! Brings generated artifacts into the document: ordered insertion of
//! sections that complete out of order, token creation, and the
//! transactional merge of one section under the selection.

use std::collections::BTreeSet;

use tracing::debug;
use webforge_core::{EmbedTemplate, Token};

use crate::error::{AppError, AppResult};
use crate::store::{
    insert_template, style_decl_key, DocumentStore, DropTarget, StoreData, StoredStyleDecl,
    StyleSource,
};

/// Keeps parallel sections in their original order as they complete.
///
/// Each section knows its index in the generated plan. When a section
/// arrives, its insert position is the number of lower-indexed sections
/// already inserted, so the final child order always matches the plan no
/// matter which requests finish first.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    seen: BTreeSet<usize>,
}

impl InsertionOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position to insert the section with the given plan index.
    pub fn index_for(&mut self, original: usize) -> usize {
        let position = self.seen.iter().take_while(|seen| **seen < original).count();
        self.seen.insert(original);
        position
    }
}

/// Materialize tokens as style sources. Existing ids are left untouched and
/// tokens without styles are skipped.
pub fn create_tokens(data: &mut StoreData, tokens: &[Token]) {
    for token in tokens {
        if token.styles.is_empty() || data.style_sources.contains_key(&token.id) {
            continue;
        }
        data.style_sources.insert(
            token.id.clone(),
            StyleSource::Token {
                id: token.id.clone(),
                name: token.name.clone(),
            },
        );
        for decl in &token.styles {
            data.styles.insert(
                style_decl_key(&token.id, &decl.property),
                StoredStyleDecl {
                    style_source_id: token.id.clone(),
                    decl: decl.clone(),
                },
            );
        }
    }
}

/// Attach token ids to instances, in front of whatever sources they already
/// carry so local styles keep precedence. Ids already present are skipped.
pub fn add_tokens_to_instances(data: &mut StoreData, instance_ids: &[String], token_ids: &[String]) {
    for instance_id in instance_ids {
        let selection = data
            .style_source_selections
            .entry(instance_id.clone())
            .or_default();
        let mut values: Vec<String> = token_ids
            .iter()
            .filter(|id| !selection.values.contains(*id))
            .cloned()
            .collect();
        values.append(&mut selection.values);
        selection.values = values;
    }
}

/// Merge one generated section into the document under the selection the
/// session started from.
///
/// Everything happens in a single transaction: the selection is checked
/// against `expected_selection`, the closest droppable ancestor is resolved,
/// tokens are created and the template is inserted at `position`. The
/// selection is re-rooted under the drop parent with the session instance
/// kept at its head, so sibling merges from the same fan-out still pass the
/// guard. Returns the created top-level instance ids.
pub fn merge_section(
    store: &DocumentStore,
    expected_selection: &str,
    template: &EmbedTemplate,
    tokens: &[Token],
    position: usize,
) -> AppResult<Vec<String>> {
    let mut created = Vec::new();
    store.create_transaction(|data| {
        if data.selected_instance_path.first().map(String::as_str) != Some(expected_selection) {
            return Err(AppError::validation(
                "selection changed since generation started",
            ));
        }

        let target = store
            .find_closest_droppable_target(data)
            .ok_or_else(|| AppError::validation("no droppable target for the selection"))?;
        let target = DropTarget {
            parent_id: target.parent_id,
            position,
        };

        create_tokens(data, tokens);
        created = insert_template(data, template, &target)?;

        if !created.is_empty() {
            let parent_index = data
                .selected_instance_path
                .iter()
                .position(|id| id == &target.parent_id)
                .unwrap_or(0);
            let mut path: Vec<String> =
                data.selected_instance_path[parent_index..].to_vec();
            if path.first().map(String::as_str) != Some(expected_selection) {
                path.insert(0, expected_selection.to_string());
            }
            data.selected_instance_path = path;
        }
        Ok(())
    })?;

    debug!(instances = created.len(), position, "section merged");
    Ok(created)
}
