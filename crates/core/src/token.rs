//! Style Tokens
//!
//! Named, reusable style bundles. Theme customization produces override
//! tokens whose ids carry a reserved prefix so they can shadow the token
//! they override without colliding with it.

use serde::{Deserialize, Serialize};

use crate::style::StyleDecl;

/// Id prefix marking a token that overrides another token's styles
pub const OVERRIDE_PREFIX: &str = "__override:";

/// A named style token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub name: String,
    pub styles: Vec<StyleDecl>,
}

impl Token {
    pub fn new(id: impl Into<String>, name: impl Into<String>, styles: Vec<StyleDecl>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            styles,
        }
    }
}

/// Build the override id for a base token id.
pub fn override_id(base_id: &str) -> String {
    format!("{OVERRIDE_PREFIX}{base_id}")
}

/// Whether the id belongs to an override token.
pub fn is_override(id: &str) -> bool {
    id.starts_with(OVERRIDE_PREFIX)
}

/// Strip the override prefix, returning the base token id.
pub fn base_id(id: &str) -> &str {
    id.strip_prefix(OVERRIDE_PREFIX).unwrap_or(id)
}
