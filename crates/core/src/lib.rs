//! Webforge Core
//!
//! Domain types shared across the Webforge AI workspace: style values,
//! themes, embeddable templates and style tokens. This crate has zero
//! dependencies on application-level code (HTTP clients, model providers,
//! the document store).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `style` - Tagged CSS values, declarations, color/length parsing
//! - `theme` - Raw and typed design-token themes with total conversion
//! - `template` - Embeddable instance-tree templates with validation
//! - `token` - Style tokens and the override-id convention
//!
//! ## Design Principles
//!
//! 1. **Only serde + thiserror** - keeps the core crate light
//! 2. **Reject whole, never partially** - malformed themes and templates
//!    fail validation as a unit
//! 3. **Unidirectional dependency** - this crate depends on nothing else in
//!    the workspace

pub mod error;
pub mod style;
pub mod template;
pub mod theme;
pub mod token;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Style Values ───────────────────────────────────────────────────────
pub use style::{
    parse_color, parse_length, rgb_to_hex, ImageSource, RgbValue, StyleDecl, StyleValue, Unit,
    UnitValue,
};

// ── Themes ─────────────────────────────────────────────────────────────
pub use theme::{
    theme_defaults, to_tokens_theme, with_defaults, ColorScale, FontFamilies, RawTheme, Theme,
    BORDER_RADIUS_KEYS, COLOR_SCALE_KEYS, FONT_SIZE_KEYS, SPACING_KEYS,
};

// ── Templates ──────────────────────────────────────────────────────────
pub use template::{
    for_each_instance, for_each_instance_mut, validate as validate_template, EmbedTemplate,
    TemplateChild, TemplateInstance, TemplateProp,
};

// ── Tokens ─────────────────────────────────────────────────────────────
pub use token::{base_id, is_override, override_id, Token, OVERRIDE_PREFIX};
