//! Core Error Types
//!
//! Defines the foundational error types used across the Webforge workspace.
//! These error types are dependency-free (only thiserror + serde_json) to keep
//! the core crate lightweight.
//!
//! The main application crate extends these with additional error variants
//! (e.g., chain and store errors) that require heavier dependencies.

use thiserror::Error;

/// Core error type for the Webforge workspace.
///
/// This is the minimal error set that the core crate needs. The application
/// crate defines additional variants for orchestration, network, etc.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A model- or user-supplied value failed structural validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A CSS value could not be parsed
    #[error("Style parse error: {0}")]
    StyleParse(String),

    /// A theme was structurally incomplete or malformed
    #[error("Theme error: {0}")]
    Theme(String),

    /// A template tree was malformed
    #[error("Template error: {0}")]
    Template(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a style parse error
    pub fn style_parse(msg: impl Into<String>) -> Self {
        Self::StyleParse(msg.into())
    }

    /// Create a theme error
    pub fn theme(msg: impl Into<String>) -> Self {
        Self::Theme(msg.into())
    }

    /// Create a template error
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::theme("missing color scale");
        assert_eq!(err.to_string(), "Theme error: missing color scale");
    }

    #[test]
    fn test_error_conversion() {
        let err = CoreError::validation("empty component name");
        let msg: String = err.into();
        assert!(msg.contains("Validation error"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let core_err: CoreError = json_err.into();
        assert!(matches!(core_err, CoreError::Serialization(_)));
    }
}
