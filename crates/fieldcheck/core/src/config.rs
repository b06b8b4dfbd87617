//! Controller configuration

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Presentation and registration settings for a validation controller
///
/// Every field has a default, so an empty TOML document is a valid config:
///
/// ```toml
/// default_error_message = "Required"
/// error_class = "is-invalid"
/// success_class = "is-valid"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Message rendered by `MSG_ERR` when the caller passes none
    pub default_error_message: String,

    /// Class put on the field group when a field fails
    pub error_class: String,

    /// Class put on the field group once its errors are gone
    pub success_class: String,

    /// Classes of the inserted error message node
    pub error_message_class: String,

    /// Selector of the container holding a field and its label
    pub group_selector: String,

    /// Attribute carrying the validation identity on error nodes
    pub identity_attribute: String,

    /// Attach the built-in validators and handlers on construction
    pub register_builtins: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_error_message: "Ошибка".to_string(),
            error_class: "has-error".to_string(),
            success_class: "has-success".to_string(),
            error_message_class: "text-danger error-msg".to_string(),
            group_selector: ".form-group".to_string(),
            identity_attribute: "data-validator-id".to_string(),
            register_builtins: true,
        }
    }
}

impl ControllerConfig {
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        toml::from_str(source).context("Failed to parse controller config")
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = ControllerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ControllerConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ControllerConfig::from_toml_str(
            r#"
            default_error_message = "Required"
            error_class = "is-invalid"
            register_builtins = false
            "#,
        )
        .unwrap();

        assert_eq!(config.default_error_message, "Required");
        assert_eq!(config.error_class, "is-invalid");
        assert_eq!(config.success_class, "has-success");
        assert!(!config.register_builtins);
    }

    #[test]
    fn test_invalid_document() {
        let err = ControllerConfig::from_toml_str("error_class = 5").unwrap_err();
        assert!(err.to_string().contains("controller config"));
    }

    #[test]
    fn test_missing_file() {
        assert!(ControllerConfig::from_toml_file("/nonexistent/fieldcheck.toml").is_err());
    }
}
