//! OpenAPI Overlay 1.0 documents.
//!
//! An overlay describes an ordered list of JSONPath-targeted actions to
//! apply against an OAS document: `update` (deep-merge, replace, or append
//! depending on the target's shape) or `remove`. Only overlay version
//! `1.0.0` is accepted.

pub mod apply;

pub use apply::{
    ActionOp, AppliedChange, Applier, ApplyResult, ApplyWarning, ProposedChange, WarningCategory,
};

use crate::constants;
use crate::error::Error;
use crate::jsonpath::JsonPath;
use crate::loader;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// An Overlay 1.0 document.
///
/// All fields are lenient at decode time; [`Overlay::validate`] reports the
/// required-field findings as structured values instead of serde errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    #[serde(default)]
    pub overlay: String,
    #[serde(default)]
    pub info: OverlayInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
}

/// One targeted modification.
///
/// When both `update` and `remove` are present, `remove` wins (Overlay
/// specification rule).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove: Option<bool>,
}

impl Action {
    /// True when this action removes its targets.
    #[must_use]
    pub fn is_remove(&self) -> bool {
        self.remove == Some(true)
    }
}

/// A field-level validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field name or structural path (`actions[2].target`).
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl Overlay {
    /// Parse an overlay from YAML or JSON text.
    ///
    /// # Errors
    ///
    /// Returns a syntax error when the text parses as neither format, or a
    /// structural error when the tree does not decode.
    pub fn from_str(content: &str) -> Result<Self, Error> {
        let (tree, _) = loader::load_tree(content)?;
        serde_json::from_value(tree).map_err(|e| Error::structural(e.to_string()))
    }

    /// Parse an overlay from a file.
    ///
    /// # Errors
    ///
    /// As [`Overlay::from_str`], plus I/O errors reading the file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Validate required fields. Returns every finding; an empty list means
    /// the overlay may be applied.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut findings = Vec::new();
        if self.overlay != constants::OVERLAY_VERSION {
            findings.push(ValidationError {
                path: constants::FIELD_OVERLAY.to_string(),
                message: format!(
                    "overlay version must be '{}', found '{}'",
                    constants::OVERLAY_VERSION,
                    self.overlay
                ),
            });
        }
        if self.info.title.is_empty() {
            findings.push(ValidationError {
                path: "info.title".to_string(),
                message: "title is required and must be non-empty".to_string(),
            });
        }
        if self.info.version.is_empty() {
            findings.push(ValidationError {
                path: "info.version".to_string(),
                message: "version is required and must be non-empty".to_string(),
            });
        }
        if self.actions.is_empty() {
            findings.push(ValidationError {
                path: constants::FIELD_ACTIONS.to_string(),
                message: "at least one action is required".to_string(),
            });
        }
        for (index, action) in self.actions.iter().enumerate() {
            if action.target.is_empty() {
                findings.push(ValidationError {
                    path: format!("actions[{index}].target"),
                    message: "target is required and must be non-empty".to_string(),
                });
            } else if let Err(err) = JsonPath::parse(&action.target) {
                findings.push(ValidationError {
                    path: format!("actions[{index}].target"),
                    message: err.to_string(),
                });
            }
            if action.update.is_none() && action.remove.is_none() {
                findings.push(ValidationError {
                    path: format!("actions[{index}]"),
                    message: "action must declare 'update' or 'remove'".to_string(),
                });
            }
        }
        findings
    }

    /// Validate and convert findings into an error.
    ///
    /// # Errors
    ///
    /// Returns an [`crate::error::ErrorKind::OverlayValidation`] error
    /// carrying every finding when validation fails.
    pub fn ensure_valid(&self) -> Result<(), Error> {
        let findings = self.validate();
        if findings.is_empty() {
            Ok(())
        } else {
            Err(Error::overlay_validation(&findings))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_overlay() {
        let overlay = Overlay::from_str(
            r"
overlay: 1.0.0
info:
  title: Strip internals
  version: 1.0.0
actions:
  - target: $.paths[?@.x-internal==true]
    remove: true
",
        )
        .unwrap();
        assert_eq!(overlay.actions.len(), 1);
        assert!(overlay.actions[0].is_remove());
        assert!(overlay.validate().is_empty());
    }

    #[test]
    fn test_validate_missing_fields() {
        let overlay = Overlay::from_str("overlay: 0.9.0\nactions: []\n").unwrap();
        let findings = overlay.validate();
        let paths: Vec<&str> = findings.iter().map(|f| f.path.as_str()).collect();
        assert!(paths.contains(&"overlay"));
        assert!(paths.contains(&"info.title"));
        assert!(paths.contains(&"info.version"));
        assert!(paths.contains(&"actions"));
        assert!(overlay.ensure_valid().is_err());
    }

    #[test]
    fn test_validate_bad_target_and_missing_operation() {
        let overlay = Overlay::from_str(
            r"
overlay: 1.0.0
info:
  title: t
  version: '1'
actions:
  - target: 'not a path'
    remove: true
  - target: $.info
",
        )
        .unwrap();
        let findings = overlay.validate();
        assert!(findings.iter().any(|f| f.path == "actions[0].target"));
        assert!(findings.iter().any(|f| f.path == "actions[1]"));
    }

    #[test]
    fn test_remove_wins_over_update() {
        let action = Action {
            target: "$.info".to_string(),
            update: Some(serde_json::json!({"title": "x"})),
            remove: Some(true),
            description: None,
        };
        assert!(action.is_remove());
    }
}
