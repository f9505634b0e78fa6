//! Error handling module for oaskit
//!
//! This module provides a consolidated error handling system that categorizes
//! all library errors into distinct kinds. The design follows these principles:
//!
//! 1. **Error Consolidation**: All errors are mapped to one of 8 `ErrorKind` categories
//! 2. **Structured Context**: Each error can include structured JSON details and suggestions
//! 3. **Builder Pattern**: `ErrorContext` provides fluent builder methods for error construction

use crate::constants;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Keep essential external errors that can't be consolidated
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // Consolidated error variant
    #[error("{kind}: {message}")]
    Internal {
        kind: ErrorKind,
        message: Cow<'static, str>,
        context: Option<ErrorContext>,
    },

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Error categories for consolidated error handling
///
/// All internal errors are mapped to one of these categories to provide
/// consistent error handling and reporting across the pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Document parsing errors (malformed input, unknown version, structural mismatch)
    Parse,
    /// Malformed JSONPath expressions
    JsonPath,
    /// Overlay document validation errors (missing or invalid fields)
    OverlayValidation,
    /// Overlay action application failures
    OverlayApply,
    /// Joiner collisions under a fatal strategy
    Collision,
    /// Conversion failures (critical issues under strict mode, unsupported targets)
    Conversion,
    /// Fixer failures (unsupported document version)
    Fix,
    /// Input validation and configuration errors
    Validation,
}

impl ErrorKind {
    /// Get the string identifier for this error kind
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Parse => "Parse",
            Self::JsonPath => "JsonPath",
            Self::OverlayValidation => "OverlayValidation",
            Self::OverlayApply => "OverlayApply",
            Self::Collision => "Collision",
            Self::Conversion => "Conversion",
            Self::Fix => "Fix",
            Self::Validation => "Validation",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Additional context for consolidated errors
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Structured details for programmatic access
    pub details: Option<serde_json::Value>,
    /// Human-readable suggestion for resolving the error
    pub suggestion: Option<Cow<'static, str>>,
}

impl ErrorContext {
    /// Create a new error context with details and suggestion
    #[must_use]
    pub const fn new(
        details: Option<serde_json::Value>,
        suggestion: Option<Cow<'static, str>>,
    ) -> Self {
        Self {
            details,
            suggestion,
        }
    }

    /// Create error context with only details
    #[must_use]
    pub const fn with_details(details: serde_json::Value) -> Self {
        Self {
            details: Some(details),
            suggestion: None,
        }
    }

    /// Create error context with only suggestion
    #[must_use]
    pub const fn with_suggestion(suggestion: Cow<'static, str>) -> Self {
        Self {
            details: None,
            suggestion: Some(suggestion),
        }
    }

    /// Builder method to add a single detail field
    #[must_use]
    pub fn with_detail(key: &str, value: impl serde::Serialize) -> Self {
        Self {
            details: Some(json!({ key: value })),
            suggestion: None,
        }
    }

    /// Add suggestion to existing context
    #[must_use]
    pub fn and_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(Cow::Owned(suggestion.into()));
        self
    }
}

/// JSON representation of an error for structured output
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonError {
    pub error_type: Cow<'static, str>,
    pub message: String,
    pub context: Option<Cow<'static, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Error {
    /// Add context to an error for better user messaging
    #[must_use]
    pub fn with_context(self, context: &str) -> Self {
        match self {
            Self::Internal {
                kind,
                message,
                context: ctx,
            } => Self::Internal {
                kind,
                message: Cow::Owned(format!("{context}: {message}")),
                context: ctx,
            },
            _ => self,
        }
    }

    /// The kind of a consolidated error, if any
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Internal { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Convert error to JSON representation for structured output
    #[must_use]
    pub fn to_json(&self) -> JsonError {
        let (error_type, message, context, details): (
            &str,
            String,
            Option<Cow<'static, str>>,
            Option<serde_json::Value>,
        ) = match self {
            Self::Io(io_err) => {
                let context = match io_err.kind() {
                    std::io::ErrorKind::NotFound => {
                        Some(Cow::Borrowed(constants::ERR_FILE_NOT_FOUND))
                    }
                    _ => None,
                };
                ("FileSystem", io_err.to_string(), context, None)
            }
            Self::Yaml(yaml_err) => (
                "YAMLParsing",
                yaml_err.to_string(),
                Some(Cow::Borrowed(constants::ERR_YAML_SYNTAX)),
                None,
            ),
            Self::Json(json_err) => (
                "JSONParsing",
                json_err.to_string(),
                Some(Cow::Borrowed(constants::ERR_JSON_SYNTAX)),
                None,
            ),
            Self::Internal {
                kind,
                message,
                context: ctx,
            } => {
                let context = ctx.as_ref().and_then(|c| c.suggestion.clone());
                let details = ctx.as_ref().and_then(|c| c.details.clone());
                (kind.as_str(), message.to_string(), context, details)
            }
            Self::Anyhow(anyhow_err) => ("Unknown", anyhow_err.to_string(), None, None),
        };

        JsonError {
            error_type: Cow::Borrowed(error_type),
            message,
            context,
            details,
        }
    }
}

impl Error {
    /// Create an unknown document version error
    pub fn unknown_version(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::Internal {
            kind: ErrorKind::Parse,
            message: Cow::Owned(format!("Unknown document version: {detail}")),
            context: Some(
                ErrorContext::with_detail("detail", &detail)
                    .and_suggestion(constants::ERR_OPENAPI_FORMAT),
            ),
        }
    }

    /// Create a structural parse error (the document decoded but does not
    /// match the typed model)
    pub fn structural(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::Internal {
            kind: ErrorKind::Parse,
            message: Cow::Owned(format!("Structural error: {reason}")),
            context: Some(
                ErrorContext::with_detail("reason", &reason)
                    .and_suggestion("Check the document against the OpenAPI specification."),
            ),
        }
    }

    /// Create a syntax-level parse error for a named source
    pub fn syntax(source: impl Into<String>, reason: impl Into<String>) -> Self {
        let source = source.into();
        let reason = reason.into();
        Self::Internal {
            kind: ErrorKind::Parse,
            message: Cow::Owned(format!("Failed to parse '{source}': {reason}")),
            context: Some(ErrorContext::with_details(
                json!({ "source": source, "reason": reason }),
            )),
        }
    }

    /// Create a JSONPath syntax error
    pub fn json_path_syntax(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        let expression = expression.into();
        let reason = reason.into();
        Self::Internal {
            kind: ErrorKind::JsonPath,
            message: Cow::Owned(format!("Invalid JSONPath '{expression}': {reason}")),
            context: Some(
                ErrorContext::with_details(json!({ "expression": expression, "reason": reason }))
                    .and_suggestion(constants::ERR_JSONPATH_SYNTAX),
            ),
        }
    }

    /// Create an overlay validation error from field-level findings
    pub fn overlay_validation(findings: &[crate::overlay::ValidationError]) -> Self {
        let summary = findings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Self::Internal {
            kind: ErrorKind::OverlayValidation,
            message: Cow::Owned(format!("Overlay validation failed: {summary}")),
            context: Some(
                ErrorContext::with_details(json!({ "findings": findings }))
                    .and_suggestion("Fix the listed overlay fields before applying."),
            ),
        }
    }

    /// Create an overlay action failure error
    pub fn overlay_action(
        action_index: usize,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let target = target.into();
        let reason = reason.into();
        Self::Internal {
            kind: ErrorKind::OverlayApply,
            message: Cow::Owned(format!(
                "Overlay action {action_index} failed for target '{target}': {reason}"
            )),
            context: Some(
                ErrorContext::with_details(json!({
                    "action_index": action_index,
                    "target": target,
                    "cause": reason
                }))
                .and_suggestion(
                    "Disable strict targets to convert per-action failures into warnings.",
                ),
            ),
        }
    }

    /// Create a joiner collision error naming both sources, the bucket, the
    /// key, and the active strategy
    pub fn collision(
        bucket: impl Into<String>,
        key: impl Into<String>,
        kept_source: impl Into<String>,
        incoming_source: impl Into<String>,
        strategy: impl Into<String>,
    ) -> Self {
        let bucket = bucket.into();
        let key = key.into();
        let kept_source = kept_source.into();
        let incoming_source = incoming_source.into();
        let strategy = strategy.into();
        Self::Internal {
            kind: ErrorKind::Collision,
            message: Cow::Owned(format!(
                "Collision in {bucket} for key '{key}' between '{kept_source}' and \
                 '{incoming_source}' under strategy '{strategy}'"
            )),
            context: Some(
                ErrorContext::with_details(json!({
                    "bucket": bucket,
                    "key": key,
                    "kept_source": kept_source,
                    "incoming_source": incoming_source,
                    "strategy": strategy
                }))
                .and_suggestion(
                    "Pick a non-fatal strategy such as 'accept-left', 'accept-right', or a \
                     'rename-*' variant with a rename template.",
                ),
            ),
        }
    }

    /// Create a conversion error (critical issues under strict mode, or an
    /// unsupported conversion pair)
    pub fn conversion(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::Internal {
            kind: ErrorKind::Conversion,
            message: Cow::Owned(format!("Conversion failed: {reason}")),
            context: Some(
                ErrorContext::with_detail("reason", &reason)
                    .and_suggestion("Disable strict mode to receive the document with issues."),
            ),
        }
    }

    /// Create a fixer error
    pub fn fix(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::Internal {
            kind: ErrorKind::Fix,
            message: Cow::Owned(format!("Fix failed: {reason}")),
            context: None,
        }
    }

    /// Create a generic validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Internal {
            kind: ErrorKind::Validation,
            message: Cow::Owned(format!("Validation error: {message}")),
            context: None,
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::Internal {
            kind: ErrorKind::Validation,
            message: Cow::Owned(format!("Invalid configuration: {reason}")),
            context: Some(
                ErrorContext::with_detail("reason", &reason)
                    .and_suggestion("Check the component configuration values."),
            ),
        }
    }

    /// Create a version mismatch error for multi-document operations
    pub fn version_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        let expected = expected.into();
        let found = found.into();
        Self::Internal {
            kind: ErrorKind::Validation,
            message: Cow::Owned(format!(
                "Document version mismatch: expected major version of '{expected}', found '{found}'"
            )),
            context: Some(
                ErrorContext::with_details(json!({ "expected": expected, "found": found }))
                    .and_suggestion(
                        "Convert all inputs to the same major OpenAPI version before joining.",
                    ),
            ),
        }
    }
}
