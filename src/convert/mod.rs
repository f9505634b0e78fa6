//! Version conversion.
//!
//! Rewrites a document into another OpenAPI version, emitting a typed issue
//! for every decision that loses or reshapes information. Supported pairs:
//! 2.0 to 3.x, 3.x to 2.0, and 3.0 to/from 3.1 (plus same-family version
//! restamps). In strict mode any critical issue aborts the conversion.

mod down;
mod minor;
mod up;

use crate::error::Error;
use crate::loader::SourceFormat;
use crate::model::{Document, OASVersion};
use crate::parser::{ParseResult, Parser, SpecStats};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

type JsonMap = serde_json::Map<String, Value>;

/// Severity of a conversion issue. Only `critical` aborts, and only under
/// strict mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueSeverity {
    Info,
    Warning,
    Critical,
}

impl IssueSeverity {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One typed conversion decision.
#[derive(Debug, Clone)]
pub struct ConversionIssue {
    pub severity: IssueSeverity,
    /// Structural path of the affected node.
    pub location: String,
    pub message: String,
    /// Machine-readable issue code (`default-media-type`, `file-type`, ...).
    pub code: String,
}

impl ConversionIssue {
    /// The legacy pre-formatted rendering.
    #[must_use]
    pub fn render(&self) -> String {
        format!("[{}] {}: {}", self.severity, self.location, self.message)
    }
}

/// Issue collector shared by the conversion passes.
#[derive(Debug, Default)]
pub(crate) struct Issues {
    list: Vec<ConversionIssue>,
}

impl Issues {
    pub(crate) fn push(
        &mut self,
        severity: IssueSeverity,
        location: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.list.push(ConversionIssue {
            severity,
            location: location.into(),
            message: message.into(),
            code: code.into(),
        });
    }

    pub(crate) fn info(
        &mut self,
        location: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(IssueSeverity::Info, location, code, message);
    }

    pub(crate) fn warning(
        &mut self,
        location: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(IssueSeverity::Warning, location, code, message);
    }

    pub(crate) fn critical(
        &mut self,
        location: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(IssueSeverity::Critical, location, code, message);
    }

    pub(crate) fn has_critical(&self) -> bool {
        self.list
            .iter()
            .any(|issue| issue.severity == IssueSeverity::Critical)
    }
}

/// The outcome of a conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    pub document: Document,
    pub data: Value,
    pub from: OASVersion,
    pub to: OASVersion,
    pub source_format: SourceFormat,
    pub source_path: Option<PathBuf>,
    pub stats: SpecStats,
    pub issues: Vec<ConversionIssue>,
    /// Legacy pre-formatted issue strings, parallel to `issues`.
    pub messages: Vec<String>,
}

impl ConvertResult {
    #[must_use]
    pub fn has_critical(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == IssueSeverity::Critical)
    }

    /// Exit code for operational consumers: 1 when the conversion produced
    /// any critical issue, else 0.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_critical())
    }

    /// Re-materialize a [`ParseResult`] so the output can be piped into
    /// another component.
    ///
    /// # Errors
    ///
    /// Returns serialization or parse errors from the round trip.
    pub fn to_parse_result(&self) -> Result<ParseResult, Error> {
        let text = crate::loader::emit_tree(&self.data, self.source_format)?;
        let mut result = Parser::new().parse_str(&text)?;
        result.source_path.clone_from(&self.source_path);
        Ok(result)
    }
}

/// Reusable configured converter.
#[derive(Debug, Clone, Copy)]
pub struct Converter {
    target: OASVersion,
    strict: bool,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            target: OASVersion::V3_0_3,
            strict: false,
        }
    }
}

impl Converter {
    #[must_use]
    pub fn new(target: OASVersion) -> Self {
        Self {
            target,
            strict: false,
        }
    }

    #[must_use]
    pub const fn with_target(mut self, target: OASVersion) -> Self {
        self.target = target;
        self
    }

    /// Abort with an error when any critical issue is produced.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Convert a parsed document to the target version.
    ///
    /// # Errors
    ///
    /// Returns a conversion error under strict mode when a critical issue
    /// was produced, or a structural error when the converted tree does not
    /// decode into the typed model.
    pub fn convert(&self, input: &ParseResult) -> Result<ConvertResult, Error> {
        let from = input.oas_version;
        let to = self.target;
        let mut issues = Issues::default();

        let data = match (from.major(), to.major()) {
            (2, 2) => input.data.clone(),
            (2, 3) => up::convert(&input.data, to, &mut issues)?,
            (3, 2) => down::convert(&input.data, &mut issues)?,
            _ => minor::convert(&input.data, from, to, &mut issues)?,
        };

        if self.strict && issues.has_critical() {
            let summary: Vec<String> = issues
                .list
                .iter()
                .filter(|issue| issue.severity == IssueSeverity::Critical)
                .map(ConversionIssue::render)
                .collect();
            return Err(Error::conversion(format!(
                "{} critical issue(s) converting {} to {}: {}",
                summary.len(),
                from.as_str(),
                to.as_str(),
                summary.join("; ")
            )));
        }

        let document: Document = if to.is_v2() {
            Document::V2(
                serde_json::from_value(data.clone()).map_err(|e| Error::structural(e.to_string()))?,
            )
        } else {
            Document::V3(
                serde_json::from_value(data.clone()).map_err(|e| Error::structural(e.to_string()))?,
            )
        };
        let stats = crate::parser::compute_stats(&document);
        debug!(
            from = from.as_str(),
            to = to.as_str(),
            issues = issues.list.len(),
            "converted document"
        );

        let messages = issues.list.iter().map(ConversionIssue::render).collect();
        Ok(ConvertResult {
            document,
            data,
            from,
            to,
            source_format: input.source_format,
            source_path: input.source_path.clone(),
            stats,
            issues: issues.list,
            messages,
        })
    }

    /// Convert a document read from a file.
    ///
    /// # Errors
    ///
    /// As [`Converter::convert`], plus I/O and parse errors for the input.
    pub fn convert_file(&self, path: impl AsRef<Path>) -> Result<ConvertResult, Error> {
        let input = Parser::new().parse_file(path)?;
        self.convert(&input)
    }
}

/// Convert a parsed document with the default (non-strict) converter.
///
/// # Errors
///
/// See [`Converter::convert`].
pub fn convert(input: &ParseResult, target: OASVersion) -> Result<ConvertResult, Error> {
    Converter::new(target).convert(input)
}

// ---- shared schema walking over generic trees ----

/// Visit a schema map and every nested subschema, depth-first, parent
/// before children.
pub(crate) fn walk_schema(
    value: &mut Value,
    location: &str,
    f: &mut impl FnMut(&mut JsonMap, &str),
) {
    let Some(map) = value.as_object_mut() else {
        return;
    };
    f(map, location);
    if let Some(properties) = map.get_mut("properties").and_then(Value::as_object_mut) {
        let names: Vec<String> = properties.keys().cloned().collect();
        for name in names {
            if let Some(child) = properties.get_mut(&name) {
                walk_schema(child, &format!("{location}.properties.{name}"), f);
            }
        }
    }
    for key in ["items", "additionalProperties", "not"] {
        if let Some(child) = map.get_mut(key) {
            if child.is_object() {
                walk_schema(child, &format!("{location}.{key}"), f);
            }
        }
    }
    for key in ["allOf", "anyOf", "oneOf", "prefixItems"] {
        if let Some(members) = map.get_mut(key).and_then(Value::as_array_mut) {
            for (index, child) in members.iter_mut().enumerate() {
                walk_schema(child, &format!("{location}.{key}[{index}]"), f);
            }
        }
    }
}

fn walk_content_schemas(
    container: &mut JsonMap,
    location: &str,
    f: &mut impl FnMut(&mut JsonMap, &str),
) {
    let Some(content) = container.get_mut("content").and_then(Value::as_object_mut) else {
        return;
    };
    let media_types: Vec<String> = content.keys().cloned().collect();
    for media in media_types {
        if let Some(schema) = content
            .get_mut(&media)
            .and_then(Value::as_object_mut)
            .and_then(|m| m.get_mut("schema"))
        {
            walk_schema(schema, &format!("{location}.content.{media}.schema"), f);
        }
    }
}

fn walk_parameter_schemas(
    container: &mut JsonMap,
    location: &str,
    f: &mut impl FnMut(&mut JsonMap, &str),
) {
    let Some(parameters) = container.get_mut("parameters").and_then(Value::as_array_mut) else {
        return;
    };
    for (index, parameter) in parameters.iter_mut().enumerate() {
        if let Some(schema) = parameter.as_object_mut().and_then(|m| m.get_mut("schema")) {
            walk_schema(schema, &format!("{location}.parameters[{index}].schema"), f);
        }
    }
}

fn walk_operation_schemas(
    operation: &mut JsonMap,
    location: &str,
    f: &mut impl FnMut(&mut JsonMap, &str),
) {
    walk_parameter_schemas(operation, location, f);
    if let Some(body) = operation
        .get_mut("requestBody")
        .and_then(Value::as_object_mut)
    {
        walk_content_schemas(body, &format!("{location}.requestBody"), f);
    }
    if let Some(responses) = operation.get_mut("responses").and_then(Value::as_object_mut) {
        let statuses: Vec<String> = responses.keys().cloned().collect();
        for status in statuses {
            let Some(response) = responses.get_mut(&status).and_then(Value::as_object_mut) else {
                continue;
            };
            let response_location = format!("{location}.responses.{status}");
            walk_content_schemas(response, &response_location, f);
            // 2.0 single response schema.
            if let Some(schema) = response.get_mut("schema") {
                walk_schema(schema, &format!("{response_location}.schema"), f);
            }
            if let Some(headers) = response.get_mut("headers").and_then(Value::as_object_mut) {
                let names: Vec<String> = headers.keys().cloned().collect();
                for name in names {
                    if let Some(schema) = headers
                        .get_mut(&name)
                        .and_then(Value::as_object_mut)
                        .and_then(|m| m.get_mut("schema"))
                    {
                        walk_schema(
                            schema,
                            &format!("{response_location}.headers.{name}.schema"),
                            f,
                        );
                    }
                }
            }
        }
    }
}

fn walk_path_area(tree: &mut Value, area: &str, f: &mut impl FnMut(&mut JsonMap, &str)) {
    let Some(paths) = tree.get_mut(area).and_then(Value::as_object_mut) else {
        return;
    };
    let templates: Vec<String> = paths.keys().cloned().collect();
    for template in templates {
        let Some(item) = paths.get_mut(&template).and_then(Value::as_object_mut) else {
            continue;
        };
        let item_location = format!("{area}.{template}");
        walk_parameter_schemas(item, &item_location, f);
        for method in crate::constants::HTTP_METHODS {
            if let Some(operation) = item.get_mut(*method).and_then(Value::as_object_mut) {
                walk_operation_schemas(operation, &format!("{item_location}.{method}"), f);
            }
        }
    }
}

/// Visit every schema in a 3.x tree (components, paths, webhooks).
pub(crate) fn for_each_schema_v3(tree: &mut Value, f: &mut impl FnMut(&mut JsonMap, &str)) {
    if let Some(components) = tree.get_mut("components").and_then(Value::as_object_mut) {
        if let Some(schemas) = components.get_mut("schemas").and_then(Value::as_object_mut) {
            let names: Vec<String> = schemas.keys().cloned().collect();
            for name in names {
                if let Some(schema) = schemas.get_mut(&name) {
                    walk_schema(schema, &format!("components.schemas.{name}"), f);
                }
            }
        }
        if let Some(parameters) = components
            .get_mut("parameters")
            .and_then(Value::as_object_mut)
        {
            let names: Vec<String> = parameters.keys().cloned().collect();
            for name in names {
                if let Some(schema) = parameters
                    .get_mut(&name)
                    .and_then(Value::as_object_mut)
                    .and_then(|m| m.get_mut("schema"))
                {
                    walk_schema(schema, &format!("components.parameters.{name}.schema"), f);
                }
            }
        }
        for bucket in ["responses", "requestBodies"] {
            if let Some(entries) = components.get_mut(bucket).and_then(Value::as_object_mut) {
                let names: Vec<String> = entries.keys().cloned().collect();
                for name in names {
                    if let Some(entry) = entries.get_mut(&name).and_then(Value::as_object_mut) {
                        walk_content_schemas(entry, &format!("components.{bucket}.{name}"), f);
                    }
                }
            }
        }
        if let Some(headers) = components.get_mut("headers").and_then(Value::as_object_mut) {
            let names: Vec<String> = headers.keys().cloned().collect();
            for name in names {
                if let Some(schema) = headers
                    .get_mut(&name)
                    .and_then(Value::as_object_mut)
                    .and_then(|m| m.get_mut("schema"))
                {
                    walk_schema(schema, &format!("components.headers.{name}.schema"), f);
                }
            }
        }
    }
    walk_path_area(tree, "paths", f);
    walk_path_area(tree, "webhooks", f);
}

/// Visit every schema in a 2.0 tree (definitions, parameters, responses,
/// paths).
pub(crate) fn for_each_schema_v2(tree: &mut Value, f: &mut impl FnMut(&mut JsonMap, &str)) {
    if let Some(definitions) = tree.get_mut("definitions").and_then(Value::as_object_mut) {
        let names: Vec<String> = definitions.keys().cloned().collect();
        for name in names {
            if let Some(schema) = definitions.get_mut(&name) {
                walk_schema(schema, &format!("definitions.{name}"), f);
            }
        }
    }
    if let Some(parameters) = tree.get_mut("parameters").and_then(Value::as_object_mut) {
        let names: Vec<String> = parameters.keys().cloned().collect();
        for name in names {
            if let Some(schema) = parameters
                .get_mut(&name)
                .and_then(Value::as_object_mut)
                .and_then(|m| m.get_mut("schema"))
            {
                walk_schema(schema, &format!("parameters.{name}.schema"), f);
            }
        }
    }
    if let Some(responses) = tree.get_mut("responses").and_then(Value::as_object_mut) {
        let names: Vec<String> = responses.keys().cloned().collect();
        for name in names {
            if let Some(schema) = responses
                .get_mut(&name)
                .and_then(Value::as_object_mut)
                .and_then(|m| m.get_mut("schema"))
            {
                walk_schema(schema, &format!("responses.{name}.schema"), f);
            }
        }
    }
    walk_path_area(tree, "paths", f);
}
