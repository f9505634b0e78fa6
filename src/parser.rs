//! Document parsing: bytes to typed model plus generic tree.
//!
//! The parser classifies the document version from its `swagger` / `openapi`
//! field, decodes the typed model, records a statistics snapshot, and can
//! run a structural validation pass. Both the typed document and the
//! ordered generic tree are kept on the result so downstream components can
//! choose the representation they need.

use crate::constants;
use crate::error::Error;
use crate::loader::{self, SourceFormat, SourceMap};
use crate::model::{Document, DocumentAccessor, OASVersion, ParameterLocation};
use crate::value;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Statistics snapshot taken at parse time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecStats {
    pub path_count: usize,
    pub operation_count: usize,
    pub schema_count: usize,
}

/// The output of a parse: typed document, generic tree, and metadata.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Raw version string from the document (`"2.0"`, `"3.0.3"`, ...).
    pub version: String,
    pub oas_version: OASVersion,
    pub source_format: SourceFormat,
    pub source_path: Option<PathBuf>,
    pub source_size: usize,
    pub stats: SpecStats,
    pub document: Document,
    /// The ordered generic tree the document decoded from.
    pub data: Value,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub source_map: Option<SourceMap>,
}

impl ParseResult {
    /// Serialize the generic tree back to text in the source format.
    ///
    /// # Errors
    ///
    /// Returns a serialization error from the underlying format writer.
    pub fn emit(&self) -> Result<String, Error> {
        loader::emit_tree(&self.data, self.source_format)
    }

    /// Short name of the source for reports: the file stem when the
    /// document was read from a file, else a positional fallback.
    #[must_use]
    pub fn source_stem(&self) -> String {
        self.source_path
            .as_deref()
            .and_then(Path::file_stem)
            .map_or_else(
                || constants::DEFAULT_SOURCE_STEM.to_string(),
                |stem| stem.to_string_lossy().into_owned(),
            )
    }

    /// Display name of the source for collision reports.
    #[must_use]
    pub fn source_name(&self, index: usize) -> String {
        self.source_path.as_deref().map_or_else(
            || format!("document {index}"),
            |path| path.display().to_string(),
        )
    }
}

/// Configurable parser.
///
/// `resolve_refs` covers external (file/URL) references only; it is recorded
/// but external resolution is not performed by the core, and documents
/// containing remote references produce a warning.
#[derive(Debug, Clone)]
pub struct Parser {
    validate_structure: bool,
    build_source_map: bool,
    resolve_refs: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            validate_structure: true,
            build_source_map: false,
            resolve_refs: false,
        }
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_validate_structure(mut self, validate: bool) -> Self {
        self.validate_structure = validate;
        self
    }

    #[must_use]
    pub const fn with_source_map(mut self, build: bool) -> Self {
        self.build_source_map = build;
        self
    }

    #[must_use]
    pub const fn with_resolve_refs(mut self, resolve: bool) -> Self {
        self.resolve_refs = resolve;
        self
    }

    /// Parse source text into a [`ParseResult`].
    ///
    /// # Errors
    ///
    /// Returns a syntax error when the text parses as neither YAML nor
    /// JSON, an unknown-version error when no recognized `swagger` /
    /// `openapi` field is present, and a structural error when the tree
    /// does not decode into the typed model.
    pub fn parse_str(&self, content: &str) -> Result<ParseResult, Error> {
        self.parse_with_path(content, None)
    }

    /// Parse raw bytes into a [`ParseResult`].
    ///
    /// # Errors
    ///
    /// As [`Parser::parse_str`], plus an error when the bytes are not
    /// valid UTF-8.
    pub fn parse_slice(&self, bytes: &[u8]) -> Result<ParseResult, Error> {
        let content = std::str::from_utf8(bytes)
            .map_err(|e| Error::structural(format!("input is not valid UTF-8: {e}")))?;
        self.parse_with_path(content, None)
    }

    /// Parse a file into a [`ParseResult`].
    ///
    /// # Errors
    ///
    /// As [`Parser::parse_str`], plus I/O errors reading the file.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParseResult, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        self.parse_with_path(&content, Some(path.to_path_buf()))
    }

    fn parse_with_path(
        &self,
        content: &str,
        source_path: Option<PathBuf>,
    ) -> Result<ParseResult, Error> {
        let (data, source_format) = loader::load_tree(content)?;
        let oas_version = detect_version(&data)?;

        let document: Document = if oas_version.is_v2() {
            Document::V2(
                serde_json::from_value(data.clone()).map_err(|e| Error::structural(e.to_string()))?,
            )
        } else {
            Document::V3(
                serde_json::from_value(data.clone()).map_err(|e| Error::structural(e.to_string()))?,
            )
        };

        let stats = compute_stats(&document);
        debug!(
            version = oas_version.as_str(),
            paths = stats.path_count,
            operations = stats.operation_count,
            schemas = stats.schema_count,
            "parsed document"
        );

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        if self.validate_structure {
            validate_tree(&data, oas_version, &mut errors, &mut warnings);
        }
        if self.resolve_refs && has_remote_refs(&data) {
            warnings.push(
                "document contains external references; external resolution is not performed"
                    .to_string(),
            );
        }

        let source_map = self
            .build_source_map
            .then(|| SourceMap::build(content, source_format));

        Ok(ParseResult {
            version: oas_version.as_str().to_string(),
            oas_version,
            source_format,
            source_path,
            source_size: content.len(),
            stats,
            document,
            data,
            errors,
            warnings,
            source_map,
        })
    }
}

/// Parse source text with the default parser configuration.
///
/// # Errors
///
/// See [`Parser::parse_str`].
pub fn parse_str(content: &str) -> Result<ParseResult, Error> {
    Parser::new().parse_str(content)
}

/// Parse raw bytes with the default parser configuration.
///
/// # Errors
///
/// See [`Parser::parse_slice`].
pub fn parse_slice(bytes: &[u8]) -> Result<ParseResult, Error> {
    Parser::new().parse_slice(bytes)
}

/// Parse a file with the default parser configuration.
///
/// # Errors
///
/// See [`Parser::parse_file`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParseResult, Error> {
    Parser::new().parse_file(path)
}

/// Classify the document version from its `swagger` / `openapi` field.
///
/// # Errors
///
/// Returns an unknown-version error when neither field carries a
/// recognized value.
pub fn detect_version(data: &Value) -> Result<OASVersion, Error> {
    let Some(map) = data.as_object() else {
        return Err(Error::structural("document root is not a map"));
    };
    if let Some(swagger) = map.get(constants::FIELD_SWAGGER) {
        let text = swagger.as_str().unwrap_or_default();
        return if text == constants::VERSION_2_0 {
            Ok(OASVersion::V2_0)
        } else {
            Err(Error::unknown_version(format!("swagger: {text:?}")))
        };
    }
    if let Some(openapi) = map.get(constants::FIELD_OPENAPI) {
        let text = openapi.as_str().unwrap_or_default();
        return OASVersion::parse(text)
            .filter(|v| v.is_v3())
            .ok_or_else(|| Error::unknown_version(format!("openapi: {text:?}")));
    }
    Err(Error::unknown_version(
        "neither 'swagger' nor 'openapi' field present",
    ))
}

pub(crate) fn compute_stats(document: &Document) -> SpecStats {
    let paths = document.paths();
    SpecStats {
        path_count: paths.len(),
        operation_count: paths.values().map(|item| item.operations().len()).sum(),
        schema_count: document.schemas().map_or(0, indexmap::IndexMap::len),
    }
}

fn has_remote_refs(data: &Value) -> bool {
    crate::refs::collect_refs(data)
        .iter()
        .any(|target| !target.starts_with("#/"))
}

/// Re-run the structural validation pass over a parse result.
///
/// Used by operational consumers to decide the fixer exit code: a fixer run
/// succeeds when revalidating its output reports no errors.
#[must_use]
pub fn validate(result: &ParseResult) -> Vec<String> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    validate_tree(&result.data, result.oas_version, &mut errors, &mut warnings);
    errors
}

/// Structural validation over the generic tree.
///
/// Errors are defects that break the document contract (missing required
/// fields, dangling references, undeclared path parameters, duplicate
/// operation ids); warnings are survivable irregularities.
pub fn validate_tree(
    data: &Value,
    version: OASVersion,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let Some(root) = data.as_object() else {
        errors.push("document root is not a map".to_string());
        return;
    };

    // Required info fields.
    match root.get(constants::FIELD_INFO).and_then(Value::as_object) {
        Some(info) => {
            for field in [constants::FIELD_TITLE, constants::FIELD_VERSION] {
                let missing = info
                    .get(field)
                    .and_then(Value::as_str)
                    .is_none_or(str::is_empty);
                if missing {
                    errors.push(format!("info.{field} is required and must be a non-empty string"));
                }
            }
        }
        None => errors.push("info is required and must be a map".to_string()),
    }

    // Internal reference resolution.
    for target in crate::refs::collect_refs(data) {
        if target.starts_with("#/") {
            if value::resolve_pointer(data, &target).is_none() {
                errors.push(format!("reference '{target}' does not resolve"));
            }
        } else {
            warnings.push(format!("external reference '{target}' is not resolved"));
        }
    }

    let methods: &[&str] = if version.is_v2() {
        constants::HTTP_METHODS_V2
    } else {
        constants::HTTP_METHODS
    };

    let paths = root.get(constants::FIELD_PATHS).and_then(Value::as_object);
    let mut seen_operation_ids: Vec<(String, String)> = Vec::new();
    if let Some(paths) = paths {
        for (template, item) in paths {
            if !template.starts_with('/') {
                warnings.push(format!("path '{template}' does not start with '/'"));
            }
            let Some(item) = item.as_object() else {
                errors.push(format!("path item '{template}' is not a map"));
                continue;
            };

            // Declared path-level parameter names.
            let mut declared = collect_declared_path_params(item, data);
            for method in methods {
                if let Some(operation) = item.get(*method).and_then(Value::as_object) {
                    declared.extend(collect_declared_op_params(operation, data));

                    if let Some(id) = operation
                        .get(constants::FIELD_OPERATION_ID)
                        .and_then(Value::as_str)
                    {
                        let site = format!("{method} {template}");
                        if let Some((_, first)) =
                            seen_operation_ids.iter().find(|(seen, _)| seen == id)
                        {
                            errors.push(format!(
                                "operationId '{id}' at {site} duplicates {first}"
                            ));
                        } else {
                            seen_operation_ids.push((id.to_string(), site));
                        }
                    }
                    validate_parameter_locations(operation, version, template, method, errors);
                }
            }

            for variable in value::path_template_variables(template) {
                if !declared.contains(&variable) {
                    errors.push(format!(
                        "path '{template}' template variable '{{{variable}}}' has no declared parameter"
                    ));
                }
            }
        }
    } else if root.contains_key(constants::FIELD_PATHS) {
        errors.push("paths must be a map".to_string());
    }
}

fn param_list(item: &serde_json::Map<String, Value>) -> impl Iterator<Item = &Value> {
    item.get(constants::FIELD_PARAMETERS)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn resolve_param<'a>(param: &'a Value, data: &'a Value) -> &'a Value {
    param
        .get(constants::FIELD_REF)
        .and_then(Value::as_str)
        .and_then(|target| value::resolve_pointer(data, target))
        .unwrap_or(param)
}

fn collect_declared_path_params(
    item: &serde_json::Map<String, Value>,
    data: &Value,
) -> Vec<String> {
    param_list(item)
        .map(|param| resolve_param(param, data))
        .filter(|param| param.get(constants::FIELD_IN).and_then(Value::as_str) == Some("path"))
        .filter_map(|param| param.get(constants::FIELD_NAME).and_then(Value::as_str))
        .map(ToString::to_string)
        .collect()
}

fn collect_declared_op_params(
    operation: &serde_json::Map<String, Value>,
    data: &Value,
) -> Vec<String> {
    collect_declared_path_params(operation, data)
}

fn validate_parameter_locations(
    operation: &serde_json::Map<String, Value>,
    version: OASVersion,
    template: &str,
    method: &str,
    errors: &mut Vec<String>,
) {
    for param in param_list(operation) {
        let Some(location) = param.get(constants::FIELD_IN).and_then(Value::as_str) else {
            continue;
        };
        let valid = match location {
            "query" | "header" | "path" => true,
            "cookie" => version.is_v3(),
            "body" | "formData" => version.is_v2(),
            _ => false,
        };
        if !valid {
            errors.push(format!(
                "parameter location '{location}' at {method} {template} is not valid for version {}",
                version.as_str()
            ));
        }
    }
}

// Keep the location enum referenced from the typed side too; some callers
// validate typed parameters directly.
impl ParameterLocation {
    #[must_use]
    pub const fn valid_for(&self, version: OASVersion) -> bool {
        match self {
            Self::Query | Self::Header | Self::Path => true,
            Self::Cookie => version.is_v3(),
            Self::Body | Self::FormData => version.is_v2(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETSTORE_30: &str = r"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pets'
components:
  schemas:
    Pets:
      type: array
      items:
        $ref: '#/components/schemas/Pet'
    Pet:
      type: object
      properties:
        id:
          type: integer
";

    #[test]
    fn test_parse_30_document() {
        let result = parse_str(PETSTORE_30).unwrap();
        assert_eq!(result.oas_version, OASVersion::V3_0_3);
        assert_eq!(result.source_format, SourceFormat::Yaml);
        assert_eq!(result.stats.path_count, 1);
        assert_eq!(result.stats.operation_count, 1);
        assert_eq!(result.stats.schema_count, 2);
        assert!(result.errors.is_empty(), "errors: {:?}", result.errors);
    }

    #[test]
    fn test_parse_20_document() {
        let spec = r#"{"swagger": "2.0", "info": {"title": "T", "version": "1"}, "paths": {}}"#;
        let result = parse_str(spec).unwrap();
        assert_eq!(result.oas_version, OASVersion::V2_0);
        assert_eq!(result.source_format, SourceFormat::Json);
        assert!(result.document.as_v2().is_some());
    }

    #[test]
    fn test_unknown_version_fails() {
        let spec = "info:\n  title: T\n  version: '1'\npaths: {}\n";
        let err = parse_str(spec).unwrap_err();
        assert!(err.to_string().contains("Unknown document version"));

        let spec = "openapi: 4.0.0\ninfo:\n  title: T\n  version: '1'\npaths: {}\n";
        assert!(parse_str(spec).is_err());
    }

    #[test]
    fn test_dangling_ref_is_validation_error() {
        let spec = r"
openapi: 3.0.0
info:
  title: T
  version: '1'
paths:
  /a:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Missing'
";
        let result = parse_str(spec).unwrap();
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("#/components/schemas/Missing")));
    }

    #[test]
    fn test_undeclared_path_parameter_is_error() {
        let spec = r"
openapi: 3.0.0
info:
  title: T
  version: '1'
paths:
  /items/{itemId}:
    get:
      responses:
        '200':
          description: ok
";
        let result = parse_str(spec).unwrap();
        assert!(result.errors.iter().any(|e| e.contains("itemId")));
    }

    #[test]
    fn test_duplicate_operation_id_is_error() {
        let spec = r"
openapi: 3.0.0
info:
  title: T
  version: '1'
paths:
  /a:
    get:
      operationId: getThing
      responses: {'200': {description: ok}}
  /b:
    get:
      operationId: getThing
      responses: {'200': {description: ok}}
";
        let result = parse_str(spec).unwrap();
        assert!(result.errors.iter().any(|e| e.contains("getThing")));
    }

    #[test]
    fn test_round_trip_typed_equality() {
        let first = parse_str(PETSTORE_30).unwrap();
        let emitted = first.emit().unwrap();
        let second = parse_str(&emitted).unwrap();
        assert_eq!(first.document, second.document);
    }

    #[test]
    fn test_source_stem() {
        let mut result = parse_str(PETSTORE_30).unwrap();
        assert_eq!(result.source_stem(), "document");
        result.source_path = Some(PathBuf::from("/tmp/billing.yaml"));
        assert_eq!(result.source_stem(), "billing");
    }
}
