//! The comparison walk and classification rules.

use super::{Change, ChangeKind, DiffCategory, DiffMode, DiffResult, Severity};
use crate::error::Error;
use crate::model::{
    Document, DocumentAccessor, Operation, Parameter, ParameterLocation, PathItem, Schema,
    SecurityScheme,
};
use crate::parser::{ParseResult, Parser};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Reusable configured differ.
#[derive(Debug, Clone, Copy, Default)]
pub struct Differ {
    mode: DiffMode,
}

impl Differ {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: DiffMode) -> Self {
        self.mode = mode;
        self
    }

    /// Compare two parsed documents.
    #[must_use]
    pub fn diff(&self, source: &ParseResult, target: &ParseResult) -> DiffResult {
        self.diff_documents(&source.document, &target.document)
    }

    /// Compare two documents read from files.
    ///
    /// # Errors
    ///
    /// Returns I/O or parse errors for either input; structural differences
    /// never abort.
    pub fn diff_files(
        &self,
        source: impl AsRef<Path>,
        target: impl AsRef<Path>,
    ) -> Result<DiffResult, Error> {
        let parser = Parser::new();
        let source = parser.parse_file(source)?;
        let target = parser.parse_file(target)?;
        Ok(self.diff(&source, &target))
    }

    /// Compare two typed documents.
    #[must_use]
    pub fn diff_documents(&self, source: &Document, target: &Document) -> DiffResult {
        let mut ctx = Ctx {
            mode: self.mode,
            cross_version: source.oas_version().major() != target.oas_version().major(),
            changes: Vec::new(),
        };

        compare_versions(&mut ctx, source, target);
        compare_info(&mut ctx, source, target);
        compare_servers(&mut ctx, source, target);
        compare_security(&mut ctx, source, target);
        compare_paths(&mut ctx, source, target);
        compare_schemas(&mut ctx, source, target);

        // Category order first, then structural path; the sort is stable so
        // insertion order breaks remaining ties.
        let mut changes = ctx.changes;
        changes.sort_by(|a, b| {
            a.category
                .rank()
                .cmp(&b.category.rank())
                .then_with(|| a.path.cmp(&b.path))
        });
        let has_breaking_changes = changes
            .iter()
            .any(|change| change.severity.is_breaking());
        let messages = changes.iter().map(Change::render).collect();
        debug!(
            changes = changes.len(),
            breaking = has_breaking_changes,
            "diff complete"
        );
        DiffResult {
            mode: self.mode,
            changes,
            has_breaking_changes,
            messages,
        }
    }
}

struct Ctx {
    mode: DiffMode,
    cross_version: bool,
    changes: Vec<Change>,
}

impl Ctx {
    fn push(
        &mut self,
        category: DiffCategory,
        severity: Severity,
        kind: ChangeKind,
        path: impl Into<String>,
        message: impl Into<String>,
        old: Option<Value>,
        new: Option<Value>,
    ) {
        let severity = match self.mode {
            DiffMode::Simple => Severity::Info,
            DiffMode::Breaking => severity,
        };
        self.changes.push(Change {
            category,
            severity,
            kind,
            path: path.into(),
            message: message.into(),
            old,
            new,
        });
    }
}

fn compare_versions(ctx: &mut Ctx, source: &Document, target: &Document) {
    if source.version_string() != target.version_string() {
        ctx.push(
            DiffCategory::Info,
            Severity::Info,
            ChangeKind::Changed,
            "version",
            format!(
                "document version changed from {} to {}",
                source.version_string(),
                target.version_string()
            ),
            Some(Value::String(source.version_string().to_string())),
            Some(Value::String(target.version_string().to_string())),
        );
    }
}

fn compare_info(ctx: &mut Ctx, source: &Document, target: &Document) {
    let (old, new) = (source.info(), target.info());
    let fields = [
        ("info.title", &old.title, &new.title),
        ("info.version", &old.version, &new.version),
    ];
    for (path, old_value, new_value) in fields {
        if old_value != new_value {
            ctx.push(
                DiffCategory::Info,
                Severity::Info,
                ChangeKind::Changed,
                path,
                "documentation changed",
                Some(Value::String(old_value.clone())),
                Some(Value::String(new_value.clone())),
            );
        }
    }
    if old.description != new.description {
        ctx.push(
            DiffCategory::Info,
            Severity::Info,
            ChangeKind::Changed,
            "info.description",
            "documentation changed",
            old.description.clone().map(Value::String),
            new.description.clone().map(Value::String),
        );
    }
}

// Unified server URL list: 3.x `servers[].url`, 2.0 synthesized from
// `schemes`/`host`/`basePath`.
fn server_urls(document: &Document) -> Vec<String> {
    match document {
        Document::V3(doc) => doc.servers.iter().map(|s| s.url.clone()).collect(),
        Document::V2(doc) => {
            let base = doc.base_path.clone().unwrap_or_default();
            doc.host.as_ref().map_or_else(
                || {
                    if base.is_empty() {
                        Vec::new()
                    } else {
                        vec![base.clone()]
                    }
                },
                |host| {
                    let schemes: &[String] = if doc.schemes.is_empty() {
                        &[]
                    } else {
                        &doc.schemes
                    };
                    if schemes.is_empty() {
                        vec![format!("//{host}{base}")]
                    } else {
                        schemes
                            .iter()
                            .map(|scheme| format!("{scheme}://{host}{base}"))
                            .collect()
                    }
                },
            )
        }
    }
}

fn compare_servers(ctx: &mut Ctx, source: &Document, target: &Document) {
    let old = server_urls(source);
    let new = server_urls(target);
    for url in &old {
        if !new.contains(url) {
            ctx.push(
                DiffCategory::Server,
                Severity::Warning,
                ChangeKind::Removed,
                format!("servers.{url}"),
                "server removed",
                Some(Value::String(url.clone())),
                None,
            );
        }
    }
    for url in &new {
        if !old.contains(url) {
            ctx.push(
                DiffCategory::Server,
                Severity::Info,
                ChangeKind::Added,
                format!("servers.{url}"),
                "server added",
                None,
                Some(Value::String(url.clone())),
            );
        }
    }
}

fn security_schemes(document: &Document) -> Option<&IndexMap<String, SecurityScheme>> {
    match document {
        Document::V2(doc) => Some(&doc.security_definitions),
        Document::V3(doc) => doc.components.as_ref().map(|c| &c.security_schemes),
    }
}

fn compare_security(ctx: &mut Ctx, source: &Document, target: &Document) {
    let empty = IndexMap::new();
    let old = security_schemes(source).unwrap_or(&empty);
    let new = security_schemes(target).unwrap_or(&empty);
    for name in old.keys() {
        if !new.contains_key(name) {
            ctx.push(
                DiffCategory::Security,
                Severity::Warning,
                ChangeKind::Removed,
                format!("securitySchemes.{name}"),
                "security scheme removed",
                None,
                None,
            );
        }
    }
    for (name, scheme) in new {
        match old.get(name) {
            None => ctx.push(
                DiffCategory::Security,
                Severity::Info,
                ChangeKind::Added,
                format!("securitySchemes.{name}"),
                "security scheme added",
                None,
                None,
            ),
            Some(previous) if previous != scheme => ctx.push(
                DiffCategory::Security,
                Severity::Warning,
                ChangeKind::Changed,
                format!("securitySchemes.{name}"),
                "security scheme changed",
                serde_json::to_value(previous).ok(),
                serde_json::to_value(scheme).ok(),
            ),
            Some(_) => {}
        }
    }

    let old_global = match source {
        Document::V2(doc) => &doc.security,
        Document::V3(doc) => &doc.security,
    };
    let new_global = match target {
        Document::V2(doc) => &doc.security,
        Document::V3(doc) => &doc.security,
    };
    if old_global != new_global {
        let (severity, kind, message) = if old_global.is_empty() {
            (
                Severity::Error,
                ChangeKind::Added,
                "global security requirement added",
            )
        } else if new_global.is_empty() {
            (
                Severity::Info,
                ChangeKind::Removed,
                "global security requirement removed",
            )
        } else {
            (
                Severity::Warning,
                ChangeKind::Changed,
                "global security requirements changed",
            )
        };
        ctx.push(
            DiffCategory::Security,
            severity,
            kind,
            "security",
            message,
            serde_json::to_value(old_global).ok(),
            serde_json::to_value(new_global).ok(),
        );
    }
}

fn compare_paths(ctx: &mut Ctx, source: &Document, target: &Document) {
    let old = source.paths();
    let new = target.paths();
    for (template, item) in old {
        if new.contains_key(template) {
            continue;
        }
        ctx.push(
            DiffCategory::Endpoint,
            Severity::Critical,
            ChangeKind::Removed,
            format!("paths.{template}"),
            format!(
                "path removed ({} operations)",
                item.operations().len()
            ),
            None,
            None,
        );
    }
    for template in new.keys() {
        if !old.contains_key(template) {
            ctx.push(
                DiffCategory::Endpoint,
                Severity::Info,
                ChangeKind::Added,
                format!("paths.{template}"),
                "path added",
                None,
                None,
            );
        }
    }
    for (template, old_item) in old {
        let Some(new_item) = new.get(template) else {
            continue;
        };
        compare_path_items(ctx, template, old_item, new_item);
    }
}

fn compare_path_items(ctx: &mut Ctx, template: &str, old: &PathItem, new: &PathItem) {
    let old_ops: IndexMap<&str, &Operation> = old.operations().into_iter().collect();
    let new_ops: IndexMap<&str, &Operation> = new.operations().into_iter().collect();
    for method in old_ops.keys() {
        if !new_ops.contains_key(method) {
            ctx.push(
                DiffCategory::Operation,
                Severity::Critical,
                ChangeKind::Removed,
                format!("paths.{template}.{method}"),
                "operation removed",
                None,
                None,
            );
        }
    }
    for method in new_ops.keys() {
        if !old_ops.contains_key(method) {
            ctx.push(
                DiffCategory::Operation,
                Severity::Info,
                ChangeKind::Added,
                format!("paths.{template}.{method}"),
                "operation added",
                None,
                None,
            );
        }
    }
    for (method, old_op) in &old_ops {
        let Some(new_op) = new_ops.get(method) else {
            continue;
        };
        compare_operation(ctx, template, method, old, new, old_op, new_op);
    }
}

#[allow(clippy::too_many_arguments)]
fn compare_operation(
    ctx: &mut Ctx,
    template: &str,
    method: &str,
    old_item: &PathItem,
    new_item: &PathItem,
    old: &Operation,
    new: &Operation,
) {
    let prefix = format!("paths.{template}.{method}");

    if old.deprecated.unwrap_or(false) != new.deprecated.unwrap_or(false) {
        if new.deprecated.unwrap_or(false) {
            ctx.push(
                DiffCategory::Operation,
                Severity::Warning,
                ChangeKind::Changed,
                format!("{prefix}.deprecated"),
                "operation marked deprecated",
                Some(Value::Bool(false)),
                Some(Value::Bool(true)),
            );
        } else {
            ctx.push(
                DiffCategory::Operation,
                Severity::Info,
                ChangeKind::Changed,
                format!("{prefix}.deprecated"),
                "operation no longer deprecated",
                Some(Value::Bool(true)),
                Some(Value::Bool(false)),
            );
        }
    }

    for (field, old_text, new_text) in [
        ("summary", &old.summary, &new.summary),
        ("description", &old.description, &new.description),
        ("operationId", &old.operation_id, &new.operation_id),
    ] {
        if old_text != new_text {
            ctx.push(
                DiffCategory::Operation,
                Severity::Info,
                ChangeKind::Changed,
                format!("{prefix}.{field}"),
                "documentation changed",
                old_text.clone().map(Value::String),
                new_text.clone().map(Value::String),
            );
        }
    }

    compare_parameters(ctx, &prefix, old_item, new_item, old, new);
    compare_request_bodies(ctx, &prefix, old, new);
    compare_responses(ctx, &prefix, old, new);
}

// Path-level parameters apply to every operation; operation-level ones
// override a path-level parameter with the same name and location.
fn effective_parameters<'a>(item: &'a PathItem, op: &'a Operation) -> Vec<&'a Parameter> {
    let mut merged: IndexMap<(String, String), &Parameter> = IndexMap::new();
    for param in item.parameters.iter().chain(op.parameters.iter()) {
        merged.insert(param_key(param), param);
    }
    merged.into_values().collect()
}

fn param_key(param: &Parameter) -> (String, String) {
    (
        param.name.clone().unwrap_or_default(),
        param
            .location
            .map(|l| l.as_str().to_string())
            .unwrap_or_default(),
    )
}

fn is_body_like(param: &Parameter) -> bool {
    matches!(
        param.location,
        Some(ParameterLocation::Body | ParameterLocation::FormData)
    )
}

fn param_type_name(param: &Parameter) -> Option<&str> {
    param
        .schema
        .as_ref()
        .and_then(Schema::type_name)
        .or(param.param_type.as_deref())
}

fn compare_parameters(
    ctx: &mut Ctx,
    prefix: &str,
    old_item: &PathItem,
    new_item: &PathItem,
    old: &Operation,
    new: &Operation,
) {
    let old_params: IndexMap<(String, String), &Parameter> = effective_parameters(old_item, old)
        .into_iter()
        .map(|p| (param_key(p), p))
        .collect();
    let new_params: IndexMap<(String, String), &Parameter> = effective_parameters(new_item, new)
        .into_iter()
        .map(|p| (param_key(p), p))
        .collect();

    for (key, param) in &old_params {
        if new_params.contains_key(key) {
            continue;
        }
        // Body parameters shift to requestBody across major versions.
        let severity = if ctx.cross_version && is_body_like(param) {
            Severity::Info
        } else {
            Severity::Warning
        };
        ctx.push(
            DiffCategory::Parameter,
            severity,
            ChangeKind::Removed,
            format!("{prefix}.parameters.{}", key.0),
            "parameter removed",
            serde_json::to_value(*param).ok(),
            None,
        );
    }

    for (key, param) in &new_params {
        if old_params.contains_key(key) {
            continue;
        }
        let severity = if ctx.cross_version && is_body_like(param) {
            Severity::Info
        } else if param.is_required() {
            Severity::Error
        } else {
            Severity::Info
        };
        let message = if param.is_required() {
            "required parameter added"
        } else {
            "optional parameter added"
        };
        ctx.push(
            DiffCategory::Parameter,
            severity,
            ChangeKind::Added,
            format!("{prefix}.parameters.{}", key.0),
            message,
            None,
            serde_json::to_value(*param).ok(),
        );
    }

    for (key, old_param) in &old_params {
        let Some(new_param) = new_params.get(key) else {
            continue;
        };
        let path = format!("{prefix}.parameters.{}", key.0);
        if !old_param.is_required() && new_param.is_required() {
            ctx.push(
                DiffCategory::Parameter,
                Severity::Error,
                ChangeKind::Changed,
                path.clone(),
                "optional parameter became required",
                Some(Value::Bool(false)),
                Some(Value::Bool(true)),
            );
        } else if old_param.is_required() && !new_param.is_required() {
            ctx.push(
                DiffCategory::Parameter,
                Severity::Info,
                ChangeKind::Changed,
                path.clone(),
                "required parameter became optional",
                Some(Value::Bool(true)),
                Some(Value::Bool(false)),
            );
        }

        let old_type = param_type_name(old_param);
        let new_type = param_type_name(new_param);
        if let (Some(old_type), Some(new_type)) = (old_type, new_type) {
            if old_type != new_type {
                ctx.push(
                    DiffCategory::Parameter,
                    Severity::Error,
                    ChangeKind::Changed,
                    path.clone(),
                    format!("incompatible parameter type change ({old_type} to {new_type})"),
                    Some(Value::String(old_type.to_string())),
                    Some(Value::String(new_type.to_string())),
                );
            }
        }

        if let (Some(old_schema), Some(new_schema)) = (&old_param.schema, &new_param.schema) {
            compare_schema_nodes(
                ctx,
                DiffCategory::Parameter,
                &path,
                old_schema,
                new_schema,
                false,
            );
        } else {
            // 2.0 inline constraint keywords.
            compare_numeric_bound(
                ctx,
                DiffCategory::Parameter,
                &path,
                "maximum",
                old_param.maximum.as_ref().and_then(serde_json::Number::as_f64),
                new_param.maximum.as_ref().and_then(serde_json::Number::as_f64),
                BoundKind::Upper,
            );
            compare_numeric_bound(
                ctx,
                DiffCategory::Parameter,
                &path,
                "minimum",
                old_param.minimum.as_ref().and_then(serde_json::Number::as_f64),
                new_param.minimum.as_ref().and_then(serde_json::Number::as_f64),
                BoundKind::Lower,
            );
        }
    }
}

fn compare_request_bodies(ctx: &mut Ctx, prefix: &str, old: &Operation, new: &Operation) {
    let path = format!("{prefix}.requestBody");
    match (&old.request_body, &new.request_body) {
        (None, Some(body)) => {
            let severity = if ctx.cross_version {
                Severity::Info
            } else if body.required.unwrap_or(false) {
                Severity::Error
            } else {
                Severity::Info
            };
            ctx.push(
                DiffCategory::RequestBody,
                severity,
                ChangeKind::Added,
                path,
                "request body added",
                None,
                None,
            );
        }
        (Some(_), None) => {
            let severity = if ctx.cross_version {
                Severity::Info
            } else {
                Severity::Warning
            };
            ctx.push(
                DiffCategory::RequestBody,
                severity,
                ChangeKind::Removed,
                path,
                "request body removed",
                None,
                None,
            );
        }
        (Some(old_body), Some(new_body)) => {
            if !old_body.required.unwrap_or(false) && new_body.required.unwrap_or(false) {
                ctx.push(
                    DiffCategory::RequestBody,
                    Severity::Error,
                    ChangeKind::Changed,
                    path.clone(),
                    "optional request body became required",
                    Some(Value::Bool(false)),
                    Some(Value::Bool(true)),
                );
            }
            for media in old_body.content.keys() {
                if !new_body.content.contains_key(media) {
                    ctx.push(
                        DiffCategory::RequestBody,
                        Severity::Warning,
                        ChangeKind::Removed,
                        format!("{path}.content.{media}"),
                        "request content type removed",
                        None,
                        None,
                    );
                }
            }
            for (media, new_media) in &new_body.content {
                match old_body.content.get(media) {
                    None => ctx.push(
                        DiffCategory::RequestBody,
                        Severity::Info,
                        ChangeKind::Added,
                        format!("{path}.content.{media}"),
                        "request content type added",
                        None,
                        None,
                    ),
                    Some(old_media) => {
                        if let (Some(old_schema), Some(new_schema)) =
                            (&old_media.schema, &new_media.schema)
                        {
                            compare_schema_nodes(
                                ctx,
                                DiffCategory::RequestBody,
                                &format!("{path}.content.{media}.schema"),
                                old_schema,
                                new_schema,
                                false,
                            );
                        }
                    }
                }
            }
        }
        (None, None) => {}
    }
}

fn compare_responses(ctx: &mut Ctx, prefix: &str, old: &Operation, new: &Operation) {
    for status in old.responses.keys() {
        if !new.responses.contains_key(status) {
            ctx.push(
                DiffCategory::Response,
                Severity::Warning,
                ChangeKind::Removed,
                format!("{prefix}.responses.{status}"),
                "response status code removed",
                None,
                None,
            );
        }
    }
    for status in new.responses.keys() {
        if !old.responses.contains_key(status) {
            ctx.push(
                DiffCategory::Response,
                Severity::Info,
                ChangeKind::Added,
                format!("{prefix}.responses.{status}"),
                "response status code added",
                None,
                None,
            );
        }
    }
    for (status, old_response) in &old.responses {
        let Some(new_response) = new.responses.get(status) else {
            continue;
        };
        let path = format!("{prefix}.responses.{status}");

        // 2.0 single response schema.
        if let (Some(old_schema), Some(new_schema)) = (&old_response.schema, &new_response.schema) {
            compare_schema_nodes(
                ctx,
                DiffCategory::Response,
                &format!("{path}.schema"),
                old_schema,
                new_schema,
                false,
            );
        }

        for media in old_response.content.keys() {
            if !new_response.content.contains_key(media) {
                ctx.push(
                    DiffCategory::Response,
                    Severity::Warning,
                    ChangeKind::Removed,
                    format!("{path}.content.{media}"),
                    "response content type removed",
                    None,
                    None,
                );
            }
        }
        for (media, new_media) in &new_response.content {
            match old_response.content.get(media) {
                None => {
                    ctx.push(
                        DiffCategory::Response,
                        Severity::Info,
                        ChangeKind::Added,
                        format!("{path}.content.{media}"),
                        "response content type added",
                        None,
                        None,
                    );
                }
                Some(old_media) => {
                    if let (Some(old_schema), Some(new_schema)) =
                        (&old_media.schema, &new_media.schema)
                    {
                        compare_schema_nodes(
                            ctx,
                            DiffCategory::Response,
                            &format!("{path}.content.{media}.schema"),
                            old_schema,
                            new_schema,
                            false,
                        );
                    }
                }
            }
        }
    }
}

fn compare_schemas(ctx: &mut Ctx, source: &Document, target: &Document) {
    let empty = IndexMap::new();
    let old = source.schemas().unwrap_or(&empty);
    let new = target.schemas().unwrap_or(&empty);
    for name in old.keys() {
        if !new.contains_key(name) {
            ctx.push(
                DiffCategory::Schema,
                Severity::Warning,
                ChangeKind::Removed,
                format!("schemas.{name}"),
                "schema removed",
                None,
                None,
            );
        }
    }
    for name in new.keys() {
        if !old.contains_key(name) {
            ctx.push(
                DiffCategory::Schema,
                Severity::Info,
                ChangeKind::Added,
                format!("schemas.{name}"),
                "schema added",
                None,
                None,
            );
        }
    }
    for (name, old_schema) in old {
        let Some(new_schema) = new.get(name) else {
            continue;
        };
        compare_schema_nodes(
            ctx,
            DiffCategory::Schema,
            &format!("schemas.{name}"),
            old_schema,
            new_schema,
            true,
        );
    }
}

#[derive(Clone, Copy)]
enum BoundKind {
    Upper,
    Lower,
}

fn compare_numeric_bound(
    ctx: &mut Ctx,
    category: DiffCategory,
    path: &str,
    keyword: &str,
    old: Option<f64>,
    new: Option<f64>,
    bound: BoundKind,
) {
    let Some(new_value) = new else {
        if old.is_some() {
            ctx.push(
                category,
                Severity::Info,
                ChangeKind::Removed,
                format!("{path}.{keyword}"),
                format!("{keyword} constraint removed (relaxed)"),
                old.map(Value::from),
                None,
            );
        }
        return;
    };
    let Some(old_value) = old else {
        // Introducing a bound is a tightening.
        ctx.push(
            category,
            Severity::Error,
            ChangeKind::Added,
            format!("{path}.{keyword}"),
            format!("{keyword} constraint added (tightened)"),
            None,
            Some(Value::from(new_value)),
        );
        return;
    };
    if (old_value - new_value).abs() < f64::EPSILON {
        return;
    }
    let tightened = match bound {
        BoundKind::Upper => new_value < old_value,
        BoundKind::Lower => new_value > old_value,
    };
    if tightened {
        ctx.push(
            category,
            Severity::Error,
            ChangeKind::Changed,
            format!("{path}.{keyword}"),
            format!("{keyword} constraint tightened"),
            Some(Value::from(old_value)),
            Some(Value::from(new_value)),
        );
    } else {
        ctx.push(
            category,
            Severity::Info,
            ChangeKind::Changed,
            format!("{path}.{keyword}"),
            format!("{keyword} constraint relaxed"),
            Some(Value::from(old_value)),
            Some(Value::from(new_value)),
        );
    }
}

// `recurse_properties` bounds the walk: named component schemas recurse
// fully; inline schemas compare one property level plus items.
fn compare_schema_nodes(
    ctx: &mut Ctx,
    category: DiffCategory,
    path: &str,
    old: &Schema,
    new: &Schema,
    recurse_properties: bool,
) {
    if old.ref_path.is_some() || new.ref_path.is_some() {
        if old.ref_path != new.ref_path {
            ctx.push(
                category,
                Severity::Error,
                ChangeKind::Changed,
                format!("{path}.$ref"),
                "schema reference changed",
                old.ref_path.clone().map(Value::String),
                new.ref_path.clone().map(Value::String),
            );
        }
        return;
    }

    if let (Some(old_type), Some(new_type)) = (old.type_name(), new.type_name()) {
        if old_type != new_type {
            ctx.push(
                category,
                Severity::Error,
                ChangeKind::Changed,
                format!("{path}.type"),
                format!("schema type changed ({old_type} to {new_type})"),
                Some(Value::String(old_type.to_string())),
                Some(Value::String(new_type.to_string())),
            );
        }
    }

    if old.format != new.format && old.format.is_some() && new.format.is_some() {
        ctx.push(
            category,
            Severity::Warning,
            ChangeKind::Changed,
            format!("{path}.format"),
            "schema format changed",
            old.format.clone().map(Value::String),
            new.format.clone().map(Value::String),
        );
    }

    compare_numeric_bound(
        ctx,
        category,
        path,
        "maximum",
        old.maximum.as_ref().and_then(serde_json::Number::as_f64),
        new.maximum.as_ref().and_then(serde_json::Number::as_f64),
        BoundKind::Upper,
    );
    compare_numeric_bound(
        ctx,
        category,
        path,
        "minimum",
        old.minimum.as_ref().and_then(serde_json::Number::as_f64),
        new.minimum.as_ref().and_then(serde_json::Number::as_f64),
        BoundKind::Lower,
    );

    for field in &new.required {
        if !old.required.contains(field) {
            ctx.push(
                category,
                Severity::Error,
                ChangeKind::Added,
                format!("{path}.required.{field}"),
                "previously optional field became required",
                None,
                Some(Value::String(field.clone())),
            );
        }
    }
    for field in &old.required {
        if !new.required.contains(field) {
            ctx.push(
                category,
                Severity::Info,
                ChangeKind::Removed,
                format!("{path}.required.{field}"),
                "field no longer required",
                Some(Value::String(field.clone())),
                None,
            );
        }
    }

    if !old.enum_values.is_empty() || !new.enum_values.is_empty() {
        for value in &old.enum_values {
            if !new.enum_values.contains(value) {
                ctx.push(
                    category,
                    Severity::Error,
                    ChangeKind::Removed,
                    format!("{path}.enum"),
                    "enum value removed",
                    Some(value.clone()),
                    None,
                );
            }
        }
        for value in &new.enum_values {
            if !old.enum_values.contains(value) {
                ctx.push(
                    category,
                    Severity::Info,
                    ChangeKind::Added,
                    format!("{path}.enum"),
                    "enum value added",
                    None,
                    Some(value.clone()),
                );
            }
        }
    }

    for name in old.properties.keys() {
        if !new.properties.contains_key(name) {
            ctx.push(
                category,
                Severity::Warning,
                ChangeKind::Removed,
                format!("{path}.properties.{name}"),
                "property removed",
                None,
                None,
            );
        }
    }
    for name in new.properties.keys() {
        if !old.properties.contains_key(name) {
            ctx.push(
                category,
                Severity::Info,
                ChangeKind::Added,
                format!("{path}.properties.{name}"),
                "property added",
                None,
                None,
            );
        }
    }
    if recurse_properties {
        for (name, old_property) in &old.properties {
            if let Some(new_property) = new.properties.get(name) {
                compare_schema_nodes(
                    ctx,
                    category,
                    &format!("{path}.properties.{name}"),
                    old_property,
                    new_property,
                    true,
                );
            }
        }
    }

    if let (Some(old_items), Some(new_items)) = (&old.items, &new.items) {
        compare_schema_nodes(
            ctx,
            category,
            &format!("{path}.items"),
            old_items,
            new_items,
            recurse_properties,
        );
    }
}
