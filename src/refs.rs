//! Reference rewriting.
//!
//! Three components rename or relocate named components: the joiner
//! (collision renames and semantic deduplication), the converter (bucket
//! relocation between `#/definitions/` and `#/components/`), and the fixer
//! (generic schema renames). This module is the shared primitive they all
//! use: given a mapping of `old_name -> new_name` and a component bucket,
//! rewrite every `$ref` that points into that bucket.

use crate::constants;
use crate::model::{OAS3Document, OASVersion, Operation, Parameter, PathItem, Response, Schema};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;

/// A named component submap that `$ref` strings can point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentBucket {
    Schemas,
    Parameters,
    Responses,
    RequestBodies,
    Headers,
    SecuritySchemes,
    Links,
    Callbacks,
    Examples,
}

impl ComponentBucket {
    pub const ALL: &'static [Self] = &[
        Self::Schemas,
        Self::Parameters,
        Self::Responses,
        Self::RequestBodies,
        Self::Headers,
        Self::SecuritySchemes,
        Self::Links,
        Self::Callbacks,
        Self::Examples,
    ];

    /// The key of this bucket under `components` (3.x).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Schemas => constants::BUCKET_SCHEMAS,
            Self::Parameters => constants::BUCKET_PARAMETERS,
            Self::Responses => constants::BUCKET_RESPONSES,
            Self::RequestBodies => constants::BUCKET_REQUEST_BODIES,
            Self::Headers => constants::BUCKET_HEADERS,
            Self::SecuritySchemes => constants::BUCKET_SECURITY_SCHEMES,
            Self::Links => constants::BUCKET_LINKS,
            Self::Callbacks => constants::BUCKET_CALLBACKS,
            Self::Examples => constants::BUCKET_EXAMPLES,
        }
    }

    /// The top-level 2.0 map corresponding to this bucket, if one exists.
    #[must_use]
    pub const fn v2_field(&self) -> Option<&'static str> {
        match self {
            Self::Schemas => Some(constants::FIELD_DEFINITIONS),
            Self::Parameters => Some(constants::FIELD_PARAMETERS),
            Self::Responses => Some(constants::FIELD_RESPONSES),
            Self::SecuritySchemes => Some(constants::FIELD_SECURITY_DEFINITIONS),
            _ => None,
        }
    }

    /// The `$ref` prefix for names in this bucket, per document version.
    #[must_use]
    pub fn ref_prefix(&self, version: OASVersion) -> String {
        if version.is_v2() {
            match self {
                Self::Schemas => constants::REF_PREFIX_DEFINITIONS.to_string(),
                Self::Parameters => constants::REF_PREFIX_V2_PARAMETERS.to_string(),
                Self::Responses => constants::REF_PREFIX_V2_RESPONSES.to_string(),
                // Security schemes are referenced by name, never by $ref, in 2.0.
                _ => format!("#/{}/", self.as_str()),
            }
        } else {
            format!("{}{}/", constants::REF_PREFIX_COMPONENTS, self.as_str())
        }
    }
}

/// Collect every `$ref` string in a tree, in document order.
#[must_use]
pub fn collect_refs(value: &Value) -> Vec<String> {
    let mut refs = Vec::new();
    collect_refs_into(value, &mut refs);
    refs
}

fn collect_refs_into(value: &Value, refs: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map {
                if key == constants::FIELD_REF {
                    if let Value::String(target) = entry {
                        refs.push(target.clone());
                    }
                }
                collect_refs_into(entry, refs);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_refs_into(item, refs);
            }
        }
        _ => {}
    }
}

/// Visit every `$ref` string in a tree mutably.
pub fn for_each_ref_mut(value: &mut Value, visit: &mut impl FnMut(&mut String)) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if key == constants::FIELD_REF {
                    if let Value::String(target) = entry {
                        visit(target);
                        continue;
                    }
                }
                for_each_ref_mut(entry, visit);
            }
        }
        Value::Array(items) => {
            for item in items {
                for_each_ref_mut(item, visit);
            }
        }
        _ => {}
    }
}

/// Rewrite every `$ref` into `bucket` whose name appears in `renames`.
///
/// Returns the number of references rewritten.
pub fn rewrite_refs(
    value: &mut Value,
    bucket: ComponentBucket,
    version: OASVersion,
    renames: &IndexMap<String, String>,
) -> usize {
    let prefix = bucket.ref_prefix(version);
    let table: HashMap<String, String> = renames
        .iter()
        .map(|(old, new)| (format!("{prefix}{old}"), format!("{prefix}{new}")))
        .collect();
    let mut rewritten = 0;
    for_each_ref_mut(value, &mut |target| {
        if let Some(new_target) = table.get(target.as_str()) {
            *target = new_target.clone();
            rewritten += 1;
        }
    });
    rewritten
}

/// Rewrite every `$ref` starting with `old_prefix` to start with
/// `new_prefix` instead. Used for bucket relocation during conversion.
pub fn rewrite_ref_prefix(value: &mut Value, old_prefix: &str, new_prefix: &str) -> usize {
    let mut rewritten = 0;
    for_each_ref_mut(value, &mut |target| {
        if let Some(rest) = target.strip_prefix(old_prefix) {
            *target = format!("{new_prefix}{rest}");
            rewritten += 1;
        }
    });
    rewritten
}

/// Rewrite every schema `$ref` in a typed 3.x document whose name appears
/// in `renames`. Returns the number of references rewritten.
pub fn rewrite_document_schema_refs(
    document: &mut OAS3Document,
    renames: &IndexMap<String, String>,
) -> usize {
    let prefix = ComponentBucket::Schemas.ref_prefix(OASVersion::V3_0_0);
    let table: HashMap<String, String> = renames
        .iter()
        .map(|(old, new)| (format!("{prefix}{old}"), format!("{prefix}{new}")))
        .collect();
    let mut rewritten = 0;
    let mut visit = |target: &mut Option<String>| {
        if let Some(current) = target {
            if let Some(new_target) = table.get(current.as_str()) {
                *current = new_target.clone();
                rewritten += 1;
            }
        }
    };

    for item in document.paths.values_mut() {
        visit_path_item_refs(item, &mut visit);
    }
    for item in document.webhooks.values_mut() {
        visit_path_item_refs(item, &mut visit);
    }
    if let Some(components) = &mut document.components {
        for schema in components.schemas.values_mut() {
            visit_schema_refs(schema, &mut visit);
        }
        for parameter in components.parameters.values_mut() {
            visit_parameter_refs(parameter, &mut visit);
        }
        for response in components.responses.values_mut() {
            visit_response_refs(response, &mut visit);
        }
        for body in components.request_bodies.values_mut() {
            visit(&mut body.ref_path);
            for media in body.content.values_mut() {
                if let Some(schema) = &mut media.schema {
                    visit_schema_refs(schema, &mut visit);
                }
            }
        }
        for header in components.headers.values_mut() {
            visit(&mut header.ref_path);
            if let Some(schema) = &mut header.schema {
                visit_schema_refs(schema, &mut visit);
            }
        }
    }
    rewritten
}

fn visit_schema_refs(schema: &mut Schema, visit: &mut impl FnMut(&mut Option<String>)) {
    schema.walk_mut(&mut |node| visit(&mut node.ref_path));
}

fn visit_parameter_refs(parameter: &mut Parameter, visit: &mut impl FnMut(&mut Option<String>)) {
    visit(&mut parameter.ref_path);
    if let Some(schema) = &mut parameter.schema {
        visit_schema_refs(schema, visit);
    }
    for media in parameter.content.values_mut() {
        if let Some(schema) = &mut media.schema {
            visit_schema_refs(schema, visit);
        }
    }
}

fn visit_response_refs(response: &mut Response, visit: &mut impl FnMut(&mut Option<String>)) {
    visit(&mut response.ref_path);
    if let Some(schema) = &mut response.schema {
        visit_schema_refs(schema, visit);
    }
    for media in response.content.values_mut() {
        if let Some(schema) = &mut media.schema {
            visit_schema_refs(schema, visit);
        }
    }
    for header in response.headers.values_mut() {
        visit(&mut header.ref_path);
        if let Some(schema) = &mut header.schema {
            visit_schema_refs(schema, visit);
        }
    }
}

fn visit_operation_refs(operation: &mut Operation, visit: &mut impl FnMut(&mut Option<String>)) {
    for parameter in &mut operation.parameters {
        visit_parameter_refs(parameter, visit);
    }
    if let Some(body) = &mut operation.request_body {
        visit(&mut body.ref_path);
        for media in body.content.values_mut() {
            if let Some(schema) = &mut media.schema {
                visit_schema_refs(schema, visit);
            }
        }
    }
    for response in operation.responses.values_mut() {
        visit_response_refs(response, visit);
    }
}

fn visit_path_item_refs(item: &mut PathItem, visit: &mut impl FnMut(&mut Option<String>)) {
    visit(&mut item.ref_path);
    for parameter in &mut item.parameters {
        visit_parameter_refs(parameter, visit);
    }
    for (_, operation) in item.operations_mut() {
        visit_operation_refs(operation, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collect_refs_in_order() {
        let tree = json!({
            "paths": {
                "/pets": {"get": {"responses": {"200": {
                    "schema": {"$ref": "#/definitions/Pet"}
                }}}}
            },
            "definitions": {
                "Pets": {"items": {"$ref": "#/definitions/Pet"}},
                "Pet": {"type": "object"}
            }
        });
        assert_eq!(
            collect_refs(&tree),
            vec!["#/definitions/Pet", "#/definitions/Pet"]
        );
    }

    #[test]
    fn test_rewrite_refs_by_name() {
        let mut tree = json!({
            "a": {"$ref": "#/components/schemas/Account"},
            "b": {"$ref": "#/components/schemas/Other"}
        });
        let mut renames = IndexMap::new();
        renames.insert("Account".to_string(), "Account_crm".to_string());
        let count = rewrite_refs(
            &mut tree,
            ComponentBucket::Schemas,
            OASVersion::V3_0_3,
            &renames,
        );
        assert_eq!(count, 1);
        assert_eq!(tree["a"]["$ref"], "#/components/schemas/Account_crm");
        assert_eq!(tree["b"]["$ref"], "#/components/schemas/Other");
    }

    #[test]
    fn test_rewrite_ref_prefix_relocates_bucket() {
        let mut tree = json!({
            "schema": {"$ref": "#/definitions/Pet"},
            "other": {"$ref": "#/parameters/limit"}
        });
        let count = rewrite_ref_prefix(&mut tree, "#/definitions/", "#/components/schemas/");
        assert_eq!(count, 1);
        assert_eq!(tree["schema"]["$ref"], "#/components/schemas/Pet");
        assert_eq!(tree["other"]["$ref"], "#/parameters/limit");
    }

    #[test]
    fn test_bucket_prefixes() {
        assert_eq!(
            ComponentBucket::Schemas.ref_prefix(OASVersion::V2_0),
            "#/definitions/"
        );
        assert_eq!(
            ComponentBucket::Schemas.ref_prefix(OASVersion::V3_1_0),
            "#/components/schemas/"
        );
        assert_eq!(
            ComponentBucket::RequestBodies.ref_prefix(OASVersion::V3_0_0),
            "#/components/requestBodies/"
        );
    }

    #[test]
    fn test_rewrite_document_schema_refs() {
        let source = json!({
            "openapi": "3.0.3",
            "info": {"title": "t", "version": "1"},
            "paths": {
                "/items": {"get": {"responses": {"200": {
                    "description": "ok",
                    "content": {"application/json": {
                        "schema": {"$ref": "#/components/schemas/Response[Item]"}
                    }}
                }}}}
            },
            "components": {"schemas": {
                "Response[Item]": {"type": "object"}
            }}
        });
        let mut doc: OAS3Document = serde_json::from_value(source).unwrap();
        let mut renames = IndexMap::new();
        renames.insert("Response[Item]".to_string(), "Response_Item_".to_string());
        let count = rewrite_document_schema_refs(&mut doc, &renames);
        assert_eq!(count, 1);
        let emitted = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            emitted["paths"]["/items"]["get"]["responses"]["200"]["content"]
                ["application/json"]["schema"]["$ref"],
            "#/components/schemas/Response_Item_"
        );
    }
}
