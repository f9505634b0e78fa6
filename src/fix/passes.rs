//! The repair passes.

use super::{FixKind, FixRecord};
use crate::model::{
    OAS3Document, Operation, Parameter, ParameterLocation, PathItem, Schema, SchemaType,
};
use crate::refs;
use crate::value::{path_template_variables, scalar_from_str};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;

// ---- pass 1: enum-csv-expanded ----

pub(super) fn expand_csv_enums(document: &mut OAS3Document, fixes: &mut Vec<FixRecord>) {
    for_each_document_schema(document, &mut |schema, location| {
        if schema.enum_values.len() != 1 {
            return;
        }
        let Some(joined) = schema.enum_values[0].as_str() else {
            return;
        };
        if !joined.contains(',') {
            return;
        }
        let pieces: Vec<Value> = joined
            .split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(scalar_from_str)
            .collect();
        if pieces.len() < 2 {
            return;
        }
        fixes.push(FixRecord {
            kind: FixKind::EnumCsvExpanded,
            description: format!(
                "expanded comma-joined enum value '{joined}' into {} values",
                pieces.len()
            ),
            location: location.to_string(),
        });
        schema.enum_values = pieces;
    });
}

// ---- pass 2: duplicate-operation-id ----

pub(super) fn dedupe_operation_ids(document: &mut OAS3Document, fixes: &mut Vec<FixRecord>) {
    let mut seen: HashSet<String> = HashSet::new();
    for (template, item) in &mut document.paths {
        for (method, operation) in item.operations_mut() {
            let Some(id) = operation.operation_id.clone() else {
                continue;
            };
            if seen.insert(id.clone()) {
                continue;
            }
            // Later duplicates get a numeric suffix, starting at 2.
            let mut counter = 2usize;
            let renamed = loop {
                let candidate = format!("{id}{counter}");
                if seen.insert(candidate.clone()) {
                    break candidate;
                }
                counter += 1;
            };
            fixes.push(FixRecord {
                kind: FixKind::DuplicateOperationId,
                description: format!("renamed duplicate operationId '{id}' to '{renamed}'"),
                location: format!("paths.{template}.{method}"),
            });
            operation.operation_id = Some(renamed);
        }
    }
}

// ---- pass 3: pruned-empty-path ----

pub(super) fn prune_empty_paths(document: &mut OAS3Document, fixes: &mut Vec<FixRecord>) {
    let empty: Vec<String> = document
        .paths
        .iter()
        .filter(|(_, item)| {
            !item.has_operations() && item.parameters.is_empty() && item.ref_path.is_none()
        })
        .map(|(template, _)| template.clone())
        .collect();
    for template in empty {
        document.paths.shift_remove(&template);
        fixes.push(FixRecord {
            kind: FixKind::PrunedEmptyPath,
            description: format!("removed path '{template}' with no operations and no parameters"),
            location: format!("paths.{template}"),
        });
    }
}

// ---- pass 4: renamed-generic-schema ----

const INVALID_NAME_CHARS: &[char] = &['[', ']', '<', '>', ',', ' '];

fn sanitize_schema_name(name: &str) -> String {
    name.chars()
        .filter_map(|ch| match ch {
            '[' | ']' | '<' | '>' | ',' => Some('_'),
            ' ' => None,
            other => Some(other),
        })
        .collect()
}

pub(super) fn rename_generic_schemas(document: &mut OAS3Document, fixes: &mut Vec<FixRecord>) {
    let Some(components) = &mut document.components else {
        return;
    };
    let mut taken: HashSet<String> = components
        .schemas
        .keys()
        .filter(|name| !name.contains(INVALID_NAME_CHARS))
        .cloned()
        .collect();
    let mut renames: IndexMap<String, String> = IndexMap::new();
    for name in components.schemas.keys() {
        if !name.contains(INVALID_NAME_CHARS) {
            continue;
        }
        let base = sanitize_schema_name(name);
        let mut candidate = base.clone();
        let mut counter = 2usize;
        while !taken.insert(candidate.clone()) {
            candidate = format!("{base}_{counter}");
            counter += 1;
        }
        renames.insert(name.clone(), candidate);
    }
    if renames.is_empty() {
        return;
    }

    let entries = std::mem::take(&mut components.schemas);
    for (name, schema) in entries {
        let new_name = renames.get(&name).cloned().unwrap_or(name);
        components.schemas.insert(new_name, schema);
    }

    for (old, new) in &renames {
        fixes.push(FixRecord {
            kind: FixKind::RenamedGenericSchema,
            description: format!("renamed schema '{old}' to '{new}'"),
            location: format!("components.schemas.{old}"),
        });
    }
    refs::rewrite_document_schema_refs(document, &renames);
}

// ---- pass 5: missing-path-parameter ----

fn infer_parameter_schema(name: &str) -> Schema {
    if name.ends_with("Id") {
        Schema::of_type("integer")
    } else if name.ends_with("Uuid") {
        Schema {
            schema_type: Some(SchemaType::Single("string".to_string())),
            format: Some("uuid".to_string()),
            ..Schema::default()
        }
    } else {
        Schema::of_type("string")
    }
}

pub(super) fn declare_missing_path_parameters(
    document: &mut OAS3Document,
    fixes: &mut Vec<FixRecord>,
) {
    for (template, item) in &mut document.paths {
        let mut declared: HashSet<String> = HashSet::new();
        collect_path_params(&item.parameters, &mut declared);
        for (_, operation) in item.operations() {
            collect_path_params(&operation.parameters, &mut declared);
        }

        for variable in path_template_variables(template) {
            if declared.contains(&variable) {
                continue;
            }
            let schema = infer_parameter_schema(&variable);
            let inferred = match (&schema.schema_type, &schema.format) {
                (_, Some(format)) => format!("string/{format}"),
                (Some(SchemaType::Single(name)), None) => name.clone(),
                _ => "string".to_string(),
            };
            fixes.push(FixRecord {
                kind: FixKind::MissingPathParameter,
                description: format!(
                    "declared missing path parameter '{variable}' with inferred type {inferred}"
                ),
                location: format!("paths.{template}"),
            });
            item.parameters.push(Parameter {
                name: Some(variable.clone()),
                location: Some(ParameterLocation::Path),
                required: Some(true),
                schema: Some(schema),
                ..Parameter::default()
            });
        }
    }
}

fn collect_path_params(parameters: &[Parameter], declared: &mut HashSet<String>) {
    for parameter in parameters {
        if parameter.location == Some(ParameterLocation::Path) {
            if let Some(name) = &parameter.name {
                declared.insert(name.clone());
            }
        }
    }
}

// ---- pass 6: pruned-unused-schema ----

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

pub(super) fn prune_unused_schemas(document: &mut OAS3Document, fixes: &mut Vec<FixRecord>) {
    let Some(components) = &document.components else {
        return;
    };
    if components.schemas.is_empty() {
        return;
    }

    // Roots: everything that can reference a schema except the schema
    // bucket itself.
    let mut referenced: HashSet<String> = HashSet::new();
    let mut pending: Vec<String> = Vec::new();
    let mut seed = |value: &Value| {
        for target in refs::collect_refs(value) {
            if let Some(name) = target.strip_prefix(SCHEMA_REF_PREFIX) {
                if referenced.insert(name.to_string()) {
                    pending.push(name.to_string());
                }
            }
        }
    };
    if let Ok(paths) = serde_json::to_value(&document.paths) {
        seed(&paths);
    }
    if let Ok(webhooks) = serde_json::to_value(&document.webhooks) {
        seed(&webhooks);
    }
    let mut other_components = components.clone();
    other_components.schemas = IndexMap::new();
    if let Ok(rest) = serde_json::to_value(&other_components) {
        seed(&rest);
    }

    // Closure over schema-to-schema references.
    while let Some(name) = pending.pop() {
        let Some(schema) = components.schemas.get(&name) else {
            continue;
        };
        let Ok(value) = serde_json::to_value(schema) else {
            continue;
        };
        for target in refs::collect_refs(&value) {
            if let Some(referenced_name) = target.strip_prefix(SCHEMA_REF_PREFIX) {
                if referenced.insert(referenced_name.to_string()) {
                    pending.push(referenced_name.to_string());
                }
            }
        }
    }

    let unused: Vec<String> = components
        .schemas
        .keys()
        .filter(|name| !referenced.contains(*name))
        .cloned()
        .collect();
    if unused.is_empty() {
        return;
    }
    let Some(components) = &mut document.components else {
        return;
    };
    for name in unused {
        components.schemas.shift_remove(&name);
        fixes.push(FixRecord {
            kind: FixKind::PrunedUnusedSchema,
            description: format!("removed schema '{name}' referenced nowhere"),
            location: format!("components.schemas.{name}"),
        });
    }
}

// ---- shared typed schema walk with locations ----

fn walk_schema(schema: &mut Schema, location: &str, f: &mut impl FnMut(&mut Schema, &str)) {
    f(schema, location);
    if let Some(items) = &mut schema.items {
        walk_schema(items, &format!("{location}.items"), f);
    }
    let property_names: Vec<String> = schema.properties.keys().cloned().collect();
    for name in property_names {
        if let Some(property) = schema.properties.get_mut(&name) {
            walk_schema(property, &format!("{location}.properties.{name}"), f);
        }
    }
    if let Some(crate::model::AdditionalProperties::Schema(inner)) =
        &mut schema.additional_properties
    {
        walk_schema(inner, &format!("{location}.additionalProperties"), f);
    }
    for (keyword, group) in [
        ("allOf", &mut schema.all_of),
        ("oneOf", &mut schema.one_of),
        ("anyOf", &mut schema.any_of),
    ] {
        for (index, member) in group.iter_mut().enumerate() {
            walk_schema(member, &format!("{location}.{keyword}[{index}]"), f);
        }
    }
    if let Some(not) = &mut schema.not {
        walk_schema(not, &format!("{location}.not"), f);
    }
    for (index, member) in schema.prefix_items.iter_mut().enumerate() {
        walk_schema(member, &format!("{location}.prefixItems[{index}]"), f);
    }
}

fn walk_operation_schemas(
    operation: &mut Operation,
    location: &str,
    f: &mut impl FnMut(&mut Schema, &str),
) {
    for (index, parameter) in operation.parameters.iter_mut().enumerate() {
        if let Some(schema) = &mut parameter.schema {
            walk_schema(schema, &format!("{location}.parameters[{index}].schema"), f);
        }
    }
    if let Some(body) = &mut operation.request_body {
        for (media, media_type) in &mut body.content {
            if let Some(schema) = &mut media_type.schema {
                walk_schema(
                    schema,
                    &format!("{location}.requestBody.content.{media}.schema"),
                    f,
                );
            }
        }
    }
    for (status, response) in &mut operation.responses {
        for (media, media_type) in &mut response.content {
            if let Some(schema) = &mut media_type.schema {
                walk_schema(
                    schema,
                    &format!("{location}.responses.{status}.content.{media}.schema"),
                    f,
                );
            }
        }
        for (name, header) in &mut response.headers {
            if let Some(schema) = &mut header.schema {
                walk_schema(
                    schema,
                    &format!("{location}.responses.{status}.headers.{name}.schema"),
                    f,
                );
            }
        }
    }
}

fn walk_path_item_schemas(
    item: &mut PathItem,
    location: &str,
    f: &mut impl FnMut(&mut Schema, &str),
) {
    for (index, parameter) in item.parameters.iter_mut().enumerate() {
        if let Some(schema) = &mut parameter.schema {
            walk_schema(schema, &format!("{location}.parameters[{index}].schema"), f);
        }
    }
    for (method, operation) in item.operations_mut() {
        walk_operation_schemas(operation, &format!("{location}.{method}"), f);
    }
}

fn for_each_document_schema(
    document: &mut OAS3Document,
    f: &mut impl FnMut(&mut Schema, &str),
) {
    if let Some(components) = &mut document.components {
        let names: Vec<String> = components.schemas.keys().cloned().collect();
        for name in names {
            if let Some(schema) = components.schemas.get_mut(&name) {
                walk_schema(schema, &format!("components.schemas.{name}"), f);
            }
        }
        for (name, parameter) in &mut components.parameters {
            if let Some(schema) = &mut parameter.schema {
                walk_schema(schema, &format!("components.parameters.{name}.schema"), f);
            }
        }
        for (name, body) in &mut components.request_bodies {
            for (media, media_type) in &mut body.content {
                if let Some(schema) = &mut media_type.schema {
                    walk_schema(
                        schema,
                        &format!("components.requestBodies.{name}.content.{media}.schema"),
                        f,
                    );
                }
            }
        }
        for (name, response) in &mut components.responses {
            for (media, media_type) in &mut response.content {
                if let Some(schema) = &mut media_type.schema {
                    walk_schema(
                        schema,
                        &format!("components.responses.{name}.content.{media}.schema"),
                        f,
                    );
                }
            }
        }
        for (name, header) in &mut components.headers {
            if let Some(schema) = &mut header.schema {
                walk_schema(schema, &format!("components.headers.{name}.schema"), f);
            }
        }
    }
    for (template, item) in &mut document.paths {
        walk_path_item_schemas(item, &format!("paths.{template}"), f);
    }
    for (name, item) in &mut document.webhooks {
        walk_path_item_schemas(item, &format!("webhooks.{name}"), f);
    }
}
