//! Conversions within the 3.x family: 3.0 to 3.1 and back, plus plain
//! version restamps.

use super::{for_each_schema_v3, Issues, JsonMap};
use crate::constants;
use crate::error::Error;
use crate::model::OASVersion;
use serde_json::Value;

pub(super) fn convert(
    tree: &Value,
    from: OASVersion,
    to: OASVersion,
    issues: &mut Issues,
) -> Result<Value, Error> {
    let mut out = tree.clone();
    let Some(root) = out.as_object_mut() else {
        return Err(Error::structural("document root is not a map"));
    };
    root.insert(
        constants::FIELD_OPENAPI.to_string(),
        Value::String(to.as_str().to_string()),
    );

    match (from.is_v3_1_plus(), to.is_v3_1_plus()) {
        // Same family; nothing but the version string changes.
        (true, true) | (false, false) => Ok(out),
        (false, true) => {
            for_each_schema_v3(&mut out, &mut |schema, location| {
                upgrade_schema_node(schema, location, issues);
            });
            Ok(out)
        }
        (true, false) => {
            let webhook_names: Vec<String> = out
                .get(constants::FIELD_WEBHOOKS)
                .and_then(Value::as_object)
                .map(|map| map.keys().cloned().collect())
                .unwrap_or_default();
            for name in &webhook_names {
                issues.critical(
                    format!("webhooks.{name}"),
                    "webhooks-dropped",
                    "webhooks are not representable in 3.0",
                );
            }
            if let Some(root) = out.as_object_mut() {
                root.remove(constants::FIELD_WEBHOOKS);
                root.remove("jsonSchemaDialect");
            }
            for_each_schema_v3(&mut out, &mut |schema, location| {
                downgrade_schema_node(schema, location, issues);
            });
            Ok(out)
        }
    }
}

// 3.0 -> 3.1: `nullable` becomes a type array, boolean exclusive bounds
// become numbers.
fn upgrade_schema_node(schema: &mut JsonMap, location: &str, issues: &mut Issues) {
    match schema.remove(constants::FIELD_NULLABLE) {
        Some(Value::Bool(true)) => {
            match schema.get(constants::FIELD_TYPE) {
                Some(Value::String(name)) => {
                    let name = name.clone();
                    schema.insert(
                        constants::FIELD_TYPE.to_string(),
                        Value::Array(vec![
                            Value::String(name),
                            Value::String("null".to_string()),
                        ]),
                    );
                    issues.info(
                        location,
                        "nullable-to-type-array",
                        "nullable converted to a type array",
                    );
                }
                _ => {
                    issues.warning(
                        location,
                        "nullable-without-type",
                        "nullable without a type keyword dropped",
                    );
                }
            }
        }
        Some(_) | None => {}
    }

    for (exclusive, bound) in [("exclusiveMinimum", "minimum"), ("exclusiveMaximum", "maximum")] {
        match schema.get(exclusive) {
            Some(Value::Bool(true)) => {
                if let Some(value) = schema.remove(bound) {
                    schema.insert(exclusive.to_string(), value);
                    issues.info(
                        location,
                        "exclusive-bound",
                        format!("boolean {exclusive} converted to numeric form"),
                    );
                } else {
                    schema.remove(exclusive);
                }
            }
            Some(Value::Bool(false)) => {
                schema.remove(exclusive);
            }
            _ => {}
        }
    }
}

// 3.1 -> 3.0: type arrays become `nullable`, 3.1-only keywords drop.
fn downgrade_schema_node(schema: &mut JsonMap, location: &str, issues: &mut Issues) {
    if let Some(Value::Array(types)) = schema.get(constants::FIELD_TYPE) {
        let has_null = types.iter().any(|name| name.as_str() == Some("null"));
        let non_null: Vec<String> = types
            .iter()
            .filter_map(Value::as_str)
            .filter(|name| *name != "null")
            .map(ToString::to_string)
            .collect();
        if non_null.len() > 1 {
            issues.critical(
                location,
                "type-array",
                format!(
                    "type array [{}] is not representable in 3.0; keeping '{}'",
                    non_null.join(", "),
                    non_null[0]
                ),
            );
        }
        match non_null.first() {
            Some(first) => {
                schema.insert(
                    constants::FIELD_TYPE.to_string(),
                    Value::String(first.clone()),
                );
            }
            None => {
                schema.remove(constants::FIELD_TYPE);
            }
        }
        if has_null {
            schema.insert(constants::FIELD_NULLABLE.to_string(), Value::Bool(true));
            issues.info(
                location,
                "type-array-to-nullable",
                "null type converted to nullable",
            );
        }
    }

    if let Some(constant) = schema.remove("const") {
        issues.info(
            location,
            "const-to-enum",
            "const converted to a single-value enum",
        );
        schema.insert("enum".to_string(), Value::Array(vec![constant]));
    }

    for keyword in ["prefixItems", "unevaluatedProperties", "$comment"] {
        if schema.remove(keyword).is_some() {
            issues.warning(
                location,
                "keyword-dropped",
                format!("schema keyword '{keyword}' is not representable in 3.0"),
            );
        }
    }

    for (exclusive, bound) in [("exclusiveMinimum", "minimum"), ("exclusiveMaximum", "maximum")] {
        if let Some(Value::Number(number)) = schema.get(exclusive) {
            let number = number.clone();
            schema.insert(bound.to_string(), Value::Number(number));
            schema.insert(exclusive.to_string(), Value::Bool(true));
            issues.info(
                location,
                "exclusive-bound",
                format!("numeric {exclusive} converted to boolean form"),
            );
        }
    }
}
