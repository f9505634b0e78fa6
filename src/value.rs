//! Helpers over the generic document tree.
//!
//! The universal interchange type of this crate is `serde_json::Value`
//! compiled with `preserve_order`: object keys keep insertion order, and
//! numbers keep their integer/float identity. Deep copy is `Clone`, which is
//! value-preserving — integers never silently degrade to floats.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Recursively merge `src` into `dest`.
///
/// Same-name keys are overwritten, new keys are added, and nested maps are
/// merged. Non-map values (including sequences) replace wholesale.
pub fn deep_merge(dest: &mut Value, src: &Value) {
    if let (Value::Object(dest_map), Value::Object(src_map)) = (&mut *dest, src) {
        for (key, src_val) in src_map {
            match dest_map.get_mut(key) {
                Some(dest_val) if dest_val.is_object() && src_val.is_object() => {
                    deep_merge(dest_val, src_val);
                }
                _ => {
                    dest_map.insert(key.clone(), src_val.clone());
                }
            }
        }
    } else {
        *dest = src.clone();
    }
}

/// Short type name of a value, for diagnostics.
#[must_use]
pub const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}

fn template_var_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}/]+)\}").expect("pattern is valid"))
}

/// Extract the template variable names from a path template.
///
/// `/users/{userId}/pets/{petId}` yields `["userId", "petId"]`.
#[must_use]
pub fn path_template_variables(path: &str) -> Vec<String> {
    template_var_regex()
        .captures_iter(path)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Resolve an internal reference (`#/a/b` or a bare JSON pointer `/a/b`)
/// against a tree.
#[must_use]
pub fn resolve_pointer<'a>(tree: &'a Value, pointer: &str) -> Option<&'a Value> {
    let pointer = pointer.strip_prefix('#').unwrap_or(pointer);
    if pointer.is_empty() {
        return Some(tree);
    }
    let mut current = tree;
    for segment in pointer.strip_prefix('/')?.split('/') {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Parse a trimmed string piece as the narrowest JSON scalar it represents.
///
/// Integers, floats, booleans, and `null` are re-typed; everything else
/// stays a string.
#[must_use]
pub fn scalar_from_str(piece: &str) -> Value {
    if piece == "null" {
        return Value::Null;
    }
    if piece == "true" {
        return Value::Bool(true);
    }
    if piece == "false" {
        return Value::Bool(false);
    }
    if let Ok(int) = piece.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = piece.parse::<f64>() {
        if float.is_finite() {
            return Value::from(float);
        }
    }
    Value::String(piece.to_string())
}

/// Canonicalize a value for structural comparison.
///
/// Map keys are sorted, and the `required` and `enum` arrays (ordering is
/// not meaningful there) are sorted by serialized form. Everything else is
/// preserved as-is.
#[must_use]
pub fn normalize_for_equivalence(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = serde_json::Map::new();
            for key in keys {
                let normalized = normalize_for_equivalence(&map[key]);
                let normalized = if key == "required" || key == "enum" {
                    sort_array_stable(normalized)
                } else {
                    normalized
                };
                out.insert(key.clone(), normalized);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(normalize_for_equivalence).collect()),
        other => other.clone(),
    }
}

fn sort_array_stable(value: Value) -> Value {
    if let Value::Array(mut items) = value {
        items.sort_by_key(ToString::to_string);
        Value::Array(items)
    } else {
        value
    }
}
