//! Structural equivalence and semantic deduplication of schemas.
//!
//! Equivalence is decided over a canonical form: map keys sorted, and the
//! order-insensitive `required` and `enum` arrays stabilized. `shallow`
//! compares the canonical forms with `$ref` strings taken literally; `deep`
//! resolves internal references first (cycle-guarded).

use crate::constants;
use crate::model::OASVersion;
use crate::refs::{self, ComponentBucket};
use crate::value;
use indexmap::IndexMap;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// How schema equivalence is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EquivalenceMode {
    /// Never equivalent; same-name collisions always conflict.
    None,
    /// Canonical-form comparison with `$ref` strings taken literally.
    #[default]
    Shallow,
    /// Canonical-form comparison after resolving internal references.
    Deep,
}

impl EquivalenceMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Shallow => "shallow",
            Self::Deep => "deep",
        }
    }
}

/// Hex digest of a schema's canonical form.
#[must_use]
pub fn schema_digest(schema: &Value) -> String {
    let canonical = value::normalize_for_equivalence(schema);
    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Hex digest with internal references resolved against `document`.
#[must_use]
pub fn deep_schema_digest(schema: &Value, document: &Value) -> String {
    let mut visiting = HashSet::new();
    let resolved = resolve_refs_deep(schema, document, &mut visiting);
    schema_digest(&resolved)
}

// Substitute resolved targets for internal refs. A reference currently
// being expanded is replaced by a cycle marker so recursion terminates.
fn resolve_refs_deep(schema: &Value, document: &Value, visiting: &mut HashSet<String>) -> Value {
    match schema {
        Value::Object(map) => {
            if let Some(Value::String(target)) = map.get(constants::FIELD_REF) {
                if target.starts_with("#/") {
                    if visiting.contains(target) {
                        return Value::String(format!("cycle:{target}"));
                    }
                    if let Some(resolved) = value::resolve_pointer(document, target) {
                        visiting.insert(target.clone());
                        let expanded = resolve_refs_deep(resolved, document, visiting);
                        visiting.remove(target);
                        return expanded;
                    }
                }
            }
            let mut out = serde_json::Map::new();
            for (key, entry) in map {
                out.insert(key.clone(), resolve_refs_deep(entry, document, visiting));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_refs_deep(item, document, visiting))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Decide whether two same-named schemas are structurally equivalent.
#[must_use]
pub fn equivalent(
    mode: EquivalenceMode,
    left: &Value,
    left_doc: &Value,
    right: &Value,
    right_doc: &Value,
) -> bool {
    match mode {
        EquivalenceMode::None => false,
        EquivalenceMode::Shallow => schema_digest(left) == schema_digest(right),
        EquivalenceMode::Deep => {
            deep_schema_digest(left, left_doc) == deep_schema_digest(right, right_doc)
        }
    }
}

/// One schema consolidated by semantic deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupMerge {
    /// The deleted name.
    pub removed: String,
    /// The alphabetically-first name the class collapsed onto.
    pub canonical: String,
}

/// Consolidate different-named but structurally equivalent schemas.
///
/// For each equivalence class of size > 1 the alphabetically-first name is
/// kept as canonical; the other schemas are deleted and every reference to
/// them rewritten. Returns the merges performed, in document order of the
/// removed names.
pub fn semantic_deduplicate(tree: &mut Value, version: OASVersion) -> Vec<DedupMerge> {
    let Some(schemas) = schemas_map(tree, version) else {
        return Vec::new();
    };

    // Group names by digest, preserving first-seen order of classes.
    let mut classes: IndexMap<String, Vec<String>> = IndexMap::new();
    for (name, schema) in schemas {
        classes
            .entry(schema_digest(schema))
            .or_default()
            .push(name.clone());
    }

    let mut merges = Vec::new();
    let mut renames: IndexMap<String, String> = IndexMap::new();
    for names in classes.values() {
        if names.len() < 2 {
            continue;
        }
        let canonical = names
            .iter()
            .min()
            .cloned()
            .unwrap_or_default();
        for name in names {
            if *name != canonical {
                renames.insert(name.clone(), canonical.clone());
                merges.push(DedupMerge {
                    removed: name.clone(),
                    canonical: canonical.clone(),
                });
            }
        }
    }

    if renames.is_empty() {
        return merges;
    }

    if let Some(schemas) = schemas_map_mut(tree, version) {
        for removed in renames.keys() {
            schemas.shift_remove(removed);
        }
    }
    refs::rewrite_refs(tree, ComponentBucket::Schemas, version, &renames);
    merges
}

fn schemas_map(tree: &Value, version: OASVersion) -> Option<&serde_json::Map<String, Value>> {
    if version.is_v2() {
        tree.get(constants::FIELD_DEFINITIONS)?.as_object()
    } else {
        tree.get(constants::FIELD_COMPONENTS)?
            .get(constants::BUCKET_SCHEMAS)?
            .as_object()
    }
}

fn schemas_map_mut(
    tree: &mut Value,
    version: OASVersion,
) -> Option<&mut serde_json::Map<String, Value>> {
    if version.is_v2() {
        tree.get_mut(constants::FIELD_DEFINITIONS)?.as_object_mut()
    } else {
        tree.get_mut(constants::FIELD_COMPONENTS)?
            .get_mut(constants::BUCKET_SCHEMAS)?
            .as_object_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_digest_ignores_key_and_required_order() {
        let a = json!({"type": "object", "required": ["b", "a"], "properties": {"a": {}, "b": {}}});
        let b = json!({"properties": {"b": {}, "a": {}}, "required": ["a", "b"], "type": "object"});
        assert_eq!(schema_digest(&a), schema_digest(&b));
    }

    #[test]
    fn test_digest_distinguishes_values() {
        let a = json!({"type": "string", "maxLength": 10});
        let b = json!({"type": "string", "maxLength": 20});
        assert_ne!(schema_digest(&a), schema_digest(&b));
    }

    #[test]
    fn test_deep_digest_resolves_refs() {
        let doc_a = json!({"components": {"schemas": {
            "Error": {"type": "object", "properties": {"code": {"type": "integer"}}},
            "Wrapper": {"properties": {"error": {"$ref": "#/components/schemas/Error"}}}
        }}});
        let doc_b = json!({"components": {"schemas": {
            "Problem": {"type": "object", "properties": {"code": {"type": "integer"}}},
            "Wrapper": {"properties": {"error": {"$ref": "#/components/schemas/Problem"}}}
        }}});
        let a = &doc_a["components"]["schemas"]["Wrapper"];
        let b = &doc_b["components"]["schemas"]["Wrapper"];
        assert_ne!(schema_digest(a), schema_digest(b));
        assert_eq!(deep_schema_digest(a, &doc_a), deep_schema_digest(b, &doc_b));
    }

    #[test]
    fn test_deep_digest_terminates_on_cycles() {
        let doc = json!({"components": {"schemas": {
            "Node": {"properties": {"next": {"$ref": "#/components/schemas/Node"}}}
        }}});
        let digest = deep_schema_digest(&doc["components"]["schemas"]["Node"], &doc);
        assert!(!digest.is_empty());
    }

    #[test]
    fn test_semantic_deduplicate_picks_alphabetical_canonical() {
        let mut tree = json!({
            "openapi": "3.0.3",
            "paths": {"/u": {"get": {"responses": {"400": {
                "description": "err",
                "content": {"application/json": {"schema": {"$ref": "#/components/schemas/UserError"}}}
            }}}}},
            "components": {"schemas": {
                "UserError": {"type": "object", "properties": {"message": {"type": "string"}}},
                "ProductError": {"type": "object", "properties": {"message": {"type": "string"}}}
            }}
        });
        let merges = semantic_deduplicate(&mut tree, OASVersion::V3_0_3);
        assert_eq!(
            merges,
            vec![DedupMerge {
                removed: "UserError".to_string(),
                canonical: "ProductError".to_string()
            }]
        );
        assert!(tree["components"]["schemas"].get("UserError").is_none());
        assert!(tree["components"]["schemas"].get("ProductError").is_some());
        assert_eq!(
            tree["paths"]["/u"]["get"]["responses"]["400"]["content"]["application/json"]["schema"]
                ["$ref"],
            "#/components/schemas/ProductError"
        );
    }
}
