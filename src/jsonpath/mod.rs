//! JSONPath engine over the generic document tree.
//!
//! Supported grammar (a superset of child access, a subset of full
//! JSONPath):
//!
//! - Root: `$`
//! - Child access: `.name`, or `['name']` when the name contains `/`, `-`,
//!   or other non-identifier characters
//! - Wildcard: `.*` over map values, `[*]` over sequence elements
//! - Index: `[n]` (0-based), `[-n]` counts from the end
//! - Recursive descent: `..name` matches every occurrence of `name` at any
//!   depth, pre-order
//! - Filter: `[?expr]` over sequence elements or map values, where `expr`
//!   is one or more `@.field OP literal` comparisons (`OP` is `==` or `!=`;
//!   literals are strings, numbers, booleans, or `null`) joined by `&&` and
//!   `||`. `&&` binds tighter than `||` — the expression is a disjunction
//!   of conjunctions. Parenthesized groups are not supported.
//!
//! Evaluation is deterministic: map values in insertion order, sequence
//! elements in index order, recursive descent pre-order. Zero matches is
//! not an error.

mod eval;
mod parse;

pub use eval::{Match, PathStep};
pub use parse::{CmpOp, Comparison, FilterExpr, Segment};

use crate::error::Error;
use serde_json::Value;

/// A parsed JSONPath expression.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    raw: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parse an expression.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::ErrorKind::JsonPath`] error on invalid
    /// syntax.
    pub fn parse(expression: &str) -> Result<Self, Error> {
        let segments = parse::parse_expression(expression.trim())?;
        Ok(Self {
            raw: expression.trim().to_string(),
            segments,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Evaluate against a tree, returning matches in deterministic
    /// traversal order.
    #[must_use]
    pub fn get<'a>(&self, tree: &'a Value) -> Vec<Match<'a>> {
        eval::evaluate(&self.segments, tree)
    }

    /// Replace each matched node with `f(old)` in place. The replacement
    /// may have a different shape than the original.
    ///
    /// Returns the number of nodes replaced.
    pub fn modify(&self, tree: &mut Value, mut f: impl FnMut(&Value) -> Value) -> usize {
        let locations: Vec<Vec<PathStep>> = self
            .get(tree)
            .into_iter()
            .map(|matched| matched.location)
            .collect();
        let mut modified = 0;
        for location in locations {
            if let Some(node) = eval::node_at_mut(tree, &location) {
                *node = f(node);
                modified += 1;
            }
        }
        modified
    }

    /// Delete each matched node from its parent (map key removal or
    /// sequence splice).
    ///
    /// Returns the number of nodes removed.
    pub fn remove(&self, tree: &mut Value) -> usize {
        let locations: Vec<Vec<PathStep>> = self
            .get(tree)
            .into_iter()
            .map(|matched| matched.location)
            .collect();
        // Reverse match order: later siblings first, children before
        // ancestors, so locations stay valid while splicing.
        let mut removed = 0;
        for location in locations.iter().rev() {
            if eval::remove_at(tree, location) {
                removed += 1;
            }
        }
        removed
    }
}

impl std::fmt::Display for JsonPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> Value {
        json!({
            "openapi": "3.0.3",
            "info": {"title": "Test", "version": "1.0.0"},
            "servers": [
                {"url": "https://a.example"},
                {"url": "https://b.example"}
            ],
            "paths": {
                "/pets": {
                    "get": {"operationId": "listPets", "deprecated": false},
                    "x-internal": false
                },
                "/admin": {
                    "get": {"operationId": "adminOnly"},
                    "x-internal": true
                }
            }
        })
    }

    #[test]
    fn test_get_child_chain() {
        let tree = spec();
        let path = JsonPath::parse("$.info.title").unwrap();
        let matches = path.get(&tree);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].value, &json!("Test"));
        assert_eq!(matches[0].pointer(), "/info/title");
    }

    #[test]
    fn test_get_bracket_path_key() {
        let tree = spec();
        let path = JsonPath::parse("$.paths['/pets'].get.operationId").unwrap();
        let matches = path.get(&tree);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].value, &json!("listPets"));
    }

    #[test]
    fn test_wildcard_preserves_order() {
        let tree = spec();
        let path = JsonPath::parse("$.paths.*").unwrap();
        let matches = path.get(&tree);
        let keys: Vec<Option<&str>> = matches.iter().map(Match::key).collect();
        assert_eq!(keys, vec![Some("/pets"), Some("/admin")]);
    }

    #[test]
    fn test_negative_index() {
        let tree = spec();
        let path = JsonPath::parse("$.servers[-1].url").unwrap();
        let matches = path.get(&tree);
        assert_eq!(matches[0].value, &json!("https://b.example"));
    }

    #[test]
    fn test_recursive_descent_pre_order() {
        let tree = json!({
            "a": {"name": "outer", "b": {"name": "inner"}},
            "list": [{"name": "first"}]
        });
        let path = JsonPath::parse("$..name").unwrap();
        let found: Vec<&Value> = path.get(&tree).iter().map(|m| m.value).collect();
        assert_eq!(found, vec![&json!("outer"), &json!("inner"), &json!("first")]);
    }

    #[test]
    fn test_filter_on_map_values() {
        let tree = spec();
        let path = JsonPath::parse("$.paths[?@.x-internal==true]").unwrap();
        let matches = path.get(&tree);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].key(), Some("/admin"));
    }

    #[test]
    fn test_filter_missing_field_never_matches() {
        let tree = json!({"items": [{"a": 1}, {"b": 2}]});
        let path = JsonPath::parse("$.items[?@.a!=3]").unwrap();
        // Only the element that has `a` can satisfy `a != 3`.
        assert_eq!(path.get(&tree).len(), 1);
    }

    #[test]
    fn test_filter_numeric_equality_across_int_float() {
        let tree = json!({"items": [{"n": 1}, {"n": 1.0}, {"n": 2}]});
        let path = JsonPath::parse("$.items[?@.n==1]").unwrap();
        assert_eq!(path.get(&tree).len(), 2);
    }

    #[test]
    fn test_zero_matches_is_not_an_error() {
        let tree = spec();
        let path = JsonPath::parse("$.nonexistent.child").unwrap();
        assert!(path.get(&tree).is_empty());
    }

    #[test]
    fn test_modify_replaces_in_place() {
        let mut tree = spec();
        let path = JsonPath::parse("$.info.title").unwrap();
        let count = path.modify(&mut tree, |_| json!("Renamed"));
        assert_eq!(count, 1);
        assert_eq!(tree["info"]["title"], "Renamed");
    }

    #[test]
    fn test_modify_can_change_shape() {
        let mut tree = spec();
        let path = JsonPath::parse("$.info").unwrap();
        path.modify(&mut tree, |_| json!("collapsed"));
        assert_eq!(tree["info"], "collapsed");
    }

    #[test]
    fn test_remove_map_entries() {
        let mut tree = spec();
        let path = JsonPath::parse("$.paths[?@.x-internal==true]").unwrap();
        let removed = path.remove(&mut tree);
        assert_eq!(removed, 1);
        assert!(tree["paths"].get("/admin").is_none());
        assert!(tree["paths"].get("/pets").is_some());
    }

    #[test]
    fn test_remove_multiple_sequence_elements() {
        let mut tree = json!({"list": [1, 2, 3, 4]});
        let path = JsonPath::parse("$.list[*]").unwrap();
        let removed = path.remove(&mut tree);
        assert_eq!(removed, 4);
        assert_eq!(tree["list"], json!([]));
    }

    #[test]
    fn test_remove_negative_index() {
        let mut tree = json!({"servers": ["a", "b", "c"]});
        let path = JsonPath::parse("$.servers[-1]").unwrap();
        assert_eq!(path.remove(&mut tree), 1);
        assert_eq!(tree["servers"], json!(["a", "b"]));
    }
}
