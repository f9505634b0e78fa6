//! JSONPath evaluation over the generic tree.
//!
//! Matches are resolved to concrete step locations first; mutation then
//! navigates by location, so `modify` and `remove` never hold overlapping
//! mutable borrows. Removals run in reverse match order, which keeps
//! sequence indices valid while splicing.

use super::parse::{CmpOp, Comparison, FilterExpr, Segment};
use serde_json::Value;
use std::fmt;

/// One concrete step from a node to a child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{}", crate::loader::escape_pointer(key)),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A matched node: its value and the concrete location it was found at.
#[derive(Debug, Clone)]
pub struct Match<'a> {
    pub value: &'a Value,
    pub location: Vec<PathStep>,
}

impl Match<'_> {
    /// The map key this match sits under, if its parent is a map.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self.location.last() {
            Some(PathStep::Key(key)) => Some(key),
            _ => None,
        }
    }

    /// The sequence index this match sits at, if its parent is a sequence.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self.location.last() {
            Some(PathStep::Index(index)) => Some(*index),
            _ => None,
        }
    }

    /// JSON-pointer rendering of the location (`/paths/~1pets/get`).
    #[must_use]
    pub fn pointer(&self) -> String {
        self.location
            .iter()
            .map(|step| format!("/{step}"))
            .collect()
    }
}

pub(super) fn evaluate<'a>(segments: &[Segment], tree: &'a Value) -> Vec<Match<'a>> {
    let mut current: Vec<Match<'a>> = vec![Match {
        value: tree,
        location: Vec::new(),
    }];
    for segment in segments {
        let mut next = Vec::new();
        for matched in &current {
            expand(segment, matched, &mut next);
        }
        current = next;
    }
    current
}

fn expand<'a>(segment: &Segment, matched: &Match<'a>, out: &mut Vec<Match<'a>>) {
    match segment {
        Segment::Child(name) => {
            if let Some(child) = matched.value.as_object().and_then(|map| map.get(name)) {
                out.push(child_match(matched, PathStep::Key(name.clone()), child));
            }
        }
        Segment::Wildcard => match matched.value {
            Value::Object(map) => {
                for (key, child) in map {
                    out.push(child_match(matched, PathStep::Key(key.clone()), child));
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    out.push(child_match(matched, PathStep::Index(index), child));
                }
            }
            _ => {}
        },
        Segment::Index(raw) => {
            if let Value::Array(items) = matched.value {
                let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
                let resolved = if *raw < 0 { len + raw } else { *raw };
                if let Ok(index) = usize::try_from(resolved) {
                    if let Some(child) = items.get(index) {
                        out.push(child_match(matched, PathStep::Index(index), child));
                    }
                }
            }
        }
        Segment::RecursiveChild(name) => {
            descend(matched.value, &matched.location, name, out);
        }
        Segment::Filter(filter) => match matched.value {
            Value::Object(map) => {
                for (key, child) in map {
                    if filter_matches(filter, child) {
                        out.push(child_match(matched, PathStep::Key(key.clone()), child));
                    }
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    if filter_matches(filter, child) {
                        out.push(child_match(matched, PathStep::Index(index), child));
                    }
                }
            }
            _ => {}
        },
    }
}

fn child_match<'a>(parent: &Match<'a>, step: PathStep, value: &'a Value) -> Match<'a> {
    let mut location = parent.location.clone();
    location.push(step);
    Match { value, location }
}

// Pre-order: a map's own matching entry is emitted before descending into
// any of its children, children in insertion/index order.
fn descend<'a>(node: &'a Value, location: &[PathStep], name: &str, out: &mut Vec<Match<'a>>) {
    match node {
        Value::Object(map) => {
            if let Some(child) = map.get(name) {
                let mut loc = location.to_vec();
                loc.push(PathStep::Key(name.to_string()));
                out.push(Match {
                    value: child,
                    location: loc,
                });
            }
            for (key, child) in map {
                let mut loc = location.to_vec();
                loc.push(PathStep::Key(key.clone()));
                descend(child, &loc, name, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let mut loc = location.to_vec();
                loc.push(PathStep::Index(index));
                descend(child, &loc, name, out);
            }
        }
        _ => {}
    }
}

fn filter_matches(filter: &FilterExpr, candidate: &Value) -> bool {
    filter
        .any_of
        .iter()
        .any(|all_of| all_of.iter().all(|cmp| comparison_matches(cmp, candidate)))
}

// A missing field never matches, under either operator.
fn comparison_matches(comparison: &Comparison, candidate: &Value) -> bool {
    let mut current = candidate;
    for segment in &comparison.field {
        match current.as_object().and_then(|map| map.get(segment)) {
            Some(next) => current = next,
            None => return false,
        }
    }
    let equal = values_equal(current, &comparison.literal);
    match comparison.op {
        CmpOp::Eq => equal,
        CmpOp::Ne => !equal,
    }
}

// Numbers compare numerically so `1` equals `1.0`.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

pub(super) fn node_at_mut<'a>(tree: &'a mut Value, location: &[PathStep]) -> Option<&'a mut Value> {
    let mut current = tree;
    for step in location {
        current = match step {
            PathStep::Key(key) => current.as_object_mut()?.get_mut(key)?,
            PathStep::Index(index) => current.as_array_mut()?.get_mut(*index)?,
        };
    }
    Some(current)
}

pub(super) fn remove_at(tree: &mut Value, location: &[PathStep]) -> bool {
    let Some((last, parent_loc)) = location.split_last() else {
        return false;
    };
    let Some(parent) = node_at_mut(tree, parent_loc) else {
        return false;
    };
    match (parent, last) {
        (Value::Object(map), PathStep::Key(key)) => map.shift_remove(key).is_some(),
        (Value::Array(items), PathStep::Index(index)) => {
            if *index < items.len() {
                items.remove(*index);
                true
            } else {
                false
            }
        }
        _ => false,
    }
}
