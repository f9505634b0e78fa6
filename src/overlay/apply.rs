//! Overlay application.
//!
//! Actions run in declaration order against a deep copy of the target tree;
//! each action sees the state produced by previous actions. The input tree
//! is never modified.

use super::{Action, Overlay};
use crate::error::Error;
use crate::jsonpath::JsonPath;
use crate::loader::SourceFormat;
use crate::parser::{ParseResult, Parser};
use crate::value;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How an action landed on a target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOp {
    /// Map target deep-merged with a map update.
    Update,
    /// Target replaced wholesale.
    Replace,
    /// Update appended to a sequence target.
    Append,
    /// Target removed from its parent.
    Remove,
}

impl ActionOp {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Append => "append",
            Self::Remove => "remove",
        }
    }
}

impl std::fmt::Display for ActionOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category of a structured apply warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCategory {
    NoMatch,
    ActionError,
}

impl WarningCategory {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoMatch => "no_match",
            Self::ActionError => "action_error",
        }
    }
}

/// A structured warning emitted during application.
#[derive(Debug, Clone)]
pub struct ApplyWarning {
    pub category: WarningCategory,
    pub action_index: usize,
    pub target: String,
    pub message: String,
    pub cause: Option<String>,
}

impl ApplyWarning {
    /// The legacy pre-formatted rendering.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "action {} ({}): {}",
            self.action_index, self.target, self.message
        )
    }
}

/// A change applied by one action.
#[derive(Debug, Clone)]
pub struct AppliedChange {
    pub action_index: usize,
    pub target: String,
    pub description: Option<String>,
    pub operation: ActionOp,
    pub match_count: usize,
}

/// A change an action would apply, reported by dry runs. The operation is
/// predicted from the type of the first match and absent when nothing
/// matched.
#[derive(Debug, Clone)]
pub struct ProposedChange {
    pub action_index: usize,
    pub target: String,
    pub description: Option<String>,
    pub operation: Option<ActionOp>,
    pub match_count: usize,
}

/// The outcome of applying an overlay.
#[derive(Debug, Clone)]
pub struct ApplyResult {
    /// The modified tree. The input tree is untouched.
    pub data: Value,
    pub source_format: SourceFormat,
    pub source_path: Option<PathBuf>,
    pub actions_applied: usize,
    pub actions_skipped: usize,
    pub changes: Vec<AppliedChange>,
    pub warnings: Vec<ApplyWarning>,
    /// Legacy pre-formatted warning strings, parallel to `warnings`.
    pub warning_messages: Vec<String>,
}

impl ApplyResult {
    /// Re-materialize the typed model: serialize the modified tree in the
    /// original source format and re-parse it, preserving the source path.
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

/// Reusable configured applier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Applier {
    /// Fail the whole apply when any action matches nothing.
    pub strict_targets: bool,
}

impl Applier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_strict_targets(mut self, strict: bool) -> Self {
        self.strict_targets = strict;
        self
    }

    /// Apply an overlay to a parsed document.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any work when the overlay is
    /// invalid, and an apply error under strict targets when an action
    /// matches nothing.
    pub fn apply(&self, spec: &ParseResult, overlay: &Overlay) -> Result<ApplyResult, Error> {
        self.apply_tree(
            &spec.data,
            overlay,
            spec.source_format,
            spec.source_path.clone(),
        )
    }

    /// Apply an overlay read from files.
    ///
    /// # Errors
    ///
    /// As [`Applier::apply`], plus I/O and parse errors for either input.
    pub fn apply_files(
        &self,
        spec_path: impl AsRef<Path>,
        overlay_path: impl AsRef<Path>,
    ) -> Result<ApplyResult, Error> {
        let spec = Parser::new().parse_file(spec_path)?;
        let overlay = Overlay::from_file(overlay_path)?;
        self.apply(&spec, &overlay)
    }

    /// Apply an overlay to a generic tree.
    ///
    /// # Errors
    ///
    /// See [`Applier::apply`].
    pub fn apply_tree(
        &self,
        tree: &Value,
        overlay: &Overlay,
        source_format: SourceFormat,
        source_path: Option<PathBuf>,
    ) -> Result<ApplyResult, Error> {
        overlay.ensure_valid()?;

        // Value-preserving deep copy; the caller's tree stays intact.
        let mut working = tree.clone();
        let mut result = ApplyResult {
            data: Value::Null,
            source_format,
            source_path,
            actions_applied: 0,
            actions_skipped: 0,
            changes: Vec::new(),
            warnings: Vec::new(),
            warning_messages: Vec::new(),
        };

        for (index, action) in overlay.actions.iter().enumerate() {
            match self.apply_action(&mut working, index, action)? {
                ActionOutcome::Applied(change) => {
                    debug!(
                        action = index,
                        target = %change.target,
                        operation = %change.operation,
                        matches = change.match_count,
                        "applied overlay action"
                    );
                    result.actions_applied += 1;
                    result.changes.push(change);
                }
                ActionOutcome::Skipped(warning) => {
                    result.actions_skipped += 1;
                    result.warning_messages.push(warning.render());
                    result.warnings.push(warning);
                }
            }
        }

        result.data = working;
        Ok(result)
    }

    /// Report what an apply would change, without mutating anything.
    ///
    /// Later actions are evaluated against the state produced by earlier
    /// ones, so match counts are the same as a real apply; the work happens
    /// on an internal copy that is discarded.
    ///
    /// # Errors
    ///
    /// See [`Applier::apply`].
    pub fn dry_run(
        &self,
        spec: &ParseResult,
        overlay: &Overlay,
    ) -> Result<Vec<ProposedChange>, Error> {
        overlay.ensure_valid()?;
        let mut working = spec.data.clone();
        let mut proposed = Vec::new();
        for (index, action) in overlay.actions.iter().enumerate() {
            let path = parse_target(index, action)?;
            let matches = path.get(&working);
            let match_count = matches.len();
            let operation = matches.first().map(|first| {
                if action.is_remove() {
                    ActionOp::Remove
                } else {
                    predict_update_op(first.value, action.update.as_ref())
                }
            });
            proposed.push(ProposedChange {
                action_index: index,
                target: action.target.clone(),
                description: action.description.clone(),
                operation,
                match_count,
            });
            if match_count == 0 && self.strict_targets {
                return Err(Error::overlay_action(
                    index,
                    &action.target,
                    "no nodes matched the target",
                ));
            }
            self.apply_action(&mut working, index, action)?;
        }
        Ok(proposed)
    }

    fn apply_action(
        &self,
        working: &mut Value,
        index: usize,
        action: &Action,
    ) -> Result<ActionOutcome, Error> {
        let path = parse_target(index, action)?;
        let match_count = path.get(working).len();

        if match_count == 0 {
            if self.strict_targets {
                return Err(Error::overlay_action(
                    index,
                    &action.target,
                    "no nodes matched the target",
                ));
            }
            return Ok(ActionOutcome::Skipped(ApplyWarning {
                category: WarningCategory::NoMatch,
                action_index: index,
                target: action.target.clone(),
                message: "no nodes matched the target".to_string(),
                cause: None,
            }));
        }

        // Remove wins when both update and remove are present.
        let operation = if action.is_remove() {
            path.remove(working);
            ActionOp::Remove
        } else if let Some(update) = &action.update {
            let first = path
                .get(working)
                .first()
                .map(|matched| predict_update_op(matched.value, Some(update)))
                .unwrap_or(ActionOp::Replace);
            path.modify(working, |old| apply_update(old, update));
            first
        } else {
            // `remove: false` with no update declares an operation that
            // does nothing.
            return Ok(ActionOutcome::Skipped(ApplyWarning {
                category: WarningCategory::ActionError,
                action_index: index,
                target: action.target.clone(),
                message: "action declares neither an update nor remove: true".to_string(),
                cause: None,
            }));
        };

        Ok(ActionOutcome::Applied(AppliedChange {
            action_index: index,
            target: action.target.clone(),
            description: action.description.clone(),
            operation,
            match_count,
        }))
    }
}

enum ActionOutcome {
    Applied(AppliedChange),
    Skipped(ApplyWarning),
}

fn parse_target(index: usize, action: &Action) -> Result<JsonPath, Error> {
    JsonPath::parse(&action.target)
        .map_err(|err| Error::overlay_action(index, &action.target, err.to_string()))
}

const fn predict_update_op(target: &Value, update: Option<&Value>) -> ActionOp {
    match target {
        Value::Object(_) => {
            if let Some(Value::Object(_)) = update {
                ActionOp::Update
            } else {
                ActionOp::Replace
            }
        }
        Value::Array(_) => ActionOp::Append,
        _ => ActionOp::Replace,
    }
}

fn apply_update(old: &Value, update: &Value) -> Value {
    match old {
        Value::Object(_) if update.is_object() => {
            let mut merged = old.clone();
            value::deep_merge(&mut merged, update);
            merged
        }
        Value::Array(items) => {
            let mut extended = items.clone();
            extended.push(update.clone());
            Value::Array(extended)
        }
        _ => update.clone(),
    }
}

/// Apply an overlay to spec and overlay files with the default applier.
///
/// # Errors
///
/// See [`Applier::apply_files`].
pub fn apply_file(
    spec_path: impl AsRef<Path>,
    overlay_path: impl AsRef<Path>,
) -> Result<ApplyResult, Error> {
    Applier::new().apply_files(spec_path, overlay_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parsed_spec() -> ParseResult {
        crate::parser::parse_str(
            r"
openapi: 3.0.3
info:
  title: Test
  version: 1.0.0
paths:
  /pets:
    get:
      responses:
        '200':
          description: ok
  /internal/debug:
    x-internal: true
    get:
      responses:
        '200':
          description: ok
",
        )
        .unwrap()
    }

    fn overlay(yaml: &str) -> Overlay {
        Overlay::from_str(yaml).unwrap()
    }

    #[test]
    fn test_remove_internal_paths() {
        let spec = parsed_spec();
        let before = spec.data.clone();
        let result = Applier::new()
            .apply(
                &spec,
                &overlay(
                    r"
overlay: 1.0.0
info: {title: strip, version: '1'}
actions:
  - target: $.paths[?@.x-internal==true]
    remove: true
",
                ),
            )
            .unwrap();
        assert_eq!(result.actions_applied, 1);
        assert_eq!(result.changes[0].operation, ActionOp::Remove);
        assert!(result.data["paths"].get("/internal/debug").is_none());
        assert!(result.data["paths"].get("/pets").is_some());
        // Non-destructive: the input tree is byte-identical.
        assert_eq!(spec.data, before);
    }

    #[test]
    fn test_update_deep_merges_maps() {
        let spec = parsed_spec();
        let result = Applier::new()
            .apply(
                &spec,
                &overlay(
                    r"
overlay: 1.0.0
info: {title: retitle, version: '1'}
actions:
  - target: $.info
    update:
      title: Renamed
      contact:
        name: Platform
",
                ),
            )
            .unwrap();
        assert_eq!(result.changes[0].operation, ActionOp::Update);
        assert_eq!(result.data["info"]["title"], "Renamed");
        assert_eq!(result.data["info"]["version"], "1.0.0");
        assert_eq!(result.data["info"]["contact"]["name"], "Platform");
    }

    #[test]
    fn test_update_appends_to_sequence() {
        let mut spec = parsed_spec();
        spec.data["servers"] = json!([{"url": "https://a.example"}]);
        let result = Applier::new()
            .apply(
                &spec,
                &overlay(
                    r"
overlay: 1.0.0
info: {title: servers, version: '1'}
actions:
  - target: $.servers
    update:
      url: https://b.example
",
                ),
            )
            .unwrap();
        assert_eq!(result.changes[0].operation, ActionOp::Append);
        assert_eq!(result.data["servers"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_update_replaces_scalar() {
        let spec = parsed_spec();
        let result = Applier::new()
            .apply(
                &spec,
                &overlay(
                    r"
overlay: 1.0.0
info: {title: version, version: '1'}
actions:
  - target: $.info.version
    update: 2.0.0
",
                ),
            )
            .unwrap();
        assert_eq!(result.changes[0].operation, ActionOp::Replace);
        assert_eq!(result.data["info"]["version"], "2.0.0");
    }

    #[test]
    fn test_no_match_warns_and_skips() {
        let spec = parsed_spec();
        let result = Applier::new()
            .apply(
                &spec,
                &overlay(
                    r"
overlay: 1.0.0
info: {title: miss, version: '1'}
actions:
  - target: $.paths['/missing']
    remove: true
",
                ),
            )
            .unwrap();
        assert_eq!(result.actions_applied, 0);
        assert_eq!(result.actions_skipped, 1);
        assert_eq!(result.warnings[0].category, WarningCategory::NoMatch);
        assert_eq!(result.warning_messages.len(), 1);
    }

    #[test]
    fn test_strict_targets_fails_on_no_match() {
        let spec = parsed_spec();
        let err = Applier::new()
            .with_strict_targets(true)
            .apply(
                &spec,
                &overlay(
                    r"
overlay: 1.0.0
info: {title: miss, version: '1'}
actions:
  - target: $.paths['/missing']
    remove: true
",
                ),
            )
            .unwrap_err();
        assert!(err.to_string().contains("no nodes matched"));
    }

    #[test]
    fn test_remove_wins_when_both_present() {
        let spec = parsed_spec();
        let result = Applier::new()
            .apply(
                &spec,
                &overlay(
                    r"
overlay: 1.0.0
info: {title: both, version: '1'}
actions:
  - target: $.paths['/pets']
    update: {description: kept}
    remove: true
",
                ),
            )
            .unwrap();
        assert_eq!(result.changes[0].operation, ActionOp::Remove);
        assert!(result.data["paths"].get("/pets").is_none());
    }

    #[test]
    fn test_actions_see_previous_state() {
        let spec = parsed_spec();
        let result = Applier::new()
            .apply(
                &spec,
                &overlay(
                    r"
overlay: 1.0.0
info: {title: chain, version: '1'}
actions:
  - target: $.paths['/pets']
    update: {x-flagged: true}
  - target: $.paths[?@.x-flagged==true]
    remove: true
",
                ),
            )
            .unwrap();
        assert_eq!(result.actions_applied, 2);
        assert!(result.data["paths"].get("/pets").is_none());
    }

    #[test]
    fn test_dry_run_reports_without_mutating() {
        let spec = parsed_spec();
        let before = spec.data.clone();
        let proposed = Applier::new()
            .dry_run(
                &spec,
                &overlay(
                    r"
overlay: 1.0.0
info: {title: dry, version: '1'}
actions:
  - target: $.info
    update: {title: Renamed}
  - target: $.paths[?@.x-internal==true]
    remove: true
",
                ),
            )
            .unwrap();
        assert_eq!(spec.data, before);
        assert_eq!(proposed.len(), 2);
        assert_eq!(proposed[0].operation, Some(ActionOp::Update));
        assert_eq!(proposed[1].operation, Some(ActionOp::Remove));
        assert_eq!(proposed[1].match_count, 1);
    }

    #[test]
    fn test_to_parse_result_round_trip() {
        let spec = parsed_spec();
        let result = Applier::new()
            .apply(
                &spec,
                &overlay(
                    r"
overlay: 1.0.0
info: {title: strip, version: '1'}
actions:
  - target: $.paths[?@.x-internal==true]
    remove: true
",
                ),
            )
            .unwrap();
        let reparsed = result.to_parse_result().unwrap();
        assert_eq!(reparsed.stats.path_count, 1);
        assert_eq!(reparsed.source_format, spec.source_format);
    }

    #[test]
    fn test_compound_filter_touches_one_path() {
        let spec = crate::parser::parse_str(
            r"
openapi: 3.0.3
info: {title: grid, version: '1'}
paths:
  /a:
    get: {deprecated: true, responses: {'200': {description: ok}}}
    x-internal: true
    deprecated: true
  /b:
    get: {responses: {'200': {description: ok}}}
    x-internal: true
  /c:
    get: {responses: {'200': {description: ok}}}
    deprecated: true
  /d:
    get: {responses: {'200': {description: ok}}}
",
        )
        .unwrap();
        let result = Applier::new()
            .apply(
                &spec,
                &overlay(
                    r"
overlay: 1.0.0
info: {title: sunset, version: '1'}
actions:
  - target: $.paths[?@.deprecated==true && @.x-internal==true]
    update:
      x-removal-scheduled: '2025-01-01'
",
                ),
            )
            .unwrap();
        assert_eq!(result.changes[0].match_count, 1);
        assert_eq!(result.data["paths"]["/a"]["x-removal-scheduled"], "2025-01-01");
        assert!(result.data["paths"]["/b"].get("x-removal-scheduled").is_none());
        assert!(result.data["paths"]["/c"].get("x-removal-scheduled").is_none());
    }
}
