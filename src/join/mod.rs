//! Joining multiple documents into one.
//!
//! Documents are folded left-to-right under explicit collision policies.
//! Component-bucket collisions can fail, keep either side, rename one side
//! via a template, or merge structurally equivalent schemas; an optional
//! post-pass consolidates different-named but equivalent schemas onto one
//! canonical name. Every rename rewrites the affected references.

pub mod dedup;
mod joiner;
pub mod rename;

pub use dedup::{DedupMerge, EquivalenceMode};
pub use joiner::Joiner;
pub use rename::{render_template, RenameContext};

use crate::constants;
use crate::error::Error;
use crate::loader::SourceFormat;
use crate::model::{Document, OASVersion};
use crate::parser::{ParseResult, Parser, SpecStats};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::PathBuf;

/// What to do when two documents define the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionStrategy {
    /// Abort on any collision.
    Fail,
    /// Abort only on path collisions; component collisions keep the first
    /// writer's value with a warning.
    FailOnPaths,
    /// Keep the first writer's value.
    AcceptLeft,
    /// Replace with the later writer's value.
    AcceptRight,
    /// Keep both; rename the incumbent using the rename template.
    RenameLeft,
    /// Keep both; rename the incoming side using the rename template.
    RenameRight,
    /// Merge same-named schemas when structurally equivalent, else fail.
    DeduplicateEquivalent,
}

impl CollisionStrategy {
    pub const ALL: &'static [Self] = &[
        Self::Fail,
        Self::FailOnPaths,
        Self::AcceptLeft,
        Self::AcceptRight,
        Self::RenameLeft,
        Self::RenameRight,
        Self::DeduplicateEquivalent,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::FailOnPaths => "fail-on-paths",
            Self::AcceptLeft => "accept-left",
            Self::AcceptRight => "accept-right",
            Self::RenameLeft => "rename-left",
            Self::RenameRight => "rename-right",
            Self::DeduplicateEquivalent => "deduplicate-equivalent",
        }
    }

    /// Parse the kebab-case strategy name.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == text)
    }
}

impl std::fmt::Display for CollisionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which collision site a strategy is being resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionSite {
    Paths,
    Schemas,
    Components,
}

/// Joiner configuration.
#[derive(Debug, Clone)]
pub struct JoinerConfig {
    /// Strategy for path template collisions; falls back to
    /// `default_strategy`.
    pub path_strategy: Option<CollisionStrategy>,
    /// Strategy for `schemas` / `definitions` collisions; falls back to
    /// `default_strategy`.
    pub schema_strategy: Option<CollisionStrategy>,
    /// Strategy for the remaining component buckets; falls back to
    /// `default_strategy`.
    pub component_strategy: Option<CollisionStrategy>,
    pub default_strategy: CollisionStrategy,
    /// Equivalence test used by `deduplicate-equivalent`.
    pub equivalence_mode: EquivalenceMode,
    /// Concatenate `servers`, `security`, and `tags` arrays.
    pub merge_arrays: bool,
    /// Deduplicate concatenated tags by name.
    pub deduplicate_tags: bool,
    /// Post-merge pass consolidating different-named equivalent schemas.
    pub semantic_deduplication: bool,
    /// Template for `rename-*` collisions; variables `name`, `source`,
    /// `index`, functions `pascalCase camelCase snakeCase kebabCase`.
    pub rename_template: String,
    /// Map of source file path (or stem) to component-name prefix.
    pub namespace_prefix: IndexMap<String, String>,
    /// Apply configured prefixes to every document up front instead of only
    /// on collision.
    pub always_apply_prefix: bool,
}

impl Default for JoinerConfig {
    fn default() -> Self {
        Self {
            path_strategy: None,
            schema_strategy: None,
            component_strategy: None,
            default_strategy: CollisionStrategy::Fail,
            equivalence_mode: EquivalenceMode::default(),
            merge_arrays: true,
            deduplicate_tags: true,
            semantic_deduplication: false,
            rename_template: constants::DEFAULT_RENAME_TEMPLATE.to_string(),
            namespace_prefix: IndexMap::new(),
            always_apply_prefix: false,
        }
    }
}

impl JoinerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_path_strategy(mut self, strategy: CollisionStrategy) -> Self {
        self.path_strategy = Some(strategy);
        self
    }

    #[must_use]
    pub const fn with_schema_strategy(mut self, strategy: CollisionStrategy) -> Self {
        self.schema_strategy = Some(strategy);
        self
    }

    #[must_use]
    pub const fn with_component_strategy(mut self, strategy: CollisionStrategy) -> Self {
        self.component_strategy = Some(strategy);
        self
    }

    #[must_use]
    pub const fn with_default_strategy(mut self, strategy: CollisionStrategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_equivalence_mode(mut self, mode: EquivalenceMode) -> Self {
        self.equivalence_mode = mode;
        self
    }

    #[must_use]
    pub const fn with_merge_arrays(mut self, merge: bool) -> Self {
        self.merge_arrays = merge;
        self
    }

    #[must_use]
    pub const fn with_deduplicate_tags(mut self, dedup: bool) -> Self {
        self.deduplicate_tags = dedup;
        self
    }

    #[must_use]
    pub const fn with_semantic_deduplication(mut self, dedup: bool) -> Self {
        self.semantic_deduplication = dedup;
        self
    }

    #[must_use]
    pub fn with_rename_template(mut self, template: impl Into<String>) -> Self {
        self.rename_template = template.into();
        self
    }

    #[must_use]
    pub fn with_namespace_prefix(
        mut self,
        source: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        self.namespace_prefix.insert(source.into(), prefix.into());
        self
    }

    #[must_use]
    pub const fn with_always_apply_prefix(mut self, always: bool) -> Self {
        self.always_apply_prefix = always;
        self
    }

    /// The strategy in effect for a collision site.
    #[must_use]
    pub fn effective_strategy(&self, site: CollisionSite) -> CollisionStrategy {
        match site {
            CollisionSite::Paths => self.path_strategy,
            CollisionSite::Schemas => self.schema_strategy,
            CollisionSite::Components => self.component_strategy,
        }
        .unwrap_or(self.default_strategy)
    }
}

/// A structured join warning. Collision warnings name the kept source
/// first, then the incoming source.
#[derive(Debug, Clone)]
pub struct JoinWarning {
    /// Bucket name, `paths`, `tags`, or `semantic-deduplication`.
    pub bucket: String,
    pub key: String,
    pub kept_source: Option<String>,
    pub incoming_source: Option<String>,
    pub strategy: Option<CollisionStrategy>,
    pub message: String,
}

impl JoinWarning {
    /// The legacy pre-formatted rendering.
    #[must_use]
    pub fn render(&self) -> String {
        match (&self.kept_source, &self.incoming_source) {
            (Some(kept), Some(incoming)) => format!(
                "{} '{}' ({} vs {}): {}",
                self.bucket, self.key, kept, incoming, self.message
            ),
            _ => format!("{} '{}': {}", self.bucket, self.key, self.message),
        }
    }
}

/// The outcome of a join.
#[derive(Debug, Clone)]
pub struct JoinResult {
    pub document: Document,
    pub data: Value,
    pub version: OASVersion,
    pub source_format: SourceFormat,
    pub stats: SpecStats,
    pub collision_count: usize,
    pub warnings: Vec<JoinWarning>,
    /// Legacy pre-formatted warning strings, parallel to `warnings`.
    pub warning_messages: Vec<String>,
}

impl JoinResult {
    /// Re-materialize a [`ParseResult`] from the joined tree so the output
    /// can be piped into another component.
    ///
    /// # Errors
    ///
    /// Returns serialization or parse errors from the round trip.
    pub fn to_parse_result(&self) -> Result<ParseResult, Error> {
        let text = crate::loader::emit_tree(&self.data, self.source_format)?;
        Parser::new().parse_str(&text)
    }
}

/// Join pre-parsed documents with an explicit configuration.
///
/// # Errors
///
/// See [`Joiner::join`].
pub fn join(inputs: &[ParseResult], config: JoinerConfig) -> Result<JoinResult, Error> {
    Joiner::new(config).join(inputs)
}

/// Join documents read from files with an explicit configuration.
///
/// # Errors
///
/// See [`Joiner::join`], plus I/O and parse errors per input.
pub fn join_files(paths: &[PathBuf], config: JoinerConfig) -> Result<JoinResult, Error> {
    Joiner::new(config).join_files(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse_round_trip() {
        for strategy in CollisionStrategy::ALL {
            assert_eq!(CollisionStrategy::parse(strategy.as_str()), Some(*strategy));
        }
        assert_eq!(CollisionStrategy::parse("merge"), None);
    }

    #[test]
    fn test_effective_strategy_fallback() {
        let config = JoinerConfig::new().with_default_strategy(CollisionStrategy::AcceptLeft);
        assert_eq!(
            config.effective_strategy(CollisionSite::Schemas),
            CollisionStrategy::AcceptLeft
        );
        let config = config.with_schema_strategy(CollisionStrategy::RenameRight);
        assert_eq!(
            config.effective_strategy(CollisionSite::Schemas),
            CollisionStrategy::RenameRight
        );
        assert_eq!(
            config.effective_strategy(CollisionSite::Paths),
            CollisionStrategy::AcceptLeft
        );
    }
}
