//! Repairing common structural defects in OpenAPI 3.x documents.
//!
//! Six named passes, each independently toggleable, always run in the
//! fixed order below regardless of how they were selected:
//!
//! 1. `enum-csv-expanded` — single comma-joined enum strings split into
//!    real values
//! 2. `duplicate-operation-id` — later duplicates renamed with a numeric
//!    suffix
//! 3. `pruned-empty-path` — path items with no operations and no
//!    parameters removed
//! 4. `renamed-generic-schema` — schema names with characters invalid in
//!    identifiers rewritten, with references updated
//! 5. `missing-path-parameter` — undeclared `{template}` variables get a
//!    path-level parameter with an inferred type
//! 6. `pruned-unused-schema` — schemas unreachable from any operation
//!    removed
//!
//! Each pass is idempotent; running the fixer twice changes nothing the
//! second time.

mod passes;

use crate::error::Error;
use crate::model::{Document, OAS3Document};
use crate::parser::ParseResult;
use tracing::debug;

/// Identity of one repair pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixKind {
    EnumCsvExpanded,
    DuplicateOperationId,
    PrunedEmptyPath,
    RenamedGenericSchema,
    MissingPathParameter,
    PrunedUnusedSchema,
}

impl FixKind {
    /// All passes, in execution order.
    pub const ALL: &'static [Self] = &[
        Self::EnumCsvExpanded,
        Self::DuplicateOperationId,
        Self::PrunedEmptyPath,
        Self::RenamedGenericSchema,
        Self::MissingPathParameter,
        Self::PrunedUnusedSchema,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EnumCsvExpanded => "enum-csv-expanded",
            Self::DuplicateOperationId => "duplicate-operation-id",
            Self::PrunedEmptyPath => "pruned-empty-path",
            Self::RenamedGenericSchema => "renamed-generic-schema",
            Self::MissingPathParameter => "missing-path-parameter",
            Self::PrunedUnusedSchema => "pruned-unused-schema",
        }
    }

    /// Parse the kebab-case pass name.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == text)
    }
}

impl std::fmt::Display for FixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One repair performed by a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixRecord {
    pub kind: FixKind,
    pub description: String,
    /// Structural path of the repaired node.
    pub location: String,
}

/// The outcome of a fixer run.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub document: OAS3Document,
    pub fixes: Vec<FixRecord>,
}

impl FixOutcome {
    #[must_use]
    pub fn count_of(&self, kind: FixKind) -> usize {
        self.fixes.iter().filter(|fix| fix.kind == kind).count()
    }

    /// Re-materialize a [`ParseResult`] from the repaired document so the
    /// output can be piped into another component.
    ///
    /// # Errors
    ///
    /// Returns serialization or parse errors from the round trip.
    pub fn to_parse_result(&self) -> Result<ParseResult, Error> {
        let data = serde_json::to_value(&self.document)?;
        let text = crate::loader::emit_tree(&data, crate::loader::SourceFormat::Yaml)?;
        crate::parser::parse_str(&text)
    }
}

/// Reusable configured fixer. All passes are enabled by default.
#[derive(Debug, Clone)]
pub struct Fixer {
    enabled: Vec<FixKind>,
}

impl Default for Fixer {
    fn default() -> Self {
        Self {
            enabled: FixKind::ALL.to_vec(),
        }
    }
}

impl Fixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the passes to run. Execution order stays fixed regardless of
    /// the order given here.
    #[must_use]
    pub fn with_enabled_fixes(mut self, kinds: &[FixKind]) -> Self {
        self.enabled = kinds.to_vec();
        self
    }

    #[must_use]
    pub fn is_enabled(&self, kind: FixKind) -> bool {
        self.enabled.contains(&kind)
    }

    /// Run the enabled passes over an owned document.
    #[must_use]
    pub fn fix(&self, mut document: OAS3Document) -> FixOutcome {
        let mut fixes = Vec::new();
        for kind in FixKind::ALL {
            if !self.is_enabled(*kind) {
                continue;
            }
            let before = fixes.len();
            match kind {
                FixKind::EnumCsvExpanded => passes::expand_csv_enums(&mut document, &mut fixes),
                FixKind::DuplicateOperationId => {
                    passes::dedupe_operation_ids(&mut document, &mut fixes);
                }
                FixKind::PrunedEmptyPath => passes::prune_empty_paths(&mut document, &mut fixes),
                FixKind::RenamedGenericSchema => {
                    passes::rename_generic_schemas(&mut document, &mut fixes);
                }
                FixKind::MissingPathParameter => {
                    passes::declare_missing_path_parameters(&mut document, &mut fixes);
                }
                FixKind::PrunedUnusedSchema => {
                    passes::prune_unused_schemas(&mut document, &mut fixes);
                }
            }
            debug!(pass = kind.as_str(), fixes = fixes.len() - before, "fixer pass complete");
        }
        FixOutcome { document, fixes }
    }

    /// Run on a parsed document; only OpenAPI 3.x documents can be fixed.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::ErrorKind::Fix`] error for 2.0 documents.
    pub fn fix_parsed(&self, input: &ParseResult) -> Result<FixOutcome, Error> {
        match &input.document {
            Document::V3(doc) => Ok(self.fix(doc.clone())),
            Document::V2(_) => Err(Error::fix(
                "the fixer operates on OpenAPI 3.x documents; convert 2.0 input first",
            )),
        }
    }

    /// Report what the enabled passes would change, without persisting.
    #[must_use]
    pub fn dry_run(&self, document: &OAS3Document) -> Vec<FixRecord> {
        self.fix(document.clone()).fixes
    }
}
