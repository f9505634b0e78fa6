//! Structural diffing of two documents.
//!
//! The differ produces an ordered list of typed changes, each classified by
//! category and severity. `breaking` mode applies the classification rules
//! (removed operations are critical, tightened constraints are errors, and
//! so on); `simple` mode reports every delta at `info` severity.

mod differ;

pub use differ::Differ;

use serde_json::Value;

/// Change categories, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiffCategory {
    Endpoint,
    Operation,
    Parameter,
    RequestBody,
    Response,
    Schema,
    Security,
    Server,
    Info,
}

impl DiffCategory {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Endpoint => "endpoint",
            Self::Operation => "operation",
            Self::Parameter => "parameter",
            Self::RequestBody => "request_body",
            Self::Response => "response",
            Self::Schema => "schema",
            Self::Security => "security",
            Self::Server => "server",
            Self::Info => "info",
        }
    }

    /// Rank used for ordering the change list.
    #[must_use]
    pub const fn rank(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for DiffCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Change severities, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
}

impl Severity {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// A breaking change is anything classified `critical` or `error`.
    #[must_use]
    pub const fn is_breaking(&self) -> bool {
        matches!(self, Self::Critical | Self::Error)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
}

impl ChangeKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
        }
    }
}

/// One structural change between two documents.
#[derive(Debug, Clone)]
pub struct Change {
    pub category: DiffCategory,
    pub severity: Severity,
    pub kind: ChangeKind,
    /// Dotted structural path (`paths./pets.get.parameters.limit`).
    pub path: String,
    pub message: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

impl Change {
    /// The legacy pre-formatted rendering.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "[{}] {} {}: {} ({})",
            self.severity,
            self.category,
            self.kind.as_str(),
            self.path,
            self.message
        )
    }
}

/// Diff reporting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffMode {
    /// Every structural delta at `info` severity.
    Simple,
    /// Apply the breaking-change classification rules.
    #[default]
    Breaking,
}

/// The outcome of a diff.
#[derive(Debug, Clone)]
pub struct DiffResult {
    pub mode: DiffMode,
    /// Ordered by category rank, then structural path; stable.
    pub changes: Vec<Change>,
    pub has_breaking_changes: bool,
    /// Legacy pre-formatted strings, parallel to `changes`.
    pub messages: Vec<String>,
}

impl DiffResult {
    /// Exit code for operational consumers: 1 when a breaking-mode diff
    /// found any breaking change, else 0.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if matches!(self.mode, DiffMode::Breaking) && self.has_breaking_changes {
            1
        } else {
            0
        }
    }

    #[must_use]
    pub fn count_of(&self, severity: Severity) -> usize {
        self.changes
            .iter()
            .filter(|change| change.severity == severity)
            .count()
    }
}
