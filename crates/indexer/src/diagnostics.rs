//! Non-fatal build problems, aggregated alongside the index.
//!
//! A build that partially fails still produces a queryable index; every
//! recoverable problem lands here instead of aborting the build.

use serde::Serialize;
use stub_parser::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A unit's declaration syntax did not parse; its contribution is dropped.
    ParseError,
    /// A unit exceeded the configured size limit and was skipped.
    UnitTooLarge,
    /// One name declared as both `module` and `class`; the first kind wins.
    NamespaceKindConflict,
    /// A class re-opened with a different superclass; the first wins.
    SuperclassConflict,
    /// An alias target that no member ever defines.
    UnresolvedAlias,
    /// An alias chain that revisits a name or exceeds the hop cap.
    AliasCycle,
    /// A superclass/include reference not present in the index.
    UnresolvedBase,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::ParseError => "parse_error",
            DiagnosticKind::UnitTooLarge => "unit_too_large",
            DiagnosticKind::NamespaceKindConflict => "namespace_kind_conflict",
            DiagnosticKind::SuperclassConflict => "superclass_conflict",
            DiagnosticKind::UnresolvedAlias => "unresolved_alias",
            DiagnosticKind::AliasCycle => "alias_cycle",
            DiagnosticKind::UnresolvedBase => "unresolved_base",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One recorded problem. `unit`/`namespace`/`line` are filled where known.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub unit: Option<String>,
    pub namespace: Option<String>,
    pub line: Option<u32>,
    pub message: String,
}

impl Diagnostic {
    pub fn parse_error(unit: &str, error: &ParseError) -> Self {
        Self {
            kind: DiagnosticKind::ParseError,
            severity: Severity::Error,
            unit: Some(unit.to_string()),
            namespace: None,
            line: Some(error.line()),
            message: error.to_string(),
        }
    }

    pub fn unit_too_large(unit: &str, size: u64, limit: u64) -> Self {
        Self {
            kind: DiagnosticKind::UnitTooLarge,
            severity: Severity::Warning,
            unit: Some(unit.to_string()),
            namespace: None,
            line: None,
            message: format!("unit is {size} bytes, over the {limit} byte limit"),
        }
    }

    pub fn namespace_warning(
        kind: DiagnosticKind,
        namespace: &str,
        unit: Option<&str>,
        line: Option<u32>,
        message: String,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            unit: unit.map(str::to_string),
            namespace: Some(namespace.to_string()),
            line,
            message,
        }
    }
}

/// Ordered collection of diagnostics for one build.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }
}
