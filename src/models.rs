//! Core data models for SCALES validation
//!
//! Findings are plain data: every check appends to a [`Findings`]
//! collector instead of returning early, so one run reports as many
//! independent problems as it can find.

use serde::{Deserialize, Serialize};

/// Two-tier finding severity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A quality concern that does not invalidate the published numbers
    Warning,
    /// The published score cannot be trusted; the run fails
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Which part of the run produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Check {
    Config,
    State,
    Module,
    Ledger,
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Check::Config => write!(f, "config"),
            Check::State => write!(f, "state"),
            Check::Module => write!(f, "module"),
            Check::Ledger => write!(f, "ledger"),
        }
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub check: Check,
    pub message: String,
}

/// Ordered collector for findings.
///
/// Discovery order is preserved so repeated runs over unchanged inputs
/// produce identical diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Findings {
    items: Vec<Finding>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a hard error
    pub fn error(&mut self, check: Check, message: impl Into<String>) {
        self.push(Severity::Error, check, message.into());
    }

    /// Record a warning
    pub fn warn(&mut self, check: Check, message: impl Into<String>) {
        self.push(Severity::Warning, check, message.into());
    }

    fn push(&mut self, severity: Severity, check: Check, message: String) {
        tracing::debug!("{} [{}] {}", severity, check, message);
        self.items.push(Finding {
            severity,
            check,
            message,
        });
    }

    /// Append everything from `other`, keeping its order
    pub fn merge(&mut self, other: Findings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.items.iter()
    }

    /// Hard errors in discovery order
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.items.iter().filter(|f| f.severity == Severity::Error)
    }

    /// Warnings in discovery order
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.items.iter().filter(|f| f.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn summary(&self) -> FindingsSummary {
        FindingsSummary::from_findings(self)
    }
}

/// Summary of findings by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub errors: usize,
    pub warnings: usize,
    pub total: usize,
}

impl FindingsSummary {
    pub fn from_findings(findings: &Findings) -> Self {
        let mut summary = Self::default();
        for f in findings.iter() {
            match f.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

/// Terminal state of a validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Process exit code for this verdict
    pub fn exit_code(&self) -> i32 {
        match self {
            Verdict::Pass => 0,
            Verdict::Fail => 1,
        }
    }
}

/// A triggered tripwire carried alongside the scores (informational only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripwireNotice {
    pub id: String,
    pub label: Option<String>,
    pub note: Option<String>,
}

/// Where the expectation set for a run came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "path")]
pub enum ExpectationSource {
    Config(String),
    BuiltIn,
}

/// Full result of one validation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub base_dir: String,
    pub expectation_source: ExpectationSource,
    pub expected_pillars: Vec<String>,
    pub expected_indices: Vec<String>,
    pub expected_modules: Vec<String>,
    pub ledger_rows_checked: usize,
    pub tripwires: Vec<TripwireNotice>,
    pub findings: Findings,
    pub summary: FindingsSummary,
    pub verdict: Verdict,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}
