//! Public evidence ledger checks

use crate::config::Expectations;
use crate::models::{Check, Findings};
use crate::scoring::Scale;
use crate::snapshot::{read_json, LedgerEntry, SnapshotError};
use std::path::Path;
use tracing::{debug, info};

/// Rows inspected per run unless configured otherwise
pub const DEFAULT_MAX_LEDGER_ROWS: usize = 100;

/// Validates ledger rows against the required-field list and the
/// expected pillar set
pub struct LedgerValidator<'a> {
    expectations: &'a Expectations,
    max_rows: usize,
}

impl<'a> LedgerValidator<'a> {
    pub fn new(expectations: &'a Expectations) -> Self {
        Self {
            expectations,
            max_rows: DEFAULT_MAX_LEDGER_ROWS,
        }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Load and check the ledger file, returning the number of rows checked
    pub fn check_file(
        &self,
        path: &Path,
        findings: &mut Findings,
    ) -> Result<usize, SnapshotError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let value = match read_json(path) {
            Ok(Some(value)) => value,
            Ok(None) => {
                findings.warn(
                    Check::Ledger,
                    format!(
                        "Missing file: {} (not fatal, but ledger will appear empty).",
                        path.display()
                    ),
                );
                return Ok(0);
            }
            Err(e @ SnapshotError::Json(_)) => {
                findings.error(Check::Ledger, format!("{name} {e}"));
                return Ok(0);
            }
            Err(e) => return Err(e),
        };

        let serde_json::Value::Array(rows) = value else {
            findings.error(Check::Ledger, format!("{name} did not decode to an array."));
            return Ok(0);
        };

        let checked = self.check_rows(&rows, findings);
        info!("Checked {} ledger entries", checked);
        Ok(checked)
    }

    /// Check the first `max_rows` rows, warning once if more were skipped
    pub fn check_rows(&self, rows: &[serde_json::Value], findings: &mut Findings) -> usize {
        let checked = rows.len().min(self.max_rows);

        for (index, row) in rows.iter().take(self.max_rows).enumerate() {
            if !row.is_object() {
                findings.error(
                    Check::Ledger,
                    format!("Ledger entry #{} is not an object.", index + 1),
                );
                continue;
            }
            match serde_json::from_value::<LedgerEntry>(row.clone()) {
                Ok(entry) => self.check_entry(&entry, findings),
                Err(e) => findings.error(
                    Check::Ledger,
                    format!("Ledger entry #{} could not be decoded: {e}", index + 1),
                ),
            }
        }

        if rows.len() > self.max_rows {
            debug!("Ledger has {} rows, cap is {}", rows.len(), self.max_rows);
            findings.warn(
                Check::Ledger,
                format!(
                    "More than {max} ledger entries; only first {max} checked.",
                    max = self.max_rows
                ),
            );
        }
        checked
    }

    /// Check a single decoded row
    pub fn check_entry(&self, entry: &LedgerEntry, findings: &mut Findings) {
        let id = entry.display_id();

        for field in entry.missing_fields() {
            findings.error(
                Check::Ledger,
                format!("Ledger entry missing required field '{field}' (id={id})."),
            );
        }

        if let Some(pillar) = entry.pillar.as_ref().filter(|p| !p.is_blank()) {
            let pillar = pillar.to_string();
            if !self.expectations.expects_pillar(&pillar) {
                findings.warn(
                    Check::Ledger,
                    format!(
                        "Ledger entry has pillar '{pillar}' which is not in expected set ({}). id={id}",
                        self.expectations.pillars.join(", ")
                    ),
                );
            }
        }

        if let Some(score) = entry.score_0_4.as_ref().filter(|s| !s.is_blank()) {
            if score.check(Scale::Indicator).is_err() {
                findings.error(
                    Check::Ledger,
                    format!("Ledger entry score_0_4 out of range (0–4): {score} (id={id})"),
                );
            }
        }

        if let Some(source_type) = entry.source_type.as_ref().filter(|s| !s.is_blank()) {
            let source_type = source_type.to_string();
            if !self.expectations.allows_source_type(&source_type) {
                findings.warn(
                    Check::Ledger,
                    format!(
                        "Ledger entry has source_type '{source_type}' which is not a configured source type. id={id}"
                    ),
                );
            }
        }
    }
}
