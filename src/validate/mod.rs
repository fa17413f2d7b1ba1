//! Structural validator
//!
//! Runs one full pass over the persisted SCALES data:
//!
//! 1. Configuration load ([`load_scales_config`])
//! 2. Global, index and pillar checks ([`state`])
//! 3. Per-module checks ([`modules`])
//! 4. Ledger checks ([`ledger`])
//!
//! Every step appends to the same [`Findings`] collector. A bad snapshot is
//! reported and the pass continues; only filesystem failures other than
//! "not found" abort the run.

pub mod ledger;
pub mod modules;
pub mod state;

pub use ledger::{LedgerValidator, DEFAULT_MAX_LEDGER_ROWS};
pub use modules::{check_module_state, module_state_file, ModuleRegistry};
pub use state::check_state;

use crate::config::{load_scales_config, Expectations};
use crate::models::{Check, ExpectationSource, Findings, TripwireNotice, ValidationReport, Verdict};
use crate::snapshot::{decode_object, read_json, GlobalState, SnapshotError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Global state snapshot, relative to the data root
pub const STATE_FILE: &str = "data/scales_state.json";
/// Public evidence ledger, relative to the data root
pub const LEDGER_FILE: &str = "data/scales_ledger_public.json";
/// Directory holding `<KEY>_state.json` module snapshots
pub const MODULES_DIR: &str = "data/modules";

/// Where a run reads its inputs from
#[derive(Debug, Clone)]
pub struct DataLayout {
    pub base_dir: PathBuf,
    /// Explicit configuration file; `None` searches `<base>/config/`
    pub config: Option<PathBuf>,
    pub state: PathBuf,
    pub ledger: PathBuf,
    pub modules_dir: PathBuf,
}

impl DataLayout {
    /// Conventional layout under a data root
    pub fn from_base(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            config: None,
            state: base_dir.join(STATE_FILE),
            ledger: base_dir.join(LEDGER_FILE),
            modules_dir: base_dir.join(MODULES_DIR),
            base_dir,
        }
    }

    pub fn with_config(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.config = path;
        }
        self
    }

    pub fn with_state(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.state = path;
        }
        self
    }

    pub fn with_ledger(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.ledger = path;
        }
        self
    }

    pub fn with_modules_dir(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.modules_dir = path;
        }
        self
    }
}

/// One validation pass over a [`DataLayout`]
pub struct Validator {
    layout: DataLayout,
    max_ledger_rows: Option<usize>,
}

impl Validator {
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            max_ledger_rows: None,
        }
    }

    /// Override the ledger inspection cap (takes precedence over config)
    pub fn with_max_ledger_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_ledger_rows = max_rows;
        self
    }

    /// Run every check in order and build the report
    pub fn run(&self) -> Result<ValidationReport, SnapshotError> {
        let layout = &self.layout;
        let mut findings = Findings::new();

        let loaded = load_scales_config(&layout.base_dir, layout.config.as_deref(), &mut findings);
        let expectations = Expectations::resolve(loaded.config.as_ref());
        let expectation_source = match &loaded.path {
            Some(path) => ExpectationSource::Config(path.display().to_string()),
            None => ExpectationSource::BuiltIn,
        };
        debug!(
            "Expecting {} pillars, {} indices, {} modules",
            expectations.pillars.len(),
            expectations.indices.len(),
            expectations.modules.len()
        );

        let tripwires = check_state_file(&layout.state, &expectations, &mut findings)?;

        ModuleRegistry::new(&layout.modules_dir, &expectations).check_all(&mut findings)?;

        let max_rows = self
            .max_ledger_rows
            .or_else(|| loaded.config.as_ref().and_then(|c| c.max_ledger_rows()))
            .unwrap_or(DEFAULT_MAX_LEDGER_ROWS);
        let ledger_rows_checked = LedgerValidator::new(&expectations)
            .with_max_rows(max_rows)
            .check_file(&layout.ledger, &mut findings)?;

        let summary = findings.summary();
        let verdict = if findings.has_errors() {
            Verdict::Fail
        } else {
            Verdict::Pass
        };
        info!(
            "Validation finished: {} errors, {} warnings",
            summary.errors, summary.warnings
        );

        Ok(ValidationReport {
            base_dir: layout.base_dir.display().to_string(),
            expectation_source,
            expected_pillars: expectations.pillars.clone(),
            expected_indices: expectations.indices.clone(),
            expected_modules: expectations.modules.keys().cloned().collect(),
            ledger_rows_checked,
            tripwires,
            findings,
            summary,
            verdict,
        })
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load and check the global state file, returning its triggered tripwires
fn check_state_file(
    path: &Path,
    expectations: &Expectations,
    findings: &mut Findings,
) -> Result<Vec<TripwireNotice>, SnapshotError> {
    let name = file_label(path);
    let value = match read_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => {
            findings.error(Check::State, format!("Missing file: {}", path.display()));
            return Ok(Vec::new());
        }
        Err(e @ SnapshotError::Json(_)) => {
            findings.error(Check::State, format!("{name} {e}"));
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let state: GlobalState = match decode_object(value) {
        Ok(state) => state,
        Err(SnapshotError::Shape { .. }) => {
            findings.error(Check::State, format!("{name} did not decode to an object."));
            return Ok(Vec::new());
        }
        Err(e) => {
            findings.error(Check::State, format!("{name} {e}"));
            return Ok(Vec::new());
        }
    };

    check_state(&state, expectations, findings);

    Ok(state
        .triggered_tripwires()
        .map(|t| TripwireNotice {
            id: t.id.clone().unwrap_or_else(|| "UNKNOWN".to_string()),
            label: t.label.clone(),
            note: t.note.clone(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn write_json(path: &Path, value: serde_json::Value) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, serde_json::to_string_pretty(&value).expect("encode")).expect("write");
    }

    fn seed_valid(base: &Path) {
        write_json(
            &base.join("config/SCALES_Config.json"),
            json!({
                "pillars": [{"code": "S"}, {"code": "L"}],
                "indices": {"ILG": {}},
                "modules": {"M": {"components": [{"code": "A"}]}}
            }),
        );
        write_json(
            &base.join(STATE_FILE),
            json!({
                "global": {"score": 30, "band": "watch"},
                "indices": {"ILG": {"score": 30, "band": "watch"}},
                "pillars": [{"code": "S", "score": 1}, {"code": "L", "score": 1.4}],
                "tripwires": [
                    {"id": "TW-1", "label": "Ruling defied", "triggered": true},
                    {"id": "TW-2", "label": "Emergency powers", "triggered": false}
                ]
            }),
        );
        write_json(
            &base.join(MODULES_DIR).join("M_state.json"),
            json!({
                "key": "M", "name": "Module", "score": 25, "band": "watch",
                "components": [{"code": "A", "score_0_4": 1}]
            }),
        );
        write_json(
            &base.join(LEDGER_FILE),
            json!([{
                "id": "L-1", "date": "2025-03-01", "pillar": "S", "indicator_id": "S-01",
                "score_0_4": 1, "short_reason": "Order", "source_type": "ig_report"
            }]),
        );
    }

    #[test]
    fn test_clean_run_passes() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_valid(dir.path());

        let report = Validator::new(DataLayout::from_base(dir.path()))
            .run()
            .expect("run");

        assert!(report.findings.is_empty(), "{:?}", report.findings);
        assert!(report.passed());
        assert_eq!(report.ledger_rows_checked, 1);
        assert_eq!(report.expected_modules, vec!["M"]);
        assert!(matches!(report.expectation_source, ExpectationSource::Config(_)));
        // Tripwires are informational only
        assert_eq!(report.tripwires.len(), 1);
        assert_eq!(report.tripwires[0].id, "TW-1");
    }

    #[test]
    fn test_missing_state_is_error_and_run_continues() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_valid(dir.path());
        fs::remove_file(dir.path().join(STATE_FILE)).expect("remove");

        let report = Validator::new(DataLayout::from_base(dir.path()))
            .run()
            .expect("run");

        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.ledger_rows_checked, 1);
    }

    #[test]
    fn test_findings_follow_check_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let report = Validator::new(DataLayout::from_base(dir.path()))
            .run()
            .expect("run");

        let checks: Vec<Check> = report.findings.iter().map(|f| f.check).collect();
        let mut sorted = checks.clone();
        sorted.sort_by_key(|c| match c {
            Check::Config => 0,
            Check::State => 1,
            Check::Module => 2,
            Check::Ledger => 3,
        });
        assert_eq!(checks, sorted);
        assert_eq!(report.expectation_source, ExpectationSource::BuiltIn);
        // Missing state file is the only hard error
        assert_eq!(report.summary.errors, 1);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_valid(dir.path());
        write_json(
            &dir.path().join(LEDGER_FILE),
            json!([{"id": "L-9", "pillar": "Q", "score_0_4": 7}, 3, {}]),
        );
        let validator = Validator::new(DataLayout::from_base(dir.path()));

        let first = validator.run().expect("first run");
        let second = validator.run().expect("second run");
        assert_eq!(first.findings, second.findings);
        assert_eq!(first.verdict, second.verdict);
    }

    #[test]
    fn test_max_ledger_rows_precedence() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_valid(dir.path());
        let row = json!({
            "id": "L", "date": "2025-03-01", "pillar": "S", "indicator_id": "S-01",
            "score_0_4": 1, "short_reason": "r", "source_type": "ig_report"
        });
        write_json(&dir.path().join(LEDGER_FILE), json!([row.clone(), row.clone(), row]));

        let report = Validator::new(DataLayout::from_base(dir.path()))
            .with_max_ledger_rows(Some(2))
            .run()
            .expect("run");
        assert_eq!(report.ledger_rows_checked, 2);
        assert_eq!(report.summary.warnings, 1);
        assert!(report.passed());
    }

    #[test]
    fn test_zero_row_cap_in_config_falls_back_to_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_valid(dir.path());
        fs::remove_file(dir.path().join("config/SCALES_Config.json")).expect("remove");
        fs::write(
            dir.path().join("config/scales.toml"),
            "[validation]\nmax_ledger_rows = 0\n",
        )
        .expect("write config");
        write_json(&dir.path().join(LEDGER_FILE), json!([{"id": "X", "score_0_4": 99}]));

        let report = Validator::new(DataLayout::from_base(dir.path()))
            .run()
            .expect("run");

        assert_eq!(report.ledger_rows_checked, 1);
        assert_eq!(report.verdict, Verdict::Fail);
        assert!(report
            .findings
            .errors()
            .any(|f| f.message.contains("out of range") && f.message.contains("id=X")));
    }

    #[test]
    fn test_layout_overrides() {
        let layout = DataLayout::from_base("/srv/scales")
            .with_state(Some(PathBuf::from("/tmp/state.json")))
            .with_ledger(None);
        assert_eq!(layout.state, PathBuf::from("/tmp/state.json"));
        assert_eq!(layout.ledger, PathBuf::from("/srv/scales").join(LEDGER_FILE));
        assert!(layout.config.is_none());
    }
}
