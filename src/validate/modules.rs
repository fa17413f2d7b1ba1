//! Per-module snapshot checks
//!
//! Every module key in the expectation set has its own snapshot at
//! `<modules_dir>/<KEY>_state.json`. Modules are checked independently: a
//! missing or broken file is reported and the registry moves on.

use crate::config::{Expectations, ModuleExpectation};
use crate::models::{Check, Findings};
use crate::scoring::Scale;
use crate::snapshot::{decode_object, read_json, ModuleState, SnapshotError};
use std::path::PathBuf;
use tracing::{debug, info};

/// File name of a module snapshot
pub fn module_state_file(key: &str) -> String {
    format!("{key}_state.json")
}

/// Checks every expected module's snapshot
pub struct ModuleRegistry<'a> {
    modules_dir: PathBuf,
    expectations: &'a Expectations,
}

impl<'a> ModuleRegistry<'a> {
    pub fn new(modules_dir: impl Into<PathBuf>, expectations: &'a Expectations) -> Self {
        Self {
            modules_dir: modules_dir.into(),
            expectations,
        }
    }

    /// Check all expected modules in declaration order.
    ///
    /// Only filesystem failures other than "not found" are returned as `Err`.
    pub fn check_all(&self, findings: &mut Findings) -> Result<(), SnapshotError> {
        for module in self.expectations.modules.values() {
            self.check_module(module, findings)?;
        }
        Ok(())
    }

    pub fn check_module(
        &self,
        module: &ModuleExpectation,
        findings: &mut Findings,
    ) -> Result<(), SnapshotError> {
        let key = &module.key;
        let path = self.modules_dir.join(module_state_file(key));
        debug!("Checking module {} at {}", key, path.display());

        let value = match read_json(&path) {
            Ok(Some(value)) => value,
            Ok(None) => {
                findings.warn(
                    Check::Module,
                    format!("Missing module state file: {}", path.display()),
                );
                return Ok(());
            }
            Err(SnapshotError::Json(e)) => {
                findings.error(Check::Module, format!("Module {key} state JSON invalid: {e}"));
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        match decode_object::<ModuleState>(value) {
            Ok(state) => {
                check_module_state(module, &state, findings);
                info!("Module {} checked", key);
            }
            Err(SnapshotError::Shape { .. }) => findings.error(
                Check::Module,
                format!("Module {key} state JSON did not decode to an object."),
            ),
            Err(e) => findings.error(Check::Module, format!("Module {key} state {e}")),
        }
        Ok(())
    }
}

/// Check one decoded module snapshot against its expectation
pub fn check_module_state(
    module: &ModuleExpectation,
    state: &ModuleState,
    findings: &mut Findings,
) {
    let key = &module.key;

    if state.key.as_deref() != Some(key.as_str()) {
        findings.warn(
            Check::Module,
            format!("Module {key} top-level 'key' is missing or does not match '{key}'."),
        );
    }
    if state.name.as_deref().map_or(true, str::is_empty) {
        findings.warn(Check::Module, format!("Module {key} 'name' is missing or empty."));
    }
    match &state.score {
        Some(score) => {
            if score.check(Scale::Composite).is_err() {
                findings.error(
                    Check::Module,
                    format!("Module {key} score out of range (0–100): {score}"),
                );
            }
        }
        None => findings.warn(Check::Module, format!("Module {key} missing 'score'.")),
    }
    if state.band.is_none() {
        findings.warn(Check::Module, format!("Module {key} missing 'band'."));
    }

    let components = state.components_by_code();

    for code in &module.components {
        let Some(component) = components.get(code.as_str()) else {
            findings.warn(
                Check::Module,
                format!("Module {key} missing expected component '{code}'."),
            );
            continue;
        };
        match &component.score_0_4 {
            Some(score) if score.check(Scale::Indicator).is_err() => findings.error(
                Check::Module,
                format!("Module {key} component '{code}' score_0_4 out of range (0–4): {score}"),
            ),
            Some(_) => {}
            None => findings.warn(
                Check::Module,
                format!("Module {key} component '{code}' missing 'score_0_4'."),
            ),
        }
    }

    for code in components.keys().filter(|c| !module.expects(c)) {
        findings.warn(
            Check::Module,
            format!("Module {key} has unexpected component code '{code}' not in config."),
        );
    }
}
