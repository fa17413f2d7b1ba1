//! Range and shape checks for the global state snapshot

use crate::config::Expectations;
use crate::models::{Check, Findings};
use crate::scoring::{RawScore, Scale};
use crate::snapshot::{CompositeScore, GlobalState, PillarState};
use tracing::debug;

/// Check the `global`, `indices` and `pillars` sections.
///
/// Stored bands are only checked for presence, never against the score.
pub fn check_state(state: &GlobalState, expectations: &Expectations, findings: &mut Findings) {
    check_global(state.global.as_ref(), findings);
    check_indices(state, expectations, findings);
    check_pillars(state.pillars.as_deref(), expectations, findings);
}

fn check_global(global: Option<&CompositeScore>, findings: &mut Findings) {
    let Some(global) = global else {
        findings.warn(Check::State, "scales_state.json has no 'global' section.");
        return;
    };
    match &global.score {
        Some(score) => {
            if score.check(Scale::Composite).is_err() {
                findings.error(
                    Check::State,
                    format!("Global score out of range (0–100): {score}"),
                );
            }
        }
        None => findings.warn(Check::State, "Global section missing 'score'."),
    }
}

fn check_indices(state: &GlobalState, expectations: &Expectations, findings: &mut Findings) {
    let indices = match &state.indices {
        Some(indices) if !indices.is_empty() => indices,
        _ => {
            findings.warn(Check::State, "No 'indices' section found in scales_state.json.");
            return;
        }
    };

    for key in &expectations.indices {
        let Some(index) = indices.get(key) else {
            findings.warn(
                Check::State,
                format!("Expected index '{key}' is missing from state.indices."),
            );
            continue;
        };
        match &index.score {
            Some(score) => check_index_score(key, score, findings),
            None => findings.warn(Check::State, format!("Index '{key}' missing score.")),
        }
        if index.band.is_none() {
            findings.warn(Check::State, format!("Index '{key}' missing 'band'."));
        }
    }

    for key in indices.keys().filter(|k| !expectations.indices.contains(*k)) {
        debug!("Index {} present in state but not expected", key);
    }
}

fn check_index_score(key: &str, score: &RawScore, findings: &mut Findings) {
    if score.check(Scale::Composite).is_err() {
        findings.error(
            Check::State,
            format!("Index '{key}' score out of range (0–100): {score}"),
        );
    }
}

fn check_pillars(
    pillars: Option<&[PillarState]>,
    expectations: &Expectations,
    findings: &mut Findings,
) {
    let pillars = match pillars {
        Some(pillars) if !pillars.is_empty() => pillars,
        _ => {
            findings.warn(Check::State, "No 'pillars' section found in scales_state.json.");
            return;
        }
    };

    for code in &expectations.pillars {
        // First match wins
        let found = pillars
            .iter()
            .find(|p| p.code.as_deref() == Some(code.as_str()));
        let Some(pillar) = found else {
            findings.warn(
                Check::State,
                format!("Expected pillar '{code}' not found in state.pillars."),
            );
            continue;
        };
        match &pillar.score {
            Some(score) if score.check(Scale::Pillar).is_err() => findings.error(
                Check::State,
                format!("Pillar '{code}' score out of range (0–4): {score}"),
            ),
            Some(_) => {}
            None => findings.warn(Check::State, format!("Pillar '{code}' missing 'score'.")),
        }
    }
}
