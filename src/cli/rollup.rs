//! Rollup command - recompute composite scores from evidence

use anyhow::{bail, Context, Result};
use console::style;
use scales::config::{load_scales_config, Expectations};
use scales::models::Findings;
use scales::scoring::{roll_up_module, roll_up_state, ComponentEvidence};
use scales::snapshot::{read_json, LedgerEntry};
use scales::validate::LEDGER_FILE;
use std::path::Path;
use tracing::{info, warn};

pub fn run(
    base: &Path,
    config: Option<&Path>,
    ledger: Option<&Path>,
    module: Option<&str>,
    evidence: Option<&Path>,
) -> Result<()> {
    let mut findings = Findings::new();
    let loaded = load_scales_config(base, config, &mut findings);
    for finding in findings.iter() {
        eprintln!("{}  {}", style("[WARN]").yellow(), finding.message);
    }
    let expectations = Expectations::resolve(loaded.config.as_ref());

    let output = match (module, evidence) {
        (Some(key), Some(path)) => {
            let rows = load_array(path, "evidence")?;
            let evidence: Vec<ComponentEvidence> = serde_json::from_value(rows.into())
                .with_context(|| format!("Evidence in {} is malformed", path.display()))?;
            info!("Rolling up module {} from {} rows", key, evidence.len());
            let state = roll_up_module(key, &evidence, loaded.config.as_ref(), &expectations)?;
            serde_json::to_string_pretty(&state)?
        }
        _ => {
            let default_path = base.join(LEDGER_FILE);
            let path = ledger.unwrap_or(default_path.as_path());
            let entries = load_ledger(path)?;
            info!("Rolling up global state from {} ledger rows", entries.len());
            let state = roll_up_state(&entries, loaded.config.as_ref(), &expectations);
            serde_json::to_string_pretty(&state)?
        }
    };

    println!("{}", output);
    Ok(())
}

fn load_array(path: &Path, what: &str) -> Result<Vec<serde_json::Value>> {
    let value = read_json(path)
        .with_context(|| format!("Failed to load {} from {}", what, path.display()))?;
    match value {
        Some(serde_json::Value::Array(rows)) => Ok(rows),
        Some(_) => bail!("{} in {} is not a JSON array", what, path.display()),
        None => bail!("No {} found at {}", what, path.display()),
    }
}

/// Decode ledger rows, skipping anything that is not an object
fn load_ledger(path: &Path) -> Result<Vec<LedgerEntry>> {
    let rows = load_array(path, "ledger")?;
    let mut entries = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        if !row.is_object() {
            warn!("Skipping ledger row #{}: not an object", index + 1);
            continue;
        }
        match serde_json::from_value(row) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!("Skipping ledger row #{}: {}", index + 1, e),
        }
    }
    Ok(entries)
}
