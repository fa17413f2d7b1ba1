//! Check command - validate snapshots against expectations

use super::CheckArgs;
use anyhow::{Context, Result};
use scales::reporters;
use scales::validate::{DataLayout, Validator};
use std::io::Write;
use std::path::Path;
use tracing::info;

pub fn run(base: &Path, args: &CheckArgs) -> Result<()> {
    let layout = DataLayout::from_base(base)
        .with_config(args.config.clone())
        .with_state(args.state.clone())
        .with_ledger(args.ledger.clone())
        .with_modules_dir(args.modules_dir.clone());
    info!("Checking SCALES data under {}", layout.base_dir.display());

    let report = Validator::new(layout)
        .with_max_ledger_rows(args.max_ledger_rows)
        .run()
        .context("Validation aborted")?;

    let output = reporters::report(&report, &args.format)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    if !report.passed() {
        std::process::exit(report.verdict.exit_code());
    }
    Ok(())
}
