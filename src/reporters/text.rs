//! Text (terminal) reporter
//!
//! One line per finding in discovery order, followed by a summary block.
//! Colour comes from `console` and switches off when stdout is not a TTY.

use crate::models::{ExpectationSource, Finding, Severity, ValidationReport};
use anyhow::Result;
use console::style;
use std::fmt::Write;

fn finding_line(finding: &Finding) -> String {
    match finding.severity {
        Severity::Error => format!("{} {}", style("[ERROR]").red().bold(), finding.message),
        Severity::Warning => format!("{}  {}", style("[WARN]").yellow(), finding.message),
    }
}

/// Render report as formatted terminal output
pub fn render(report: &ValidationReport) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "{}", style("=== SCALES Check ===").bold())?;
    writeln!(out, "Base directory: {}", report.base_dir)?;
    match &report.expectation_source {
        ExpectationSource::Config(path) => writeln!(out, "Expectations: {}", path)?,
        ExpectationSource::BuiltIn => writeln!(out, "Expectations: built-in defaults")?,
    }
    writeln!(out, "Expected indices: {}", report.expected_indices.join(", "))?;
    writeln!(out, "Expected pillars: {}", report.expected_pillars.join(", "))?;
    writeln!(out, "Expected modules: {}", report.expected_modules.join(", "))?;
    writeln!(out)?;

    for finding in report.findings.iter() {
        writeln!(out, "{}", finding_line(finding))?;
    }
    if !report.findings.is_empty() {
        writeln!(out)?;
    }
    writeln!(out, "Checked {} ledger entries.", report.ledger_rows_checked)?;

    if !report.tripwires.is_empty() {
        writeln!(out, "\n{}", style("Active tripwires:").bold())?;
        for tripwire in &report.tripwires {
            write!(out, "  - {}", tripwire.id)?;
            if let Some(label) = &tripwire.label {
                write!(out, ": {}", label)?;
            }
            if let Some(note) = &tripwire.note {
                write!(out, " ({})", style(note).dim())?;
            }
            writeln!(out)?;
        }
    }

    let summary = &report.summary;
    writeln!(out, "\n{}", style("=== Summary ===").bold())?;
    writeln!(out, "Errors:   {}", summary.errors)?;
    writeln!(out, "Warnings: {}", summary.warnings)?;
    if report.passed() {
        writeln!(
            out,
            "Result: {} (no hard errors detected).",
            style("OK").green().bold()
        )?;
    } else {
        writeln!(
            out,
            "Result: {} (fix errors above before publishing).",
            style("FAILED").red().bold()
        )?;
    }

    Ok(out)
}
