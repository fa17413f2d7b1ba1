//! Expectations command - show what the validator will check for

use anyhow::Result;
use console::style;
use scales::config::{load_scales_config, Expectations};
use scales::models::Findings;
use std::path::Path;

pub fn run(base: &Path, config: Option<&Path>, format: &str) -> Result<()> {
    let mut findings = Findings::new();
    let loaded = load_scales_config(base, config, &mut findings);
    for finding in findings.iter() {
        eprintln!("{}  {}", style("[WARN]").yellow(), finding.message);
    }
    let expectations = Expectations::resolve(loaded.config.as_ref());

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&expectations)?);
        return Ok(());
    }

    match &loaded.path {
        Some(path) => println!("{} {}", style("Source:").bold(), path.display()),
        None => println!("{} built-in defaults", style("Source:").bold()),
    }
    println!(
        "{} {}",
        style("Pillars:").bold(),
        expectations.pillars.join(", ")
    );
    println!(
        "{} {}",
        style("Indices:").bold(),
        expectations.indices.join(", ")
    );
    println!("{}", style("Modules:").bold());
    for module in expectations.modules.values() {
        println!(
            "  - {} ({}): {}",
            module.key,
            module.name,
            module.components.join(", ")
        );
    }
    if !expectations.source_types.is_empty() {
        println!(
            "{} {}",
            style("Source types:").bold(),
            expectations.source_types.join(", ")
        );
    }
    Ok(())
}
