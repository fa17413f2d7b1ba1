//! CLI command definitions and handlers

mod check;
mod expectations;
mod rollup;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Parse the ledger inspection cap (at least 1)
fn parse_max_rows(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("max ledger rows must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

/// SCALES - composite risk scoring and snapshot validation
#[derive(Parser, Debug)]
#[command(name = "scales")]
#[command(
    version,
    about = "Validate SCALES risk-score snapshots against their declared model",
    long_about = "Checks the curated SCALES state snapshots (global state, per-module \
states and the public evidence ledger) against the pillars, indices and modules \
declared in the configuration, and recomputes roll-ups from evidence.\n\n\
Run without a subcommand to check the current directory:\n  \
scales",
    after_help = "\
Examples:
  scales                                    Check ./data against ./config
  scales --base /srv/scales check           Check another data root
  scales check --format json                JSON report for scripting
  scales rollup                             Recompute scores from the ledger
  scales expectations                       Show what the validator expects"
)]
pub struct Cli {
    /// Data root containing config/ and data/ (default: current directory)
    #[arg(long, global = true, default_value = ".", env = "SCALES_BASE")]
    pub base: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Arguments for `scales check`
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Configuration file (default: search <base>/config/)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Global state snapshot (default: <base>/data/scales_state.json)
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Evidence ledger (default: <base>/data/scales_ledger_public.json)
    #[arg(long)]
    pub ledger: Option<PathBuf>,

    /// Module snapshot directory (default: <base>/data/modules)
    #[arg(long)]
    pub modules_dir: Option<PathBuf>,

    /// Ledger rows to inspect (default: config value, else 100)
    #[arg(long, value_parser = parse_max_rows)]
    pub max_ledger_rows: Option<usize>,

    /// Output format: text, json
    #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
    pub format: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate snapshots and exit 1 on any hard error (default command)
    #[command(after_help = "\
Examples:
  scales check                                       Check the current data root
  scales check --config config/scales.toml           Use an explicit config file
  scales check --max-ledger-rows 500                 Inspect more ledger rows
  scales check --format json                         JSON report for CI")]
    Check(CheckArgs),

    /// Recompute state or module scores from evidence and print them as JSON
    #[command(after_help = "\
Examples:
  scales rollup                                      Global state from the public ledger
  scales rollup --ledger ops/evidence.json           Global state from another ledger
  scales rollup --module AI_PEI --evidence ops/AI_PEI_evidence.json")]
    Rollup {
        /// Configuration file (default: search <base>/config/)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Evidence ledger (default: <base>/data/scales_ledger_public.json)
        #[arg(long, conflicts_with = "module")]
        ledger: Option<PathBuf>,

        /// Module key to roll up instead of the global state
        #[arg(long, requires = "evidence")]
        module: Option<String>,

        /// Component evidence for --module: [{component_code, score_0_4}, ...]
        #[arg(long, requires = "module")]
        evidence: Option<PathBuf>,
    },

    /// Print the effective expectation set (config or built-in defaults)
    Expectations {
        /// Configuration file (default: search <base>/config/)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    match cli.command {
        Some(Commands::Check(args)) => check::run(&cli.base, &args),

        Some(Commands::Rollup {
            config,
            ledger,
            module,
            evidence,
        }) => rollup::run(
            &cli.base,
            config.as_deref(),
            ledger.as_deref(),
            module.as_deref(),
            evidence.as_deref(),
        ),

        Some(Commands::Expectations { config, format }) => {
            expectations::run(&cli.base, config.as_deref(), &format)
        }

        None => check::run(
            &cli.base,
            &CheckArgs {
                format: "text".to_string(),
                ..Default::default()
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["scales"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.base, PathBuf::from("."));
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_check_flags() {
        let cli = Cli::try_parse_from([
            "scales",
            "--base",
            "/srv/scales",
            "check",
            "--max-ledger-rows",
            "5",
            "--format",
            "json",
        ])
        .expect("parse");
        match cli.command {
            Some(Commands::Check(args)) => {
                assert_eq!(args.max_ledger_rows, Some(5));
                assert_eq!(args.format, "json");
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.base, PathBuf::from("/srv/scales"));
    }

    #[test]
    fn test_zero_max_rows_rejected() {
        assert!(Cli::try_parse_from(["scales", "check", "--max-ledger-rows", "0"]).is_err());
    }

    #[test]
    fn test_module_requires_evidence() {
        assert!(Cli::try_parse_from(["scales", "rollup", "--module", "AI_PEI"]).is_err());
        assert!(Cli::try_parse_from([
            "scales",
            "rollup",
            "--module",
            "AI_PEI",
            "--evidence",
            "e.json"
        ])
        .is_ok());
    }
}
