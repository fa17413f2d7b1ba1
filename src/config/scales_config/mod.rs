//! SCALES configuration document
//!
//! Loads the declarative model description from `config/scales.toml`,
//! `config/SCALES_Config.json`, or `config/SCALES_Config.yaml` under the
//! data root, or from an explicit path.
//!
//! # Configuration Format
//!
//! ```yaml
//! # config/SCALES_Config.yaml
//! version: "2.0.0"
//! pillars:
//!   - { code: S, name: Structural safeguards }
//! indicators:
//!   - { id: S-01, pillar: S }
//! indices:
//!   ILG:
//!     name: Institutional Legitimacy & Guardrails
//!     pillar_weights: { S: 1.0, L: 1.0 }
//! global_score:
//!   index_weights: { ILG: 0.4, CCI: 0.3, CSSI: 0.3 }
//! modules:
//!   AI_PEI:
//!     name: AI Preference Engineering Index
//!     components:
//!       - { code: PIC, weight: 1.0 }
//!     scoring: { max_raw: 20 }
//! source_types: [scotus_opinion_pdf, ig_report]
//! validation:
//!   max_ledger_rows: 100
//! ```
//!
//! Loading never fails the run. A missing or unparsable document is
//! recorded as a warning and the built-in expectations are used instead.

use crate::models::{Check, Findings};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Directory under the data root that holds the configuration document
pub const CONFIG_DIR: &str = "config";

/// Candidate file names, in search order
pub const CONFIG_CANDIDATES: &[&str] = &[
    "scales.toml",
    "SCALES_Config.json",
    "SCALES_Config.yaml",
    "SCALES_Config.yml",
];

/// Errors raised while reading a configuration document
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported config format '{0}' (expected .toml, .json, .yaml or .yml)")]
    UnsupportedFormat(String),
}

/// Declarative SCALES model description
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ScalesConfig {
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub as_of: Option<String>,

    #[serde(default)]
    pub pillars: Vec<PillarConfig>,

    /// Indicator to pillar mapping used by forward computation
    #[serde(default)]
    pub indicators: Vec<IndicatorConfig>,

    #[serde(default)]
    pub indices: IndexMap<String, IndexConfig>,

    #[serde(default)]
    pub global_score: GlobalScoreConfig,

    /// `None` keeps the built-in module expectations
    #[serde(default)]
    pub modules: Option<IndexMap<String, ModuleConfig>>,

    /// Allowed ledger `source_type` tags (empty = unconstrained)
    #[serde(default)]
    pub source_types: Vec<String>,

    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PillarConfig {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct IndicatorConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub pillar: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct IndexConfig {
    #[serde(default)]
    pub name: Option<String>,

    /// Relative pillar weights; normalized before use
    #[serde(default)]
    pub pillar_weights: IndexMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GlobalScoreConfig {
    /// Relative index weights; normalized before use
    #[serde(default)]
    pub index_weights: IndexMap<String, f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ModuleConfig {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub components: Vec<ComponentConfig>,

    #[serde(default)]
    pub scoring: ModuleScoring,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentConfig {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_component_weight")]
    pub weight: f64,
}

fn default_component_weight() -> f64 {
    1.0
}

/// Module normalization settings
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleScoring {
    /// Raw weighted sum that maps to a module score of 100 (default: 20)
    #[serde(default = "default_max_raw")]
    pub max_raw: f64,
}

impl Default for ModuleScoring {
    fn default() -> Self {
        Self {
            max_raw: default_max_raw(),
        }
    }
}

fn default_max_raw() -> f64 {
    20.0
}

/// Validator limits
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ValidationConfig {
    /// Ledger rows inspected per run (default: 100)
    #[serde(default)]
    pub max_ledger_rows: Option<usize>,
}

/// Outcome of configuration discovery
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: Option<ScalesConfig>,
    pub path: Option<PathBuf>,
}

/// Locate and parse the configuration document.
///
/// With `explicit` set only that file is tried. Otherwise the candidates
/// in [`CONFIG_CANDIDATES`] are tried in order under `<base_dir>/config/`;
/// a candidate that fails to parse is reported and the search continues.
/// Every fallback is recorded in `findings` as a warning.
pub fn load_scales_config(
    base_dir: &Path,
    explicit: Option<&Path>,
    findings: &mut Findings,
) -> LoadedConfig {
    let candidates: Vec<PathBuf> = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => CONFIG_CANDIDATES
            .iter()
            .map(|name| base_dir.join(CONFIG_DIR).join(name))
            .collect(),
    };

    let mut any_found = false;
    for path in &candidates {
        if !path.exists() {
            continue;
        }
        any_found = true;
        match parse_config_file(path) {
            Ok(mut config) => {
                debug!("Loaded SCALES config from {}", path.display());
                if config.validation.max_ledger_rows == Some(0) {
                    findings.warn(
                        Check::Config,
                        format!(
                            "{}: validation.max_ledger_rows must be at least 1; using the default.",
                            path.display()
                        ),
                    );
                    config.validation.max_ledger_rows = None;
                }
                return LoadedConfig {
                    config: Some(config),
                    path: Some(path.clone()),
                };
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                findings.warn(
                    Check::Config,
                    format!(
                        "Could not parse {}: {}; falling back to built-in expectations.",
                        path.display(),
                        e
                    ),
                );
            }
        }
    }

    if !any_found {
        let shown = match explicit {
            Some(path) => path.display().to_string(),
            None => base_dir
                .join(CONFIG_DIR)
                .join("SCALES_Config.yaml")
                .display()
                .to_string(),
        };
        debug!("No SCALES config found, using built-in expectations");
        findings.warn(
            Check::Config,
            format!("Config file {shown} not found; falling back to built-in expectations."),
        );
    }

    LoadedConfig::default()
}

/// Parse a configuration document, choosing the format by extension
pub fn parse_config_file(path: &Path) -> Result<ScalesConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    parse_config_str(&content, &ext)
}

/// Parse configuration text in the given format (`toml`, `json`, `yaml`/`yml`)
pub fn parse_config_str(content: &str, format: &str) -> Result<ScalesConfig, ConfigError> {
    let config: ScalesConfig = match format {
        "toml" => toml::from_str(content)?,
        "json" => serde_json::from_str(content)?,
        "yaml" | "yml" => serde_yaml::from_str(content)?,
        other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
    };
    Ok(config)
}

impl ScalesConfig {
    /// Pillar codes declared in the document, in declaration order
    pub fn pillar_codes(&self) -> Vec<String> {
        self.pillars.iter().filter_map(|p| p.code.clone()).collect()
    }

    /// Configured ledger row cap, if any
    pub fn max_ledger_rows(&self) -> Option<usize> {
        self.validation.max_ledger_rows
    }

    /// Display name for a pillar code
    pub fn pillar_name(&self, code: &str) -> Option<&str> {
        self.pillars
            .iter()
            .find(|p| p.code.as_deref() == Some(code))
            .and_then(|p| p.name.as_deref())
    }
}
