//! Expectation sets checked by the validator
//!
//! An [`Expectations`] value is built once per run, either from the parsed
//! configuration or from the built-in defaults, and passed explicitly into
//! every check.

use super::ScalesConfig;
use indexmap::IndexMap;
use serde::Serialize;

/// Pillar codes expected when no configuration declares any
pub const DEFAULT_PILLARS: &[&str] = &["S", "C", "A", "L", "E", "S2"];

/// Index keys expected when no configuration declares any
pub const DEFAULT_INDICES: &[&str] = &["ILG", "CCI", "CSSI"];

/// Built-in modules: (key, display name, expected component codes)
pub const DEFAULT_MODULES: &[(&str, &str, &[&str])] = &[
    (
        "AI_PEI",
        "AI Preference Engineering Index",
        &["PIC", "CC", "DP", "CT_raw", "GS_raw"],
    ),
    (
        "CAEI",
        "Coercive Apparatus Expansion Index",
        &["EC", "OR", "TI", "OA_raw", "LR_raw"],
    ),
    (
        "SDEI",
        "Surveillance & Data Exploitation Index",
        &["CB", "IL", "AC", "AG_raw", "RR_raw"],
    ),
];

/// One module's expected shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleExpectation {
    pub key: String,
    pub name: String,
    /// Expected component codes, in declaration order
    pub components: Vec<String>,
}

impl ModuleExpectation {
    pub fn expects(&self, code: &str) -> bool {
        self.components.iter().any(|c| c == code)
    }
}

/// Everything the validator expects to find in the persisted state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expectations {
    pub pillars: Vec<String>,
    pub indices: Vec<String>,
    pub modules: IndexMap<String, ModuleExpectation>,
    /// Allowed ledger source types (empty = unconstrained)
    pub source_types: Vec<String>,
}

impl Default for Expectations {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Expectations {
    /// The hard-coded expectation set used when configuration is unavailable
    pub fn builtin() -> Self {
        let modules = DEFAULT_MODULES
            .iter()
            .map(|(key, name, components)| {
                (
                    key.to_string(),
                    ModuleExpectation {
                        key: key.to_string(),
                        name: name.to_string(),
                        components: components.iter().map(|c| c.to_string()).collect(),
                    },
                )
            })
            .collect();

        Self {
            pillars: DEFAULT_PILLARS.iter().map(|s| s.to_string()).collect(),
            indices: DEFAULT_INDICES.iter().map(|s| s.to_string()).collect(),
            modules,
            source_types: Vec::new(),
        }
    }

    /// Overlay whatever the configuration declares on top of the defaults.
    ///
    /// Indices are taken from a non-empty `indices` map, pillars from at
    /// least one pillar with a code, modules from a declared `modules` map.
    pub fn from_config(config: &ScalesConfig) -> Self {
        let mut expectations = Self::builtin();

        if !config.indices.is_empty() {
            expectations.indices = config.indices.keys().cloned().collect();
        }

        let pillar_codes = config.pillar_codes();
        if !pillar_codes.is_empty() {
            expectations.pillars = pillar_codes;
        }

        if let Some(modules) = &config.modules {
            expectations.modules = modules
                .iter()
                .map(|(key, module)| {
                    let components = module
                        .components
                        .iter()
                        .filter_map(|c| c.code.clone())
                        .collect();
                    (
                        key.clone(),
                        ModuleExpectation {
                            key: key.clone(),
                            name: module.name.clone().unwrap_or_else(|| key.clone()),
                            components,
                        },
                    )
                })
                .collect();
        }

        expectations.source_types = config.source_types.clone();
        expectations
    }

    /// Build from an optional configuration
    pub fn resolve(config: Option<&ScalesConfig>) -> Self {
        config.map(Self::from_config).unwrap_or_else(Self::builtin)
    }

    pub fn expects_pillar(&self, code: &str) -> bool {
        self.pillars.iter().any(|p| p == code)
    }

    /// Whether a ledger source type is acceptable
    pub fn allows_source_type(&self, source_type: &str) -> bool {
        self.source_types.is_empty() || self.source_types.iter().any(|s| s == source_type)
    }
}
