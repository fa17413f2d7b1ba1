//! Configuration module for SCALES
//!
//! This module handles:
//! - The declarative model document (pillars, indices, modules)
//! - Built-in fallback expectations
//! - Validator limits

mod expectations;
mod scales_config;

pub use expectations::{
    Expectations,
    ModuleExpectation,
    DEFAULT_INDICES,
    DEFAULT_MODULES,
    DEFAULT_PILLARS,
};
pub use scales_config::{
    ComponentConfig,
    ConfigError,
    GlobalScoreConfig,
    IndexConfig,
    IndicatorConfig,
    LoadedConfig,
    ModuleConfig,
    ModuleScoring,
    PillarConfig,
    ScalesConfig,
    ValidationConfig,
    CONFIG_CANDIDATES,
    CONFIG_DIR,
    load_scales_config,
    parse_config_file,
    parse_config_str,
};
