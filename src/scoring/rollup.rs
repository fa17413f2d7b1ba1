//! Forward computation from evidence to composite scores
//!
//! ```text
//! indicator = mean(evidence score_0_4 for that indicator_id)
//! pillar    = mean(indicator scores mapped to the pillar)          0–4
//! index     = Σ pillar × normalized pillar weight / 4 × 100       0–100
//! global    = Σ index × normalized index weight                   0–100
//! module    = Σ component mean × weight / max_raw × 100           0–100
//! ```
//!
//! The results are shaped like the persisted snapshots so a curator can
//! diff them against what is published. Nothing here touches the filesystem.

use super::scale::{Band, RawScore, Scale};
use crate::config::{Expectations, ScalesConfig};
use crate::snapshot::{
    ComponentState, CompositeScore, GlobalState, LedgerEntry, ModuleState, PillarState,
};
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const DEFAULT_MAX_RAW: f64 = 20.0;

#[derive(Error, Debug)]
pub enum RollupError {
    #[error("module '{0}' is not declared in the configuration or the built-in set")]
    UnknownModule(String),
}

/// One row of module component evidence
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentEvidence {
    #[serde(default)]
    pub component_code: Option<String>,
    #[serde(default)]
    pub score_0_4: Option<RawScore>,
}

/// Mean evidence score for one indicator
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorScore {
    pub pillar: Option<String>,
    pub score: f64,
    pub observations: usize,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Normalize weights so they sum to 1; `None` without positive total
fn normalize(weights: &IndexMap<String, f64>) -> Option<IndexMap<&str, f64>> {
    let total: f64 = weights.values().sum();
    if weights.is_empty() || total <= 0.0 {
        return None;
    }
    Some(weights.iter().map(|(k, w)| (k.as_str(), w / total)).collect())
}

/// Average usable evidence per indicator, in first-seen order.
///
/// Rows without an indicator id or with a score that is not a number in
/// 0–4 are skipped. The pillar comes from the configured indicator list,
/// falling back to the first row that names one.
pub fn indicator_scores(
    entries: &[LedgerEntry],
    config: Option<&ScalesConfig>,
) -> IndexMap<String, IndicatorScore> {
    let configured: IndexMap<&str, &str> = config
        .map(|c| {
            c.indicators
                .iter()
                .filter_map(|i| Some((i.id.as_deref()?, i.pillar.as_deref()?)))
                .collect()
        })
        .unwrap_or_default();

    let mut sums: IndexMap<String, (f64, usize, Option<String>)> = IndexMap::new();
    for entry in entries {
        let Some(id) = entry.indicator_id.as_ref().filter(|v| !v.is_blank()) else {
            continue;
        };
        let Some(score) = entry.score_0_4.as_ref().and_then(|s| s.check(Scale::Indicator).ok())
        else {
            debug!("Skipping ledger row {} without usable score", entry.display_id());
            continue;
        };
        let slot = sums.entry(id.to_string()).or_insert((0.0, 0, None));
        slot.0 += score;
        slot.1 += 1;
        if slot.2.is_none() {
            slot.2 = entry
                .pillar
                .as_ref()
                .and_then(|p| p.as_str())
                .filter(|p| !p.is_empty())
                .map(str::to_string);
        }
    }

    sums.into_iter()
        .map(|(id, (sum, count, row_pillar))| {
            let pillar = configured
                .get(id.as_str())
                .map(|p| p.to_string())
                .or(row_pillar);
            let score = IndicatorScore {
                pillar,
                score: sum / count as f64,
                observations: count,
            };
            (id, score)
        })
        .collect()
}

/// Unweighted mean of indicator scores per pillar (0–4)
pub fn pillar_scores(indicators: &IndexMap<String, IndicatorScore>) -> IndexMap<String, f64> {
    let mut sums: IndexMap<String, (f64, usize)> = IndexMap::new();
    for indicator in indicators.values() {
        let Some(pillar) = &indicator.pillar else {
            continue;
        };
        let slot = sums.entry(pillar.clone()).or_insert((0.0, 0));
        slot.0 += indicator.score;
        slot.1 += 1;
    }
    sums.into_iter()
        .map(|(pillar, (sum, count))| (pillar, sum / count as f64))
        .collect()
}

/// Index scores (0–100) for every index with positive pillar weights
pub fn index_scores(
    config: &ScalesConfig,
    pillars: &IndexMap<String, f64>,
) -> IndexMap<String, f64> {
    let mut out = IndexMap::new();
    for (key, index) in &config.indices {
        let Some(weights) = normalize(&index.pillar_weights) else {
            debug!("Index {} has no usable pillar weights", key);
            continue;
        };
        let raw: f64 = weights
            .iter()
            .filter_map(|(pillar, w)| pillars.get(*pillar).map(|score| score * w))
            .sum();
        out.insert(key.clone(), Scale::Pillar.to_composite(raw));
    }
    out
}

/// Global score (0–100), `None` when no index weights are configured
pub fn global_score(config: &ScalesConfig, indices: &IndexMap<String, f64>) -> Option<f64> {
    let weights = normalize(&config.global_score.index_weights)?;
    Some(
        weights
            .iter()
            .filter_map(|(key, w)| indices.get(*key).map(|score| score * w))
            .sum(),
    )
}

fn composite(name: Option<String>, score: Option<f64>) -> CompositeScore {
    CompositeScore {
        name,
        score: score.map(|s| RawScore::Number(round_to(s, 1))),
        band: score.map(|s| Band::from_score(s, Scale::Composite).to_string()),
        summary: Some(String::new()),
    }
}

/// Compute a global state snapshot from ledger evidence
pub fn roll_up_state(
    entries: &[LedgerEntry],
    config: Option<&ScalesConfig>,
    expectations: &Expectations,
) -> GlobalState {
    let indicators = indicator_scores(entries, config);
    let pillars = pillar_scores(&indicators);
    debug!(
        "Rolled up {} indicators into {} pillars",
        indicators.len(),
        pillars.len()
    );

    let (indices, global) = match config {
        Some(config) => {
            let indices = index_scores(config, &pillars);
            let global = global_score(config, &indices);
            (indices, global)
        }
        None => (IndexMap::new(), None),
    };

    let pillars_out = expectations
        .pillars
        .iter()
        .map(|code| {
            let score = pillars.get(code).copied();
            PillarState {
                code: Some(code.clone()),
                name: config.and_then(|c| c.pillar_name(code)).map(str::to_string),
                score: score.map(|s| RawScore::Number(round_to(s, 2))),
                band: score.map(|s| Band::from_score(s, Scale::Pillar).to_string()),
            }
        })
        .collect();

    let indices_out = indices
        .iter()
        .map(|(key, score)| {
            let name = config
                .and_then(|c| c.indices.get(key))
                .and_then(|i| i.name.clone());
            (key.clone(), composite(name, Some(*score)))
        })
        .collect();

    GlobalState {
        version: config.and_then(|c| c.version.clone()),
        as_of: config.and_then(|c| c.as_of.clone()),
        global: Some(composite(None, global)),
        indices: Some(indices_out),
        pillars: Some(pillars_out),
        tripwires: Vec::new(),
    }
}

/// Compute one module snapshot from component evidence.
///
/// Component weights and `max_raw` come from the module's configuration;
/// built-in modules use weight 1 and `max_raw` 20.
pub fn roll_up_module(
    key: &str,
    evidence: &[ComponentEvidence],
    config: Option<&ScalesConfig>,
    expectations: &Expectations,
) -> Result<ModuleState, RollupError> {
    let expected = expectations
        .modules
        .get(key)
        .ok_or_else(|| RollupError::UnknownModule(key.to_string()))?;
    let module_config = config
        .and_then(|c| c.modules.as_ref())
        .and_then(|m| m.get(key));

    // (code, name, weight)
    let components: Vec<(String, String, f64)> = match module_config {
        Some(mc) => mc
            .components
            .iter()
            .filter_map(|c| {
                let code = c.code.clone()?;
                let name = c.name.clone().unwrap_or_else(|| code.clone());
                Some((code, name, c.weight))
            })
            .collect(),
        None => expected
            .components
            .iter()
            .map(|code| (code.clone(), code.clone(), 1.0))
            .collect(),
    };
    let max_raw = module_config.map_or(DEFAULT_MAX_RAW, |mc| mc.scoring.max_raw);

    let mut sums: IndexMap<&str, (f64, usize)> = IndexMap::new();
    for row in evidence {
        let (Some(code), Some(score)) = (row.component_code.as_deref(), row.score_0_4.as_ref())
        else {
            continue;
        };
        if let Ok(score) = score.check(Scale::Indicator) {
            let slot = sums.entry(code).or_insert((0.0, 0));
            slot.0 += score;
            slot.1 += 1;
        }
    }

    let mut raw_total = 0.0;
    let mut components_out = Vec::with_capacity(components.len());
    for (code, name, weight) in components {
        let mean = sums.get(code.as_str()).map(|(sum, n)| sum / *n as f64);
        if let Some(mean) = mean {
            raw_total += mean * weight;
        }
        components_out.push(ComponentState {
            code: Some(code),
            name: Some(name),
            score_0_4: mean.map(|m| RawScore::Number(round_to(m, 2))),
            band: mean.map(|m| Band::from_score(m, Scale::Indicator).to_string()),
            summary: Some(String::new()),
        });
    }

    let score = (max_raw > 0.0).then(|| raw_total / max_raw * 100.0);
    debug!("Module {} raw total {} / {}", key, raw_total, max_raw);

    Ok(ModuleState {
        version: config.and_then(|c| c.version.clone()),
        as_of: config.and_then(|c| c.as_of.clone()),
        key: Some(key.to_string()),
        name: Some(expected.name.clone()),
        score: score.map(|s| RawScore::Number(round_to(s, 1))),
        band: score.map(|s| Band::from_score(s, Scale::Composite).to_string()),
        summary: Some(String::new()),
        components: components_out,
        notes: Vec::new(),
    })
}
