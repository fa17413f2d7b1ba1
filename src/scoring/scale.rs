//! Score scales, raw score values and risk bands

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The numeric scale a score is declared on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// Indicator and module component scores (0–4)
    Indicator,
    /// Aggregated pillar scores (0–4, continuous)
    Pillar,
    /// Index, module and global composites (0–100)
    Composite,
}

impl Scale {
    /// Upper bound of the scale (the lower bound is always 0)
    pub fn max(&self) -> f64 {
        match self {
            Scale::Indicator | Scale::Pillar => 4.0,
            Scale::Composite => 100.0,
        }
    }

    /// Whether `value` lies inside the closed range of this scale
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && (0.0..=self.max()).contains(&value)
    }

    /// Range label used in diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            Scale::Indicator | Scale::Pillar => "0–4",
            Scale::Composite => "0–100",
        }
    }

    /// Convert a value on this scale to the 0–100 composite scale
    pub fn to_composite(&self, value: f64) -> f64 {
        value * (Scale::Composite.max() / self.max())
    }
}

/// Why a raw score cannot be accepted on its scale
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("not numeric: {0}")]
    NotNumeric(String),

    #[error("{value} outside {}", .scale.label())]
    OutOfRange { value: f64, scale: Scale },
}

/// A score exactly as it was written in a snapshot.
///
/// Curators author snapshots by hand, so a score field may hold a number,
/// a numeric string, or something else entirely (`"n/a"`, `true`, `[]`).
/// Decoding never fails on the value itself; the range check does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScore {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawScore {
    /// Numeric value, accepting numeric strings such as `"2"` or `" 3.5"`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawScore::Number(v) => Some(*v),
            RawScore::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            RawScore::Other(_) => None,
        }
    }

    /// True for an empty string, which curators use to mean "not scored yet"
    pub fn is_blank(&self) -> bool {
        matches!(self, RawScore::Text(s) if s.is_empty())
    }

    /// Check the value against `scale`, returning the number when it fits
    pub fn check(&self, scale: Scale) -> Result<f64, ScoreError> {
        let value = self
            .as_f64()
            .ok_or_else(|| ScoreError::NotNumeric(self.to_string()))?;
        if scale.contains(value) {
            Ok(value)
        } else {
            Err(ScoreError::OutOfRange { value, scale })
        }
    }
}

impl fmt::Display for RawScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawScore::Number(v) => write!(f, "{}", v),
            RawScore::Text(s) => write!(f, "{}", s),
            RawScore::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for RawScore {
    fn from(value: f64) -> Self {
        RawScore::Number(value)
    }
}

/// Five-level ordinal risk band.
///
/// Bands are derived from a score by threshold on the 0–100 scale:
/// `[0,20)` stable, `[20,40)` watch, `[40,60)` elevated, `[60,80)` severe,
/// `[80,100]` crisis. Scores on the 0–4 scales are converted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Stable,
    Watch,
    Elevated,
    Severe,
    Crisis,
}

impl Band {
    /// Derive the band for `score` declared on `scale`
    pub fn from_score(score: f64, scale: Scale) -> Band {
        match scale.to_composite(score) {
            s if s < 20.0 => Band::Stable,
            s if s < 40.0 => Band::Watch,
            s if s < 60.0 => Band::Elevated,
            s if s < 80.0 => Band::Severe,
            _ => Band::Crisis,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Stable => write!(f, "stable"),
            Band::Watch => write!(f, "watch"),
            Band::Elevated => write!(f, "elevated"),
            Band::Severe => write!(f, "severe"),
            Band::Crisis => write!(f, "crisis"),
        }
    }
}
