//! Public evidence ledger rows

use crate::scoring::RawScore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields every ledger row must carry with a non-empty value
pub const REQUIRED_LEDGER_FIELDS: &[&str] = &[
    "id",
    "date",
    "pillar",
    "indicator_id",
    "score_0_4",
    "short_reason",
    "source_type",
];

/// A scalar ledger field as written by the curator.
///
/// Ids and dates are usually strings but occasionally arrive as numbers;
/// both are accepted and displayed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LedgerValue {
    Text(String),
    Number(serde_json::Number),
    Other(serde_json::Value),
}

impl LedgerValue {
    pub fn is_blank(&self) -> bool {
        matches!(self, LedgerValue::Text(s) if s.is_empty())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LedgerValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for LedgerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerValue::Text(s) => write!(f, "{}", s),
            LedgerValue::Number(n) => write!(f, "{}", n),
            LedgerValue::Other(v) => write!(f, "{}", v),
        }
    }
}

/// One row of `scales_ledger_public.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(default)]
    pub id: Option<LedgerValue>,
    #[serde(default)]
    pub date: Option<LedgerValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<LedgerValue>,
    #[serde(default)]
    pub pillar: Option<LedgerValue>,
    #[serde(default)]
    pub indicator_id: Option<LedgerValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator_label: Option<LedgerValue>,
    #[serde(default)]
    pub score_0_4: Option<RawScore>,
    #[serde(default)]
    pub short_reason: Option<LedgerValue>,
    #[serde(default)]
    pub source_type: Option<LedgerValue>,
}

impl LedgerEntry {
    /// Whether a required field holds a usable value (not absent, null or "")
    pub fn has_field(&self, field: &str) -> bool {
        let present = |v: &Option<LedgerValue>| v.as_ref().is_some_and(|v| !v.is_blank());
        match field {
            "id" => present(&self.id),
            "date" => present(&self.date),
            "actor" => present(&self.actor),
            "pillar" => present(&self.pillar),
            "indicator_id" => present(&self.indicator_id),
            "indicator_label" => present(&self.indicator_label),
            "score_0_4" => self.score_0_4.as_ref().is_some_and(|s| !s.is_blank()),
            "short_reason" => present(&self.short_reason),
            "source_type" => present(&self.source_type),
            _ => false,
        }
    }

    /// Required fields this row lacks, in canonical order
    pub fn missing_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        REQUIRED_LEDGER_FIELDS
            .iter()
            .copied()
            .filter(move |f| !self.has_field(f))
    }

    /// Row id for diagnostics, `UNKNOWN` when absent
    pub fn display_id(&self) -> String {
        match &self.id {
            Some(id) if !id.is_blank() => id.to_string(),
            _ => "UNKNOWN".to_string(),
        }
    }

    /// The score when it is present, non-empty and numeric
    pub fn numeric_score(&self) -> Option<f64> {
        self.score_0_4.as_ref().and_then(RawScore::as_f64)
    }
}
