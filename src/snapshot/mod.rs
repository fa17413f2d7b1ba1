//! Typed schemas for persisted SCALES snapshots
//!
//! Curators produce three kinds of JSON document out-of-band:
//! - the global state (`data/scales_state.json`)
//! - one state file per module (`data/modules/<KEY>_state.json`)
//! - the public evidence ledger (`data/scales_ledger_public.json`)
//!
//! Score fields decode as [`RawScore`] so that a bad value reaches the range
//! check instead of failing the whole document. Other fields decode
//! leniently: a wrong-typed section reads as absent and a scalar in a text
//! field keeps its JSON spelling. A file that is not JSON, or not an object,
//! is a structured [`SnapshotError`].

mod ledger;
mod lenient;

pub use ledger::{LedgerEntry, LedgerValue, REQUIRED_LEDGER_FIELDS};

use crate::scoring::RawScore;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Why a snapshot file could not be turned into a typed value
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("did not decode to {expected}")]
    Shape { expected: &'static str },

    #[error("does not match the snapshot schema: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Read a JSON file, returning `Ok(None)` when it does not exist
pub fn read_json(path: &Path) -> Result<Option<serde_json::Value>, SnapshotError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Snapshot not found: {}", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(SnapshotError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };
    let value = serde_json::from_str(&content).map_err(SnapshotError::Json)?;
    Ok(Some(value))
}

/// Decode a JSON object into a typed snapshot
pub fn decode_object<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, SnapshotError> {
    if !value.is_object() {
        return Err(SnapshotError::Shape {
            expected: "an object",
        });
    }
    serde_json::from_value(value).map_err(SnapshotError::Decode)
}

/// Global state snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalState {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,

    #[serde(default, deserialize_with = "lenient::object")]
    pub global: Option<CompositeScore>,

    #[serde(default, deserialize_with = "lenient::map")]
    pub indices: Option<IndexMap<String, CompositeScore>>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub pillars: Option<Vec<PillarState>>,

    #[serde(default, deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub tripwires: Vec<Tripwire>,
}

/// A 0–100 composite: the global block or one index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompositeScore {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub score: Option<RawScore>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub band: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: Option<String>,
}

/// One pillar roll-up (0–4)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PillarState {
    #[serde(default, deserialize_with = "lenient::text")]
    pub code: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,

    #[serde(default)]
    pub score: Option<RawScore>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub band: Option<String>,
}

/// A predefined condition flagged independently of averaged scores
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tripwire {
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub label: Option<String>,

    #[serde(default, deserialize_with = "lenient::flag")]
    pub triggered: bool,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Per-module state snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleState {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub key: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,

    #[serde(default)]
    pub score: Option<RawScore>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub band: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: Option<String>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub components: Vec<ComponentState>,

    #[serde(default, deserialize_with = "lenient::notes")]
    pub notes: Vec<String>,
}

/// One module component (0–4)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentState {
    #[serde(default, deserialize_with = "lenient::text")]
    pub code: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,

    #[serde(default)]
    pub score_0_4: Option<RawScore>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub band: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: Option<String>,
}

impl ModuleState {
    /// Components keyed by code; entries without a code are skipped and a
    /// later duplicate replaces an earlier one
    pub fn components_by_code(&self) -> IndexMap<&str, &ComponentState> {
        let mut by_code = IndexMap::new();
        for component in &self.components {
            if let Some(code) = component.code.as_deref() {
                by_code.insert(code, component);
            }
        }
        by_code
    }
}

impl GlobalState {
    /// Tripwires currently flagged as triggered
    pub fn triggered_tripwires(&self) -> impl Iterator<Item = &Tripwire> {
        self.tripwires.iter().filter(|t| t.triggered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_global_state_decodes_sample() {
        let state: GlobalState = decode_object(json!({
            "global": {"score": 42.5, "band": "elevated", "summary": ""},
            "indices": {"ILG": {"score": 50, "band": "elevated"}},
            "pillars": [{"code": "S", "name": "Structural", "score": 2.1}],
            "tripwires": [{"id": "T1", "label": "Court ruling defied", "triggered": true}]
        }))
        .expect("decode global state");

        let global = state.global.as_ref().expect("global block");
        assert_eq!(global.score, Some(RawScore::Number(42.5)));
        assert_eq!(state.indices.as_ref().expect("indices").len(), 1);
        assert_eq!(state.triggered_tripwires().count(), 1);
    }

    #[test]
    fn test_null_score_is_absent() {
        let pillar: PillarState =
            decode_object(json!({"code": "S", "score": null})).expect("decode pillar");
        assert!(pillar.score.is_none());
    }

    #[test]
    fn test_bad_score_value_still_decodes() {
        let module: ModuleState = decode_object(json!({
            "key": "M",
            "score": "n/a",
            "components": [{"code": "A", "score_0_4": [1, 2]}]
        }))
        .expect("decode module");
        assert_eq!(module.score, Some(RawScore::Text("n/a".into())));
        assert!(module.components[0].score_0_4.is_some());
    }

    #[test]
    fn test_non_object_is_shape_error() {
        let err = decode_object::<ModuleState>(json!([1, 2, 3])).expect_err("array rejected");
        assert!(matches!(err, SnapshotError::Shape { .. }));
    }

    #[test]
    fn test_scalar_text_fields_keep_their_spelling() {
        let module: ModuleState =
            decode_object(json!({"key": 7, "name": true, "band": 4, "summary": null}))
                .expect("decode module");
        assert_eq!(module.key.as_deref(), Some("7"));
        assert_eq!(module.name.as_deref(), Some("true"));
        assert_eq!(module.band.as_deref(), Some("4"));
        assert!(module.summary.is_none());
    }

    #[test]
    fn test_wrong_typed_sections_read_as_absent() {
        let state: GlobalState = decode_object(json!({
            "global": "high",
            "indices": [],
            "pillars": {"S": 2},
            "tripwires": null
        }))
        .expect("decode global state");
        assert!(state.global.is_none());
        assert!(state.indices.is_none());
        assert!(state.pillars.is_none());
        assert!(state.tripwires.is_empty());

        let module: ModuleState =
            decode_object(json!({"components": null, "notes": null})).expect("decode module");
        assert!(module.components.is_empty());
        assert!(module.notes.is_empty());
    }

    #[test]
    fn test_non_object_items_decode_as_empty() {
        let state: GlobalState = decode_object(json!({
            "indices": {"ILG": 50, "CCI": {"score": 20}},
            "pillars": ["S", {"code": "C", "score": 1}],
            "tripwires": [{"id": "T1", "triggered": "yes"}, 3]
        }))
        .expect("decode global state");

        let indices = state.indices.as_ref().expect("indices");
        assert!(indices["ILG"].score.is_none());
        assert_eq!(indices["CCI"].score, Some(RawScore::Number(20.0)));
        let pillars = state.pillars.as_ref().expect("pillars");
        assert!(pillars[0].code.is_none());
        assert_eq!(pillars[1].code.as_deref(), Some("C"));
        // Only a literal `true` triggers a tripwire
        assert_eq!(state.tripwires.len(), 2);
        assert_eq!(state.triggered_tripwires().count(), 0);
    }

    #[test]
    fn test_notes_drop_nulls() {
        let module: ModuleState =
            decode_object(json!({"notes": ["first", null, 2]})).expect("decode module");
        assert_eq!(module.notes, vec!["first", "2"]);
    }

    #[test]
    fn test_components_by_code_skips_uncoded() {
        let module: ModuleState = decode_object(json!({
            "components": [
                {"code": "A", "score_0_4": 1},
                {"name": "no code"},
                {"code": "A", "score_0_4": 3}
            ]
        }))
        .expect("decode module");
        let by_code = module.components_by_code();
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code["A"].score_0_4, Some(RawScore::Number(3.0)));
    }

    #[test]
    fn test_read_json_missing_file_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = read_json(&dir.path().join("absent.json")).expect("missing is not an error");
        assert!(loaded.is_none());
    }

    #[test]
    fn test_read_json_invalid_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").expect("write");
        let err = read_json(&path).expect_err("invalid JSON");
        assert!(matches!(err, SnapshotError::Json(_)));
    }

    #[test]
    fn test_read_json_directory_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_json(dir.path()).expect_err("a directory is not a file");
        assert!(matches!(err, SnapshotError::Io { .. }));
    }
}
