//! SCALES scoring model
//!
//! Scores live on two scales: indicators, components and pillars on 0–4,
//! indices, modules and the global score on 0–100. Both map onto the same
//! five risk bands.
//!
//! - [`scale`]: range checks and banding for individual scores
//! - [`rollup`]: forward computation from evidence to composites

pub mod rollup;
mod scale;

pub use rollup::{
    global_score, index_scores, indicator_scores, pillar_scores, roll_up_module, roll_up_state,
    ComponentEvidence, IndicatorScore, RollupError,
};
pub use scale::{Band, RawScore, Scale, ScoreError};
