//! SCALES - composite risk scoring and snapshot validation
//!
//! A layered model turns curated observations into banded risk scores:
//! indicators roll up into pillars, pillars into indices, indices into one
//! global score, with sector modules scored alongside. This crate checks
//! the persisted snapshots of that model against a declarative
//! configuration and can recompute the roll-ups from evidence.

pub mod config;
pub mod models;
pub mod reporters;
pub mod scoring;
pub mod snapshot;
pub mod validate;
