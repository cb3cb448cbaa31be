//! Deterministic heart-disease risk scoring.
//!
//! [`score`] maps a validated [`RiskInput`] to a [`RiskOutput`] with no I/O
//! and no shared state, so it can be called concurrently from any number of
//! request handlers. Raw request bodies go through [`RiskInput::from_json`]
//! first; the scorer itself never fails.

pub mod error;
pub mod models;
pub mod scorer;
pub mod validation;

pub use error::ScoreError;
pub use models::*;
pub use scorer::{
    breakdown, chest_pain_label, key_risk_factors, probability_from_score, score, sex_label,
    MAX_PROBABILITY, MAX_SCORE, MIN_PROBABILITY, NO_RISK_FACTORS,
};
