//! Match confidence scoring and gating
//!
//! The composite is a weighted geometric mean, so one weak dimension drags the
//! whole score down instead of being averaged away by strong ones.


use serde::{Deserialize, Serialize};

/// Per-dimension similarity between a listing and a catalog candidate.
///
/// Every field is required; missing evidence is encoded as a fixed neutral
/// or zero value by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceSignals {
    pub name: f64,
    pub number: f64,
    pub denominator: f64,
    pub expansion: f64,
    pub variant: f64,
    pub normalization: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    /// Weighted geometric mean in [0, 1], rounded to 3 decimals
    pub composite: f64,
    pub signals: ConfidenceSignals,
}

pub const WEIGHT_NAME: f64 = 0.30;
pub const WEIGHT_DENOMINATOR: f64 = 0.25;
pub const WEIGHT_NUMBER: f64 = 0.15;
pub const WEIGHT_EXPANSION: f64 = 0.10;
pub const WEIGHT_VARIANT: f64 = 0.10;
pub const WEIGHT_NORMALIZATION: f64 = 0.10;

/// Floor applied before `ln` so a zero score stays finite
const MIN_SIGNAL: f64 = 0.01;

fn clamp_signal(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_SIGNAL;
    }
    value.clamp(MIN_SIGNAL, 1.0)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Combine the six dimensions into one composite score.
///
/// Out-of-range inputs are clamped to [0.01, 1.0], never rejected.
pub fn score_confidence(signals: &ConfidenceSignals) -> ConfidenceResult {
    let weighted = [
        (signals.name, WEIGHT_NAME),
        (signals.denominator, WEIGHT_DENOMINATOR),
        (signals.number, WEIGHT_NUMBER),
        (signals.expansion, WEIGHT_EXPANSION),
        (signals.variant, WEIGHT_VARIANT),
        (signals.normalization, WEIGHT_NORMALIZATION),
    ];

    let total_weight: f64 = weighted.iter().map(|(_, w)| w).sum();
    let log_sum: f64 = weighted
        .iter()
        .map(|(score, weight)| weight * clamp_signal(*score).ln())
        .sum();

    ConfidenceResult {
        composite: round3((log_sum / total_weight).exp()),
        signals: *signals,
    }
}

/// Action tier for a composite confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Reject,
    /// Kept for offline training, never shown to users
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    /// Whether matches at this tier may appear in user-facing output
    pub fn is_user_visible(&self) -> bool {
        matches!(self, ConfidenceTier::High | ConfidenceTier::Medium)
    }
}

pub const HIGH_CONFIDENCE: f64 = 0.85;
pub const MEDIUM_CONFIDENCE: f64 = 0.65;
pub const GATE_THRESHOLD: f64 = 0.45;

/// Bucket a composite score. Boundaries belong to the higher tier.
pub fn classify_confidence(composite: f64) -> ConfidenceTier {
    if composite >= HIGH_CONFIDENCE {
        ConfidenceTier::High
    } else if composite >= MEDIUM_CONFIDENCE {
        ConfidenceTier::Medium
    } else if composite >= GATE_THRESHOLD {
        ConfidenceTier::Low
    } else {
        ConfidenceTier::Reject
    }
}

/// Whether a match is kept at all. Rejected matches are dropped before
/// persistence; callers must additionally hide `Low` matches from users.
pub fn passes_gate(composite: f64) -> bool {
    composite >= GATE_THRESHOLD
}
