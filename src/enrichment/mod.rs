//! Enrichment gate
//!
//! Decides whether a title-only match is worth a detail fetch, which costs one
//! unit of the daily budget.


use crate::budget::LOW_BUDGET_THRESHOLD;
use serde::{Deserialize, Serialize};

pub const ENRICH_MIN_CONFIDENCE: f64 = 0.50;
pub const BASE_PROFIT_THRESHOLD: f64 = 15.0;
/// Raised bar once the daily budget is running low
pub const LOW_BUDGET_PROFIT_THRESHOLD: f64 = 25.0;

/// First-pass facts about a listing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrichmentInput {
    pub is_duplicate: bool,
    pub confidence: f64,
    pub title_only_profit_percent: f64,
    pub remaining_budget: u32,
}

/// Outcome with every condition reported, not just the first failure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentDecision {
    pub enrich: bool,
    pub not_duplicate: bool,
    pub confidence_ok: bool,
    pub profit_ok: bool,
    pub profit_threshold: f64,
}

impl EnrichmentDecision {
    /// Short reason for logs
    pub fn reason(&self) -> &'static str {
        if self.enrich {
            "enrich"
        } else if !self.not_duplicate {
            "duplicate"
        } else if !self.confidence_ok {
            "low confidence"
        } else {
            "insufficient profit"
        }
    }
}

pub fn profit_threshold(remaining_budget: u32) -> f64 {
    if remaining_budget < LOW_BUDGET_THRESHOLD {
        LOW_BUDGET_PROFIT_THRESHOLD
    } else {
        BASE_PROFIT_THRESHOLD
    }
}

/// Enrich iff not a duplicate, confidence >= 0.50 and title-only profit
/// clears the budget-dependent threshold.
pub fn should_enrich(input: &EnrichmentInput) -> EnrichmentDecision {
    let threshold = profit_threshold(input.remaining_budget);

    let not_duplicate = !input.is_duplicate;
    let confidence_ok = input.confidence >= ENRICH_MIN_CONFIDENCE;
    let profit_ok = input.title_only_profit_percent >= threshold;

    EnrichmentDecision {
        enrich: not_duplicate && confidence_ok && profit_ok,
        not_duplicate,
        confidence_ok,
        profit_ok,
        profit_threshold: threshold,
    }
}
