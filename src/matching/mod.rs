//! Listing-to-catalog candidate matching
//!
//! Turns extracted listing signals and one catalog candidate into the six
//! confidence dimensions, then picks the strongest candidate.


use crate::confidence::{score_confidence, ConfidenceResult, ConfidenceSignals};
use crate::extract::ExtractedSignals;
use crate::types::CatalogCandidate;
use std::collections::HashSet;

/// Score used when either side lacks the evidence for a dimension
pub const NEUTRAL_SIGNAL: f64 = 0.5;

const EXPANSION_EXACT: f64 = 1.0;
const EXPANSION_PREFIX: f64 = 0.7;
const EXPANSION_MISMATCH: f64 = 0.1;

const VARIANT_MATCH: f64 = 1.0;
const VARIANT_UNKNOWN: f64 = 0.7;
const VARIANT_MISMATCH: f64 = 0.3;

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Share of the candidate's name tokens found in the listing
fn name_score(signals: &ExtractedSignals, candidate: &CatalogCandidate) -> f64 {
    let wanted: Vec<String> = tokens(&candidate.name).collect();
    if wanted.is_empty() {
        return 0.0;
    }

    let name_text = signals.name_text();
    let have: HashSet<String> = tokens(&name_text).chain(tokens(&signals.title.cleaned)).collect();
    let hits = wanted.iter().filter(|t| have.contains(*t)).count();
    hits as f64 / wanted.len() as f64
}

fn exact_or_neutral(found: Option<u32>, expected: Option<u32>) -> f64 {
    match (found, expected) {
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(_), Some(_)) => 0.0,
        _ => NEUTRAL_SIGNAL,
    }
}

fn expansion_score(signals: &ExtractedSignals, candidate: &CatalogCandidate) -> f64 {
    let expansion = candidate.expansion_name.trim().to_lowercase();
    let code = candidate.expansion_code.trim().to_lowercase();

    let set_aspect = signals.structured.set.as_deref().map(|s| s.trim().to_lowercase());
    if let Some(set) = set_aspect.as_deref() {
        if !expansion.is_empty() && (set == expansion || set.contains(&expansion) || expansion.contains(set)) {
            return EXPANSION_EXACT;
        }
        if !code.is_empty() && set == code {
            return EXPANSION_EXACT;
        }
    }

    if !expansion.is_empty() && signals.title.cleaned.contains(&expansion) {
        return EXPANSION_EXACT;
    }

    let prefix = signals
        .card_number
        .as_ref()
        .and_then(|n| n.prefix.as_deref())
        .map(str::to_lowercase);
    if let Some(prefix) = prefix {
        if !code.is_empty() && code.starts_with(&prefix) {
            return EXPANSION_PREFIX;
        }
    }

    if set_aspect.is_some() {
        EXPANSION_MISMATCH
    } else {
        NEUTRAL_SIGNAL
    }
}

fn variant_score(signals: &ExtractedSignals, candidate: &CatalogCandidate) -> f64 {
    let Some(variant) = signals.variant.as_deref() else {
        return NEUTRAL_SIGNAL;
    };
    if candidate.variants.is_empty() {
        return VARIANT_UNKNOWN;
    }
    let listed = candidate
        .variants
        .iter()
        .any(|v| v.trim().eq_ignore_ascii_case(variant));
    if listed {
        VARIANT_MATCH
    } else {
        VARIANT_MISMATCH
    }
}

/// How much of the raw title survived cleaning
fn normalization_score(signals: &ExtractedSignals) -> f64 {
    let original = signals.title.original.trim().chars().count();
    if original == 0 {
        return 0.0;
    }
    let cleaned = signals.title.cleaned.chars().count();
    (cleaned as f64 / original as f64).min(1.0)
}

/// Build the six confidence dimensions for one candidate
pub fn build_signals(signals: &ExtractedSignals, candidate: &CatalogCandidate) -> ConfidenceSignals {
    let number = signals.card_number.as_ref();
    ConfidenceSignals {
        name: name_score(signals, candidate),
        number: exact_or_neutral(number.map(|n| n.number), candidate.number),
        denominator: exact_or_neutral(number.and_then(|n| n.denominator), candidate.printed_total),
        expansion: expansion_score(signals, candidate),
        variant: variant_score(signals, candidate),
        normalization: normalization_score(signals),
    }
}

/// A candidate together with its confidence
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: CatalogCandidate,
    pub confidence: ConfidenceResult,
}

/// Highest composite wins; the earlier candidate wins a tie.
pub fn best_candidate(signals: &ExtractedSignals, candidates: &[CatalogCandidate]) -> Option<ScoredCandidate> {
    let mut best: Option<ScoredCandidate> = None;
    for candidate in candidates {
        let confidence = score_confidence(&build_signals(signals, candidate));
        let better = best
            .as_ref()
            .map(|b| confidence.composite > b.confidence.composite)
            .unwrap_or(true);
        if better {
            best = Some(ScoredCandidate {
                candidate: candidate.clone(),
                confidence,
            });
        }
    }
    best
}
