//! Deal tier classification and liquidity adjustment
//!
//! Two tier tables live here and are not interchangeable:
//! - [`classify_tier`]: profit + confidence, then liquidity. Used by the scanner.
//! - [`classify_tier_by_profit`]: profit bands only, with a 5% floor below
//!   which there is no tier.

#[cfg(test)]
mod tests;

use crate::types::{DealTier, LiquidityGrade};

pub const GRAIL_MIN_PROFIT: f64 = 40.0;
pub const HIT_MIN_PROFIT: f64 = 25.0;
pub const FLIP_MIN_PROFIT: f64 = 15.0;
/// Profit-only table: below this there is no tier at all
pub const SLEEP_MIN_PROFIT: f64 = 5.0;

pub const GRAIL_MIN_CONFIDENCE: f64 = 0.85;
pub const HIT_MIN_CONFIDENCE: f64 = 0.65;

fn min_confidence(tier: DealTier) -> f64 {
    match tier {
        DealTier::Grail => GRAIL_MIN_CONFIDENCE,
        DealTier::Hit => HIT_MIN_CONFIDENCE,
        DealTier::Flip | DealTier::Sleep => 0.0,
    }
}

fn next_lower(tier: DealTier) -> DealTier {
    match tier {
        DealTier::Grail => DealTier::Hit,
        DealTier::Hit => DealTier::Flip,
        DealTier::Flip | DealTier::Sleep => DealTier::Sleep,
    }
}

fn tier_for_profit(profit_percent: f64) -> DealTier {
    if profit_percent > GRAIL_MIN_PROFIT {
        DealTier::Grail
    } else if profit_percent > HIT_MIN_PROFIT {
        DealTier::Hit
    } else if profit_percent > FLIP_MIN_PROFIT {
        DealTier::Flip
    } else {
        DealTier::Sleep
    }
}

/// Tier from profit and confidence, before liquidity.
///
/// Profit thresholds are strict: a boundary value belongs to the lower tier.
/// When confidence is short of a tier's requirement the listing steps down
/// one tier at a time until the requirement is met (FLIP and SLEEP accept any
/// confidence), so it is never rejected here.
pub fn classify_base_tier(profit_percent: f64, confidence: f64) -> DealTier {
    let mut tier = tier_for_profit(profit_percent);
    // Written so NaN confidence fails the check and lands on FLIP or lower
    while tier > DealTier::Flip && !(confidence >= min_confidence(tier)) {
        tier = next_lower(tier);
    }
    tier
}

/// Full classification: base tier capped by liquidity.
pub fn classify_tier(profit_percent: f64, confidence: f64, liquidity: LiquidityGrade) -> DealTier {
    adjust_tier_for_liquidity(classify_base_tier(profit_percent, confidence), liquidity)
}

/// Profit-only table: GRAIL >40, HIT (25,40], FLIP (15,25], SLEEP [5,15].
/// Returns `None` below 5%.
pub fn classify_tier_by_profit(profit_percent: f64) -> Option<DealTier> {
    if profit_percent >= SLEEP_MIN_PROFIT {
        Some(tier_for_profit(profit_percent))
    } else {
        None
    }
}

/// Demote a tier according to resale liquidity. Never promotes.
///
/// - illiquid: always SLEEP
/// - low: GRAIL and HIT capped at FLIP
/// - medium: GRAIL becomes HIT
/// - high: unchanged
pub fn adjust_tier_for_liquidity(tier: DealTier, liquidity: LiquidityGrade) -> DealTier {
    match liquidity {
        LiquidityGrade::Illiquid => DealTier::Sleep,
        LiquidityGrade::Low => tier.min(DealTier::Flip),
        LiquidityGrade::Medium => tier.min(DealTier::Hit),
        LiquidityGrade::High => tier,
    }
}
