//! Unit tests for tier module

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::types::{DealTier, LiquidityGrade};

    const ALL_TIERS: [DealTier; 4] = [DealTier::Sleep, DealTier::Flip, DealTier::Hit, DealTier::Grail];
    const ALL_GRADES: [LiquidityGrade; 4] = [
        LiquidityGrade::High,
        LiquidityGrade::Medium,
        LiquidityGrade::Low,
        LiquidityGrade::Illiquid,
    ];

    #[test]
    fn test_grail_requires_profit_and_confidence() {
        assert_eq!(classify_tier(45.0, 0.90, LiquidityGrade::High), DealTier::Grail);
    }

    #[test]
    fn test_low_confidence_grail_downgrades_to_hit() {
        assert_eq!(classify_tier(45.0, 0.70, LiquidityGrade::High), DealTier::Hit);
    }

    #[test]
    fn test_profit_boundary_belongs_to_lower_tier() {
        assert_eq!(classify_tier(40.0, 0.85, LiquidityGrade::High), DealTier::Hit);
        assert_eq!(classify_tier(25.0, 0.90, LiquidityGrade::High), DealTier::Flip);
        assert_eq!(classify_tier(15.0, 0.90, LiquidityGrade::High), DealTier::Sleep);
    }

    #[test]
    fn test_confidence_boundary_is_inclusive() {
        assert_eq!(classify_base_tier(41.0, 0.85), DealTier::Grail);
        assert_eq!(classify_base_tier(41.0, 0.849), DealTier::Hit);
        assert_eq!(classify_base_tier(30.0, 0.65), DealTier::Hit);
        assert_eq!(classify_base_tier(30.0, 0.649), DealTier::Flip);
    }

    #[test]
    fn test_confidence_shortfall_steps_down_until_met() {
        // Grail profit, confidence short of HIT as well: lands on FLIP
        assert_eq!(classify_base_tier(45.0, 0.50), DealTier::Flip);
        // FLIP accepts any confidence
        assert_eq!(classify_base_tier(20.0, 0.0), DealTier::Flip);
    }

    #[test]
    fn test_nan_confidence_never_above_flip() {
        assert_eq!(classify_base_tier(80.0, f64::NAN), DealTier::Flip);
    }

    #[test]
    fn test_low_profit_is_sleep() {
        assert_eq!(classify_base_tier(10.0, 0.99), DealTier::Sleep);
        assert_eq!(classify_base_tier(-20.0, 0.99), DealTier::Sleep);
    }

    #[test]
    fn test_profit_only_bands() {
        assert_eq!(classify_tier_by_profit(45.0), Some(DealTier::Grail));
        assert_eq!(classify_tier_by_profit(40.0), Some(DealTier::Hit));
        assert_eq!(classify_tier_by_profit(25.01), Some(DealTier::Hit));
        assert_eq!(classify_tier_by_profit(25.0), Some(DealTier::Flip));
        assert_eq!(classify_tier_by_profit(15.0), Some(DealTier::Sleep));
        assert_eq!(classify_tier_by_profit(5.0), Some(DealTier::Sleep));
        assert_eq!(classify_tier_by_profit(4.99), None);
        assert_eq!(classify_tier_by_profit(-10.0), None);
    }

    #[test]
    fn test_liquidity_illiquid_forces_sleep() {
        for tier in ALL_TIERS {
            assert_eq!(adjust_tier_for_liquidity(tier, LiquidityGrade::Illiquid), DealTier::Sleep);
        }
    }

    #[test]
    fn test_liquidity_low_caps_at_flip() {
        assert_eq!(adjust_tier_for_liquidity(DealTier::Grail, LiquidityGrade::Low), DealTier::Flip);
        assert_eq!(adjust_tier_for_liquidity(DealTier::Hit, LiquidityGrade::Low), DealTier::Flip);
        assert_eq!(adjust_tier_for_liquidity(DealTier::Flip, LiquidityGrade::Low), DealTier::Flip);
        assert_eq!(adjust_tier_for_liquidity(DealTier::Sleep, LiquidityGrade::Low), DealTier::Sleep);
    }

    #[test]
    fn test_liquidity_medium_only_demotes_grail() {
        assert_eq!(adjust_tier_for_liquidity(DealTier::Grail, LiquidityGrade::Medium), DealTier::Hit);
        assert_eq!(adjust_tier_for_liquidity(DealTier::Hit, LiquidityGrade::Medium), DealTier::Hit);
        assert_eq!(adjust_tier_for_liquidity(DealTier::Flip, LiquidityGrade::Medium), DealTier::Flip);
    }

    #[test]
    fn test_liquidity_high_is_identity() {
        for tier in ALL_TIERS {
            assert_eq!(adjust_tier_for_liquidity(tier, LiquidityGrade::High), tier);
        }
    }

    #[test]
    fn test_liquidity_adjustment_idempotent_and_never_promotes() {
        for tier in ALL_TIERS {
            for grade in ALL_GRADES {
                let once = adjust_tier_for_liquidity(tier, grade);
                let twice = adjust_tier_for_liquidity(once, grade);
                assert_eq!(once, twice, "{:?} / {:?} not idempotent", tier, grade);
                assert!(once <= tier, "{:?} / {:?} promoted to {:?}", tier, grade, once);
            }
        }
    }

    #[test]
    fn test_grail_needs_liquid_market() {
        assert_eq!(classify_tier(60.0, 0.95, LiquidityGrade::Medium), DealTier::Hit);
        assert_eq!(classify_tier(60.0, 0.95, LiquidityGrade::Low), DealTier::Flip);
        assert_eq!(classify_tier(60.0, 0.95, LiquidityGrade::Illiquid), DealTier::Sleep);
    }

    #[test]
    fn test_tier_rank_ordering() {
        assert!(DealTier::Sleep < DealTier::Flip);
        assert!(DealTier::Flip < DealTier::Hit);
        assert!(DealTier::Hit < DealTier::Grail);
    }
}
