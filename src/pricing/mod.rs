//! Buyer fees and profit calculation
//!
//! All money is `Decimal` in the listing currency; conversion happens
//! upstream of the core.


use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Buyer protection fee bands: (band upper bound, marginal rate).
/// Nothing is charged on the portion above the last bound.
const FEE_BANDS: &[(Decimal, Decimal)] = &[
    (dec!(20), dec!(0.07)),
    (dec!(300), dec!(0.04)),
    (dec!(4000), dec!(0.02)),
];

const FEE_FLAT: Decimal = dec!(0.10);

/// Marketplace buyer protection fee for an item price.
///
/// Zero for non-positive prices, flat fee plus banded percentages otherwise,
/// and constant above the top band.
pub fn buyer_protection_fee(price: Decimal) -> Decimal {
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut fee = FEE_FLAT;
    let mut lower = Decimal::ZERO;
    for (upper, rate) in FEE_BANDS {
        if price <= lower {
            break;
        }
        let portion = price.min(*upper) - lower;
        fee += portion * rate;
        lower = *upper;
    }

    fee.round_dp(2)
}

/// Cost and margin of buying a listing and reselling at market value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    pub listing_price: Decimal,
    pub shipping: Decimal,
    pub fee: Decimal,
    pub total_cost: Decimal,
    pub market_value: Decimal,
    pub profit: Decimal,
    /// Profit as a percentage of total cost, 2 decimals
    pub profit_percent: f64,
}

pub fn calculate_profit(listing_price: Decimal, shipping: Decimal, market_value: Decimal) -> ProfitBreakdown {
    let fee = buyer_protection_fee(listing_price);
    let total_cost = listing_price + shipping + fee;
    let profit = market_value - total_cost;

    let profit_percent = if total_cost > Decimal::ZERO {
        (profit / total_cost * Decimal::ONE_HUNDRED)
            .round_dp(2)
            .to_f64()
            .unwrap_or(0.0)
    } else {
        0.0
    };

    ProfitBreakdown {
        listing_price,
        shipping,
        fee,
        total_cost,
        market_value,
        profit,
        profit_percent,
    }
}
