//! Core types shared across the scan pipeline

use crate::confidence::ConfidenceTier;
use crate::error::ScanError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seller metadata attached to a listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub username: String,
    #[serde(default)]
    pub feedback_score: Option<u32>,
    /// Positive feedback percentage (0-100)
    #[serde(default)]
    pub feedback_percent: Option<f64>,
}

/// Structured item specific ("aspect") from the marketplace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub name: String,
    pub value: String,
}

impl Aspect {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A marketplace listing as fetched. Never mutated after fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    /// Marketplace item ID
    pub id: String,
    pub title: String,
    /// Item price in listing currency
    pub price: Decimal,
    #[serde(default)]
    pub shipping: Decimal,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub seller: Seller,
    #[serde(default)]
    pub aspects: Vec<Aspect>,
    pub created_at: DateTime<Utc>,
}

/// Reference catalog entry returned by a candidate lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCandidate {
    pub id: String,
    pub name: String,
    pub expansion_name: String,
    /// Short expansion code, e.g. "sv3pt5"
    pub expansion_code: String,
    /// Printed set total (the denominator on the card)
    #[serde(default)]
    pub printed_total: Option<u32>,
    /// Collector number within the expansion
    #[serde(default)]
    pub number: Option<u32>,
    /// Known printings for this card, e.g. ["holo", "reverse holo"]
    #[serde(default)]
    pub variants: Vec<String>,
}

/// How easily a matched card resells. Computed outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquidityGrade {
    High,
    Medium,
    Low,
    Illiquid,
}

impl FromStr for LiquidityGrade {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(LiquidityGrade::High),
            "medium" => Ok(LiquidityGrade::Medium),
            "low" => Ok(LiquidityGrade::Low),
            "illiquid" => Ok(LiquidityGrade::Illiquid),
            other => Err(ScanError::Invalid(format!("unknown liquidity grade '{}'", other))),
        }
    }
}

impl fmt::Display for LiquidityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LiquidityGrade::High => "high",
            LiquidityGrade::Medium => "medium",
            LiquidityGrade::Low => "low",
            LiquidityGrade::Illiquid => "illiquid",
        };
        f.write_str(s)
    }
}

/// Deal actionability tier.
///
/// Variants are declared lowest-first so `Ord` follows rank:
/// SLEEP < FLIP < HIT < GRAIL. "No tier" is `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DealTier {
    Sleep,
    Flip,
    Hit,
    Grail,
}

impl DealTier {
    /// Tiers that trigger an operator alert
    pub fn is_alertable(&self) -> bool {
        matches!(self, DealTier::Grail | DealTier::Hit)
    }
}

impl fmt::Display for DealTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DealTier::Grail => "GRAIL",
            DealTier::Hit => "HIT",
            DealTier::Flip => "FLIP",
            DealTier::Sleep => "SLEEP",
        };
        f.write_str(s)
    }
}

/// Market value and liquidity for a matched card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Expected resale value, already in listing currency
    pub market_value: Decimal,
    pub liquidity: LiquidityGrade,
}

/// Finalized deal handed to the persistence sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealRecord {
    pub id: uuid::Uuid,
    pub listing_id: String,
    pub card_id: String,
    pub card_name: String,
    pub title: String,
    pub listing_price: Decimal,
    pub shipping: Decimal,
    pub fee: Decimal,
    pub total_cost: Decimal,
    pub market_value: Decimal,
    pub profit: Decimal,
    pub profit_percent: f64,
    pub tier: DealTier,
    pub confidence: f64,
    pub confidence_tier: ConfidenceTier,
    pub liquidity: LiquidityGrade,
    /// Whether a detail fetch refined this record
    pub enriched: bool,
    /// Low-confidence matches are kept for training but hidden from users
    pub visible: bool,
    pub created_at: DateTime<Utc>,
}
