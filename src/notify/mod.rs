//! Deal alerts
//!
//! Only user-visible GRAIL and HIT deals are alerted. Delivery channels
//! implement [`DealAlerter`]; [`LogAlerter`] writes the formatted alert to the
//! log.


use crate::error::Result;
use crate::types::{DealRecord, DealTier};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Alert payload derived from a persisted deal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealAlert {
    pub listing_id: String,
    pub card_name: String,
    pub title: String,
    pub tier: DealTier,
    pub total_cost: Decimal,
    pub market_value: Decimal,
    pub profit: Decimal,
    pub profit_percent: f64,
    pub confidence: f64,
}

impl DealAlert {
    /// `None` unless the deal is visible and GRAIL or HIT.
    pub fn from_record(deal: &DealRecord) -> Option<Self> {
        if !deal.visible || !deal.tier.is_alertable() {
            return None;
        }
        Some(Self {
            listing_id: deal.listing_id.clone(),
            card_name: deal.card_name.clone(),
            title: deal.title.clone(),
            tier: deal.tier,
            total_cost: deal.total_cost,
            market_value: deal.market_value,
            profit: deal.profit,
            profit_percent: deal.profit_percent,
            confidence: deal.confidence,
        })
    }

    pub fn format_message(&self) -> String {
        let icon = match self.tier {
            DealTier::Grail => "💎",
            DealTier::Hit => "🎯",
            DealTier::Flip => "🔁",
            DealTier::Sleep => "💤",
        };
        format!(
            "{} {} {}\n{}\nCost £{} | Market £{} | Profit £{} ({:.1}%)\nConfidence {:.0}% | Item {}",
            icon,
            self.tier,
            self.card_name,
            self.title,
            self.total_cost.round_dp(2),
            self.market_value.round_dp(2),
            self.profit.round_dp(2),
            self.profit_percent,
            self.confidence * 100.0,
            self.listing_id
        )
    }
}

/// Delivery channel for deal alerts
#[async_trait]
pub trait DealAlerter: Send + Sync {
    async fn alert(&self, alert: &DealAlert) -> Result<()>;
}

/// Writes alerts to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlerter;

#[async_trait]
impl DealAlerter for LogAlerter {
    async fn alert(&self, alert: &DealAlert) -> Result<()> {
        tracing::info!("🚨 Deal alert\n{}", alert.format_message());
        Ok(())
    }
}
