//! Trading Card Deal Scanner
//!
//! Polls a marketplace for card listings, matches them against a reference
//! catalog and flags underpriced ones.
//!
//! ## Architecture
//!
//! ```text
//! ListingSource → Dedup → Extract → Match/Confidence → Gate → Pricing
//!                                                                ↓
//!   Alerter ← Sink ← Tier/Liquidity ← Detail fetch (Budget + RateLimit)
//! ```

pub mod budget;
pub mod client;
pub mod confidence;
pub mod config;
pub mod dedup;
pub mod enrichment;
pub mod error;
pub mod extract;
pub mod matching;
pub mod notify;
pub mod pricing;
pub mod ratelimit;
pub mod scanner;
pub mod testing;
pub mod tier;
pub mod types;
