//! External collaborators of the scan pipeline
//!
//! The core talks to the marketplace, the reference catalog, market pricing
//! and persistence only through these traits. File-backed implementations live
//! in [`file`], an HTTP detail fetcher in [`http`].

pub mod file;
pub mod http;

#[cfg(test)]
mod tests;

pub use crate::dedup::DedupStore;
pub use file::{JsonCatalog, JsonFileListingSource, JsonMarketData, JsonlDealSink, PassthroughDetailFetcher};
pub use http::HttpDetailFetcher;

use crate::error::Result;
use crate::extract::ExtractedSignals;
use crate::types::{CatalogCandidate, DealRecord, MarketSnapshot, RawListing};
use async_trait::async_trait;
use reqwest::header::HeaderMap;

/// Source of fresh marketplace listings
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_listings(&self) -> Result<Vec<RawListing>>;
}

/// Reference catalog search
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Cards that might be the one a listing describes. May be empty.
    async fn find_candidates(&self, signals: &ExtractedSignals) -> Result<Vec<CatalogCandidate>>;
}

/// Market value and liquidity for a catalog card
#[async_trait]
pub trait MarketData: Send + Sync {
    /// `None` when the card has no usable price.
    async fn snapshot(
        &self,
        candidate: &CatalogCandidate,
        condition: Option<&str>,
    ) -> Result<Option<MarketSnapshot>>;
}

/// Result of a listing detail call
#[derive(Debug, Clone)]
pub struct DetailResponse {
    pub listing: RawListing,
    /// Response headers, when the call went over HTTP
    pub headers: Option<HeaderMap>,
}

/// Expensive per-listing detail lookup, guarded by budget and rate limiter
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    async fn fetch_detail(&self, listing: &RawListing) -> Result<DetailResponse>;
}

/// Persistence for finalized deals
#[async_trait]
pub trait DealSink: Send + Sync {
    async fn save(&self, deal: &DealRecord) -> Result<()>;
}
