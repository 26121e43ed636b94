//! In-memory collaborators for wiring the pipeline without I/O

use crate::client::{CatalogLookup, DealSink, DetailFetcher, DetailResponse, ListingSource, MarketData};
use crate::dedup::DedupStore;
use crate::error::{Result, ScanError};
use crate::extract::ExtractedSignals;
use crate::notify::{DealAlert, DealAlerter};
use crate::types::{CatalogCandidate, DealRecord, MarketSnapshot, RawListing};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Serves a fixed batch of listings, optionally after a delay
#[derive(Default)]
pub struct StaticListings {
    listings: Mutex<Vec<RawListing>>,
    delay: Option<Duration>,
    fetches: AtomicUsize,
}

impl StaticListings {
    pub fn new(listings: Vec<RawListing>) -> Self {
        Self {
            listings: Mutex::new(listings),
            ..Default::default()
        }
    }

    /// Hold every fetch for `delay` so a cycle stays in flight
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn replace(&self, listings: Vec<RawListing>) {
        *self.listings.lock() = listings;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingSource for StaticListings {
    async fn fetch_listings(&self) -> Result<Vec<RawListing>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.listings.lock().clone())
    }
}

/// Returns every card as a candidate; scoring picks the winner
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    cards: Vec<CatalogCandidate>,
}

impl StaticCatalog {
    pub fn new(cards: Vec<CatalogCandidate>) -> Self {
        Self { cards }
    }
}

#[async_trait]
impl CatalogLookup for StaticCatalog {
    async fn find_candidates(&self, _signals: &ExtractedSignals) -> Result<Vec<CatalogCandidate>> {
        Ok(self.cards.clone())
    }
}

/// Snapshots keyed by card ID
#[derive(Debug, Clone, Default)]
pub struct StaticMarket {
    entries: HashMap<String, MarketSnapshot>,
}

impl StaticMarket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, card_id: &str, snapshot: MarketSnapshot) -> Self {
        self.entries.insert(card_id.to_string(), snapshot);
        self
    }
}

#[async_trait]
impl MarketData for StaticMarket {
    async fn snapshot(
        &self,
        candidate: &CatalogCandidate,
        _condition: Option<&str>,
    ) -> Result<Option<MarketSnapshot>> {
        Ok(self.entries.get(&candidate.id).cloned())
    }
}

/// Durable dedup store backed by a set; can be switched to fail
#[derive(Default)]
pub struct MemoryDedupStore {
    ids: Mutex<HashSet<String>>,
    failing: Mutex<bool>,
}

impl MemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: &str) {
        self.ids.lock().insert(id.to_string());
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }
}

#[async_trait]
impl DedupStore for MemoryDedupStore {
    async fn exists(&self, id: &str) -> Result<bool> {
        if *self.failing.lock() {
            return Err(ScanError::DedupStore("store unavailable".to_string()));
        }
        Ok(self.ids.lock().contains(id))
    }
}

/// Collects saved deals
#[derive(Default)]
pub struct MemoryDealSink {
    deals: Mutex<Vec<DealRecord>>,
}

impl MemoryDealSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deals(&self) -> Vec<DealRecord> {
        self.deals.lock().clone()
    }
}

#[async_trait]
impl DealSink for MemoryDealSink {
    async fn save(&self, deal: &DealRecord) -> Result<()> {
        self.deals.lock().push(deal.clone());
        Ok(())
    }
}

/// Detail fetcher returning scripted listings, counting calls
#[derive(Default)]
pub struct ScriptedDetailFetcher {
    details: HashMap<String, RawListing>,
    failures: HashSet<String>,
    headers: Option<HeaderMap>,
    calls: AtomicUsize,
}

impl ScriptedDetailFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detail to return for `listing.id`; unscripted IDs echo the input
    pub fn with_detail(mut self, listing: RawListing) -> Self {
        self.details.insert(listing.id.clone(), listing);
        self
    }

    pub fn with_failure(mut self, id: &str) -> Self {
        self.failures.insert(id.to_string());
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DetailFetcher for ScriptedDetailFetcher {
    async fn fetch_detail(&self, listing: &RawListing) -> Result<DetailResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.contains(&listing.id) {
            return Err(ScanError::Enrichment(format!("scripted failure for {}", listing.id)));
        }
        Ok(DetailResponse {
            listing: self
                .details
                .get(&listing.id)
                .cloned()
                .unwrap_or_else(|| listing.clone()),
            headers: self.headers.clone(),
        })
    }
}

/// Collects alerts
#[derive(Default)]
pub struct RecordingAlerter {
    alerts: Mutex<Vec<DealAlert>>,
}

impl RecordingAlerter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<DealAlert> {
        self.alerts.lock().clone()
    }
}

#[async_trait]
impl DealAlerter for RecordingAlerter {
    async fn alert(&self, alert: &DealAlert) -> Result<()> {
        self.alerts.lock().push(alert.clone());
        Ok(())
    }
}
