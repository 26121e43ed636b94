//! File-backed collaborators
//!
//! JSON snapshots stand in for the marketplace, catalog and pricing services,
//! and a JSON-lines file serves as both deal sink and durable dedup store.

use super::{CatalogLookup, DealSink, DetailFetcher, DetailResponse, ListingSource, MarketData};
use crate::dedup::DedupStore;
use crate::error::{Result, ScanError};
use crate::extract::ExtractedSignals;
use crate::types::{CatalogCandidate, DealRecord, MarketSnapshot, RawListing};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

fn expand(path: impl AsRef<Path>) -> PathBuf {
    let raw = path.as_ref().to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

/// Listings read from a JSON array file on every fetch
pub struct JsonFileListingSource {
    path: PathBuf,
}

impl JsonFileListingSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: expand(path) }
    }
}

#[async_trait]
impl ListingSource for JsonFileListingSource {
    async fn fetch_listings(&self) -> Result<Vec<RawListing>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ScanError::Source(format!("{}: {}", self.path.display(), e)))?;
        let listings: Vec<RawListing> = serde_json::from_str(&text)?;
        debug!("Read {} listings from {}", listings.len(), self.path.display());
        Ok(listings)
    }
}

/// In-memory catalog loaded from a JSON array of cards
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    cards: Vec<CatalogCandidate>,
}

impl JsonCatalog {
    pub fn new(cards: Vec<CatalogCandidate>) -> Self {
        Self { cards }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand(path);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ScanError::Catalog(format!("{}: {}", path.display(), e)))?;
        let cards: Vec<CatalogCandidate> = serde_json::from_str(&text)?;
        debug!("Loaded {} catalog cards from {}", cards.len(), path.display());
        Ok(Self::new(cards))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// A card is a candidate when its collector number matches the listing's, or
/// when any word of its name appears in the listing.
fn is_candidate(signals: &ExtractedSignals, card: &CatalogCandidate) -> bool {
    let number_hit = match (signals.card_number.as_ref(), card.number) {
        (Some(found), Some(number)) => found.number == number,
        _ => false,
    };
    if number_hit {
        return true;
    }

    let haystack = format!("{} {}", signals.name_text(), signals.title.cleaned);
    let words: HashSet<&str> = haystack
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    card.name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 1)
        .any(|w| words.contains(w.to_lowercase().as_str()))
}

#[async_trait]
impl CatalogLookup for JsonCatalog {
    async fn find_candidates(&self, signals: &ExtractedSignals) -> Result<Vec<CatalogCandidate>> {
        Ok(self
            .cards
            .iter()
            .filter(|card| is_candidate(signals, card))
            .cloned()
            .collect())
    }
}

/// Market snapshots keyed by catalog card ID. Condition is not modelled.
#[derive(Debug, Clone, Default)]
pub struct JsonMarketData {
    entries: HashMap<String, MarketSnapshot>,
}

impl JsonMarketData {
    pub fn new(entries: HashMap<String, MarketSnapshot>) -> Self {
        Self { entries }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand(path);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ScanError::MarketData(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(serde_json::from_str(&text)?))
    }
}

#[async_trait]
impl MarketData for JsonMarketData {
    async fn snapshot(
        &self,
        candidate: &CatalogCandidate,
        _condition: Option<&str>,
    ) -> Result<Option<MarketSnapshot>> {
        Ok(self.entries.get(&candidate.id).cloned())
    }
}

/// Returns the listing unchanged. Used when no detail endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughDetailFetcher;

#[async_trait]
impl DetailFetcher for PassthroughDetailFetcher {
    async fn fetch_detail(&self, listing: &RawListing) -> Result<DetailResponse> {
        Ok(DetailResponse {
            listing: listing.clone(),
            headers: None,
        })
    }
}

/// Append-only JSON-lines deal log.
///
/// Listing IDs already in the file on open, plus every saved deal, answer
/// [`DedupStore::exists`].
pub struct JsonlDealSink {
    path: PathBuf,
    seen: Mutex<HashSet<String>>,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonlDealSink {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand(path);
        let mut seen = HashSet::new();

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                for (lineno, line) in text.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<DealRecord>(line) {
                        Ok(deal) => {
                            seen.insert(deal.listing_id);
                        }
                        Err(e) => warn!("Skipping bad deal line {} in {}: {}", lineno + 1, path.display(), e),
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ScanError::Persistence(format!("{}: {}", path.display(), e))),
        }

        debug!("Deal log {} holds {} listings", path.display(), seen.len());
        Ok(Self {
            path,
            seen: Mutex::new(seen),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DealSink for JsonlDealSink {
    async fn save(&self, deal: &DealRecord) -> Result<()> {
        let mut line = serde_json::to_string(deal)?;
        line.push('\n');

        {
            let _guard = self.write_lock.lock().await;
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await
                .map_err(|e| ScanError::Persistence(format!("{}: {}", self.path.display(), e)))?;
            file.write_all(line.as_bytes())
                .await
                .map_err(|e| ScanError::Persistence(e.to_string()))?;
            file.flush().await?;
        }

        self.seen.lock().insert(deal.listing_id.clone());
        Ok(())
    }
}

#[async_trait]
impl DedupStore for JsonlDealSink {
    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.seen.lock().contains(id))
    }
}
