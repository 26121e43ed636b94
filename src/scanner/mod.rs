//! Scan cycle orchestration
//!
//! One cycle fetches a batch of listings and runs each through extraction,
//! matching, the confidence gate, pricing, optional enrichment and tiering,
//! then persists and alerts. Listings are processed concurrently up to
//! `max_concurrency`; cycles never overlap.


use crate::budget::BudgetTracker;
use crate::client::{CatalogLookup, DealSink, DetailFetcher, ListingSource, MarketData};
use crate::config::{Config, ScannerConfig};
use crate::confidence::{classify_confidence, passes_gate, score_confidence};
use crate::dedup::{DedupStore, Deduplicator};
use crate::enrichment::{should_enrich, EnrichmentInput};
use crate::error::Result;
use crate::extract::extract_signals;
use crate::matching::{best_candidate, build_signals};
use crate::notify::{DealAlert, DealAlerter};
use crate::pricing::calculate_profit;
use crate::ratelimit::{inspect_rate_limit_headers, TokenBucket};
use crate::tier::classify_tier;
use crate::types::{DealRecord, RawListing};
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Counters for one completed cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStats {
    pub fetched: usize,
    /// Repeats within the batch plus previously processed listings
    pub duplicates: usize,
    pub junk: usize,
    /// Failed the confidence gate
    pub rejected: usize,
    /// No candidate, no market value, or under the minimum profit
    pub skipped: usize,
    /// Persisted deals refined by a detail fetch
    pub enriched: usize,
    pub persisted: usize,
    pub alerted: usize,
    pub errors: usize,
}

impl CycleStats {
    fn record(&mut self, outcome: ListingOutcome) {
        match outcome {
            ListingOutcome::Duplicate => self.duplicates += 1,
            ListingOutcome::Junk => self.junk += 1,
            ListingOutcome::Rejected => self.rejected += 1,
            ListingOutcome::Skipped(_) => self.skipped += 1,
            ListingOutcome::Persisted { enriched, alerted } => {
                self.persisted += 1;
                if enriched {
                    self.enriched += 1;
                }
                if alerted {
                    self.alerted += 1;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListingOutcome {
    Duplicate,
    Junk,
    Rejected,
    Skipped(&'static str),
    Persisted { enriched: bool, alerted: bool },
}

/// Everything the orchestrator talks to outside the process
pub struct Collaborators {
    pub listings: Arc<dyn ListingSource>,
    pub catalog: Arc<dyn CatalogLookup>,
    pub market: Arc<dyn MarketData>,
    pub detail: Arc<dyn DetailFetcher>,
    pub sink: Arc<dyn DealSink>,
    pub dedup_store: Arc<dyn DedupStore>,
    pub alerter: Arc<dyn DealAlerter>,
}

/// Clears the overlap flag on every exit path
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs scan cycles against injected collaborators
pub struct ScanOrchestrator {
    listings: Arc<dyn ListingSource>,
    catalog: Arc<dyn CatalogLookup>,
    market: Arc<dyn MarketData>,
    detail: Arc<dyn DetailFetcher>,
    sink: Arc<dyn DealSink>,
    alerter: Arc<dyn DealAlerter>,
    dedup: Deduplicator,
    budget: BudgetTracker,
    rate_limiter: TokenBucket,
    config: ScannerConfig,
    running: AtomicBool,
}

impl ScanOrchestrator {
    pub fn new(config: &Config, collaborators: Collaborators) -> Self {
        Self {
            listings: collaborators.listings,
            catalog: collaborators.catalog,
            market: collaborators.market,
            detail: collaborators.detail,
            sink: collaborators.sink,
            alerter: collaborators.alerter,
            dedup: Deduplicator::new(collaborators.dedup_store, &config.dedup),
            budget: BudgetTracker::new(config.budget.daily_limit),
            rate_limiter: TokenBucket::from_config(&config.rate_limit),
            config: config.scanner.clone(),
            running: AtomicBool::new(false),
        }
    }

    pub fn budget(&self) -> &BudgetTracker {
        &self.budget
    }

    pub fn dedup(&self) -> &Deduplicator {
        &self.dedup
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run one cycle.
    ///
    /// Returns `Ok(None)` without doing anything if a cycle is already in
    /// flight. A listing-source failure aborts the cycle; per-listing failures
    /// are logged and counted.
    pub async fn run_cycle(&self) -> Result<Option<CycleStats>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("⏭️ Scan cycle still running, skipping trigger");
            return Ok(None);
        }
        let _guard = RunningGuard(&self.running);
        let started = Instant::now();

        let listings = self.listings.fetch_listings().await?;
        let mut stats = CycleStats {
            fetched: listings.len(),
            ..Default::default()
        };

        let mut batch_ids = HashSet::new();
        let mut unique = Vec::with_capacity(listings.len());
        for listing in listings {
            if batch_ids.insert(listing.id.clone()) {
                unique.push(listing);
            } else {
                stats.duplicates += 1;
            }
        }

        let results: Vec<(String, Result<ListingOutcome>)> = stream::iter(unique)
            .map(|listing| async move {
                let id = listing.id.clone();
                (id, self.process_listing(listing).await)
            })
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        for (id, result) in results {
            match result {
                Ok(outcome) => stats.record(outcome),
                Err(e) => {
                    error!("❌ Failed to process listing {}: {}", id, e);
                    stats.errors += 1;
                }
            }
        }

        let budget = self.budget.get_budget_status();
        info!(
            "📊 Scan cycle done in {:.1}s: {} fetched, {} dup, {} junk, {} rejected, {} skipped, {} enriched, {} saved, {} alerted, {} errors | budget {}/{}",
            started.elapsed().as_secs_f64(),
            stats.fetched,
            stats.duplicates,
            stats.junk,
            stats.rejected,
            stats.skipped,
            stats.enriched,
            stats.persisted,
            stats.alerted,
            stats.errors,
            budget.remaining,
            budget.daily_limit
        );

        Ok(Some(stats))
    }

    /// Run a cycle now and then every `interval_secs`.
    ///
    /// Each tick spawns its cycle, so a tick that lands while the previous
    /// cycle is still running is skipped rather than queued.
    pub async fn run_forever(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("🚀 Scanner started, interval {}s", self.config.interval().as_secs());

        loop {
            ticker.tick().await;
            let this = self.clone();
            tokio::spawn(async move {
                if let Err(e) = this.run_cycle().await {
                    error!("❌ Scan cycle failed: {}", e);
                }
            });
        }
    }

    async fn process_listing(&self, listing: RawListing) -> Result<ListingOutcome> {
        let listing_id = listing.id.clone();

        let is_duplicate = self.dedup.is_duplicate(&listing_id).await?;
        if is_duplicate {
            return Ok(ListingOutcome::Duplicate);
        }

        let signals = extract_signals(&listing);
        if signals.junk.is_junk {
            debug!("Junk listing {} ({:?}): {}", listing_id, signals.junk.reason, listing.title);
            return Ok(self.finish(&listing_id, ListingOutcome::Junk));
        }

        let candidates = self.catalog.find_candidates(&signals).await?;
        let Some(mut matched) = best_candidate(&signals, &candidates) else {
            return Ok(self.finish(&listing_id, ListingOutcome::Skipped("no catalog candidate")));
        };
        if !passes_gate(matched.confidence.composite) {
            debug!(
                "Rejected {}: confidence {:.3} vs {}",
                listing_id, matched.confidence.composite, matched.candidate.id
            );
            return Ok(self.finish(&listing_id, ListingOutcome::Rejected));
        }

        let Some(snapshot) = self
            .market
            .snapshot(&matched.candidate, listing.condition.as_deref())
            .await?
        else {
            return Ok(self.finish(&listing_id, ListingOutcome::Skipped("no market value")));
        };

        let mut breakdown = calculate_profit(listing.price, listing.shipping, snapshot.market_value);
        let mut listing = listing;
        let mut enriched = false;

        let decision = should_enrich(&EnrichmentInput {
            // Duplicates returned above, so this is always false here
            is_duplicate,
            confidence: matched.confidence.composite,
            title_only_profit_percent: breakdown.profit_percent,
            remaining_budget: self.budget.remaining(),
        });

        if decision.enrich {
            if let Some(detail) = self.fetch_detail(&listing).await {
                let detail_signals = extract_signals(&detail);
                if detail_signals.junk.is_junk {
                    return Ok(self.finish(&listing_id, ListingOutcome::Junk));
                }
                matched.confidence = score_confidence(&build_signals(&detail_signals, &matched.candidate));
                if !passes_gate(matched.confidence.composite) {
                    return Ok(self.finish(&listing_id, ListingOutcome::Rejected));
                }
                breakdown = calculate_profit(detail.price, detail.shipping, snapshot.market_value);
                listing = detail;
                enriched = true;
            }
        } else {
            debug!("No enrichment for {}: {}", listing_id, decision.reason());
        }

        if breakdown.profit_percent < self.config.min_profit_percent {
            return Ok(self.finish(&listing_id, ListingOutcome::Skipped("below minimum profit")));
        }

        let confidence = matched.confidence.composite;
        let confidence_tier = classify_confidence(confidence);
        let tier = classify_tier(breakdown.profit_percent, confidence, snapshot.liquidity);

        let record = DealRecord {
            id: uuid::Uuid::new_v4(),
            listing_id: listing_id.clone(),
            card_id: matched.candidate.id.clone(),
            card_name: matched.candidate.name.clone(),
            title: listing.title.clone(),
            listing_price: breakdown.listing_price,
            shipping: breakdown.shipping,
            fee: breakdown.fee,
            total_cost: breakdown.total_cost,
            market_value: breakdown.market_value,
            profit: breakdown.profit,
            profit_percent: breakdown.profit_percent,
            tier,
            confidence,
            confidence_tier,
            liquidity: snapshot.liquidity,
            enriched,
            visible: confidence_tier.is_user_visible(),
            created_at: Utc::now(),
        };

        self.sink.save(&record).await?;
        self.dedup.mark_processed(&listing_id);

        info!(
            "💰 {} {} £{} → £{} ({:.1}%, conf {:.3}{})",
            record.tier,
            record.card_name,
            record.total_cost,
            record.market_value,
            record.profit_percent,
            record.confidence,
            if record.visible { "" } else { ", hidden" }
        );

        let alerted = match DealAlert::from_record(&record) {
            Some(alert) => match self.alerter.alert(&alert).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Alert for {} failed: {}", listing_id, e);
                    false
                }
            },
            None => false,
        };

        Ok(ListingOutcome::Persisted { enriched, alerted })
    }

    /// Spend one budget call and one rate-limit token on a detail fetch.
    /// `None` means fall back to title-only data.
    async fn fetch_detail(&self, listing: &RawListing) -> Option<RawListing> {
        if !self.budget.try_consume() {
            warn!("💸 Daily enrichment budget exhausted, using title-only data for {}", listing.id);
            return None;
        }
        self.rate_limiter.take(1).await;

        match self.detail.fetch_detail(listing).await {
            Ok(response) => {
                if let Some(headers) = response.headers.as_ref() {
                    inspect_rate_limit_headers(headers);
                }
                Some(response.listing)
            }
            Err(e) => {
                warn!("Detail fetch failed for {}: {}", listing.id, e);
                None
            }
        }
    }

    fn finish(&self, listing_id: &str, outcome: ListingOutcome) -> ListingOutcome {
        if let ListingOutcome::Skipped(reason) = outcome {
            debug!("Skipped {}: {}", listing_id, reason);
        }
        self.dedup.mark_processed(listing_id);
        outcome
    }
}
