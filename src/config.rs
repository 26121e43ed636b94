//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
}

/// Scan cycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Seconds between scheduled cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Listings processed concurrently within one cycle
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Deals below this profit percentage are not persisted
    #[serde(default = "default_min_profit_percent")]
    pub min_profit_percent: f64,
}

impl ScannerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_concurrency: default_max_concurrency(),
            min_profit_percent: default_min_profit_percent(),
        }
    }
}

/// Daily enrichment call budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
        }
    }
}

/// Token bucket for outbound enrichment calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default = "default_refill_per_sec")]
    pub refill_per_sec: f64,
    /// Sleep between refill checks while waiting for tokens
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl RateLimitConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            refill_per_sec: default_refill_per_sec(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// In-memory dedup set bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Share of `max_entries` evicted in one pass once the cap is hit
    #[serde(default = "default_evict_fraction")]
    pub evict_fraction: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            evict_fraction: default_evict_fraction(),
        }
    }
}

fn default_interval_secs() -> u64 {
    300 // 5 minutes
}

fn default_max_concurrency() -> usize {
    4
}

fn default_min_profit_percent() -> f64 {
    5.0
}

fn default_daily_limit() -> u32 {
    5000
}

fn default_capacity() -> u32 {
    5
}

fn default_refill_per_sec() -> f64 {
    5.0
}

fn default_poll_interval_ms() -> u64 {
    50
}

fn default_max_entries() -> usize {
    10_000
}

fn default_evict_fraction() -> f64 {
    0.1
}

impl Config {
    /// Load from a TOML file, layered with `DEAL_SCANNER__SECTION__KEY` env vars.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(path: &str) -> Result<Self> {
        let path = shellexpand::tilde(path).into_owned();

        let config = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(
                config::Environment::with_prefix("DEAL_SCANNER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
