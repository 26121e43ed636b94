//! Two-layer "already processed" check
//!
//! A bounded in-memory set answers the common case; on a miss the durable
//! store is asked, and a durable hit is copied into memory. The memory set is
//! guarded by a mutex that is never held across the durable `.await`.


use crate::config::DedupConfig;
use crate::error::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Durable record of processed listing IDs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Errors must be reported, not mapped to `false`.
    async fn exists(&self, id: &str) -> Result<bool>;
}

/// Insertion-ordered bounded set
#[derive(Debug)]
struct DedupSet {
    order: VecDeque<String>,
    members: HashSet<String>,
    max_entries: usize,
    evict_batch: usize,
}

impl DedupSet {
    fn new(max_entries: usize, evict_fraction: f64) -> Self {
        let max_entries = max_entries.max(1);
        let batch = (max_entries as f64 * evict_fraction.clamp(0.0, 1.0)).ceil() as usize;
        Self {
            order: VecDeque::with_capacity(max_entries),
            members: HashSet::with_capacity(max_entries),
            max_entries,
            evict_batch: batch.clamp(1, max_entries),
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Returns false if already present.
    fn insert(&mut self, id: &str) -> bool {
        if self.members.contains(id) {
            return false;
        }
        if self.order.len() >= self.max_entries {
            self.evict_oldest(self.evict_batch);
        }
        self.order.push_back(id.to_string());
        self.members.insert(id.to_string());
        true
    }

    fn evict_oldest(&mut self, count: usize) {
        let count = count.min(self.order.len());
        for id in self.order.drain(..count) {
            self.members.remove(&id);
        }
        tracing::debug!("Evicted {} oldest dedup entries", count);
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

/// Processed-listing check shared by all scan workers
pub struct Deduplicator {
    memory: Mutex<DedupSet>,
    store: Arc<dyn DedupStore>,
}

impl Deduplicator {
    pub fn new(store: Arc<dyn DedupStore>, config: &DedupConfig) -> Self {
        Self::with_capacity(store, config.max_entries, config.evict_fraction)
    }

    /// `evict_fraction` of `max_entries` (at least one) is evicted per pass
    /// once the set is full.
    pub fn with_capacity(store: Arc<dyn DedupStore>, max_entries: usize, evict_fraction: f64) -> Self {
        Self {
            memory: Mutex::new(DedupSet::new(max_entries, evict_fraction)),
            store,
        }
    }

    /// Memory first, then the durable store. A durable failure propagates.
    pub async fn is_duplicate(&self, id: &str) -> Result<bool> {
        if self.memory.lock().contains(id) {
            return Ok(true);
        }

        let seen = self.store.exists(id).await?;
        if seen {
            self.memory.lock().insert(id);
        }
        Ok(seen)
    }

    /// Record `id` as processed. Call only once processing is committed.
    ///
    /// Returns false if another worker already marked it.
    pub fn mark_processed(&self, id: &str) -> bool {
        self.memory.lock().insert(id)
    }

    pub fn contains_in_memory(&self, id: &str) -> bool {
        self.memory.lock().contains(id)
    }

    pub fn len(&self) -> usize {
        self.memory.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
