//! Daily enrichment call budget
//!
//! One `BudgetTracker` is shared (via `Arc`) by every worker in the process.
//! State sits behind a mutex; each operation takes the lock once, runs the
//! midnight roll-over check, then reads or updates the counter, so a
//! check-then-increment can never lose an update.

#[cfg(test)]
mod tests;

use chrono::{DateTime, Days, NaiveTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Remaining budget below this is reported as low
pub const LOW_BUDGET_THRESHOLD: u32 = 500;

#[derive(Debug)]
struct BudgetState {
    daily_limit: u32,
    used: u32,
    reset_at: DateTime<Utc>,
}

impl BudgetState {
    /// Zero the counter once `reset_at` has passed. Safe to call repeatedly:
    /// after a reset `reset_at` is in the future again.
    fn roll_over(&mut self, now: DateTime<Utc>) {
        if now >= self.reset_at {
            tracing::info!(
                "Daily budget reset ({} of {} calls used)",
                self.used,
                self.daily_limit
            );
            self.used = 0;
            self.reset_at = next_utc_midnight(now);
        }
    }

    fn remaining(&self) -> u32 {
        self.daily_limit.saturating_sub(self.used)
    }
}

/// Snapshot returned by [`BudgetTracker::get_budget_status`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub daily_limit: u32,
    pub used: u32,
    pub remaining: u32,
    pub is_low: bool,
    pub reset_at: DateTime<Utc>,
}

/// First UTC midnight strictly after `now`
pub fn next_utc_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap_or(chrono::NaiveDate::MAX);
    tomorrow.and_time(NaiveTime::MIN).and_utc()
}

/// Process-wide daily call counter with UTC-midnight reset
pub struct BudgetTracker {
    state: Mutex<BudgetState>,
}

impl BudgetTracker {
    pub fn new(daily_limit: u32) -> Self {
        Self::new_at(daily_limit, Utc::now())
    }

    pub fn new_at(daily_limit: u32, now: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(BudgetState {
                daily_limit,
                used: 0,
                reset_at: next_utc_midnight(now),
            }),
        }
    }

    /// Record one call. Returns calls used today.
    pub fn track_call(&self) -> u32 {
        self.track_call_at(Utc::now())
    }

    pub fn track_call_at(&self, now: DateTime<Utc>) -> u32 {
        let mut state = self.state.lock();
        state.roll_over(now);
        state.used = state.used.saturating_add(1);
        state.used
    }

    pub fn can_make_call(&self) -> bool {
        self.can_make_call_at(Utc::now())
    }

    pub fn can_make_call_at(&self, now: DateTime<Utc>) -> bool {
        let mut state = self.state.lock();
        state.roll_over(now);
        state.used < state.daily_limit
    }

    pub fn remaining(&self) -> u32 {
        self.remaining_at(Utc::now())
    }

    pub fn remaining_at(&self, now: DateTime<Utc>) -> u32 {
        let mut state = self.state.lock();
        state.roll_over(now);
        state.remaining()
    }

    pub fn get_budget_status(&self) -> BudgetStatus {
        self.get_budget_status_at(Utc::now())
    }

    pub fn get_budget_status_at(&self, now: DateTime<Utc>) -> BudgetStatus {
        let mut state = self.state.lock();
        state.roll_over(now);
        let remaining = state.remaining();
        BudgetStatus {
            daily_limit: state.daily_limit,
            used: state.used,
            remaining,
            is_low: remaining < LOW_BUDGET_THRESHOLD,
            reset_at: state.reset_at,
        }
    }

    /// Atomic `can_make_call` + `track_call` for concurrent workers.
    /// Returns false, and records nothing, once the budget is spent.
    pub fn try_consume(&self) -> bool {
        self.try_consume_at(Utc::now())
    }

    pub fn try_consume_at(&self, now: DateTime<Utc>) -> bool {
        let mut state = self.state.lock();
        state.roll_over(now);
        if state.used >= state.daily_limit {
            return false;
        }
        state.used += 1;
        true
    }
}
