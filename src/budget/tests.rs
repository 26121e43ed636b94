//! Unit tests for budget tracker

#[cfg(test)]
mod tests {
    use super::super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, s).unwrap()
    }

    fn next_day(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, h, m, s).unwrap()
    }

    #[test]
    fn test_next_utc_midnight() {
        assert_eq!(next_utc_midnight(at(13, 45, 0)), next_day(0, 0, 0));
        // Exactly midnight: next one is a full day ahead
        assert_eq!(next_utc_midnight(at(0, 0, 0)), next_day(0, 0, 0));
        assert_eq!(next_utc_midnight(at(23, 59, 59)), next_day(0, 0, 0));
    }

    #[test]
    fn test_track_and_remaining() {
        let budget = BudgetTracker::new_at(10, at(9, 0, 0));
        assert_eq!(budget.track_call_at(at(9, 1, 0)), 1);
        assert_eq!(budget.track_call_at(at(9, 2, 0)), 2);
        assert_eq!(budget.remaining_at(at(9, 3, 0)), 8);
    }

    #[test]
    fn test_can_make_call_false_at_limit() {
        let budget = BudgetTracker::new_at(2, at(9, 0, 0));
        assert!(budget.can_make_call_at(at(9, 0, 1)));
        budget.track_call_at(at(9, 0, 2));
        budget.track_call_at(at(9, 0, 3));
        assert!(!budget.can_make_call_at(at(9, 0, 4)));
        assert_eq!(budget.remaining_at(at(9, 0, 5)), 0);
    }

    #[test]
    fn test_status_reports_low_budget() {
        let budget = BudgetTracker::new_at(1000, at(9, 0, 0));
        for _ in 0..500 {
            budget.track_call_at(at(10, 0, 0));
        }
        let status = budget.get_budget_status_at(at(10, 0, 1));
        assert_eq!(status.used, 500);
        assert_eq!(status.remaining, 500);
        assert!(!status.is_low);

        budget.track_call_at(at(10, 0, 2));
        let status = budget.get_budget_status_at(at(10, 0, 3));
        assert_eq!(status.remaining, 499);
        assert!(status.is_low);
        assert_eq!(status.reset_at, next_day(0, 0, 0));
    }

    #[test]
    fn test_reset_triggered_by_each_operation() {
        let after_midnight = next_day(0, 0, 0);

        let budget = BudgetTracker::new_at(5, at(22, 0, 0));
        budget.track_call_at(at(22, 1, 0));
        assert_eq!(budget.track_call_at(after_midnight), 1);

        let budget = BudgetTracker::new_at(1, at(22, 0, 0));
        budget.track_call_at(at(22, 1, 0));
        assert!(!budget.can_make_call_at(at(23, 0, 0)));
        assert!(budget.can_make_call_at(after_midnight));

        let budget = BudgetTracker::new_at(5, at(22, 0, 0));
        budget.track_call_at(at(22, 1, 0));
        assert_eq!(budget.remaining_at(after_midnight), 5);

        let budget = BudgetTracker::new_at(5, at(22, 0, 0));
        budget.track_call_at(at(22, 1, 0));
        let status = budget.get_budget_status_at(after_midnight);
        assert_eq!(status.used, 0);
        assert_eq!(status.reset_at, after_midnight + Duration::days(1));

        let budget = BudgetTracker::new_at(1, at(22, 0, 0));
        assert!(budget.try_consume_at(at(22, 1, 0)));
        assert!(!budget.try_consume_at(at(23, 59, 59)));
        assert!(budget.try_consume_at(after_midnight));
    }

    #[test]
    fn test_reset_happens_once_per_boundary() {
        let budget = BudgetTracker::new_at(100, at(22, 0, 0));
        budget.track_call_at(at(23, 0, 0));

        // First op after midnight resets, later ops the same day must not
        assert_eq!(budget.track_call_at(next_day(0, 0, 1)), 1);
        assert_eq!(budget.track_call_at(next_day(0, 5, 0)), 2);
        assert!(budget.can_make_call_at(next_day(1, 0, 0)));
        assert_eq!(budget.remaining_at(next_day(2, 0, 0)), 98);
    }

    #[test]
    fn test_reset_after_multiple_idle_days() {
        let budget = BudgetTracker::new_at(10, at(9, 0, 0));
        budget.track_call_at(at(9, 0, 0));
        let later = at(9, 0, 0) + Duration::days(3);
        let status = budget.get_budget_status_at(later);
        assert_eq!(status.used, 0);
        assert!(status.reset_at > later);
        assert_eq!(status.reset_at, next_utc_midnight(later));
    }

    #[test]
    fn test_try_consume_stops_at_limit() {
        let budget = BudgetTracker::new_at(3, at(9, 0, 0));
        assert!(budget.try_consume_at(at(9, 0, 1)));
        assert!(budget.try_consume_at(at(9, 0, 2)));
        assert!(budget.try_consume_at(at(9, 0, 3)));
        assert!(!budget.try_consume_at(at(9, 0, 4)));
        assert_eq!(budget.get_budget_status_at(at(9, 0, 5)).used, 3);
    }

    #[test]
    fn test_try_consume_concurrent_no_lost_updates() {
        let budget = Arc::new(BudgetTracker::new(250));
        let granted = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let budget = budget.clone();
                let granted = granted.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        if budget.try_consume() {
                            granted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // 800 attempts against a limit of 250
        assert_eq!(granted.load(Ordering::SeqCst), 250);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_track_call_concurrent_counts_every_call() {
        let budget = Arc::new(BudgetTracker::new(100_000));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let budget = budget.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        budget.track_call();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(budget.get_budget_status().used, 2000);
    }
}
