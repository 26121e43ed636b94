//! Unit tests for rate limiting

#[cfg(test)]
mod tests {
    use super::super::*;
    use reqwest::header::{HeaderMap, HeaderValue};
    use governor::clock::FakeRelativeClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn bucket(capacity: u32, per_sec: f64) -> (TokenBucket<FakeRelativeClock>, FakeRelativeClock) {
        let clock = FakeRelativeClock::default();
        let bucket = TokenBucket::with_clock(capacity, per_sec, Duration::from_millis(10), &clock);
        (bucket, clock)
    }

    // Lets spawned takers run through a few poll intervals
    async fn settle() {
        for _ in 0..5 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[test]
    fn test_starts_full() {
        let (bucket, _clock) = bucket(3, 1.0);
        assert!(bucket.try_take(3));
        assert!(!bucket.try_take(1));
    }

    #[test]
    fn test_refill_from_elapsed_time() {
        let (bucket, clock) = bucket(2, 2.0);
        assert!(bucket.try_take(2));

        clock.advance(Duration::from_millis(250));
        assert!(!bucket.try_take(1));

        clock.advance(Duration::from_millis(260));
        assert!(bucket.try_take(1));
        assert!(!bucket.try_take(1));
    }

    #[test]
    fn test_refill_capped_at_capacity() {
        let (bucket, clock) = bucket(4, 10.0);
        assert!(bucket.try_take(4));
        clock.advance(Duration::from_secs(60));
        assert!(bucket.try_take(4));
        assert!(!bucket.try_take(1));
    }

    #[test]
    fn test_fractional_refill_rate() {
        let (bucket, clock) = bucket(1, 0.5);
        assert!(bucket.try_take(1));

        clock.advance(Duration::from_millis(1500));
        assert!(!bucket.try_take(1));

        clock.advance(Duration::from_millis(600));
        assert!(bucket.try_take(1));
    }

    #[test]
    fn test_unusable_refill_rate_still_builds() {
        let (stalled, _clock) = bucket(2, 0.0);
        assert!(stalled.try_take(2));
        assert!(!stalled.try_take(1));

        let (single, _clock) = bucket(0, f64::NAN);
        assert_eq!(single.capacity(), 1);
        assert!(single.try_take(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_waits_for_refill() {
        let (bucket, clock) = bucket(1, 1.0);
        let bucket = Arc::new(bucket);

        bucket.take(1).await;

        let waiter = {
            let bucket = bucket.clone();
            tokio::spawn(async move { bucket.take(1).await })
        };
        settle().await;
        assert!(!waiter.is_finished());

        clock.advance(Duration::from_millis(1010));
        waiter.await.unwrap();
        assert!(!bucket.try_take(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_more_than_capacity_is_capped() {
        let (bucket, _clock) = bucket(2, 1.0);
        // Would otherwise never complete
        bucket.take(10).await;
        assert!(!bucket.try_take(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_takers_share_bucket() {
        let (bucket, clock) = bucket(2, 4.0);
        let bucket = Arc::new(bucket);
        let done = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let bucket = bucket.clone();
                let done = done.clone();
                tokio::spawn(async move {
                    bucket.take(1).await;
                    done.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        // 2 immediately, then one per 250ms refill
        settle().await;
        assert_eq!(done.load(Ordering::SeqCst), 2);
        for expected in 3..=6 {
            clock.advance(Duration::from_millis(260));
            settle().await;
            assert_eq!(done.load(Ordering::SeqCst), expected);
        }

        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[test]
    fn test_from_config() {
        let config = crate::config::RateLimitConfig {
            capacity: 7,
            refill_per_sec: 3.0,
            poll_interval_ms: 20,
        };
        let bucket = TokenBucket::from_config(&config);
        assert_eq!(bucket.capacity(), 7);
    }

    #[test]
    fn test_parse_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("5000"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static(" 4200 "));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("2026-03-15T00:00:00Z"));

        let snapshot = parse_rate_limit_headers(&headers).unwrap();
        assert_eq!(snapshot.limit, Some(5000));
        assert_eq!(snapshot.remaining, 4200);
        assert_eq!(snapshot.reset.as_deref(), Some("2026-03-15T00:00:00Z"));
        assert!(!snapshot.is_low());
    }

    #[test]
    fn test_inspect_flags_low_remaining() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("199"));

        let snapshot = inspect_rate_limit_headers(&headers).unwrap();
        assert!(snapshot.is_low());
        assert_eq!(snapshot.limit, None);

        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("200"));
        assert!(!inspect_rate_limit_headers(&headers).unwrap().is_low());
    }

    #[test]
    fn test_missing_or_garbage_headers() {
        assert_eq!(parse_rate_limit_headers(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("lots"));
        assert_eq!(parse_rate_limit_headers(&headers), None);
    }
}
