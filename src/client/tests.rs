//! Unit tests for file-backed collaborators

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::confidence::ConfidenceTier;
    use crate::error::ScanError;
    use crate::extract::extract_signals;
    use crate::types::{DealTier, LiquidityGrade, Seller};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn listing(id: &str, title: &str) -> RawListing {
        RawListing {
            id: id.to_string(),
            title: title.to_string(),
            price: dec!(20.00),
            shipping: dec!(1.00),
            condition: None,
            seller: Seller::default(),
            aspects: vec![],
            created_at: Utc::now(),
        }
    }

    fn card(id: &str, name: &str, number: u32) -> CatalogCandidate {
        CatalogCandidate {
            id: id.to_string(),
            name: name.to_string(),
            expansion_name: "151".to_string(),
            expansion_code: "sv3pt5".to_string(),
            printed_total: Some(165),
            number: Some(number),
            variants: vec![],
        }
    }

    fn deal(listing_id: &str) -> DealRecord {
        DealRecord {
            id: uuid::Uuid::new_v4(),
            listing_id: listing_id.to_string(),
            card_id: "sv3pt5-6".to_string(),
            card_name: "Charizard ex".to_string(),
            title: "Charizard ex 006/165".to_string(),
            listing_price: dec!(20.00),
            shipping: dec!(1.00),
            fee: dec!(1.50),
            total_cost: dec!(22.50),
            market_value: dec!(40.00),
            profit: dec!(17.50),
            profit_percent: 77.78,
            tier: DealTier::Grail,
            confidence: 0.91,
            confidence_tier: ConfidenceTier::High,
            liquidity: LiquidityGrade::High,
            enriched: false,
            visible: true,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_listing_source_reads_json_array() {
        let mut file = NamedTempFile::new().unwrap();
        let body = serde_json::to_string(&vec![listing("a", "Pikachu"), listing("b", "Eevee")]).unwrap();
        file.write_all(body.as_bytes()).unwrap();

        let source = JsonFileListingSource::new(file.path());
        let listings = source.fetch_listings().await.unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[1].id, "b");
    }

    #[tokio::test]
    async fn test_listing_source_missing_file_is_source_error() {
        let source = JsonFileListingSource::new("/nonexistent/listings.json");
        let err = source.fetch_listings().await.unwrap_err();
        assert!(matches!(err, ScanError::Source(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_catalog_candidates_by_number_or_name() {
        let catalog = JsonCatalog::new(vec![
            card("c1", "Charizard ex", 6),
            card("c2", "Bulbasaur", 1),
            card("c3", "Mew ex", 151),
        ]);

        let signals = extract_signals(&listing("x", "Charizard ex 006/165"));
        let found = catalog.find_candidates(&signals).await.unwrap();
        let ids: Vec<&str> = found.iter().map(|c| c.id.as_str()).collect();
        // "ex" matches Mew ex by name too
        assert_eq!(ids, vec!["c1", "c3"]);

        let signals = extract_signals(&listing("y", "card 001/165"));
        let found = catalog.find_candidates(&signals).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "c2");
    }

    #[tokio::test]
    async fn test_catalog_load() {
        let mut file = NamedTempFile::new().unwrap();
        let body = serde_json::to_string(&vec![card("c1", "Charizard ex", 6)]).unwrap();
        file.write_all(body.as_bytes()).unwrap();

        let catalog = JsonCatalog::load(file.path()).await.unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn test_market_data_lookup_by_card_id() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"c1": {"market_value": "45.00", "liquidity": "medium"}}"#)
            .unwrap();

        let market = JsonMarketData::load(file.path()).await.unwrap();
        let snapshot = market
            .snapshot(&card("c1", "Charizard ex", 6), Some("Near Mint"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.market_value, dec!(45.00));
        assert_eq!(snapshot.liquidity, LiquidityGrade::Medium);

        assert!(market.snapshot(&card("c9", "Mew", 1), None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_market_data_rejects_unknown_liquidity() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"c1": {"market_value": "45.00", "liquidity": "extreme"}}"#)
            .unwrap();
        assert!(matches!(
            JsonMarketData::load(file.path()).await,
            Err(ScanError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_passthrough_detail() {
        let original = listing("a", "Pikachu");
        let detail = PassthroughDetailFetcher.fetch_detail(&original).await.unwrap();
        assert_eq!(detail.listing, original);
        assert!(detail.headers.is_none());
    }

    #[tokio::test]
    async fn test_deal_sink_appends_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deals.jsonl");

        let sink = JsonlDealSink::open(&path).await.unwrap();
        assert!(sink.is_empty());
        assert!(!sink.exists("item-1").await.unwrap());

        sink.save(&deal("item-1")).await.unwrap();
        sink.save(&deal("item-2")).await.unwrap();
        assert!(sink.exists("item-1").await.unwrap());

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        let first: DealRecord = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first.listing_id, "item-1");
        assert_eq!(first.tier, DealTier::Grail);
    }

    #[tokio::test]
    async fn test_deal_sink_reopen_remembers_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deals.jsonl");

        {
            let sink = JsonlDealSink::open(&path).await.unwrap();
            sink.save(&deal("item-1")).await.unwrap();
        }
        // A corrupt trailing line is skipped, not fatal
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();

        let reopened = JsonlDealSink::open(&path).await.unwrap();
        assert_eq!(reopened.len(), 1);
        assert!(reopened.exists("item-1").await.unwrap());
    }

    #[test]
    fn test_http_fetcher_url() {
        let fetcher = HttpDetailFetcher::new("https://api.example.com/v1/").unwrap();
        assert_eq!(fetcher.item_url(), "https://api.example.com/v1/item");
    }
}
