//! HTTP listing detail client

use super::{DetailFetcher, DetailResponse};
use crate::error::{Result, ScanError};
use crate::types::RawListing;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Fetches full listing detail from `{base_url}/item?item_id=<id>`.
///
/// Response headers are returned so the caller can inspect the remote
/// rate-limit state.
#[derive(Clone)]
pub struct HttpDetailFetcher {
    http: Client,
    base_url: String,
}

impl HttpDetailFetcher {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn item_url(&self) -> String {
        format!("{}/item", self.base_url)
    }
}

#[async_trait]
impl DetailFetcher for HttpDetailFetcher {
    async fn fetch_detail(&self, listing: &RawListing) -> Result<DetailResponse> {
        let resp = self
            .http
            .get(self.item_url())
            .query(&[("item_id", listing.id.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScanError::Enrichment(format!(
                "detail fetch for {} returned {}",
                listing.id, status
            )));
        }

        let headers = resp.headers().clone();
        let detail: RawListing = resp.json().await?;
        debug!("Fetched detail for {}", listing.id);

        Ok(DetailResponse {
            listing: detail,
            headers: Some(headers),
        })
    }
}
