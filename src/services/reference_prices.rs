//! Reference price feed client
//!
//! The feed returns `{id, name, provider, referencePrice}` records with no
//! ordering or completeness guarantee. Any failure is reported as
//! `Unavailable` so the caller can abort the refresh as a unit.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{PricingError, PricingResult};
use crate::models::catalog::ReferencePrice;

#[async_trait]
pub trait ReferencePriceSource: Send + Sync {
    async fn fetch_reference_prices(&self) -> PricingResult<Vec<ReferencePrice>>;
}

/// Feed payload; either a bare array or `{ "models": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReferencePricesResponse {
    Wrapped { models: Vec<ReferencePrice> },
    Bare(Vec<ReferencePrice>),
}

impl ReferencePricesResponse {
    fn into_prices(self) -> Vec<ReferencePrice> {
        match self {
            ReferencePricesResponse::Wrapped { models } => models,
            ReferencePricesResponse::Bare(models) => models,
        }
    }
}

#[derive(Clone)]
pub struct HttpReferencePriceClient {
    client: Client,
    url: String,
}

impl HttpReferencePriceClient {
    pub fn new(url: String, timeout: Duration) -> PricingResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PricingError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl ReferencePriceSource for HttpReferencePriceClient {
    async fn fetch_reference_prices(&self) -> PricingResult<Vec<ReferencePrice>> {
        info!(url = %self.url, "Fetching reference prices");

        let response = self
            .client
            .get(&self.url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PricingError::Unavailable("reference price fetch timed out".to_string())
                } else {
                    PricingError::Unavailable(format!("reference price fetch failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PricingError::Unavailable(format!(
                "reference price API error {}: {}",
                status, error_text
            )));
        }

        let data: ReferencePricesResponse = response.json().await.map_err(|e| {
            PricingError::Unavailable(format!("malformed reference price payload: {}", e))
        })?;
        let prices = data.into_prices();

        debug!(count = prices.len(), "Fetched reference prices");
        Ok(prices)
    }
}

/// Source used when no feed is configured; every fetch is `Unavailable`
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredReferenceSource;

#[async_trait]
impl ReferencePriceSource for UnconfiguredReferenceSource {
    async fn fetch_reference_prices(&self) -> PricingResult<Vec<ReferencePrice>> {
        Err(PricingError::Unavailable(
            "no reference price feed configured (set REFERENCE_PRICES_URL)".to_string(),
        ))
    }
}
