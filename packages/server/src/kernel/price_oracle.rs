//! Price oracle client.
//!
//! The estimation model lives in a separate service; this is a thin JSON
//! client over HTTP behind a trait so routes and tests can swap it out.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimateRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub estimated_price: Decimal,
}

#[async_trait]
pub trait BasePriceOracle: Send + Sync {
    async fn estimate(&self, request: &PriceEstimateRequest) -> Result<PriceEstimate>;
}

pub struct HttpPriceOracle {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPriceOracle {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build price oracle HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl BasePriceOracle for HttpPriceOracle {
    async fn estimate(&self, request: &PriceEstimateRequest) -> Result<PriceEstimate> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .context("Price oracle request failed")?
            .error_for_status()
            .context("Price oracle returned an error status")?;

        let estimate = response
            .json::<PriceEstimate>()
            .await
            .context("Price oracle returned an unexpected body")?;

        if estimate.estimated_price <= Decimal::ZERO {
            anyhow::bail!(
                "Price oracle returned a non-positive estimate: {}",
                estimate.estimated_price
            );
        }

        Ok(estimate)
    }
}
