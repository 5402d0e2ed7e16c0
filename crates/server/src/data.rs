use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::error::{DashboardError, Result};
use crate::types::{AssetDetail, AssetSummary, CoinResponse, MarketChartResponse, PriceSeries, Timeframe};

/// Fixed listing page size
pub const PAGE_SIZE: u32 = 10;
pub const VS_CURRENCY: &str = "usd";
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Read-only market data the dashboard views are built from.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// One page of assets by descending market cap, pages start at 1.
    async fn list_assets(&self, page: u32) -> Result<Vec<AssetSummary>>;

    async fn asset_detail(&self, id: &str) -> Result<AssetDetail>;

    async fn price_history(&self, id: &str, timeframe: Timeframe) -> Result<PriceSeries>;
}

pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Self::with_client(client, config.base_url.clone(), config.api_key.clone()))
    }

    pub fn with_client(client: Client, base_url: String, api_key: Option<String>) -> Self {
        CoinGeckoClient {
            client,
            base_url,
            api_key,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            DashboardError::Config(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                DashboardError::Config(format!("Base URL '{}' cannot take a path", self.base_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        debug!("GET {} {:?}", url, query);

        let mut request = self
            .client
            .get(url)
            .query(query)
            .header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                warn!("CoinGecko rate limit reached");
            }
            return Err(DashboardError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl MarketData for CoinGeckoClient {
    async fn list_assets(&self, page: u32) -> Result<Vec<AssetSummary>> {
        let url = self.endpoint(&["coins", "markets"])?;
        let query = [
            ("vs_currency", VS_CURRENCY.to_string()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", PAGE_SIZE.to_string()),
            ("page", page.to_string()),
        ];

        let assets: Vec<AssetSummary> = self.get_json(url, &query).await?;
        info!("Fetched {} assets for page {}", assets.len(), page);
        Ok(assets)
    }

    async fn asset_detail(&self, id: &str) -> Result<AssetDetail> {
        let url = self.endpoint(&["coins", id])?;
        let coin: CoinResponse = self.get_json(url, &[]).await?;
        Ok(coin.into())
    }

    async fn price_history(&self, id: &str, timeframe: Timeframe) -> Result<PriceSeries> {
        let url = self.endpoint(&["coins", id, "market_chart"])?;
        let query = [
            ("vs_currency", VS_CURRENCY.to_string()),
            ("days", timeframe.days().to_string()),
        ];

        let chart: MarketChartResponse = self.get_json(url, &query).await?;
        let series = chart.into_series();
        info!("Fetched {} price points for {} over {} days", series.len(), id, timeframe.days());
        Ok(series)
    }
}
