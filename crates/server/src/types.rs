use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::config::ServerConfig;
use crate::controller::{DetailController, ListingController};
use crate::data::MarketData;

// Re-export shared types for convenience
pub use shared::{AssetDetail, AssetSummary, PricePoint, PriceSeries, Timeframe};

/// `/coins/{id}` payload, trimmed to the fields the detail view shows.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinResponse {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub description: Option<LocalizedText>,
    pub market_cap_rank: Option<u32>,
    pub market_data: Option<CoinMarketData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalizedText {
    pub en: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoinMarketData {
    pub total_volume: Option<CurrencyValues>,
    pub price_change_percentage_24h: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyValues {
    pub usd: Option<f64>,
}

impl From<CoinResponse> for AssetDetail {
    fn from(coin: CoinResponse) -> Self {
        let (total_volume_usd, price_change_percentage_24h) = match coin.market_data {
            Some(market) => (
                market.total_volume.and_then(|volume| volume.usd),
                market.price_change_percentage_24h,
            ),
            None => (None, None),
        };

        AssetDetail {
            id: coin.id,
            name: coin.name,
            symbol: coin.symbol,
            description: coin.description.and_then(|text| text.en).unwrap_or_default(),
            market_cap_rank: coin.market_cap_rank,
            total_volume_usd,
            price_change_percentage_24h,
        }
    }
}

/// `/coins/{id}/market_chart` payload. Only the price column is used.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketChartResponse {
    pub prices: Vec<(f64, f64)>,
}

impl MarketChartResponse {
    pub fn into_series(self) -> PriceSeries {
        self.prices
            .into_iter()
            .map(|(timestamp, price)| PricePoint {
                timestamp_ms: timestamp as i64,
                price,
            })
            .collect()
    }
}

pub struct AppState {
    pub source: Arc<dyn MarketData>,
    pub listing: Mutex<ListingController>,
    pub detail: Mutex<DetailController>,
}

impl AppState {
    pub fn new(source: Arc<dyn MarketData>, config: &ServerConfig) -> Self {
        AppState {
            source,
            listing: Mutex::new(ListingController::new()),
            detail: Mutex::new(DetailController::new(
                config.description_max_len,
                config.refetch_metadata_on_timeframe,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoinQuery {
    pub timeframe: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
