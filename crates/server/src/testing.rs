// In-memory market data for controller and handler tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::data::{MarketData, PAGE_SIZE};
use crate::error::{DashboardError, Result};
use crate::types::{AssetDetail, AssetSummary, PricePoint, PriceSeries, Timeframe};

const DAY_MS: i64 = 86_400_000;
const SERIES_START_MS: i64 = 1_704_067_200_000; // 2024-01-01T00:00:00Z

pub fn asset(id: &str, name: &str, symbol: &str, rank: u32) -> AssetSummary {
    AssetSummary {
        id: id.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        current_price: Some(100_000.0 / rank as f64),
        price_change_percentage_24h: Some(if rank % 2 == 0 { -1.5 } else { 2.0 }),
        market_cap: Some(1.0e12 / rank as f64),
        market_cap_rank: Some(rank),
    }
}

/// Ten assets per page with globally increasing ranks.
pub fn page_of(page: u32) -> Vec<AssetSummary> {
    let first = (page - 1) * PAGE_SIZE + 1;
    (first..first + PAGE_SIZE)
        .map(|rank| asset(&format!("coin-{}", rank), &format!("Coin {}", rank), &format!("c{}", rank), rank))
        .collect()
}

pub fn detail(id: &str) -> AssetDetail {
    AssetDetail {
        id: id.to_string(),
        name: format!("{} name", id),
        symbol: id.chars().take(3).collect(),
        description: format!("{} is a test asset with a fairly long description.", id),
        market_cap_rank: Some(1),
        total_volume_usd: Some(1.0e9),
        price_change_percentage_24h: Some(1.25),
    }
}

/// One point per day plus the closing point, so every timeframe has a distinct length.
pub fn series_for(timeframe: Timeframe) -> PriceSeries {
    (0..=timeframe.days() as i64)
        .map(|day| PricePoint {
            timestamp_ms: SERIES_START_MS + day * DAY_MS,
            price: 100.0 + day as f64,
        })
        .collect()
}

#[derive(Default)]
pub struct StubMarket {
    pub fail_listing: AtomicBool,
    pub fail_detail: AtomicBool,
    pub fail_history: AtomicBool,
    pub listing_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    pub history_requests: Mutex<Vec<(String, Timeframe)>>,
    pages: Mutex<HashMap<u32, Vec<AssetSummary>>>,
}

impl StubMarket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the generated page contents.
    pub fn set_page(&self, page: u32, assets: Vec<AssetSummary>) {
        self.pages.lock().unwrap().insert(page, assets);
    }

    pub fn fail(flag: &AtomicBool, on: bool) {
        flag.store(on, Ordering::SeqCst);
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn stub_error(what: &str) -> DashboardError {
    DashboardError::Status {
        status: 500,
        body: format!("{} unavailable", what),
    }
}

#[async_trait]
impl MarketData for StubMarket {
    async fn list_assets(&self, page: u32) -> Result<Vec<AssetSummary>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(stub_error("listing"));
        }
        let overridden = self.pages.lock().unwrap().get(&page).cloned();
        Ok(overridden.unwrap_or_else(|| page_of(page)))
    }

    async fn asset_detail(&self, id: &str) -> Result<AssetDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_detail.load(Ordering::SeqCst) {
            return Err(stub_error("detail"));
        }
        Ok(detail(id))
    }

    async fn price_history(&self, id: &str, timeframe: Timeframe) -> Result<PriceSeries> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history_requests
            .lock()
            .unwrap()
            .push((id.to_string(), timeframe));
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(stub_error("history"));
        }
        Ok(series_for(timeframe))
    }
}
