use log::{debug, error, info};
use serde::Serialize;
use std::sync::Mutex;

use super::{lock, FetchGate, Navigation, Phase, Ticket};
use crate::data::MarketData;
use crate::error::Result;
use crate::types::AssetSummary;

pub const LISTING_ERROR: &str = "Failed to fetch data. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub ticket: Ticket,
    pub page: u32,
    /// Replace the accumulated rows instead of appending
    pub reset: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingView {
    pub rows: Vec<AssetSummary>,
    pub total: usize,
    pub page: u32,
    pub search: String,
    pub phase: Phase,
    pub loading: bool,
    pub error: Option<String>,
    pub can_load_more: bool,
}

/// Accumulated market listing with a client-side search filter.
#[derive(Debug, Default)]
pub struct ListingController {
    rows: Vec<AssetSummary>,
    page: u32,
    search: String,
    phase: Phase,
    error: Option<String>,
    gate: FetchGate,
}

impl ListingController {
    pub fn new() -> Self {
        Self::default()
    }

    /// First load of page 1. `None` once the listing has been activated.
    pub fn begin_activate(&mut self) -> Option<PageRequest> {
        if self.phase != Phase::Idle {
            return None;
        }
        Some(self.begin(1, true))
    }

    /// Advances the cursor and requests the next page.
    ///
    /// Refused while a fetch is in flight or after a failure; only a refresh
    /// clears the error.
    pub fn begin_load_more(&mut self) -> Option<PageRequest> {
        if !self.can_load_more() {
            return None;
        }
        self.page += 1;
        Some(self.begin(self.page, false))
    }

    /// Discards accumulated rows on success and refetches page 1. Always
    /// allowed, and supersedes anything still in flight.
    pub fn begin_refresh(&mut self) -> PageRequest {
        self.begin(1, true)
    }

    fn begin(&mut self, page: u32, reset: bool) -> PageRequest {
        self.page = page;
        self.phase = Phase::Loading;
        self.error = None;
        PageRequest {
            ticket: self.gate.issue(),
            page,
            reset,
        }
    }

    /// Applies a finished fetch. Returns false when the result was stale.
    pub fn commit(&mut self, request: &PageRequest, result: Result<Vec<AssetSummary>>) -> bool {
        if !self.gate.is_current(request.ticket) {
            debug!("Dropping stale listing response for page {}", request.page);
            return false;
        }

        match result {
            Ok(assets) => {
                if request.reset {
                    self.rows = assets;
                } else {
                    // No de-duplication; pages are concatenated as received
                    self.rows.extend(assets);
                }
                self.phase = Phase::Ready;
                info!("Listing now holds {} assets (page {})", self.rows.len(), self.page);
            }
            Err(e) => {
                error!("Listing fetch for page {} failed: {}", request.page, e);
                self.phase = Phase::Failed;
                self.error = Some(LISTING_ERROR.to_string());
            }
        }
        true
    }

    pub fn set_search(&mut self, query: &str) {
        self.search = query.to_string();
    }

    pub fn visible(&self) -> Vec<&AssetSummary> {
        shared::filter_assets(&self.rows, &self.search)
    }

    pub fn select(&self, id: &str) -> Option<Navigation> {
        self.rows
            .iter()
            .any(|asset| asset.id == id)
            .then(|| Navigation::Detail { id: id.to_string() })
    }

    pub fn can_load_more(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn rows(&self) -> &[AssetSummary] {
        &self.rows
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn view(&self) -> ListingView {
        let rows: Vec<AssetSummary> = self.visible().into_iter().cloned().collect();
        ListingView {
            total: self.rows.len(),
            rows,
            page: self.page,
            search: self.search.clone(),
            phase: self.phase,
            loading: self.phase == Phase::Loading,
            error: self.error.clone(),
            can_load_more: self.can_load_more(),
        }
    }
}

// Async drivers: begin under the lock, fetch without it, commit under it again

async fn run(cell: &Mutex<ListingController>, source: &dyn MarketData, request: Option<PageRequest>) -> ListingView {
    if let Some(request) = request {
        info!("Fetching listing page {} (reset: {})", request.page, request.reset);
        let result = source.list_assets(request.page).await;
        lock(cell).commit(&request, result);
    }
    lock(cell).view()
}

pub async fn activate(cell: &Mutex<ListingController>, source: &dyn MarketData) -> ListingView {
    let request = lock(cell).begin_activate();
    run(cell, source, request).await
}

pub async fn load_more(cell: &Mutex<ListingController>, source: &dyn MarketData) -> ListingView {
    let request = lock(cell).begin_load_more();
    run(cell, source, request).await
}

pub async fn refresh(cell: &Mutex<ListingController>, source: &dyn MarketData) -> ListingView {
    let request = lock(cell).begin_refresh();
    run(cell, source, Some(request)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::testing::{asset, page_of, StubMarket};

    fn failure() -> Result<Vec<AssetSummary>> {
        Err(DashboardError::Status {
            status: 503,
            body: String::new(),
        })
    }

    fn loaded(pages: u32) -> ListingController {
        let mut controller = ListingController::new();
        let request = controller.begin_activate().unwrap();
        controller.commit(&request, Ok(page_of(1)));
        for _ in 1..pages {
            let request = controller.begin_load_more().unwrap();
            let page = request.page;
            controller.commit(&request, Ok(page_of(page)));
        }
        controller
    }

    #[test]
    fn test_activation_requests_page_one_once() {
        let mut controller = ListingController::new();
        assert_eq!(controller.phase(), Phase::Idle);

        let request = controller.begin_activate().unwrap();
        assert_eq!(request.page, 1);
        assert!(request.reset);
        assert_eq!(controller.phase(), Phase::Loading);
        assert!(controller.begin_activate().is_none());
    }

    #[test]
    fn test_first_page_preserves_upstream_order() {
        let controller = loaded(1);

        let ranks: Vec<u32> = controller
            .view()
            .rows
            .iter()
            .filter_map(|a| a.market_cap_rank)
            .collect();
        assert_eq!(ranks, (1..=10).collect::<Vec<u32>>());
        assert_eq!(controller.phase(), Phase::Ready);
    }

    #[test]
    fn test_load_more_appends_in_order() {
        let mut controller = loaded(2);
        let before: Vec<AssetSummary> = controller.rows().to_vec();

        let request = controller.begin_load_more().unwrap();
        assert_eq!(request.page, 3);
        assert!(!request.reset);
        assert!(controller.commit(&request, Ok(page_of(3))));

        let mut expected = before;
        expected.extend(page_of(3));
        assert_eq!(controller.rows(), expected.as_slice());
    }

    #[test]
    fn test_append_does_not_deduplicate() {
        let mut controller = loaded(1);
        let request = controller.begin_load_more().unwrap();
        controller.commit(&request, Ok(page_of(1)));

        assert_eq!(controller.rows().len(), 20);
        assert_eq!(controller.rows()[0], controller.rows()[10]);
    }

    #[test]
    fn test_refresh_replaces_everything() {
        let mut controller = loaded(3);
        assert_eq!(controller.rows().len(), 30);

        let fresh = vec![asset("solana", "Solana", "sol", 5)];
        let request = controller.begin_refresh();
        assert_eq!(request.page, 1);
        controller.commit(&request, Ok(fresh.clone()));

        assert_eq!(controller.rows(), fresh.as_slice());
        assert_eq!(controller.page(), 1);
    }

    #[test]
    fn test_failure_keeps_rows_and_blocks_load_more() {
        let mut controller = loaded(2);

        let request = controller.begin_load_more().unwrap();
        controller.commit(&request, failure());

        assert_eq!(controller.phase(), Phase::Failed);
        assert_eq!(controller.error(), Some(LISTING_ERROR));
        assert_eq!(controller.rows().len(), 20);
        assert!(!controller.can_load_more());
        assert!(controller.begin_load_more().is_none());

        let view = controller.view();
        assert!(!view.loading);
        assert!(!view.can_load_more);
        assert_eq!(view.error.as_deref(), Some(LISTING_ERROR));

        // Manual refresh is the only way out
        let request = controller.begin_refresh();
        assert!(controller.error().is_none());
        controller.commit(&request, Ok(page_of(1)));
        assert!(controller.can_load_more());
        assert_eq!(controller.rows().len(), 10);
    }

    #[test]
    fn test_load_more_refused_while_loading() {
        let mut controller = loaded(1);
        let _pending = controller.begin_load_more().unwrap();
        assert!(controller.view().loading);
        assert!(controller.begin_load_more().is_none());
    }

    #[test]
    fn test_refresh_supersedes_in_flight_append() {
        let mut controller = loaded(1);
        let append = controller.begin_load_more().unwrap();
        let reset = controller.begin_refresh();

        assert!(controller.commit(&reset, Ok(page_of(1))));
        assert!(!controller.commit(&append, Ok(page_of(2))));

        assert_eq!(controller.rows(), page_of(1).as_slice());
        assert_eq!(controller.page(), 1);
    }

    #[test]
    fn test_search_filters_only_the_rendered_rows() {
        let mut controller = ListingController::new();
        let request = controller.begin_activate().unwrap();
        controller.commit(
            &request,
            Ok(vec![
                asset("bitcoin", "Bitcoin", "btc", 1),
                asset("ethereum", "Ethereum", "eth", 2),
                asset("wrapped-bitcoin", "Wrapped Bitcoin", "wbtc", 3),
            ]),
        );

        controller.set_search("BTC");
        let view = controller.view();
        let ids: Vec<&str> = view.rows.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["bitcoin", "wrapped-bitcoin"]);
        assert_eq!(view.total, 3);
        assert_eq!(view.search, "BTC");
        assert_eq!(controller.rows().len(), 3);

        controller.set_search("");
        assert_eq!(controller.visible().len(), 3);
    }

    #[test]
    fn test_select_navigates_to_known_assets_only() {
        let controller = loaded(1);
        assert_eq!(
            controller.select("coin-3"),
            Some(Navigation::Detail { id: "coin-3".to_string() })
        );
        assert_eq!(controller.select("coin-99"), None);
    }

    #[tokio::test]
    async fn test_drivers_fetch_through_market_data() {
        let source = StubMarket::new();
        let cell = Mutex::new(ListingController::new());

        let view = activate(&cell, &source).await;
        assert_eq!(view.rows.len(), 10);
        assert_eq!(StubMarket::count(&source.listing_calls), 1);

        // Already active: no refetch
        let view = activate(&cell, &source).await;
        assert_eq!(view.rows.len(), 10);
        assert_eq!(StubMarket::count(&source.listing_calls), 1);

        let view = load_more(&cell, &source).await;
        assert_eq!(view.rows.len(), 20);
        assert_eq!(view.page, 2);

        StubMarket::fail(&source.fail_listing, true);
        let view = load_more(&cell, &source).await;
        assert_eq!(view.rows.len(), 20);
        assert_eq!(view.error.as_deref(), Some(LISTING_ERROR));

        // Suppressed until refresh, so no extra call goes out
        let calls = StubMarket::count(&source.listing_calls);
        load_more(&cell, &source).await;
        assert_eq!(StubMarket::count(&source.listing_calls), calls);

        StubMarket::fail(&source.fail_listing, false);
        let view = refresh(&cell, &source).await;
        assert_eq!(view.rows.len(), 10);
        assert!(view.error.is_none());
        assert!(view.can_load_more);
    }
}
