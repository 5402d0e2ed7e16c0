use log::{debug, error, info};
use serde::Serialize;
use std::sync::Mutex;

use super::{lock, FetchGate, Navigation, Phase, Ticket};
use crate::chart::{to_chart, ChartData};
use crate::data::MarketData;
use crate::error::Result;
use crate::types::{AssetDetail, PriceSeries, Timeframe};

pub const DETAIL_ERROR: &str = "Failed to fetch coin data. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub ticket: Ticket,
    pub id: String,
    pub timeframe: Timeframe,
    /// False when only the series needs refetching
    pub with_metadata: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailFetch {
    pub detail: Option<AssetDetail>,
    pub series: PriceSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeframeOption {
    pub days: u32,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinPanel {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub market_cap_rank: Option<u32>,
    pub total_volume_usd: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub description: String,
    pub description_expanded: bool,
    pub description_toggle: &'static str,
    pub timeframe: Timeframe,
    pub timeframes: Vec<TimeframeOption>,
    pub chart: ChartData,
}

/// What the detail screen shows. An error replaces the whole panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DetailView {
    Idle,
    Loading { id: String, timeframe: Timeframe },
    Error { id: String, message: String },
    Ready(CoinPanel),
}

#[derive(Debug)]
pub struct DetailController {
    coin_id: Option<String>,
    timeframe: Timeframe,
    detail: Option<AssetDetail>,
    series: Option<PriceSeries>,
    phase: Phase,
    error: Option<String>,
    expanded: bool,
    gate: FetchGate,
    description_max_len: usize,
    refetch_metadata_on_timeframe: bool,
}

impl DetailController {
    pub fn new(description_max_len: usize, refetch_metadata_on_timeframe: bool) -> Self {
        DetailController {
            coin_id: None,
            timeframe: Timeframe::default(),
            detail: None,
            series: None,
            phase: Phase::Idle,
            error: None,
            expanded: false,
            gate: FetchGate::default(),
            description_max_len,
            refetch_metadata_on_timeframe,
        }
    }

    /// Switches to another coin, discarding everything shown for the previous one.
    pub fn begin_open(&mut self, id: &str, timeframe: Timeframe) -> DetailRequest {
        self.coin_id = Some(id.to_string());
        self.timeframe = timeframe;
        self.detail = None;
        self.series = None;
        self.expanded = false;
        self.begin(id.to_string(), true)
    }

    /// `None` when nothing is open or the timeframe is unchanged. Metadata is
    /// only refetched when it is missing, unless configured otherwise.
    pub fn begin_set_timeframe(&mut self, timeframe: Timeframe) -> Option<DetailRequest> {
        if timeframe == self.timeframe {
            return None;
        }
        self.timeframe = timeframe;

        let id = self.coin_id.clone()?;
        let with_metadata = self.refetch_metadata_on_timeframe || self.detail.is_none();
        Some(self.begin(id, with_metadata))
    }

    pub fn begin_refresh(&mut self) -> Option<DetailRequest> {
        let id = self.coin_id.clone()?;
        Some(self.begin(id, true))
    }

    fn begin(&mut self, id: String, with_metadata: bool) -> DetailRequest {
        self.phase = Phase::Loading;
        self.error = None;
        DetailRequest {
            ticket: self.gate.issue(),
            id,
            timeframe: self.timeframe,
            with_metadata,
        }
    }

    /// Applies a finished fetch. Returns false when the result was stale.
    pub fn commit(&mut self, request: &DetailRequest, result: Result<DetailFetch>) -> bool {
        if !self.gate.is_current(request.ticket) {
            debug!(
                "Dropping stale detail response for {} ({} days)",
                request.id,
                request.timeframe.days()
            );
            return false;
        }

        match result {
            Ok(fetch) => {
                if let Some(detail) = fetch.detail {
                    self.detail = Some(detail);
                }
                self.series = Some(fetch.series);
                self.phase = Phase::Ready;
            }
            Err(e) => {
                error!("Detail fetch for {} failed: {}", request.id, e);
                self.detail = None;
                self.series = None;
                self.phase = Phase::Failed;
                self.error = Some(DETAIL_ERROR.to_string());
            }
        }
        true
    }

    pub fn toggle_description(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    pub fn back(&self) -> Navigation {
        Navigation::Back
    }

    pub fn coin_id(&self) -> Option<&str> {
        self.coin_id.as_deref()
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.gate.generation()
    }

    pub fn view(&self) -> DetailView {
        let id = match &self.coin_id {
            Some(id) => id.clone(),
            None => return DetailView::Idle,
        };

        match self.phase {
            Phase::Idle => DetailView::Idle,
            Phase::Loading => DetailView::Loading {
                id,
                timeframe: self.timeframe,
            },
            Phase::Failed => DetailView::Error {
                id,
                message: self.error.clone().unwrap_or_else(|| DETAIL_ERROR.to_string()),
            },
            Phase::Ready => match (&self.detail, &self.series) {
                (Some(detail), Some(series)) => DetailView::Ready(self.panel(detail, series)),
                _ => DetailView::Loading {
                    id,
                    timeframe: self.timeframe,
                },
            },
        }
    }

    fn panel(&self, detail: &AssetDetail, series: &PriceSeries) -> CoinPanel {
        CoinPanel {
            id: detail.id.clone(),
            name: detail.name.clone(),
            symbol: detail.symbol.to_uppercase(),
            market_cap_rank: detail.market_cap_rank,
            total_volume_usd: detail.total_volume_usd,
            price_change_percentage_24h: detail.price_change_percentage_24h,
            description: shared::description_text(
                &detail.description,
                self.description_max_len,
                self.expanded,
            ),
            description_expanded: self.expanded,
            description_toggle: shared::toggle_label(self.expanded),
            timeframe: self.timeframe,
            timeframes: Timeframe::ALL
                .iter()
                .map(|tf| TimeframeOption {
                    days: tf.days(),
                    label: tf.label(),
                    selected: *tf == self.timeframe,
                })
                .collect(),
            chart: to_chart(series),
        }
    }
}

/// Metadata and series are requested concurrently. The first failure wins
/// and the other request is dropped.
pub async fn fetch(source: &dyn MarketData, request: &DetailRequest) -> Result<DetailFetch> {
    if request.with_metadata {
        let (detail, series) = tokio::try_join!(
            source.asset_detail(&request.id),
            source.price_history(&request.id, request.timeframe)
        )?;
        Ok(DetailFetch {
            detail: Some(detail),
            series,
        })
    } else {
        let series = source.price_history(&request.id, request.timeframe).await?;
        Ok(DetailFetch {
            detail: None,
            series,
        })
    }
}

async fn run(cell: &Mutex<DetailController>, source: &dyn MarketData, request: Option<DetailRequest>) -> DetailView {
    if let Some(request) = request {
        info!(
            "Fetching {} over {} days (metadata: {})",
            request.id,
            request.timeframe.days(),
            request.with_metadata
        );
        let result = fetch(source, &request).await;
        lock(cell).commit(&request, result);
    }
    lock(cell).view()
}

/// Opens `id` if another coin (or none) is showing, otherwise applies the
/// timeframe when it changed.
pub async fn show(
    cell: &Mutex<DetailController>,
    source: &dyn MarketData,
    id: &str,
    timeframe: Option<Timeframe>,
) -> DetailView {
    let request = {
        let mut controller = lock(cell);
        if controller.coin_id() != Some(id) {
            Some(controller.begin_open(id, timeframe.unwrap_or_default()))
        } else {
            timeframe.and_then(|tf| controller.begin_set_timeframe(tf))
        }
    };
    run(cell, source, request).await
}

pub async fn refresh(cell: &Mutex<DetailController>, source: &dyn MarketData, id: &str) -> DetailView {
    let request = {
        let mut controller = lock(cell);
        if controller.coin_id() != Some(id) {
            Some(controller.begin_open(id, Timeframe::default()))
        } else {
            controller.begin_refresh()
        }
    };
    run(cell, source, request).await
}

/// Flips the description preview for the open coin; other ids are ignored.
pub fn toggle_description(cell: &Mutex<DetailController>, id: &str) -> DetailView {
    let mut controller = lock(cell);
    if controller.coin_id() == Some(id) {
        controller.toggle_description();
    }
    controller.view()
}
