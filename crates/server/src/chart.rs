use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::PricePoint;

pub const DATASET_LABEL: &str = "Price (USD)";

/// Chart-ready price series: one date label per point, prices in parallel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub label: &'static str,
    pub labels: Vec<String>,
    pub prices: Vec<f64>,
}

/// Maps raw price points one-to-one, keeping their order.
pub fn to_chart(series: &[PricePoint]) -> ChartData {
    ChartData {
        label: DATASET_LABEL,
        labels: series.iter().map(|point| date_label(point.timestamp_ms)).collect(),
        prices: series.iter().map(|point| point.price).collect(),
    }
}

/// UTC calendar date as `M/D/YYYY`.
pub fn date_label(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%-m/%-d/%Y").to_string())
        .unwrap_or_default()
}
