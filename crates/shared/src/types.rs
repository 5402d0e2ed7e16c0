use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// Shared data structures used by the server and its views

/// One row of the market listing, as returned by `/coins/markets`.
///
/// Thinly traded assets sometimes come back with `null` market fields, so
/// everything numeric is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub current_price: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDetail {
    pub id: String,
    pub name: String,
    pub symbol: String,
    /// English description, empty when upstream has none.
    pub description: String,
    pub market_cap_rank: Option<u32>,
    pub total_volume_usd: Option<f64>,
    pub price_change_percentage_24h: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix timestamp in milliseconds
    pub timestamp_ms: i64,
    pub price: f64,
}

/// Ascending by timestamp. Replaced wholesale on every fetch.
pub type PriceSeries = Vec<PricePoint>;

/// Lookback window for a price-history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    OneDay,
    #[default]
    SevenDays,
    ThirtyDays,
    NinetyDays,
    OneYear,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::OneDay,
        Timeframe::SevenDays,
        Timeframe::ThirtyDays,
        Timeframe::NinetyDays,
        Timeframe::OneYear,
    ];

    pub const fn days(self) -> u32 {
        match self {
            Timeframe::OneDay => 1,
            Timeframe::SevenDays => 7,
            Timeframe::ThirtyDays => 30,
            Timeframe::NinetyDays => 90,
            Timeframe::OneYear => 365,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Timeframe::OneDay => "1 Day",
            Timeframe::SevenDays => "7 Days",
            Timeframe::ThirtyDays => "1 Month",
            Timeframe::NinetyDays => "3 Months",
            Timeframe::OneYear => "1 Year",
        }
    }

    pub fn from_days(days: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|tf| tf.days() == days)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTimeframeError(pub String);

impl fmt::Display for ParseTimeframeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unsupported timeframe '{}', expected one of 1, 7, 30, 90, 365",
            self.0
        )
    }
}

impl std::error::Error for ParseTimeframeError {}

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(Timeframe::from_days)
            .ok_or_else(|| ParseTimeframeError(s.to_string()))
    }
}

// Serialized as the bare day count, the same value the market_chart endpoint takes
impl Serialize for Timeframe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.days())
    }
}
