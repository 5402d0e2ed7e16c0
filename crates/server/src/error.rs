use shared::ParseTimeframeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API response error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("JSON parsing failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    InvalidTimeframe(#[from] ParseTimeframeError),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
