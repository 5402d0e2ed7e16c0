use log::{info, warn, LevelFilter};
use serde::Deserialize;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use crate::error::{DashboardError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_DESCRIPTION_MAX_LEN: usize = 200;
const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_CONFIG_FILE: &str = "coin-dash.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub log_level: String,
    pub http_port: u16,
    pub request_timeout_seconds: u64,
    pub description_max_len: usize,
    /// Refetch coin metadata together with the series on every timeframe change
    pub refetch_metadata_on_timeframe: bool,
}

/// Optional `coin-dash.toml`. Every key may be overridden from the environment.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub log_level: Option<String>,
    pub http_port: Option<u16>,
    pub request_timeout_seconds: Option<u64>,
    pub description_max_len: Option<usize>,
    pub refetch_metadata_on_timeframe: Option<bool>,
}

impl FileConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| DashboardError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn read(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content).map(Some)
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        match dotenv::from_filename("crates/server/.env.server") {
            Ok(path) => println!("Loaded .env.server from: {}", path.display()),
            Err(_) => {
                dotenv::dotenv().ok();
            }
        }

        let config_path =
            std::env::var("COIN_DASH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let file = FileConfig::read(Path::new(&config_path))?.unwrap_or_default();

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Environment wins over the file, the file wins over built-in defaults.
    pub fn from_sources<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = env("COINGECKO_BASE_URL")
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let api_key = env("COINGECKO_API_KEY")
            .or(file.api_key)
            .filter(|key| !key.trim().is_empty());

        let log_level = env("LOG_LEVEL")
            .or(file.log_level)
            .unwrap_or_else(|| "INFO".to_string());

        let http_port = parse_var(&env, "HTTP_PORT")?
            .or(file.http_port)
            .unwrap_or(DEFAULT_HTTP_PORT);

        let request_timeout_seconds = parse_var(&env, "REQUEST_TIMEOUT_SECONDS")?
            .or(file.request_timeout_seconds)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS);
        if request_timeout_seconds == 0 {
            return Err(DashboardError::Config(
                "REQUEST_TIMEOUT_SECONDS must be greater than zero".to_string(),
            ));
        }

        let description_max_len = parse_var(&env, "DESCRIPTION_MAX_LEN")?
            .or(file.description_max_len)
            .unwrap_or(DEFAULT_DESCRIPTION_MAX_LEN);

        let refetch_metadata_on_timeframe = parse_flag(&env, "REFETCH_METADATA_ON_TIMEFRAME")?
            .or(file.refetch_metadata_on_timeframe)
            .unwrap_or(false);

        Ok(ServerConfig {
            base_url,
            api_key,
            log_level,
            http_port,
            request_timeout_seconds,
            description_max_len,
            refetch_metadata_on_timeframe,
        })
    }

    pub fn setup_logging(&self) {
        let level_filter = shared::parse_level_filter(&self.log_level);

        let installed = shared::init_logging_with(|builder| {
            builder.filter_level(level_filter);

            // Keep transport chatter out of the dashboard log
            builder.filter_module("actix_server", LevelFilter::Warn);
            builder.filter_module("hyper", LevelFilter::Warn);
            builder.filter_module("reqwest", LevelFilter::Warn);
        });

        if installed {
            info!("Logging initialized with level: {}", self.log_level);
        }
    }

    pub fn log_summary(&self) {
        info!("CoinGecko base URL: {}", self.base_url);
        match &self.api_key {
            Some(key) => info!("Using API key: {}...", key.chars().take(4).collect::<String>()),
            None => warn!("COINGECKO_API_KEY not set, using the keyless public tier"),
        }
        info!(
            "Request timeout {}s, description preview {} chars, metadata refetch on timeframe change: {}",
            self.request_timeout_seconds, self.description_max_len, self.refetch_metadata_on_timeframe
        );
    }
}

fn parse_var<T, F>(env: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            DashboardError::Config(format!("{} has invalid value '{}': {}", key, raw, e))
        }),
    }
}

fn parse_flag<F>(env: &F, key: &str) -> Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(DashboardError::Config(format!(
                "{} has invalid value '{}': expected true or false",
                key, raw
            ))),
        },
    }
}
