use log::LevelFilter;
use std::sync::Once;

// Logging bootstrap shared by every binary in the workspace

static INIT: Once = Once::new();

/// Maps a `LOG_LEVEL` style string onto a filter, defaulting to `Info`.
pub fn parse_level_filter(level: &str) -> LevelFilter {
    match level.trim().to_uppercase().as_str() {
        "OFF" => LevelFilter::Off,
        "ERROR" => LevelFilter::Error,
        "WARN" => LevelFilter::Warn,
        "INFO" => LevelFilter::Info,
        "DEBUG" => LevelFilter::Debug,
        "TRACE" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

pub fn init_logging() -> bool {
    init_logging_with(|_| {})
}

/// Installs the global `env_logger` once per process.
///
/// The level comes from `LOG_LEVEL`; `configure` can then adjust the builder
/// (module filters, overriding the level). Later calls are no-ops. Returns
/// true only for the call that actually installed the logger.
pub fn init_logging_with<F>(configure: F) -> bool
where
    F: FnOnce(&mut env_logger::Builder),
{
    let mut installed = false;
    INIT.call_once(|| {
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string());

        let mut builder = env_logger::Builder::from_default_env();
        builder.filter_level(parse_level_filter(&log_level));
        configure(&mut builder);

        // Another logger may already be registered (tests, embedding); keep it
        installed = builder.try_init().is_ok();
    });
    installed
}
