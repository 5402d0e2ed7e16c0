// Dashboard server entry point

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::info;
use std::sync::Arc;

use coin_dash_server::config::ServerConfig;
use coin_dash_server::data::CoinGeckoClient;
use coin_dash_server::handlers;
use coin_dash_server::types::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = ServerConfig::load().map_err(|e| {
        eprintln!("Failed to load server configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    config.setup_logging();
    config.log_summary();

    let client = CoinGeckoClient::new(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let state = web::Data::new(AppState::new(Arc::new(client), &config));

    info!("Starting coin dashboard on http://0.0.0.0:{}", config.http_port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind(("0.0.0.0", config.http_port))?
    .run()
    .await
}
