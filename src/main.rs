/*
 * Gauge - cached gas price and Uniswap V2 swap quote service
 * Main entry point for the application
 */

use gauge::{api, config::Config, service::GaugeService};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()
        .map_err(|e| {
            eprintln!("Failed to load configuration: {e}");
            e
        })?;

    init_tracing(&config.server.log_level);

    info!("Starting gauge service");

    let service = Arc::new(GaugeService::new(&config).await.map_err(|e| {
        error!("Failed to initialize service: {}", e);
        e
    })?);
    service.start().await;

    let api_state = api::ApiState {
        service: service.clone(),
    };

    info!("Starting API server on {}:{}", config.server.host, config.server.port);

    let figment = rocket::Config::figment()
        .merge(("address", config.server.host))
        .merge(("port", config.server.port));

    let rocket = api::create_rocket(figment, api_state);
    let result = rocket.launch().await;

    service.shutdown().await;
    info!("Gauge service stopped");

    result?;
    Ok(())
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("gauge={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
