/*
 * Measures the response time of a running gauge instance's /gasPrice endpoint
 */

use anyhow::{bail, Context, Result};
use gauge::{utils::wei_to_gwei, GasPriceResponse};
use std::time::Instant;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{port}/gasPrice");
    info!("Target URL: {}", url);

    let client = reqwest::Client::new();

    let start = Instant::now();
    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Request to {url} failed"))?;
    let elapsed = start.elapsed();

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
        bail!("HTTP {status}: {text}");
    }

    let body: GasPriceResponse = response
        .json()
        .await
        .context("Response is not a gas price body")?;

    info!("Response: {:?}", body);
    info!("Time took: {:.2} ms", elapsed.as_secs_f64() * 1000.0);

    match (&body.gas_price_raw, body.gas_price) {
        (Some(_), Some(wei)) => {
            if let Some(gwei) = wei_to_gwei(wei) {
                info!("Gas price: {} gwei", gwei);
            }
        }
        _ => warn!("Response missing gas price fields"),
    }

    Ok(())
}
