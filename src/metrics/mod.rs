/*
 * Prometheus metrics for the gas cache and quote endpoint
 */

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use crate::models::{CachedScalar, GaugeError, RefreshStats, Result};

pub struct Metrics {
    registry: Registry,
    gas_refresh_successes: IntGauge,
    gas_refresh_failures: IntGauge,
    gas_price_wei: IntGauge,
    quote_requests: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let gas_refresh_successes = IntGauge::new(
            "gauge_gas_refresh_successes_total",
            "Successful gas price fetches since startup",
        )?;
        let gas_refresh_failures = IntGauge::new(
            "gauge_gas_refresh_failures_total",
            "Failed gas price fetches since startup",
        )?;
        let gas_price_wei = IntGauge::new(
            "gauge_gas_price_wei",
            "Currently cached gas price in wei, -1 when unavailable",
        )?;
        let quote_requests = IntCounterVec::new(
            Opts::new("gauge_quote_requests_total", "Swap quote requests by outcome"),
            &["outcome"],
        )?;

        registry.register(Box::new(gas_refresh_successes.clone()))?;
        registry.register(Box::new(gas_refresh_failures.clone()))?;
        registry.register(Box::new(gas_price_wei.clone()))?;
        registry.register(Box::new(quote_requests.clone()))?;

        Ok(Self {
            registry,
            gas_refresh_successes,
            gas_refresh_failures,
            gas_price_wei,
            quote_requests,
        })
    }

    pub fn record_quote(&self, outcome: &str) {
        self.quote_requests.with_label_values(&[outcome]).inc();
    }

    /// Samples the cache state and renders the registry in text exposition format.
    pub fn render(&self, stats: &RefreshStats, current: Option<&CachedScalar>) -> Result<String> {
        self.gas_refresh_successes
            .set(i64::try_from(stats.successes).unwrap_or(i64::MAX));
        self.gas_refresh_failures
            .set(i64::try_from(stats.failures).unwrap_or(i64::MAX));
        self.gas_price_wei.set(
            current
                .and_then(|c| i64::try_from(c.value).ok())
                .unwrap_or(-1),
        );

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        exposition_text(buffer)
    }
}

fn exposition_text(buffer: Vec<u8>) -> Result<String> {
    String::from_utf8(buffer).map_err(|e| {
        GaugeError::MetricsError(prometheus::Error::Msg(format!("Metrics are not UTF-8: {e}")))
    })
}

/// Label for a quote result, used by the `outcome` dimension.
#[must_use]
pub fn quote_outcome<T>(result: &Result<T>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(GaugeError::PoolNotFound { .. }) => "not_found",
        Err(GaugeError::CalculationError(_)) => "calculation_error",
        Err(GaugeError::InvalidInput(_)) => "invalid_input",
        Err(e) if e.is_transport() => "rpc_error",
        Err(_) => "internal_error",
    }
}
