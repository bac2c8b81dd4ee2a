/*
 * Data models and types for the gas price and swap quote service
 */

use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A cached scalar read from the node, kept together with the raw hex it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedScalar {
    pub raw: String,
    pub value: u128,
}

impl CachedScalar {
    /// Parses `raw` as a hex quantity. A malformed value is a transport-class failure.
    pub fn from_raw(raw: String) -> Result<Self> {
        let value = crate::utils::parse_hex_quantity(&raw)?;
        Ok(Self { raw, value })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasPriceResponse {
    pub gas_price_raw: Option<String>,
    pub gas_price: Option<u128>,
}

impl From<Option<CachedScalar>> for GasPriceResponse {
    fn from(scalar: Option<CachedScalar>) -> Self {
        match scalar {
            Some(CachedScalar { raw, value }) => Self {
                gas_price_raw: Some(raw),
                gas_price: Some(value),
            },
            None => Self {
                gas_price_raw: None,
                gas_price: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuoteResponse {
    /// Decimal string, so integers wider than 53 bits survive JSON consumers.
    pub amount_out: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
}

/// Bookkeeping of the background refresh, for logs, health and metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshStats {
    pub successes: u64,
    pub failures: u64,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Debug, Error)]
pub enum GaugeError {
    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract interaction error: {0}")]
    ContractError(String),

    #[error("No pair found for the given token addresses ({token_in:?}, {token_out:?})")]
    PoolNotFound { token_in: Address, token_out: Address },

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),
}

impl GaugeError {
    /// True for failures that originate in the remote node rather than in local logic.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::RpcError(_) | Self::ContractError(_))
    }
}

pub type Result<T> = std::result::Result<T, GaugeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_scalar_value_matches_raw() {
        let scalar = CachedScalar::from_raw("0x3b9aca00".to_string()).unwrap();
        assert_eq!(scalar.value, 1_000_000_000);
        assert_eq!(scalar.raw, "0x3b9aca00");
    }

    #[test]
    fn malformed_raw_is_transport_error() {
        let err = CachedScalar::from_raw("not-hex".to_string()).unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn gas_price_response_serializes_nulls_when_absent() {
        let body = serde_json::to_value(GasPriceResponse::from(None)).unwrap();
        assert_eq!(body, serde_json::json!({ "gasPriceRaw": null, "gasPrice": null }));
    }

    #[test]
    fn gas_price_response_uses_camel_case() {
        let scalar = CachedScalar::from_raw("0x4a817c800".to_string()).unwrap();
        let body = serde_json::to_value(GasPriceResponse::from(Some(scalar))).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "gasPriceRaw": "0x4a817c800", "gasPrice": 20_000_000_000u64 })
        );
    }
}
