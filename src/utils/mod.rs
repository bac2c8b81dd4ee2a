/*
 * Utility functions and helpers
 */

use ethers::types::Address;
use num_bigint::BigUint;
use rust_decimal::Decimal;
use std::str::FromStr;
use crate::models::{GaugeError, Result};

/// Parses a JSON-RPC hex quantity such as `0x3b9aca00`.
pub fn parse_hex_quantity(raw: &str) -> Result<u128> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(GaugeError::RpcError(format!("Malformed hex quantity: {raw:?}")));
    }

    u128::from_str_radix(digits, 16)
        .map_err(|e| GaugeError::RpcError(format!("Hex quantity {raw} out of range: {e}")))
}

/// Accepts exactly `0x` followed by 40 hex characters, in any casing.
pub fn parse_address(address: &str) -> Result<Address> {
    let valid = address.len() == 42
        && address.starts_with("0x")
        && address[2..].bytes().all(|b| b.is_ascii_hexdigit());

    if !valid {
        return Err(GaugeError::InvalidInput(format!(
            "Invalid Ethereum address: {address}. Expected format: 0x[a-fA-F0-9]{{40}}"
        )));
    }

    Address::from_str(address)
        .map_err(|e| GaugeError::InvalidInput(format!("Invalid Ethereum address {address}: {e}")))
}

/// Accepts a non-negative base-10 integer with no sign, separators or prefix.
pub fn parse_amount(amount: &str) -> Result<BigUint> {
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GaugeError::InvalidInput(format!(
            "Invalid amount: {amount}. Must be a positive integer string (no decimals)."
        )));
    }

    BigUint::parse_bytes(amount.as_bytes(), 10)
        .ok_or_else(|| GaugeError::InvalidInput(format!("Invalid amount: {amount}.")))
}

/// Wei to gwei for display. `None` if the value does not fit a decimal mantissa.
#[must_use]
pub fn wei_to_gwei(wei: u128) -> Option<Decimal> {
    let wei = i64::try_from(wei).ok()?;
    Some(Decimal::new(wei, 9).normalize())
}
