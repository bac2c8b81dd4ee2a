/*
 * Constant-product swap quoting against live pool balances
 */

use ethers::types::Address;
use num_bigint::BigUint;
use num_traits::Zero;
use std::sync::Arc;
use tracing::{debug, info};
use crate::dex::{BalanceReader, PairResolver, ReserveSnapshot};
use crate::models::{GaugeError, Result};
use super::{FEE_DENOMINATOR, FEE_NUMERATOR};

/// Quotes exact-input swaps from the token balances a pair currently holds.
///
/// Holds no state: reserves are read fresh on every call.
pub struct PoolQuoteEngine {
    resolver: Arc<dyn PairResolver>,
    balances: Arc<dyn BalanceReader>,
}

impl PoolQuoteEngine {
    #[must_use]
    pub fn new(resolver: Arc<dyn PairResolver>, balances: Arc<dyn BalanceReader>) -> Self {
        Self { resolver, balances }
    }

    pub async fn quote(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: &BigUint,
    ) -> Result<BigUint> {
        info!(
            "Quoting swap from={:?} to={:?} amount_in={}",
            token_in, token_out, amount_in
        );

        let pair = self.resolver.get_pair(token_in, token_out).await?;
        if pair.is_zero() {
            return Err(GaugeError::PoolNotFound {
                token_in,
                token_out,
            });
        }

        let reserves = self.read_reserves(pair, token_in, token_out).await?;
        debug!(
            "Pair {:?} reserves: in={} out={}",
            pair, reserves.reserve_in, reserves.reserve_out
        );

        get_amount_out(amount_in, &reserves.reserve_in, &reserves.reserve_out)
    }

    async fn read_reserves(
        &self,
        pair: Address,
        token_in: Address,
        token_out: Address,
    ) -> Result<ReserveSnapshot> {
        let (reserve_in, reserve_out) = tokio::try_join!(
            self.balances.balance_of(token_in, pair),
            self.balances.balance_of(token_out, pair)
        )?;

        Ok(ReserveSnapshot {
            reserve_in,
            reserve_out,
        })
    }
}

/// `floor(amount_in * 997 * reserve_out / (reserve_in * 1000 + amount_in * 997))`
pub fn get_amount_out(
    amount_in: &BigUint,
    reserve_in: &BigUint,
    reserve_out: &BigUint,
) -> Result<BigUint> {
    let amount_in_with_fee = amount_in * FEE_NUMERATOR;
    let numerator = &amount_in_with_fee * reserve_out;
    let denominator = reserve_in * FEE_DENOMINATOR + &amount_in_with_fee;

    if denominator.is_zero() {
        return Err(GaugeError::CalculationError(
            "Division by zero: pool holds no input reserve".to_string(),
        ));
    }

    Ok(numerator / denominator)
}
