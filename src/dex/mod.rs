/*
 * DEX integration module: pool resolution, reserve reads and swap quoting
 */

pub mod erc20;
pub mod uniswap_v2;

use async_trait::async_trait;
use ethers::types::Address;
use num_bigint::BigUint;
use crate::models::Result;

pub use erc20::Erc20Reader;
pub use uniswap_v2::{get_amount_out, PoolQuoteEngine, UniswapV2Factory};

/// Resolves the pool address for an ordered token pair.
///
/// A missing pool is reported as `Address::zero()`, not as an error.
#[async_trait]
pub trait PairResolver: Send + Sync {
    async fn get_pair(&self, token_a: Address, token_b: Address) -> Result<Address>;
}

/// Reads how much of `token` is held by `owner`.
#[async_trait]
pub trait BalanceReader: Send + Sync {
    async fn balance_of(&self, token: Address, owner: Address) -> Result<BigUint>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveSnapshot {
    pub reserve_in: BigUint,
    pub reserve_out: BigUint,
}
