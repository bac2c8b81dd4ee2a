/*
 * Uniswap V2 integration module
 */

mod factory;
mod quote;

pub use factory::UniswapV2Factory;
pub use quote::{get_amount_out, PoolQuoteEngine};

/// 0.3% LP fee, applied to the input amount as 997/1000.
pub const FEE_NUMERATOR: u32 = 997;
pub const FEE_DENOMINATOR: u32 = 1000;
