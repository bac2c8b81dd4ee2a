/*
 * Uniswap V2 factory client: pair address lookup
 */

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::Address;
use std::str::FromStr;
use std::sync::Arc;
use crate::dex::PairResolver;
use crate::models::{GaugeError, Result};
use crate::rpc::RpcClient;

pub struct UniswapV2Factory {
    rpc: Arc<RpcClient>,
    factory_address: Address,
}

impl UniswapV2Factory {
    pub fn new(rpc: Arc<RpcClient>, factory_address: &str) -> Result<Self> {
        let factory_address = Address::from_str(factory_address)
            .map_err(|e| GaugeError::ContractError(format!("Invalid factory address: {e}")))?;

        Ok(Self {
            rpc,
            factory_address,
        })
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.factory_address
    }
}

#[async_trait]
impl PairResolver for UniswapV2Factory {
    async fn get_pair(&self, token_a: Address, token_b: Address) -> Result<Address> {
        let word = self
            .rpc
            .call_word(
                self.factory_address,
                "getPair(address,address)",
                &[Token::Address(token_a), Token::Address(token_b)],
            )
            .await?;

        // address is right-aligned in the return word
        Ok(Address::from_slice(&word[12..32]))
    }
}
