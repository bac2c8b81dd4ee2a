/*
 * ERC-20 balance reads over eth_call
 */

use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::Address;
use num_bigint::BigUint;
use std::sync::Arc;
use crate::dex::BalanceReader;
use crate::models::Result;
use crate::rpc::RpcClient;

pub struct Erc20Reader {
    rpc: Arc<RpcClient>,
}

impl Erc20Reader {
    #[must_use]
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl BalanceReader for Erc20Reader {
    async fn balance_of(&self, token: Address, owner: Address) -> Result<BigUint> {
        let word = self
            .rpc
            .call_word(token, "balanceOf(address)", &[Token::Address(owner)])
            .await?;

        Ok(BigUint::from_bytes_be(&word))
    }
}
