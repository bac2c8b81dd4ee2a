/*
 * RPC client module for interacting with an Ethereum JSON-RPC node
 */

use crate::models::{GaugeError, Result};
use ethers::abi::{encode, Token};
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Address, Bytes, TransactionRequest};
use ethers::utils::keccak256;
use std::sync::Arc;

pub struct RpcClient {
    provider: Arc<Provider<Http>>,
}

impl RpcClient {
    pub fn new(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| GaugeError::RpcError(format!("Failed to create provider: {e}")))?;

        Ok(Self {
            provider: Arc::new(provider),
        })
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let chain = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| GaugeError::RpcError(format!("Failed to get chain ID: {e}")))?;

        Ok(chain.as_u64())
    }

    /// `eth_gasPrice` exactly as the node returned it, still hex encoded.
    pub async fn gas_price_raw(&self) -> Result<String> {
        self.provider
            .request::<_, String>("eth_gasPrice", ())
            .await
            .map_err(|e| GaugeError::RpcError(format!("Failed to get gas price: {e}")))
    }

    /// `eth_call` against the latest block. Returns the first 32-byte return word.
    pub async fn call_word(&self, to: Address, signature: &str, args: &[Token]) -> Result<[u8; 32]> {
        let mut call_data = Vec::from(&keccak256(signature.as_bytes())[0..4]);
        call_data.extend_from_slice(&encode(args));

        let tx = TransactionRequest::new().to(to).data(Bytes::from(call_data));

        let result = self
            .provider
            .call(&tx.into(), None)
            .await
            .map_err(|e| GaugeError::RpcError(format!("Failed to call {signature} on {to:?}: {e}")))?;

        if result.len() < 32 {
            return Err(GaugeError::ContractError(format!(
                "Invalid {signature} response from {to:?}: {} bytes",
                result.len()
            )));
        }

        let mut word = [0u8; 32];
        word.copy_from_slice(&result[0..32]);
        Ok(word)
    }
}
