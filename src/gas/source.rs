/*
 * eth_gasPrice as a scalar source
 */

use async_trait::async_trait;
use std::sync::Arc;
use crate::gas::ScalarSource;
use crate::models::Result;
use crate::rpc::RpcClient;

pub struct GasPriceSource {
    rpc: Arc<RpcClient>,
}

impl GasPriceSource {
    #[must_use]
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl ScalarSource for GasPriceSource {
    async fn fetch_raw(&self) -> Result<String> {
        self.rpc.gas_price_raw().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn reads_eth_gas_price() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "eth_gasPrice" })))
            .with_body(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x4a817c800" }).to_string())
            .expect(1)
            .create_async()
            .await;

        let rpc = Arc::new(RpcClient::new(&server.url()).unwrap());
        let source = GasPriceSource::new(rpc);

        assert_eq!(source.fetch_raw().await.unwrap(), "0x4a817c800");
        mock.assert_async().await;
    }
}
