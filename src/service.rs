/*
 * Service that wires the gas price cache and the swap quote engine
 */

use ethers::types::Address;
use num_bigint::BigUint;
use std::sync::Arc;
use tracing::{info, warn};
use crate::{
    config::Config,
    dex::{Erc20Reader, PoolQuoteEngine, UniswapV2Factory},
    gas::{GasPriceSource, RefreshingScalarCache},
    metrics::{quote_outcome, Metrics},
    models::{GasPriceResponse, Result, SwapQuoteResponse},
    rpc::RpcClient,
    utils::wei_to_gwei,
};

pub struct GaugeService {
    gas_cache: Arc<RefreshingScalarCache>,
    quote_engine: PoolQuoteEngine,
    metrics: Metrics,
}

impl GaugeService {
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Initializing gauge service");

        let rpc = Arc::new(RpcClient::new(&config.ethereum.rpc_url)?);
        match rpc.chain_id().await {
            Ok(chain_id) => info!("Connected to Ethereum RPC, chain id {}", chain_id),
            Err(e) => warn!("Ethereum RPC not reachable yet: {}", e),
        }

        let gas_cache = Arc::new(RefreshingScalarCache::new(
            Arc::new(GasPriceSource::new(rpc.clone())),
            config.gas.fetch_interval(),
        ));

        let factory = UniswapV2Factory::new(rpc.clone(), &config.uniswap.factory_address)?;
        info!("Uniswap V2 factory at {:?}", factory.address());

        let quote_engine = PoolQuoteEngine::new(
            Arc::new(factory),
            Arc::new(Erc20Reader::new(rpc)),
        );

        Ok(Self::from_parts(gas_cache, quote_engine, Metrics::new()?))
    }

    #[must_use]
    pub fn from_parts(
        gas_cache: Arc<RefreshingScalarCache>,
        quote_engine: PoolQuoteEngine,
        metrics: Metrics,
    ) -> Self {
        Self {
            gas_cache,
            quote_engine,
            metrics,
        }
    }

    /// Warms the gas price cache and starts background polling.
    pub async fn start(&self) {
        self.gas_cache.start().await;

        match self.gas_cache.snapshot().await {
            Some(gas) => info!(
                "Gas price cache warmed: {} wei ({} gwei)",
                gas.value,
                wei_to_gwei(gas.value).map_or_else(|| "n/a".to_string(), |g| g.to_string())
            ),
            None => info!("Gas price cache still empty after warm-up"),
        }
    }

    pub async fn shutdown(&self) {
        self.gas_cache.stop().await;
    }

    pub async fn get_cached_gas_price(&self) -> GasPriceResponse {
        GasPriceResponse::from(self.gas_cache.read().await)
    }

    pub async fn get_swap_quote(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: &BigUint,
    ) -> Result<SwapQuoteResponse> {
        let result = self
            .quote_engine
            .quote(token_in, token_out, amount_in)
            .await
            .map(|amount_out| SwapQuoteResponse {
                amount_out: amount_out.to_string(),
            });

        self.metrics.record_quote(quote_outcome(&result));
        result
    }

    /// Counts a request rejected before it reached the engine.
    pub fn record_rejected_quote(&self) {
        self.metrics.record_quote("invalid_input");
    }

    pub async fn render_metrics(&self) -> Result<String> {
        let stats = self.gas_cache.stats().await;
        let current = self.gas_cache.snapshot().await;
        self.metrics.render(&stats, current.as_ref())
    }
}
