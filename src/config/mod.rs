/*
 * Configuration management for the gauge service
 */

use crate::models::{GaugeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

pub const MIN_GAS_FETCH_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ethereum: ChainConfig,
    pub gas: GasConfig,
    pub uniswap: UniswapConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
    pub rpc_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GasConfig {
    pub fetch_interval_ms: u64,
}

impl GasConfig {
    #[must_use]
    pub fn fetch_interval(&self) -> Duration {
        Duration::from_millis(self.fetch_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UniswapConfig {
    pub factory_address: String,
}

/// Flat view of the environment, before validation.
#[derive(Debug, Deserialize)]
struct EnvSettings {
    eth_rpc_url: Option<String>,
    port: String,
    server_host: String,
    log_level: String,
    gas_fetch_interval_ms: String,
    uniswap_v2_factory_address: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::load(::config::Environment::default())
    }

    /// Same as [`Config::from_env`] but reads variables from `vars` instead of the process.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::load(::config::Environment::default().source(Some(vars.into_iter().collect())))
    }

    fn load(env: ::config::Environment) -> Result<Self> {
        let settings = ::config::Config::builder()
            .set_default("port", "3000")
            .and_then(|b| b.set_default("server_host", "0.0.0.0"))
            .and_then(|b| b.set_default("log_level", "info"))
            .and_then(|b| b.set_default("gas_fetch_interval_ms", "5000"))
            .map_err(|e| GaugeError::ConfigError(format!("Invalid defaults: {e}")))?
            .add_source(env)
            .build()
            .and_then(|c| c.try_deserialize::<EnvSettings>())
            .map_err(|e| GaugeError::ConfigError(format!("Failed to read environment: {e}")))?;

        Self::validate(settings)
    }

    fn validate(env: EnvSettings) -> Result<Self> {
        let mut issues = Vec::new();

        let rpc_url = env.eth_rpc_url.unwrap_or_default().trim().to_string();
        if rpc_url.is_empty() {
            issues.push("ETH_RPC_URL: ETH_RPC_URL is required".to_string());
        } else if !has_http_scheme(&rpc_url) {
            issues.push("ETH_RPC_URL: ETH_RPC_URL must start with http:// or https://".to_string());
        }

        // numbers are parsed here so a malformed one is reported alongside the rest
        let port = match env.port.trim().parse::<u16>() {
            Ok(port) if port >= 1 => port,
            _ => {
                issues.push("PORT: PORT must be between 1 and 65535".to_string());
                0
            }
        };

        let host = env.server_host.trim().parse::<IpAddr>().unwrap_or_else(|_| {
            issues.push(format!("SERVER_HOST: invalid IP address {:?}", env.server_host));
            IpAddr::from([0, 0, 0, 0])
        });

        let fetch_interval_ms = match env.gas_fetch_interval_ms.trim().parse::<u64>() {
            Ok(ms) if ms >= MIN_GAS_FETCH_INTERVAL_MS => ms,
            _ => {
                issues.push(format!(
                    "GAS_FETCH_INTERVAL_MS: GAS_FETCH_INTERVAL_MS must be >={MIN_GAS_FETCH_INTERVAL_MS}"
                ));
                0
            }
        };

        let factory_address = env
            .uniswap_v2_factory_address
            .unwrap_or_default()
            .trim()
            .to_string();
        if crate::utils::parse_address(&factory_address).is_err() {
            issues.push(
                "UNISWAP_V2_FACTORY_ADDRESS: UNISWAP_V2_FACTORY_ADDRESS must match 0x[a-fA-F0-9]{40}"
                    .to_string(),
            );
        }

        if !issues.is_empty() {
            return Err(GaugeError::ConfigError(format!(
                "Configuration validation failed: {}",
                issues.join("; ")
            )));
        }

        Ok(Config {
            server: ServerConfig {
                host,
                port,
                log_level: env.log_level,
            },
            ethereum: ChainConfig { rpc_url },
            gas: GasConfig { fetch_interval_ms },
            uniswap: UniswapConfig { factory_address },
        })
    }
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("http://")
        .or_else(|| lower.strip_prefix("https://"));
    matches!(rest, Some(host) if !host.is_empty())
}
