/*
 * Gauge - cached gas price and Uniswap V2 swap quote service
 * Core library exports and module declarations
 */

pub mod api;
pub mod config;
pub mod dex;
pub mod gas;
pub mod metrics;
pub mod models;
pub mod rpc;
pub mod service;
pub mod utils;

pub use crate::config::Config;
pub use models::*;
pub use service::GaugeService;
