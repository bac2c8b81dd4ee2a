/*
 * Gas price module: background-refreshed cache over a scalar read from the node
 */

mod cache;
mod source;

use async_trait::async_trait;
use crate::models::Result;

pub use cache::RefreshingScalarCache;
pub use source::GasPriceSource;

/// Something that can read one hex-encoded scalar from the node.
#[async_trait]
pub trait ScalarSource: Send + Sync {
    async fn fetch_raw(&self) -> Result<String>;
}
