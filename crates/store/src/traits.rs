use crate::StoreResult;
use relay_types::{ChainSelector, GasPriceRecord, TokenPriceRecord};
use std::time::Duration;

/// Transactional storage for cached price rows, shared by every lane
/// service writing into the same destination chain's cache.
///
/// Implementations must serialize concurrent upserts for the same key
/// (last write wins); the price service adds no write lock of its own.
#[async_trait::async_trait]
pub trait PriceStore: Send + Sync {
    /// Get all gas price rows persisted under the destination chain.
    async fn gas_prices(&self, dest: ChainSelector) -> StoreResult<Vec<GasPriceRecord>>;

    /// Get all live token price rows persisted under the destination
    /// chain. Rows older than their write-time TTL are not returned.
    async fn token_prices(&self, dest: ChainSelector) -> StoreResult<Vec<TokenPriceRecord>>;

    /// Insert or overwrite gas price rows under the destination chain.
    /// One row per source chain selector.
    async fn upsert_gas_prices(
        &self,
        dest: ChainSelector,
        prices: Vec<GasPriceRecord>,
    ) -> StoreResult<()>;

    /// Insert or overwrite token price rows under the destination
    /// chain, refreshing each row's write timestamp. The `ttl` is a
    /// staleness hint: rows not refreshed within it are eligible for
    /// eviction.
    async fn upsert_token_prices(
        &self,
        dest: ChainSelector,
        prices: Vec<TokenPriceRecord>,
        ttl: Duration,
    ) -> StoreResult<()>;
}
