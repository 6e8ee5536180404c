//! Trait seams for the injected collaborators the service observes
//! prices through. Implementations are supplied by the surrounding
//! process: the market-data client, the lane's gas estimator, and the
//! destination chain's on-chain readers.

use alloy::primitives::{Address, U256};
use relay_types::TokenId;
use std::collections::HashMap;

/// Opaque error produced by an injected collaborator.
pub type SourceError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Result using [`SourceError`] as the default error type.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Supplies raw USD token prices from an external market-data source.
///
/// All prices are USD per whole token at 1e18 fixed-point ($1 = 1e18).
/// Tokens the source cannot price are absent from the returned map; a
/// present entry is always a real price.
#[async_trait::async_trait]
pub trait PriceGetter: Send + Sync {
    /// Fetch USD prices for the requested tokens.
    async fn usd_prices(&self, tokens: &[TokenId]) -> SourceResult<HashMap<TokenId, U256>>;

    /// Fetch USD prices for every token the lane's job spec declares.
    async fn job_spec_usd_prices(&self) -> SourceResult<HashMap<TokenId, U256>>;
}

/// Estimates the source chain's gas price and denominates it in USD.
#[async_trait::async_trait]
pub trait GasPriceEstimator: Send + Sync {
    /// Fetch the current gas price in the source chain's native units.
    async fn gas_price(&self) -> SourceResult<U256>;

    /// Denominate a raw gas price in USD, given the native token's USD
    /// price (1e18 fixed-point).
    async fn denominate_in_usd(
        &self,
        gas_price: U256,
        native_price_usd: U256,
    ) -> SourceResult<U256>;
}

/// Reads the destination chain's price registry contract.
#[async_trait::async_trait]
pub trait PriceRegistryReader: Send + Sync {
    /// Decimal counts for the given tokens, in request order.
    async fn token_decimals(&self, tokens: &[Address]) -> SourceResult<Vec<u8>>;

    /// The registry's fee token addresses.
    async fn fee_token_addresses(&self) -> SourceResult<Vec<Address>>;
}

/// Reads the lane's off-ramp contract on the destination chain.
#[async_trait::async_trait]
pub trait OffRampReader: Send + Sync {
    /// The bridged token addresses the off-ramp supports.
    async fn bridged_token_addresses(&self) -> SourceResult<Vec<Address>>;
}
