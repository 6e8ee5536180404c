//! Mock collaborators and store wrappers for price service tests.

use alloy::primitives::{Address, U256, address};
use relay_price_store::{MemPriceStore, PriceStore, StoreError, StoreResult};
use relay_types::{
    ChainSelector, GasPriceRecord, TokenId, TokenPriceRecord, USD_SCALE,
};
use relay_price_service::{
    GasPriceEstimator, OffRampReader, PriceGetter, PriceRegistryReader, PriceService,
    PriceServiceBuilder, PriceServiceConfig, SourceResult,
};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

pub const DEST: ChainSelector = 10;
pub const SOURCE: ChainSelector = 1;

/// Source chain native token; also deployed at the same address on the
/// destination chain in the collision scenarios.
pub const NATIVE: Address = address!("0x00000000000000000000000000000000000aaaaa");

/// An ordinary destination chain token with 6 decimals.
pub const TOKEN_B: Address = address!("0x00000000000000000000000000000000000bbbbb");

/// $2.00 and $1.00 at 1e18 fixed-point.
pub fn two_usd() -> U256 {
    USD_SCALE * U256::from(2u64)
}

pub fn one_usd() -> U256 {
    USD_SCALE
}

// ---------------------------------------------------------------------------
// Mock collaborators
// ---------------------------------------------------------------------------

/// Market-data source backed by a fixed price map. The full map doubles
/// as the job-spec price set.
#[derive(Debug, Default)]
pub struct MockPriceGetter {
    pub prices: HashMap<TokenId, U256>,
    pub fail: bool,
}

impl MockPriceGetter {
    pub fn with_price(mut self, id: TokenId, price: U256) -> Self {
        self.prices.insert(id, price);
        self
    }

    pub fn failing() -> Self {
        Self { prices: HashMap::new(), fail: true }
    }
}

#[async_trait::async_trait]
impl PriceGetter for MockPriceGetter {
    async fn usd_prices(&self, tokens: &[TokenId]) -> SourceResult<HashMap<TokenId, U256>> {
        if self.fail {
            return Err("price getter down".into());
        }
        Ok(tokens.iter().filter_map(|id| self.prices.get(id).map(|p| (*id, *p))).collect())
    }

    async fn job_spec_usd_prices(&self) -> SourceResult<HashMap<TokenId, U256>> {
        if self.fail {
            return Err("price getter down".into());
        }
        Ok(self.prices.clone())
    }
}

/// Estimator returning a fixed raw gas price; USD denomination is
/// `raw * native_usd / 1e18`.
#[derive(Debug)]
pub struct MockGasEstimator {
    pub gas_price: U256,
    pub fail: bool,
}

impl MockGasEstimator {
    pub fn new(gas_price: U256) -> Self {
        Self { gas_price, fail: false }
    }
}

#[async_trait::async_trait]
impl GasPriceEstimator for MockGasEstimator {
    async fn gas_price(&self) -> SourceResult<U256> {
        if self.fail {
            return Err("estimator down".into());
        }
        Ok(self.gas_price)
    }

    async fn denominate_in_usd(
        &self,
        gas_price: U256,
        native_price_usd: U256,
    ) -> SourceResult<U256> {
        Ok(gas_price * native_price_usd / USD_SCALE)
    }
}

/// Registry with a fixed decimals table and fee token list. Unknown
/// tokens read as 18 decimals. `shortfall` drops the last decimals
/// entry to simulate a count mismatch.
#[derive(Debug, Default)]
pub struct MockRegistry {
    pub decimals: HashMap<Address, u8>,
    pub fee_tokens: Vec<Address>,
    pub shortfall: bool,
}

impl MockRegistry {
    pub fn with_decimals(mut self, token: Address, decimals: u8) -> Self {
        self.decimals.insert(token, decimals);
        self
    }

    pub fn with_fee_token(mut self, token: Address) -> Self {
        self.fee_tokens.push(token);
        self
    }
}

#[async_trait::async_trait]
impl PriceRegistryReader for MockRegistry {
    async fn token_decimals(&self, tokens: &[Address]) -> SourceResult<Vec<u8>> {
        let mut out: Vec<u8> =
            tokens.iter().map(|t| self.decimals.get(t).copied().unwrap_or(18)).collect();
        if self.shortfall {
            out.pop();
        }
        Ok(out)
    }

    async fn fee_token_addresses(&self) -> SourceResult<Vec<Address>> {
        Ok(self.fee_tokens.clone())
    }
}

#[derive(Debug, Default)]
pub struct MockOffRamp {
    pub bridged: Vec<Address>,
}

#[async_trait::async_trait]
impl OffRampReader for MockOffRamp {
    async fn bridged_token_addresses(&self) -> SourceResult<Vec<Address>> {
        Ok(self.bridged.clone())
    }
}

// ---------------------------------------------------------------------------
// Store wrappers
// ---------------------------------------------------------------------------

/// Counts upserts so tests can assert that writes stop after `close`.
#[derive(Debug, Clone, Default)]
pub struct CountingStore {
    inner: MemPriceStore,
    writes: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PriceStore for CountingStore {
    async fn gas_prices(&self, dest: ChainSelector) -> StoreResult<Vec<GasPriceRecord>> {
        self.inner.gas_prices(dest).await
    }

    async fn token_prices(&self, dest: ChainSelector) -> StoreResult<Vec<TokenPriceRecord>> {
        self.inner.token_prices(dest).await
    }

    async fn upsert_gas_prices(
        &self,
        dest: ChainSelector,
        prices: Vec<GasPriceRecord>,
    ) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert_gas_prices(dest, prices).await
    }

    async fn upsert_token_prices(
        &self,
        dest: ChainSelector,
        prices: Vec<TokenPriceRecord>,
        ttl: Duration,
    ) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert_token_prices(dest, prices, ttl).await
    }
}

/// Fails reads on demand, for exercising the read API's fail-fast join.
#[derive(Debug, Clone, Default)]
pub struct FailingStore {
    inner: MemPriceStore,
    fail_gas: bool,
    fail_tokens: bool,
}

impl FailingStore {
    pub fn failing_gas() -> Self {
        Self { fail_gas: true, ..Self::default() }
    }

    pub fn failing_tokens() -> Self {
        Self { fail_tokens: true, ..Self::default() }
    }
}

#[async_trait::async_trait]
impl PriceStore for FailingStore {
    async fn gas_prices(&self, dest: ChainSelector) -> StoreResult<Vec<GasPriceRecord>> {
        if self.fail_gas {
            return Err(StoreError::backend("gas table unavailable"));
        }
        self.inner.gas_prices(dest).await
    }

    async fn token_prices(&self, dest: ChainSelector) -> StoreResult<Vec<TokenPriceRecord>> {
        if self.fail_tokens {
            return Err(StoreError::backend("token table unavailable"));
        }
        self.inner.token_prices(dest).await
    }

    async fn upsert_gas_prices(
        &self,
        dest: ChainSelector,
        prices: Vec<GasPriceRecord>,
    ) -> StoreResult<()> {
        self.inner.upsert_gas_prices(dest, prices).await
    }

    async fn upsert_token_prices(
        &self,
        dest: ChainSelector,
        prices: Vec<TokenPriceRecord>,
        ttl: Duration,
    ) -> StoreResult<()> {
        self.inner.upsert_token_prices(dest, prices, ttl).await
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Default lane config with intervals long enough that background ticks
/// never fire during a test; cycles are driven through
/// `update_dynamic_config` instead.
pub fn quiet_config() -> PriceServiceConfig {
    PriceServiceConfig::new(DEST, SOURCE, NATIVE)
        .with_intervals(Duration::from_secs(3600), Duration::from_secs(3600))
}

/// Build an unstarted service over the given store and price getter.
pub fn build_service<S: PriceStore + 'static>(
    config: PriceServiceConfig,
    store: S,
    getter: MockPriceGetter,
    off_ramp: MockOffRamp,
) -> PriceService<S> {
    PriceServiceBuilder::<S>::new()
        .with_config(config)
        .with_store(store)
        .with_price_getter(Arc::new(getter))
        .with_off_ramp(Arc::new(off_ramp))
        .build()
        .expect("all builder fields set")
}
