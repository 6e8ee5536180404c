use crate::sources::{GasPriceEstimator, PriceRegistryReader};
use alloy::primitives::Address;
use relay_types::ChainSelector;
use std::{sync::Arc, time::Duration};
use tokio::sync::{RwLock, RwLockReadGuard};

/// Gas prices are refreshed every minute; they move quickly and the
/// cadence matches the consensus round time.
pub const DEFAULT_GAS_PRICE_INTERVAL: Duration = Duration::from_secs(60);

/// Token prices are refreshed every ten minutes. Only blue-chip tokens
/// are tracked and their prices are stable at that resolution.
pub const DEFAULT_TOKEN_PRICE_INTERVAL: Duration = Duration::from_secs(600);

/// Static configuration for one lane's price service instance.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceServiceConfig {
    /// The chain this lane finalizes transfers into. All writes land
    /// under this chain's cache.
    pub dest_chain_selector: ChainSelector,
    /// The chain this lane's transfers originate from.
    pub source_chain_selector: ChainSelector,
    /// Address of the source chain's native (gas) token.
    pub source_native: Address,
    /// Base interval between gas price refreshes.
    #[serde(default = "default_gas_interval")]
    pub gas_price_interval: Duration,
    /// Base interval between token price refreshes. Also used as the
    /// persisted token rows' staleness TTL.
    #[serde(default = "default_token_interval")]
    pub token_price_interval: Duration,
}

const fn default_gas_interval() -> Duration {
    DEFAULT_GAS_PRICE_INTERVAL
}

const fn default_token_interval() -> Duration {
    DEFAULT_TOKEN_PRICE_INTERVAL
}

impl PriceServiceConfig {
    /// Create a config with the default refresh intervals.
    pub const fn new(
        dest_chain_selector: ChainSelector,
        source_chain_selector: ChainSelector,
        source_native: Address,
    ) -> Self {
        Self {
            dest_chain_selector,
            source_chain_selector,
            source_native,
            gas_price_interval: DEFAULT_GAS_PRICE_INTERVAL,
            token_price_interval: DEFAULT_TOKEN_PRICE_INTERVAL,
        }
    }

    /// Override both refresh intervals. Mainly useful in tests, which
    /// run with millisecond cadences.
    pub const fn with_intervals(mut self, gas: Duration, token: Duration) -> Self {
        self.gas_price_interval = gas;
        self.token_price_interval = token;
        self
    }
}

/// The swappable collaborator pair delivered by the consensus plugin's
/// dynamic config: the lane's gas price estimator and the destination
/// chain's price registry reader.
///
/// The pair is replaced as a unit; no cycle ever observes a half-updated
/// combination.
#[derive(Clone)]
pub struct DynamicConfig {
    /// Gas price estimator for the source chain.
    pub gas_estimator: Arc<dyn GasPriceEstimator>,
    /// Price registry reader for the destination chain.
    pub price_registry: Arc<dyn PriceRegistryReader>,
}

impl core::fmt::Debug for DynamicConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DynamicConfig").finish_non_exhaustive()
    }
}

/// Holds the currently-installed [`DynamicConfig`], if any.
///
/// Readers take the read guard for the duration of a whole refresh
/// cycle (fetch, compute, persist), which serializes config swaps
/// against in-flight cycles. Refreshes are infrequent and off any hot
/// path, so the coarse critical section is cheap.
pub(crate) struct ConfigHolder {
    slot: RwLock<Option<DynamicConfig>>,
}

impl ConfigHolder {
    /// Create an empty holder. The held config stays unset until the
    /// first [`install`](Self::install).
    pub(crate) const fn new() -> Self {
        Self { slot: RwLock::const_new(None) }
    }

    /// Atomically replace the held config.
    pub(crate) async fn install(&self, config: DynamicConfig) {
        *self.slot.write().await = Some(config);
    }

    /// Take a read guard on the held config. `None` means no config has
    /// been delivered yet, which is expected between service start and
    /// the first dynamic config update.
    pub(crate) async fn snapshot(&self) -> RwLockReadGuard<'_, Option<DynamicConfig>> {
        self.slot.read().await
    }
}

impl core::fmt::Debug for ConfigHolder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConfigHolder").finish_non_exhaustive()
    }
}
