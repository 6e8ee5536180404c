use crate::{
    CycleError, DynamicConfig, LifecycleError, PriceServiceConfig, PriceServiceResult,
    config::ConfigHolder,
    metrics,
    sources::{GasPriceEstimator, OffRampReader, PriceGetter, PriceRegistryReader},
};
use alloy::primitives::{Address, U256};
use rand::Rng;
use relay_price_store::PriceStore;
use relay_types::{ChainSelector, GasPriceRecord};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    task::JoinHandle,
    time::{Instant, Interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Exactly-once start/stop state for the background refresh task. There
/// is no transition back to `Running`.
enum Lifecycle {
    Unstarted,
    Running { cancel: CancellationToken, task: JoinHandle<()> },
    Stopped,
}

/// State shared between the service handle and its background task.
pub(crate) struct Inner<S> {
    pub(crate) config: PriceServiceConfig,
    pub(crate) store: S,
    pub(crate) price_getter: Arc<dyn PriceGetter>,
    pub(crate) off_ramp: Arc<dyn OffRampReader>,
    pub(crate) dynamic: ConfigHolder,
}

/// Background price cache for one lane.
///
/// While running, a single background task periodically observes the
/// source chain's USD gas price and the destination chain's token USD
/// prices, and upserts them through the [`PriceStore`]. Consensus-round
/// callers read the cached rows back with [`Self::get_prices`]; readers
/// never trigger observation themselves.
///
/// The service starts without a gas estimator or registry reader; both
/// arrive through [`Self::update_dynamic_config`]. Until then refresh
/// cycles are skipped.
pub struct PriceService<S> {
    inner: Arc<Inner<S>>,
    lifecycle: Mutex<Lifecycle>,
}

impl<S> core::fmt::Debug for PriceService<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PriceService")
            .field("dest_chain_selector", &self.inner.config.dest_chain_selector)
            .field("source_chain_selector", &self.inner.config.source_chain_selector)
            .finish_non_exhaustive()
    }
}

impl<S: PriceStore + 'static> PriceService<S> {
    /// Create a new, unstarted price service.
    pub fn new(
        config: PriceServiceConfig,
        store: S,
        price_getter: Arc<dyn PriceGetter>,
        off_ramp: Arc<dyn OffRampReader>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                store,
                price_getter,
                off_ramp,
                dynamic: ConfigHolder::new(),
            }),
            lifecycle: Mutex::new(Lifecycle::Unstarted),
        }
    }

    /// The service's static configuration.
    pub fn config(&self) -> &PriceServiceConfig {
        &self.inner.config
    }

    /// Launch the background refresh task.
    ///
    /// Succeeds exactly once; a second call returns
    /// [`LifecycleError::AlreadyStarted`], and a call after [`Self::close`]
    /// returns [`LifecycleError::AlreadyStopped`].
    pub fn start(&self) -> Result<(), LifecycleError> {
        let mut lifecycle = self.lifecycle.lock().unwrap();
        match &*lifecycle {
            Lifecycle::Unstarted => {}
            Lifecycle::Running { .. } => return Err(LifecycleError::AlreadyStarted),
            Lifecycle::Stopped => return Err(LifecycleError::AlreadyStopped),
        }

        info!(
            dest_chain_selector = self.inner.config.dest_chain_selector,
            source_chain_selector = self.inner.config.source_chain_selector,
            "starting price service"
        );
        let cancel = CancellationToken::new();
        let task = tokio::spawn(Arc::clone(&self.inner).task_future(cancel.clone()));
        *lifecycle = Lifecycle::Running { cancel, task };
        Ok(())
    }

    /// Stop the background refresh task and wait for it to exit.
    ///
    /// When this returns, no further observation or persistence work
    /// happens on the service's behalf. Succeeds exactly once.
    pub async fn close(&self) -> Result<(), LifecycleError> {
        let (cancel, task) = {
            let mut lifecycle = self.lifecycle.lock().unwrap();
            match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
                Lifecycle::Running { cancel, task } => (cancel, task),
                Lifecycle::Unstarted => {
                    *lifecycle = Lifecycle::Unstarted;
                    return Err(LifecycleError::NotStarted);
                }
                Lifecycle::Stopped => return Err(LifecycleError::AlreadyStopped),
            }
        };

        info!("closing price service");
        cancel.cancel();
        if let Err(err) = task.await {
            error!(%err, "price refresh task terminated abnormally");
        }
        Ok(())
    }

    /// Install a new gas estimator / registry reader pair, then refresh
    /// both price series immediately so the new config takes effect
    /// without waiting out a full interval.
    ///
    /// The swap is atomic with respect to in-flight cycles. Failures of
    /// the triggered refreshes are logged and counted, never returned:
    /// the next scheduled tick retries with the installed config.
    pub async fn update_dynamic_config(
        &self,
        gas_estimator: Arc<dyn GasPriceEstimator>,
        price_registry: Arc<dyn PriceRegistryReader>,
    ) {
        self.inner.dynamic.install(DynamicConfig { gas_estimator, price_registry }).await;
        info!("installed new dynamic config, refreshing prices");

        if let Err(err) = self.inner.run_gas_cycle().await {
            metrics::inc_gas_cycle_failures();
            error!(%err, "gas price refresh after dynamic config update failed");
        }
        if let Err(err) = self.inner.run_token_cycle().await {
            metrics::inc_token_cycle_failures();
            error!(%err, "token price refresh after dynamic config update failed");
        }
    }

    /// Fetch the cached gas and token prices for a destination chain.
    ///
    /// Both row sets are fetched concurrently and joined fail-fast: if
    /// either fetch errors, the whole call errors and no partial result
    /// is returned. Rows come straight from the store; staleness is
    /// bounded only by the write cadence, and one series may have been
    /// refreshed a cycle ahead of the other.
    pub async fn get_prices(
        &self,
        dest_chain_selector: ChainSelector,
    ) -> PriceServiceResult<(HashMap<ChainSelector, U256>, HashMap<Address, U256>)> {
        let (gas_rows, token_rows) = tokio::try_join!(
            self.inner.store.gas_prices(dest_chain_selector),
            self.inner.store.token_prices(dest_chain_selector),
        )?;

        let gas_prices = gas_rows
            .into_iter()
            .map(|row| (row.source_chain_selector, row.gas_price_usd))
            .collect();
        let token_prices =
            token_rows.into_iter().map(|row| (row.token, row.price_usd)).collect();
        Ok((gas_prices, token_prices))
    }
}

impl<S: PriceStore> Inner<S> {
    /// Body of the background task: wait on whichever of cancellation
    /// or the two jittered timers fires first, and run the matching
    /// cycle. Cycle failures are logged and retried on the next tick.
    async fn task_future(self: Arc<Self>, cancel: CancellationToken) {
        let mut gas_timer = jittered_interval(self.config.gas_price_interval);
        let mut token_timer = jittered_interval(self.config.token_price_interval);

        loop {
            // NB: biased select ensures cancellation wins over a timer
            // that became ready in the same poll.
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("price refresh task exiting");
                    return;
                }
                _ = gas_timer.tick() => {
                    if let Err(err) = self.run_gas_cycle().await {
                        metrics::inc_gas_cycle_failures();
                        error!(
                            %err,
                            invariant = err.is_invariant_violation(),
                            "background gas price refresh failed"
                        );
                    }
                }
                _ = token_timer.tick() => {
                    if let Err(err) = self.run_token_cycle().await {
                        metrics::inc_token_cycle_failures();
                        error!(
                            %err,
                            invariant = err.is_invariant_violation(),
                            "background token price refresh failed"
                        );
                    }
                }
            }
        }
    }

    /// Run one gas price observation-and-persist cycle.
    ///
    /// The dynamic config read guard is held from fetch through persist,
    /// so a concurrent [`ConfigHolder::install`] can never land in the
    /// middle of a cycle.
    pub(crate) async fn run_gas_cycle(&self) -> Result<(), CycleError> {
        let snapshot = self.dynamic.snapshot().await;
        let Some(config) = snapshot.as_ref() else {
            info!("skipping gas price refresh, dynamic config not delivered yet");
            metrics::inc_cycles_skipped();
            return Ok(());
        };

        let gas_price_usd = self.observe_gas_price(config).await?;
        self.store
            .upsert_gas_prices(
                self.config.dest_chain_selector,
                vec![GasPriceRecord {
                    source_chain_selector: self.config.source_chain_selector,
                    gas_price_usd,
                }],
            )
            .await?;
        metrics::inc_gas_cycles();
        Ok(())
    }

    /// Run one token price observation-and-persist cycle. Rows are
    /// written sorted by address, with the refresh interval as their
    /// staleness TTL.
    pub(crate) async fn run_token_cycle(&self) -> Result<(), CycleError> {
        let snapshot = self.dynamic.snapshot().await;
        let Some(config) = snapshot.as_ref() else {
            info!("skipping token price refresh, dynamic config not delivered yet");
            metrics::inc_cycles_skipped();
            return Ok(());
        };

        let prices = self.observe_token_prices(config).await?;
        self.store
            .upsert_token_prices(
                self.config.dest_chain_selector,
                prices,
                self.config.token_price_interval,
            )
            .await?;
        metrics::inc_token_cycles();
        Ok(())
    }
}

/// A timer with the base period stretched by ±10%, so fleet instances
/// sharing a deploy time don't all hit the market-data source and the
/// store on the same wall-clock tick.
fn jittered_interval(base: Duration) -> Interval {
    let period = jittered(base);
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

fn jittered(base: Duration) -> Duration {
    base.mul_f64(rand::rng().random_range(0.9..=1.1))
}
