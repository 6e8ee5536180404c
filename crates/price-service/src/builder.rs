use crate::{
    PriceService, PriceServiceConfig,
    sources::{OffRampReader, PriceGetter},
};
use relay_price_store::PriceStore;
use std::sync::Arc;

/// Errors that can occur while building a [`PriceService`] with a
/// [`PriceServiceBuilder`].
#[derive(Debug, thiserror::Error, Copy, Clone, PartialEq, Eq)]
pub enum BuilderError {
    /// The service configuration was not provided.
    #[error("service config is required")]
    MissingConfig,
    /// The price store was not provided.
    #[error("price store is required")]
    MissingStore,
    /// The price getter was not provided.
    #[error("price getter is required")]
    MissingPriceGetter,
    /// The off-ramp reader was not provided.
    #[error("off-ramp reader is required")]
    MissingOffRamp,
}

/// Builder for the [`PriceService`].
#[derive(Clone)]
pub struct PriceServiceBuilder<S> {
    config: Option<PriceServiceConfig>,
    store: Option<S>,
    price_getter: Option<Arc<dyn PriceGetter>>,
    off_ramp: Option<Arc<dyn OffRampReader>>,
}

impl<S> core::fmt::Debug for PriceServiceBuilder<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PriceServiceBuilder")
            .field("config", &self.config)
            .field("store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl<S> Default for PriceServiceBuilder<S> {
    fn default() -> Self {
        Self { config: None, store: None, price_getter: None, off_ramp: None }
    }
}

impl<S> PriceServiceBuilder<S> {
    /// Create an empty builder.
    pub const fn new() -> Self {
        Self { config: None, store: None, price_getter: None, off_ramp: None }
    }

    /// Set the service configuration.
    pub const fn with_config(mut self, config: PriceServiceConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the price store to persist through.
    pub fn with_store<S2>(self, store: S2) -> PriceServiceBuilder<S2> {
        PriceServiceBuilder {
            config: self.config,
            store: Some(store),
            price_getter: self.price_getter,
            off_ramp: self.off_ramp,
        }
    }

    /// Set the market-data price getter.
    pub fn with_price_getter(mut self, price_getter: Arc<dyn PriceGetter>) -> Self {
        self.price_getter = Some(price_getter);
        self
    }

    /// Set the destination off-ramp reader.
    pub fn with_off_ramp(mut self, off_ramp: Arc<dyn OffRampReader>) -> Self {
        self.off_ramp = Some(off_ramp);
        self
    }
}

impl<S: PriceStore + 'static> PriceServiceBuilder<S> {
    /// Build the [`PriceService`] with the provided parameters. The
    /// service is returned unstarted.
    pub fn build(self) -> Result<PriceService<S>, BuilderError> {
        let config = self.config.ok_or(BuilderError::MissingConfig)?;
        let store = self.store.ok_or(BuilderError::MissingStore)?;
        let price_getter = self.price_getter.ok_or(BuilderError::MissingPriceGetter)?;
        let off_ramp = self.off_ramp.ok_or(BuilderError::MissingOffRamp)?;

        Ok(PriceService::new(config, store, price_getter, off_ramp))
    }
}
