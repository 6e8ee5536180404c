use crate::sources::SourceError;
use relay_price_store::StoreError;
use relay_types::TokenId;

/// Result using [`PriceServiceError`] as the default error type.
pub type PriceServiceResult<T, E = PriceServiceError> = std::result::Result<T, E>;

/// Lifecycle misuse errors. These indicate a caller bug, and never
/// affect an already-running refresh task.
#[derive(Debug, thiserror::Error, Copy, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// `start` was called on a service that is already running.
    #[error("price service already started")]
    AlreadyStarted,
    /// `close` was called on a service that was never started.
    #[error("price service not started")]
    NotStarted,
    /// `start` or `close` was called on a service that is already
    /// stopped.
    #[error("price service already stopped")]
    AlreadyStopped,
}

/// Errors that abort a single refresh cycle.
///
/// Cycle errors are logged by the scheduler and retried on the next
/// tick; they never stop the background task. The invariant variants
/// (see [`Self::is_invariant_violation`]) indicate a bug rather than
/// transient upstream unavailability.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// The market-data source failed to serve a price request.
    #[error("market-data source error: {0}")]
    PriceSource(#[source] SourceError),
    /// The gas price estimator failed.
    #[error("gas price estimator error: {0}")]
    GasEstimator(#[source] SourceError),
    /// The destination price registry reader failed.
    #[error("destination price registry error: {0}")]
    Registry(#[source] SourceError),
    /// The destination off-ramp reader failed.
    #[error("destination off-ramp error: {0}")]
    OffRamp(#[source] SourceError),
    /// The market-data source did not return the source chain's native
    /// token price.
    #[error("missing source native ({0}) price")]
    MissingNativePrice(TokenId),
    /// The registry returned a different number of decimal entries than
    /// tokens requested.
    #[error("registry returned {returned} decimal entries for {requested} tokens")]
    DecimalsMismatch {
        /// Number of tokens in the lookup request.
        requested: usize,
        /// Number of decimal entries returned.
        returned: usize,
    },
    /// A token selected for observation vanished from the working set.
    #[error("price for {0} missing from the working set")]
    MissingWorkingSetPrice(TokenId),
    /// The persistence write failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CycleError {
    /// Returns true if the error indicates an internal inconsistency
    /// rather than transient upstream unavailability.
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::DecimalsMismatch { .. } | Self::MissingWorkingSetPrice(_))
    }

    /// Market-data source error.
    pub fn price_source(err: impl Into<SourceError>) -> Self {
        Self::PriceSource(err.into())
    }

    /// Gas price estimator error.
    pub fn gas_estimator(err: impl Into<SourceError>) -> Self {
        Self::GasEstimator(err.into())
    }

    /// Destination price registry error.
    pub fn registry(err: impl Into<SourceError>) -> Self {
        Self::Registry(err.into())
    }

    /// Destination off-ramp error.
    pub fn off_ramp(err: impl Into<SourceError>) -> Self {
        Self::OffRamp(err.into())
    }
}

/// Errors surfaced by the price service's public API.
#[derive(Debug, thiserror::Error)]
pub enum PriceServiceError {
    /// Lifecycle misuse.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    /// A refresh cycle failed.
    #[error(transparent)]
    Cycle(#[from] CycleError),
    /// A read against the persistence layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PriceServiceError {
    /// Returns true if the error is a lifecycle misuse error.
    pub const fn is_lifecycle(&self) -> bool {
        matches!(self, Self::Lifecycle(_))
    }
}
