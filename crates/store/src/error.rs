/// Result using [`StoreError`] as the default error type.
pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;

/// Errors surfaced by a [`PriceStore`] backend.
///
/// [`PriceStore`]: crate::PriceStore
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not serve the request.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn core::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wrap a backend-specific error.
    pub fn backend(err: impl Into<Box<dyn core::error::Error + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }
}
