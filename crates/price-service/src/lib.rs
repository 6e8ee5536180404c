#![doc = include_str!("../README.md")]
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod builder;
pub use builder::{BuilderError, PriceServiceBuilder};

mod config;
pub use config::{
    DEFAULT_GAS_PRICE_INTERVAL, DEFAULT_TOKEN_PRICE_INTERVAL, DynamicConfig, PriceServiceConfig,
};

mod error;
pub use error::{CycleError, LifecycleError, PriceServiceError, PriceServiceResult};

pub(crate) mod metrics;

mod observe;

mod service;
pub use service::PriceService;

mod sources;
pub use sources::{
    GasPriceEstimator, OffRampReader, PriceGetter, PriceRegistryReader, SourceError, SourceResult,
};
