//! Price observation: how one refresh cycle turns upstream data into
//! rows ready to persist.

use crate::{CycleError, DynamicConfig, service::Inner};
use alloy::primitives::{Address, U256};
use itertools::Itertools;
use relay_price_store::PriceStore;
use relay_types::{TokenId, TokenPriceRecord, usd_per_1e18_token_unit};
use std::collections::HashMap;
use tracing::{debug, info};

impl<S: PriceStore> Inner<S> {
    /// Observe the source chain's current gas price, denominated in USD
    /// (1e18 fixed-point).
    pub(crate) async fn observe_gas_price(
        &self,
        config: &DynamicConfig,
    ) -> Result<U256, CycleError> {
        let source_native =
            TokenId::new(self.config.source_native, self.config.source_chain_selector);

        let raw_prices = self
            .price_getter
            .usd_prices(std::slice::from_ref(&source_native))
            .await
            .map_err(CycleError::price_source)?;
        let native_price_usd =
            *raw_prices.get(&source_native).ok_or(CycleError::MissingNativePrice(source_native))?;

        let gas_price = config.gas_estimator.gas_price().await.map_err(CycleError::gas_estimator)?;
        let gas_price_usd = config
            .gas_estimator
            .denominate_in_usd(gas_price, native_price_usd)
            .await
            .map_err(CycleError::gas_estimator)?;

        info!(
            source_chain_selector = self.config.source_chain_selector,
            dest_chain_selector = self.config.dest_chain_selector,
            source_native = %self.config.source_native,
            %gas_price,
            %native_price_usd,
            %gas_price_usd,
            "observed latest gas price"
        );
        Ok(gas_price_usd)
    }

    /// Observe USD prices for the destination chain's tokens, normalized
    /// to USD per 1e18 smallest units and sorted by token address.
    pub(crate) async fn observe_token_prices(
        &self,
        config: &DynamicConfig,
    ) -> Result<Vec<TokenPriceRecord>, CycleError> {
        let dest = self.config.dest_chain_selector;

        let mut working_set =
            self.price_getter.job_spec_usd_prices().await.map_err(CycleError::price_source)?;
        debug!(prices = ?working_set, "raw job spec token prices");

        if let Some(price_usd) = self.backfill_dest_native_price(config, &working_set).await? {
            working_set.insert(TokenId::new(self.config.source_native, dest), price_usd);
        }

        // The working set holds source native and destination tokens;
        // only destination chain tokens are observed. Addresses are
        // sorted so downstream ordering is deterministic.
        let dest_tokens: Vec<Address> = working_set
            .keys()
            .filter(|id| id.chain_selector == dest)
            .map(|id| id.address)
            .sorted_unstable()
            .collect();

        let decimals =
            config.price_registry.token_decimals(&dest_tokens).await.map_err(CycleError::registry)?;
        if decimals.len() != dest_tokens.len() {
            return Err(CycleError::DecimalsMismatch {
                requested: dest_tokens.len(),
                returned: decimals.len(),
            });
        }

        let mut records = Vec::with_capacity(dest_tokens.len());
        for (token, decimals) in dest_tokens.into_iter().zip(decimals) {
            let id = TokenId::new(token, dest);
            let price_usd =
                *working_set.get(&id).ok_or(CycleError::MissingWorkingSetPrice(id))?;
            records
                .push(TokenPriceRecord { token, price_usd: usd_per_1e18_token_unit(price_usd, decimals) });
        }

        info!(
            source_chain_selector = self.config.source_chain_selector,
            dest_chain_selector = dest,
            prices = ?records,
            "observed latest token prices"
        );
        Ok(records)
    }

    /// Decide whether the destination chain's native token price must be
    /// backfilled from the source native price.
    ///
    /// Older job specs could not declare the same token address under
    /// two chain selectors, so lanes whose source native token is also
    /// registered on the destination chain shipped specs with the
    /// destination-native price missing. When that gap is detected the
    /// source native price is reused verbatim, on the assumption that
    /// the shared address denotes the same token.
    ///
    /// Returns `None` when nothing should be backfilled: the price is
    /// already present, the address collision does not apply, or the
    /// source native price itself is unavailable.
    pub(crate) async fn backfill_dest_native_price(
        &self,
        config: &DynamicConfig,
        working_set: &HashMap<TokenId, U256>,
    ) -> Result<Option<U256>, CycleError> {
        let dest_native =
            TokenId::new(self.config.source_native, self.config.dest_chain_selector);
        if working_set.contains_key(&dest_native) {
            debug!(%dest_native, "destination native price already present, job spec is current");
            return Ok(None);
        }

        let fee_tokens =
            config.price_registry.fee_token_addresses().await.map_err(CycleError::registry)?;
        let bridged_tokens =
            self.off_ramp.bridged_token_addresses().await.map_err(CycleError::off_ramp)?;
        let dest_tokens: Vec<Address> =
            fee_tokens.into_iter().chain(bridged_tokens).sorted_unstable().dedup().collect();

        if !dest_tokens.contains(&self.config.source_native) {
            debug!(
                source_native = %self.config.source_native,
                "source native address not registered on destination, price is not missing"
            );
            return Ok(None);
        }

        let source_native =
            TokenId::new(self.config.source_native, self.config.source_chain_selector);
        match working_set.get(&source_native) {
            Some(&price_usd) => {
                debug!(
                    %source_native,
                    %price_usd,
                    "backfilling destination native price from source native"
                );
                Ok(Some(price_usd))
            }
            None => {
                debug!(%source_native, "source native price unavailable, leaving gap in place");
                Ok(None)
            }
        }
    }
}
