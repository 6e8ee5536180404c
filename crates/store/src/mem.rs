use crate::{PriceStore, StoreError, StoreResult};
use alloy::primitives::{Address, U256};
use relay_types::{ChainSelector, GasPriceRecord, TokenPriceRecord};
use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::{Duration, Instant},
};

/// A token row plus the bookkeeping the store needs for TTL eviction.
#[derive(Debug, Clone, Copy)]
struct TokenRow {
    price_usd: U256,
    written_at: Instant,
    ttl: Duration,
}

#[derive(Debug, Default)]
struct Tables {
    gas: BTreeMap<(ChainSelector, ChainSelector), U256>,
    tokens: BTreeMap<(ChainSelector, Address), TokenRow>,
}

/// A simple in-memory [`PriceStore`] backed by [`BTreeMap`]s under an
/// [`RwLock`].
///
/// Upserts are last-write-wins per key. Token rows carry their write
/// timestamp and TTL; expired rows are dropped on read. This
/// implementation is primarily intended for testing and development
/// purposes.
#[derive(Debug, Clone, Default)]
pub struct MemPriceStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemPriceStore {
    /// Create a new empty in-memory price store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the table read lock, degrading poisoning to a store
    /// error rather than a panic.
    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::backend("price tables lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::backend("price tables lock poisoned"))
    }
}

#[async_trait::async_trait]
impl PriceStore for MemPriceStore {
    async fn gas_prices(&self, dest: ChainSelector) -> StoreResult<Vec<GasPriceRecord>> {
        let tables = self.read()?;
        Ok(tables
            .gas
            .range((dest, ChainSelector::MIN)..=(dest, ChainSelector::MAX))
            .map(|(&(_, source), &gas_price_usd)| GasPriceRecord {
                source_chain_selector: source,
                gas_price_usd,
            })
            .collect())
    }

    async fn token_prices(&self, dest: ChainSelector) -> StoreResult<Vec<TokenPriceRecord>> {
        let tables = self.read()?;
        Ok(tables
            .tokens
            .range((dest, Address::ZERO)..=(dest, Address::repeat_byte(0xff)))
            .filter(|(_, row)| row.written_at.elapsed() <= row.ttl)
            .map(|(&(_, token), row)| TokenPriceRecord { token, price_usd: row.price_usd })
            .collect())
    }

    async fn upsert_gas_prices(
        &self,
        dest: ChainSelector,
        prices: Vec<GasPriceRecord>,
    ) -> StoreResult<()> {
        let mut tables = self.write()?;
        for price in prices {
            tables.gas.insert((dest, price.source_chain_selector), price.gas_price_usd);
        }
        Ok(())
    }

    async fn upsert_token_prices(
        &self,
        dest: ChainSelector,
        prices: Vec<TokenPriceRecord>,
        ttl: Duration,
    ) -> StoreResult<()> {
        let written_at = Instant::now();
        let mut tables = self.write()?;
        for price in prices {
            tables
                .tokens
                .insert((dest, price.token), TokenRow { price_usd: price.price_usd, written_at, ttl });
        }
        Ok(())
    }
}
