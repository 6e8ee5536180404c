use crate::ChainSelector;
use alloy::primitives::{Address, U256, U512, uint};

/// Fixed-point scale for USD values: $1.00 is represented as `1e18`.
pub const USD_SCALE: U256 = uint!(1_000_000_000_000_000_000_U256);

/// One persisted gas price row. There is exactly one row per
/// (destination, source) chain pair; an upsert overwrites the prior
/// value for that pair.
///
/// The destination chain selector is carried by the storage call, not
/// the record, since every record in a batch targets the same
/// destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GasPriceRecord {
    /// The chain whose gas cost this row prices.
    pub source_chain_selector: ChainSelector,
    /// Gas price denominated in USD, 1e18 fixed-point.
    pub gas_price_usd: U256,
}

/// One persisted token price row, keyed by token address under a
/// destination chain. An upsert overwrites the prior value and
/// refreshes the row's write timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TokenPriceRecord {
    /// The token's address on the destination chain.
    pub token: Address,
    /// USD value of 1e18 of the token's smallest on-chain unit, 1e18
    /// fixed-point. See [`usd_per_1e18_token_unit`].
    pub price_usd: U256,
}

/// Convert a USD-per-whole-token price into the USD value of 1e18 of
/// the token's smallest on-chain unit.
///
/// The input price is USD per whole token at 1e18 fixed-point; the
/// output is USD per 1e18 smallest units, also 1e18 fixed-point.
/// Division truncates toward zero. The intermediate product is taken
/// at 512 bits, so the scaling itself cannot overflow; a result too
/// large for [`U256`] saturates at [`U256::MAX`].
///
/// Example: 1 USDC is $1.00 (`1e18`) and USDC has 6 decimals, so
/// `1e18 * 1e18 / 1e6 = 1e30`.
pub fn usd_per_1e18_token_unit(price_usd: U256, decimals: u8) -> U256 {
    let scaled = (U512::from(price_usd) * U512::from(USD_SCALE))
        / U512::from(10u64).pow(U512::from(decimals));
    scaled.saturating_to()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usdc_example() {
        // $1.00 at 6 decimals -> 1e30
        let got = usd_per_1e18_token_unit(USD_SCALE, 6);
        assert_eq!(got, uint!(1_000_000_000_000_000_000_000_000_000_000_U256));
    }

    #[test]
    fn eighteen_decimals_is_identity() {
        let price = uint!(2_345_000_000_000_000_000_U256);
        assert_eq!(usd_per_1e18_token_unit(price, 18), price);
    }

    #[test]
    fn zero_decimals_scales_up() {
        assert_eq!(usd_per_1e18_token_unit(U256::from(7u64), 0), U256::from(7u64) * USD_SCALE);
    }

    #[test]
    fn division_truncates_toward_zero() {
        // 1 wei of price at 18 decimals survives; odd remainders drop.
        let price = U256::from(5u64);
        let got = usd_per_1e18_token_unit(price, 18);
        assert_eq!(got, price);

        // 3 / 1e18 of a dollar at 18 decimals: 3 * 1e18 / 1e18 = 3.
        let got = usd_per_1e18_token_unit(U256::from(3u64), 18);
        assert_eq!(got, U256::from(3u64));

        // Remainders are dropped: 7 * 1e18 / 1e19 floors to 0.7e18.
        let got = usd_per_1e18_token_unit(U256::from(7u64) * USD_SCALE, 19);
        assert_eq!(got, uint!(700_000_000_000_000_000_U256));
    }

    #[test]
    fn huge_prices_never_overflow() {
        // The full 256-bit range survives the 18-decimal identity path.
        assert_eq!(usd_per_1e18_token_unit(U256::MAX, 18), U256::MAX);

        // At low decimals the scaled result exceeds 256 bits and
        // saturates instead of panicking.
        assert_eq!(usd_per_1e18_token_unit(U256::MAX, 0), U256::MAX);
        assert_eq!(usd_per_1e18_token_unit(U256::MAX, 6), U256::MAX);
    }

    #[test]
    fn zero_price_stays_zero() {
        for decimals in 0..=18 {
            assert_eq!(usd_per_1e18_token_unit(U256::ZERO, decimals), U256::ZERO);
        }
    }
}
