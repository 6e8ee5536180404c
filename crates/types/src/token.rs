use alloy::primitives::Address;

/// Globally-unique identifier for a chain, as used by the cross-chain
/// messaging protocol. Distinct from the EVM chain ID.
pub type ChainSelector = u64;

/// Identifies a token unambiguously across chains that share an address
/// space. Two chains may deploy different tokens at the same address, so
/// the address alone is not a usable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TokenId {
    /// The token's contract address on `chain_selector`.
    pub address: Address,
    /// The chain the token lives on.
    pub chain_selector: ChainSelector,
}

impl TokenId {
    /// Create a new token ID.
    pub const fn new(address: Address, chain_selector: ChainSelector) -> Self {
        Self { address, chain_selector }
    }
}

impl core::fmt::Display for TokenId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.address, self.chain_selector)
    }
}
