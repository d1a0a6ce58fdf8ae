//! Common types used throughout the harness

use serde::{Deserialize, Serialize};
use std::fmt;

/// On-chain balance / transferred amount
pub type Balance = u128;

/// On-chain clock value, milliseconds since the unix epoch
pub type Timestamp = u64;

/// Block height
pub type BlockNumber = u64;

/// 32-byte account identifier
///
/// Signing accounts are derived directly from an ed25519 verifying key;
/// program instances get theirs from the instantiation address derivation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines readable
        let full = bs58::encode(&self.0).into_string();
        write!(f, "AccountId({}..)", &full[..8.min(full.len())])
    }
}

/// 32-byte block hash
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHash(pub [u8; 32]);

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash(0x{}..)", hex::encode(&self.0[..4]))
    }
}

/// Reference to a produced block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    pub number: BlockNumber,
    pub hash: BlockHash,
}

/// Token identifier
///
/// Exactly one variant is populated; equality and ordering follow the active
/// variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Id {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Bytes(Vec<u8>),
}

impl Default for Id {
    fn default() -> Self {
        Self::U8(0)
    }
}

/// Per-call configuration
///
/// Every field is optional and independently overridable per invocation;
/// unset fields are filled from the binding's defaults at call time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractOptions {
    /// Amount transferred with the call
    #[serde(default)]
    pub value: Option<Balance>,

    /// Execution budget
    #[serde(default)]
    pub gas_limit: Option<u64>,

    /// Optional cap on storage deposits
    #[serde(default)]
    pub storage_deposit_limit: Option<Balance>,
}

impl ContractOptions {
    /// Fill unset fields from `defaults`, leaving set fields untouched
    pub fn merged(&self, defaults: &ContractOptions) -> ContractOptions {
        ContractOptions {
            value: self.value.or(defaults.value),
            gas_limit: self.gas_limit.or(defaults.gas_limit),
            storage_deposit_limit: self
                .storage_deposit_limit
                .or(defaults.storage_deposit_limit),
        }
    }

    pub fn with_value(mut self, value: Balance) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn with_storage_deposit_limit(mut self, limit: Balance) -> Self {
        self.storage_deposit_limit = Some(limit);
        self
    }
}

/// Durability the submitter waits for before returning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionPolicy {
    /// Accepted into a produced block; faster, may still be reorged away
    #[default]
    InBlock,
    /// Irreversible; slower
    Finalized,
}
