//! Configuration module for the harness
//!
//! Handles configuration loading from TOML files and provides the structured
//! configuration types the binding and the test harness consume. The set of
//! available signers is part of this configuration and is injected at harness
//! setup; there is no process-wide signer state.

use crate::signer::Signer;
use crate::types::{Balance, ContractOptions, InclusionPolicy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Main harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Connection configuration
    pub connection: ConnectionConfig,

    /// Per-call defaults
    #[serde(default)]
    pub calls: CallConfig,

    /// Signers available to the harness
    pub signers: SignerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Node endpoint
    pub endpoint: String,

    /// Wait-for-inclusion timeout in milliseconds
    #[serde(default = "default_inclusion_timeout_ms")]
    pub inclusion_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallConfig {
    /// Amount transferred with a call when the caller sets none
    #[serde(default)]
    pub default_value: Balance,

    /// Execution budget when the caller sets none
    #[serde(default = "default_gas_limit")]
    pub default_gas_limit: u64,

    /// Storage deposit cap when the caller sets none
    #[serde(default)]
    pub default_storage_deposit_limit: Option<Balance>,

    /// Durability waited for on submission
    #[serde(default)]
    pub inclusion: InclusionPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Seed strings the harness derives its signers from
    pub seeds: Vec<String>,

    /// Index of the signer allowed to submit privileged clock calls
    #[serde(default)]
    pub clock_authority_index: usize,
}

// Default value functions
fn default_inclusion_timeout_ms() -> u64 {
    30_000
}
fn default_gas_limit() -> u64 {
    5_000_000_000
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            default_value: 0,
            default_gas_limit: default_gas_limit(),
            default_storage_deposit_limit: None,
            inclusion: InclusionPolicy::default(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: HarnessConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Local-node defaults with the conventional dev signers
    pub fn local() -> Self {
        Self {
            connection: ConnectionConfig {
                endpoint: "ws://127.0.0.1:9944".to_string(),
                inclusion_timeout_ms: default_inclusion_timeout_ms(),
            },
            calls: CallConfig::default(),
            signers: SignerConfig {
                seeds: ["alice", "bob", "charlie", "dave"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                clock_authority_index: 0,
            },
        }
    }
}

impl CallConfig {
    /// Resolve into the defaults a binding carries
    pub fn defaults(&self) -> CallDefaults {
        CallDefaults {
            options: ContractOptions {
                value: Some(self.default_value),
                gas_limit: Some(self.default_gas_limit),
                storage_deposit_limit: self.default_storage_deposit_limit,
            },
            policy: self.inclusion,
        }
    }
}

/// Defaults a binding applies to calls that leave options unset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallDefaults {
    pub options: ContractOptions,
    pub policy: InclusionPolicy,
}

impl Default for CallDefaults {
    fn default() -> Self {
        CallConfig::default().defaults()
    }
}

/// The signers available to one harness instance
///
/// Explicit injected state: constructed once at setup from configuration and
/// handed to whatever needs it.
#[derive(Debug, Clone)]
pub struct SignerSet {
    signers: Vec<Arc<Signer>>,
    clock_authority_index: usize,
}

impl SignerSet {
    pub fn from_seeds<S: AsRef<str>>(seeds: &[S]) -> Self {
        Self {
            signers: seeds
                .iter()
                .map(|seed| Arc::new(Signer::from_seed(seed.as_ref())))
                .collect(),
            clock_authority_index: 0,
        }
    }

    pub fn from_config(config: &SignerConfig) -> Self {
        let mut set = Self::from_seeds(&config.seeds);
        set.clock_authority_index = config.clock_authority_index;
        set
    }

    pub fn get(&self, index: usize) -> Option<Arc<Signer>> {
        self.signers.get(index).cloned()
    }

    /// The signer designated for privileged clock calls
    pub fn clock_authority(&self) -> Option<Arc<Signer>> {
        self.get(self.clock_authority_index)
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Signer>> {
        self.signers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn local_defaults() {
        let config = HarnessConfig::local();
        assert!(!config.signers.seeds.is_empty());
        assert_eq!(config.calls.inclusion, InclusionPolicy::InBlock);
        assert_eq!(config.connection.inclusion_timeout_ms, 30_000);
    }

    #[test]
    fn parses_minimal_toml() {
        let toml_src = r#"
            [connection]
            endpoint = "ws://127.0.0.1:9944"

            [signers]
            seeds = ["alice", "bob"]
        "#;
        let config: HarnessConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.signers.seeds.len(), 2);
        assert_eq!(config.signers.clock_authority_index, 0);
        assert_eq!(config.calls.default_gas_limit, default_gas_limit());
    }

    #[test]
    fn parses_inclusion_policy_override() {
        let toml_src = r#"
            [connection]
            endpoint = "ws://127.0.0.1:9944"

            [calls]
            inclusion = "finalized"
            default_gas_limit = 77

            [signers]
            seeds = ["alice"]
        "#;
        let config: HarnessConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.calls.inclusion, InclusionPolicy::Finalized);
        assert_eq!(config.calls.defaults().options.gas_limit, Some(77));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[connection]\nendpoint = \"ws://127.0.0.1:9944\"\n\n[signers]\nseeds = [\"alice\"]\n"
        )
        .unwrap();
        let config = HarnessConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.connection.endpoint, "ws://127.0.0.1:9944");
    }

    #[test]
    fn signer_set_is_explicit_injected_state() {
        let set = SignerSet::from_config(&SignerConfig {
            seeds: vec!["alice".to_string(), "bob".to_string()],
            clock_authority_index: 1,
        });
        assert_eq!(set.len(), 2);
        let authority = set.clock_authority().unwrap();
        assert_eq!(authority.account_id(), set.get(1).unwrap().account_id());
    }
}
