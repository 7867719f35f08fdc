//! Relay configuration.
use crate::{
    constants::DEFAULT_FEE_COLLECTOR,
    deployment::{DeploymentContracts, FactoryVariant},
    types::AccountVersion,
};
use alloy::primitives::{Address, ChainId, map::HashMap};
use alloy_chains::Chain;
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Relay configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Chain configurations.
    #[serde(with = "crate::serde::hash_map")]
    pub chains: HashMap<Chain, ChainConfig>,
    /// Relay settings.
    #[serde(default)]
    pub relay: RelaySettings,
}

impl RelayConfig {
    /// Adds or replaces the configuration of `chain`.
    pub fn with_chain(mut self, chain: Chain, config: ChainConfig) -> Self {
        self.chains.insert(chain, config);
        self
    }

    /// Set the chains.
    pub fn with_chains(self, chains: HashMap<Chain, ChainConfig>) -> Self {
        Self { chains, ..self }
    }

    /// Sets the receiver of paid relay refunds.
    pub fn with_fee_collector(mut self, fee_collector: Address) -> Self {
        self.relay.fee_collector = fee_collector;
        self
    }

    /// Returns the configuration of `chain_id`, if any.
    pub fn chain(&self, chain_id: ChainId) -> Option<&ChainConfig> {
        self.chains.get(&Chain::from_id(chain_id))
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Contracts deployed on a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Proxy factory deploying accounts.
    pub proxy_factory: Address,
    /// Account singleton.
    pub singleton: Address,
    /// Multi-send helper that only performs calls.
    pub multi_send_call_only: Address,
    /// Fallback handler set on new accounts.
    #[serde(default)]
    pub fallback_handler: Address,
    /// How the factory derives addresses.
    pub factory_variant: FactoryVariant,
    /// Version of the singleton.
    pub version: AccountVersion,
}

impl ChainConfig {
    /// Returns the contracts new accounts are deployed through.
    pub fn deployment_contracts(&self) -> DeploymentContracts {
        DeploymentContracts {
            proxy_factory: self.proxy_factory,
            singleton: self.singleton,
            factory_variant: self.factory_variant.clone(),
        }
    }
}

/// Relay settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelaySettings {
    /// Refund receiver of paid relays.
    pub fee_collector: Address,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self { fee_collector: DEFAULT_FEE_COLLECTOR }
    }
}
