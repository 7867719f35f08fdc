//! Counterfactual account deployment.
//!
//! An account's address is fixed before it exists: it is the `CREATE2` address of a proxy
//! deployed by the factory, salted with the hash of the account's initializer and a salt nonce.
//! The chain id does not enter the derivation, so the same inputs predict the same address on
//! every chain sharing the factory and singleton deployments.

use crate::{
    constants::PREDETERMINED_SALT_NONCE,
    error::ValidationError,
    multisend::MultiSendCall,
    types::{AccountVersion, IAccount, ILegacyAccount, IProxyFactory, SetupVariant},
};
use alloy::{
    primitives::{Address, B256, Bytes, ChainId, U256, keccak256},
    sol_types::{SolCall, SolValue},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, str::FromStr};

/// The salt nonce distinguishing accounts with the same initializer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SaltNonce(U256);

impl SaltNonce {
    /// Creates a salt nonce from an unsigned integer.
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    /// Returns the salt nonce as an unsigned integer.
    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Returns the default salt nonce for `chain_id`.
    ///
    /// This is a convenience for callers that do not pick a salt nonce; it makes the predicted
    /// address chain specific.
    pub fn chain_specific_default(chain_id: ChainId) -> Self {
        let seed = format!("{PREDETERMINED_SALT_NONCE}{chain_id}");
        Self(keccak256(seed.as_bytes()).into())
    }
}

impl From<U256> for SaltNonce {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u64> for SaltNonce {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for SaltNonce {
    type Err = ValidationError;

    /// Parses a decimal or `0x`-prefixed hex string. Negative values are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.starts_with('-') {
            return Err(ValidationError::InvalidSaltNonce(s.to_string()));
        }
        U256::from_str(trimmed).map(Self).map_err(|_| ValidationError::InvalidSaltNonce(s.to_string()))
    }
}

impl TryFrom<String> for SaltNonce {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SaltNonce> for String {
    fn from(value: SaltNonce) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SaltNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How the proxy factory derives deployment addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum FactoryVariant {
    /// Standard EVM `CREATE2`: `keccak256(0xff ++ factory ++ salt ++ keccak256(initCode))`.
    #[serde(rename_all = "camelCase")]
    Evm {
        /// The proxy creation code returned by the factory's `proxyCreationCode()`.
        proxy_creation_code: Bytes,
    },
    /// zkSync Era `CREATE2`, which hashes a bytecode hash instead of the init code.
    #[serde(rename_all = "camelCase")]
    ZkSync {
        /// The proxy bytecode hash known to the zkSync deployer.
        proxy_bytecode_hash: B256,
    },
}

impl FactoryVariant {
    /// Computes the address a proxy for `singleton` gets when deployed by `factory` with `salt`.
    pub fn create2_address(&self, factory: Address, singleton: Address, salt: B256) -> Address {
        // constructor argument of the proxy
        let input = singleton.abi_encode();
        match self {
            Self::Evm { proxy_creation_code } => {
                let init_code = [&proxy_creation_code[..], &input[..]].concat();
                factory.create2(salt, keccak256(init_code))
            }
            Self::ZkSync { proxy_bytecode_hash } => {
                let mut buf = Vec::with_capacity(32 * 5);
                buf.extend_from_slice(keccak256("zksyncCreate2").as_slice());
                buf.extend_from_slice(B256::left_padding_from(factory.as_slice()).as_slice());
                buf.extend_from_slice(salt.as_slice());
                buf.extend_from_slice(proxy_bytecode_hash.as_slice());
                buf.extend_from_slice(keccak256(&input).as_slice());
                Address::from_slice(&keccak256(buf)[12..])
            }
        }
    }
}

/// Computes the `CREATE2` salt: `keccak256(keccak256(initializer) ++ uint256(saltNonce))`.
pub fn deployment_salt(initializer: &[u8], salt_nonce: SaltNonce) -> B256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(keccak256(initializer).as_slice());
    buf[32..].copy_from_slice(&salt_nonce.as_u256().to_be_bytes::<32>());
    keccak256(buf)
}

/// Predicts the address of an account deployed by `factory` for `singleton`.
pub fn predict_address(
    factory: Address,
    singleton: Address,
    variant: &FactoryVariant,
    initializer: &[u8],
    salt_nonce: SaltNonce,
) -> Address {
    variant.create2_address(factory, singleton, deployment_salt(initializer, salt_nonce))
}

/// The owner configuration and one-time setup of a new account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSetup {
    /// The owners.
    pub owners: Vec<Address>,
    /// Number of owner signatures required to execute a transaction.
    pub threshold: usize,
    /// Optional target of a delegate call executed during setup.
    #[serde(default)]
    pub to: Address,
    /// Calldata of the setup delegate call.
    #[serde(default)]
    pub data: Bytes,
    /// The fallback handler. Ignored for accounts older than 1.1.0.
    #[serde(default)]
    pub fallback_handler: Address,
    /// Token used to pay for the deployment. Zero is the native currency.
    #[serde(default)]
    pub payment_token: Address,
    /// Amount paid for the deployment.
    #[serde(default)]
    pub payment: U256,
    /// Receiver of the deployment payment.
    #[serde(default)]
    pub payment_receiver: Address,
}

impl AccountSetup {
    /// Creates a setup for `owners` requiring `threshold` signatures.
    pub fn new(owners: Vec<Address>, threshold: usize) -> Self {
        Self {
            owners,
            threshold,
            to: Address::ZERO,
            data: Bytes::new(),
            fallback_handler: Address::ZERO,
            payment_token: Address::ZERO,
            payment: U256::ZERO,
            payment_receiver: Address::ZERO,
        }
    }

    /// Sets the fallback handler.
    pub fn with_fallback_handler(mut self, fallback_handler: Address) -> Self {
        self.fallback_handler = fallback_handler;
        self
    }

    /// Sets the delegate call executed during setup.
    pub fn with_setup_call(mut self, to: Address, data: Bytes) -> Self {
        self.to = to;
        self.data = data;
        self
    }

    /// Validates the owner set and threshold.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.owners.is_empty() {
            return Err(ValidationError::EmptyOwners);
        }
        let mut seen = HashSet::with_capacity(self.owners.len());
        for owner in &self.owners {
            if owner.is_zero() {
                return Err(ValidationError::ZeroOwner);
            }
            if !seen.insert(owner) {
                return Err(ValidationError::DuplicateOwner(*owner));
            }
        }
        if self.threshold == 0 || self.threshold > self.owners.len() {
            return Err(ValidationError::InvalidThreshold {
                threshold: self.threshold,
                owners: self.owners.len(),
            });
        }
        Ok(())
    }

    /// Encodes the `setup` initializer for an account of `version`.
    pub fn encode_initializer(&self, version: &AccountVersion) -> Result<Bytes, ValidationError> {
        self.validate()?;
        let threshold = U256::from(self.threshold);
        let encoded = match version.setup_variant() {
            SetupVariant::WithFallbackHandler => IAccount::setupCall {
                _owners: self.owners.clone(),
                _threshold: threshold,
                to: self.to,
                data: self.data.clone(),
                fallbackHandler: self.fallback_handler,
                paymentToken: self.payment_token,
                payment: self.payment,
                paymentReceiver: self.payment_receiver,
            }
            .abi_encode(),
            SetupVariant::WithoutFallbackHandler => ILegacyAccount::setupCall {
                _owners: self.owners.clone(),
                _threshold: threshold,
                to: self.to,
                data: self.data.clone(),
                paymentToken: self.payment_token,
                payment: self.payment,
                paymentReceiver: self.payment_receiver,
            }
            .abi_encode(),
        };
        Ok(encoded.into())
    }
}

/// The contracts an account is deployed through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentContracts {
    /// The proxy factory.
    pub proxy_factory: Address,
    /// The singleton (implementation) the proxy delegates to.
    pub singleton: Address,
    /// How the factory derives addresses.
    pub factory_variant: FactoryVariant,
}

/// A not necessarily deployed account, identified by its deployment inputs.
///
/// The predicted address is computed once on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictedAccount {
    setup: AccountSetup,
    salt_nonce: SaltNonce,
    contracts: DeploymentContracts,
    initializer: Bytes,
    address: Address,
}

impl PredictedAccount {
    /// Validates the setup and predicts the account address.
    ///
    /// Fails before any chain access if the setup is invalid.
    pub fn new(
        setup: AccountSetup,
        salt_nonce: SaltNonce,
        contracts: DeploymentContracts,
        version: &AccountVersion,
    ) -> Result<Self, ValidationError> {
        let initializer = setup.encode_initializer(version)?;
        let address = predict_address(
            contracts.proxy_factory,
            contracts.singleton,
            &contracts.factory_variant,
            &initializer,
            salt_nonce,
        );
        Ok(Self { setup, salt_nonce, contracts, initializer, address })
    }

    /// Returns the predicted address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Returns the owner setup.
    pub const fn setup(&self) -> &AccountSetup {
        &self.setup
    }

    /// Returns the salt nonce.
    pub const fn salt_nonce(&self) -> SaltNonce {
        self.salt_nonce
    }

    /// Returns the encoded initializer.
    pub const fn initializer(&self) -> &Bytes {
        &self.initializer
    }

    /// Returns the deployment contracts.
    pub const fn contracts(&self) -> &DeploymentContracts {
        &self.contracts
    }

    /// Returns the factory call deploying this account.
    pub fn deployment_call(&self) -> MultiSendCall {
        MultiSendCall::call(
            self.contracts.proxy_factory,
            U256::ZERO,
            IProxyFactory::createProxyWithNonceCall {
                _singleton: self.contracts.singleton,
                initializer: self.initializer.clone(),
                saltNonce: self.salt_nonce.as_u256(),
            }
            .abi_encode()
            .into(),
        )
    }
}
