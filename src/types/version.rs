//! Account contract versions.

use crate::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// First version whose EIP-712 domain contains the chain id.
const CHAIN_ID_DOMAIN_VERSION: semver::Version = semver::Version::new(1, 3, 0);

/// First version whose `setup` takes a fallback handler.
const FALLBACK_HANDLER_VERSION: semver::Version = semver::Version::new(1, 1, 0);

/// Oldest supported version.
const MIN_VERSION: semver::Version = semver::Version::new(1, 0, 0);

/// Newest supported minor line.
const MAX_VERSION: semver::Version = semver::Version::new(1, 5, u64::MAX);

/// The EIP-712 domain schema used by an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainSchema {
    /// `EIP712Domain(address verifyingContract)`.
    ///
    /// Replay across chains is only prevented by the address and nonce binding.
    PreV130,
    /// `EIP712Domain(uint256 chainId,address verifyingContract)`.
    PostV130,
}

impl DomainSchema {
    /// Whether the domain includes the chain id.
    pub const fn includes_chain_id(&self) -> bool {
        matches!(self, Self::PostV130)
    }
}

/// Shape of the `setup` initializer call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetupVariant {
    /// `setup(owners, threshold, to, data, paymentToken, payment, paymentReceiver)`.
    WithoutFallbackHandler,
    /// `setup(owners, threshold, to, data, fallbackHandler, paymentToken, payment,
    /// paymentReceiver)`.
    WithFallbackHandler,
}

/// A supported account contract version, eg. `1.3.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountVersion(semver::Version);

impl AccountVersion {
    /// Version `1.3.0`.
    pub const V1_3_0: Self = Self(semver::Version::new(1, 3, 0));

    /// Version `1.4.1`.
    pub const V1_4_1: Self = Self(semver::Version::new(1, 4, 1));

    /// Creates a new version, validating that it is supported.
    pub fn new(major: u64, minor: u64, patch: u64) -> Result<Self, ValidationError> {
        Self::try_from(semver::Version::new(major, minor, patch))
    }

    /// Returns the EIP-712 domain schema for this version.
    pub fn domain_schema(&self) -> DomainSchema {
        if self.0 >= CHAIN_ID_DOMAIN_VERSION {
            DomainSchema::PostV130
        } else {
            DomainSchema::PreV130
        }
    }

    /// Returns the shape of the `setup` call for this version.
    pub fn setup_variant(&self) -> SetupVariant {
        if self.0 >= FALLBACK_HANDLER_VERSION {
            SetupVariant::WithFallbackHandler
        } else {
            SetupVariant::WithoutFallbackHandler
        }
    }

    /// Returns the underlying [`semver::Version`].
    pub const fn as_semver(&self) -> &semver::Version {
        &self.0
    }
}

impl TryFrom<semver::Version> for AccountVersion {
    type Error = ValidationError;

    fn try_from(version: semver::Version) -> Result<Self, Self::Error> {
        if version < MIN_VERSION || version > MAX_VERSION || !version.pre.is_empty() {
            return Err(ValidationError::UnsupportedVersion(version.to_string()));
        }
        Ok(Self(version))
    }
}

impl FromStr for AccountVersion {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // on-chain `VERSION()` strings carry no build metadata but some tooling prefixes a `v`
        let trimmed = s.trim().trim_start_matches('v');
        let version = semver::Version::parse(trimmed)
            .map_err(|_| ValidationError::UnsupportedVersion(s.to_string()))?;
        Self::try_from(version)
    }
}

impl fmt::Display for AccountVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for AccountVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
