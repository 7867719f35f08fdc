//! Arbitrary messages signed by account owners.

use alloy::{
    dyn_abi::TypedData,
    primitives::{B256, eip191_hash_message},
    sol,
};
use serde::{Deserialize, Serialize};

sol! {
    /// Wrapper type through which the account validates arbitrary messages.
    #[derive(Debug, Default, PartialEq, Eq, Serialize)]
    struct SafeMessage {
        bytes message;
    }
}

/// A message an account can sign, besides transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountMessage {
    /// A raw string, hashed as an EIP-191 personal message.
    Raw(String),
    /// Structured typed data, hashed as its own EIP-712 signing hash.
    Typed(Box<TypedData>),
}

impl AccountMessage {
    /// Returns the inner hash of the message, before it is wrapped in [`SafeMessage`].
    pub fn hash(&self) -> Result<B256, alloy::dyn_abi::Error> {
        match self {
            Self::Raw(message) => Ok(eip191_hash_message(message)),
            Self::Typed(typed) => typed.eip712_signing_hash(),
        }
    }

    /// Returns the [`SafeMessage`] wrapping this message.
    pub fn as_eip712(&self) -> Result<SafeMessage, alloy::dyn_abi::Error> {
        Ok(SafeMessage { message: self.hash()?.into() })
    }
}

impl From<&str> for AccountMessage {
    fn from(message: &str) -> Self {
        Self::Raw(message.to_string())
    }
}

impl From<String> for AccountMessage {
    fn from(message: String) -> Self {
        Self::Raw(message)
    }
}

impl From<TypedData> for AccountMessage {
    fn from(typed: TypedData) -> Self {
        Self::Typed(Box::new(typed))
    }
}
