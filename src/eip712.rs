//! EIP-712 related helpers.
//!
//! Computes the digest account owners sign. The digest is a pure function of the account address,
//! its version, the chain id (only for versions whose domain includes it) and the payload, so
//! independent owners always converge on the same value.

use crate::types::{AccountMessage, AccountTransaction, AccountVersion};
use alloy::{
    dyn_abi::{Eip712Domain, TypedData},
    primitives::{Address, B256, ChainId, U256, b256},
    sol_types::SolStruct,
};

/// Type hash of `SafeTx`.
pub const SAFE_TX_TYPEHASH: B256 =
    b256!("0xbb8310d486368db6bd6f849402fdd73ad53d316b5a4b2644ad6efe0f941286d8");

/// Type hash of `SafeMessage(bytes message)`.
pub const SAFE_MESSAGE_TYPEHASH: B256 =
    b256!("0x60b3cbf8b4a223d68d641b3b6ddf9a298e7f33710cf3d3a9d1146b5a6150fbca");

/// A payload to compute the signing digest of.
#[derive(Debug, Clone, Copy)]
pub enum DigestPayload<'a> {
    /// An account transaction.
    Transaction(&'a AccountTransaction),
    /// An arbitrary message.
    Message(&'a AccountMessage),
}

impl<'a> From<&'a AccountTransaction> for DigestPayload<'a> {
    fn from(tx: &'a AccountTransaction) -> Self {
        Self::Transaction(tx)
    }
}

impl<'a> From<&'a AccountMessage> for DigestPayload<'a> {
    fn from(message: &'a AccountMessage) -> Self {
        Self::Message(message)
    }
}

/// Returns the EIP-712 domain of `account`.
///
/// Accounts below 1.3.0 have no chain id in their domain.
pub fn eip712_domain(account: Address, version: &AccountVersion, chain_id: ChainId) -> Eip712Domain {
    let chain_id = version.domain_schema().includes_chain_id().then(|| U256::from(chain_id));
    Eip712Domain::new(None, None, chain_id, Some(account), None)
}

/// Computes the EIP-712 digest that the owners must sign.
///
/// Messages are hashed first (EIP-191 for raw strings, EIP-712 for typed data) and the hash is
/// wrapped in a `SafeMessage` before the final signing hash is taken.
pub fn compute_digest(
    account: Address,
    version: &AccountVersion,
    chain_id: ChainId,
    payload: DigestPayload<'_>,
) -> Result<B256, alloy::dyn_abi::Error> {
    let domain = eip712_domain(account, version, chain_id);
    match payload {
        DigestPayload::Transaction(tx) => Ok(tx.as_eip712().eip712_signing_hash(&domain)),
        DigestPayload::Message(message) => Ok(message.as_eip712()?.eip712_signing_hash(&domain)),
    }
}

/// Computes the EIP-712 digest together with the full typed-data document.
///
/// The document is what an owner's wallet displays for `eth_signTypedData_v4`.
pub fn compute_eip712_data(
    account: Address,
    version: &AccountVersion,
    chain_id: ChainId,
    payload: DigestPayload<'_>,
) -> Result<(B256, TypedData), alloy::dyn_abi::Error> {
    let domain = eip712_domain(account, version, chain_id);
    let typed_data = match payload {
        DigestPayload::Transaction(tx) => TypedData::from_struct(&tx.as_eip712(), Some(domain)),
        DigestPayload::Message(message) => {
            TypedData::from_struct(&message.as_eip712()?, Some(domain))
        }
    };
    let digest = typed_data.eip712_signing_hash()?;

    debug_assert_eq!(Ok(digest), compute_digest(account, version, chain_id, payload));

    Ok((digest, typed_data))
}
