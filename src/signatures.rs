//! Collection and canonical encoding of owner signatures.
//!
//! A [`SignatureSet`] is keyed by signer: adding a signature for a signer that already signed
//! replaces the previous one. Ordering is recomputed at encode time (ascending by signer address
//! as an unsigned integer), so sets built in any insertion order, or merged from partial sets
//! collected by different processes, encode to the same bytes.
//!
//! The set is policy free. It never rejects a signature because it does not recover to its
//! claimed signer; the verifying contract is the authority. [`SignatureSet::pre_validate`] only
//! flags such issues locally.

use crate::{
    constants::{EIP1271_LEGACY_MAGIC_VALUE, EIP1271_MAGIC_VALUE, SIGNATURE_LENGTH_BYTES},
    error::SignatureError,
    provider::ChainAccess,
    types::{AccountSignature, SignatureKind},
};
use alloy::primitives::{Address, B256, Bytes, FixedBytes, U256};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, btree_map};
use tracing::{debug, warn};

/// The set of signatures collected for one digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureSet {
    /// Signatures by signer.
    ///
    /// [`Address`] orders bytewise, which is the same as ordering by its unsigned integer value.
    signatures: BTreeMap<Address, AccountSignature>,
}

impl SignatureSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a signature, replacing any prior signature from the same signer.
    ///
    /// Returns the replaced signature, if any.
    pub fn add(&mut self, signature: AccountSignature) -> Option<AccountSignature> {
        self.signatures.insert(signature.signer, signature)
    }

    /// Builder-style [`Self::add`].
    pub fn with(mut self, signature: AccountSignature) -> Self {
        self.add(signature);
        self
    }

    /// Merges `other` into this set. Signatures in `other` win for signers present in both.
    pub fn merge(&mut self, other: Self) {
        self.signatures.extend(other.signatures);
    }

    /// Removes the signature of `signer`, if any.
    pub fn remove(&mut self, signer: &Address) -> Option<AccountSignature> {
        self.signatures.remove(signer)
    }

    /// Returns the number of distinct signers.
    pub fn count(&self) -> usize {
        self.signatures.len()
    }

    /// Whether no signature has been collected.
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Whether `signer` has signed.
    pub fn has_signer(&self, signer: &Address) -> bool {
        self.signatures.contains_key(signer)
    }

    /// Returns the signature of `signer`, if any.
    pub fn get(&self, signer: &Address) -> Option<&AccountSignature> {
        self.signatures.get(signer)
    }

    /// Returns the signatures in canonical (ascending signer) order.
    pub fn iter(&self) -> impl Iterator<Item = &AccountSignature> {
        self.signatures.values()
    }

    /// Returns the signers in canonical order.
    pub fn signers(&self) -> impl Iterator<Item = &Address> {
        self.signatures.keys()
    }

    /// Whether at least `threshold` distinct signers have signed.
    pub fn meets_threshold(&self, threshold: usize) -> bool {
        self.count() >= threshold
    }

    /// Encodes the set into the signature blob the account contract checks.
    ///
    /// All 65 byte static parts come first in ascending signer order, followed by the
    /// length-prefixed dynamic parts of contract signatures in the same order. Each contract
    /// signature's static part points at the start of its dynamic part.
    pub fn encode(&self) -> Bytes {
        let static_len = self.count() * SIGNATURE_LENGTH_BYTES;
        let mut static_parts = Vec::with_capacity(static_len);
        let mut dynamic_parts = Vec::new();

        for signature in self.iter() {
            let offset = static_len + dynamic_parts.len();
            static_parts.extend_from_slice(&signature.static_part(offset));
            if let Some(dynamic) = signature.dynamic_part() {
                dynamic_parts.extend_from_slice(&dynamic);
            }
        }

        static_parts.extend_from_slice(&dynamic_parts);
        static_parts.into()
    }

    /// Decodes a blob produced by [`Self::encode`].
    ///
    /// ECDSA-shaped signatures carry no signer, so `recover` is used to attribute them. Pass the
    /// digest the blob was produced for.
    pub fn decode(encoded: &[u8], digest: B256) -> Result<Self, SignatureError> {
        let mut set = Self::new();
        let mut position = 0;
        let mut static_end = encoded.len();

        while position < static_end {
            let part = encoded
                .get(position..position + SIGNATURE_LENGTH_BYTES)
                .ok_or(SignatureError::Truncated { offset: position })?;
            let v = part[64];
            let word_signer = Address::from_slice(&part[12..32]);

            let signature = match v {
                0 => {
                    let offset = word_to_usize(&part[32..64])
                        .ok_or(SignatureError::Truncated { offset: position })?;
                    let truncated = || SignatureError::Truncated { offset };
                    let data_start = offset.checked_add(32).ok_or_else(truncated)?;
                    let len = encoded
                        .get(offset..data_start)
                        .and_then(word_to_usize)
                        .ok_or_else(truncated)?;
                    let data_end = data_start.checked_add(len).ok_or_else(truncated)?;
                    let payload = encoded.get(data_start..data_end).ok_or_else(truncated)?;
                    // the first dynamic part marks the end of the static region
                    static_end = static_end.min(offset);
                    AccountSignature::contract(word_signer, Bytes::copy_from_slice(payload))
                }
                1 => AccountSignature::pre_validated(word_signer),
                _ => {
                    let mut signature = AccountSignature::from_rsv(Address::ZERO, part)?;
                    signature.signer = signature
                        .recover(digest)
                        .and_then(Result::ok)
                        .ok_or(SignatureError::Unrecoverable { offset: position })?;
                    signature
                }
            };
            set.add(signature);
            position += SIGNATURE_LENGTH_BYTES;
        }

        Ok(set)
    }

    /// Locally checks the collected signatures against `digest`.
    ///
    /// ECDSA and eth_sign signatures are recovered and compared to their claimed signer, contract
    /// signatures are checked for an empty payload. Issues are logged and returned, never
    /// enforced.
    pub fn pre_validate(&self, digest: B256) -> Vec<SignatureIssue> {
        let issues = self
            .iter()
            .filter_map(|signature| {
                let issue = match (&signature.kind, signature.recover(digest)) {
                    (_, Some(Ok(recovered))) if recovered != signature.signer => {
                        SignatureIssue::SignerMismatch { claimed: signature.signer, recovered }
                    }
                    (_, Some(Err(_))) => SignatureIssue::Unrecoverable(signature.signer),
                    (SignatureKind::Contract(payload), _) if payload.is_empty() => {
                        SignatureIssue::EmptyContractPayload(signature.signer)
                    }
                    _ => return None,
                };
                warn!(%digest, ?issue, "Signature failed local validation");
                Some(issue)
            })
            .collect::<Vec<_>>();

        debug!(%digest, signatures = self.count(), issues = issues.len(), "Pre-validated signatures");
        issues
    }

    /// Checks every contract signature in the set against its signer contract (EIP-1271).
    ///
    /// Returns the signers whose contract did not return the expected magic value. Chain read
    /// failures are propagated.
    pub async fn verify_contract_signatures<C: ChainAccess + ?Sized>(
        &self,
        chain: &C,
        digest: B256,
    ) -> Result<Vec<Address>, crate::error::RelayError> {
        let mut invalid = Vec::new();
        for signature in self.iter() {
            let SignatureKind::Contract(payload) = &signature.kind else { continue };
            let magic =
                chain.is_valid_contract_signature(signature.signer, digest, payload.clone()).await?;
            if !is_magic_value(magic) {
                warn!(signer = %signature.signer, %digest, "Contract signature rejected by signer");
                invalid.push(signature.signer);
            }
        }
        Ok(invalid)
    }
}

impl FromIterator<AccountSignature> for SignatureSet {
    fn from_iter<T: IntoIterator<Item = AccountSignature>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<AccountSignature> for SignatureSet {
    fn extend<T: IntoIterator<Item = AccountSignature>>(&mut self, iter: T) {
        for signature in iter {
            self.add(signature);
        }
    }
}

impl IntoIterator for SignatureSet {
    type Item = AccountSignature;
    type IntoIter = btree_map::IntoValues<Address, AccountSignature>;

    fn into_iter(self) -> Self::IntoIter {
        self.signatures.into_values()
    }
}

/// A locally detected signature problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureIssue {
    /// The signature recovers to a different address than its claimed signer.
    SignerMismatch {
        /// The claimed signer.
        claimed: Address,
        /// The recovered address.
        recovered: Address,
    },
    /// No address could be recovered from the signature.
    Unrecoverable(Address),
    /// A contract signature has an empty payload.
    EmptyContractPayload(Address),
}

/// Whether `value` is one of the EIP-1271 magic return values.
pub fn is_magic_value(value: FixedBytes<4>) -> bool {
    value == EIP1271_MAGIC_VALUE || value == EIP1271_LEGACY_MAGIC_VALUE
}

fn word_to_usize(word: &[u8]) -> Option<usize> {
    usize::try_from(U256::try_from_be_slice(word)?).ok()
}
