//! Owner signature types.

use crate::{constants::SIGNATURE_LENGTH_BYTES, error::SignatureError};
use alloy::primitives::{Address, B256, Bytes, Signature, U256};
use serde::{Deserialize, Serialize};

/// Offset added to `v` to signal that the digest was signed with the personal-sign prefix.
const ETH_SIGN_V_OFFSET: u8 = 4;

/// `v` value of an approved-hash signature.
const PRE_VALIDATED_V: u8 = 1;

/// `v` value of a contract signature.
const CONTRACT_V: u8 = 0;

/// The kind of an owner signature, together with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
pub enum SignatureKind {
    /// ECDSA signature over the digest. The signer is recovered from the signature.
    Ecdsa(Signature),
    /// ECDSA signature over the EIP-191 personal message of the digest.
    ///
    /// Encoded with `v` shifted by +4.
    EthSign(Signature),
    /// EIP-1271 signature checked by calling back into the signer contract.
    ///
    /// Encoded as a pointer in the static part plus a length-prefixed payload in the dynamic part.
    Contract(Bytes),
    /// The signer approved the digest on-chain, or is the executor of the transaction.
    PreValidated,
}

impl SignatureKind {
    /// Whether this kind carries a dynamic part.
    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Contract(_))
    }
}

/// A signature of a single account owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSignature {
    /// The owner that produced the signature.
    pub signer: Address,
    /// The signature kind and payload.
    #[serde(flatten)]
    pub kind: SignatureKind,
}

impl AccountSignature {
    /// Creates an ECDSA signature over the digest.
    pub const fn ecdsa(signer: Address, signature: Signature) -> Self {
        Self { signer, kind: SignatureKind::Ecdsa(signature) }
    }

    /// Creates an eth_sign signature.
    pub const fn eth_sign(signer: Address, signature: Signature) -> Self {
        Self { signer, kind: SignatureKind::EthSign(signature) }
    }

    /// Creates a contract signature.
    pub const fn contract(signer: Address, payload: Bytes) -> Self {
        Self { signer, kind: SignatureKind::Contract(payload) }
    }

    /// Creates a pre-validated signature.
    pub const fn pre_validated(signer: Address) -> Self {
        Self { signer, kind: SignatureKind::PreValidated }
    }

    /// Parses a raw 65 byte `r || s || v` signature, choosing the kind from `v`.
    ///
    /// `v` of `0`/`1` or `27`/`28` is plain ECDSA, `31`/`32` is eth_sign.
    pub fn from_rsv(signer: Address, raw: &[u8]) -> Result<Self, SignatureError> {
        if raw.len() != SIGNATURE_LENGTH_BYTES {
            return Err(SignatureError::InvalidLength { signer, len: raw.len() });
        }
        let r = U256::from_be_slice(&raw[..32]);
        let s = U256::from_be_slice(&raw[32..64]);
        let v = raw[64];
        let kind = match v {
            0 | 1 => SignatureKind::Ecdsa(Signature::new(r, s, v == 1)),
            27 | 28 => SignatureKind::Ecdsa(Signature::new(r, s, v == 28)),
            31 | 32 => SignatureKind::EthSign(Signature::new(r, s, v == 32)),
            other => return Err(SignatureError::InvalidV(other)),
        };
        Ok(Self { signer, kind })
    }

    /// Returns the 65 byte static part of this signature.
    ///
    /// For contract signatures `dynamic_offset` is the byte offset, from the start of the whole
    /// signature blob, at which the dynamic part begins. It is ignored for all other kinds.
    pub fn static_part(&self, dynamic_offset: usize) -> [u8; SIGNATURE_LENGTH_BYTES] {
        match &self.kind {
            SignatureKind::Ecdsa(sig) => rsv(sig, 0),
            SignatureKind::EthSign(sig) => rsv(sig, ETH_SIGN_V_OFFSET),
            SignatureKind::Contract(_) => {
                pointer(self.signer, U256::from(dynamic_offset), CONTRACT_V)
            }
            SignatureKind::PreValidated => pointer(self.signer, U256::ZERO, PRE_VALIDATED_V),
        }
    }

    /// Returns the dynamic part, if any: the payload prefixed by its 32 byte length.
    pub fn dynamic_part(&self) -> Option<Vec<u8>> {
        let SignatureKind::Contract(payload) = &self.kind else { return None };
        let mut out = Vec::with_capacity(32 + payload.len());
        out.extend_from_slice(&U256::from(payload.len()).to_be_bytes::<32>());
        out.extend_from_slice(payload);
        Some(out)
    }

    /// Recovers the address that produced an ECDSA-shaped signature over `digest`.
    ///
    /// Returns `None` for contract and pre-validated signatures, which cannot be recovered
    /// locally.
    pub fn recover(&self, digest: B256) -> Option<Result<Address, alloy::primitives::SignatureError>> {
        match &self.kind {
            SignatureKind::Ecdsa(sig) => Some(sig.recover_address_from_prehash(&digest)),
            SignatureKind::EthSign(sig) => Some(sig.recover_address_from_msg(digest)),
            SignatureKind::Contract(_) | SignatureKind::PreValidated => None,
        }
    }
}

/// Encodes `r || s || v` with `v` normalized to `27`/`28` plus `offset`.
fn rsv(sig: &Signature, offset: u8) -> [u8; SIGNATURE_LENGTH_BYTES] {
    let mut out = [0u8; SIGNATURE_LENGTH_BYTES];
    out[..32].copy_from_slice(&sig.r().to_be_bytes::<32>());
    out[32..64].copy_from_slice(&sig.s().to_be_bytes::<32>());
    out[64] = 27 + sig.v() as u8 + offset;
    out
}

/// Encodes `signer (left padded) || word || v`.
fn pointer(signer: Address, word: U256, v: u8) -> [u8; SIGNATURE_LENGTH_BYTES] {
    let mut out = [0u8; SIGNATURE_LENGTH_BYTES];
    out[12..32].copy_from_slice(signer.as_slice());
    out[32..64].copy_from_slice(&word.to_be_bytes::<32>());
    out[64] = v;
    out
}
