use alloy::primitives::Address;
use thiserror::Error;

/// Errors related to signature material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// An ECDSA-shaped signature does not have 65 bytes.
    #[error("malformed signature for {signer}: expected 65 bytes, got {len}")]
    InvalidLength {
        /// The claimed signer.
        signer: Address,
        /// The length of the payload.
        len: usize,
    },
    /// The `v` byte is not a recognized value.
    #[error("malformed signature: unexpected v value {0}")]
    InvalidV(u8),
    /// No signer could be recovered from an ECDSA-shaped signature.
    #[error("unrecoverable signature at offset {offset}")]
    Unrecoverable {
        /// The byte offset of the signature.
        offset: usize,
    },
    /// An encoded signature blob is truncated or points outside itself.
    #[error("malformed signature blob at offset {offset}")]
    Truncated {
        /// The byte offset at which decoding failed.
        offset: usize,
    },
}
