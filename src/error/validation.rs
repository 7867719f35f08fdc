use alloy::primitives::Address;
use thiserror::Error;

/// Errors raised by local input validation.
///
/// These are always raised before any chain or relay access and are never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The salt nonce is negative or not a valid unsigned integer.
    #[error("invalid salt nonce: {0}")]
    InvalidSaltNonce(String),
    /// The owner set is empty.
    #[error("owner set must not be empty")]
    EmptyOwners,
    /// An owner appears more than once.
    #[error("duplicate owner {0}")]
    DuplicateOwner(Address),
    /// An owner is the zero address.
    #[error("owner must not be the zero address")]
    ZeroOwner,
    /// The threshold is zero or exceeds the number of owners.
    #[error("invalid threshold {threshold} for {owners} owners")]
    InvalidThreshold {
        /// The requested threshold.
        threshold: usize,
        /// The number of owners.
        owners: usize,
    },
    /// The account version could not be parsed or is not supported.
    #[error("unsupported account version: {0}")]
    UnsupportedVersion(String),
    /// No calls were given to build a transaction from.
    #[error("at least one call is required")]
    EmptyCalls,
    /// A delegate call was requested through a call-only batch.
    #[error("delegate calls cannot be batched through a call-only multi-send")]
    DelegateCallInBatch,
}
