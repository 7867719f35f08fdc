//! Relay error types.
use alloy::transports::TransportErrorKind;
use thiserror::Error;

mod signature;
pub use signature::SignatureError;

mod validation;
pub use validation::ValidationError;

/// The overarching error type returned by the relay pipeline.
///
/// Local failures ([`ValidationError`], [`SignatureError`]) are raised before any collaborator is
/// called. Collaborator failures are propagated unchanged and never retried.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Errors related to local input validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Errors related to signature material.
    #[error(transparent)]
    Signature(#[from] SignatureError),
    /// Fewer signatures than the account threshold have been collected.
    #[error("insufficient signatures: threshold {threshold}, collected {collected}")]
    InsufficientSignatures {
        /// The account threshold.
        threshold: usize,
        /// The number of distinct signers collected.
        collected: usize,
    },
    /// The chain id reported by the chain does not match the configured one.
    #[error("chain id mismatch, expected {expected}, got {got}")]
    ChainMismatch {
        /// The configured chain id.
        expected: u64,
        /// The chain id reported by the chain.
        got: u64,
    },
    /// No contracts are configured for the chain.
    #[error("unsupported chain {0}")]
    UnsupportedChain(u64),
    /// An error occurred during ABI encoding/decoding.
    #[error(transparent)]
    AbiError(#[from] alloy::sol_types::Error),
    /// An error occurred hashing typed data.
    #[error(transparent)]
    TypedData(#[from] alloy::dyn_abi::Error),
    /// An error occurred reading chain state.
    #[error(transparent)]
    RpcError(#[from] alloy::transports::RpcError<TransportErrorKind>),
    /// The relay transport failed to quote a fee.
    #[error("fee quote failed: {0}")]
    FeeQuote(#[source] eyre::Report),
    /// The relay transport failed to accept the envelope.
    #[error("relay submission failed: {0}")]
    Submit(#[source] eyre::Report),
    /// An owner signer failed to sign.
    #[error("signer failed: {0}")]
    Signer(#[source] eyre::Report),
    /// An internal error occurred.
    #[error(transparent)]
    InternalError(#[from] eyre::Error),
}

impl RelayError {
    /// Whether this error was raised locally, before any collaborator was called.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Signature(_)
                | Self::InsufficientSignatures { .. }
                | Self::UnsupportedChain(_)
                | Self::AbiError(_)
                | Self::TypedData(_)
        )
    }

    /// Whether this error originates from a collaborator (chain, relay transport or signer).
    pub fn is_collaborator(&self) -> bool {
        matches!(
            self,
            Self::RpcError(_) | Self::FeeQuote(_) | Self::Submit(_) | Self::Signer(_)
        )
    }
}
