//! Account owner signers.

mod r#dyn;
use crate::types::AccountSignature;
use alloy::primitives::{Address, B256};
pub use r#dyn::{DynSigner, EthSignSigner};

/// An account owner able to sign account digests.
#[async_trait::async_trait]
pub trait OwnerSigner: std::fmt::Debug + Send + Sync {
    /// The owner address the signature is attributed to.
    fn address(&self) -> Address;

    /// Signs the EIP-712 digest of an account transaction or message.
    async fn sign_digest(&self, digest: B256) -> eyre::Result<AccountSignature>;
}
