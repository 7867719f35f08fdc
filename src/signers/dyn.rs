//! Multi-signer abstraction.
//!
//! An owner signer abstracted over multiple underlying signers.
use super::OwnerSigner;
use crate::types::AccountSignature;
use alloy::{
    network::{FullSigner, TxSigner},
    primitives::{Address, B256, Signature},
    signers::{
        aws::AwsSigner,
        k256::ecdsa::SigningKey,
        local::{
            PrivateKeySigner,
            coins_bip39::{English, Mnemonic},
        },
    },
};
use aws_config::BehaviorVersion;
use std::{fmt, ops::Deref, str::FromStr, sync::Arc};

/// Owner signer over a local key, a mnemonic-derived key or a KMS key.
///
/// Signs the digest directly, producing an ECDSA signature.
#[derive(Clone)]
pub struct DynSigner(pub Arc<dyn FullSigner<Signature> + Send + Sync>);

impl fmt::Debug for DynSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DynSigner").field(&self.address()).finish()
    }
}

impl DynSigner {
    /// Derives given number of owner signers from a mnemonic.
    pub fn derive_from_mnemonic(
        mnemonic: Mnemonic<English>,
        num: usize,
    ) -> eyre::Result<Vec<Self>> {
        (0..num)
            .map(|idx| {
                let path = format!("m/44'/60'/0'/0/{idx}");
                let key = mnemonic.derive_key(path.as_str(), None)?;
                let key: &SigningKey = key.as_ref();
                Ok(Self(Arc::new(PrivateKeySigner::from_signing_key(key.clone()))))
            })
            .collect()
    }

    /// Load a private key.
    pub async fn from_signing_key(key: &str) -> eyre::Result<Self> {
        Ok(Self(Arc::new(PrivateKeySigner::from_str(key)?)))
    }

    /// Load a signer from AWS KMS.
    pub async fn from_kms(key_id: &str, chain_id: Option<u64>) -> eyre::Result<Self> {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let client = aws_sdk_kms::Client::new(&config);
        Ok(Self(Arc::new(AwsSigner::new(client, key_id.to_string(), chain_id).await?)))
    }

    /// Returns the owner's Ethereum Address.
    pub fn address(&self) -> Address {
        TxSigner::address(&self.0)
    }

    /// Switches to `eth_sign` signatures, for wallets that can only sign personal messages.
    pub fn into_eth_sign(self) -> EthSignSigner {
        EthSignSigner(self)
    }
}

impl Deref for DynSigner {
    type Target = dyn FullSigner<Signature> + Send + Sync;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

#[async_trait::async_trait]
impl OwnerSigner for DynSigner {
    fn address(&self) -> Address {
        DynSigner::address(self)
    }

    async fn sign_digest(&self, digest: B256) -> eyre::Result<AccountSignature> {
        Ok(AccountSignature::ecdsa(self.address(), self.sign_hash(&digest).await?))
    }
}

/// Owner signer producing `eth_sign` signatures over the EIP-191 message of the digest.
#[derive(Debug, Clone)]
pub struct EthSignSigner(DynSigner);

#[async_trait::async_trait]
impl OwnerSigner for EthSignSigner {
    fn address(&self) -> Address {
        self.0.address()
    }

    async fn sign_digest(&self, digest: B256) -> eyre::Result<AccountSignature> {
        Ok(AccountSignature::eth_sign(self.0.address(), self.0.sign_message(digest.as_slice()).await?))
    }
}
