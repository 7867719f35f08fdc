use crate::{
    deployment::PredictedAccount,
    error::RelayError,
    relay::GasEstimate,
    signatures::SignatureSet,
    signers::OwnerSigner,
    types::{AccountSignature, AccountTransaction, DeploymentState, FeeOptions},
};
use alloy::primitives::{Address, B256, U256};
use tracing::debug;

/// The account a transaction is relayed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountRef {
    /// An account known to be deployed.
    Deployed {
        /// The account address.
        address: Address,
    },
    /// An account identified by its deployment inputs, deployed or not.
    Predicted(Box<PredictedAccount>),
}

impl AccountRef {
    /// Returns the account address.
    pub fn address(&self) -> Address {
        match self {
            Self::Deployed { address } => *address,
            Self::Predicted(predicted) => predicted.address(),
        }
    }
}

impl From<PredictedAccount> for AccountRef {
    fn from(predicted: PredictedAccount) -> Self {
        Self::Predicted(Box::new(predicted))
    }
}

/// Options for [`RelayPipeline::create_transaction`](crate::relay::RelayPipeline::create_transaction).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    /// How the relay is paid.
    pub fee_options: FeeOptions,
    /// Nonce override. Read from the account when unset.
    pub nonce: Option<U256>,
    /// Gas forwarded to the inner call. Zero forwards all available gas.
    pub safe_tx_gas: U256,
}

impl TransactionOptions {
    /// Sponsored relay.
    pub fn sponsored() -> Self {
        Self::default()
    }

    /// Paid relay in `fee_token`.
    pub fn paid(fee_token: Address) -> Self {
        Self { fee_options: FeeOptions::paid(fee_token), ..Default::default() }
    }

    /// Sets the nonce.
    pub fn with_nonce(mut self, nonce: U256) -> Self {
        self.nonce = Some(nonce);
        self
    }
}

/// A finalised account transaction collecting owner signatures.
///
/// The transaction, including its fee fields, is frozen on creation so the digest the owners
/// sign cannot drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRelay {
    pub(crate) account: AccountRef,
    pub(crate) transaction: AccountTransaction,
    pub(crate) digest: B256,
    pub(crate) fee_options: FeeOptions,
    pub(crate) deployment: DeploymentState,
    pub(crate) threshold: usize,
    pub(crate) gas: Option<GasEstimate>,
    pub(crate) signatures: SignatureSet,
}

impl PendingRelay {
    /// Returns the account.
    pub const fn account(&self) -> &AccountRef {
        &self.account
    }

    /// Returns the finalised transaction.
    pub const fn transaction(&self) -> &AccountTransaction {
        &self.transaction
    }

    /// Returns the digest owners must sign.
    pub const fn digest(&self) -> B256 {
        self.digest
    }

    /// Returns the relay fee options, with the native token mapped to the relay's sentinel.
    pub const fn fee_options(&self) -> &FeeOptions {
        &self.fee_options
    }

    /// Returns the deployment state observed on creation.
    pub const fn deployment(&self) -> &DeploymentState {
        &self.deployment
    }

    /// Returns the number of signatures required.
    pub const fn threshold(&self) -> usize {
        self.threshold
    }

    /// Returns the gas estimate the fee was quoted for, if it was estimated.
    pub const fn gas_estimate(&self) -> Option<&GasEstimate> {
        self.gas.as_ref()
    }

    /// Returns the signatures collected so far.
    pub const fn signatures(&self) -> &SignatureSet {
        &self.signatures
    }

    /// Returns the number of collected signatures that count towards the threshold.
    ///
    /// The owners of an undeployed account are known from its setup, so signatures of other
    /// signers are left out. For a deployed account every signer is counted.
    pub fn owner_signature_count(&self) -> usize {
        match &self.deployment {
            DeploymentState::Deployed => self.signatures.count(),
            DeploymentState::Undeployed(predicted) => {
                let owners = &predicted.setup().owners;
                self.signatures.signers().filter(|signer| owners.contains(signer)).count()
            }
        }
    }

    /// Whether enough signatures have been collected.
    pub fn is_ready(&self) -> bool {
        self.owner_signature_count() >= self.threshold
    }

    /// Adds a signature, replacing an earlier one by the same signer.
    pub fn add_signature(&mut self, signature: AccountSignature) -> Option<AccountSignature> {
        self.signatures.add(signature)
    }

    /// Merges signatures collected elsewhere.
    pub fn merge_signatures(&mut self, signatures: SignatureSet) {
        self.signatures.merge(signatures);
    }

    /// Signs the digest with `signer` and adds the signature.
    pub async fn sign<S: OwnerSigner + ?Sized>(&mut self, signer: &S) -> Result<(), RelayError> {
        let signature = signer.sign_digest(self.digest).await.map_err(RelayError::Signer)?;
        debug!(signer = %signature.signer, digest = %self.digest, "Collected owner signature");
        self.add_signature(signature);
        Ok(())
    }
}
