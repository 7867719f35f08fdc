//! Relay pipeline.
//!
//! Turns account calls into a signed relay envelope: the calls are batched into one account
//! transaction, fee fields are finalised for paid relays, owners sign the digest, and the
//! executing call is built either directly against the account or bundled with the account's
//! deployment.

use crate::{
    config::{ChainConfig, RelayConfig, RelaySettings},
    constants::{PAID_RELAY_GAS_PRICE, RELAY_NATIVE_TOKEN},
    eip712::compute_digest,
    error::{RelayError, ValidationError},
    multisend::{MultiSendCall, encode_multi_send},
    provider::ChainAccess,
    signers::OwnerSigner,
    types::{
        AccountTransaction, DeploymentState, FeeOptions, PreparedRelay, RelayEnvelope, TaskId,
    },
};
use alloy::primitives::{Address, ChainId, U256};
use futures_util::future::try_join_all;
use std::{fmt, sync::Arc};
use tracing::{debug, info, instrument, warn};

mod account;
pub use account::{AccountRef, PendingRelay, TransactionOptions};

mod fee;
pub use fee::{GasEstimate, GasEstimator};

mod metrics;
pub use metrics::RelayMetrics;

mod transport;
pub use transport::RelayTransport;

/// Maps the zero address to the relay's native token sentinel.
pub fn relay_fee_token(fee_token: Address) -> Address {
    if fee_token.is_zero() { RELAY_NATIVE_TOKEN } else { fee_token }
}

/// Orchestrates account transactions from calls to a submitted relay envelope.
pub struct RelayPipeline<C, T> {
    chain: C,
    transport: T,
    chain_id: ChainId,
    contracts: ChainConfig,
    fee_collector: Address,
    metrics: Arc<RelayMetrics>,
}

impl<C, T> fmt::Debug for RelayPipeline<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayPipeline")
            .field("chain_id", &self.chain_id)
            .field("contracts", &self.contracts)
            .field("fee_collector", &self.fee_collector)
            .finish_non_exhaustive()
    }
}

impl<C, T> RelayPipeline<C, T>
where
    C: ChainAccess,
    T: RelayTransport,
{
    /// Creates a pipeline for `chain_id` using the given contracts.
    pub fn new(
        chain: C,
        transport: T,
        chain_id: ChainId,
        contracts: ChainConfig,
        settings: &RelaySettings,
    ) -> Self {
        Self {
            chain,
            transport,
            chain_id,
            contracts,
            fee_collector: settings.fee_collector,
            metrics: Arc::new(RelayMetrics::new_with_labels(&[("chain_id", chain_id.to_string())])),
        }
    }

    /// Creates a pipeline for the chain `chain` is connected to.
    pub async fn connect(chain: C, transport: T, config: &RelayConfig) -> Result<Self, RelayError> {
        let chain_id = chain.get_chain_id().await?;
        let contracts = config.chain(chain_id).ok_or(RelayError::UnsupportedChain(chain_id))?;
        Ok(Self::new(chain, transport, chain_id, contracts.clone(), &config.relay))
    }

    /// Checks that the chain reports the configured chain id.
    pub async fn verify_chain(&self) -> Result<(), RelayError> {
        let got = self.chain.get_chain_id().await?;
        if got != self.chain_id {
            return Err(RelayError::ChainMismatch { expected: self.chain_id, got });
        }
        Ok(())
    }

    /// Returns the chain id.
    pub const fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Returns the contracts of the chain.
    pub const fn contracts(&self) -> &ChainConfig {
        &self.contracts
    }

    /// Returns the chain access.
    pub const fn chain(&self) -> &C {
        &self.chain
    }

    /// Returns the relay transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Combines `calls` into the single call the account executes.
    ///
    /// Several calls are delegate-called through the multi-send helper, which rejects nested
    /// delegate calls.
    pub fn batch(&self, mut calls: Vec<MultiSendCall>) -> Result<MultiSendCall, ValidationError> {
        match calls.len() {
            0 => Err(ValidationError::EmptyCalls),
            1 => Ok(calls.remove(0)),
            _ => {
                if calls.iter().any(|call| call.operation.is_delegate_call()) {
                    return Err(ValidationError::DelegateCallInBatch);
                }
                Ok(MultiSendCall::delegate_call(
                    self.contracts.multi_send_call_only,
                    encode_multi_send(&calls),
                ))
            }
        }
    }

    /// Determines whether `account` has code.
    pub async fn deployment_state(&self, account: &AccountRef) -> Result<DeploymentState, RelayError> {
        match account {
            AccountRef::Deployed { .. } => Ok(DeploymentState::Deployed),
            AccountRef::Predicted(predicted) => {
                let code = self.chain.get_code(predicted.address()).await?;
                if code.is_empty() {
                    Ok(DeploymentState::Undeployed(predicted.clone()))
                } else {
                    Ok(DeploymentState::Deployed)
                }
            }
        }
    }

    /// Builds the account transaction executing `calls` and computes its digest.
    ///
    /// In paid mode the fee is quoted exactly once and the fee fields are set before the digest is
    /// computed. Local validation runs before any chain access.
    #[instrument(skip_all, fields(account = %account.address(), calls = calls.len()))]
    pub async fn create_transaction(
        &self,
        account: AccountRef,
        calls: Vec<MultiSendCall>,
        options: TransactionOptions,
    ) -> Result<PendingRelay, RelayError> {
        let call = self.batch(calls.clone())?;
        let address = account.address();

        let deployment = self.deployment_state(&account).await?;
        let nonce = match (options.nonce, &deployment) {
            (Some(nonce), _) => nonce,
            (None, DeploymentState::Deployed) => self.chain.get_account_nonce(address).await?,
            (None, DeploymentState::Undeployed(_)) => U256::ZERO,
        };
        let threshold = match &deployment {
            DeploymentState::Deployed => self.chain.get_threshold(address).await?,
            DeploymentState::Undeployed(predicted) => predicted.setup().threshold,
        };

        let mut transaction = AccountTransaction {
            to: call.to,
            value: call.value,
            data: call.data,
            operation: call.operation,
            safe_tx_gas: options.safe_tx_gas,
            nonce,
            ..Default::default()
        };

        let mut gas = None;
        let fee_options = match options.fee_options {
            FeeOptions::Sponsored => FeeOptions::Sponsored,
            FeeOptions::Paid { fee_token, gas_limit } => {
                let gas_limit = match gas_limit {
                    Some(gas_limit) => gas_limit,
                    None => {
                        let inner = self.estimate_inner_gas(address, &calls).await?;
                        let deployment_gas = self.estimate_deployment_gas(&deployment).await?;
                        let estimate =
                            GasEstimator::estimate(&transaction, threshold, inner, deployment_gas);
                        debug!(?estimate, "Estimated relay gas");
                        gas = Some(estimate);
                        estimate.total
                    }
                };

                let relay_token = relay_fee_token(fee_token);
                self.metrics.fee_quotes.increment(1);
                let fee = self
                    .transport
                    .quote_fee(self.chain_id, gas_limit, relay_token)
                    .await
                    .map_err(RelayError::FeeQuote)?;
                debug!(%fee, %relay_token, gas_limit, "Quoted relay fee");

                transaction.base_gas = fee;
                transaction.gas_price = U256::from(PAID_RELAY_GAS_PRICE);
                transaction.gas_token = fee_token;
                transaction.refund_receiver = self.fee_collector;

                FeeOptions::Paid { fee_token: relay_token, gas_limit: Some(gas_limit) }
            }
        };

        let digest =
            compute_digest(address, &self.contracts.version, self.chain_id, (&transaction).into())?;
        debug!(%digest, %nonce, deployed = deployment.is_deployed(), "Created account transaction");

        Ok(PendingRelay {
            account,
            transaction,
            digest,
            fee_options,
            deployment,
            threshold,
            gas,
            signatures: Default::default(),
        })
    }

    /// Estimates the gas of `calls`, each simulated as a call from `account`.
    ///
    /// Batched calls are estimated one by one, since a simulated call into the multi-send helper
    /// would run them with the helper as sender.
    async fn estimate_inner_gas(
        &self,
        account: Address,
        calls: &[MultiSendCall],
    ) -> Result<u64, RelayError> {
        let estimates = try_join_all(calls.iter().map(|call| {
            self.chain.estimate_gas(account, call.to, call.value, call.data.clone())
        }))
        .await?;
        Ok(estimates.into_iter().fold(0, u64::saturating_add))
    }

    /// Estimates the gas of the deployment bundled ahead of the execution, if any.
    async fn estimate_deployment_gas(
        &self,
        deployment: &DeploymentState,
    ) -> Result<u64, RelayError> {
        match deployment {
            DeploymentState::Deployed => Ok(0),
            DeploymentState::Undeployed(predicted) => {
                let call = predicted.deployment_call();
                Ok(self
                    .chain
                    .estimate_gas(self.fee_collector, call.to, call.value, call.data)
                    .await?)
            }
        }
    }

    /// Builds the relay envelope of `pending`.
    ///
    /// Fails with [`RelayError::InsufficientSignatures`] without any collaborator call if fewer
    /// than the threshold of owners have signed. An undeployed account is deployed in the same
    /// call through the multi-send helper, ahead of the execution.
    #[instrument(skip_all, fields(account = %pending.account.address(), digest = %pending.digest))]
    pub fn prepare_relay(&self, pending: &PendingRelay) -> Result<PreparedRelay, RelayError> {
        if !pending.is_ready() {
            return Err(RelayError::InsufficientSignatures {
                threshold: pending.threshold,
                collected: pending.owner_signature_count(),
            });
        }
        pending.signatures.pre_validate(pending.digest);

        let execute = pending
            .transaction
            .execute_call(pending.account.address(), pending.signatures.encode());

        let (target, data, calls) = match &pending.deployment {
            DeploymentState::Deployed => (execute.to, execute.data.clone(), vec![execute]),
            DeploymentState::Undeployed(predicted) => {
                let calls = vec![predicted.deployment_call(), execute];
                self.metrics.deployments_bundled.increment(1);
                (self.contracts.multi_send_call_only, encode_multi_send(&calls), calls)
            }
        };

        self.metrics.prepared.increment(1);
        Ok(PreparedRelay {
            envelope: RelayEnvelope {
                target,
                data,
                chain_id: self.chain_id,
                fee_options: pending.fee_options,
            },
            calls,
            deployment: pending.deployment.clone(),
        })
    }

    /// Prepares and submits `pending`, returning the relay task id.
    #[instrument(skip_all, fields(account = %pending.account.address(), digest = %pending.digest))]
    pub async fn relay(&self, pending: &PendingRelay) -> Result<TaskId, RelayError> {
        let prepared = self.prepare_relay(pending)?;

        match self.transport.submit(&prepared.envelope).await {
            Ok(task_id) => {
                self.metrics.submitted.increment(1);
                info!(
                    %task_id,
                    target = %prepared.envelope.target,
                    calls = prepared.calls.len(),
                    "Submitted relay envelope"
                );
                Ok(task_id)
            }
            Err(err) => {
                self.metrics.failed_submissions.increment(1);
                warn!(%err, "Relay submission failed");
                Err(RelayError::Submit(err))
            }
        }
    }

    /// Signs `pending` with every signer concurrently, then relays it.
    pub async fn relay_with_signers<S: OwnerSigner>(
        &self,
        mut pending: PendingRelay,
        signers: &[S],
    ) -> Result<TaskId, RelayError> {
        let digest = pending.digest;
        let signatures =
            try_join_all(signers.iter().map(|signer| signer.sign_digest(digest)))
                .await
                .map_err(RelayError::Signer)?;
        for signature in signatures {
            pending.add_signature(signature);
        }
        self.relay(&pending).await
    }
}
