use crate::{deployment::PredictedAccount, multisend::MultiSendCall};
use alloy::primitives::{Address, Bytes, ChainId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the relay is paid for a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum FeeOptions {
    /// The relay sponsors the execution.
    #[default]
    Sponsored,
    /// The account refunds the relay in `fee_token` out of the executed transaction.
    #[serde(rename_all = "camelCase")]
    Paid {
        /// Token the fee is paid in. [`Address::ZERO`] is the native currency.
        fee_token: Address,
        /// Gas limit to quote with, overriding the estimate.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gas_limit: Option<u64>,
    },
}

impl FeeOptions {
    /// Paid mode in `fee_token` with an estimated gas limit.
    pub const fn paid(fee_token: Address) -> Self {
        Self::Paid { fee_token, gas_limit: None }
    }

    /// Whether the account pays the relay.
    pub const fn is_paid(&self) -> bool {
        matches!(self, Self::Paid { .. })
    }
}

/// Opaque identifier of a submitted relay task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The payload handed to the relay service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayEnvelope {
    /// The contract the relay calls.
    pub target: Address,
    /// Calldata of the relay call.
    pub data: Bytes,
    /// Chain the call is executed on.
    pub chain_id: ChainId,
    /// Payment mode.
    pub fee_options: FeeOptions,
}

/// Whether the account exists on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentState {
    /// The account has code.
    Deployed,
    /// The account has no code yet and is deployed in the same relay call.
    Undeployed(Box<PredictedAccount>),
}

impl DeploymentState {
    /// Whether the account has code.
    pub const fn is_deployed(&self) -> bool {
        matches!(self, Self::Deployed)
    }
}

/// An envelope ready to be submitted, together with the calls it batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRelay {
    /// The envelope to submit.
    pub envelope: RelayEnvelope,
    /// The calls executed by the envelope, in order.
    ///
    /// A single call is sent directly, several are batched through the multi-send contract.
    pub calls: Vec<MultiSendCall>,
    /// Deployment state observed while preparing.
    pub deployment: DeploymentState,
}
