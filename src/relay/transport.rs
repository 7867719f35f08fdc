use crate::types::{RelayEnvelope, TaskId};
use alloy::primitives::{Address, ChainId, U256};
use async_trait::async_trait;

/// The relay service envelopes are handed to.
///
/// Both calls are single-shot. Retry policy, if any, belongs to the implementation.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Quotes the fee in `fee_token` for executing `gas_limit` gas on `chain_id`.
    ///
    /// The native currency is identified by [`RELAY_NATIVE_TOKEN`](crate::constants::RELAY_NATIVE_TOKEN).
    async fn quote_fee(
        &self,
        chain_id: ChainId,
        gas_limit: u64,
        fee_token: Address,
    ) -> eyre::Result<U256>;

    /// Submits an envelope for execution.
    async fn submit(&self, envelope: &RelayEnvelope) -> eyre::Result<TaskId>;
}
