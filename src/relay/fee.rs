//! Gas estimation for paid relays.

use crate::{
    constants::{
        EXEC_BOOKKEEPING_GAS, FIRST_NONCE_GAS, GAS_SAFETY_MARGIN_PERCENT, HASH_GENERATION_GAS,
        NON_ZERO_BYTE_GAS, NONCE_GAS, RELAY_EXECUTION_OVERHEAD_GAS, SIGNATURE_CHECK_GAS,
        SIGNATURE_LENGTH_BYTES, TX_BASE_GAS, ZERO_BYTE_GAS,
    },
    types::AccountTransaction,
};
use alloy::primitives::Bytes;
use serde::{Deserialize, Serialize};

/// Breakdown of the gas a paid relay is quoted for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasEstimate {
    /// Gas the account accounts for outside of the inner call.
    pub base_gas: u64,
    /// Intrinsic gas of the relayed transaction.
    pub intrinsic: u64,
    /// Gas of the inner calls.
    pub inner: u64,
    /// Gas of deploying the account in the same relay, zero for deployed accounts.
    pub deployment: u64,
    /// Total gas to quote the fee for.
    pub total: u64,
}

/// Gas estimator for paid relays.
#[derive(Debug)]
pub struct GasEstimator;

impl GasEstimator {
    /// Calldata cost: 4 gas per zero byte, 16 gas per non-zero byte.
    pub fn calldata_gas(data: &[u8]) -> u64 {
        let zero_data_len = data.iter().filter(|v| **v == 0).count() as u64;
        let non_zero_data_len = data.len() as u64 - zero_data_len;
        zero_data_len * ZERO_BYTE_GAS + non_zero_data_len * NON_ZERO_BYTE_GAS
    }

    /// Calculates the intrinsic cost of a transaction carrying `call_data`.
    pub fn calculate_intrinsic_cost(call_data: &[u8]) -> u64 {
        TX_BASE_GAS + Self::calldata_gas(call_data)
    }

    /// Estimates the `baseGas` of `tx` for an account requiring `threshold` signatures.
    ///
    /// Covers the `execTransaction` calldata, signature verification, the nonce update, and
    /// the hashing and bookkeeping done by the account.
    pub fn estimate_base_gas(tx: &AccountTransaction, threshold: usize) -> u64 {
        let calldata = Self::calldata_gas(&tx.encode_execute(Bytes::new()));
        let per_signature = SIGNATURE_LENGTH_BYTES as u64 * NON_ZERO_BYTE_GAS + SIGNATURE_CHECK_GAS;
        let nonce = if tx.nonce.is_zero() { FIRST_NONCE_GAS } else { NONCE_GAS };

        calldata
            + threshold as u64 * per_signature
            + nonce
            + HASH_GENERATION_GAS
            + EXEC_BOOKKEEPING_GAS
    }

    /// Adds the safety margin to `gas`.
    pub fn with_safety_margin(gas: u64) -> u64 {
        gas.saturating_add(gas.saturating_mul(GAS_SAFETY_MARGIN_PERCENT) / 100)
    }

    /// Estimates the total gas of a paid relay of `tx` whose inner calls cost `inner_gas`.
    ///
    /// `deployment_gas` is the cost of the bundled account deployment, if any. The intrinsic,
    /// inner and deployment gas carry the safety margin. The relay execution overhead is added
    /// on top.
    pub fn estimate(
        tx: &AccountTransaction,
        threshold: usize,
        inner_gas: u64,
        deployment_gas: u64,
    ) -> GasEstimate {
        let base_gas = Self::estimate_base_gas(tx, threshold);
        let intrinsic = Self::calculate_intrinsic_cost(&tx.encode_execute(Bytes::new()));
        let total = base_gas
            .saturating_add(RELAY_EXECUTION_OVERHEAD_GAS)
            .saturating_add(Self::with_safety_margin(intrinsic))
            .saturating_add(Self::with_safety_margin(inner_gas))
            .saturating_add(Self::with_safety_margin(deployment_gas));

        GasEstimate { base_gas, intrinsic, inner: inner_gas, deployment: deployment_gas, total }
    }
}
