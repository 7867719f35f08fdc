//! Packing of ordered call batches for the multi-send helper.
//!
//! Each call is encoded as
//!
//! ```text
//! operation (1 byte) | to (20 bytes) | value (32 bytes) | data length (32 bytes) | data
//! ```
//!
//! with no padding between calls. The helper executes the calls in order and reverts the whole
//! batch if any of them fails, which is what lets "deploy, then execute" be relayed atomically.

use crate::types::{IMultiSend, Operation};
use alloy::{
    primitives::{Address, Bytes, U256},
    sol_types::SolCall,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the fixed header preceding each call's data.
const CALL_HEADER_LEN: usize = 1 + 20 + 32 + 32;

/// A single entry of a multi-send batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSendCall {
    /// The call kind.
    pub operation: Operation,
    /// The call target.
    pub to: Address,
    /// Amount of native value to send.
    pub value: U256,
    /// The calldata.
    pub data: Bytes,
}

impl MultiSendCall {
    /// Creates a regular call.
    pub const fn call(to: Address, value: U256, data: Bytes) -> Self {
        Self { operation: Operation::Call, to, value, data }
    }

    /// Creates a delegate call.
    pub const fn delegate_call(to: Address, data: Bytes) -> Self {
        Self { operation: Operation::DelegateCall, to, value: U256::ZERO, data }
    }

    /// Returns the packed length of this call.
    pub fn packed_len(&self) -> usize {
        CALL_HEADER_LEN + self.data.len()
    }

    /// Appends the packed encoding of this call to `out`.
    pub fn pack_into(&self, out: &mut Vec<u8>) {
        out.push(self.operation.as_u8());
        out.extend_from_slice(self.to.as_slice());
        out.extend_from_slice(&self.value.to_be_bytes::<32>());
        out.extend_from_slice(&U256::from(self.data.len()).to_be_bytes::<32>());
        out.extend_from_slice(&self.data);
    }
}

/// Errors decoding a packed batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnpackError {
    /// The blob ends in the middle of a call.
    #[error("packed batch truncated at offset {0}")]
    Truncated(usize),
    /// The operation byte is neither call nor delegate call.
    #[error("unknown operation {operation} at offset {offset}")]
    UnknownOperation {
        /// The operation byte.
        operation: u8,
        /// The offset of the call.
        offset: usize,
    },
}

/// Packs an ordered list of calls into the multi-send transactions blob.
pub fn pack(calls: &[MultiSendCall]) -> Bytes {
    let mut out = Vec::with_capacity(calls.iter().map(MultiSendCall::packed_len).sum());
    for call in calls {
        call.pack_into(&mut out);
    }
    out.into()
}

/// Packs `calls` and wraps them as [`IMultiSend::multiSendCall`] calldata.
pub fn encode_multi_send(calls: &[MultiSendCall]) -> Bytes {
    IMultiSend::multiSendCall { transactions: pack(calls) }.abi_encode().into()
}

/// Decodes a packed transactions blob back into its calls.
pub fn unpack(mut packed: &[u8]) -> Result<Vec<MultiSendCall>, UnpackError> {
    let total = packed.len();
    let mut calls = Vec::new();
    while !packed.is_empty() {
        let offset = total - packed.len();
        if packed.len() < CALL_HEADER_LEN {
            return Err(UnpackError::Truncated(offset));
        }
        let operation = Operation::try_from(packed[0])
            .map_err(|operation| UnpackError::UnknownOperation { operation, offset })?;
        let to = Address::from_slice(&packed[1..21]);
        let value = U256::from_be_slice(&packed[21..53]);
        let len = U256::from_be_slice(&packed[53..85]);
        let len = usize::try_from(len).map_err(|_| UnpackError::Truncated(offset))?;
        let rest = &packed[CALL_HEADER_LEN..];
        if rest.len() < len {
            return Err(UnpackError::Truncated(offset));
        }
        calls.push(MultiSendCall { operation, to, value, data: Bytes::copy_from_slice(&rest[..len]) });
        packed = &rest[len..];
    }
    Ok(calls)
}

/// Decodes [`IMultiSend::multiSendCall`] calldata back into its calls.
pub fn decode_multi_send(calldata: &[u8]) -> eyre::Result<Vec<MultiSendCall>> {
    let call = IMultiSend::multiSendCall::abi_decode(calldata)?;
    Ok(unpack(&call.transactions)?)
}
