//! Account transaction types.

use super::IAccount;
use crate::multisend::MultiSendCall;
use alloy::{
    primitives::{Address, Bytes, U256},
    sol,
    sol_types::SolCall,
};
use serde::{Deserialize, Serialize};

/// Whether a call runs in the callee's storage context or borrows the caller's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum Operation {
    /// A regular call.
    #[default]
    Call = 0,
    /// A delegate call.
    DelegateCall = 1,
}

impl Operation {
    /// Returns the on-chain byte of this operation.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether this is [`Self::DelegateCall`].
    pub const fn is_delegate_call(&self) -> bool {
        matches!(self, Self::DelegateCall)
    }
}

impl TryFrom<u8> for Operation {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Call),
            1 => Ok(Self::DelegateCall),
            other => Err(other),
        }
    }
}

sol! {
    /// The typed-data struct owners sign for an account transaction.
    #[derive(Debug, Default, PartialEq, Eq, Serialize)]
    struct SafeTx {
        address to;
        uint256 value;
        bytes data;
        uint8 operation;
        uint256 safeTxGas;
        uint256 baseGas;
        uint256 gasPrice;
        address gasToken;
        address refundReceiver;
        uint256 nonce;
    }
}

/// One logical call executed by the account.
///
/// Every field is part of the signed digest: changing any of them after signing invalidates the
/// collected signatures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTransaction {
    /// The call target.
    pub to: Address,
    /// Amount of native value to send, in wei.
    pub value: U256,
    /// The calldata.
    pub data: Bytes,
    /// The call kind.
    pub operation: Operation,
    /// Gas forwarded to the inner call. Zero forwards all available gas.
    pub safe_tx_gas: U256,
    /// Gas charged on top of the inner call, independent of its execution.
    pub base_gas: U256,
    /// Price per gas unit used for the refund. Zero disables the refund.
    pub gas_price: U256,
    /// The refund token. Zero is the native currency.
    pub gas_token: Address,
    /// The refund receiver. Zero is `tx.origin`.
    pub refund_receiver: Address,
    /// The account nonce this transaction consumes.
    pub nonce: U256,
}

impl AccountTransaction {
    /// Creates a new transaction for a single call with all execution fields zeroed.
    pub fn new(to: Address, value: U256, data: Bytes, operation: Operation, nonce: U256) -> Self {
        Self { to, value, data, operation, nonce, ..Default::default() }
    }

    /// Whether the account refunds the executor for this transaction.
    pub fn has_refund(&self) -> bool {
        !self.gas_price.is_zero()
    }

    /// Returns the typed-data representation of this transaction.
    pub fn as_eip712(&self) -> SafeTx {
        SafeTx {
            to: self.to,
            value: self.value,
            data: self.data.clone(),
            operation: self.operation.as_u8(),
            safeTxGas: self.safe_tx_gas,
            baseGas: self.base_gas,
            gasPrice: self.gas_price,
            gasToken: self.gas_token,
            refundReceiver: self.refund_receiver,
            nonce: self.nonce,
        }
    }

    /// Encodes this transaction into calldata for [`IAccount::execTransactionCall`].
    pub fn encode_execute(&self, signatures: Bytes) -> Bytes {
        IAccount::execTransactionCall {
            to: self.to,
            value: self.value,
            data: self.data.clone(),
            operation: self.operation.as_u8(),
            safeTxGas: self.safe_tx_gas,
            baseGas: self.base_gas,
            gasPrice: self.gas_price,
            gasToken: self.gas_token,
            refundReceiver: self.refund_receiver,
            signatures,
        }
        .abi_encode()
        .into()
    }

    /// Returns the call executing this transaction on `account`.
    pub fn execute_call(&self, account: Address, signatures: Bytes) -> MultiSendCall {
        MultiSendCall::call(account, U256::ZERO, self.encode_execute(signatures))
    }
}
