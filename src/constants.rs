//! Relay constants.
//!
//! These must match the deployed contracts and the relay protocol.

use alloy::primitives::{Address, FixedBytes, address, fixed_bytes};

/// Fixed gas overhead charged by the relay protocol for executing a relayed call.
pub const RELAY_EXECUTION_OVERHEAD_GAS: u64 = 150_000;

/// Safety margin applied to intrinsic and inner-call gas estimates, in percent.
pub const GAS_SAFETY_MARGIN_PERCENT: u64 = 20;

/// Gas price set on paid relay transactions.
///
/// With a gas price of `1`, the refund paid by the account is `baseGas + gasUsed` token units,
/// which lets `baseGas` carry the quoted relay fee.
pub const PAID_RELAY_GAS_PRICE: u64 = 1;

/// Address used by the relay transport to denote the native currency as fee token.
pub const RELAY_NATIVE_TOKEN: Address = address!("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Default fee collector, used as refund receiver on paid relays.
pub const DEFAULT_FEE_COLLECTOR: Address = address!("0x3AC05161b76a35c1c28dC99Aa01BEd7B24cEA3bf");

/// Return value of `isValidSignature(bytes32,bytes)` for a valid EIP-1271 signature.
pub const EIP1271_MAGIC_VALUE: FixedBytes<4> = fixed_bytes!("0x1626ba7e");

/// Return value of the legacy `isValidSignature(bytes,bytes)` for a valid signature.
pub const EIP1271_LEGACY_MAGIC_VALUE: FixedBytes<4> = fixed_bytes!("0x20c13b0b");

/// Length of the static part of every encoded signature.
pub const SIGNATURE_LENGTH_BYTES: usize = 65;

/// Seed for the chain specific default salt nonce.
pub const PREDETERMINED_SALT_NONCE: &str =
    "0xb1073742015cbcf5a3a4d9d1ae33ecf619439710b89475f92e2abd2117e90f90";

/// Base cost of a transaction.
pub const TX_BASE_GAS: u64 = 21_000;

/// Calldata cost of a zero byte.
pub const ZERO_BYTE_GAS: u64 = 4;

/// Calldata cost of a non-zero byte.
pub const NON_ZERO_BYTE_GAS: u64 = 16;

/// Gas budgeted per signature for `ecrecover` and signature checking.
pub const SIGNATURE_CHECK_GAS: u64 = 6_000;

/// Storage cost of bumping the account nonce from zero.
pub const FIRST_NONCE_GAS: u64 = 20_000;

/// Storage cost of bumping a non-zero account nonce.
pub const NONCE_GAS: u64 = 5_000;

/// Gas spent generating the transaction hash on-chain.
pub const HASH_GENERATION_GAS: u64 = 1_500;

/// Gas for the remaining fixed bookkeeping of `execTransaction`.
pub const EXEC_BOOKKEEPING_GAS: u64 = 1_000;
