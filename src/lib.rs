//! # Account Relay
//!
//! Library for relaying transactions of multi-owner smart contract accounts.
//!
//! Owners sign an EIP-712 digest of an account transaction, their signatures are packed into the
//! blob the account verifies, and the execution (bundled with the account's deployment if it
//! does not exist yet) is handed to a relay service.

pub mod cli;
pub mod config;
pub mod constants;
pub mod deployment;
pub mod eip712;
pub mod error;
pub mod multisend;
pub mod provider;
pub mod relay;
pub mod serde;
pub mod signatures;
pub mod signers;
pub mod types;
