//! # Account relay CLI
//!
//! Offline helpers computing what the relay pipeline computes, from the contracts in the
//! configuration file.
use crate::{
    config::RelayConfig,
    deployment::{AccountSetup, PredictedAccount, SaltNonce},
    eip712::{DigestPayload, compute_eip712_data},
    types::{AccountTransaction, AccountVersion, Operation},
};
use alloy::primitives::{Address, Bytes, ChainId, U256};
use clap::{Parser, Subcommand};
use eyre::OptionExt;
use serde_json::json;
use std::path::PathBuf;
use tracing::debug;

/// Offline tooling for multi-owner account relaying.
#[derive(Debug, Parser)]
#[command(author, about = "Account relay", long_about = None)]
pub struct Args {
    /// The configuration file.
    #[arg(long, value_name = "CONFIG", env = "RELAY_CONFIG", default_value = "relay.yaml")]
    pub config: PathBuf,
    /// The command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predicts the address of an account before it is deployed.
    PredictAddress {
        /// The chain the account is deployed on.
        #[arg(long, value_name = "CHAIN_ID")]
        chain_id: ChainId,
        /// The account owners.
        #[arg(long = "owner", value_name = "ADDRESS", required = true, value_delimiter = ',')]
        owners: Vec<Address>,
        /// Number of owner signatures required.
        #[arg(long, value_name = "THRESHOLD")]
        threshold: usize,
        /// The salt nonce. Defaults to a chain specific value.
        #[arg(long, value_name = "SALT_NONCE")]
        salt_nonce: Option<SaltNonce>,
    },
    /// Computes the digest owners sign for an account transaction.
    TxDigest {
        /// The chain the account lives on.
        #[arg(long, value_name = "CHAIN_ID")]
        chain_id: ChainId,
        /// The account.
        #[arg(long, value_name = "ADDRESS")]
        account: Address,
        /// The call target.
        #[arg(long, value_name = "ADDRESS")]
        to: Address,
        /// Native value sent with the call.
        #[arg(long, value_name = "WEI", default_value = "0")]
        value: U256,
        /// The calldata.
        #[arg(long, value_name = "HEX", default_value = "0x")]
        data: Bytes,
        /// Delegate call instead of call.
        #[arg(long)]
        delegate_call: bool,
        /// The account nonce.
        #[arg(long, value_name = "NONCE")]
        nonce: U256,
        /// Account version. Defaults to the configured singleton version.
        #[arg(long, value_name = "VERSION")]
        account_version: Option<AccountVersion>,
        /// Print the full typed data document.
        #[arg(long)]
        typed_data: bool,
    },
}

impl Args {
    /// Runs the command.
    pub fn run(self) -> eyre::Result<()> {
        let config = RelayConfig::load_from_file(&self.config)?;
        debug!(config = %self.config.display(), chains = config.chains.len(), "Loaded config");

        match self.command {
            Command::PredictAddress { chain_id, owners, threshold, salt_nonce } => {
                let chain = config.chain(chain_id).ok_or_eyre("chain is not configured")?;
                let setup =
                    AccountSetup::new(owners, threshold).with_fallback_handler(chain.fallback_handler);
                let salt_nonce =
                    salt_nonce.unwrap_or_else(|| SaltNonce::chain_specific_default(chain_id));
                let account = PredictedAccount::new(
                    setup,
                    salt_nonce,
                    chain.deployment_contracts(),
                    &chain.version,
                )?;

                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "address": account.address(),
                        "saltNonce": salt_nonce,
                        "initializer": account.initializer(),
                        "deploymentCall": account.deployment_call(),
                    }))?
                );
            }
            Command::TxDigest {
                chain_id,
                account,
                to,
                value,
                data,
                delegate_call,
                nonce,
                account_version,
                typed_data,
            } => {
                let version = match account_version {
                    Some(version) => version,
                    None => config
                        .chain(chain_id)
                        .ok_or_eyre("chain is not configured, pass --account-version")?
                        .version
                        .clone(),
                };
                let operation = if delegate_call { Operation::DelegateCall } else { Operation::Call };
                let tx = AccountTransaction::new(to, value, data, operation, nonce);
                let (digest, document) =
                    compute_eip712_data(account, &version, chain_id, DigestPayload::from(&tx))?;

                if typed_data {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "digest": digest,
                            "typedData": document,
                        }))?
                    );
                } else {
                    println!("{digest}");
                }
            }
        }

        Ok(())
    }
}
