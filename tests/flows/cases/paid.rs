use crate::flows::*;
use account_relay::{
    constants::{DEFAULT_FEE_COLLECTOR, RELAY_NATIVE_TOKEN},
    eip712::compute_digest,
    multisend::MultiSendCall,
    relay::{AccountRef, GasEstimator, TransactionOptions},
    types::{AccountTransaction, FeeOptions, IAccount},
};
use alloy::{
    primitives::{Address, Bytes, U256, address},
    sol_types::SolCall,
};
use std::sync::atomic::Ordering;

const USDC: Address = address!("0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238");

#[tokio::test]
async fn deployed_paid_relay_quotes_once() -> eyre::Result<()> {
    let owners = owners(1).await?;
    let chain = MockChain { nonce: U256::from(5), ..Default::default() };
    let pipeline = pipeline(chain, MockTransport::with_fee(1_234));

    let pending = pipeline
        .create_transaction(
            AccountRef::Deployed { address: DEPLOYED_ACCOUNT },
            vec![MultiSendCall::call(TARGET, U256::ZERO, Bytes::new())],
            TransactionOptions::paid(Address::ZERO),
        )
        .await?;

    let quotes = pipeline.transport().quotes();
    assert_eq!(quotes.len(), 1);
    let (chain_id, gas_limit, fee_token) = quotes[0];
    assert_eq!(chain_id, CHAIN_ID);
    assert_eq!(fee_token, RELAY_NATIVE_TOKEN);
    let estimate = GasEstimator::estimate(&unpaid(pending.transaction()), 1, 45_000, 0);
    assert_eq!(gas_limit, estimate.total);
    assert_eq!(pending.gas_estimate(), Some(&estimate));

    // fee fields are part of the signed digest
    let tx = pending.transaction();
    assert_eq!(tx.base_gas, U256::from(1_234));
    assert_eq!(tx.gas_price, U256::from(1));
    assert_eq!(tx.gas_token, Address::ZERO);
    assert_eq!(tx.refund_receiver, DEFAULT_FEE_COLLECTOR);
    assert_eq!(tx.nonce, U256::from(5));
    assert_eq!(
        pending.digest(),
        compute_digest(DEPLOYED_ACCOUNT, &chain_config().version, CHAIN_ID, tx.into())?
    );

    pipeline.relay_with_signers(pending, &owners).await?;
    assert_eq!(pipeline.transport().quotes().len(), 1);

    let submitted = pipeline.transport().submitted();
    let envelope = &submitted[0];
    assert_eq!(envelope.target, DEPLOYED_ACCOUNT);
    assert_eq!(
        envelope.fee_options,
        FeeOptions::Paid { fee_token: RELAY_NATIVE_TOKEN, gas_limit: Some(gas_limit) }
    );
    let execute = IAccount::execTransactionCall::abi_decode(&envelope.data)?;
    assert_eq!(execute.baseGas, U256::from(1_234));
    assert_eq!(execute.refundReceiver, DEFAULT_FEE_COLLECTOR);
    Ok(())
}

#[tokio::test]
async fn explicit_gas_limit_skips_estimation() -> eyre::Result<()> {
    let pipeline = pipeline(MockChain::default(), MockTransport::with_fee(99));
    let mut options = TransactionOptions::paid(USDC);
    options.fee_options = FeeOptions::Paid { fee_token: USDC, gas_limit: Some(300_000) };

    let pending = pipeline
        .create_transaction(
            AccountRef::Deployed { address: DEPLOYED_ACCOUNT },
            vec![MultiSendCall::call(TARGET, U256::ZERO, Bytes::new())],
            options,
        )
        .await?;

    assert_eq!(pipeline.chain().estimate_calls.load(Ordering::SeqCst), 0);
    assert_eq!(pipeline.transport().quotes(), vec![(CHAIN_ID, 300_000, USDC)]);
    assert_eq!(pending.transaction().gas_token, USDC);
    assert!(pending.gas_estimate().is_none());
    Ok(())
}

#[tokio::test]
async fn undeployed_paid_relay_uses_setup_threshold() -> eyre::Result<()> {
    let owners = owners(3).await?;
    let account = predicted_account(&owners, 2)?;
    let pipeline = pipeline(MockChain::default(), MockTransport::with_fee(7));

    let pending = pipeline
        .create_transaction(
            account,
            vec![MultiSendCall::call(TARGET, U256::ZERO, Bytes::new())],
            TransactionOptions::paid(USDC),
        )
        .await?;

    assert_eq!(pending.threshold(), 2);
    assert_eq!(pipeline.chain().threshold_calls.load(Ordering::SeqCst), 0);
    let estimate = pending.gas_estimate().copied().unwrap();
    assert_eq!(estimate.base_gas, GasEstimator::estimate_base_gas(&unpaid(pending.transaction()), 2));
    Ok(())
}

#[tokio::test]
async fn undeployed_quote_covers_deployment() -> eyre::Result<()> {
    let owners = owners(2).await?;
    let AccountRef::Predicted(predicted) = predicted_account(&owners, 1)? else {
        unreachable!()
    };
    let calls = vec![MultiSendCall::call(TARGET, U256::ZERO, Bytes::new())];

    let undeployed = pipeline(MockChain::default(), MockTransport::with_fee(7));
    let pending = undeployed
        .create_transaction(
            AccountRef::Predicted(predicted.clone()),
            calls.clone(),
            TransactionOptions::paid(USDC),
        )
        .await?;
    let deployment = predicted.deployment_call();
    assert_eq!(
        undeployed.chain().estimates(),
        vec![(predicted.address(), TARGET), (DEFAULT_FEE_COLLECTOR, deployment.to)]
    );
    assert_eq!(pending.gas_estimate().map(|gas| gas.deployment), Some(45_000));

    let deployed = pipeline(MockChain::default(), MockTransport::with_fee(7));
    deployed
        .create_transaction(
            AccountRef::Deployed { address: predicted.address() },
            calls,
            TransactionOptions::paid(USDC).with_nonce(U256::ZERO),
        )
        .await?;

    let (_, undeployed_gas, _) = undeployed.transport().quotes()[0];
    let (_, deployed_gas, _) = deployed.transport().quotes()[0];
    assert_eq!(undeployed_gas - deployed_gas, GasEstimator::with_safety_margin(45_000));
    Ok(())
}

#[tokio::test]
async fn batched_calls_are_estimated_from_the_account() -> eyre::Result<()> {
    const TOKEN: Address = address!("0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB");
    let pipeline = pipeline(MockChain::default(), MockTransport::with_fee(7));

    let pending = pipeline
        .create_transaction(
            AccountRef::Deployed { address: DEPLOYED_ACCOUNT },
            vec![
                MultiSendCall::call(TARGET, U256::from(1), Bytes::new()),
                MultiSendCall::call(TOKEN, U256::ZERO, Bytes::from_static(&[0xa9, 0x05, 0x9c])),
            ],
            TransactionOptions::paid(USDC),
        )
        .await?;

    assert_eq!(pending.transaction().to, MULTI_SEND_CALL_ONLY);
    let mut estimates = pipeline.chain().estimates();
    estimates.sort();
    let mut expected = vec![(DEPLOYED_ACCOUNT, TARGET), (DEPLOYED_ACCOUNT, TOKEN)];
    expected.sort();
    assert_eq!(estimates, expected);
    assert_eq!(pending.gas_estimate().map(|gas| gas.inner), Some(90_000));
    Ok(())
}

/// The transaction as it was estimated, before the fee fields were set.
fn unpaid(tx: &AccountTransaction) -> AccountTransaction {
    AccountTransaction {
        base_gas: U256::ZERO,
        gas_price: U256::ZERO,
        gas_token: Address::ZERO,
        refund_receiver: Address::ZERO,
        ..tx.clone()
    }
}
