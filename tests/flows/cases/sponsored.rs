use crate::flows::*;
use account_relay::{
    multisend::{MultiSendCall, decode_multi_send},
    relay::TransactionOptions,
    types::{DeploymentState, FeeOptions, IAccount, IProxyFactory, Operation},
};
use alloy::{
    primitives::{Bytes, U256},
    sol_types::SolCall,
};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn undeployed_sponsored_relay_bundles_deployment() -> eyre::Result<()> {
    let owners = owners(2).await?;
    let account = predicted_account(&owners, 2)?;
    let address = account.address();
    let pipeline = pipeline(MockChain::default(), MockTransport::default());

    let pending = pipeline
        .create_transaction(
            account,
            vec![MultiSendCall::call(TARGET, U256::ZERO, Bytes::new())],
            TransactionOptions::sponsored(),
        )
        .await?;

    assert!(matches!(pending.deployment(), DeploymentState::Undeployed(_)));
    assert_eq!(pending.transaction().nonce, U256::ZERO);
    assert_eq!(pending.transaction().to, TARGET);
    assert!(!pending.transaction().has_refund());
    // nonce and threshold come from the setup, not the chain
    assert_eq!(pipeline.chain().nonce_calls.load(Ordering::SeqCst), 0);
    assert_eq!(pipeline.chain().threshold_calls.load(Ordering::SeqCst), 0);

    let task_id = pipeline.relay_with_signers(pending, &owners).await?;
    assert_eq!(task_id.to_string(), "task-1");

    assert!(pipeline.transport().quotes().is_empty());
    let submitted = pipeline.transport().submitted();
    assert_eq!(submitted.len(), 1);

    let envelope = &submitted[0];
    assert_eq!(envelope.target, MULTI_SEND_CALL_ONLY);
    assert_eq!(envelope.chain_id, CHAIN_ID);
    assert_eq!(envelope.fee_options, FeeOptions::Sponsored);

    let calls = decode_multi_send(&envelope.data)?;
    assert_eq!(calls.len(), 2);

    let deploy = IProxyFactory::createProxyWithNonceCall::abi_decode(&calls[0].data)?;
    assert_eq!(calls[0].to, PROXY_FACTORY);
    assert_eq!(calls[0].operation, Operation::Call);
    assert_eq!(deploy._singleton, SINGLETON);
    assert_eq!(deploy.saltNonce, U256::ZERO);

    let execute = IAccount::execTransactionCall::abi_decode(&calls[1].data)?;
    assert_eq!(calls[1].to, address);
    assert_eq!(execute.to, TARGET);
    assert_eq!(execute.baseGas, U256::ZERO);
    assert_eq!(execute.gasPrice, U256::ZERO);
    assert_eq!(execute.signatures.len(), 2 * 65);
    Ok(())
}

#[tokio::test]
async fn predicted_account_with_code_is_executed_directly() -> eyre::Result<()> {
    let owners = owners(1).await?;
    let account = predicted_account(&owners, 1)?;
    let address = account.address();
    let chain = MockChain { nonce: U256::from(3), ..Default::default() }.with_code(address);
    let pipeline = pipeline(chain, MockTransport::default());

    let pending = pipeline
        .create_transaction(
            account,
            vec![MultiSendCall::call(TARGET, U256::from(1), Bytes::new())],
            TransactionOptions::sponsored(),
        )
        .await?;
    assert!(pending.deployment().is_deployed());
    assert_eq!(pending.transaction().nonce, U256::from(3));

    pipeline.relay_with_signers(pending, &owners).await?;

    let submitted = pipeline.transport().submitted();
    assert_eq!(submitted[0].target, address);
    let execute = IAccount::execTransactionCall::abi_decode(&submitted[0].data)?;
    assert_eq!(execute.value, U256::from(1));
    Ok(())
}

#[tokio::test]
async fn several_calls_are_delegated_to_multi_send() -> eyre::Result<()> {
    let owners = owners(1).await?;
    let pipeline = pipeline(MockChain::default(), MockTransport::default());
    let calls = vec![
        MultiSendCall::call(TARGET, U256::from(1), Bytes::new()),
        MultiSendCall::call(SINGLETON, U256::ZERO, Bytes::from_static(&[0xca, 0xfe])),
    ];

    let pending = pipeline
        .create_transaction(
            account_relay::relay::AccountRef::Deployed { address: DEPLOYED_ACCOUNT },
            calls.clone(),
            TransactionOptions::sponsored(),
        )
        .await?;

    let tx = pending.transaction();
    assert_eq!(tx.to, MULTI_SEND_CALL_ONLY);
    assert_eq!(tx.operation, Operation::DelegateCall);
    assert_eq!(tx.value, U256::ZERO);
    assert_eq!(decode_multi_send(&tx.data)?, calls);
    Ok(())
}
