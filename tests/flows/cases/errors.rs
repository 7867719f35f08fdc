use crate::flows::*;
use account_relay::{
    config::RelayConfig,
    error::{RelayError, ValidationError},
    multisend::MultiSendCall,
    relay::{AccountRef, RelayPipeline, TransactionOptions},
    types::Operation,
};
use alloy::primitives::{Address, Bytes, U256};
use alloy_chains::Chain;

fn call() -> Vec<MultiSendCall> {
    vec![MultiSendCall::call(TARGET, U256::ZERO, Bytes::new())]
}

#[tokio::test]
async fn local_validation_precedes_chain_access() -> eyre::Result<()> {
    let pipeline = pipeline(MockChain::default(), MockTransport::default());

    let err = pipeline
        .create_transaction(
            AccountRef::Deployed { address: DEPLOYED_ACCOUNT },
            vec![],
            TransactionOptions::paid(Address::ZERO),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Validation(ValidationError::EmptyCalls)));

    let nested = vec![
        MultiSendCall::call(TARGET, U256::ZERO, Bytes::new()),
        MultiSendCall { operation: Operation::DelegateCall, ..MultiSendCall::default() },
    ];
    let err = pipeline
        .create_transaction(
            AccountRef::Deployed { address: DEPLOYED_ACCOUNT },
            nested,
            TransactionOptions::sponsored(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Validation(ValidationError::DelegateCallInBatch)));

    assert_eq!(pipeline.chain().total_calls(), 0);
    assert!(pipeline.transport().quotes().is_empty());
    Ok(())
}

#[tokio::test]
async fn insufficient_signatures_are_never_submitted() -> eyre::Result<()> {
    let owners = owners(2).await?;
    let pipeline = pipeline(MockChain { threshold: 2, ..Default::default() }, MockTransport::default());

    let pending = pipeline
        .create_transaction(
            AccountRef::Deployed { address: DEPLOYED_ACCOUNT },
            call(),
            TransactionOptions::sponsored(),
        )
        .await?;

    let err = pipeline.relay_with_signers(pending, &owners[..1]).await.unwrap_err();
    assert!(matches!(err, RelayError::InsufficientSignatures { threshold: 2, collected: 1 }));
    assert!(err.is_local());
    assert!(pipeline.transport().submitted().is_empty());
    Ok(())
}

#[tokio::test]
async fn undeployed_account_counts_only_setup_owners() -> eyre::Result<()> {
    let signers = owners(3).await?;
    let pipeline = pipeline(MockChain::default(), MockTransport::default());

    let mut pending = pipeline
        .create_transaction(
            predicted_account(&signers[..2], 1)?,
            call(),
            TransactionOptions::sponsored(),
        )
        .await?;

    pending.sign(&signers[2]).await?;
    assert_eq!(pending.signatures().count(), 1);
    assert_eq!(pending.owner_signature_count(), 0);
    assert!(!pending.is_ready());
    let err = pipeline.prepare_relay(&pending).unwrap_err();
    assert!(matches!(err, RelayError::InsufficientSignatures { threshold: 1, collected: 0 }));

    pending.sign(&signers[0]).await?;
    assert!(pending.is_ready());
    pipeline.relay(&pending).await?;
    assert_eq!(pipeline.transport().submitted().len(), 1);
    Ok(())
}

#[tokio::test]
async fn collaborator_failures_are_propagated() -> eyre::Result<()> {
    let owners = owners(1).await?;

    let failing_chain = pipeline(MockChain { fail_reads: true, ..Default::default() }, MockTransport::default());
    let err = failing_chain
        .create_transaction(
            AccountRef::Deployed { address: DEPLOYED_ACCOUNT },
            call(),
            TransactionOptions::sponsored(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::RpcError(_)));

    let failing_quote = pipeline(
        MockChain::default(),
        MockTransport { fail_quote: true, ..Default::default() },
    );
    let err = failing_quote
        .create_transaction(
            AccountRef::Deployed { address: DEPLOYED_ACCOUNT },
            call(),
            TransactionOptions::paid(Address::ZERO),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::FeeQuote(_)));
    assert_eq!(failing_quote.transport().quotes().len(), 1);

    let failing_submit = pipeline(
        MockChain::default(),
        MockTransport { fail_submit: true, ..Default::default() },
    );
    let pending = failing_submit
        .create_transaction(
            AccountRef::Deployed { address: DEPLOYED_ACCOUNT },
            call(),
            TransactionOptions::sponsored(),
        )
        .await?;
    let err = failing_submit.relay_with_signers(pending, &owners).await.unwrap_err();
    assert!(matches!(err, RelayError::Submit(_)));
    assert!(err.is_collaborator());
    Ok(())
}

#[tokio::test]
async fn connect_resolves_chain_contracts() -> eyre::Result<()> {
    let config = RelayConfig::default().with_chain(Chain::from_id(CHAIN_ID), chain_config());

    let pipeline = RelayPipeline::connect(MockChain::default(), MockTransport::default(), &config).await?;
    assert_eq!(pipeline.chain_id(), CHAIN_ID);
    pipeline.verify_chain().await?;

    let err = RelayPipeline::connect(
        MockChain { chain_id: 1, ..Default::default() },
        MockTransport::default(),
        &config,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RelayError::UnsupportedChain(1)));
    Ok(())
}
