use account_relay::{
    config::{ChainConfig, RelaySettings},
    deployment::{AccountSetup, FactoryVariant, PredictedAccount, SaltNonce},
    relay::{AccountRef, RelayPipeline, RelayTransport},
    provider::ChainAccess,
    signers::DynSigner,
    types::{AccountVersion, RelayEnvelope, TaskId},
};
use alloy::{
    primitives::{Address, B256, Bytes, ChainId, FixedBytes, U256, address, bytes},
    transports::{TransportErrorKind, TransportResult},
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

pub const CHAIN_ID: ChainId = 11155111;
pub const PROXY_FACTORY: Address = address!("0x4e1DCf7AD4e460CfD30791CCC4F9c8a4f820ec67");
pub const SINGLETON: Address = address!("0x29fcB43b46531BcA003ddC8FCB67FFE91900C762");
pub const MULTI_SEND_CALL_ONLY: Address = address!("0x9641d764fc13c8B624c04430C7356C1C7C8102e2");
pub const FALLBACK_HANDLER: Address = address!("0xfd0732Dc9E303f09fCEf3a7388Ad10A83459Ec99");
pub const DEPLOYED_ACCOUNT: Address = address!("0x5afe5afE5afE5afE5afE5aFe5aFe5Afe5Afe5AfE");
pub const TARGET: Address = address!("0xAAAaaAAAaaaAaaaAaaAAaaaaaaAaaaaAAaaaaAaA");

/// Private keys of the default anvil accounts.
pub const OWNER_KEYS: [&str; 3] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
];

pub fn chain_config() -> ChainConfig {
    ChainConfig {
        proxy_factory: PROXY_FACTORY,
        singleton: SINGLETON,
        multi_send_call_only: MULTI_SEND_CALL_ONLY,
        fallback_handler: FALLBACK_HANDLER,
        factory_variant: FactoryVariant::Evm {
            proxy_creation_code: bytes!("0x608060405234801561001057600080fd5b50"),
        },
        version: AccountVersion::V1_4_1,
    }
}

/// Chain state served by [`MockChain`], with a counter per call.
#[derive(Debug)]
pub struct MockChain {
    pub chain_id: ChainId,
    pub code: Mutex<HashMap<Address, Bytes>>,
    pub nonce: U256,
    pub threshold: usize,
    pub inner_gas: u64,
    pub fail_reads: bool,
    pub get_code_calls: AtomicUsize,
    pub nonce_calls: AtomicUsize,
    pub threshold_calls: AtomicUsize,
    pub estimate_calls: AtomicUsize,
    /// `(from, to)` of every gas estimate.
    pub estimates: Mutex<Vec<(Address, Address)>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            chain_id: CHAIN_ID,
            code: Default::default(),
            nonce: U256::ZERO,
            threshold: 1,
            inner_gas: 45_000,
            fail_reads: false,
            get_code_calls: AtomicUsize::new(0),
            nonce_calls: AtomicUsize::new(0),
            threshold_calls: AtomicUsize::new(0),
            estimate_calls: AtomicUsize::new(0),
            estimates: Default::default(),
        }
    }
}

impl MockChain {
    pub fn with_code(self, address: Address) -> Self {
        self.code.lock().unwrap().insert(address, bytes!("0x6080"));
        self
    }

    pub fn total_calls(&self) -> usize {
        self.get_code_calls.load(Ordering::SeqCst)
            + self.nonce_calls.load(Ordering::SeqCst)
            + self.threshold_calls.load(Ordering::SeqCst)
            + self.estimate_calls.load(Ordering::SeqCst)
    }

    pub fn estimates(&self) -> Vec<(Address, Address)> {
        self.estimates.lock().unwrap().clone()
    }

    fn read<T>(&self, value: T) -> TransportResult<T> {
        if self.fail_reads {
            return Err(TransportErrorKind::custom_str("connection refused"));
        }
        Ok(value)
    }
}

#[async_trait]
impl ChainAccess for MockChain {
    async fn get_code(&self, address: Address) -> TransportResult<Bytes> {
        self.get_code_calls.fetch_add(1, Ordering::SeqCst);
        let code = self.code.lock().unwrap().get(&address).cloned().unwrap_or_default();
        self.read(code)
    }

    async fn get_chain_id(&self) -> TransportResult<ChainId> {
        self.read(self.chain_id)
    }

    async fn get_account_nonce(&self, _account: Address) -> TransportResult<U256> {
        self.nonce_calls.fetch_add(1, Ordering::SeqCst);
        self.read(self.nonce)
    }

    async fn get_threshold(&self, _account: Address) -> TransportResult<usize> {
        self.threshold_calls.fetch_add(1, Ordering::SeqCst);
        self.read(self.threshold)
    }

    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        _value: U256,
        _data: Bytes,
    ) -> TransportResult<u64> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        self.estimates.lock().unwrap().push((from, to));
        self.read(self.inner_gas)
    }

    async fn is_valid_contract_signature(
        &self,
        _signer: Address,
        _digest: B256,
        _signature: Bytes,
    ) -> TransportResult<FixedBytes<4>> {
        self.read(FixedBytes::ZERO)
    }
}

/// Relay service recording quotes and submissions.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub fee: U256,
    pub fail_quote: bool,
    pub fail_submit: bool,
    pub quotes: Mutex<Vec<(ChainId, u64, Address)>>,
    pub submitted: Mutex<Vec<RelayEnvelope>>,
}

impl MockTransport {
    pub fn with_fee(fee: u64) -> Self {
        Self { fee: U256::from(fee), ..Default::default() }
    }

    pub fn quotes(&self) -> Vec<(ChainId, u64, Address)> {
        self.quotes.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<RelayEnvelope> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelayTransport for MockTransport {
    async fn quote_fee(
        &self,
        chain_id: ChainId,
        gas_limit: u64,
        fee_token: Address,
    ) -> eyre::Result<U256> {
        self.quotes.lock().unwrap().push((chain_id, gas_limit, fee_token));
        if self.fail_quote {
            eyre::bail!("price oracle unavailable");
        }
        Ok(self.fee)
    }

    async fn submit(&self, envelope: &RelayEnvelope) -> eyre::Result<TaskId> {
        if self.fail_submit {
            eyre::bail!("relay rejected the task");
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(envelope.clone());
        Ok(TaskId(format!("task-{}", submitted.len())))
    }
}

pub async fn owners(count: usize) -> eyre::Result<Vec<DynSigner>> {
    let mut owners = Vec::with_capacity(count);
    for key in OWNER_KEYS.iter().take(count) {
        owners.push(DynSigner::from_signing_key(key).await?);
    }
    Ok(owners)
}

pub fn predicted_account(owners: &[DynSigner], threshold: usize) -> eyre::Result<AccountRef> {
    let setup = AccountSetup::new(owners.iter().map(DynSigner::address).collect(), threshold)
        .with_fallback_handler(FALLBACK_HANDLER);
    let config = chain_config();
    let account = PredictedAccount::new(
        setup,
        SaltNonce::from(0),
        config.deployment_contracts(),
        &config.version,
    )?;
    Ok(account.into())
}

pub fn pipeline(
    chain: MockChain,
    transport: MockTransport,
) -> RelayPipeline<MockChain, MockTransport> {
    RelayPipeline::new(chain, transport, CHAIN_ID, chain_config(), &RelaySettings::default())
}
