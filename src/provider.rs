//! Chain access used by the relay pipeline.

use crate::types::{IAccount, ILegacySignatureValidator, ISignatureValidator};
use alloy::{
    primitives::{Address, B256, Bytes, ChainId, FixedBytes, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
    transports::{TransportErrorKind, TransportResult},
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Read-only chain access consumed by the pipeline.
///
/// Every call is a single request. Retries are left to the implementation.
#[async_trait]
pub trait ChainAccess: Send + Sync {
    /// Returns the code deployed at `address`.
    async fn get_code(&self, address: Address) -> TransportResult<Bytes>;

    /// Returns the chain id.
    async fn get_chain_id(&self) -> TransportResult<ChainId>;

    /// Returns the current nonce of a deployed account.
    async fn get_account_nonce(&self, account: Address) -> TransportResult<U256>;

    /// Returns the signature threshold of a deployed account.
    async fn get_threshold(&self, account: Address) -> TransportResult<usize>;

    /// Estimates the gas `from` spends calling `to` with `data` and `value`.
    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        value: U256,
        data: Bytes,
    ) -> TransportResult<u64>;

    /// Asks `signer` whether `signature` is valid for `digest`, returning the magic value.
    ///
    /// A signer that rejects the signature or reverts yields a zero value rather than an error.
    async fn is_valid_contract_signature(
        &self,
        signer: Address,
        digest: B256,
        signature: Bytes,
    ) -> TransportResult<FixedBytes<4>>;
}

#[async_trait]
impl<P> ChainAccess for P
where
    P: Provider,
{
    async fn get_code(&self, address: Address) -> TransportResult<Bytes> {
        self.get_code_at(address).await
    }

    async fn get_chain_id(&self) -> TransportResult<ChainId> {
        Provider::get_chain_id(self).await
    }

    async fn get_account_nonce(&self, account: Address) -> TransportResult<U256> {
        IAccount::new(account, self).nonce().call().await.map_err(TransportErrorKind::custom)
    }

    async fn get_threshold(&self, account: Address) -> TransportResult<usize> {
        let threshold = IAccount::new(account, self)
            .getThreshold()
            .call()
            .await
            .map_err(TransportErrorKind::custom)?;
        usize::try_from(threshold).map_err(TransportErrorKind::custom)
    }

    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        value: U256,
        data: Bytes,
    ) -> TransportResult<u64> {
        let request = TransactionRequest::default().from(from).to(to).value(value).input(data.into());
        Provider::estimate_gas(self, request).await
    }

    #[instrument(skip(self, signature))]
    async fn is_valid_contract_signature(
        &self,
        signer: Address,
        digest: B256,
        signature: Bytes,
    ) -> TransportResult<FixedBytes<4>> {
        match ISignatureValidator::new(signer, self)
            .isValidSignature(digest, signature.clone())
            .call()
            .await
        {
            Ok(magic) => return Ok(magic),
            Err(alloy::contract::Error::TransportError(err)) if !err.is_error_resp() => {
                return Err(err);
            }
            Err(err) => debug!(%err, "EIP-1271 check failed, trying legacy validator"),
        }

        match ILegacySignatureValidator::new(signer, self)
            .isValidSignature(Bytes::copy_from_slice(digest.as_slice()), signature)
            .call()
            .await
        {
            Ok(magic) => Ok(magic),
            Err(alloy::contract::Error::TransportError(err)) if !err.is_error_resp() => Err(err),
            Err(err) => {
                debug!(%err, "Legacy signature check failed");
                Ok(FixedBytes::ZERO)
            }
        }
    }
}
