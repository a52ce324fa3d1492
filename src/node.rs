//! Node access used by the decoding pipeline.

use std::time::Duration;

use alloy::{
    consensus::Transaction as _,
    eips::BlockNumberOrTag,
    primitives::{Bytes, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::layers::RetryBackoffLayer,
};
use url::Url;

use crate::{error::NodeError, types::RawLog};

/// Compute units per second budget given to the retry layer.
const COMPUTE_UNITS_PER_SECOND: u64 = 200;

/// Source of transactions, receipts and blocks.
///
/// Every fetch returns `Ok(None)` when the node does not know the requested item.
pub trait NodeClient {
    /// Input data of the transaction.
    fn transaction_input(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<Option<Bytes>, NodeError>>;

    /// Logs of the transaction receipt, in log index order.
    fn receipt_logs(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<Option<Vec<RawLog>>, NodeError>>;

    /// Hashes of the block transactions, in transaction index order.
    fn block_transactions(
        &self,
        block_number: u64,
    ) -> impl Future<Output = Result<Option<Vec<TxHash>>, NodeError>>;
}

/// [`NodeClient`] backed by an alloy [`Provider`].
#[derive(Clone, Debug)]
pub struct RpcNode<P> {
    provider: P,
}

impl<P: Provider> RpcNode<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl RpcNode<DynProvider> {
    /// Connects to the node at `url`, retrying rate-limited requests up to
    /// `max_retries` times with `backoff` between attempts.
    pub async fn connect(url: &Url, max_retries: u32, backoff: Duration) -> Result<Self, NodeError> {
        let client = RpcClient::builder()
            .layer(RetryBackoffLayer::new(
                max_retries,
                backoff_millis(backoff),
                COMPUTE_UNITS_PER_SECOND,
            ))
            .connect(url.as_str())
            .await
            .map_err(NodeError::from)?;
        let provider = ProviderBuilder::new().connect_client(client);
        Ok(Self::new(DynProvider::new(provider)))
    }
}

/// Backoff in whole milliseconds, saturating at `u64::MAX`.
fn backoff_millis(backoff: Duration) -> u64 {
    u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX)
}

impl<P: Provider> NodeClient for RpcNode<P> {
    async fn transaction_input(&self, tx_hash: TxHash) -> Result<Option<Bytes>, NodeError> {
        let tx = self.provider.get_transaction_by_hash(tx_hash).await?;
        Ok(tx.map(|tx| tx.input().clone()))
    }

    async fn receipt_logs(&self, tx_hash: TxHash) -> Result<Option<Vec<RawLog>>, NodeError> {
        let receipt = self.provider.get_transaction_receipt(tx_hash).await?;
        Ok(receipt.map(|receipt| {
            receipt
                .inner
                .logs()
                .iter()
                .enumerate()
                .map(|(index, log)| RawLog::from_rpc(index, log))
                .collect()
        }))
    }

    async fn block_transactions(&self, block_number: u64) -> Result<Option<Vec<TxHash>>, NodeError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(block_number))
            .full()
            .await?;
        Ok(block.map(|block| block.transactions.hashes().collect()))
    }
}
