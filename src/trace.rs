//! Receipt and block range walking.

use alloy::primitives::TxHash;
use futures::{Stream, StreamExt, stream};
use tracing::{debug, info, warn};

use crate::{
    dispatch::{LogDispatcher, NarrationRecord},
    error::TraceError,
    node::NodeClient,
    types::RawLog,
};

/// Narration of a single transaction receipt.
#[derive(Clone, Debug)]
pub struct TransactionTrace {
    pub tx_hash: TxHash,

    /// Block number and transaction index, when walked as part of a range.
    pub position: Option<(u64, usize)>,

    pub records: Vec<NarrationRecord>,
}

/// Walks receipts and block ranges, dispatching every log in order.
#[derive(Debug)]
pub struct TraceWalker<'n, N> {
    node: &'n N,
    dispatcher: LogDispatcher<'n, N>,
}

/// Parses a `0x`-prefixed, 64 hex digit transaction hash.
pub fn parse_tx_hash(value: &str) -> Result<TxHash, TraceError> {
    let invalid = || TraceError::InvalidTxHash(value.to_string());
    let hex = value.strip_prefix("0x").ok_or_else(invalid)?;
    if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    hex.parse().map_err(|_| invalid())
}

/// Checks that both ends of the range are positive and ordered.
pub fn validate_range(from: u64, to: u64) -> Result<(), TraceError> {
    if from == 0 || to == 0 || from > to {
        return Err(TraceError::InvalidRange { from, to });
    }
    Ok(())
}

impl<'n, N: NodeClient> TraceWalker<'n, N> {
    pub fn new(node: &'n N) -> Self {
        Self {
            node,
            dispatcher: LogDispatcher::new(node),
        }
    }

    /// Traces a single transaction given as text.
    ///
    /// The hash shape is validated before any node access.
    pub async fn trace_transaction(&self, tx_hash: &str) -> Result<TransactionTrace, TraceError> {
        let tx_hash = parse_tx_hash(tx_hash)?;
        let records = self.trace_receipt(tx_hash).await?;
        Ok(TransactionTrace {
            tx_hash,
            position: None,
            records,
        })
    }

    /// Narrates every log of the transaction receipt, in log order.
    pub async fn trace_receipt(&self, tx_hash: TxHash) -> Result<Vec<NarrationRecord>, TraceError> {
        let logs = self
            .node
            .receipt_logs(tx_hash)
            .await?
            .ok_or(TraceError::ReceiptNotFound(tx_hash))?;
        debug!(%tx_hash, logs = logs.len(), "receipt fetched");
        Ok(self.trace_logs(&logs).await)
    }

    /// Narrates a set of logs in order, each opened by a [`Fact::Log`] header.
    /// A log that fails to decode never prevents the following ones from
    /// being narrated.
    ///
    /// [`Fact::Log`]: crate::dispatch::Fact::Log
    pub async fn trace_logs(&self, logs: &[RawLog]) -> Vec<NarrationRecord> {
        if logs.is_empty() {
            return vec![NarrationRecord::no_logs()];
        }
        let mut records = Vec::new();
        for log in logs {
            records.push(NarrationRecord::log_header(log));
            records.extend(self.dispatcher.dispatch(log).await);
        }
        records
    }

    /// Traces every transaction of the inclusive block range, in block and
    /// transaction index order.
    ///
    /// The first transaction of each block is skipped. A missing block or
    /// receipt yields an `Err` item and the scan goes on with the next one.
    pub fn trace_range(
        &self,
        from: u64,
        to: u64,
    ) -> Result<impl Stream<Item = Result<TransactionTrace, TraceError>> + '_, TraceError> {
        validate_range(from, to)?;
        info!(from, to, "analyzing block range");
        Ok(stream::iter(from..=to)
            .then(move |block_number| self.trace_block(block_number))
            .flat_map(stream::iter))
    }

    async fn trace_block(&self, block_number: u64) -> Vec<Result<TransactionTrace, TraceError>> {
        let tx_hashes = match self.node.block_transactions(block_number).await {
            Ok(Some(tx_hashes)) => tx_hashes,
            Ok(None) => {
                warn!(block_number, "no block found");
                return vec![Err(TraceError::BlockNotFound(block_number))];
            }
            Err(err) => {
                warn!(block_number, %err, "failed to fetch block");
                return vec![Err(err.into())];
            }
        };

        let mut traces = Vec::with_capacity(tx_hashes.len().saturating_sub(1));
        for (tx_index, tx_hash) in tx_hashes.into_iter().enumerate().skip(1) {
            let trace = self
                .trace_receipt(tx_hash)
                .await
                .map(|records| TransactionTrace {
                    tx_hash,
                    position: Some((block_number, tx_index)),
                    records,
                });
            if let Err(err) = &trace {
                warn!(block_number, tx_index, %tx_hash, %err, "failed to trace transaction");
            }
            traces.push(trace);
        }
        traces
    }
}
