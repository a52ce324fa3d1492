//! In-memory testing environment and payload builders.
//!
//! [`MockNode`] implements [`NodeClient`] over in-memory maps and counts every
//! fetch, so tests can assert both the narration and the node traffic it took.
//!
//! [`trade_payload`], [`id_list_payload`] and [`order_input`] encode payloads
//! the same way the exchange contract does.

use std::sync::atomic::{AtomicUsize, Ordering};

use alloy::{
    primitives::{B256, Bytes, TxHash, U256},
    rlp,
};
use dashmap::DashMap;
use serde_json::Value;

use crate::{
    decode::TRADE_TUPLE_LEN,
    error::NodeError,
    node::NodeClient,
    topic::{self, EventKind},
    types::{RawLog, TxType},
};

/// Node double keeping transactions, receipts and blocks in memory.
#[derive(Debug, Default)]
pub struct MockNode {
    transactions: DashMap<TxHash, Bytes>,
    receipts: DashMap<TxHash, Vec<RawLog>>,
    blocks: DashMap<u64, Vec<TxHash>>,
    failing_blocks: DashMap<u64, String>,
    transaction_calls: AtomicUsize,
    receipt_calls: AtomicUsize,
    block_calls: AtomicUsize,
}

impl MockNode {
    pub fn insert_transaction(&self, tx_hash: TxHash, input: Bytes) {
        self.transactions.insert(tx_hash, input);
    }

    /// Stores a receipt. Log indices and transaction hashes are assigned
    /// from the receipt position.
    pub fn insert_receipt(&self, tx_hash: TxHash, logs: Vec<RawLog>) {
        let logs = logs
            .into_iter()
            .enumerate()
            .map(|(index, log)| RawLog {
                index,
                tx_hash: Some(tx_hash),
                ..log
            })
            .collect();
        self.receipts.insert(tx_hash, logs);
    }

    pub fn insert_block(&self, block_number: u64, tx_hashes: Vec<TxHash>) {
        self.blocks.insert(block_number, tx_hashes);
    }

    /// Makes fetching the block fail with a transport error.
    pub fn fail_block(&self, block_number: u64, reason: &str) {
        self.failing_blocks.insert(block_number, reason.to_string());
    }

    pub fn transaction_calls(&self) -> usize {
        self.transaction_calls.load(Ordering::Relaxed)
    }

    pub fn receipt_calls(&self) -> usize {
        self.receipt_calls.load(Ordering::Relaxed)
    }

    pub fn block_calls(&self) -> usize {
        self.block_calls.load(Ordering::Relaxed)
    }

    pub fn total_calls(&self) -> usize {
        self.transaction_calls() + self.receipt_calls() + self.block_calls()
    }
}

impl NodeClient for MockNode {
    async fn transaction_input(&self, tx_hash: TxHash) -> Result<Option<Bytes>, NodeError> {
        self.transaction_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.transactions.get(&tx_hash).map(|input| input.value().clone()))
    }

    async fn receipt_logs(&self, tx_hash: TxHash) -> Result<Option<Vec<RawLog>>, NodeError> {
        self.receipt_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.receipts.get(&tx_hash).map(|logs| logs.value().clone()))
    }

    async fn block_transactions(&self, block_number: u64) -> Result<Option<Vec<TxHash>>, NodeError> {
        self.block_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(reason) = self.failing_blocks.get(&block_number) {
            return Err(NodeError::Transport(reason.value().clone()));
        }
        Ok(self.blocks.get(&block_number).map(|txs| txs.value().clone()))
    }
}

/// RLP element holding the ASCII hex text of a transaction hash.
pub fn hash_element(tx_hash: TxHash) -> Bytes {
    Bytes::from(format!("{tx_hash:#x}").into_bytes())
}

/// Encodes a `Trades` log payload.
pub fn trade_payload(buy_tx_hash: TxHash, sell_tx_hash: TxHash, price_wei: U256) -> Bytes {
    trade_payload_with_len(buy_tx_hash, sell_tx_hash, price_wei, TRADE_TUPLE_LEN)
}

/// Encodes a `Trades`-like payload truncated or padded to `len` elements.
pub fn trade_payload_with_len(
    buy_tx_hash: TxHash,
    sell_tx_hash: TxHash,
    price_wei: U256,
    len: usize,
) -> Bytes {
    let mut elements: Vec<Bytes> = (0..len.max(TRADE_TUPLE_LEN))
        .map(|i| Bytes::from(vec![i as u8]))
        .collect();
    elements[1] = hash_element(buy_tx_hash);
    elements[2] = hash_element(sell_tx_hash);
    elements[7] = Bytes::from(price_wei.to_be_bytes_trimmed_vec());
    elements.truncate(len);
    rlp::encode(&elements).into()
}

/// Encodes a `TriggeredIds`/`CanceledIds` log payload.
pub fn id_list_payload(tx_hashes: &[TxHash]) -> Bytes {
    let elements: Vec<Bytes> = tx_hashes.iter().copied().map(hash_element).collect();
    rlp::encode(&elements).into()
}

/// Encodes an exchange transaction input: type tag followed by JSON context.
pub fn order_input(tx_type: TxType, context: &Value) -> Bytes {
    let mut input = vec![u8::from(tx_type)];
    input.extend_from_slice(context.to_string().as_bytes());
    input.into()
}

/// Log with the topic of a known event kind.
pub fn event_log(kind: EventKind, data: Bytes) -> RawLog {
    RawLog::new(0, None, topic::topic_of(kind).into_iter().collect(), data)
}

/// Log with arbitrary topics.
pub fn raw_log(topics: Vec<B256>, data: Bytes) -> RawLog {
    RawLog::new(0, None, topics, data)
}
