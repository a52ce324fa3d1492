use alloy::{
    primitives::{B256, Bytes, TxHash},
    rpc::types::Log,
};

/// Event log as emitted in a transaction receipt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawLog {
    /// Position of the log within its receipt.
    pub index: usize,

    /// Hash of the transaction that emitted the log, if known.
    pub tx_hash: Option<TxHash>,

    pub topics: Vec<B256>,

    /// Opaque payload, empty when the log carries no data.
    pub data: Bytes,
}

impl RawLog {
    pub fn new(index: usize, tx_hash: Option<TxHash>, topics: Vec<B256>, data: Bytes) -> Self {
        Self {
            index,
            tx_hash,
            topics,
            data,
        }
    }

    pub fn from_rpc(index: usize, log: &Log) -> Self {
        Self {
            index,
            tx_hash: log.transaction_hash,
            topics: log.topics().to_vec(),
            data: log.data().data.clone(),
        }
    }

    /// First topic, identifying the event kind.
    pub fn topic(&self) -> Option<&B256> {
        self.topics.first()
    }
}
