use std::fmt::Display;

use alloy::{primitives::TxHash, transports};

/// Error returned by the node as a result of a fetch request.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("fatal error: {0}")]
    Fatal(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unexpected empty RPC response")]
    NullResp,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,
}

/// Error terminating a whole trace unit: a single transaction,
/// or one block of a range scan.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("invalid txhash: {0}")]
    InvalidTxHash(String),

    #[error("invalid block range: {from}..={to}")]
    InvalidRange { from: u64, to: u64 },

    #[error("no receipt found for tx: {0}")]
    ReceiptNotFound(TxHash),

    #[error("no block found for block: {0}")]
    BlockNotFound(u64),

    #[error("node error: {0}")]
    Node(#[from] NodeError),
}

impl<E: Display> From<transports::RpcError<E>> for NodeError {
    fn from(value: transports::RpcError<E>) -> Self {
        match value {
            transports::RpcError::ErrorResp(ref resp) => {
                let msg = resp.message.to_ascii_lowercase();
                if (resp.code == -32600 || resp.code == -32601 || resp.code == -32602)
                    && (msg.contains("invalid") || msg.contains("not found"))
                {
                    Self::InvalidRequest(msg)
                } else if msg.contains("timeout") || msg.contains("timed out") {
                    Self::Timeout
                } else {
                    Self::Transport(value.to_string())
                }
            }
            transports::RpcError::NullResp => Self::NullResp,
            transports::RpcError::UnsupportedFeature(_) => Self::Fatal(value.to_string()),
            _ => Self::Transport(value.to_string()),
        }
    }
}
