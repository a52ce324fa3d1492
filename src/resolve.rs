//! Order transaction resolution.
//!
//! An exchange transaction input is a one-byte [`TxType`] tag followed by a
//! JSON encoded order context.

use std::fmt;

use alloy::primitives::TxHash;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::NodeError,
    node::NodeClient,
    types::{OrderSide, TxType},
};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("transaction not found: {0}")]
    TransactionNotFound(TxHash),

    #[error("malformed order context: {0}")]
    MalformedContext(String),

    #[error("node error: {0}")]
    Node(#[from] NodeError),
}

/// Order context carried by an exchange transaction.
///
/// Only the fields needed for narration are captured, everything else is ignored.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderContext {
    pub price: Value,

    /// Side index, `0` for buy and `1` for sell.
    pub side: u8,

    #[serde(default)]
    pub tpsl_limit: Option<Value>,
}

/// Decoded meaning of an order transaction input.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderIntent {
    pub tx_type: TxType,
    pub context: OrderContext,
}

/// Narration label of an order kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderLabel {
    Limit,
    LimitTpsl,
    StopOrder,
}

impl OrderContext {
    pub fn side(&self) -> Option<OrderSide> {
        OrderSide::try_from(self.side).ok()
    }

    pub fn has_tpsl(&self) -> bool {
        self.tpsl_limit.as_ref().is_some_and(|v| !v.is_null())
    }
}

impl OrderIntent {
    /// Parses a raw transaction input.
    pub fn parse(input: &[u8]) -> Result<Self, ResolveError> {
        let (tag, body) = input
            .split_first()
            .ok_or_else(|| ResolveError::MalformedContext("empty transaction input".to_string()))?;
        let text = std::str::from_utf8(body)
            .map_err(|e| ResolveError::MalformedContext(e.to_string()))?;
        let context =
            serde_json::from_str(text).map_err(|e| ResolveError::MalformedContext(e.to_string()))?;
        Ok(Self {
            tx_type: TxType::from(*tag),
            context,
        })
    }

    /// Label shown in trade leg narration.
    ///
    /// Only `STOP_ORDER` and `NEW` transactions are labeled; other types yield `None`.
    pub fn label(&self) -> Option<OrderLabel> {
        match self.tx_type {
            TxType::StopOrder => Some(OrderLabel::StopOrder),
            TxType::New if self.context.has_tpsl() => Some(OrderLabel::LimitTpsl),
            TxType::New => Some(OrderLabel::Limit),
            _ => None,
        }
    }
}

impl OrderLabel {
    pub fn name(&self) -> &'static str {
        match self {
            OrderLabel::Limit => "LIMIT",
            OrderLabel::LimitTpsl => "LIMIT_TPSL",
            OrderLabel::StopOrder => "STOP_ORDER",
        }
    }
}

impl fmt::Display for OrderLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fetches order transactions and decodes their inputs.
#[derive(Debug)]
pub struct OrderResolver<'n, N> {
    node: &'n N,
}

impl<'n, N: NodeClient> OrderResolver<'n, N> {
    pub fn new(node: &'n N) -> Self {
        Self { node }
    }

    pub async fn resolve(&self, tx_hash: TxHash) -> Result<OrderIntent, ResolveError> {
        let input = self
            .node
            .transaction_input(tx_hash)
            .await?
            .ok_or(ResolveError::TransactionNotFound(tx_hash))?;
        let intent = OrderIntent::parse(&input)?;
        debug!(%tx_hash, tx_type = %intent.tx_type, "order transaction resolved");
        Ok(intent)
    }
}
