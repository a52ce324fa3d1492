//! Payload decoders for exchange event logs.
//!
//! Payloads are RLP lists of byte strings. Transaction hashes inside them are
//! double encoded: the element bytes are the ASCII text of a `0x`-prefixed hex
//! hash, not the 32 hash bytes themselves (see [`hash_from_element`]).

use std::str::FromStr;

use alloy::{
    primitives::{Bytes, TxHash, U256},
    rlp::Decodable,
};
use fastnum::UD256;

use crate::{num, types::RawLog};

/// Number of elements in a `Trades` log tuple.
pub const TRADE_TUPLE_LEN: usize = 14;

const BUY_TX_ELEMENT: usize = 1;
const SELL_TX_ELEMENT: usize = 2;
const PRICE_ELEMENT: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("multiple topics found in a log: {0}")]
    UnsupportedMultiTopic(usize),
}

/// Matched trade decoded from a `Trades` log.
#[derive(Clone, derive_more::Debug, PartialEq, Eq)]
pub struct TradeRecord {
    pub buy_tx_hash: TxHash,
    pub sell_tx_hash: TxHash,

    /// Matched price in wei.
    pub price_wei: U256,

    /// Matched price in ether units.
    #[debug("{price}")]
    pub price: UD256,
}

impl TradeRecord {
    /// Raw price as a `0x`-prefixed hex string.
    pub fn price_hex(&self) -> String {
        format!("{:#x}", self.price_wei)
    }
}

/// Rejects logs carrying more than one topic.
pub fn check_single_topic(log: &RawLog) -> Result<(), DecodeError> {
    if log.topics.len() > 1 {
        return Err(DecodeError::UnsupportedMultiTopic(log.topics.len()));
    }
    Ok(())
}

/// Decodes a `Trades` log payload.
///
/// The payload must decode to exactly [`TRADE_TUPLE_LEN`] elements, anything
/// else is rejected as a whole.
pub fn decode_trade(payload: &[u8]) -> Result<TradeRecord, DecodeError> {
    let elements = decode_elements(payload)?;
    if elements.len() != TRADE_TUPLE_LEN {
        return Err(DecodeError::MalformedPayload(format!(
            "expected {TRADE_TUPLE_LEN} elements, got {}",
            elements.len()
        )));
    }

    let buy_tx_hash = hash_from_element(&elements[BUY_TX_ELEMENT])?;
    let sell_tx_hash = hash_from_element(&elements[SELL_TX_ELEMENT])?;
    let price_wei = U256::try_from_be_slice(&elements[PRICE_ELEMENT]).ok_or_else(|| {
        DecodeError::MalformedPayload(format!(
            "price element is {} bytes long",
            elements[PRICE_ELEMENT].len()
        ))
    })?;

    Ok(TradeRecord {
        buy_tx_hash,
        sell_tx_hash,
        price_wei,
        price: num::Converter::ether().from_unsigned(price_wei),
    })
}

/// Decodes a `TriggeredIds` or `CanceledIds` log payload into transaction
/// hashes, preserving payload order. An empty list is valid.
///
/// Only a payload that is not an RLP list fails as a whole. Each element is
/// decoded on its own, so one malformed id leaves its siblings readable.
pub fn decode_id_list(payload: &[u8]) -> Result<Vec<Result<TxHash, DecodeError>>, DecodeError> {
    Ok(decode_elements(payload)?
        .iter()
        .map(|element| hash_from_element(element))
        .collect())
}

/// `Cancel` and `TopicTriggerAbove` logs carry nothing to decode: the log
/// itself is the signal. Only the topic layout is validated.
pub fn decode_marker(log: &RawLog) -> Result<(), DecodeError> {
    check_single_topic(log)
}

/// Reads a transaction hash from an RLP element holding its ASCII hex text.
pub fn hash_from_element(element: &[u8]) -> Result<TxHash, DecodeError> {
    let text = std::str::from_utf8(element).map_err(|e| {
        DecodeError::MalformedPayload(format!("hash element is not text: {e}"))
    })?;
    let hex = text.strip_prefix("0x").unwrap_or(text);
    TxHash::from_str(hex).map_err(|e| {
        DecodeError::MalformedPayload(format!("hash element {text:?} is not a hash: {e}"))
    })
}

fn decode_elements(payload: &[u8]) -> Result<Vec<Bytes>, DecodeError> {
    let mut buf = payload;
    let elements = Vec::<Bytes>::decode(&mut buf)
        .map_err(|e| DecodeError::MalformedPayload(format!("rlp: {e}")))?;
    if !buf.is_empty() {
        return Err(DecodeError::MalformedPayload(format!(
            "{} trailing bytes after rlp list",
            buf.len()
        )));
    }
    Ok(elements)
}
