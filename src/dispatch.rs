//! Per-log dispatch: classification, decoding and narration.

use alloy::primitives::{B256, TxHash, U256};
use fastnum::UD256;
use tracing::{debug, warn};

use crate::{
    decode::{self, DecodeError},
    node::NodeClient,
    resolve::{OrderIntent, OrderResolver},
    topic::{self, EventKind},
    types::{RawLog, TradeRole},
};

/// One decoded fact about a log, tagged with the log it originates from.
#[derive(Clone, derive_more::Debug)]
pub struct NarrationRecord {
    /// Index of the originating log within its receipt, `None` for
    /// receipt-level records.
    pub log_index: Option<usize>,

    /// Kind of the originating log.
    pub kind: Option<EventKind>,

    pub fact: Fact,
}

/// Decoded fact narrated about a log or a receipt.
#[derive(Clone, derive_more::Debug)]
pub enum Fact {
    /// Opens the records of one log, whether or not the log narrates anything.
    Log { index: usize, kind: EventKind },

    /// Receipt carries no logs at all.
    NoLogs,

    /// Log carries an empty payload.
    SkippedEmpty,

    /// Order transaction triggered by the log, in trigger order.
    TriggeredId { position: usize, tx_hash: TxHash },

    /// Order transaction canceled by the log, in log order.
    CanceledId { position: usize, tx_hash: TxHash },

    /// Id list element that does not hold a transaction hash.
    MalformedId { position: usize, reason: String },

    /// Resolved order transaction taking part in a trade.
    OrderLeg {
        role: TradeRole,
        tx_hash: TxHash,
        intent: OrderIntent,
    },

    /// Order transaction of a trade leg that could not be resolved.
    OrderLegFailed {
        role: TradeRole,
        tx_hash: TxHash,
        reason: String,
    },

    /// Price both trade legs matched at.
    MatchedPrice {
        #[debug("{price}")]
        price: UD256,
        price_wei: U256,
    },

    /// Log topic is not registered.
    UnexpectedTopic {
        topic: Option<B256>,
        tx_hash: Option<TxHash>,
    },

    /// Log could not be decoded.
    Failed { reason: String },
}

impl NarrationRecord {
    pub fn for_log(log: &RawLog, kind: EventKind, fact: Fact) -> Self {
        Self {
            log_index: Some(log.index),
            kind: Some(kind),
            fact,
        }
    }

    /// Header record naming the log index and its classified kind.
    pub fn log_header(log: &RawLog) -> Self {
        let kind = topic::classify_opt(log.topic());
        Self::for_log(log, kind, Fact::Log {
            index: log.index,
            kind,
        })
    }

    pub fn no_logs() -> Self {
        Self {
            log_index: None,
            kind: None,
            fact: Fact::NoLogs,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.fact,
            Fact::Failed { .. }
                | Fact::MalformedId { .. }
                | Fact::OrderLegFailed { .. }
                | Fact::UnexpectedTopic { .. }
        )
    }
}

/// Turns single logs into narration records.
///
/// Failures never escape a log: they are narrated as [`Fact::Failed`] or
/// [`Fact::OrderLegFailed`] records and processing of sibling logs continues.
#[derive(Debug)]
pub struct LogDispatcher<'n, N> {
    resolver: OrderResolver<'n, N>,
}

impl<'n, N: NodeClient> LogDispatcher<'n, N> {
    pub fn new(node: &'n N) -> Self {
        Self {
            resolver: OrderResolver::new(node),
        }
    }

    pub async fn dispatch(&self, log: &RawLog) -> Vec<NarrationRecord> {
        let kind = topic::classify_opt(log.topic());
        let mut records = Vec::new();
        if let Err(err) = self.dispatch_into(log, kind, &mut records).await {
            warn!(log_index = log.index, %kind, %err, "failed to decode log");
            records.push(NarrationRecord::for_log(
                log,
                kind,
                Fact::Failed {
                    reason: err.to_string(),
                },
            ));
        }
        records
    }

    async fn dispatch_into(
        &self,
        log: &RawLog,
        kind: EventKind,
        records: &mut Vec<NarrationRecord>,
    ) -> Result<(), DecodeError> {
        decode::check_single_topic(log)?;

        if log.data.is_empty() {
            records.push(NarrationRecord::for_log(log, kind, Fact::SkippedEmpty));
            return Ok(());
        }

        match kind {
            EventKind::TriggeredIds | EventKind::CanceledIds => {
                let ids = decode::decode_id_list(&log.data)?;
                for (position, id) in ids.into_iter().enumerate() {
                    let fact = match id {
                        Ok(tx_hash) if kind == EventKind::TriggeredIds => {
                            Fact::TriggeredId { position, tx_hash }
                        }
                        Ok(tx_hash) => Fact::CanceledId { position, tx_hash },
                        Err(err) => {
                            warn!(log_index = log.index, position, %err, "malformed id");
                            Fact::MalformedId {
                                position,
                                reason: err.to_string(),
                            }
                        }
                    };
                    records.push(NarrationRecord::for_log(log, kind, fact));
                }
            }
            EventKind::Trades => {
                let trade = decode::decode_trade(&log.data)?;
                for (role, tx_hash) in [
                    (TradeRole::Buyer, trade.buy_tx_hash),
                    (TradeRole::Seller, trade.sell_tx_hash),
                ] {
                    records.push(NarrationRecord::for_log(
                        log,
                        kind,
                        self.trade_leg(role, tx_hash).await,
                    ));
                }
                records.push(NarrationRecord::for_log(
                    log,
                    kind,
                    Fact::MatchedPrice {
                        price: trade.price,
                        price_wei: trade.price_wei,
                    },
                ));
            }
            EventKind::Cancel | EventKind::TriggerAbove => {
                decode::decode_marker(log)?;
                debug!(log_index = log.index, %kind, "marker log");
            }
            EventKind::Unknown(topic) => {
                warn!(log_index = log.index, ?topic, tx_hash = ?log.tx_hash, "unexpected topic");
                records.push(NarrationRecord::for_log(
                    log,
                    kind,
                    Fact::UnexpectedTopic {
                        topic,
                        tx_hash: log.tx_hash,
                    },
                ));
            }
        }
        Ok(())
    }

    /// Resolves one trade leg. Failures are narrated, not propagated, so the
    /// other leg and the matched price are always reported.
    async fn trade_leg(&self, role: TradeRole, tx_hash: TxHash) -> Fact {
        match self.resolver.resolve(tx_hash).await {
            Ok(intent) => Fact::OrderLeg {
                role,
                tx_hash,
                intent,
            },
            Err(err) => {
                warn!(role = role.name(), %tx_hash, %err, "failed to resolve order transaction");
                Fact::OrderLegFailed {
                    role,
                    tx_hash,
                    reason: err.to_string(),
                }
            }
        }
    }
}
