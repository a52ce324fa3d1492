//! Plain text rendering of narration records.

use order_trace::{
    dispatch::{Fact, NarrationRecord},
    num,
    resolve::OrderIntent,
    trace::TransactionTrace,
};
use serde_json::Value;

pub const SEPARATOR: &str = "--------------------------------------";

/// Renders the records of one transaction, one line per record.
pub fn render_records(records: &[NarrationRecord]) -> Vec<String> {
    records.iter().map(|record| render_fact(&record.fact)).collect()
}

pub fn render_trace_header(trace: &TransactionTrace) -> Option<String> {
    trace.position.map(|(block_number, tx_index)| {
        format!(
            "Analyzing block {block_number} tx[{tx_index}]: {:#x}",
            trace.tx_hash
        )
    })
}

pub fn render_fact(fact: &Fact) -> String {
    match fact {
        Fact::Log { index, kind } => format!("..log[{index}] (topic: {kind})"),
        Fact::NoLogs => "..No logs found".to_string(),
        Fact::SkippedEmpty => "....Skipping empty data field.".to_string(),
        Fact::TriggeredId { position, tx_hash } => {
            format!("....TRIGGERED IDS[{position}]: {tx_hash:#x}")
        }
        Fact::CanceledId { position, tx_hash } => {
            format!("....CANCELED IDS[{position}]: {tx_hash:#x}")
        }
        Fact::MalformedId { position, reason } => format!("....id[{position}] not decoded: {reason}"),
        Fact::OrderLeg {
            tx_hash, intent, ..
        } => format!("....{} ({tx_hash:#x})", render_order(intent)),
        Fact::OrderLegFailed {
            role,
            tx_hash,
            reason,
        } => format!("....{} order {tx_hash:#x} not resolved: {reason}", role.name()),
        Fact::MatchedPrice { price, .. } => {
            format!("....matched price: ${}", num::format_decimal(*price))
        }
        Fact::UnexpectedTopic { topic, tx_hash } => format!(
            "....unexpected topic found: {}, txhash: {}",
            topic.map_or("none".to_string(), |t| format!("{t:#x}")),
            tx_hash.map_or("unknown".to_string(), |h| format!("{h:#x}")),
        ),
        Fact::Failed { reason } => format!("....error: {reason}"),
    }
}

/// `$price SIDE LABEL`, the label omitted for unlabeled order types.
fn render_order(intent: &OrderIntent) -> String {
    let side = intent.context.side().map_or("UNKNOWN", |s| s.name());
    let price = match &intent.context.price {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    match intent.label() {
        Some(label) => format!("${price} {side} {label}"),
        None => format!("${price} {side}"),
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{B256, U256};
    use fastnum::udec256;
    use order_trace::{
        topic::EventKind,
        types::{TradeRole, TxType},
    };
    use serde_json::json;

    use super::*;

    fn record(log_index: usize, kind: EventKind, fact: Fact) -> NarrationRecord {
        NarrationRecord {
            log_index: Some(log_index),
            kind: Some(kind),
            fact,
        }
    }

    fn leg(tx_type: TxType, context: Value) -> Fact {
        Fact::OrderLeg {
            role: TradeRole::Buyer,
            tx_hash: B256::repeat_byte(0xab),
            intent: OrderIntent::parse(&order_trace::testing::order_input(tx_type, &context))
                .unwrap(),
        }
    }

    #[test]
    fn test_render_order_legs() {
        let hash = format!("{:#x}", B256::repeat_byte(0xab));
        assert_eq!(
            render_fact(&leg(TxType::New, json!({"price": 3, "side": 0}))),
            format!("....$3 BUY LIMIT ({hash})")
        );
        assert_eq!(
            render_fact(&leg(TxType::New, json!({"price": "3", "side": 1, "tpslLimit": 1}))),
            format!("....$3 SELL LIMIT_TPSL ({hash})")
        );
        assert_eq!(
            render_fact(&leg(TxType::Modify, json!({"price": 3, "side": 5}))),
            format!("....$3 UNKNOWN ({hash})")
        );
    }

    fn header(log_index: usize, kind: EventKind) -> NarrationRecord {
        record(log_index, kind, Fact::Log {
            index: log_index,
            kind,
        })
    }

    #[test]
    fn test_render_records_with_log_headers() {
        let records = vec![
            header(0, EventKind::TriggeredIds),
            record(0, EventKind::TriggeredIds, Fact::TriggeredId {
                position: 0,
                tx_hash: B256::ZERO,
            }),
            header(1, EventKind::TriggerAbove),
            header(2, EventKind::Cancel),
            header(3, EventKind::Trades),
            record(3, EventKind::Trades, Fact::MatchedPrice {
                price: udec256!(2.5),
                price_wei: U256::from(2_500_000_000_000_000_000u128),
            }),
        ];
        assert_eq!(render_records(&records), vec![
            "..log[0] (topic: TRIGGERED IDS)".to_string(),
            format!("....TRIGGERED IDS[0]: {:#x}", B256::ZERO),
            "..log[1] (topic: TRIGGER ABOVE)".to_string(),
            "..log[2] (topic: CANCEL)".to_string(),
            "..log[3] (topic: TRADES)".to_string(),
            "....matched price: $2.5".to_string(),
        ]);
    }

    #[test]
    fn test_render_small_matched_price() {
        let fact = Fact::MatchedPrice {
            price: udec256!(0.000000000000000001),
            price_wei: U256::from(1u64),
        };
        assert_eq!(render_fact(&fact), "....matched price: $0.000000000000000001");
    }

    #[test]
    fn test_render_malformed_id() {
        let fact = Fact::MalformedId {
            position: 2,
            reason: "bad".to_string(),
        };
        assert_eq!(render_fact(&fact), "....id[2] not decoded: bad");
    }

    #[test]
    fn test_render_no_logs() {
        assert_eq!(render_records(&[NarrationRecord::no_logs()]), vec!["..No logs found"]);
    }
}
