use alloy::primitives::{B256, Bytes, U256};
use fastnum::udec256;
use futures::StreamExt;
use order_trace::{
    dispatch::Fact,
    error::TraceError,
    testing::{self, MockNode},
    topic::EventKind,
    trace::TraceWalker,
    types::{TradeRole, TxType},
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

fn hash(byte: u8) -> B256 {
    B256::repeat_byte(byte)
}

fn hash_text(byte: u8) -> String {
    format!("{:#x}", hash(byte))
}

/// Tests that an invalid hash is rejected before any node access.
#[tokio::test]
async fn test_invalid_tx_hash_no_network() {
    let node = MockNode::default();
    let walker = TraceWalker::new(&node);

    for invalid in [
        String::new(),
        "0x1234".to_string(),
        "ab".repeat(33),
        format!("0x{}", "zz".repeat(32)),
    ] {
        assert!(matches!(
            walker.trace_transaction(&invalid).await,
            Err(TraceError::InvalidTxHash(_))
        ));
    }
    assert_eq!(node.total_calls(), 0);
}

/// Tests that an inverted range is rejected before any node access.
#[tokio::test]
async fn test_invalid_range_no_network() {
    let node = MockNode::default();
    let walker = TraceWalker::new(&node);

    assert!(matches!(
        walker.trace_range(10, 5).map(|_| ()),
        Err(TraceError::InvalidRange { from: 10, to: 5 })
    ));
    assert_err!(walker.trace_range(0, 5).map(|_| ()));
    assert_eq!(node.total_calls(), 0);
}

#[tokio::test]
async fn test_missing_receipt() {
    let node = MockNode::default();
    let walker = TraceWalker::new(&node);

    assert!(matches!(
        walker.trace_transaction(&hash_text(1)).await,
        Err(TraceError::ReceiptNotFound(h)) if h == hash(1)
    ));
    assert_eq!(node.receipt_calls(), 1);
}

#[tokio::test]
async fn test_receipt_without_logs() {
    let node = MockNode::default();
    node.insert_receipt(hash(1), vec![]);

    let trace = assert_ok!(
        TraceWalker::new(&node)
            .trace_transaction(&hash_text(1))
            .await
    );
    assert_eq!(trace.records.len(), 1);
    assert!(matches!(trace.records[0].fact, Fact::NoLogs));
    assert_eq!(trace.records[0].log_index, None);
}

/// Tests that a log with an empty payload is skipped without decoding.
#[tokio::test]
async fn test_empty_payload_skipped() {
    let node = MockNode::default();
    node.insert_receipt(
        hash(1),
        vec![testing::event_log(EventKind::Trades, Bytes::new())],
    );

    let trace = TraceWalker::new(&node)
        .trace_transaction(&hash_text(1))
        .await
        .unwrap();
    assert_eq!(trace.records.len(), 2);
    assert!(matches!(
        trace.records[0].fact,
        Fact::Log { index: 0, kind: EventKind::Trades }
    ));
    assert!(matches!(trace.records[1].fact, Fact::SkippedEmpty));
    assert_eq!(node.transaction_calls(), 0);
}

/// Tests that a multi-topic log fails alone and the next log is still narrated.
#[tokio::test]
async fn test_multi_topic_log_isolated() {
    let node = MockNode::default();
    let ids = [hash(0xa1), hash(0xa2)];
    node.insert_receipt(
        hash(1),
        vec![
            testing::raw_log(vec![hash(0x10), hash(0x11)], Bytes::from_static(&[0x01])),
            testing::event_log(EventKind::TriggeredIds, testing::id_list_payload(&ids)),
        ],
    );

    let trace = TraceWalker::new(&node)
        .trace_transaction(&hash_text(1))
        .await
        .unwrap();
    assert_eq!(trace.records.len(), 5);
    assert_eq!(trace.records[1].log_index, Some(0));
    assert!(matches!(
        &trace.records[1].fact,
        Fact::Failed { reason } if reason.contains("multiple topics")
    ));
    assert!(matches!(
        trace.records[2].fact,
        Fact::Log { index: 1, kind: EventKind::TriggeredIds }
    ));
    assert_eq!(trace.records[3].kind, Some(EventKind::TriggeredIds));
    assert!(matches!(
        trace.records[4].fact,
        Fact::TriggeredId { position: 1, tx_hash } if tx_hash == ids[1]
    ));
}

/// Tests that a failed buyer resolution still narrates the seller leg and price.
#[tokio::test]
async fn test_trade_with_missing_buyer() {
    let node = MockNode::default();
    let (buy, sell) = (hash(0xb0), hash(0x5e));
    node.insert_transaction(
        sell,
        testing::order_input(TxType::New, &json!({"price": 3, "side": 1, "tpslLimit": null})),
    );
    node.insert_receipt(
        hash(1),
        vec![testing::event_log(
            EventKind::Trades,
            testing::trade_payload(buy, sell, U256::from(3_000_000_000_000_000_000u128)),
        )],
    );

    let trace = TraceWalker::new(&node)
        .trace_transaction(&hash_text(1))
        .await
        .unwrap();
    assert_eq!(trace.records.len(), 4);
    assert!(matches!(trace.records[0].fact, Fact::Log { index: 0, .. }));
    assert!(matches!(
        trace.records[1].fact,
        Fact::OrderLegFailed { role: TradeRole::Buyer, tx_hash, .. } if tx_hash == buy
    ));
    assert!(matches!(
        &trace.records[2].fact,
        Fact::OrderLeg { role: TradeRole::Seller, intent, .. } if intent.label().is_some_and(|l| l.name() == "LIMIT")
    ));
    assert!(matches!(
        trace.records[3].fact,
        Fact::MatchedPrice { price, .. } if price == udec256!(3)
    ));
    assert_eq!(node.transaction_calls(), 2);
}

/// Tests a receipt mixing every kind of log, narrated in log order.
#[tokio::test]
async fn test_mixed_receipt_order() {
    let node = MockNode::default();
    let (buy, sell) = (hash(0xb0), hash(0x5e));
    node.insert_transaction(
        buy,
        testing::order_input(TxType::StopOrder, &json!({"price": 2, "side": 0})),
    );
    node.insert_transaction(
        sell,
        testing::order_input(TxType::New, &json!({"price": 2, "side": 1})),
    );
    node.insert_receipt(
        hash(1),
        vec![
            testing::event_log(EventKind::TriggeredIds, testing::id_list_payload(&[buy])),
            testing::event_log(EventKind::TriggerAbove, Bytes::from_static(&[0x01])),
            testing::event_log(
                EventKind::Trades,
                testing::trade_payload(buy, sell, U256::from(2_000_000_000_000_000_000u128)),
            ),
            testing::raw_log(vec![hash(0x77)], Bytes::from_static(&[0x01])),
        ],
    );

    let trace = TraceWalker::new(&node)
        .trace_transaction(&hash_text(1))
        .await
        .unwrap();
    let indices: Vec<_> = trace.records.iter().map(|r| r.log_index).collect();
    assert_eq!(indices, vec![
        Some(0),
        Some(0),
        Some(1),
        Some(2),
        Some(2),
        Some(2),
        Some(2),
        Some(3),
        Some(3)
    ]);
    let headers: Vec<_> = trace
        .records
        .iter()
        .filter_map(|r| match r.fact {
            Fact::Log { index, kind } => Some((index, kind)),
            _ => None,
        })
        .collect();
    assert_eq!(headers, vec![
        (0, EventKind::TriggeredIds),
        (1, EventKind::TriggerAbove),
        (2, EventKind::Trades),
        (3, EventKind::Unknown(Some(hash(0x77)))),
    ]);
    assert!(matches!(
        trace.records[8].fact,
        Fact::UnexpectedTopic { topic: Some(t), tx_hash: Some(h) } if t == hash(0x77) && h == hash(1)
    ));
}

/// Tests that logs narrating nothing are still listed with their kind.
#[tokio::test]
async fn test_silent_logs_keep_headers() {
    let node = MockNode::default();
    node.insert_receipt(
        hash(1),
        vec![
            testing::event_log(EventKind::Cancel, Bytes::from_static(&[0x01])),
            testing::event_log(EventKind::CanceledIds, testing::id_list_payload(&[])),
            testing::event_log(EventKind::TriggerAbove, Bytes::from_static(&[0x01])),
        ],
    );

    let trace = assert_ok!(
        TraceWalker::new(&node)
            .trace_transaction(&hash_text(1))
            .await
    );
    let facts: Vec<_> = trace
        .records
        .iter()
        .map(|r| match r.fact {
            Fact::Log { index, kind } => (index, kind),
            ref other => panic!("unexpected fact {other:?}"),
        })
        .collect();
    assert_eq!(facts, vec![
        (0, EventKind::Cancel),
        (1, EventKind::CanceledIds),
        (2, EventKind::TriggerAbove),
    ]);
    assert!(trace.records.iter().all(|r| !r.is_failure()));
}

/// Tests that one malformed id does not hide the other ids of the list.
#[tokio::test]
async fn test_malformed_id_isolated() {
    let node = MockNode::default();
    let valid = hash(0xa1);
    let payload: Bytes = alloy::rlp::encode(vec![
        Bytes::from_static(b"0xabc"),
        testing::hash_element(valid),
    ])
    .into();
    node.insert_receipt(
        hash(1),
        vec![testing::event_log(EventKind::TriggeredIds, payload)],
    );

    let trace = assert_ok!(
        TraceWalker::new(&node)
            .trace_transaction(&hash_text(1))
            .await
    );
    assert_eq!(trace.records.len(), 3);
    assert!(matches!(trace.records[1].fact, Fact::MalformedId { position: 0, .. }));
    assert!(matches!(
        trace.records[2].fact,
        Fact::TriggeredId { position: 1, tx_hash } if tx_hash == valid
    ));
}

/// Tests range scanning order, first-transaction skip and skip-and-continue.
#[tokio::test]
async fn test_trace_range() {
    let node = MockNode::default();
    node.insert_block(1, vec![hash(0x01), hash(0x02), hash(0x03)]);
    // block 2 is missing
    node.fail_block(3, "connection reset");
    node.insert_block(4, vec![hash(0x41), hash(0x42)]);

    node.insert_receipt(hash(0x01), vec![]);
    node.insert_receipt(hash(0x02), vec![]);
    // hash(0x03) has no receipt
    node.insert_receipt(
        hash(0x42),
        vec![testing::event_log(EventKind::Trades, Bytes::new())],
    );

    let walker = TraceWalker::new(&node);
    let results: Vec<_> = walker.trace_range(1, 4).unwrap().collect().await;

    assert_eq!(results.len(), 5);
    let trace = assert_ok!(&results[0]);
    assert_eq!(trace.tx_hash, hash(0x02));
    assert_eq!(trace.position, Some((1, 1)));
    assert!(matches!(trace.records[0].fact, Fact::NoLogs));
    assert!(matches!(&results[1], Err(TraceError::ReceiptNotFound(h)) if *h == hash(0x03)));
    assert!(matches!(results[2], Err(TraceError::BlockNotFound(2))));
    assert!(matches!(results[3], Err(TraceError::Node(_))));
    let trace = assert_ok!(&results[4]);
    assert_eq!(trace.position, Some((4, 1)));
    assert!(matches!(trace.records[0].fact, Fact::Log { index: 0, .. }));
    assert!(matches!(trace.records[1].fact, Fact::SkippedEmpty));

    assert_eq!(node.block_calls(), 4);
    // first transaction of every block is never fetched
    assert_eq!(node.receipt_calls(), 3);
}
