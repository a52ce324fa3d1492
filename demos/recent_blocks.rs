//! Example: Trace the exchange logs of the most recent blocks.
//!
//! Run with: RPC_URL=http://localhost:8551 cargo run --example recent_blocks

use std::time::Duration;

use alloy::providers::Provider;
use futures::StreamExt;
use itertools::Itertools;
use order_trace::{dispatch::Fact, node::RpcNode, num::format_decimal, trace::TraceWalker};

const BLOCKS: u64 = 5;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::var("RPC_URL").unwrap_or_else(|_| "http://localhost:8551".to_string());
    let node = RpcNode::connect(&url.parse::<url::Url>()?, 10, Duration::from_millis(100)).await?;

    let latest = node.provider().get_block_number().await?;
    let from = latest.saturating_sub(BLOCKS - 1).max(1);
    println!("Tracing blocks {} to {}\n", from, latest);

    let walker = TraceWalker::new(&node);
    let mut traces = Box::pin(walker.trace_range(from, latest)?);
    while let Some(trace) = traces.next().await {
        let trace = match trace {
            Ok(trace) => trace,
            Err(e) => {
                println!("  skipped: {}", e);
                continue;
            }
        };
        let prices = trace
            .records
            .iter()
            .filter_map(|r| match &r.fact {
                Fact::MatchedPrice { price, .. } => Some(format_decimal(*price)),
                _ => None,
            })
            .join(", ");
        if !prices.is_empty() {
            println!("  {} matched at {}", trace.tx_hash, prices);
        }
    }

    Ok(())
}
