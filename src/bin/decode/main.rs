//! Order-matching trace decoder.
//!
//! Narrates the exchange logs of a single transaction, or of every
//! transaction in an inclusive block range:
//!
//! ```text
//! decode <txhash>
//! decode <fromBlock> <toBlock>
//! ```

mod config;
mod render;

use std::process::exit;

use alloy::primitives::TxHash;
use clap::Parser;
use futures::StreamExt;
use order_trace::{
    node::{NodeClient, RpcNode},
    trace::TraceWalker,
};
use tracing::{error, info};

use config::{CliConfig, EnvConfig, Target};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    // Parse environment configuration
    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };

    // Parse CLI arguments
    let cli_config = match CliConfig::try_parse() {
        Ok(config) => config,
        Err(e) if e.use_stderr() => {
            _ = e.print();
            exit(1);
        }
        Err(e) => e.exit(),
    };

    // Validate target before touching the node
    let target = match cli_config.to_target() {
        Ok(target) => target,
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    };

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Parse RPC URL
    let node_url = match env_config.rpc_url() {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Invalid RPC URL: {}", e);
            exit(1);
        }
    };

    let node = match RpcNode::connect(
        &node_url,
        env_config.rpc_retries(),
        env_config.rpc_backoff(),
    )
    .await
    {
        Ok(node) => node,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", node_url, e);
            exit(1);
        }
    };

    let walker = TraceWalker::new(&node);
    let code = match target {
        Target::Transaction(tx_hash) => decode_transaction(&walker, tx_hash).await,
        Target::Range { from, to } => decode_range(&walker, from, to).await,
    };
    exit(code);
}

async fn decode_transaction<N: NodeClient>(
    walker: &TraceWalker<'_, N>,
    tx_hash: TxHash,
) -> i32 {
    match walker.trace_receipt(tx_hash).await {
        Ok(records) => {
            for line in render::render_records(&records) {
                println!("{line}");
            }
            let failures = records.iter().filter(|r| r.is_failure()).count();
            if failures > 0 {
                info!(failures, "some logs could not be fully decoded");
            }
            0
        }
        Err(e) => {
            error!(%e, "failed to decode transaction");
            1
        }
    }
}

async fn decode_range<N: NodeClient>(walker: &TraceWalker<'_, N>, from: u64, to: u64) -> i32 {
    println!("Analyzing logs from block {from} to block {to}");

    let traces = match walker.trace_range(from, to) {
        Ok(traces) => traces,
        Err(e) => {
            eprintln!("{}", e);
            return 1;
        }
    };
    let mut traces = Box::pin(traces);

    let (mut decoded, mut skipped) = (0usize, 0usize);
    while let Some(result) = traces.next().await {
        match result {
            Ok(trace) => {
                if let Some(header) = render::render_trace_header(&trace) {
                    println!("{header}");
                }
                for line in render::render_records(&trace.records) {
                    println!("{line}");
                }
                println!("{}", render::SEPARATOR);
                decoded += 1;
            }
            Err(e) => {
                eprintln!("{}", e);
                skipped += 1;
            }
        }
    }
    info!(decoded, skipped, "block range analyzed");
    0
}
