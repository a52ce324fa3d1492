//! Configuration for the decode tool.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): node endpoint and retry policy
//! - CLI arguments: what to decode

use std::time::Duration;

use alloy::primitives::TxHash;
use clap::Parser;
use order_trace::{
    error::TraceError,
    trace::{parse_tx_hash, validate_range},
};
use url::Url;

const DEFAULT_RPC_URL: &str = "http://localhost:8551";
const DEFAULT_RPC_RETRIES: u32 = 10;
const DEFAULT_RPC_BACKOFF_MS: u64 = 100;

/// Environment configuration.
#[derive(Debug, Default, serde::Deserialize)]
pub struct EnvConfig {
    /// RPC URL of the node (default: http://localhost:8551)
    pub rpc_url: Option<String>,

    /// Maximum retries of rate-limited requests (default: 10)
    pub rpc_retries: Option<u32>,

    /// Initial backoff between retries in milliseconds (default: 100)
    pub rpc_backoff_ms: Option<u64>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Parse the node RPC URL.
    pub fn rpc_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(self.rpc_url.as_deref().unwrap_or(DEFAULT_RPC_URL))
    }

    pub fn rpc_retries(&self) -> u32 {
        self.rpc_retries.unwrap_or(DEFAULT_RPC_RETRIES)
    }

    pub fn rpc_backoff(&self) -> Duration {
        Duration::from_millis(self.rpc_backoff_ms.unwrap_or(DEFAULT_RPC_BACKOFF_MS))
    }
}

/// CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "decode")]
#[command(about = "Narrate exchange order matching from transaction logs")]
#[command(override_usage = "decode <TXHASH>\n       decode <FROM_BLOCK> <TO_BLOCK>")]
pub struct CliConfig {
    /// Transaction hash (0x + 64 hex digits), or the first block of a range
    pub target: String,

    /// Last block of the range (inclusive)
    pub to_block: Option<String>,
}

/// What to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Transaction(TxHash),
    Range { from: u64, to: u64 },
}

impl CliConfig {
    /// Validate the arguments into a decode target, before any node access.
    pub fn to_target(&self) -> Result<Target, TraceError> {
        match &self.to_block {
            None => Ok(Target::Transaction(parse_tx_hash(&self.target)?)),
            Some(to_block) => {
                let from = parse_block(&self.target);
                let to = parse_block(to_block);
                validate_range(from, to)?;
                Ok(Target::Range { from, to })
            }
        }
    }
}

/// Unparseable block numbers are treated as `0`, which range validation rejects.
fn parse_block(value: &str) -> u64 {
    value.trim().parse().unwrap_or_default()
}
