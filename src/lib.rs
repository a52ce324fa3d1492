//! Order-matching trace decoder.
//!
//! # Overview
//!
//! Reconstructs a human-readable trace of order matching on an exchange-style
//! contract from the event logs of EVM transactions.
//!
//! Every log is classified by its single topic hash with [`topic::classify`],
//! its RLP payload is decoded by one of the [`decode`] decoders, and order
//! transactions referenced by trade logs are fetched and interpreted with
//! [`resolve::OrderResolver`]. [`dispatch::LogDispatcher`] ties these together
//! for one log, and [`trace::TraceWalker`] walks a whole receipt or a block range.
//!
//! Node access goes through [`node::NodeClient`], implemented on top of any
//! alloy provider by [`node::RpcNode`].
//!
//! # Limitations/follow-ups
//!
//! * `Cancel` and `TopicTriggerAbove` logs are recognized but not narrated.
//!
//! * Order kind labels are only produced for `NEW` and `STOP_ORDER` transactions.
//!
//! * Block ranges are scanned strictly sequentially.
//!
//! # Testing
//!
//! [`testing`] module provides an in-memory node and payload builders, so the
//! whole pipeline can be exercised without a running node.

pub mod decode;
pub mod dispatch;
pub mod error;
pub mod node;
pub mod num;
pub mod resolve;
pub mod testing;
pub mod topic;
pub mod trace;
pub mod types;
