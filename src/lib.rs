#![doc(html_root_url = "https://docs.rs/betwire/latest")]
//! Public API for the `betwire` library.
//!
//! This crate implements an agency client for a lottery aggregation server.
//! Bets are read from an upstream source, grouped into size-bounded batches
//! and sent over a length-prefixed TCP protocol. Once every batch is
//! acknowledged the client signals the end of submission and polls until the
//! draw results are available.

pub mod batch;
pub mod bet;
pub mod client;
pub mod codec;
pub mod frame;
pub mod message;
pub mod shutdown;
pub mod source;

pub use batch::{Batch, BatchBuilder};
pub use bet::Bet;
pub use client::{BetClient, ClientConfig, ClientError, RunOutcome, RunSummary};
pub use source::{BetSource, CsvBetSource, SourceError, VecBetSource};
