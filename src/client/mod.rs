//! Client runtime for submitting bets and collecting draw results.
//!
//! [`BetClient`] drives a run through its phases. [`Session`] wraps one framed
//! TCP connection, and [`ClientConfig`] carries the limits and policies that
//! govern both.

mod backoff;
mod config;
mod error;
mod runner;
mod session;
mod socket_options;
mod tracing_config;
mod tracing_helpers;

pub use backoff::BackoffConfig;
pub use config::{ClientConfig, PollPolicy, RetryPolicy};
pub use error::ClientError;
pub use runner::{BetClient, Phase, RunOutcome, RunSummary};
pub use session::Session;
pub use socket_options::SocketOptions;
pub use tracing_config::TracingConfig;
