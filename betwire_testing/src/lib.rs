//! Utilities for exercising the `betwire` client against a scripted
//! aggregation server during tests.
//!
//! ```rust,no_run
//! use betwire_testing::{Reply, ScriptedServer, ServerScript};
//!
//! # async fn example() -> std::io::Result<()> {
//! let server = ScriptedServer::start(ServerScript::new().poll_reply(Reply::Winners(vec![5]))).await?;
//! let _addr = server.addr();
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod logging;
pub mod server;

pub use fixtures::{bet, bets, oversized_bet, three_bets};
pub use logging::{LoggerHandle, logger};
pub use server::{Reply, ScriptedServer, ServerScript};
