//! Agency client binary.
//!
//! Reads the agency's bets from a CSV file, submits them to the aggregation
//! server and logs the agency's winners.

mod cli;

use std::{process::ExitCode, time::Duration};

use betwire::{
    BetClient,
    ClientConfig,
    CsvBetSource,
    RunOutcome,
    shutdown::spawn_signal_watcher,
};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn client_config(cli: &cli::Cli) -> ClientConfig {
    let mut config = ClientConfig::new(cli.id.clone(), cli.server_address.clone());
    if let Some(amount) = cli.batch_max_amount {
        config = config.batch_max_amount(amount);
    }
    if let Some(bytes) = cli.max_message_bytes {
        config = config.max_message_bytes(bytes);
    }

    let mut retry = *config.retry_policy_value();
    if let Some(attempts) = cli.send_attempts {
        retry.max_attempts = attempts;
    }
    if let Some(ms) = cli.attempt_timeout_ms {
        retry.attempt_timeout = Duration::from_millis(ms);
    }

    let mut poll = *config.poll_policy_value();
    if let Some(polls) = cli.max_polls {
        poll.max_polls = polls;
    }
    if let Some(ms) = cli.poll_interval_ms {
        poll.interval = Duration::from_millis(ms);
    }
    if let Some(ms) = cli.poll_timeout_ms {
        poll.read_timeout = Duration::from_millis(ms);
    }

    config.retry_policy(retry).poll_policy(poll)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = client_config(&cli);
    let source = match CsvBetSource::open(cli.id.clone(), &cli.data_file) {
        Ok(source) => source,
        Err(err) => {
            error!(action = "open_bets", result = "fail", client_id = %cli.id, error = %err);
            return ExitCode::FAILURE;
        }
    };

    let shutdown = CancellationToken::new();
    let watcher = spawn_signal_watcher(shutdown.clone());
    let mut client = BetClient::new(config, shutdown.clone());
    let result = client.run(source).await;
    shutdown.cancel();
    let _ = watcher.await;

    match result {
        Ok(summary) => match summary.outcome {
            RunOutcome::Winners(_) | RunOutcome::Cancelled => ExitCode::SUCCESS,
            RunOutcome::PollBudgetExhausted => ExitCode::FAILURE,
        },
        Err(err) => {
            error!(action = "run", result = "fail", client_id = %cli.id, error = %err);
            ExitCode::FAILURE
        }
    }
}
