//! Command line interface for the `betwire` binary.
//!
//! Every option can also be supplied through a `CLI_*` environment variable,
//! which is how agency containers are configured.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments for the `betwire` binary.
#[derive(Debug, Parser)]
#[command(
    name = "betwire",
    version,
    about = "Submit an agency's bets to the aggregation server and report its winners"
)]
pub struct Cli {
    /// Agency identifier.
    #[arg(long, env = "CLI_ID")]
    pub id: String,

    /// Aggregation server address as `host:port`.
    #[arg(long, env = "CLI_SERVER_ADDRESS", default_value = "server:12345")]
    pub server_address: String,

    /// CSV file holding the agency's bets.
    #[arg(long, env = "CLI_DATA_FILE", default_value = "/data/agency.csv")]
    pub data_file: PathBuf,

    /// Maximum number of bets per batch.
    #[arg(long, env = "CLI_BATCH_MAX_AMOUNT")]
    pub batch_max_amount: Option<usize>,

    /// Maximum message size in bytes, header included.
    #[arg(long, env = "CLI_MAX_MESSAGE_BYTES")]
    pub max_message_bytes: Option<usize>,

    /// Attempts per batch before giving up on it.
    #[arg(long, env = "CLI_SEND_ATTEMPTS")]
    pub send_attempts: Option<u32>,

    /// Deadline for one batch attempt, in milliseconds.
    #[arg(long, env = "CLI_ATTEMPT_TIMEOUT_MS")]
    pub attempt_timeout_ms: Option<u64>,

    /// Results requests sent before giving up.
    #[arg(long, env = "CLI_MAX_POLLS")]
    pub max_polls: Option<u32>,

    /// Wait between results requests, in milliseconds.
    #[arg(long, env = "CLI_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Deadline for one results request, in milliseconds.
    #[arg(long, env = "CLI_POLL_TIMEOUT_MS")]
    pub poll_timeout_ms: Option<u64>,

    /// Log filter, for example `info` or `betwire=debug`.
    #[arg(long, env = "CLI_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;

    use super::Cli;

    #[test]
    fn parses_required_and_tuning_options() {
        let cli = Cli::parse_from([
            "betwire",
            "--id",
            "3",
            "--server-address",
            "127.0.0.1:9000",
            "--data-file",
            "agency-3.csv",
            "--batch-max-amount",
            "25",
            "--max-polls",
            "4",
        ]);
        assert_eq!(cli.id, "3");
        assert_eq!(cli.server_address, "127.0.0.1:9000");
        assert_eq!(cli.data_file, Path::new("agency-3.csv"));
        assert_eq!(cli.batch_max_amount, Some(25));
        assert_eq!(cli.max_polls, Some(4));
        assert_eq!(cli.poll_interval_ms, None);
    }

    #[test]
    fn rejects_non_numeric_limits() {
        let result = Cli::try_parse_from(["betwire", "--id", "1", "--max-polls", "many"]);
        assert!(result.is_err());
    }
}
