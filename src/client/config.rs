//! Client configuration.
//!
//! [`ClientConfig`] gathers everything the runner needs: agency identity,
//! server address, batching limits and the retry and polling policies. Values
//! are normalised when set and checked once by [`ClientConfig::validate`].

use std::time::Duration;

use super::{BackoffConfig, ClientError, SocketOptions, TracingConfig};
use crate::frame::protocol::{MAX_MESSAGE_BYTES, clamp_message_bytes};

const DEFAULT_BATCH_MAX_AMOUNT: usize = 100;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MIN_TIMEOUT: Duration = Duration::from_millis(1);

/// Retry policy for batch submission and the end-of-submission signal.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use betwire::client::RetryPolicy;
///
/// let policy = RetryPolicy {
///     max_attempts: 0,
///     attempt_timeout: Duration::ZERO,
///     ..RetryPolicy::default()
/// }
/// .normalized();
/// assert_eq!(policy.max_attempts, 1);
/// assert_eq!(policy.attempt_timeout, Duration::from_millis(1));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per exchange, the first one included.
    pub max_attempts: u32,
    /// Deadline for one attempt: connect, send and receive together.
    pub attempt_timeout: Duration,
    /// Delay between attempts.
    pub backoff: BackoffConfig,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(5),
            backoff: BackoffConfig::default(),
        }
    }
}

impl RetryPolicy {
    /// Ensure at least one attempt with a non-zero deadline.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.max_attempts = self.max_attempts.max(1);
        self.attempt_timeout = self.attempt_timeout.max(MIN_TIMEOUT);
        self.backoff = self.backoff.normalized();
        self
    }
}

/// Polling policy for the results phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    /// Results requests sent before giving up.
    pub max_polls: u32,
    /// Fixed wait between polls.
    pub interval: Duration,
    /// Deadline for one poll: connect, send and receive together.
    pub read_timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_polls: 10,
            interval: Duration::from_secs(1),
            read_timeout: Duration::from_secs(5),
        }
    }
}

impl PollPolicy {
    /// Ensure at least one poll with a non-zero deadline.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.max_polls = self.max_polls.max(1);
        self.read_timeout = self.read_timeout.max(MIN_TIMEOUT);
        self
    }
}

/// Configuration of one client run.
///
/// # Examples
///
/// ```
/// use betwire::client::ClientConfig;
///
/// let config = ClientConfig::new("1", "server:12345").batch_max_amount(50);
/// assert_eq!(config.batch_max_amount_value(), 50);
/// assert_eq!(config.max_message_bytes_value(), 8192);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct ClientConfig {
    client_id: String,
    server_address: String,
    batch_max_amount: usize,
    max_message_bytes: usize,
    connect_timeout: Duration,
    retry: RetryPolicy,
    poll: PollPolicy,
    socket_options: SocketOptions,
    tracing: TracingConfig,
}

impl ClientConfig {
    /// Create a configuration with default limits and policies.
    #[must_use]
    pub fn new(client_id: impl Into<String>, server_address: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            server_address: server_address.into(),
            batch_max_amount: DEFAULT_BATCH_MAX_AMOUNT,
            max_message_bytes: MAX_MESSAGE_BYTES,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            retry: RetryPolicy::default(),
            poll: PollPolicy::default(),
            socket_options: SocketOptions::default().nodelay(true),
            tracing: TracingConfig::default(),
        }
    }

    /// Set the maximum number of bets per batch.
    #[must_use]
    pub fn batch_max_amount(mut self, amount: usize) -> Self {
        self.batch_max_amount = amount;
        self
    }

    /// Set the maximum message size, header included.
    ///
    /// The value is clamped to what the frame header can express.
    ///
    /// # Examples
    ///
    /// ```
    /// use betwire::client::ClientConfig;
    ///
    /// let config = ClientConfig::new("1", "server:12345").max_message_bytes(1);
    /// assert_eq!(config.max_message_bytes_value(), 64);
    /// ```
    #[must_use]
    pub fn max_message_bytes(mut self, bytes: usize) -> Self {
        self.max_message_bytes = clamp_message_bytes(bytes);
        self
    }

    /// Set the deadline for establishing a connection.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout.max(MIN_TIMEOUT);
        self
    }

    /// Set the submission retry policy.
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy.normalized();
        self
    }

    /// Set the results polling policy.
    #[must_use]
    pub fn poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll = policy.normalized();
        self
    }

    /// Set socket options applied to every connection.
    #[must_use]
    pub fn socket_options(mut self, options: SocketOptions) -> Self {
        self.socket_options = options;
        self
    }

    /// Set span levels and timing for session operations.
    #[must_use]
    pub fn tracing_config(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }

    /// Agency identifier sent in control messages.
    #[must_use]
    pub fn client_id(&self) -> &str { &self.client_id }

    /// Server address as configured, before resolution.
    #[must_use]
    pub fn server_address(&self) -> &str { &self.server_address }

    /// Return the configured maximum number of bets per batch.
    #[must_use]
    pub const fn batch_max_amount_value(&self) -> usize { self.batch_max_amount }

    /// Return the configured maximum message size.
    #[must_use]
    pub const fn max_message_bytes_value(&self) -> usize { self.max_message_bytes }

    /// Return the configured connect deadline.
    #[must_use]
    pub const fn connect_timeout_value(&self) -> Duration { self.connect_timeout }

    /// Return the submission retry policy.
    #[must_use]
    pub const fn retry_policy_value(&self) -> &RetryPolicy { &self.retry }

    /// Return the results polling policy.
    #[must_use]
    pub const fn poll_policy_value(&self) -> &PollPolicy { &self.poll }

    /// Return the socket options.
    #[must_use]
    pub const fn socket_options_value(&self) -> &SocketOptions { &self.socket_options }

    /// Return the tracing configuration.
    #[must_use]
    pub const fn tracing_config_value(&self) -> &TracingConfig { &self.tracing }

    /// Check values that cannot be normalised.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the client id or server address is
    /// blank, or if the batch amount is zero.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.client_id.trim().is_empty() {
            return Err(ClientError::Config("client id must not be empty".into()));
        }
        if self.server_address.trim().is_empty() {
            return Err(ClientError::Config("server address must not be empty".into()));
        }
        if self.batch_max_amount == 0 {
            return Err(ClientError::Config(
                "batch max amount must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
