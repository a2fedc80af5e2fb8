//! The client state machine.
//!
//! A run submits every batch from the bet source, signals the end of
//! submission, then polls for the agency's winners. Each exchange uses a fresh
//! [`Session`]. All retry, backoff and polling decisions are made here; the
//! session and codec layers only report errors.

use std::{fmt, future::Future, net::SocketAddr, time::Duration};

use bytes::Bytes;
use tokio::{net::lookup_host, select, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{ClientConfig, ClientError, PollPolicy, Session};
use crate::{
    batch::BatchBuilder,
    message::{PollResponse, Request, is_ack},
    source::BetSource,
};

/// Lifecycle phase of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Sending batches.
    Submitting,
    /// Polling for results.
    AwaitingResults,
    /// Finished, successfully or not.
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Submitting => "submitting",
            Self::AwaitingResults => "awaiting_results",
            Self::Done => "done",
        })
    }
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The draw completed; these are the agency's winning documents.
    Winners(Vec<u64>),
    /// Every poll was spent without a result. The outcome is unknown.
    PollBudgetExhausted,
    /// Shutdown was requested before the run finished.
    Cancelled,
}

/// Counters and outcome of a finished run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Batches acknowledged by the server.
    pub batches_sent: usize,
    /// Batches abandoned after exhausting their retries.
    pub batches_failed: usize,
    /// Bets in acknowledged batches.
    pub bets_sent: usize,
    /// Bets too large for any message.
    pub bets_dropped: usize,
    /// Whether the end-of-submission signal was delivered.
    pub batch_end_sent: bool,
    /// Results requests attempted.
    pub polls: u32,
    /// How the run ended.
    pub outcome: RunOutcome,
}

#[derive(Debug, Default)]
struct Progress {
    batches_sent: usize,
    batches_failed: usize,
    bets_sent: usize,
    bets_dropped: usize,
    batch_end_sent: bool,
    polls: u32,
}

impl Progress {
    fn finish(self, outcome: RunOutcome) -> RunSummary {
        RunSummary {
            batches_sent: self.batches_sent,
            batches_failed: self.batches_failed,
            bets_sent: self.bets_sent,
            bets_dropped: self.bets_dropped,
            batch_end_sent: self.batch_end_sent,
            polls: self.polls,
            outcome,
        }
    }
}

/// Drives one agency's submission and results collection.
///
/// # Examples
///
/// ```no_run
/// use betwire::{
///     client::{BetClient, ClientConfig, RunOutcome},
///     source::CsvBetSource,
/// };
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::new("1", "server:12345");
/// let source = CsvBetSource::open("1", "agency-1.csv")?;
/// let mut client = BetClient::new(config, CancellationToken::new());
/// let summary = client.run(source).await?;
/// if let RunOutcome::Winners(winners) = summary.outcome {
///     println!("{} winners", winners.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BetClient {
    config: ClientConfig,
    shutdown: CancellationToken,
    phase: Phase,
}

impl BetClient {
    /// Create a client that stops when `shutdown` is cancelled.
    #[must_use]
    pub fn new(config: ClientConfig, shutdown: CancellationToken) -> Self {
        Self {
            config,
            shutdown,
            phase: Phase::Submitting,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase { self.phase }

    /// The run configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig { &self.config }

    /// Submit every bet from `source` and collect the results.
    ///
    /// Failed batches and an exhausted poll budget are reported in the
    /// returned [`RunSummary`], not as errors. Shutdown ends the run with
    /// [`RunOutcome::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] for an invalid configuration,
    /// [`ClientError::Resolve`] if the server address cannot be resolved and
    /// [`ClientError::Source`] if the bet source fails.
    pub async fn run<S: BetSource>(&mut self, source: S) -> Result<RunSummary, ClientError> {
        self.config.validate()?;
        let mut progress = Progress::default();

        let result = match self.resolve().await {
            Ok(addr) => self.drive(addr, source, &mut progress).await,
            Err(err) => Err(err),
        };
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(ClientError::Cancelled) => {
                info!(
                    action = "shutdown",
                    result = "success",
                    client_id = self.config.client_id(),
                    phase = %self.phase,
                );
                RunOutcome::Cancelled
            }
            Err(err) => {
                self.phase = Phase::Done;
                return Err(err);
            }
        };
        self.enter(Phase::Done);

        let summary = progress.finish(outcome);
        info!(
            action = "run",
            result = "complete",
            client_id = self.config.client_id(),
            batches_sent = summary.batches_sent,
            batches_failed = summary.batches_failed,
            bets_sent = summary.bets_sent,
            bets_dropped = summary.bets_dropped,
            polls = summary.polls,
            outcome = ?summary.outcome,
        );
        Ok(summary)
    }

    async fn resolve(&self) -> Result<SocketAddr, ClientError> {
        let address = self.config.server_address();
        let lookup = select! {
            biased;
            () = self.shutdown.cancelled() => return Err(ClientError::Cancelled),
            lookup = lookup_host(address) => lookup,
        };
        let resolved = lookup
            .map_err(|source| ClientError::Resolve {
                address: address.to_owned(),
                source: Some(source),
            })?
            .next();
        resolved.ok_or_else(|| ClientError::Resolve {
            address: address.to_owned(),
            source: None,
        })
    }

    async fn drive<S: BetSource>(
        &mut self,
        addr: SocketAddr,
        source: S,
        progress: &mut Progress,
    ) -> Result<RunOutcome, ClientError> {
        self.enter(Phase::Submitting);
        let mut batches = BatchBuilder::new(source, self.config.max_message_bytes_value());
        self.submit_batches(addr, &mut batches, progress).await?;

        self.enter(Phase::AwaitingResults);
        progress.batch_end_sent = self.send_batch_end(addr).await?;
        self.poll_winners(addr, progress).await
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "phase transition");
            self.phase = phase;
        }
    }

    async fn submit_batches<S: BetSource>(
        &self,
        addr: SocketAddr,
        batches: &mut BatchBuilder<S>,
        progress: &mut Progress,
    ) -> Result<(), ClientError> {
        loop {
            self.ensure_running()?;
            let batch = batches.next_batch(self.config.batch_max_amount_value())?;
            progress.bets_dropped = batches.dropped();
            if batch.is_empty() {
                return Ok(());
            }

            let payload = Request::Bets(batch.payload().to_owned()).to_payload();
            let sent = self
                .retry("send_batch", || self.exchange_ack(addr, payload.clone()))
                .await;
            match sent {
                Ok(attempts) => {
                    progress.batches_sent += 1;
                    progress.bets_sent += batch.len();
                    info!(
                        action = "apuesta_enviada",
                        result = "success",
                        client_id = self.config.client_id(),
                        cantidad = batch.len(),
                        bytes = batch.wire_size(),
                        attempts,
                    );
                }
                Err(err) if err.is_cancelled() => return Err(err),
                Err(err) => {
                    progress.batches_failed += 1;
                    error!(
                        action = "apuesta_enviada",
                        result = "fail",
                        client_id = self.config.client_id(),
                        cantidad = batch.len(),
                        error = %err,
                    );
                }
            }
        }
    }

    async fn send_batch_end(&self, addr: SocketAddr) -> Result<bool, ClientError> {
        let payload = Request::BatchEnd {
            client_id: self.config.client_id().to_owned(),
        }
        .to_payload();
        match self
            .retry("batch_end", || self.send_only(addr, payload.clone()))
            .await
        {
            Ok(_) => {
                info!(
                    action = "batch_end",
                    result = "success",
                    client_id = self.config.client_id(),
                );
                Ok(true)
            }
            Err(err) if err.is_cancelled() => Err(err),
            Err(err) => {
                error!(
                    action = "batch_end",
                    result = "fail",
                    client_id = self.config.client_id(),
                    error = %err,
                );
                Ok(false)
            }
        }
    }

    async fn poll_winners(
        &self,
        addr: SocketAddr,
        progress: &mut Progress,
    ) -> Result<RunOutcome, ClientError> {
        let policy = *self.config.poll_policy_value();
        let payload = Request::GetWinners {
            client_id: self.config.client_id().to_owned(),
        }
        .to_payload();

        while progress.polls < policy.max_polls {
            self.ensure_running()?;
            progress.polls += 1;

            let reply = match self.poll_once(addr, payload.clone(), policy.read_timeout).await {
                Ok(reply) => reply,
                Err(err) if err.is_cancelled() => return Err(err),
                Err(err) => {
                    warn!(
                        action = "consulta_ganadores",
                        result = "fail",
                        client_id = self.config.client_id(),
                        poll = progress.polls,
                        error = %err,
                    );
                    self.wait_for_next_poll(progress.polls, &policy).await?;
                    continue;
                }
            };

            match reply {
                PollResponse::Ready(winners) => {
                    info!(
                        action = "consulta_ganadores",
                        result = "success",
                        client_id = self.config.client_id(),
                        cant_ganadores = winners.len(),
                    );
                    return Ok(RunOutcome::Winners(winners));
                }
                PollResponse::NotReady => {
                    debug!(
                        action = "consulta_ganadores",
                        result = "in_progress",
                        poll = progress.polls,
                    );
                }
                PollResponse::Malformed(reason) => {
                    warn!(
                        action = "consulta_ganadores",
                        result = "fail",
                        client_id = self.config.client_id(),
                        poll = progress.polls,
                        reason = %reason,
                    );
                }
            }
            self.wait_for_next_poll(progress.polls, &policy).await?;
        }

        warn!(
            action = "consulta_ganadores",
            result = "fail",
            client_id = self.config.client_id(),
            polls = progress.polls,
            "poll budget exhausted without results",
        );
        Ok(RunOutcome::PollBudgetExhausted)
    }

    async fn wait_for_next_poll(
        &self,
        polls: u32,
        policy: &PollPolicy,
    ) -> Result<(), ClientError> {
        if polls < policy.max_polls {
            self.pause(policy.interval).await?;
        }
        Ok(())
    }

    /// Run `attempt` until it succeeds or the retry policy is spent.
    ///
    /// Returns the number of attempts used. Each attempt is bounded by the
    /// policy's attempt timeout; cancellation and non-transient errors end the
    /// loop immediately.
    async fn retry<F, Fut>(&self, action: &'static str, mut attempt: F) -> Result<u32, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), ClientError>>,
    {
        let policy = *self.config.retry_policy_value();
        let mut failures = 0;
        loop {
            self.ensure_running()?;
            let result = tokio::time::timeout(policy.attempt_timeout, attempt())
                .await
                .unwrap_or(Err(ClientError::Timeout {
                    operation: action,
                    elapsed: policy.attempt_timeout,
                }));
            let err = match result {
                Ok(()) => return Ok(failures + 1),
                Err(err) if err.is_cancelled() || !err.is_transient() => return Err(err),
                Err(err) => err,
            };

            failures += 1;
            warn!(
                action,
                result = "retry",
                client_id = self.config.client_id(),
                attempt = failures,
                max_attempts = policy.max_attempts,
                error = %err,
            );
            if failures >= policy.max_attempts {
                return Err(err);
            }
            self.pause(policy.backoff.delay_after(failures)).await?;
        }
    }

    async fn exchange_ack(&self, addr: SocketAddr, payload: Bytes) -> Result<(), ClientError> {
        let mut session = Session::connect(addr, &self.config, &self.shutdown).await?;
        let reply = session.request(payload, None).await;
        session.close().await;
        let reply = reply?;
        if is_ack(&reply) {
            Ok(())
        } else {
            Err(ClientError::UnexpectedResponse(
                String::from_utf8_lossy(&reply).into_owned(),
            ))
        }
    }

    async fn send_only(&self, addr: SocketAddr, payload: Bytes) -> Result<(), ClientError> {
        let mut session = Session::connect(addr, &self.config, &self.shutdown).await?;
        let sent = session.send(payload).await;
        session.close().await;
        sent
    }

    async fn poll_once(
        &self,
        addr: SocketAddr,
        payload: Bytes,
        read_timeout: Duration,
    ) -> Result<PollResponse, ClientError> {
        let exchange = async {
            let mut session = Session::connect(addr, &self.config, &self.shutdown).await?;
            let reply = session.request(payload, Some(read_timeout)).await;
            session.close().await;
            reply
        };
        let reply = tokio::time::timeout(read_timeout, exchange)
            .await
            .unwrap_or(Err(ClientError::Timeout {
                operation: "poll",
                elapsed: read_timeout,
            }))?;
        Ok(PollResponse::decode(&reply))
    }

    async fn pause(&self, delay: Duration) -> Result<(), ClientError> {
        select! {
            biased;
            () = self.shutdown.cancelled() => Err(ClientError::Cancelled),
            () = sleep(delay) => Ok(()),
        }
    }

    fn ensure_running(&self) -> Result<(), ClientError> {
        if self.shutdown.is_cancelled() {
            Err(ClientError::Cancelled)
        } else {
            Ok(())
        }
    }
}
