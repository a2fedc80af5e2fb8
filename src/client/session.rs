//! A single framed connection to the aggregation server.
//!
//! Every exchange opens its own [`Session`]. Sends and receives race the
//! shutdown token; any failure or cancellation drops the socket, so a session
//! never outlives an error.

use std::{net::SocketAddr, time::Duration};

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::{
    net::{TcpSocket, TcpStream},
    select,
    time::timeout,
};
use tokio_util::{codec::Framed, sync::CancellationToken};
use tracing::{Instrument, debug};

use super::{
    ClientConfig,
    ClientError,
    TracingConfig,
    tracing_helpers::{
        close_span,
        connect_span,
        emit_timing_event,
        receive_span,
        send_span,
        start_timer,
    },
};
use crate::frame::BetFrameCodec;

/// An open connection speaking the length-prefixed frame protocol.
#[derive(Debug)]
pub struct Session {
    framed: Option<Framed<TcpStream, BetFrameCodec>>,
    peer: SocketAddr,
    shutdown: CancellationToken,
    tracing: TracingConfig,
}

impl Session {
    /// Connect to `addr` within the configured connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connect`] if the socket cannot be created or the
    /// connection is refused, [`ClientError::Timeout`] if the deadline passes,
    /// and [`ClientError::Cancelled`] if shutdown is requested first.
    pub async fn connect(
        addr: SocketAddr,
        config: &ClientConfig,
        shutdown: &CancellationToken,
    ) -> Result<Self, ClientError> {
        let tracing = config.tracing_config_value().clone();
        let span = connect_span(&tracing, &addr.to_string());
        let timer = start_timer(tracing.connect_timing);

        async move {
            let result = open_stream(addr, config, shutdown).await;
            emit_timing_event(timer);
            let stream = result?;
            Ok(Self {
                framed: Some(Framed::new(
                    stream,
                    BetFrameCodec::new(config.max_message_bytes_value()),
                )),
                peer: addr,
                shutdown: shutdown.clone(),
                tracing,
            })
        }
        .instrument(span)
        .await
    }

    /// Address of the connected server.
    #[must_use]
    pub const fn peer(&self) -> SocketAddr { self.peer }

    /// Returns true until the session is closed or fails.
    #[must_use]
    pub const fn is_open(&self) -> bool { self.framed.is_some() }

    /// Send one frame carrying `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Cancelled`] on shutdown, [`ClientError::Closed`]
    /// if the session is no longer open, and a transport or framing error if
    /// the write fails.
    pub async fn send(&mut self, payload: Bytes) -> Result<(), ClientError> {
        let span = send_span(&self.tracing, payload.len());
        let timer = start_timer(self.tracing.send_timing);

        async {
            let framed = self.framed.as_mut().ok_or(ClientError::Closed)?;
            let result = select! {
                biased;
                () = self.shutdown.cancelled() => Err(ClientError::Cancelled),
                result = framed.send(payload) => result.map_err(ClientError::from),
            };
            emit_timing_event(timer);
            self.drop_on_error(result)
        }
        .instrument(span)
        .await
    }

    /// Receive one frame, waiting at most `read_timeout` if given.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Cancelled`] on shutdown,
    /// [`ClientError::Timeout`] if the deadline passes,
    /// [`ClientError::Disconnected`] if the peer closes the connection and a
    /// framing error if the peer sends a malformed frame.
    pub async fn receive(&mut self, read_timeout: Option<Duration>) -> Result<Bytes, ClientError> {
        let span = receive_span(&self.tracing);
        let recorder = span.clone();
        let timer = start_timer(self.tracing.receive_timing);

        async {
            let framed = self.framed.as_mut().ok_or(ClientError::Closed)?;
            let next_frame = async {
                match read_timeout {
                    Some(limit) => timeout(limit, framed.next())
                        .await
                        .map_err(|_| ClientError::Timeout {
                            operation: "receive",
                            elapsed: limit,
                        }),
                    None => Ok(framed.next().await),
                }
            };
            let result = select! {
                biased;
                () = self.shutdown.cancelled() => Err(ClientError::Cancelled),
                frame = next_frame => match frame {
                    Ok(Some(Ok(bytes))) => Ok(bytes),
                    Ok(Some(Err(err))) => Err(ClientError::from(err)),
                    Ok(None) => Err(ClientError::Disconnected),
                    Err(err) => Err(err),
                },
            };
            match &result {
                Ok(bytes) => {
                    recorder.record("frame.bytes", bytes.len());
                    recorder.record("result", "ok");
                }
                Err(_) => {
                    recorder.record("result", "err");
                }
            }
            emit_timing_event(timer);
            self.drop_on_error(result)
        }
        .instrument(span)
        .await
    }

    /// Send `payload` and wait for the reply.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::send`] or [`Self::receive`].
    pub async fn request(
        &mut self,
        payload: Bytes,
        read_timeout: Option<Duration>,
    ) -> Result<Bytes, ClientError> {
        self.send(payload).await?;
        self.receive(read_timeout).await
    }

    /// Flush and shut down the connection.
    ///
    /// Closing twice is a no-op. Dropping a session closes the socket without
    /// flushing.
    pub async fn close(&mut self) {
        let Some(mut framed) = self.framed.take() else {
            return;
        };
        let span = close_span(&self.tracing);
        let timer = start_timer(self.tracing.close_timing);

        async move {
            if let Err(err) = framed.close().await {
                debug!(error = %err, "connection shutdown failed");
            }
            emit_timing_event(timer);
        }
        .instrument(span)
        .await;
    }

    fn drop_on_error<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if result.is_err() {
            self.framed = None;
        }
        result
    }
}

async fn open_stream(
    addr: SocketAddr,
    config: &ClientConfig,
    shutdown: &CancellationToken,
) -> Result<TcpStream, ClientError> {
    let connect_error = |source| ClientError::Connect { addr, source };
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(connect_error)?;
    config
        .socket_options_value()
        .apply(&socket)
        .map_err(connect_error)?;

    let limit = config.connect_timeout_value();
    select! {
        biased;
        () = shutdown.cancelled() => Err(ClientError::Cancelled),
        result = timeout(limit, socket.connect(addr)) => match result {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(connect_error(source)),
            Err(_) => Err(ClientError::Timeout {
                operation: "connect",
                elapsed: limit,
            }),
        },
    }
}

#[cfg(test)]
mod tests;
