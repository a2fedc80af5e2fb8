//! Error types for client operations.

use std::{io, net::SocketAddr, time::Duration};

use crate::{codec::DecodeError, frame::FrameError, source::SourceError};

/// Errors emitted by the bet client.
///
/// Lower layers report errors without retrying; the runner decides which
/// failures are retried using [`ClientError::is_transient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The server address could not be resolved.
    #[error("failed to resolve server address {address:?}")]
    Resolve {
        /// Address as configured.
        address: String,
        /// Underlying error, if the lookup itself failed.
        #[source]
        source: Option<io::Error>,
    },
    /// Establishing the connection failed.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// Peer address.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Transport error on an established connection.
    #[error("transport error: {0}")]
    Io(#[source] io::Error),
    /// The peer violated the framing protocol.
    #[error("protocol error: {0}")]
    Frame(#[source] FrameError),
    /// A payload could not be decoded.
    #[error("failed to decode payload: {0}")]
    Decode(#[from] DecodeError),
    /// An operation exceeded its deadline.
    #[error("{operation} timed out after {elapsed:?}")]
    Timeout {
        /// Operation that timed out.
        operation: &'static str,
        /// Deadline that was exceeded.
        elapsed: Duration,
    },
    /// The peer closed the connection before a response arrived.
    #[error("connection closed by peer")]
    Disconnected,
    /// The server replied with something other than the expected response.
    #[error("unexpected response: {0:?}")]
    UnexpectedResponse(String),
    /// The session was used after it was closed.
    #[error("session is closed")]
    Closed,
    /// Shutdown was requested.
    #[error("operation cancelled by shutdown")]
    Cancelled,
    /// The bet source failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self { Self::Io(err) }
}

impl From<FrameError> for ClientError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Io(err) => Self::Io(err),
            other => Self::Frame(other),
        }
    }
}

impl ClientError {
    /// Returns true if retrying the same exchange may succeed.
    ///
    /// # Examples
    ///
    /// ```
    /// use betwire::client::ClientError;
    ///
    /// assert!(ClientError::Disconnected.is_transient());
    /// assert!(!ClientError::Cancelled.is_transient());
    /// ```
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. }
                | Self::Io(_)
                | Self::Frame(_)
                | Self::Decode(_)
                | Self::Timeout { .. }
                | Self::Disconnected
                | Self::UnexpectedResponse(_)
                | Self::Closed
        )
    }

    /// Returns true if the error was caused by shutdown.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool { matches!(self, Self::Cancelled) }
}

#[cfg(test)]
mod tests {
    use std::io;

    use rstest::rstest;

    use super::*;
    use crate::frame::EofError;

    #[test]
    fn frame_io_errors_become_transport_errors() {
        let err = ClientError::from(FrameError::Io(io::Error::from(io::ErrorKind::BrokenPipe)));
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[test]
    fn frame_protocol_errors_stay_protocol_errors() {
        let eof = EofError::MidHeader {
            bytes_received: 3,
            header_size: 8,
        };
        let err = ClientError::from(FrameError::from(eof));
        assert!(matches!(err, ClientError::Frame(_)));
        assert!(err.is_transient());
    }

    #[rstest]
    #[case(ClientError::Cancelled)]
    #[case(ClientError::Config("empty id".into()))]
    #[case(ClientError::Resolve { address: "nowhere".into(), source: None })]
    fn fatal_errors_are_not_transient(#[case] err: ClientError) {
        assert!(!err.is_transient());
    }
}
