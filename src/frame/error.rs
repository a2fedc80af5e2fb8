//! Error types for the frame layer.
//!
//! Framing errors describe problems with the wire structure only: a header
//! that does not parse, a length beyond the configured limit, or a stream that
//! ends part way through a frame. Payload interpretation errors live in
//! [`crate::codec::DecodeError`].

use std::io;

use thiserror::Error;

/// Premature end of stream while a frame was being read.
///
/// A close at a frame boundary is not an error and never produces this type.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EofError {
    /// The peer closed the connection while the length header was being read.
    #[error("premature EOF during header: {bytes_received} of {header_size} header bytes")]
    MidHeader {
        /// Header bytes received before EOF.
        bytes_received: usize,
        /// Expected header size.
        header_size: usize,
    },

    /// The header arrived but the payload was cut short.
    #[error("premature EOF: {bytes_received} bytes of {expected} byte payload received")]
    MidFrame {
        /// Payload bytes received before EOF.
        bytes_received: usize,
        /// Payload length announced by the header.
        expected: usize,
    },
}

/// Errors raised while encoding or decoding frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The length header is not a zero padded decimal numeral.
    #[error("frame header is not a zero padded decimal length: {header:?}")]
    InvalidHeader {
        /// Header bytes as received, lossily decoded for display.
        header: String,
    },

    /// A payload is larger than the configured maximum.
    #[error("frame exceeds max length: {size} > {max}")]
    Oversized {
        /// Payload size that was rejected.
        size: usize,
        /// Maximum payload size allowed.
        max: usize,
    },

    /// The stream ended part way through a frame.
    #[error(transparent)]
    Eof(#[from] EofError),

    /// Underlying transport failure.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

impl FrameError {
    /// Returns true if the error was caused by the peer closing mid-frame.
    #[must_use]
    pub fn is_premature_eof(&self) -> bool { matches!(self, Self::Eof(_)) }
}
