//! `tokio_util` codec for decimal length-prefixed frames.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::{
    EofError,
    FrameError,
    format::{parse_header, write_header},
    protocol::{HEADER_WIDTH, MAX_HEADER_VALUE, MAX_MESSAGE_BYTES, clamp_message_bytes, payload_budget},
};

/// Frame codec used by every session.
///
/// The write limit bounds what this side sends. Incoming frames are bounded
/// separately and accept anything the header can express unless
/// [`BetFrameCodec::with_read_limit`] narrows it; server replies such as
/// winner lists are not held to the submission budget.
///
/// Wrapping a stream in [`tokio_util::codec::Framed`] with this codec gives
/// exact-length reads and complete writes: `Framed` keeps reading until a
/// whole frame is buffered and keeps writing until the buffer is flushed, so
/// short reads and short writes never reach the caller.
///
/// # Examples
///
/// ```
/// use betwire::frame::BetFrameCodec;
/// use betwire::frame::protocol::{HEADER_WIDTH, MAX_HEADER_VALUE, MAX_MESSAGE_BYTES};
///
/// let codec = BetFrameCodec::default();
/// assert_eq!(codec.max_frame_length(), MAX_MESSAGE_BYTES - HEADER_WIDTH);
/// assert_eq!(codec.max_read_length(), MAX_HEADER_VALUE);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct BetFrameCodec {
    max_frame_length: usize,
    max_read_length: usize,
}

impl BetFrameCodec {
    /// Construct a codec that sends messages of at most `max_message_bytes`,
    /// header included.
    ///
    /// The limit is clamped with [`clamp_message_bytes`]. Reads are bounded
    /// only by [`MAX_HEADER_VALUE`].
    #[must_use]
    pub const fn new(max_message_bytes: usize) -> Self {
        Self {
            max_frame_length: payload_budget(clamp_message_bytes(max_message_bytes)),
            max_read_length: MAX_HEADER_VALUE,
        }
    }

    /// Codec bounded only by what the header can express.
    #[must_use]
    pub const fn protocol_limit() -> Self {
        Self {
            max_frame_length: MAX_HEADER_VALUE,
            max_read_length: MAX_HEADER_VALUE,
        }
    }

    /// Reject incoming messages larger than `max_message_bytes`, header
    /// included.
    #[must_use]
    pub const fn with_read_limit(mut self, max_message_bytes: usize) -> Self {
        self.max_read_length = payload_budget(clamp_message_bytes(max_message_bytes));
        self
    }

    /// Largest payload this codec will encode.
    #[must_use]
    pub const fn max_frame_length(&self) -> usize { self.max_frame_length }

    /// Largest payload this codec will decode.
    #[must_use]
    pub const fn max_read_length(&self) -> usize { self.max_read_length }
}

impl Default for BetFrameCodec {
    fn default() -> Self { Self::new(MAX_MESSAGE_BYTES) }
}

impl Decoder for BetFrameCodec {
    type Item = Bytes;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(header) = src.get(..HEADER_WIDTH) else {
            src.reserve(HEADER_WIDTH - src.len());
            return Ok(None);
        };
        let len = parse_header(header)?;
        if len > self.max_read_length {
            return Err(FrameError::Oversized {
                size: len,
                max: self.max_read_length,
            });
        }

        let total = HEADER_WIDTH + len;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(HEADER_WIDTH);
        Ok(Some(src.split_to(len).freeze()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            // Clean close: nothing buffered at a frame boundary.
            None if src.is_empty() => Ok(None),
            None => Err(build_eof_error(src)),
        }
    }
}

/// Describe how far into a frame the stream ended.
fn build_eof_error(src: &BytesMut) -> FrameError {
    let bytes_received = src.len();
    let expected = src
        .get(..HEADER_WIDTH)
        .and_then(|header| parse_header(header).ok());

    match expected {
        Some(expected) => EofError::MidFrame {
            bytes_received: bytes_received.saturating_sub(HEADER_WIDTH),
            expected,
        },
        None => EofError::MidHeader {
            bytes_received,
            header_size: HEADER_WIDTH,
        },
    }
    .into()
}

impl Encoder<Bytes> for BetFrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() > self.max_frame_length {
            return Err(FrameError::Oversized {
                size: item.len(),
                max: self.max_frame_length,
            });
        }
        dst.reserve(HEADER_WIDTH + item.len());
        write_header(item.len(), dst)?;
        dst.extend_from_slice(&item);
        Ok(())
    }
}

/// Encode `payload` as a single frame.
///
/// The payload is only checked against what the header can express; wire
/// budgets are enforced by the codec a session is configured with.
///
/// # Errors
///
/// Returns [`FrameError::Oversized`] if the payload length needs more than
/// [`HEADER_WIDTH`] digits.
///
/// # Examples
///
/// ```
/// use betwire::frame::encode_frame;
///
/// let frame = encode_frame(b"ACK").expect("payload fits");
/// assert_eq!(&frame[..], b"00000003ACK");
/// ```
pub fn encode_frame(payload: &[u8]) -> Result<Bytes, FrameError> {
    let mut dst = BytesMut::with_capacity(HEADER_WIDTH + payload.len());
    BetFrameCodec::protocol_limit().encode(Bytes::copy_from_slice(payload), &mut dst)?;
    Ok(dst.freeze())
}

/// Decode one frame from the front of `src`.
///
/// Returns `Ok(None)` while `src` holds less than a complete frame; the bytes
/// stay in place so the caller can append more and try again.
///
/// # Errors
///
/// Returns [`FrameError::InvalidHeader`] if the header does not parse.
///
/// # Examples
///
/// ```
/// use betwire::frame::decode_frame;
/// use bytes::BytesMut;
///
/// let mut partial = BytesMut::from(&b"00000003AC"[..]);
/// assert!(decode_frame(&mut partial).expect("valid header").is_none());
///
/// partial.extend_from_slice(b"K");
/// let payload = decode_frame(&mut partial).expect("valid frame");
/// assert_eq!(payload.as_deref(), Some(&b"ACK"[..]));
/// ```
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<Bytes>, FrameError> {
    BetFrameCodec::protocol_limit().decode(src)
}
