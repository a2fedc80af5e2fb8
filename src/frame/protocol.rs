//! Protocol constants shared with the aggregation server.
//!
//! Both ends of the connection must agree on every value in this module. A
//! change here is a protocol change and must bump [`PROTOCOL_VERSION`].

/// Revision of the framing rules described by this module.
pub const PROTOCOL_VERSION: u8 = 1;

/// Width of the length header in bytes.
///
/// The header is an ASCII decimal numeral, left padded with `0`.
pub const HEADER_WIDTH: usize = 8;

/// Largest payload length that fits in [`HEADER_WIDTH`] decimal digits.
pub const MAX_HEADER_VALUE: usize = 99_999_999;

/// Default size limit of a whole message on the wire, header included.
pub const MAX_MESSAGE_BYTES: usize = 8 * 1024;

/// Smallest message size limit accepted by the codec.
///
/// Limits below this are raised to it so that every control message fits.
pub const MIN_MESSAGE_BYTES: usize = 64;

/// Clamp a message size limit to the range the protocol can express.
///
/// # Examples
///
/// ```
/// use betwire::frame::protocol::{MAX_MESSAGE_BYTES, MIN_MESSAGE_BYTES, clamp_message_bytes};
///
/// assert_eq!(clamp_message_bytes(1), MIN_MESSAGE_BYTES);
/// assert_eq!(clamp_message_bytes(MAX_MESSAGE_BYTES), MAX_MESSAGE_BYTES);
/// ```
#[must_use]
pub const fn clamp_message_bytes(max_message_bytes: usize) -> usize {
    let upper = MAX_HEADER_VALUE + HEADER_WIDTH;
    if max_message_bytes < MIN_MESSAGE_BYTES {
        MIN_MESSAGE_BYTES
    } else if max_message_bytes > upper {
        upper
    } else {
        max_message_bytes
    }
}

/// Payload bytes available in a message of `max_message_bytes`.
///
/// # Examples
///
/// ```
/// use betwire::frame::protocol::{HEADER_WIDTH, payload_budget};
///
/// assert_eq!(payload_budget(8192), 8192 - HEADER_WIDTH);
/// ```
#[must_use]
pub const fn payload_budget(max_message_bytes: usize) -> usize {
    max_message_bytes.saturating_sub(HEADER_WIDTH)
}
