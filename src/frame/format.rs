//! Decimal length header formatting.
//!
//! The header is [`HEADER_WIDTH`] ASCII digits holding the payload length,
//! left padded with `0`. Only digits are accepted when parsing: signs,
//! whitespace and other separators are rejected.

use bytes::{BufMut, BytesMut};

use super::{
    FrameError,
    protocol::{HEADER_WIDTH, MAX_HEADER_VALUE},
};

/// Write the length header for a payload of `len` bytes into `dst`.
///
/// # Errors
///
/// Returns [`FrameError::Oversized`] if `len` needs more than
/// [`HEADER_WIDTH`] digits.
///
/// # Examples
///
/// ```
/// use betwire::frame::write_header;
/// use bytes::BytesMut;
///
/// let mut dst = BytesMut::new();
/// write_header(42, &mut dst).expect("length fits the header");
/// assert_eq!(&dst[..], b"00000042");
/// ```
pub fn write_header(len: usize, dst: &mut BytesMut) -> Result<(), FrameError> {
    if len > MAX_HEADER_VALUE {
        return Err(FrameError::Oversized {
            size: len,
            max: MAX_HEADER_VALUE,
        });
    }
    dst.reserve(HEADER_WIDTH);
    dst.put_slice(format!("{len:0width$}", width = HEADER_WIDTH).as_bytes());
    Ok(())
}

/// Parse a length header.
///
/// # Errors
///
/// Returns [`FrameError::InvalidHeader`] if `header` is not exactly
/// [`HEADER_WIDTH`] ASCII digits.
///
/// # Examples
///
/// ```
/// use betwire::frame::parse_header;
///
/// assert_eq!(parse_header(b"00000042").expect("valid header"), 42);
/// assert!(parse_header(b"-0000042").is_err());
/// ```
pub fn parse_header(header: &[u8]) -> Result<usize, FrameError> {
    if header.len() != HEADER_WIDTH || !header.iter().all(u8::is_ascii_digit) {
        return Err(invalid_header(header));
    }
    let len = header
        .iter()
        .fold(0usize, |acc, digit| acc * 10 + usize::from(digit - b'0'));
    Ok(len)
}

fn invalid_header(header: &[u8]) -> FrameError {
    FrameError::InvalidHeader {
        header: String::from_utf8_lossy(header).into_owned(),
    }
}
