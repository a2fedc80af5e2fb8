//! Length-prefixed framing for the bet submission protocol.
//!
//! Every message on the wire is a fixed-width decimal header followed by
//! exactly that many payload bytes:
//!
//! ```text
//! 00000003ACK
//! ^^^^^^^^ header: payload length, zero padded to HEADER_WIDTH digits
//!         ^^^ payload
//! ```
//!
//! The header width and message size limit are protocol constants defined in
//! [`protocol`]; nothing else in the crate repeats them.

pub mod codec;
pub mod error;
pub mod format;
pub mod protocol;

pub use codec::{BetFrameCodec, decode_frame, encode_frame};
pub use error::{EofError, FrameError};
pub use format::{parse_header, write_header};

#[cfg(test)]
mod tests;
