//! Text encoding of bets and winner lists.
//!
//! A bet is rendered as `key:value` pairs joined by `|` and terminated by a
//! newline:
//!
//! ```text
//! agency:1|dni:30904465|number:7574|first_name:Santiago|last_name:Lorca|birthdate:1990-05-17
//! ```
//!
//! A batch joins encoded bets with `;`. The winner list returned by the server
//! is a `;`-joined list of document numbers.
//!
//! Values are not escaped. Names containing any of [`RESERVED_CHARACTERS`]
//! cannot be represented; bet sources reject them before they reach a batch.
//!
//! # Winner decoding policy
//!
//! A winner entry that is not a decimal document number fails the whole
//! decode with [`DecodeError::InvalidWinner`]. Partial winner lists are never
//! returned.

pub mod error;
pub(crate) mod record;
mod winners;

pub use error::DecodeError;
pub use record::{
    BATCH_DELIMITER,
    BATCH_PREFIX,
    DATE_FORMAT,
    FIELD_DELIMITER,
    KEY_VALUE_SEPARATOR,
    RESERVED_CHARACTERS,
    decode_bet,
    decode_bet_batch,
    encode_batch,
    encode_bet,
    encoded_batch_len,
    encoded_bet_len,
};
pub use winners::{WINNER_DELIMITER, decode_winners, decode_winners_with, encode_winners};

#[cfg(test)]
mod tests;
