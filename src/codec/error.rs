//! Errors raised while interpreting payload text.

use thiserror::Error;

/// A payload that frames correctly but does not hold valid domain data.
///
/// Decode errors are confined to the record or response being decoded; they
/// never affect the connection they arrived on.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A required field was absent.
    #[error("missing field `{field}`")]
    MissingField {
        /// Wire name of the field.
        field: &'static str,
    },

    /// A field was present but its value did not parse.
    #[error("invalid value for `{field}`: {value:?}")]
    InvalidField {
        /// Wire name of the field.
        field: &'static str,
        /// Raw value as received.
        value: String,
    },

    /// A text field holds a character the bet encoding uses as a separator.
    #[error("value for `{field}` contains a reserved character: {value:?}")]
    ReservedCharacter {
        /// Wire name of the field.
        field: &'static str,
        /// Raw value as received.
        value: String,
    },

    /// A record has the wrong number of columns.
    #[error("expected {expected} columns, found {found}")]
    ColumnCount {
        /// Columns a record must have.
        expected: usize,
        /// Columns present.
        found: usize,
    },

    /// An entry of a winner list is not a document number.
    #[error("invalid winner entry: {token:?}")]
    InvalidWinner {
        /// The offending entry after trimming.
        token: String,
    },

    /// The payload bytes are not UTF-8 text.
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,
}
