//! Winner list encoding.

use super::DecodeError;

/// Separator between document numbers in a winner list.
pub const WINNER_DELIMITER: char = ';';

/// Decode a winner list using [`WINNER_DELIMITER`].
///
/// # Errors
///
/// Returns [`DecodeError::InvalidWinner`] if any entry is not a document
/// number.
///
/// # Examples
///
/// ```
/// use betwire::codec::decode_winners;
///
/// assert_eq!(decode_winners("").expect("empty list"), Vec::<u64>::new());
/// assert_eq!(decode_winners("5; 12 ").expect("two winners"), vec![5, 12]);
/// assert!(decode_winners("5;x").is_err());
/// ```
pub fn decode_winners(payload: &str) -> Result<Vec<u64>, DecodeError> {
    decode_winners_with(payload, WINNER_DELIMITER)
}

/// Decode a winner list split on `delimiter`.
///
/// A payload that is empty or whitespace only holds no winners. Each entry is
/// trimmed before parsing.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidWinner`] for the first entry that is not a
/// document number, including empty entries between two delimiters.
pub fn decode_winners_with(payload: &str, delimiter: char) -> Result<Vec<u64>, DecodeError> {
    if payload.trim().is_empty() {
        return Ok(Vec::new());
    }
    payload
        .split(delimiter)
        .map(str::trim)
        .map(|token| {
            token.parse().map_err(|_| DecodeError::InvalidWinner {
                token: token.to_owned(),
            })
        })
        .collect()
}

/// Encode a winner list as the server sends it.
#[must_use]
pub fn encode_winners(winners: &[u64]) -> String {
    let mut out = String::new();
    for (index, document) in winners.iter().enumerate() {
        if index > 0 {
            out.push(WINNER_DELIMITER);
        }
        out.push_str(&document.to_string());
    }
    out
}
