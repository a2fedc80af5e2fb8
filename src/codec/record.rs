//! Bet record encoding.

use std::fmt::{self, Write as _};

use chrono::NaiveDate;

use super::DecodeError;
use crate::bet::Bet;

/// Separator between the `key:value` pairs of one bet.
pub const FIELD_DELIMITER: char = '|';
/// Separator between a key and its value.
pub const KEY_VALUE_SEPARATOR: char = ':';
/// Separator between bets in a batch.
pub const BATCH_DELIMITER: char = ';';
/// Legacy marker some senders put in front of a batch.
pub const BATCH_PREFIX: &str = "BET_BATCH;";
/// Wire format of the birth date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const AGENCY: &str = "agency";
const DOCUMENT: &str = "dni";
const NUMBER: &str = "number";
const FIRST_NAME: &str = "first_name";
const LAST_NAME: &str = "last_name";
const BIRTHDATE: &str = "birthdate";

/// Encode a single bet, newline terminated.
///
/// # Examples
///
/// ```
/// use betwire::{Bet, codec::encode_bet};
/// use chrono::NaiveDate;
///
/// let birthdate = NaiveDate::from_ymd_opt(1999, 3, 17).expect("valid date");
/// let bet = Bet::new("1", 30_904_465, 2201, "Santiago", "Lorca", birthdate);
/// assert_eq!(
///     encode_bet(&bet),
///     "agency:1|dni:30904465|number:2201|first_name:Santiago|last_name:Lorca|birthdate:1999-03-17\n"
/// );
/// ```
#[must_use]
pub fn encode_bet(bet: &Bet) -> String {
    let mut out = String::with_capacity(96);
    // Writing into a String cannot fail.
    let _ = write_bet(&mut out, bet);
    out
}

fn write_bet(out: &mut impl fmt::Write, bet: &Bet) -> fmt::Result {
    writeln!(
        out,
        "{AGENCY}:{}|{DOCUMENT}:{}|{NUMBER}:{}|{FIRST_NAME}:{}|{LAST_NAME}:{}|{BIRTHDATE}:{}",
        bet.agency(),
        bet.document(),
        bet.number(),
        bet.first_name(),
        bet.last_name(),
        bet.birthdate().format(DATE_FORMAT),
    )
}

/// `fmt::Write` sink that only counts bytes.
#[derive(Default)]
struct ByteCounter(usize);

impl fmt::Write for ByteCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

/// Length in bytes of [`encode_bet`] for `bet`, computed without building
/// the string.
#[must_use]
pub fn encoded_bet_len(bet: &Bet) -> usize {
    let mut counter = ByteCounter::default();
    // The counter never reports an error.
    let _ = write_bet(&mut counter, bet);
    counter.0
}

/// Length in bytes of [`encode_batch`] for `bets`.
///
/// # Examples
///
/// ```
/// use betwire::{Bet, codec::{encode_batch, encoded_batch_len}};
/// use chrono::NaiveDate;
///
/// let birthdate = NaiveDate::from_ymd_opt(1999, 3, 17).expect("valid date");
/// let bets = vec![
///     Bet::new("1", 1, 10, "Ana", "Paz", birthdate),
///     Bet::new("1", 2, 20, "Luz", "Rey", birthdate),
/// ];
/// assert_eq!(encoded_batch_len(&bets), encode_batch(&bets).len());
/// assert_eq!(encoded_batch_len(&[]), 0);
/// ```
#[must_use]
pub fn encoded_batch_len(bets: &[Bet]) -> usize {
    let separators = bets.len().saturating_sub(1) * BATCH_DELIMITER.len_utf8();
    bets.iter().map(encoded_bet_len).sum::<usize>() + separators
}

/// Encode a batch of bets, joined by [`BATCH_DELIMITER`].
#[must_use]
pub fn encode_batch(bets: &[Bet]) -> String {
    let mut out = String::new();
    for (index, bet) in bets.iter().enumerate() {
        if index > 0 {
            out.push(BATCH_DELIMITER);
        }
        out.push_str(&encode_bet(bet));
    }
    out
}

/// Decode a single bet produced by [`encode_bet`].
///
/// Surrounding whitespace is ignored, unknown keys are skipped, and keys may
/// appear in any order.
///
/// # Errors
///
/// Returns [`DecodeError::MissingField`] if a field is absent and
/// [`DecodeError::InvalidField`] if a numeric or date field does not parse.
pub fn decode_bet(line: &str) -> Result<Bet, DecodeError> {
    let mut fields = RawFields::default();
    for part in line.trim().split(FIELD_DELIMITER) {
        let Some((key, value)) = part.split_once(KEY_VALUE_SEPARATOR) else {
            continue;
        };
        let slot = match key {
            AGENCY => &mut fields.agency,
            DOCUMENT => &mut fields.document,
            NUMBER => &mut fields.number,
            FIRST_NAME => &mut fields.first_name,
            LAST_NAME => &mut fields.last_name,
            BIRTHDATE => &mut fields.birthdate,
            _ => continue,
        };
        *slot = Some(value);
    }
    fields.into_bet()
}

/// Decode every bet in a batch payload.
///
/// An optional [`BATCH_PREFIX`] is accepted and empty entries are skipped.
///
/// # Errors
///
/// Returns the first [`DecodeError`] raised by [`decode_bet`].
pub fn decode_bet_batch(payload: &str) -> Result<Vec<Bet>, DecodeError> {
    let payload = payload.strip_prefix(BATCH_PREFIX).unwrap_or(payload);
    payload
        .split(BATCH_DELIMITER)
        .filter(|entry| !entry.trim().is_empty())
        .map(decode_bet)
        .collect()
}

#[derive(Default)]
struct RawFields<'a> {
    agency: Option<&'a str>,
    document: Option<&'a str>,
    number: Option<&'a str>,
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
    birthdate: Option<&'a str>,
}

impl RawFields<'_> {
    fn into_bet(self) -> Result<Bet, DecodeError> {
        let agency = require(AGENCY, self.agency)?;
        let document = require(DOCUMENT, self.document)?;
        let number = require(NUMBER, self.number)?;
        let first_name = require(FIRST_NAME, self.first_name)?;
        let last_name = require(LAST_NAME, self.last_name)?;
        let birthdate = require(BIRTHDATE, self.birthdate)?;

        Ok(Bet::new(
            agency,
            parse_field(DOCUMENT, document)?,
            parse_field(NUMBER, number)?,
            first_name,
            last_name,
            parse_date(BIRTHDATE, birthdate)?,
        ))
    }
}

fn require<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, DecodeError> {
    value.ok_or(DecodeError::MissingField { field })
}

/// Characters a text field cannot carry, since the bet encoding has no
/// escaping.
pub const RESERVED_CHARACTERS: [char; 5] = [
    FIELD_DELIMITER,
    KEY_VALUE_SEPARATOR,
    BATCH_DELIMITER,
    '\n',
    '\r',
];

/// Accept `value` for a free-text field only if it encodes unambiguously.
pub(crate) fn text_field<'a>(field: &'static str, value: &'a str) -> Result<&'a str, DecodeError> {
    if value.contains(RESERVED_CHARACTERS) {
        return Err(DecodeError::ReservedCharacter {
            field,
            value: value.to_owned(),
        });
    }
    Ok(value)
}

pub(crate) fn parse_field<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
) -> Result<T, DecodeError> {
    value.trim().parse().map_err(|_| DecodeError::InvalidField {
        field,
        value: value.to_owned(),
    })
}

pub(crate) fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, DecodeError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| DecodeError::InvalidField {
        field,
        value: value.to_owned(),
    })
}
