//! Upstream sources of bets.
//!
//! The client reads bets sequentially and never rewinds. [`CsvBetSource`]
//! reads the agency data file; [`VecBetSource`] serves bets from memory.

use std::{
    collections::VecDeque,
    fs::File,
    io,
    path::{Path, PathBuf},
};

use csv::{Position, ReaderBuilder, StringRecord};
use thiserror::Error;
use tracing::warn;

use crate::{
    bet::Bet,
    codec::{
        DecodeError,
        record::{parse_date, parse_field, text_field},
    },
};

/// Errors raised by a bet source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The data file could not be opened.
    #[error("failed to open bet file {}: {source}", path.display())]
    Open {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Reading from the source failed.
    #[error("failed to read bets: {0}")]
    Io(#[from] io::Error),
}

/// A sequential supplier of bets.
pub trait BetSource {
    /// Return the next bet, or `None` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the underlying data cannot be read.
    fn next_bet(&mut self) -> Result<Option<Bet>, SourceError>;
}

impl<S: BetSource + ?Sized> BetSource for &mut S {
    fn next_bet(&mut self) -> Result<Option<Bet>, SourceError> { (**self).next_bet() }
}

impl<S: BetSource + ?Sized> BetSource for Box<S> {
    fn next_bet(&mut self) -> Result<Option<Bet>, SourceError> { (**self).next_bet() }
}

/// Bets served from memory in insertion order.
#[derive(Clone, Debug, Default)]
pub struct VecBetSource {
    bets: VecDeque<Bet>,
}

impl VecBetSource {
    /// Number of bets not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize { self.bets.len() }
}

impl From<Vec<Bet>> for VecBetSource {
    fn from(bets: Vec<Bet>) -> Self { Self { bets: bets.into() } }
}

impl FromIterator<Bet> for VecBetSource {
    fn from_iter<I: IntoIterator<Item = Bet>>(iter: I) -> Self {
        Self {
            bets: iter.into_iter().collect(),
        }
    }
}

impl BetSource for VecBetSource {
    fn next_bet(&mut self) -> Result<Option<Bet>, SourceError> { Ok(self.bets.pop_front()) }
}

/// Bets read from an agency CSV file.
///
/// Each record holds `first_name,last_name,document,birthdate,number` with the
/// birth date as `YYYY-MM-DD`. Fields may be quoted. Every bet is stamped with
/// the agency the source was opened for. Blank lines are ignored; records that
/// do not have exactly five columns, fail to parse, or carry a name the bet
/// encoding cannot represent are logged and skipped.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
///
/// use betwire::source::{BetSource, CsvBetSource};
///
/// let data = "\"Lorca, Santiago\",Lorca,30904465,1999-03-17,7574\n";
/// let mut source = CsvBetSource::from_reader("1", Cursor::new(data));
/// let bet = source.next_bet().expect("readable").expect("one bet");
/// assert_eq!(bet.agency(), "1");
/// assert_eq!(bet.first_name(), "Lorca, Santiago");
/// assert!(source.next_bet().expect("readable").is_none());
/// ```
#[derive(Debug)]
pub struct CsvBetSource<R = File> {
    agency: String,
    reader: csv::Reader<R>,
    record: StringRecord,
}

impl CsvBetSource {
    /// Open the agency file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Open`] if the file cannot be opened.
    pub fn open(agency: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(agency, file))
    }
}

impl<R: io::Read> CsvBetSource<R> {
    /// Read records from any reader. The reader is buffered internally.
    #[must_use]
    pub fn from_reader(agency: impl Into<String>, reader: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        Self {
            agency: agency.into(),
            reader,
            record: StringRecord::new(),
        }
    }

    fn line(&self) -> u64 { self.record.position().map_or(0, Position::line) }
}

impl<R: io::Read> BetSource for CsvBetSource<R> {
    fn next_bet(&mut self) -> Result<Option<Bet>, SourceError> {
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(false) => return Ok(None),
                Ok(true) => match parse_record(&self.agency, &self.record) {
                    Ok(bet) => return Ok(Some(bet)),
                    Err(err) => warn!(
                        action = "parse_bet",
                        result = "fail",
                        line = self.line(),
                        error = %err,
                    ),
                },
                Err(err) if err.is_io_error() => return Err(io::Error::from(err).into()),
                Err(err) => warn!(
                    action = "parse_bet",
                    result = "fail",
                    line = err.position().map_or(0, Position::line),
                    error = %err,
                ),
            }
        }
    }
}

/// Columns of an agency record.
const COLUMNS: usize = 5;

fn parse_record(agency: &str, record: &StringRecord) -> Result<Bet, DecodeError> {
    if record.len() != COLUMNS {
        return Err(DecodeError::ColumnCount {
            expected: COLUMNS,
            found: record.len(),
        });
    }
    let column = |index: usize| record.get(index).unwrap_or_default();

    Ok(Bet::new(
        agency,
        parse_field("document", column(2))?,
        parse_field("number", column(4))?,
        text_field("first_name", column(0).trim())?,
        text_field("last_name", column(1).trim())?,
        parse_date("birthdate", column(3))?,
    ))
}
