//! The bet record submitted by an agency.

use chrono::NaiveDate;

/// A single bet placed at an agency.
///
/// Bets are created by a [`crate::source::BetSource`] and never modified
/// afterwards; the batch builder and codec only read them.
///
/// # Examples
///
/// ```
/// use betwire::Bet;
/// use chrono::NaiveDate;
///
/// let birthdate = NaiveDate::from_ymd_opt(1990, 5, 17).expect("valid date");
/// let bet = Bet::new("1", 30_904_465, 7574, "Santiago", "Lorca", birthdate);
/// assert_eq!(bet.document(), 30_904_465);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bet {
    agency: String,
    document: u64,
    number: u32,
    first_name: String,
    last_name: String,
    birthdate: NaiveDate,
}

impl Bet {
    /// Create a bet.
    #[must_use]
    pub fn new(
        agency: impl Into<String>,
        document: u64,
        number: u32,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birthdate: NaiveDate,
    ) -> Self {
        Self {
            agency: agency.into(),
            document,
            number,
            first_name: first_name.into(),
            last_name: last_name.into(),
            birthdate,
        }
    }

    /// Identifier of the agency that took the bet.
    #[must_use]
    pub fn agency(&self) -> &str { &self.agency }

    /// Document number of the bettor, unique within an agency.
    #[must_use]
    pub const fn document(&self) -> u64 { self.document }

    /// The number the bettor chose.
    #[must_use]
    pub const fn number(&self) -> u32 { self.number }

    #[must_use]
    pub fn first_name(&self) -> &str { &self.first_name }

    #[must_use]
    pub fn last_name(&self) -> &str { &self.last_name }

    #[must_use]
    pub const fn birthdate(&self) -> NaiveDate { self.birthdate }
}
