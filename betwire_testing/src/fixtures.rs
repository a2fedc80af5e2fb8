//! Bet fixtures shared by integration tests.

use betwire::Bet;
use chrono::NaiveDate;
use rstest::fixture;

/// A small, valid bet for agency `1` identified by `document`.
#[must_use]
pub fn bet(document: u64) -> Bet {
    let birthdate = NaiveDate::from_ymd_opt(1990, 5, 17).expect("valid date");
    Bet::new("1", document, 7574, "Santiago", "Lorca", birthdate)
}

/// `count` bets with documents `1..=count`.
#[must_use]
pub fn bets(count: u64) -> Vec<Bet> { (1..=count).map(bet).collect() }

/// A bet whose encoding cannot fit a message of `max_message_bytes`.
#[must_use]
pub fn oversized_bet(document: u64, max_message_bytes: usize) -> Bet {
    let birthdate = NaiveDate::from_ymd_opt(1990, 5, 17).expect("valid date");
    Bet::new(
        "1",
        document,
        1,
        "x".repeat(max_message_bytes),
        "Lorca",
        birthdate,
    )
}

/// Three small bets, documents `1..=3`.
#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn three_bets() -> Vec<Bet> { bets(3) }
