//! Unit tests for bet and winner list encoding.

use chrono::NaiveDate;
use rstest::{fixture, rstest};

use super::*;
use crate::bet::Bet;

#[fixture]
fn bet() -> Bet {
    let birthdate = NaiveDate::from_ymd_opt(1999, 3, 17).expect("valid date");
    Bet::new("1", 30_904_465, 2201, "Santiago Lionel", "Lorca", birthdate)
}

#[rstest]
fn encoded_bet_is_one_terminated_line(bet: Bet) {
    let encoded = encode_bet(&bet);
    assert!(encoded.ends_with('\n'));
    assert_eq!(encoded.matches('\n').count(), 1);
    assert_eq!(encoded.matches(FIELD_DELIMITER).count(), 5);
    assert!(encoded.contains("birthdate:1999-03-17"));
}

#[rstest]
fn bet_fields_survive_encoding(bet: Bet) {
    let decoded = decode_bet(&encode_bet(&bet)).expect("decode bet");
    assert_eq!(decoded, bet);
}

#[rstest]
fn batch_joins_bets_with_delimiter(bet: Bet) {
    let other = Bet::new("1", 7, 1, "Ana", "Paz", bet.birthdate());
    let payload = encode_batch(&[bet.clone(), other.clone()]);

    assert_eq!(payload, format!("{}{BATCH_DELIMITER}{}", encode_bet(&bet), encode_bet(&other)));
    assert_eq!(decode_bet_batch(&payload).expect("decode batch"), vec![bet, other]);
}

#[rstest]
#[case::single(1)]
#[case::several(4)]
fn encoded_lengths_match_rendered_text(bet: Bet, #[case] count: usize) {
    let accented = Bet::new("12", 8, 40_000, "José María", "Núñez", bet.birthdate());
    let bets: Vec<Bet> = [bet, accented].into_iter().cycle().take(count).collect();

    assert_eq!(encoded_bet_len(&bets[0]), encode_bet(&bets[0]).len());
    assert_eq!(encoded_batch_len(&bets), encode_batch(&bets).len());
}

#[test]
fn empty_batch_encodes_to_empty_payload() {
    assert_eq!(encode_batch(&[]), "");
    assert!(decode_bet_batch("").expect("decode empty").is_empty());
}

#[rstest]
fn batch_prefix_is_accepted(bet: Bet) {
    let payload = format!("{BATCH_PREFIX}{}", encode_batch(std::slice::from_ref(&bet)));
    assert_eq!(decode_bet_batch(&payload).expect("decode batch"), vec![bet]);
}

#[test]
fn decode_ignores_unknown_keys_and_order() {
    let line = "birthdate:2000-01-02|extra:1|last_name:Paz|first_name:Ana|number:9|dni:12|agency:3";
    let bet = decode_bet(line).expect("decode bet");
    assert_eq!(bet.agency(), "3");
    assert_eq!(bet.document(), 12);
    assert_eq!(bet.number(), 9);
    assert_eq!(bet.birthdate(), NaiveDate::from_ymd_opt(2000, 1, 2).expect("valid date"));
}

#[rstest]
#[case::missing_document(
    "agency:1|number:9|first_name:A|last_name:B|birthdate:2000-01-02",
    DecodeError::MissingField { field: "dni" }
)]
#[case::bad_number(
    "agency:1|dni:4|number:nine|first_name:A|last_name:B|birthdate:2000-01-02",
    DecodeError::InvalidField { field: "number", value: "nine".to_owned() }
)]
#[case::bad_date(
    "agency:1|dni:4|number:9|first_name:A|last_name:B|birthdate:02/01/2000",
    DecodeError::InvalidField { field: "birthdate", value: "02/01/2000".to_owned() }
)]
fn decode_bet_reports_bad_fields(#[case] line: &str, #[case] expected: DecodeError) {
    assert_eq!(decode_bet(line).expect_err("line must be rejected"), expected);
}

#[rstest]
#[case::empty("", vec![])]
#[case::whitespace("  \n", vec![])]
#[case::single("5", vec![5])]
#[case::several("5;12;30904465", vec![5, 12, 30_904_465])]
#[case::padded(" 7 ;  13 ", vec![7, 13])]
fn winners_decode(#[case] payload: &str, #[case] expected: Vec<u64>) {
    assert_eq!(decode_winners(payload).expect("decode winners"), expected);
}

#[test]
fn winners_decode_with_custom_delimiter() {
    assert_eq!(decode_winners_with("7,  13 ", ',').expect("decode winners"), vec![7, 13]);
}

#[rstest]
#[case::letters("5;abc;7", "abc")]
#[case::negative("-5", "-5")]
#[case::trailing_delimiter("5;", "")]
#[case::wrong_delimiter("5,7", "5,7")]
fn malformed_winner_fails_whole_decode(#[case] payload: &str, #[case] token: &str) {
    assert_eq!(
        decode_winners(payload).expect_err("malformed entry"),
        DecodeError::InvalidWinner {
            token: token.to_owned()
        }
    );
}

#[test]
fn winners_encode_matches_server_format() {
    assert_eq!(encode_winners(&[]), "");
    assert_eq!(encode_winners(&[5, 12]), "5;12");
    assert_eq!(decode_winners(&encode_winners(&[1, 2, 3])).expect("decode"), vec![1, 2, 3]);
}
