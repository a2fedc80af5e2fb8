//! Unit tests for the batch builder.

use chrono::NaiveDate;
use rstest::rstest;
use tracing_test::traced_test;

use super::*;
use crate::{
    codec::{encode_batch, encode_bet},
    frame::protocol::MIN_MESSAGE_BYTES,
    source::VecBetSource,
};

fn bet(document: u64, first_name: &str) -> Bet {
    let birthdate = NaiveDate::from_ymd_opt(1985, 7, 2).expect("valid date");
    Bet::new("1", document, 42, first_name, "Paz", birthdate)
}

fn bets(count: u64) -> Vec<Bet> { (1..=count).map(|document| bet(document, "Ana")).collect() }

fn documents(batch: &Batch) -> Vec<u64> { batch.bets().iter().map(Bet::document).collect() }

#[rstest]
#[case(3, 10, vec![3])]
#[case(10, 3, vec![3, 3, 3, 1])]
#[case(6, 2, vec![2, 2, 2])]
#[case(1, 1, vec![1])]
fn batches_respect_max_count(#[case] total: u64, #[case] max_count: usize, #[case] sizes: Vec<usize>) {
    let mut builder = BatchBuilder::new(VecBetSource::from(bets(total)), 8192);
    for expected in sizes {
        assert_eq!(builder.next_batch(max_count).expect("readable").len(), expected);
    }
    assert!(builder.next_batch(max_count).expect("readable").is_empty());
}

#[test]
fn payload_matches_batch_encoding() {
    let mut builder = BatchBuilder::new(VecBetSource::from(bets(4)), 8192);
    let batch = builder.next_batch(4).expect("readable");
    assert_eq!(batch.payload(), encode_batch(batch.bets()));
    assert_eq!(batch.wire_size(), HEADER_WIDTH + batch.payload().len());
}

#[test]
fn zero_max_count_still_makes_progress() {
    let mut builder = BatchBuilder::new(VecBetSource::from(bets(2)), 8192);
    assert_eq!(builder.next_batch(0).expect("readable").len(), 1);
}

#[test]
fn size_limit_carries_bet_into_next_batch() {
    let one = encode_bet(&bet(1, "Ana")).len();
    // Room for exactly two bets and their separator.
    let max_message_bytes = HEADER_WIDTH + 2 * one + 1;
    let mut builder = BatchBuilder::new(VecBetSource::from(bets(5)), max_message_bytes);

    let first = builder.next_batch(10).expect("readable");
    let second = builder.next_batch(10).expect("readable");
    let third = builder.next_batch(10).expect("readable");

    assert_eq!(documents(&first), vec![1, 2]);
    assert_eq!(documents(&second), vec![3, 4]);
    assert_eq!(documents(&third), vec![5]);
    assert!(builder.next_batch(10).expect("readable").is_empty());
    assert!(first.payload().len() <= builder.payload_budget());
}

#[test]
fn separator_counts_towards_budget() {
    let one = encode_bet(&bet(1, "Ana")).len();
    // Two bets fit only if the separator is ignored.
    let max_message_bytes = HEADER_WIDTH + 2 * one;
    let mut builder = BatchBuilder::new(VecBetSource::from(bets(2)), max_message_bytes);

    assert_eq!(builder.next_batch(10).expect("readable").len(), 1);
    assert_eq!(builder.next_batch(10).expect("readable").len(), 1);
}

#[traced_test]
#[test]
fn oversized_bet_is_dropped_and_logged() {
    let huge = bet(2, &"x".repeat(MIN_MESSAGE_BYTES));
    let source = VecBetSource::from(vec![bet(1, "Ana"), huge, bet(3, "Luz")]);
    let mut builder = BatchBuilder::new(source, MIN_MESSAGE_BYTES * 2);

    let mut seen = Vec::new();
    loop {
        let batch = builder.next_batch(10).expect("readable");
        if batch.is_empty() {
            break;
        }
        assert!(batch.payload().len() <= builder.payload_budget());
        seen.extend(documents(&batch));
    }

    assert_eq!(seen, vec![1, 3]);
    assert_eq!(builder.dropped(), 1);
    assert!(logs_contain("bet exceeds message budget"));
}

#[test]
fn only_oversized_bets_yield_end_of_data() {
    let source = VecBetSource::from(vec![
        bet(1, &"x".repeat(200)),
        bet(2, &"y".repeat(200)),
    ]);
    let mut builder = BatchBuilder::new(source, MIN_MESSAGE_BYTES);
    assert!(builder.next_batch(1).expect("readable").is_empty());
    assert_eq!(builder.dropped(), 2);
}

#[test]
fn dropped_bets_do_not_count_towards_max_count() {
    let source = VecBetSource::from(vec![
        bet(1, &"x".repeat(200)),
        bet(2, "Ana"),
        bet(3, "Luz"),
    ]);
    let mut builder = BatchBuilder::new(source, 128);
    assert_eq!(documents(&builder.next_batch(1).expect("readable")), vec![2]);
    assert_eq!(documents(&builder.next_batch(1).expect("readable")), vec![3]);
}
