//! Size-bounded batching of bets.
//!
//! A batch respects two limits: a maximum number of bets and a payload budget
//! derived from the protocol's message size limit. Bets are never split across
//! batches, and a bet that cannot fit even in an empty batch is dropped so it
//! never stalls the stream.

use tracing::{debug, warn};

use crate::{
    bet::Bet,
    codec::{BATCH_DELIMITER, encode_bet},
    frame::protocol::{HEADER_WIDTH, clamp_message_bytes, payload_budget},
    source::{BetSource, SourceError},
};

/// An ordered group of bets and its encoded payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Batch {
    bets: Vec<Bet>,
    payload: String,
}

impl Batch {
    /// The bets in submission order.
    #[must_use]
    pub fn bets(&self) -> &[Bet] { &self.bets }

    /// Number of bets in the batch.
    #[must_use]
    pub fn len(&self) -> usize { self.bets.len() }

    /// Returns true for the end-of-data sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bets.is_empty() }

    /// The encoded payload, identical to
    /// [`encode_batch`](crate::codec::encode_batch) over [`Self::bets`].
    #[must_use]
    pub fn payload(&self) -> &str { &self.payload }

    /// Size of the batch on the wire, header included.
    #[must_use]
    pub fn wire_size(&self) -> usize { HEADER_WIDTH + self.payload.len() }
}

/// Pulls bets from a [`BetSource`] and groups them into batches.
///
/// # Examples
///
/// ```
/// use betwire::{Bet, batch::BatchBuilder, source::VecBetSource};
/// use chrono::NaiveDate;
///
/// let birthdate = NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid date");
/// let source: VecBetSource = (1..=5)
///     .map(|document| Bet::new("1", document, 7, "Ana", "Paz", birthdate))
///     .collect();
/// let mut builder = BatchBuilder::new(source, 8192);
///
/// assert_eq!(builder.next_batch(2).expect("readable").len(), 2);
/// assert_eq!(builder.next_batch(2).expect("readable").len(), 2);
/// assert_eq!(builder.next_batch(2).expect("readable").len(), 1);
/// assert!(builder.next_batch(2).expect("readable").is_empty());
/// ```
#[derive(Debug)]
pub struct BatchBuilder<S> {
    source: S,
    payload_budget: usize,
    // A bet that did not fit the previous batch, already encoded.
    pending: Option<(Bet, String)>,
    dropped: usize,
}

impl<S: BetSource> BatchBuilder<S> {
    /// Build batches for messages of at most `max_message_bytes`, header
    /// included.
    ///
    /// The limit is clamped the same way the frame codec clamps it, so a
    /// batch produced here always fits a frame.
    #[must_use]
    pub fn new(source: S, max_message_bytes: usize) -> Self {
        Self {
            source,
            payload_budget: payload_budget(clamp_message_bytes(max_message_bytes)),
            pending: None,
            dropped: 0,
        }
    }

    /// Largest batch payload this builder produces.
    #[must_use]
    pub const fn payload_budget(&self) -> usize { self.payload_budget }

    /// Bets dropped so far because they could not fit any batch.
    #[must_use]
    pub const fn dropped(&self) -> usize { self.dropped }

    /// Assemble the next batch of at most `max_count` bets.
    ///
    /// An empty batch is returned exactly when the source is exhausted. A
    /// batch shorter than `max_count` means the payload budget was reached;
    /// the bet that did not fit opens the next batch. Oversized bets are
    /// dropped and do not count towards `max_count`. A `max_count` of zero is
    /// treated as one.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the source cannot be read.
    pub fn next_batch(&mut self, max_count: usize) -> Result<Batch, SourceError> {
        let max_count = max_count.max(1);
        let mut batch = Batch::default();

        while batch.bets.len() < max_count {
            let (bet, encoded) = match self.pending.take() {
                Some(pending) => pending,
                None => match self.source.next_bet()? {
                    Some(bet) => {
                        let encoded = encode_bet(&bet);
                        (bet, encoded)
                    }
                    None => break,
                },
            };

            if encoded.len() > self.payload_budget {
                self.dropped += 1;
                warn!(
                    action = "drop_bet",
                    result = "fail",
                    dni = bet.document(),
                    bytes = encoded.len(),
                    budget = self.payload_budget,
                    "bet exceeds message budget"
                );
                continue;
            }

            let separator = usize::from(!batch.payload.is_empty());
            if batch.payload.len() + separator + encoded.len() > self.payload_budget {
                self.pending = Some((bet, encoded));
                break;
            }

            if separator == 1 {
                batch.payload.push(BATCH_DELIMITER);
            }
            batch.payload.push_str(&encoded);
            batch.bets.push(bet);
        }

        debug!(
            bets = batch.len(),
            bytes = batch.payload.len(),
            carried_over = self.pending.is_some(),
            "batch assembled"
        );
        Ok(batch)
    }

    /// Recover the source, discarding any carried-over bet.
    pub fn into_source(self) -> S { self.source }
}

#[cfg(test)]
mod tests;
