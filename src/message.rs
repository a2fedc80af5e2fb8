//! Application messages exchanged with the aggregation server.
//!
//! Requests are rendered to payload text once, and responses are decoded once
//! into a typed value at this boundary. The client never inspects raw response
//! strings outside this module.

use bytes::Bytes;

use crate::codec::decode_winners;

/// Acknowledgment token for an accepted batch.
pub const ACK: &str = "ACK";
/// Prefix of the end-of-submission signal.
pub const BATCH_END_PREFIX: &str = "BATCH_END:";
/// Prefix of a results request.
pub const GET_WINNERS_PREFIX: &str = "GET_WINNERS:";
/// Prefix of every server error response.
pub const ERROR_PREFIX: &str = "ERROR:";
/// Response sent while some agency has not finished submitting.
pub const NOT_READY: &str = "ERROR:NOT_ALL_BATCHES_RECEIVED";

/// A request sent by the client.
///
/// # Examples
///
/// ```
/// use betwire::message::Request;
///
/// let request = Request::GetWinners {
///     client_id: "3".into(),
/// };
/// assert_eq!(&request.to_payload()[..], b"GET_WINNERS:3");
/// assert_eq!(Request::parse("GET_WINNERS:3"), request);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// An encoded batch of bets.
    Bets(String),
    /// No more batches will follow from this client.
    BatchEnd {
        /// Agency identifier.
        client_id: String,
    },
    /// Ask for this agency's winners.
    GetWinners {
        /// Agency identifier.
        client_id: String,
    },
}

impl Request {
    /// Render the request as a frame payload.
    #[must_use]
    pub fn to_payload(&self) -> Bytes {
        match self {
            Self::Bets(payload) => Bytes::from(payload.clone()),
            Self::BatchEnd { client_id } => Bytes::from(format!("{BATCH_END_PREFIX}{client_id}")),
            Self::GetWinners { client_id } => {
                Bytes::from(format!("{GET_WINNERS_PREFIX}{client_id}"))
            }
        }
    }

    /// Classify a received request payload.
    ///
    /// Anything that is not a control message is treated as a bet batch.
    #[must_use]
    pub fn parse(payload: &str) -> Self {
        if let Some(client_id) = payload.strip_prefix(BATCH_END_PREFIX) {
            return Self::BatchEnd {
                client_id: client_id.trim().to_owned(),
            };
        }
        if let Some(client_id) = payload.strip_prefix(GET_WINNERS_PREFIX) {
            return Self::GetWinners {
                client_id: client_id.trim().to_owned(),
            };
        }
        Self::Bets(payload.to_owned())
    }
}

/// Returns true if `payload` is the acknowledgment token.
///
/// Surrounding whitespace is ignored; the comparison is case sensitive.
///
/// # Examples
///
/// ```
/// use betwire::message::is_ack;
///
/// assert!(is_ack(b"ACK\n"));
/// assert!(!is_ack(b"ack"));
/// ```
#[must_use]
pub fn is_ack(payload: &[u8]) -> bool {
    std::str::from_utf8(payload).is_ok_and(|text| text.trim() == ACK)
}

/// Server reply to a results request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollResponse {
    /// The draw is complete; the list holds this agency's winners.
    Ready(Vec<u64>),
    /// Some agency has not finished submitting yet.
    NotReady,
    /// The reply could not be interpreted.
    Malformed(String),
}

impl PollResponse {
    /// Decode a results reply.
    ///
    /// # Examples
    ///
    /// ```
    /// use betwire::message::PollResponse;
    ///
    /// assert_eq!(PollResponse::decode(b"5;12"), PollResponse::Ready(vec![5, 12]));
    /// assert_eq!(PollResponse::decode(b""), PollResponse::Ready(vec![]));
    /// assert_eq!(
    ///     PollResponse::decode(b"ERROR:NOT_ALL_BATCHES_RECEIVED"),
    ///     PollResponse::NotReady
    /// );
    /// ```
    #[must_use]
    pub fn decode(payload: &[u8]) -> Self {
        let Ok(text) = std::str::from_utf8(payload) else {
            return Self::Malformed(crate::codec::DecodeError::InvalidUtf8.to_string());
        };
        let text = text.trim();
        if text == NOT_READY {
            return Self::NotReady;
        }
        if text.starts_with(ERROR_PREFIX) {
            return Self::Malformed(format!("server error: {text}"));
        }
        match decode_winners(text) {
            Ok(winners) => Self::Ready(winners),
            Err(err) => Self::Malformed(err.to_string()),
        }
    }
}
