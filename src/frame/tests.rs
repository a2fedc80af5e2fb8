//! Unit tests for header formatting and the frame codec.
//!
//! Covers header parsing, payload limits, incremental decoding and the EOF
//! taxonomy.

use bytes::{Bytes, BytesMut};
use rstest::rstest;
use tokio_util::codec::{Decoder, Encoder};

use super::{
    protocol::{HEADER_WIDTH, MAX_HEADER_VALUE, MAX_MESSAGE_BYTES, MIN_MESSAGE_BYTES},
    *,
};

#[test]
fn max_header_value_fills_header_width() {
    assert_eq!(MAX_HEADER_VALUE.to_string().len(), HEADER_WIDTH);
    assert_eq!((MAX_HEADER_VALUE + 1).to_string().len(), HEADER_WIDTH + 1);
}

#[rstest]
#[case(0, b"00000000")]
#[case(3, b"00000003")]
#[case(8184, b"00008184")]
#[case(MAX_HEADER_VALUE, b"99999999")]
fn header_is_zero_padded_decimal(#[case] len: usize, #[case] expected: &[u8]) {
    let mut dst = BytesMut::new();
    write_header(len, &mut dst).expect("length fits the header");
    assert_eq!(&dst[..], expected);
    assert_eq!(parse_header(&dst).expect("header parses back"), len);
}

#[test]
fn header_rejects_lengths_wider_than_the_field() {
    let mut dst = BytesMut::new();
    let err = write_header(MAX_HEADER_VALUE + 1, &mut dst).expect_err("length must not fit");
    assert!(matches!(err, FrameError::Oversized { .. }));
    assert!(dst.is_empty(), "nothing should be written on failure");
}

#[rstest]
#[case::sign(&b"-0000001"[..])]
#[case::plus(&b"+0000001"[..])]
#[case::space_padded(&b"       1"[..])]
#[case::letters(&b"0000000x"[..])]
#[case::short(&b"0001"[..])]
#[case::long(&b"000000001"[..])]
fn header_rejects_non_digits(#[case] header: &[u8]) {
    let err = parse_header(header).expect_err("header must be rejected");
    assert!(matches!(err, FrameError::InvalidHeader { .. }));
}

#[test]
fn codec_clamps_message_limit() {
    let codec = BetFrameCodec::new(1);
    assert_eq!(codec.max_frame_length(), MIN_MESSAGE_BYTES - HEADER_WIDTH);

    let codec = BetFrameCodec::new(usize::MAX);
    assert_eq!(codec.max_frame_length(), MAX_HEADER_VALUE);

    let codec = BetFrameCodec::new(MAX_MESSAGE_BYTES).with_read_limit(1);
    assert_eq!(codec.max_read_length(), MIN_MESSAGE_BYTES - HEADER_WIDTH);
}

#[test]
fn write_budget_does_not_bound_incoming_frames() {
    let mut codec = BetFrameCodec::new(MIN_MESSAGE_BYTES);
    let reply = vec![b'7'; MAX_MESSAGE_BYTES * 2];
    let mut buf = BytesMut::from(&encode_frame(&reply).expect("encode reply")[..]);

    let decoded = codec
        .decode(&mut buf)
        .expect("reply within header range")
        .expect("complete frame");
    assert_eq!(decoded.len(), reply.len());
}

#[rstest]
#[case::empty(Bytes::new())]
#[case::ack(Bytes::from_static(b"ACK"))]
#[case::looks_like_a_header(Bytes::from_static(b"00000099;00000001"))]
#[case::binary(Bytes::from(vec![0_u8, 255, 10, 13, 0]))]
fn codec_round_trips_payload(#[case] payload: Bytes) {
    let mut codec = BetFrameCodec::default();
    let mut buf = BytesMut::new();
    codec
        .encode(payload.clone(), &mut buf)
        .expect("encode should succeed");
    assert_eq!(buf.len(), HEADER_WIDTH + payload.len());

    let decoded = codec
        .decode(&mut buf)
        .expect("decode should succeed")
        .expect("expected a frame");
    assert_eq!(decoded, payload);
    assert!(buf.is_empty());
}

#[test]
fn codec_rejects_oversized_payload_on_encode() {
    let mut codec = BetFrameCodec::new(MIN_MESSAGE_BYTES);
    let payload = Bytes::from(vec![b'x'; MIN_MESSAGE_BYTES - HEADER_WIDTH + 1]);
    let mut buf = BytesMut::new();
    let err = codec
        .encode(payload, &mut buf)
        .expect_err("payload exceeds the budget");
    assert!(matches!(
        err,
        FrameError::Oversized { size, max } if size == max + 1
    ));
}

#[test]
fn codec_rejects_oversized_header_on_decode() {
    let mut codec = BetFrameCodec::default().with_read_limit(MIN_MESSAGE_BYTES);
    let mut buf = BytesMut::from(&b"00001000"[..]);
    let err = codec.decode(&mut buf).expect_err("announced length too large");
    assert!(matches!(err, FrameError::Oversized { size: 1000, .. }));
}

#[test]
fn codec_waits_for_complete_frame() {
    let mut codec = BetFrameCodec::default();
    let wire = encode_frame(b"GET_WINNERS:1").expect("encode frame");
    let mut buf = BytesMut::new();

    for (index, byte) in wire.iter().enumerate() {
        buf.extend_from_slice(&[*byte]);
        let decoded = codec.decode(&mut buf).expect("decode should succeed");
        if index + 1 < wire.len() {
            assert!(decoded.is_none(), "frame completed early at byte {index}");
        } else {
            assert_eq!(decoded.as_deref(), Some(&b"GET_WINNERS:1"[..]));
        }
    }
}

#[test]
fn codec_leaves_following_frame_in_buffer() {
    let mut codec = BetFrameCodec::default();
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&encode_frame(b"first").expect("encode first"));
    buf.extend_from_slice(&encode_frame(b"second").expect("encode second"));

    let first = codec.decode(&mut buf).expect("decode").expect("first frame");
    let second = codec.decode(&mut buf).expect("decode").expect("second frame");
    assert_eq!(&first[..], b"first");
    assert_eq!(&second[..], b"second");
    assert!(buf.is_empty());
}

#[test]
fn decode_eof_at_boundary_is_clean() {
    let mut codec = BetFrameCodec::default();
    let mut buf = BytesMut::new();
    assert!(codec.decode_eof(&mut buf).expect("clean close").is_none());
}

#[rstest]
#[case(&b"0000"[..], EofError::MidHeader { bytes_received: 4, header_size: HEADER_WIDTH })]
#[case(&b"00000005AC"[..], EofError::MidFrame { bytes_received: 2, expected: 5 })]
#[case(&b"00000005"[..], EofError::MidFrame { bytes_received: 0, expected: 5 })]
fn decode_eof_reports_truncation(#[case] input: &[u8], #[case] expected: EofError) {
    let mut codec = BetFrameCodec::default();
    let mut buf = BytesMut::from(input);
    let err = codec.decode_eof(&mut buf).expect_err("truncated frame");
    match err {
        FrameError::Eof(eof) => assert_eq!(eof, expected),
        other => panic!("expected EOF error, got {other:?}"),
    }
}
