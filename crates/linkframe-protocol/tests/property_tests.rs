//! Property-based tests for framing, escaping and error detection.

mod common;

use linkframe_core::{Check, FrameConfig, MessageType};
use linkframe_protocol::{
    BoundedHexField, CheckKind, FrameCodec, ValidationStatus, crc32,
    escape::{embed, extract},
};
use proptest::prelude::*;

fn any_kind() -> impl Strategy<Value = MessageType> {
    prop_oneof![
        Just(MessageType::Send),
        Just(MessageType::Echo),
        Just(MessageType::AckNak),
    ]
}

fn any_config() -> impl Strategy<Value = FrameConfig> {
    prop_oneof![
        Just(FrameConfig::unit_separated()),
        Just(FrameConfig::tab_separated()),
    ]
}

fn any_check() -> impl Strategy<Value = Check> {
    prop_oneof![
        Just(Check::Unknown),
        Just(Check::Pass),
        Just(Check::Fail),
        Just(Check::Malformed),
    ]
}

proptest! {
    /// Any payload survives generate/parse once embedded.
    #[test]
    fn prop_embedded_payload_roundtrip(
        config in any_config(),
        kind in any_kind(),
        payload in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let mut codec = FrameCodec::new(config.clone()).unwrap();
        let embedded = codec.embed(&payload);
        let wire = codec.generate(&embedded, kind).to_vec();

        let mut receiver = FrameCodec::new(config).unwrap();
        let status = receiver.parse(&wire);
        prop_assert!(status.is_valid(), "status:\n{}", status);
        prop_assert_eq!(receiver.kind(), kind);
        prop_assert_eq!(receiver.extract(receiver.payload()), payload);
        prop_assert_eq!(receiver.raw(), &wire[..]);
    }

    /// Payloads free of delimiter bytes need no embedding.
    #[test]
    fn prop_plain_payload_roundtrip(
        kind in any_kind(),
        payload in prop::collection::vec(0x20u8..0x7f, 0..256),
    ) {
        let config = FrameConfig::tab_separated();
        let wire = common::generate(&config, &payload, kind);

        let mut codec = FrameCodec::new(config).unwrap();
        prop_assert!(codec.parse(&wire).is_valid());
        prop_assert_eq!(codec.payload(), &payload[..]);
    }

    #[test]
    fn prop_extract_inverts_embed(
        config in any_config(),
        input in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let embedded = embed(&config, &input);
        prop_assert!(!embedded.contains(&config.separator));
        prop_assert!(!embedded.contains(&config.terminator));
        prop_assert_eq!(extract(&config, &embedded), input);
    }

    /// Every single-bit error in the payload is caught.
    #[test]
    fn prop_single_bit_flip_detected(
        config in any_config(),
        payload in prop::collection::vec(any::<u8>(), 1..128),
        bit in any::<prop::sample::Index>(),
    ) {
        let embedded = embed(&config, &payload);
        let wire = common::generate(&config, &embedded, MessageType::Send);
        let range = common::payload_range(&config, MessageType::Send, embedded.len());

        let bit = bit.index(embedded.len() * 8);
        let mut damaged = wire.clone();
        damaged[range.start + bit / 8] ^= 1 << (bit % 8);

        let mut codec = FrameCodec::new(config).unwrap();
        let status = codec.parse(&damaged);
        prop_assert!(!status.is_valid());
        prop_assert!(codec.payload().is_empty());
        if status.check(CheckKind::PayloadLength).passed() {
            prop_assert_eq!(status.check(CheckKind::Checksum), Check::Fail);
        }
    }

    /// Dropping one payload byte is reported as a length mismatch.
    #[test]
    fn prop_truncation_detected(
        payload in prop::collection::vec(b'a'..=b'z', 1..128),
        index in any::<prop::sample::Index>(),
    ) {
        let config = FrameConfig::unit_separated();
        let wire = common::generate(&config, &payload, MessageType::Send);
        let range = common::payload_range(&config, MessageType::Send, payload.len());

        let mut damaged = wire.clone();
        damaged.remove(range.start + index.index(payload.len()));

        let mut codec = FrameCodec::new(config).unwrap();
        let status = codec.parse(&damaged);
        prop_assert_eq!(status.check(CheckKind::PayloadLength), Check::Fail);
        prop_assert_eq!(status.check(CheckKind::Checksum), Check::Unknown);
        prop_assert!(codec.payload().is_empty());
    }

    /// Anything shorter than the minimum frame is rejected before splitting.
    #[test]
    fn prop_short_candidates_rejected(
        config in any_config(),
        candidate in prop::collection::vec(any::<u8>(), 0..20),
    ) {
        let mut codec = FrameCodec::new(config.clone()).unwrap();
        let status = codec.parse(&candidate);
        if candidate.len() < config.min_frame_len() {
            prop_assert_eq!(status.check(CheckKind::FrameLength), Check::Fail);
            prop_assert_eq!(status.failed_checks().len(), 10);
            prop_assert_eq!(
                status.checks().filter(|(_, c)| *c == Check::Unknown).count(),
                9
            );
        }
    }

    /// Parsing arbitrary bytes never panics and never adopts an invalid frame.
    #[test]
    fn prop_parse_is_total(
        config in any_config(),
        candidate in prop::collection::vec(any::<u8>(), 0..128),
    ) {
        let mut codec = FrameCodec::new(config).unwrap();
        let status = codec.parse(&candidate);
        if !status.is_valid() {
            prop_assert!(codec.payload().is_empty());
        }
    }

    #[test]
    fn prop_status_text_roundtrip(
        lengths in prop::array::uniform5(0usize..100_000),
        checks in prop::array::uniform10(any_check()),
    ) {
        let flags: Vec<String> = checks.iter().map(Check::to_string).collect();
        let text = format!(
            "{},{},{},{},{};{}",
            lengths[0], lengths[1], lengths[2], lengths[3], lengths[4],
            flags.join(",")
        );
        let status: ValidationStatus = text.parse().unwrap();
        prop_assert_eq!(status.serialize(), text);
        prop_assert_eq!(status.check(CheckKind::Checksum), checks[9]);
    }

    #[test]
    fn prop_hex_field_text_matches_value(value in 0u64..=0xFFFF_FFFF, width in 1u8..=8) {
        match BoundedHexField::try_from_int(value, width) {
            Ok(field) => {
                prop_assert_eq!(field.text().len(), width as usize);
                prop_assert_eq!(u64::from_str_radix(field.text(), 16).unwrap(), value);
                let reparsed = BoundedHexField::try_from_text(field.text(), width).unwrap();
                prop_assert_eq!(reparsed, field);
            }
            Err(_) => prop_assert!(value >= BoundedHexField::full_range(width).end),
        }
    }

    #[test]
    fn prop_crc32_matches_frame_checksum(payload in prop::collection::vec(any::<u8>(), 0..256)) {
        let config = FrameConfig::default();
        let mut codec = FrameCodec::new(config).unwrap();
        codec.generate(&payload, MessageType::Send);
        prop_assert_eq!(codec.checksum().value(), crc32(&payload));
        prop_assert_eq!(codec.length().value() as usize, payload.len());
    }
}
