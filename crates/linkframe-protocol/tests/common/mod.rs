//! Shared helpers for the protocol integration tests.

#![allow(dead_code)]

use linkframe_core::{FrameConfig, MessageType};
use linkframe_protocol::{CheckKind, FrameCodec, ValidationStatus};

/// Both wire variants.
pub fn variants() -> [FrameConfig; 2] {
    [FrameConfig::unit_separated(), FrameConfig::tab_separated()]
}

/// Generate a frame with a fresh codec and return its wire bytes.
pub fn generate(config: &FrameConfig, payload: &[u8], kind: MessageType) -> Vec<u8> {
    let mut codec = FrameCodec::new(config.clone()).expect("preset config is valid");
    codec.generate(payload, kind).to_vec()
}

/// Byte range of the payload field inside a generated frame.
pub fn payload_range(
    config: &FrameConfig,
    kind: MessageType,
    payload_len: usize,
) -> std::ops::Range<usize> {
    let start = kind.token(config).len() + 1 + config.length_width as usize + 1;
    start..start + payload_len
}

/// Answer a received frame the way the far end of a bit-error test does:
/// the echo carries the embedded frame, followed by an ACK/NAK.
pub fn echo_reply(config: &FrameConfig, received: &[u8]) -> Vec<u8> {
    let mut codec = FrameCodec::new(config.clone()).expect("preset config is valid");
    let status = codec.parse(received);

    let embedded = codec.embed(received);
    let mut reply = codec.generate(&embedded, MessageType::Echo).to_vec();
    if let Some(rs) = config.record_separator {
        reply.push(rs);
    }
    reply.extend_from_slice(codec.generate(status.serialize().as_bytes(), MessageType::AckNak));
    reply
}

pub fn assert_only_failed(status: &ValidationStatus, expected: &[CheckKind]) {
    let failed = status.failed_checks();
    assert_eq!(failed, expected, "status:\n{status}");
}
