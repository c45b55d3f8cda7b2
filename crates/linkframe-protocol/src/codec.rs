//! Frame generation and staged validation.
//!
//! [`FrameCodec`] turns payloads into frames and candidate byte sequences
//! back into payloads. Parsing never returns an error: every check it
//! performs is recorded in the returned [`ValidationStatus`], and the codec
//! only adopts the parsed frame when all ten checks pass.
//!
//! # Parse Stages
//!
//! ```text
//! 1. frame length   >= minimum frame size        fail -> stop, rest unknown
//! 2. terminator     last byte is the terminator
//! 3. field count    exactly four separated fields fail -> stop
//! 4. type token     configured token (any case)
//! 5. length field   fixed width, hex digits
//! 6. checksum field fixed width, hex digits
//! 7. payload length declared == actual             only if 2, 4, 5, 6 pass
//! 8. checksum       crc32(payload) == declared     only if 7 passes
//! 9. adopt frame if all ten checks pass, otherwise reset to the empty frame
//! ```
//!
//! # Example
//!
//! ```
//! use linkframe_core::{FrameConfig, MessageType};
//! use linkframe_protocol::FrameCodec;
//!
//! let mut codec = FrameCodec::new(FrameConfig::tab_separated()).unwrap();
//! let wire = codec.generate(b"hello", MessageType::Send).to_vec();
//! assert_eq!(wire, b"SEND\t0005\thello\t3610a686\r");
//!
//! let mut receiver = FrameCodec::new(FrameConfig::tab_separated()).unwrap();
//! let status = receiver.parse(&wire);
//! assert!(status.is_valid());
//! assert_eq!(receiver.payload(), b"hello");
//! ```

use crate::{
    escape,
    frame::{Frame, checksum_of},
    hex_field::{BoundedHexField, is_hex},
    status::{CheckKind, FrameLengths, ValidationStatus},
};
use bytes::Bytes;
use linkframe_core::{FrameConfig, MessageType, Result};
use tracing::{debug, trace};

/// Stateful frame builder and parser for one direction of a link.
///
/// Holds the last frame it generated or successfully parsed. Use one
/// instance per direction; a failed parse replaces the held frame with the
/// empty default, so [`payload`](Self::payload) only reflects a candidate
/// when its status was valid.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    config: FrameConfig,
    frame: Frame,
    raw: Bytes,
}

impl FrameCodec {
    /// Create a codec for the given wire variant.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `config` fails
    /// [`FrameConfig::validate`].
    pub fn new(config: FrameConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: FrameConfig) -> Self {
        let frame = Frame::empty(&config);
        let raw = frame.encode(&config);
        Self { config, frame, raw }
    }

    /// Build a frame and return its wire bytes.
    ///
    /// Never fails; see [`Frame::build`] for how an unknown type or an
    /// oversized payload is handled. Payload bytes equal to the separator or
    /// terminator are copied as is and will break framing on the receiving
    /// side unless the payload was passed through [`embed`](Self::embed).
    pub fn generate(&mut self, payload: &[u8], kind: MessageType) -> &[u8] {
        self.frame = Frame::build(&self.config, Bytes::copy_from_slice(payload), kind);
        self.raw = self.frame.encode(&self.config);
        trace!(frame = %self.frame, "generated");
        &self.raw
    }

    /// [`generate`](Self::generate) with the type given as a wire token.
    ///
    /// An unrecognised token produces a frame of the default type.
    pub fn generate_with_token(&mut self, payload: &[u8], token: &str) -> &[u8] {
        let kind = MessageType::from_token(token, &self.config);
        self.generate(payload, kind)
    }

    /// Validate a candidate frame.
    ///
    /// On success the codec holds the parsed frame; on any failure it holds
    /// the empty default frame.
    pub fn parse(&mut self, candidate: &[u8]) -> ValidationStatus {
        let (frame, status) = parse_frame(&self.config, candidate);
        match frame {
            Some(frame) => {
                self.raw = frame.encode(&self.config);
                self.frame = frame;
            }
            None => self.reset(),
        }
        status
    }

    /// Return to the empty default frame.
    pub fn reset(&mut self) {
        self.frame = Frame::empty(&self.config);
        self.raw = self.frame.encode(&self.config);
    }

    /// Canonical wire bytes of the held frame.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn kind(&self) -> MessageType {
        self.frame.kind()
    }

    pub fn payload(&self) -> &[u8] {
        self.frame.payload()
    }

    pub fn length(&self) -> &BoundedHexField {
        self.frame.length()
    }

    pub fn checksum(&self) -> &BoundedHexField {
        self.frame.checksum()
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Escape a frame for use as another frame's payload.
    pub fn embed(&self, bytes: &[u8]) -> Vec<u8> {
        escape::embed(&self.config, bytes)
    }

    /// Undo [`embed`](Self::embed).
    pub fn extract(&self, bytes: &[u8]) -> Vec<u8> {
        escape::extract(&self.config, bytes)
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::with_valid_config(FrameConfig::default())
    }
}

/// Run the parse stages without touching any codec state.
///
/// Returns the parsed frame only when every check passed.
pub fn parse_frame(config: &FrameConfig, candidate: &[u8]) -> (Option<Frame>, ValidationStatus) {
    let mut status = ValidationStatus::new();
    status.lengths_mut().frame = candidate.len();

    let min = config.min_frame_len();
    let long_enough = candidate.len() >= min;
    status.set(CheckKind::FrameLength, long_enough);
    if !long_enough {
        debug!(len = candidate.len(), min, "candidate shorter than minimum frame");
        return (None, status);
    }

    let (body, terminated) = match candidate.split_last() {
        Some((&last, body)) if last == config.terminator => (body, true),
        _ => (candidate, false),
    };
    status.set(CheckKind::Terminator, terminated);
    trace!(terminated, "terminator stage");

    let fields: Vec<&[u8]> = body.split(|&b| b == config.separator).collect();
    let [token, length, payload, checksum] = fields[..] else {
        status.set(CheckKind::FieldCount, false);
        debug!(fields = fields.len(), "wrong field count");
        return (None, status);
    };
    status.set(CheckKind::FieldCount, true);
    *status.lengths_mut() = FrameLengths {
        frame: candidate.len(),
        token: token.len(),
        length: length.len(),
        payload: payload.len(),
        checksum: checksum.len(),
    };

    let kind = std::str::from_utf8(token)
        .map(|t| MessageType::from_token(t, config))
        .unwrap_or(MessageType::Unknown);
    status.set(CheckKind::TypeToken, kind.is_known());
    trace!(%kind, "type token stage");

    let length_width = length.len() == usize::from(config.length_width);
    let length_hex = !length.is_empty() && is_hex(length);
    let checksum_width = checksum.len() == usize::from(config.checksum_width);
    let checksum_hex = !checksum.is_empty() && is_hex(checksum);
    status.set(CheckKind::LengthWidth, length_width);
    status.set(CheckKind::LengthHex, length_hex);
    status.set(CheckKind::ChecksumWidth, checksum_width);
    status.set(CheckKind::ChecksumHex, checksum_hex);
    trace!(
        length_width,
        length_hex,
        checksum_width,
        checksum_hex,
        "field shape stage"
    );

    if !(terminated
        && kind.is_known()
        && length_width
        && length_hex
        && checksum_width
        && checksum_hex)
    {
        debug!(
            failed = ?status.failed_checks(),
            "header checks failed, payload not compared"
        );
        return (None, status);
    }

    let declared_len = hex_value(length, config.length_width);
    let length_match = declared_len == Some(payload.len() as u64);
    status.set(CheckKind::PayloadLength, length_match);
    if !length_match {
        debug!(
            declared = ?declared_len,
            actual = payload.len(),
            "payload length mismatch"
        );
        return (None, status);
    }

    let declared_crc = hex_value(checksum, config.checksum_width);
    let computed_crc = checksum_of(config, payload);
    let crc_match = declared_crc == Some(computed_crc);
    status.set(CheckKind::Checksum, crc_match);
    if !crc_match {
        debug!(
            declared = ?declared_crc,
            computed = computed_crc,
            "checksum mismatch"
        );
        return (None, status);
    }

    let frame = Frame::build(config, Bytes::copy_from_slice(payload), kind);
    trace!(%frame, "parsed");
    (Some(frame), status)
}

fn hex_value(field: &[u8], width: u8) -> Option<u64> {
    let text = std::str::from_utf8(field).ok()?;
    BoundedHexField::try_from_text(text, width)
        .ok()
        .map(|f| u64::from(f.value()))
}
