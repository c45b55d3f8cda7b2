use crate::{ascii, hex_field::BoundedHexField};
use bytes::{BufMut, Bytes, BytesMut};
use crc::{CRC_32_ISO_HDLC, Crc};
use linkframe_core::{FrameConfig, MessageType};
use std::fmt;
use tracing::warn;

/// IEEE 802.3 CRC-32, the checksum carried in every frame.
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// CRC-32 of raw payload bytes.
///
/// ```
/// assert_eq!(linkframe_protocol::crc32(b"hello"), 0x3610_a686);
/// assert_eq!(linkframe_protocol::crc32(b""), 0);
/// ```
pub fn crc32(bytes: &[u8]) -> u32 {
    CRC32.checksum(bytes)
}

/// CRC-32 of `payload` reduced to the configured checksum width.
pub(crate) fn checksum_of(config: &FrameConfig, payload: &[u8]) -> u64 {
    let range = BoundedHexField::full_range(config.checksum_width);
    u64::from(crc32(payload)) & (range.end - 1)
}

/// One decoded or generated frame.
///
/// # Wire Format
///
/// ```text
/// <TYPE><SEP><LEN><SEP><PAYLOAD><SEP><CRC><TERM>
/// PKSEND 0x1F 0005 0x1F hello 0x1F 3610a686 \r
/// ```
///
/// `LEN` and `CRC` are fixed-width lowercase hex. A frame produced by
/// [`Frame::build`] always satisfies `length == payload.len()` and
/// `checksum == crc32(payload)`, unless the payload was too long for the
/// length field (see [`Frame::build`]).
///
/// Equality compares kind, length, payload and checksum, so a sent frame can
/// be compared with the one recovered from its echo.
#[derive(Debug, Clone)]
pub struct Frame {
    kind: MessageType,
    length: BoundedHexField,
    payload: Bytes,
    checksum: BoundedHexField,
    type_defaulted: bool,
}

impl Frame {
    /// Build a frame around `payload`.
    ///
    /// Never fails. [`MessageType::Unknown`] is replaced by the default type
    /// and recorded in [`type_defaulted`](Self::type_defaulted). A payload
    /// longer than [`FrameConfig::max_payload_len`] gets a zero length field
    /// and a warning; the resulting frame will not validate.
    pub fn build(config: &FrameConfig, payload: impl Into<Bytes>, kind: MessageType) -> Self {
        let payload = payload.into();

        let type_defaulted = !kind.is_known();
        let kind = if type_defaulted {
            MessageType::default()
        } else {
            kind
        };

        let length = BoundedHexField::from_int(payload.len() as u64, config.length_width);
        if let Some(cause) = length.cause() {
            warn!(
                payload_len = payload.len(),
                max = config.max_payload_len(),
                %cause,
                "payload does not fit the length field"
            );
        }

        let checksum =
            BoundedHexField::from_int(checksum_of(config, &payload), config.checksum_width);

        Self {
            kind,
            length: length.into_field(),
            payload,
            checksum: checksum.into_field(),
            type_defaulted,
        }
    }

    /// The default frame: default type, empty payload, zero length and the
    /// checksum of an empty payload.
    pub fn empty(config: &FrameConfig) -> Self {
        Self::build(config, Bytes::new(), MessageType::default())
    }

    /// Render the wire form.
    pub fn encode(&self, config: &FrameConfig) -> Bytes {
        let token = self.kind.token(config);
        let mut buf = BytesMut::with_capacity(self.encoded_len(config));

        buf.put_slice(token.as_bytes());
        buf.put_u8(config.separator);
        buf.put_slice(self.length.as_bytes());
        buf.put_u8(config.separator);
        buf.put_slice(&self.payload);
        buf.put_u8(config.separator);
        buf.put_slice(self.checksum.as_bytes());
        buf.put_u8(config.terminator);

        buf.freeze()
    }

    /// Byte length of [`encode`](Self::encode) output.
    pub fn encoded_len(&self, config: &FrameConfig) -> usize {
        self.kind.token(config).len()
            + self.length.width() as usize
            + self.payload.len()
            + self.checksum.width() as usize
            + 4
    }

    pub fn kind(&self) -> MessageType {
        self.kind
    }

    pub fn length(&self) -> &BoundedHexField {
        &self.length
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn checksum(&self) -> &BoundedHexField {
        &self.checksum
    }

    /// True if the requested type was not recognised and the default was used.
    pub fn type_defaulted(&self) -> bool {
        self.type_defaulted
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.length == other.length
            && self.payload == other.payload
            && self.checksum == other.checksum
    }
}

impl Eq for Frame {}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.kind.to_string().to_uppercase(),
            self.length.value(),
            ascii::pretty(&self.payload),
            self.checksum.text()
        )
    }
}
