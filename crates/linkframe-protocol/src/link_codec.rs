//! Tokio codec for framed links.
//!
//! [`LinkCodec`] lets a `tokio_util::codec::Framed` stream carry frames over
//! any `AsyncRead + AsyncWrite` transport (a serial port, a TCP bridge, an
//! in-memory duplex in tests).
//!
//! ```text
//! link bytes -> StreamParser -> candidate -> parse_frame -> Received
//! Outgoing   -> Frame::build -> encode    -> link bytes
//! ```
//!
//! Decoding does not stop at a damaged candidate: every candidate becomes a
//! [`Received`] item carrying its [`ValidationStatus`], so a bit-error test
//! can count failures by kind. That includes a candidate larger than the
//! configured limit (reported with a failed frame length check and no bytes)
//! and an unterminated candidate left over when the link closes.
//!
//! ```rust,no_run
//! use futures::{SinkExt, StreamExt};
//! use linkframe_core::{FrameConfig, MessageType};
//! use linkframe_protocol::{LinkCodec, Outgoing};
//! use tokio::net::TcpStream;
//! use tokio_util::codec::Framed;
//!
//! # async fn example() -> linkframe_core::Result<()> {
//! let stream = TcpStream::connect("127.0.0.1:4000").await?;
//! let mut link = Framed::new(stream, LinkCodec::new(FrameConfig::default())?);
//!
//! link.send(Outgoing::new(MessageType::Send, &b"hello"[..])).await?;
//! while let Some(received) = link.next().await {
//!     let received = received?;
//!     println!("{:?}", received.status.classify());
//! }
//! # Ok(())
//! # }
//! ```

use crate::{
    codec::parse_frame,
    frame::Frame,
    status::{CheckKind, ValidationStatus},
    stream_parser::StreamParser,
};
use bytes::{Bytes, BytesMut};
use linkframe_core::{Error, FrameConfig, MessageType, Result, constants::DEFAULT_MAX_CANDIDATE_LEN};
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

/// One decoded candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    /// The frame, present only when `status` is valid.
    pub frame: Option<Frame>,
    pub status: ValidationStatus,
    /// The candidate exactly as it arrived; empty for an oversized candidate.
    pub raw: Bytes,
}

impl Received {
    fn parsed(config: &FrameConfig, raw: Bytes) -> Self {
        let (frame, status) = parse_frame(config, &raw);
        Self { frame, status, raw }
    }

    fn oversized(size: usize) -> Self {
        let mut status = ValidationStatus::new();
        status.lengths_mut().frame = size;
        status.set(CheckKind::FrameLength, false);
        Self {
            frame: None,
            status,
            raw: Bytes::new(),
        }
    }

    /// True if the candidate was dropped for exceeding the size limit.
    pub fn is_oversized(&self) -> bool {
        self.raw.is_empty() && self.status.lengths().frame > 0
    }
}

/// A frame to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub kind: MessageType,
    pub payload: Bytes,
}

impl Outgoing {
    pub fn new(kind: MessageType, payload: impl Into<Bytes>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }
}

/// Decoder and encoder for one wire variant.
#[derive(Debug)]
pub struct LinkCodec {
    config: FrameConfig,
    parser: StreamParser,
    max_frame_size: usize,
}

impl LinkCodec {
    /// Codec with the default frame size limit.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `config` does not validate.
    pub fn new(config: FrameConfig) -> Result<Self> {
        Self::with_max_frame_size(config, DEFAULT_MAX_CANDIDATE_LEN)
    }

    /// Codec that drops received candidates and refuses to send frames
    /// longer than `max_frame_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `config` does not validate.
    pub fn with_max_frame_size(config: FrameConfig, max_frame_size: usize) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            parser: StreamParser::with_max_candidate_len(config.clone(), max_frame_size),
            config,
            max_frame_size,
        })
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Decoder for LinkCodec {
    type Item = Received;
    type Error = Error;

    /// Yield the next candidate from the link.
    ///
    /// `src` is fed to the parser one terminator at a time so that oversized
    /// candidates are reported in stream order.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Received>> {
        loop {
            if let Some(size) = self.parser.take_overflow() {
                debug!(size, max = self.max_frame_size, "oversized candidate");
                return Ok(Some(Received::oversized(size)));
            }
            if let Some(raw) = self.parser.next_candidate() {
                return Ok(Some(Received::parsed(&self.config, raw)));
            }
            if src.is_empty() {
                return Ok(None);
            }

            let end = src
                .iter()
                .position(|&b| b == self.config.terminator)
                .map_or(src.len(), |pos| pos + 1);
            let chunk = src.split_to(end);
            self.parser.feed(&chunk);
        }
    }

    /// Drain the stream, then hand over the unterminated candidate, if any.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Received>> {
        if let Some(received) = self.decode(src)? {
            return Ok(Some(received));
        }
        self.parser.flush();
        self.decode(src)
    }
}

impl Encoder<Outgoing> for LinkCodec {
    type Error = Error;

    /// # Errors
    ///
    /// Returns `Error::FrameTooLarge` if the encoded frame would exceed
    /// `max_frame_size`.
    fn encode(&mut self, item: Outgoing, dst: &mut BytesMut) -> Result<()> {
        let frame = Frame::build(&self.config, item.payload, item.kind);
        let size = frame.encoded_len(&self.config);
        if size > self.max_frame_size {
            return Err(Error::FrameTooLarge {
                size,
                max_size: self.max_frame_size,
            });
        }
        dst.extend_from_slice(&frame.encode(&self.config));
        Ok(())
    }
}

impl Encoder<Frame> for LinkCodec {
    type Error = Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        let size = item.encoded_len(&self.config);
        if size > self.max_frame_size {
            return Err(Error::FrameTooLarge {
                size,
                max_size: self.max_frame_size,
            });
        }
        dst.extend_from_slice(&item.encode(&self.config));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Diagnosis;
    use linkframe_core::Check;

    fn codec() -> LinkCodec {
        LinkCodec::new(FrameConfig::tab_separated()).unwrap()
    }

    #[test]
    fn test_codec_new() {
        let codec = codec();
        assert_eq!(codec.max_frame_size(), DEFAULT_MAX_CANDIDATE_LEN);
        assert_eq!(codec.config(), &FrameConfig::tab_separated());
    }

    #[test]
    fn test_codec_rejects_invalid_config() {
        let config = FrameConfig {
            length_width: 0,
            ..FrameConfig::default()
        };
        assert!(LinkCodec::new(config).is_err());
    }

    #[test]
    fn test_decode_valid_frame() {
        let mut codec = codec();
        let mut buffer = BytesMut::from(&b"SEND\t0005\thello\t3610a686\r"[..]);

        let received = codec.decode(&mut buffer).unwrap().unwrap();
        assert!(received.status.is_valid());
        assert_eq!(received.frame.unwrap().payload().as_ref(), b"hello");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_decode_partial_frame() {
        let mut codec = codec();
        let mut buffer = BytesMut::from(&b"SEND\t0005\thel"[..]);
        assert!(codec.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"lo\t3610a686\r");
        assert!(codec.decode(&mut buffer).unwrap().is_some());
    }

    #[test]
    fn test_decode_damaged_frame_is_an_item() {
        let mut codec = codec();
        let mut buffer = BytesMut::from(&b"SEND\t0005\thellx\t3610a686\r"[..]);

        let received = codec.decode(&mut buffer).unwrap().unwrap();
        assert!(received.frame.is_none());
        assert_eq!(received.status.check(CheckKind::Checksum), Check::Fail);
        assert_eq!(received.status.classify(), Diagnosis::ChecksumMismatch);
        assert_eq!(received.raw.as_ref(), b"SEND\t0005\thellx\t3610a686\r");
    }

    #[test]
    fn test_decode_multiple_frames() {
        let mut codec = codec();
        let mut buffer = BytesMut::new();
        codec
            .encode(Outgoing::new(MessageType::Send, &b"one"[..]), &mut buffer)
            .unwrap();
        codec
            .encode(Outgoing::new(MessageType::AckNak, &b""[..]), &mut buffer)
            .unwrap();

        let first = codec.decode(&mut buffer).unwrap().unwrap();
        let second = codec.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(first.frame.unwrap().kind(), MessageType::Send);
        assert_eq!(second.frame.unwrap().kind(), MessageType::AckNak);
        assert!(codec.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_decode_frame_too_large_is_an_item() {
        let mut codec = LinkCodec::with_max_frame_size(FrameConfig::tab_separated(), 24).unwrap();
        let mut buffer = BytesMut::from(&b"SEND\t0005\thello\t3610a686\r"[..]);

        let received = codec.decode(&mut buffer).unwrap().unwrap();
        assert!(received.is_oversized());
        assert!(received.frame.is_none());
        assert_eq!(received.status.lengths().frame, 25);
        assert_eq!(received.status.check(CheckKind::FrameLength), Check::Fail);
        assert_eq!(received.status.check(CheckKind::Checksum), Check::Unknown);
        assert_eq!(received.status.classify(), Diagnosis::Rejected);
        assert!(codec.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_decode_keeps_order_around_oversized_candidate() {
        let mut codec = LinkCodec::with_max_frame_size(FrameConfig::tab_separated(), 24).unwrap();
        let mut buffer = BytesMut::new();
        buffer.extend_from_slice(b"SEND\t0002\thi\td8932aac\r");
        buffer.extend_from_slice(&[b'a'; 40]);
        buffer.extend_from_slice(b"\rSEND\t0002\thi\td8932aac\r");

        let first = codec.decode(&mut buffer).unwrap().unwrap();
        let second = codec.decode(&mut buffer).unwrap().unwrap();
        let third = codec.decode(&mut buffer).unwrap().unwrap();
        assert!(first.status.is_valid());
        assert!(second.is_oversized());
        assert_eq!(second.status.lengths().frame, 41);
        assert!(third.status.is_valid());
        assert!(codec.decode(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_decode_eof_reports_unterminated_candidate() {
        let mut codec = codec();
        let mut buffer = BytesMut::from(&b"SEND\t0005\thello\t3610a686"[..]);
        assert!(codec.decode(&mut buffer).unwrap().is_none());

        let received = codec.decode_eof(&mut buffer).unwrap().unwrap();
        assert!(!received.is_oversized());
        assert_eq!(received.status.check(CheckKind::Terminator), Check::Fail);
        assert_eq!(received.status.classify(), Diagnosis::Rejected);
        assert_eq!(received.raw.as_ref(), b"SEND\t0005\thello\t3610a686");
        assert!(codec.decode_eof(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_decode_eof_on_clean_stream() {
        let mut codec = codec();
        let mut buffer = BytesMut::from(&b"SEND\t0005\thello\t3610a686\r"[..]);
        assert!(codec.decode_eof(&mut buffer).unwrap().unwrap().status.is_valid());
        assert!(codec.decode_eof(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn test_encode_frame_too_large() {
        let mut codec = LinkCodec::with_max_frame_size(FrameConfig::tab_separated(), 20).unwrap();
        let mut buffer = BytesMut::new();

        let result = codec.encode(Outgoing::new(MessageType::Send, &b"x"[..]), &mut buffer);
        assert!(matches!(
            result,
            Err(Error::FrameTooLarge {
                size: 21,
                max_size: 20
            })
        ));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_encode_prebuilt_frame() {
        let mut codec = codec();
        let frame = Frame::build(codec.config(), &b"hello"[..], MessageType::Send);
        let mut buffer = BytesMut::new();
        codec.encode(frame, &mut buffer).unwrap();
        assert_eq!(buffer.as_ref(), b"SEND\t0005\thello\t3610a686\r");
    }
}
