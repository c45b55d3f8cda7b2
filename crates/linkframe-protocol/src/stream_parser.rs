//! Splitting a byte stream into candidate frames.
//!
//! A serial link delivers bytes with no message boundaries. Every frame ends
//! with the configured terminator, so the parser cuts the stream after each
//! terminator and hands the piece, terminator included, to
//! [`FrameCodec::parse`](crate::FrameCodec::parse) as a candidate. Whether
//! the candidate is a well-formed frame is for the codec to decide: damaged
//! candidates are still emitted so that they can be counted.
//!
//! In the unit-separated variant a reply carries two frames, the echo and
//! the ACK/NAK, joined by a record separator. Record separators between
//! candidates are dropped.
//!
//! # Usage
//!
//! ```
//! use linkframe_core::FrameConfig;
//! use linkframe_protocol::StreamParser;
//!
//! let mut parser = StreamParser::new(FrameConfig::tab_separated());
//!
//! parser.feed(b"SEND\t0005\thel");
//! assert!(parser.next_candidate().is_none());
//!
//! parser.feed(b"lo\t3610a686\r");
//! let candidate = parser.next_candidate().unwrap();
//! assert_eq!(&candidate[..], b"SEND\t0005\thello\t3610a686\r");
//! ```

use bytes::{Bytes, BytesMut};
use linkframe_core::{FrameConfig, constants::DEFAULT_MAX_CANDIDATE_LEN};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Initial buffer capacity for incoming link data.
const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// Initial capacity for the candidate queue.
///
/// A reply is usually an echo and an ACK/NAK.
const INITIAL_QUEUE_CAPACITY: usize = 2;

/// Split a received reply buffer on the record separator.
///
/// Empty pieces are dropped. Without a configured record separator the
/// whole buffer is one record.
///
/// ```
/// use linkframe_core::FrameConfig;
/// use linkframe_protocol::split_records;
///
/// let config = FrameConfig::unit_separated();
/// let records = split_records(&config, b"PKECHO...\r\x1eACKNAK...\r");
/// assert_eq!(records, vec![&b"PKECHO...\r"[..], &b"ACKNAK...\r"[..]]);
/// ```
pub fn split_records<'a>(config: &FrameConfig, buf: &'a [u8]) -> Vec<&'a [u8]> {
    match config.record_separator {
        Some(rs) => buf
            .split(|&b| b == rs)
            .filter(|record| !record.is_empty())
            .collect(),
        None if buf.is_empty() => Vec::new(),
        None => vec![buf],
    }
}

/// Where the parser is between two terminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Between candidates; record separators are skipped here.
    Idle,

    /// Inside a candidate, waiting for the terminator.
    Reading,
}

/// Stateful splitter for terminator-delimited candidates.
///
/// ```text
/// ┌──────┐  any byte but RS   ┌─────────┐  terminator  ┌─────────────────┐
/// │ Idle │───────────────────>│ Reading │─────────────>│ candidate ready │
/// └──────┘                    └─────────┘              └─────────────────┘
///    ^  │ RS (dropped)          │     ^                          │
///    │  └──────┘                └─────┘ buffer > max:            │
///    │                                  dropped, counted         │
///    └───────────────────────────────────────────────────────────┘
/// ```
///
/// A candidate that outgrew the limit is not queued. Its terminator ends it
/// and its full size is reported through [`take_overflow`](Self::take_overflow).
#[derive(Debug)]
pub struct StreamParser {
    config: FrameConfig,

    /// Bytes of the candidate being read.
    buffer: BytesMut,

    state: ParserState,

    /// Complete candidates waiting to be taken.
    candidates: VecDeque<Bytes>,

    max_candidate_len: usize,

    /// Bytes of the current candidate already dropped for exceeding the limit.
    discarded: usize,

    /// Full size of the last candidate discarded for exceeding the limit.
    overflow: Option<usize>,
}

impl StreamParser {
    /// Parser with the default candidate size limit.
    pub fn new(config: FrameConfig) -> Self {
        Self::with_max_candidate_len(config, DEFAULT_MAX_CANDIDATE_LEN)
    }

    /// Parser that discards candidates longer than `max_candidate_len`.
    pub fn with_max_candidate_len(config: FrameConfig, max_candidate_len: usize) -> Self {
        Self {
            config,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            state: ParserState::Idle,
            candidates: VecDeque::with_capacity(INITIAL_QUEUE_CAPACITY),
            max_candidate_len,
            discarded: 0,
            overflow: None,
        }
    }

    /// Append bytes from the link and cut out every completed candidate.
    pub fn feed(&mut self, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            if self.state == ParserState::Idle {
                let start = bytes
                    .iter()
                    .position(|&b| Some(b) != self.config.record_separator)
                    .unwrap_or(bytes.len());
                bytes = &bytes[start..];
                if bytes.is_empty() {
                    break;
                }
                self.state = ParserState::Reading;
            }

            match bytes.iter().position(|&b| b == self.config.terminator) {
                Some(pos) => {
                    self.buffer.extend_from_slice(&bytes[..=pos]);
                    bytes = &bytes[pos + 1..];
                    self.complete_candidate();
                }
                None => {
                    self.buffer.extend_from_slice(bytes);
                    bytes = &[];
                }
            }

            if self.buffer.len() > self.max_candidate_len {
                self.discard_oversized();
            }
        }
    }

    /// Take the next complete candidate, oldest first.
    pub fn next_candidate(&mut self) -> Option<Bytes> {
        self.candidates.pop_front()
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Number of candidates ready to be taken.
    pub fn candidates_available(&self) -> usize {
        self.candidates.len()
    }

    /// Bytes of the unfinished candidate.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    pub fn max_candidate_len(&self) -> usize {
        self.max_candidate_len
    }

    /// Size of the last oversized candidate discarded since the previous
    /// call, if any.
    ///
    /// An oversized candidate is reported once its terminator arrives (or at
    /// [`flush`](Self::flush)), with the size of the whole candidate.
    pub fn take_overflow(&mut self) -> Option<usize> {
        self.overflow.take()
    }

    /// End of input: close the unfinished candidate as if its terminator had
    /// arrived.
    ///
    /// The candidate is queued without a terminator, so parsing it reports
    /// the missing terminator.
    pub fn flush(&mut self) {
        if self.state == ParserState::Reading {
            self.complete_candidate();
        }
    }

    /// Drop buffered bytes and queued candidates.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.candidates.clear();
        self.discarded = 0;
        self.overflow = None;
        self.state = ParserState::Idle;
    }

    /// Iterate over the candidates currently queued.
    ///
    /// Does not parse any more data; call [`feed`](Self::feed) first.
    pub fn drain_candidates(&mut self) -> DrainCandidates<'_> {
        DrainCandidates { parser: self }
    }

    fn complete_candidate(&mut self) {
        let candidate = self.buffer.split().freeze();
        let size = self.discarded + candidate.len();
        if size > self.max_candidate_len {
            self.note_overflow(size);
        } else {
            trace!(len = candidate.len(), "candidate complete");
            self.candidates.push_back(candidate);
        }
        self.discarded = 0;
        self.state = ParserState::Idle;
    }

    // the rest of the candidate is dropped up to its terminator
    fn discard_oversized(&mut self) {
        self.discarded += self.buffer.len();
        self.buffer.clear();
    }

    fn note_overflow(&mut self, size: usize) {
        debug!(
            size,
            max = self.max_candidate_len,
            "discarding oversized candidate"
        );
        self.overflow = Some(size);
    }
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new(FrameConfig::default())
    }
}

/// Iterator returned by [`StreamParser::drain_candidates`].
pub struct DrainCandidates<'a> {
    parser: &'a mut StreamParser,
}

impl Iterator for DrainCandidates<'_> {
    type Item = Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        self.parser.next_candidate()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.parser.candidates_available();
        (len, Some(len))
    }
}
