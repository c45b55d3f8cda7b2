//! Core constants for the linkframe wire format.
//!
//! These constants describe the byte-level framing used to carry short
//! command/data messages over a half-duplex serial link that has no native
//! framing of its own.
//!
//! # Frame Structure
//!
//! ```text
//! <TYPE><SEP><LEN4><SEP><PAYLOAD><SEP><CRC8><TERM>
//! ```
//!
//! Where:
//! - `TYPE` - Message type token (`PKSEND`, `PKECHO`, `ACKNAK`, ...)
//! - `SEP` - Field separator (unit separator `0x1F` or tab `0x09`)
//! - `LEN4` - Payload length, 4 lowercase hex digits
//! - `PAYLOAD` - Arbitrary bytes
//! - `CRC8` - CRC-32 of the payload, 8 lowercase hex digits
//! - `TERM` - Carriage return `0x0D`
//!
//! # Usage
//!
//! ```
//! use linkframe_core::constants::*;
//!
//! // Smallest possible unit-separated frame: 6 + 3 + 4 + 0 + 8 + 1
//! let overhead = TOKEN_SEND.len() + 3 + LENGTH_WIDTH as usize + CHECKSUM_WIDTH as usize + 1;
//! assert_eq!(overhead, 22);
//! ```

// ============================================================================
// Control Bytes
// ============================================================================

/// Horizontal tab, the field separator of the tab-separated variant.
pub const TAB: u8 = 0x09;

/// Carriage return, the frame terminator of both variants.
pub const CR: u8 = 0x0D;

/// Record separator.
///
/// Separates consecutive frames inside a single reply buffer, for example an
/// echoed frame followed by its ACK/NAK frame.
pub const RS: u8 = 0x1E;

/// Unit separator, the field separator of the default variant.
pub const US: u8 = 0x1F;

// ============================================================================
// Field Widths
// ============================================================================

/// Width of the length field in hex digits.
pub const LENGTH_WIDTH: u8 = 4;

/// Width of the checksum field in hex digits.
pub const CHECKSUM_WIDTH: u8 = 8;

/// Largest width a hex field may declare (a full `u32`).
pub const MAX_HEX_WIDTH: u8 = 8;

/// Number of fields in a frame once the terminator is stripped.
pub const FIELD_COUNT: usize = 4;

/// Largest payload the 4-digit length field can describe.
///
/// Generating a frame with a longer payload is an unchecked precondition
/// violation: the length field falls back to zero and the frame will not
/// validate on the receiving side.
pub const MAX_PAYLOAD_LEN: usize = 0xFFFF;

// ============================================================================
// Message Type Tokens
// ============================================================================

/// Data frame token (unit-separated variant).
pub const TOKEN_SEND: &str = "PKSEND";

/// Echo frame token (unit-separated variant).
pub const TOKEN_ECHO: &str = "PKECHO";

/// Acknowledge / negative acknowledge token (both variants).
pub const TOKEN_ACKNAK: &str = "ACKNAK";

/// Data frame token (tab-separated variant).
pub const TOKEN_SEND_SHORT: &str = "SEND";

/// Echo frame token (tab-separated variant).
pub const TOKEN_ECHO_SHORT: &str = "ECHO";

// ============================================================================
// Embedding Markers
// ============================================================================

/// Opening byte of every embedding marker.
pub const MARKER_OPEN: u8 = b'{';

/// Closing byte of every embedding marker.
pub const MARKER_CLOSE: u8 = b'}';

/// Marker name for an embedded unit separator (`{US}`).
pub const MARKER_US: &str = "US";

/// Marker name for an embedded tab (`{TAB}`).
pub const MARKER_TAB: &str = "TAB";

/// Marker name for an embedded carriage return (`{CR}`).
pub const MARKER_CR: &str = "CR";

// ============================================================================
// Stream Limits
// ============================================================================

/// Default upper bound for a single candidate frame read from a stream.
///
/// A maximal payload plus the longest overhead fits comfortably below this.
pub const DEFAULT_MAX_CANDIDATE_LEN: usize = 80 * 1024;
