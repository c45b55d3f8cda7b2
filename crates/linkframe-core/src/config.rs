//! Wire format configuration.
//!
//! The frame format has been deployed in two variants that differ only in
//! their delimiters and token set. Both are expressed as a [`FrameConfig`]
//! rather than as separate implementations.
//!
//! | Variant          | Separator | Terminator | Tokens                     |
//! |------------------|-----------|------------|----------------------------|
//! | `unit_separated` | `0x1F`    | `\r`       | `PKSEND`, `PKECHO`, `ACKNAK` |
//! | `tab_separated`  | `\t`      | `\r`       | `SEND`, `ECHO`, `ACKNAK`     |
//!
//! # Example
//!
//! ```
//! use linkframe_core::FrameConfig;
//!
//! let config = FrameConfig::tab_separated();
//! config.validate().unwrap();
//! assert_eq!(config.min_frame_len(), 20);
//! ```

use crate::{Result, constants::*, error::Error};
use serde::{Deserialize, Serialize};

/// Delimiters, tokens and field widths of one protocol variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Byte between the four fields.
    pub separator: u8,

    /// Byte appended once at the end of every frame.
    pub terminator: u8,

    /// Byte between consecutive frames in a reply buffer, if any.
    pub record_separator: Option<u8>,

    /// Wire token of [`MessageType::Send`](crate::MessageType::Send).
    pub send_token: String,

    /// Wire token of [`MessageType::Echo`](crate::MessageType::Echo).
    pub echo_token: String,

    /// Wire token of [`MessageType::AckNak`](crate::MessageType::AckNak).
    pub acknak_token: String,

    /// Length field width in hex digits.
    pub length_width: u8,

    /// Checksum field width in hex digits.
    pub checksum_width: u8,

    /// Name inside the `{...}` marker that replaces an embedded separator.
    pub separator_marker: String,

    /// Name inside the `{...}` marker that replaces an embedded terminator.
    pub terminator_marker: String,
}

impl FrameConfig {
    /// Unit-separator variant (the default).
    pub fn unit_separated() -> Self {
        Self {
            separator: US,
            terminator: CR,
            record_separator: Some(RS),
            send_token: TOKEN_SEND.to_string(),
            echo_token: TOKEN_ECHO.to_string(),
            acknak_token: TOKEN_ACKNAK.to_string(),
            length_width: LENGTH_WIDTH,
            checksum_width: CHECKSUM_WIDTH,
            separator_marker: MARKER_US.to_string(),
            terminator_marker: MARKER_CR.to_string(),
        }
    }

    /// Tab-separated variant.
    pub fn tab_separated() -> Self {
        Self {
            separator: TAB,
            terminator: CR,
            record_separator: None,
            send_token: TOKEN_SEND_SHORT.to_string(),
            echo_token: TOKEN_ECHO_SHORT.to_string(),
            acknak_token: TOKEN_ACKNAK.to_string(),
            length_width: LENGTH_WIDTH,
            checksum_width: CHECKSUM_WIDTH,
            separator_marker: MARKER_TAB.to_string(),
            terminator_marker: MARKER_CR.to_string(),
        }
    }

    /// Check the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if:
    /// - separator, terminator and record separator are not pairwise distinct
    /// - separator or terminator is a marker brace (`{` or `}`)
    /// - a field width is outside `1..=8`
    /// - a token is empty, non-ASCII, duplicated (case-insensitively) or
    ///   contains a delimiter byte
    /// - a marker name is empty, not ASCII alphanumeric, or both names are equal
    pub fn validate(&self) -> Result<()> {
        if self.separator == self.terminator {
            return Err(Error::config(format!(
                "separator and terminator must differ (both 0x{:02x})",
                self.separator
            )));
        }
        for byte in [self.separator, self.terminator] {
            if byte == MARKER_OPEN || byte == MARKER_CLOSE {
                return Err(Error::config(format!(
                    "delimiter '{}' is reserved for embedding markers",
                    byte as char
                )));
            }
        }
        if let Some(rs) = self.record_separator
            && (rs == self.separator || rs == self.terminator)
        {
            return Err(Error::config(format!(
                "record separator 0x{rs:02x} collides with a field delimiter"
            )));
        }

        for (name, width) in [
            ("length", self.length_width),
            ("checksum", self.checksum_width),
        ] {
            if !(1..=MAX_HEX_WIDTH).contains(&width) {
                return Err(Error::config(format!(
                    "{name} width must be 1-{MAX_HEX_WIDTH}, got {width}"
                )));
            }
        }

        let tokens = self.tokens();
        for (i, token) in tokens.iter().enumerate() {
            if token.is_empty() || !token.is_ascii() {
                return Err(Error::config(format!(
                    "token '{token}' must be non-empty ASCII"
                )));
            }
            if token.bytes().any(|b| self.is_delimiter(b)) {
                return Err(Error::config(format!(
                    "token '{token}' contains a delimiter byte"
                )));
            }
            if tokens[i + 1..]
                .iter()
                .any(|other| other.eq_ignore_ascii_case(token))
            {
                return Err(Error::config(format!("token '{token}' is duplicated")));
            }
        }

        for marker in [&self.separator_marker, &self.terminator_marker] {
            if marker.is_empty() || !marker.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return Err(Error::config(format!(
                    "marker name '{marker}' must be non-empty ASCII alphanumeric"
                )));
            }
        }
        if self.separator_marker == self.terminator_marker {
            return Err(Error::config(format!(
                "separator and terminator markers are both '{}'",
                self.separator_marker
            )));
        }

        Ok(())
    }

    /// The three wire tokens in [`MessageType::KNOWN`](crate::MessageType::KNOWN) order.
    pub fn tokens(&self) -> [&str; 3] {
        [&self.send_token, &self.echo_token, &self.acknak_token]
    }

    /// Smallest byte length a frame can have (empty payload, shortest token).
    pub fn min_frame_len(&self) -> usize {
        let shortest = self.tokens().iter().map(|t| t.len()).min().unwrap_or(0);
        shortest + 3 + self.length_width as usize + self.checksum_width as usize + 1
    }

    /// Largest payload length the length field can express.
    pub fn max_payload_len(&self) -> usize {
        let max = (1u64 << (4 * u32::from(self.length_width.min(MAX_HEX_WIDTH)))) - 1;
        usize::try_from(max).unwrap_or(usize::MAX)
    }

    fn is_delimiter(&self, byte: u8) -> bool {
        byte == self.separator || byte == self.terminator || Some(byte) == self.record_separator
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self::unit_separated()
    }
}
