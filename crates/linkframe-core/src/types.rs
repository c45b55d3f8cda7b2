use crate::config::FrameConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical role of a frame, carried as the leading type token.
///
/// The wire tokens themselves are configuration: the unit-separated variant
/// uses `PKSEND`/`PKECHO`/`ACKNAK`, the tab-separated variant
/// `SEND`/`ECHO`/`ACKNAK`. Unrecognised tokens never raise; they map to
/// [`MessageType::Unknown`].
///
/// # Example
///
/// ```
/// use linkframe_core::{FrameConfig, MessageType};
///
/// let config = FrameConfig::default();
/// assert_eq!(MessageType::from_token("pkecho", &config), MessageType::Echo);
/// assert_eq!(MessageType::from_token("BOGUS", &config), MessageType::Unknown);
/// assert_eq!(MessageType::Unknown.token(&config), "PKSEND");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Data frame sent by the test driver.
    #[default]
    Send,
    /// A received frame reflected back to its sender.
    Echo,
    /// Acknowledge / negative acknowledge.
    AckNak,
    /// Token not in the configured set.
    Unknown,
}

impl MessageType {
    /// All recognised variants, in wire-token order.
    pub const KNOWN: [MessageType; 3] = [MessageType::Send, MessageType::Echo, MessageType::AckNak];

    /// Map a wire token to its message type (case-insensitive).
    pub fn from_token(token: &str, config: &FrameConfig) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|kind| kind.token(config).eq_ignore_ascii_case(token))
            .unwrap_or(MessageType::Unknown)
    }

    /// Canonical uppercase wire token.
    ///
    /// `Unknown` has no token of its own and renders as the default type.
    pub fn token<'a>(&self, config: &'a FrameConfig) -> &'a str {
        match self {
            MessageType::Send | MessageType::Unknown => &config.send_token,
            MessageType::Echo => &config.echo_token,
            MessageType::AckNak => &config.acknak_token,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, MessageType::Unknown)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            MessageType::Send => "send",
            MessageType::Echo => "echo",
            MessageType::AckNak => "acknak",
            MessageType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Outcome of a single validation check.
///
/// A check starts out [`Check::Unknown`] and only becomes [`Check::Pass`] or
/// [`Check::Fail`] once it has actually been evaluated, so an early rejection
/// is distinguishable from an executed-and-failed check. [`Check::Malformed`]
/// marks a flag that could not be decoded from a serialized status.
///
/// # Wire Characters
///
/// | Variant     | Char |
/// |-------------|------|
/// | `Unknown`   | `x`  |
/// | `Pass`      | `T`  |
/// | `Fail`      | `F`  |
/// | `Malformed` | `e`  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Check {
    #[default]
    #[serde(rename = "x")]
    Unknown,
    #[serde(rename = "T")]
    Pass,
    #[serde(rename = "F")]
    Fail,
    #[serde(rename = "e")]
    Malformed,
}

impl Check {
    /// Record the result of an evaluated check.
    #[must_use]
    pub fn from_bool(passed: bool) -> Self {
        if passed { Check::Pass } else { Check::Fail }
    }

    /// Decode a flag from its wire text.
    ///
    /// Only the first character is significant and matching is
    /// case-insensitive. Empty text decodes as `Unknown`, anything
    /// unrecognised as `Malformed`.
    pub fn from_text(text: &str) -> Self {
        match text.chars().next().map(|c| c.to_ascii_lowercase()) {
            None => Check::Unknown,
            Some('x') => Check::Unknown,
            Some('t') => Check::Pass,
            Some('f') => Check::Fail,
            Some('e') => Check::Malformed,
            Some(_) => Check::Malformed,
        }
    }

    #[must_use]
    pub fn as_char(&self) -> char {
        match self {
            Check::Unknown => 'x',
            Check::Pass => 'T',
            Check::Fail => 'F',
            Check::Malformed => 'e',
        }
    }

    /// True only for an evaluated, passing check.
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(self, Check::Pass)
    }

    /// True once the check holds a definite pass/fail result.
    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        matches!(self, Check::Pass | Check::Fail)
    }
}

impl From<bool> for Check {
    fn from(passed: bool) -> Self {
        Check::from_bool(passed)
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("PKSEND", MessageType::Send)]
    #[case("pksend", MessageType::Send)]
    #[case("PkEcHo", MessageType::Echo)]
    #[case("ACKNAK", MessageType::AckNak)]
    #[case("SEND", MessageType::Unknown)]
    #[case("", MessageType::Unknown)]
    fn test_message_type_from_token(#[case] token: &str, #[case] expected: MessageType) {
        let config = FrameConfig::unit_separated();
        assert_eq!(MessageType::from_token(token, &config), expected);
    }

    #[test]
    fn test_message_type_tab_variant_tokens() {
        let config = FrameConfig::tab_separated();
        assert_eq!(MessageType::from_token("send", &config), MessageType::Send);
        assert_eq!(MessageType::Echo.token(&config), "ECHO");
        assert_eq!(MessageType::from_token("PKSEND", &config), MessageType::Unknown);
    }

    #[test]
    fn test_unknown_renders_default_token() {
        let config = FrameConfig::default();
        assert_eq!(MessageType::Unknown.token(&config), config.send_token);
        assert!(!MessageType::Unknown.is_known());
        assert!(MessageType::AckNak.is_known());
    }

    #[rstest]
    #[case("", Check::Unknown)]
    #[case("x", Check::Unknown)]
    #[case("T", Check::Pass)]
    #[case("t", Check::Pass)]
    #[case("F", Check::Fail)]
    #[case("E", Check::Malformed)]
    #[case("?", Check::Malformed)]
    #[case("True", Check::Pass)]
    fn test_check_from_text(#[case] text: &str, #[case] expected: Check) {
        assert_eq!(Check::from_text(text), expected);
    }

    #[test]
    fn test_check_truthiness() {
        assert!(Check::Pass.passed());
        assert!(!Check::Fail.passed());
        assert!(!Check::Unknown.passed());
        assert!(!Check::Malformed.passed());

        assert!(Check::Fail.is_evaluated());
        assert!(!Check::Unknown.is_evaluated());
    }

    #[test]
    fn test_check_char_roundtrip() {
        for check in [Check::Unknown, Check::Pass, Check::Fail, Check::Malformed] {
            assert_eq!(Check::from_text(&check.to_string()), check);
        }
    }

    #[test]
    fn test_check_serde_uses_wire_chars() {
        let json = serde_json::to_string(&Check::Pass).unwrap();
        assert_eq!(json, "\"T\"");
        let back: Check = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(back, Check::Unknown);
    }
}
