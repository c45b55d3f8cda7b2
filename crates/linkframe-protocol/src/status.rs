//! Field-by-field diagnosis of a parsed frame.
//!
//! Parsing a candidate frame never fails with an error. Instead every check
//! the parser performs is recorded in a [`ValidationStatus`], together with
//! the measured length of the frame and of each of its fields. A bit-error
//! test can then tell dropped bytes (length mismatch) from corrupted bytes
//! (checksum mismatch) from framing damage (structural rejection).
//!
//! # Wire Form
//!
//! A status can be sent back over the same narrow link that carried the
//! frame. The five lengths come first, then the ten check flags:
//!
//! ```text
//! <frame>,<token>,<length>,<payload>,<checksum>;<f0>,<f1>,...,<f9>
//! 27,6,4,5,8;T,T,T,T,T,T,T,T,T,T
//! ```
//!
//! Flags use the [`Check`] characters `x` (unknown), `T`, `F` and `e`.

use linkframe_core::{Check, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Separator between the length block and the flag block.
const BLOCK_SEPARATOR: &str = ";";

/// Separator between entries inside a block.
const ENTRY_SEPARATOR: &str = ",";

/// The ten checks performed on a candidate frame, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Type token is one of the configured tokens.
    TypeToken,
    /// Frame ends with the terminator.
    Terminator,
    /// Exactly four fields.
    FieldCount,
    /// Frame is at least the minimum frame size and, on a stream, within the
    /// candidate size limit.
    FrameLength,
    /// Length field has its fixed width.
    LengthWidth,
    /// Checksum field has its fixed width.
    ChecksumWidth,
    /// Declared length equals the payload length.
    PayloadLength,
    /// Length field is hex.
    LengthHex,
    /// Checksum field is hex.
    ChecksumHex,
    /// Computed CRC-32 equals the declared checksum.
    Checksum,
}

impl CheckKind {
    pub const ALL: [CheckKind; 10] = [
        CheckKind::TypeToken,
        CheckKind::Terminator,
        CheckKind::FieldCount,
        CheckKind::FrameLength,
        CheckKind::LengthWidth,
        CheckKind::ChecksumWidth,
        CheckKind::PayloadLength,
        CheckKind::LengthHex,
        CheckKind::ChecksumHex,
        CheckKind::Checksum,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::TypeToken => "type token",
            CheckKind::Terminator => "terminator",
            CheckKind::FieldCount => "field count",
            CheckKind::FrameLength => "frame length",
            CheckKind::LengthWidth => "length width",
            CheckKind::ChecksumWidth => "checksum width",
            CheckKind::PayloadLength => "payload length",
            CheckKind::LengthHex => "length hex",
            CheckKind::ChecksumHex => "checksum hex",
            CheckKind::Checksum => "checksum",
        }
    }

    /// Human-readable statement of the rule.
    pub fn rule(&self) -> &'static str {
        match self {
            CheckKind::TypeToken => "type token must be a configured token",
            CheckKind::Terminator => "frame must end with the terminator",
            CheckKind::FieldCount => "must be exactly four separated fields",
            CheckKind::FrameLength => "must be between the minimum and maximum frame size",
            CheckKind::LengthWidth => "length field must have its fixed width",
            CheckKind::ChecksumWidth => "checksum field must have its fixed width",
            CheckKind::PayloadLength => "payload must agree with declared length",
            CheckKind::LengthHex => "length contains only hex digits",
            CheckKind::ChecksumHex => "checksum contains only hex digits",
            CheckKind::Checksum => "computed crc matches crc in frame",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Measured byte lengths of a candidate frame and its fields.
///
/// Field lengths stay zero when the frame was rejected before it was split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameLengths {
    pub frame: usize,
    pub token: usize,
    pub length: usize,
    pub payload: usize,
    pub checksum: usize,
}

/// Coarse classification of a validation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnosis {
    /// Every check passed.
    Valid,
    /// Too short or too long, unterminated, or wrong field count.
    Rejected,
    /// Unknown token or a badly shaped length/checksum field.
    MalformedHeader,
    /// Payload length disagrees with the length field (dropped or inserted bytes).
    LengthMismatch,
    /// Payload corrupted in place.
    ChecksumMismatch,
}

/// Result of every check performed while parsing one candidate frame.
///
/// A fresh status has every check [`Check::Unknown`] and is never valid.
///
/// # Example
///
/// ```
/// use linkframe_protocol::{CheckKind, ValidationStatus};
///
/// let status: ValidationStatus = "27,6,4,5,8;T,T,T,T,T,T,T,T,T,F".parse().unwrap();
/// assert!(!status.is_valid());
/// assert_eq!(status.failed_checks(), vec![CheckKind::Checksum]);
/// assert_eq!(status.lengths().payload, 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStatus {
    lengths: FrameLengths,
    checks: [Check; 10],
}

impl ValidationStatus {
    /// All checks unknown, all lengths zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical AND of the ten checks. Unknown counts as failing.
    pub fn is_valid(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }

    pub fn check(&self, kind: CheckKind) -> Check {
        self.checks[kind.index()]
    }

    /// Every check paired with its outcome, in wire order.
    pub fn checks(&self) -> impl Iterator<Item = (CheckKind, Check)> + '_ {
        CheckKind::ALL.iter().map(|kind| (*kind, self.check(*kind)))
    }

    /// Checks that did not pass, including unevaluated ones.
    pub fn failed_checks(&self) -> Vec<CheckKind> {
        self.checks()
            .filter(|(_, check)| !check.passed())
            .map(|(kind, _)| kind)
            .collect()
    }

    pub fn lengths(&self) -> FrameLengths {
        self.lengths
    }

    /// Reduce the checks to the kind of damage they indicate.
    pub fn classify(&self) -> Diagnosis {
        let all_pass = |kinds: &[CheckKind]| kinds.iter().all(|k| self.check(*k).passed());

        if self.is_valid() {
            Diagnosis::Valid
        } else if !all_pass(&[
            CheckKind::FrameLength,
            CheckKind::Terminator,
            CheckKind::FieldCount,
        ]) {
            Diagnosis::Rejected
        } else if !all_pass(&[
            CheckKind::TypeToken,
            CheckKind::LengthWidth,
            CheckKind::ChecksumWidth,
            CheckKind::LengthHex,
            CheckKind::ChecksumHex,
        ]) {
            Diagnosis::MalformedHeader
        } else if !self.check(CheckKind::PayloadLength).passed() {
            Diagnosis::LengthMismatch
        } else {
            Diagnosis::ChecksumMismatch
        }
    }

    /// Encode as `lengths;flags` for transmission over the link.
    pub fn serialize(&self) -> String {
        let l = &self.lengths;
        let flags: Vec<String> = self.checks.iter().map(Check::to_string).collect();
        format!(
            "{},{},{},{},{}{}{}",
            l.frame,
            l.token,
            l.length,
            l.payload,
            l.checksum,
            BLOCK_SEPARATOR,
            flags.join(ENTRY_SEPARATOR)
        )
    }

    /// Decode a serialized status, falling back to the all-unknown status
    /// when the text is malformed.
    pub fn deserialize(text: &str) -> Self {
        text.parse().unwrap_or_else(|e: Error| {
            debug!(error = %e, "discarding malformed validation status");
            Self::default()
        })
    }

    pub(crate) fn set(&mut self, kind: CheckKind, check: impl Into<Check>) {
        self.checks[kind.index()] = check.into();
    }

    pub(crate) fn lengths_mut(&mut self) -> &mut FrameLengths {
        &mut self.lengths
    }
}

impl FromStr for ValidationStatus {
    type Err = Error;

    /// Strictly decode a serialized status.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedStatus` if the text does not have exactly two
    /// blocks, five numeric lengths and ten flags.
    fn from_str(text: &str) -> Result<Self> {
        let blocks: Vec<&str> = text.trim().split(BLOCK_SEPARATOR).collect();
        let [nums, flags] = blocks[..] else {
            return Err(Error::malformed_status(format!(
                "expected 2 blocks, got {}",
                blocks.len()
            )));
        };

        let nums = nums
            .split(ENTRY_SEPARATOR)
            .map(|n| {
                n.trim()
                    .parse::<usize>()
                    .map_err(|_| Error::malformed_status(format!("length '{n}' is not a number")))
            })
            .collect::<Result<Vec<usize>>>()?;
        let [frame, token, length, payload, checksum] = nums[..] else {
            return Err(Error::malformed_status(format!(
                "expected 5 lengths, got {}",
                nums.len()
            )));
        };

        let flags: Vec<Check> = flags.split(ENTRY_SEPARATOR).map(Check::from_text).collect();
        let checks: [Check; 10] = flags.try_into().map_err(|f: Vec<Check>| {
            Error::malformed_status(format!("expected 10 flags, got {}", f.len()))
        })?;

        Ok(Self {
            lengths: FrameLengths {
                frame,
                token,
                length,
                payload,
                checksum,
            },
            checks,
        })
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l = &self.lengths;
        for (label, len) in [
            ("len of frame", l.frame),
            ("len of token", l.token),
            ("len of length", l.length),
            ("len of payload", l.payload),
            ("len of checksum", l.checksum),
        ] {
            writeln!(f, "{label:.<18}>  {len}  bytes")?;
        }
        for (kind, check) in self.checks() {
            writeln!(f, "{:.<18}>  {}  {}", kind.name(), check, kind.rule())?;
        }
        Ok(())
    }
}
