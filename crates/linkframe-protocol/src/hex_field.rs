//! Fixed-width hexadecimal fields.
//!
//! The length and checksum fields of a frame are unsigned integers carried
//! as zero-padded lowercase hex text of a fixed width. The width is a hard
//! structural constraint: it is what lets the parser locate both fields
//! without a separate length-of-length field.
//!
//! # Strict and Lenient Construction
//!
//! Every constructor comes in two flavours:
//!
//! - `try_*` returns [`Result`], with the precise reason on failure.
//! - `from_*` never fails. It returns a [`HexOutcome`] that either holds the
//!   requested field or records that the field fell back to zero, so a caller
//!   can tell a defaulted field apart from a genuine zero.
//!
//! ```
//! use linkframe_protocol::{BoundedHexField, HexOutcome};
//!
//! let len = BoundedHexField::try_from_int(5, 4).unwrap();
//! assert_eq!(len.text(), "0005");
//!
//! let bad = BoundedHexField::from_text("12g4", 4);
//! assert!(bad.is_defaulted());
//! assert_eq!(bad.into_field().text(), "0000");
//! ```

use linkframe_core::{Error, Result, constants::MAX_HEX_WIDTH};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use tracing::trace;

/// Bounded unsigned integer with a fixed-width hex rendering.
///
/// `text` is always exactly `width` lowercase hex digits and always encodes
/// `value`. Equality, ordering and hashing look at `value` only.
///
/// Deserialization goes through [`try_from_text`](Self::try_from_text), so a
/// serialized field whose parts disagree is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "HexFieldRepr")]
pub struct BoundedHexField {
    value: u32,
    width: u8,
    text: String,
}

impl BoundedHexField {
    /// The zero default for a field of `width` digits.
    ///
    /// Widths outside `1..=8` are clamped.
    pub fn zero(width: u8) -> Self {
        let width = width.clamp(1, MAX_HEX_WIDTH);
        Self {
            value: 0,
            width,
            text: "0".repeat(width as usize),
        }
    }

    /// Half-open range of values representable in `width` digits.
    pub fn full_range(width: u8) -> Range<u64> {
        0..(1u64 << (4 * u32::from(width.min(MAX_HEX_WIDTH))))
    }

    /// Build a field from an integer.
    ///
    /// # Errors
    ///
    /// - `Error::HexInvalidWidth` if `width` is outside `1..=8`
    /// - `Error::HexOutOfRange` if `value` does not fit in `width` digits
    pub fn try_from_int(value: u64, width: u8) -> Result<Self> {
        check_width(width)?;
        let range = Self::full_range(width);
        if !range.contains(&value) {
            return Err(Error::HexOutOfRange {
                value,
                min: range.start,
                max: range.end,
            });
        }
        // range.end <= 2^32, so the value fits
        let value = value as u32;
        Ok(Self {
            value,
            width,
            text: format!("{:0w$x}", value, w = width as usize),
        })
    }

    /// Build a field from hex text.
    ///
    /// Accepts upper- or lowercase digits; shorter text is zero-padded and
    /// the stored rendering is always lowercase.
    ///
    /// # Errors
    ///
    /// - `Error::HexInvalidWidth` if `width` is outside `1..=8`
    /// - `Error::HexInvalidText` if `text` is empty, longer than `width`, or
    ///   contains a non-hex character
    pub fn try_from_text(text: &str, width: u8) -> Result<Self> {
        check_width(width)?;
        if text.is_empty() || text.len() > width as usize || !is_hex(text.as_bytes()) {
            return Err(Error::HexInvalidText {
                text: text.to_string(),
                width,
            });
        }
        let value = u64::from_str_radix(text, 16).map_err(|_| Error::HexInvalidText {
            text: text.to_string(),
            width,
        })?;
        Self::try_from_int(value, width)
    }

    /// Lenient [`try_from_int`](Self::try_from_int).
    pub fn from_int(value: u64, width: u8) -> HexOutcome {
        HexOutcome::new(Self::try_from_int(value, width), width)
    }

    /// Lenient [`try_from_text`](Self::try_from_text).
    pub fn from_text(text: &str, width: u8) -> HexOutcome {
        HexOutcome::new(Self::try_from_text(text, width), width)
    }

    /// Require the value to lie in `bounds` (half-open).
    ///
    /// # Errors
    ///
    /// Returns `Error::HexOutOfRange` if the value is outside `bounds`.
    pub fn within(self, bounds: Range<u64>) -> Result<Self> {
        if bounds.contains(&u64::from(self.value)) {
            Ok(self)
        } else {
            Err(Error::HexOutOfRange {
                value: u64::from(self.value),
                min: bounds.start,
                max: bounds.end,
            })
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    /// Zero-padded lowercase hex rendering.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}

#[derive(Deserialize)]
struct HexFieldRepr {
    value: u32,
    width: u8,
    text: String,
}

impl TryFrom<HexFieldRepr> for BoundedHexField {
    type Error = Error;

    fn try_from(repr: HexFieldRepr) -> Result<Self> {
        let field = Self::try_from_text(&repr.text, repr.width)?;
        if field.text != repr.text || field.value != repr.value {
            return Err(Error::HexInvalidText {
                text: repr.text,
                width: repr.width,
            });
        }
        Ok(field)
    }
}

/// True if every byte is an ASCII hex digit.
///
/// Empty input is vacuously hex; callers that need a digit check the length.
pub fn is_hex(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_hexdigit)
}

fn check_width(width: u8) -> Result<()> {
    if (1..=MAX_HEX_WIDTH).contains(&width) {
        Ok(())
    } else {
        Err(Error::HexInvalidWidth {
            width,
            max: MAX_HEX_WIDTH,
        })
    }
}

impl PartialEq for BoundedHexField {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for BoundedHexField {}

impl PartialOrd for BoundedHexField {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BoundedHexField {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl Hash for BoundedHexField {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl From<BoundedHexField> for u32 {
    fn from(field: BoundedHexField) -> Self {
        field.value
    }
}

impl fmt::Display for BoundedHexField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:5}\t0x{}", self.value, self.text)
    }
}

/// Result of a lenient hex field constructor.
#[derive(Debug)]
pub enum HexOutcome {
    /// The requested value was representable.
    Valid(BoundedHexField),
    /// The input was rejected and the field fell back to zero.
    Defaulted {
        field: BoundedHexField,
        cause: Error,
    },
}

impl HexOutcome {
    fn new(result: Result<BoundedHexField>, width: u8) -> Self {
        match result {
            Ok(field) => HexOutcome::Valid(field),
            Err(cause) => {
                trace!(%cause, width, "hex field defaulted to zero");
                HexOutcome::Defaulted {
                    field: BoundedHexField::zero(width),
                    cause,
                }
            }
        }
    }

    /// Apply a range check; an out-of-range value becomes `Defaulted`.
    pub fn within(self, bounds: Range<u64>) -> Self {
        match self {
            HexOutcome::Valid(field) => {
                let width = field.width;
                HexOutcome::new(field.within(bounds), width)
            }
            defaulted => defaulted,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, HexOutcome::Defaulted { .. })
    }

    /// The reason the field was defaulted, if it was.
    pub fn cause(&self) -> Option<&Error> {
        match self {
            HexOutcome::Valid(_) => None,
            HexOutcome::Defaulted { cause, .. } => Some(cause),
        }
    }

    /// The field, or its zero default.
    pub fn into_field(self) -> BoundedHexField {
        match self {
            HexOutcome::Valid(field) | HexOutcome::Defaulted { field, .. } => field,
        }
    }

    /// Convert back into a strict result.
    pub fn into_result(self) -> Result<BoundedHexField> {
        match self {
            HexOutcome::Valid(field) => Ok(field),
            HexOutcome::Defaulted { cause, .. } => Err(cause),
        }
    }
}
