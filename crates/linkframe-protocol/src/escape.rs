//! Embedding one frame inside the payload of another.
//!
//! An echo reply carries the frame it received as its own payload. Without
//! escaping, the inner frame's separators and terminator would be taken for
//! the outer frame's structure. [`embed`] replaces them with textual markers
//! and [`extract`] restores them:
//!
//! | Byte            | Marker (unit variant) | Marker (tab variant) |
//! |-----------------|-----------------------|----------------------|
//! | separator       | `{US}`                | `{TAB}`              |
//! | terminator      | `{CR}`                | `{CR}`               |
//! | `{`             | `{{`                  | `{{`                 |
//!
//! Doubling the opening brace keeps the transform lossless for every input,
//! including payloads that already contain marker text. Input without `{`
//! is escaped exactly as by the plain `{US}`/`{CR}` substitution.
//!
//! ```
//! use linkframe_core::FrameConfig;
//! use linkframe_protocol::escape::{embed, extract};
//!
//! let config = FrameConfig::default();
//! let inner = b"PKSEND\x1f0002\x1fhi\x1fd8932aac\r";
//!
//! let embedded = embed(&config, inner);
//! assert_eq!(embedded, b"PKSEND{US}0002{US}hi{US}d8932aac{CR}");
//! assert_eq!(extract(&config, &embedded), inner);
//! ```

use linkframe_core::{
    FrameConfig,
    constants::{MARKER_CLOSE, MARKER_OPEN},
};

/// Replace separator, terminator and `{` bytes with markers.
///
/// The result never contains the configured separator or terminator.
pub fn embed(config: &FrameConfig, input: &[u8]) -> Vec<u8> {
    let sep_marker = marker(&config.separator_marker);
    let term_marker = marker(&config.terminator_marker);

    let mut out = Vec::with_capacity(input.len() + input.len() / 8);
    for &byte in input {
        if byte == MARKER_OPEN {
            out.extend_from_slice(&[MARKER_OPEN, MARKER_OPEN]);
        } else if byte == config.separator {
            out.extend_from_slice(&sep_marker);
        } else if byte == config.terminator {
            out.extend_from_slice(&term_marker);
        } else {
            out.push(byte);
        }
    }
    out
}

/// Inverse of [`embed`].
///
/// A `{` that starts neither `{{` nor a known marker is kept as is, so text
/// that was never embedded passes through unchanged apart from its markers.
pub fn extract(config: &FrameConfig, input: &[u8]) -> Vec<u8> {
    let sep_marker = marker(&config.separator_marker);
    let term_marker = marker(&config.terminator_marker);

    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let rest = &input[i..];
        if rest[0] != MARKER_OPEN {
            out.push(rest[0]);
            i += 1;
        } else if rest.get(1) == Some(&MARKER_OPEN) {
            out.push(MARKER_OPEN);
            i += 2;
        } else if rest.starts_with(&sep_marker) {
            out.push(config.separator);
            i += sep_marker.len();
        } else if rest.starts_with(&term_marker) {
            out.push(config.terminator);
            i += term_marker.len();
        } else {
            out.push(MARKER_OPEN);
            i += 1;
        }
    }
    out
}

fn marker(name: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(name.len() + 2);
    bytes.push(MARKER_OPEN);
    bytes.extend_from_slice(name.as_bytes());
    bytes.push(MARKER_CLOSE);
    bytes
}
