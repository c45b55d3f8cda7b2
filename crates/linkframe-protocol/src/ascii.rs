//! Readable rendering of raw link bytes.
//!
//! Line noise shows up as stray control characters and high-bit bytes.
//! [`pretty`] makes them visible in logs and diagnostics by replacing each
//! with its ASCII abbreviation in angle brackets.
//!
//! ```
//! use linkframe_protocol::ascii::pretty;
//!
//! assert_eq!(pretty(b"PKSEND\x1f0000\x1f\x1f00000000\r"), "PKSEND<US>0000<US><US>00000000<CR>");
//! assert_eq!(pretty(&[b'a', 0xE9]), "a<xE9>");
//! ```

/// Abbreviations of the C0 control codes, indexed by byte value.
const CONTROL_NAMES: [&str; 32] = [
    "NUL", "SOH", "STX", "ETX", "EOT", "ENQ", "ACK", "BEL", "BS", "HT", "LF", "VT", "FF", "CR",
    "SO", "SI", "DLE", "DC1", "DC2", "DC3", "DC4", "NAK", "SYN", "ETB", "CAN", "EM", "SUB", "ESC",
    "FS", "GS", "RS", "US",
];

/// Abbreviation of a control byte, or `None` for printable ASCII and
/// non-ASCII bytes.
pub fn control_name(byte: u8) -> Option<&'static str> {
    match byte {
        0x00..=0x1F => Some(CONTROL_NAMES[byte as usize]),
        0x7F => Some("DEL"),
        _ => None,
    }
}

/// Render bytes with control and non-ASCII bytes spelled out.
pub fn pretty(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &byte in bytes {
        match control_name(byte) {
            Some(name) => {
                out.push('<');
                out.push_str(name);
                out.push('>');
            }
            None if byte.is_ascii() => out.push(byte as char),
            None => out.push_str(&format!("<x{byte:02X}>")),
        }
    }
    out
}
