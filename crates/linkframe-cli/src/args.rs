//! Command-line argument decoding.
//!
//! Frames contain control bytes that cannot be typed on a command line, so
//! byte arguments accept backslash escapes:
//!
//! | Escape | Byte      |
//! |--------|-----------|
//! | `\t`   | `0x09`    |
//! | `\r`   | `0x0D`    |
//! | `\n`   | `0x0A`    |
//! | `\\`   | `\`       |
//! | `\xHH` | `0xHH`    |

use anyhow::{Context, Result, anyhow, bail};
use clap::ValueEnum;
use linkframe_core::{FrameConfig, MessageType};
use std::path::Path;

/// Wire variant presets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// `0x1F` separator, `PKSEND`/`PKECHO`/`ACKNAK`.
    #[default]
    Unit,
    /// Tab separator, `SEND`/`ECHO`/`ACKNAK`.
    Tab,
}

impl Variant {
    pub fn config(self) -> FrameConfig {
        match self {
            Variant::Unit => FrameConfig::unit_separated(),
            Variant::Tab => FrameConfig::tab_separated(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    #[default]
    Send,
    Echo,
    Acknak,
}

impl From<Kind> for MessageType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Send => MessageType::Send,
            Kind::Echo => MessageType::Echo,
            Kind::Acknak => MessageType::AckNak,
        }
    }
}

/// Load a JSON frame configuration, or fall back to the variant preset.
pub fn load_config(path: Option<&Path>, variant: Variant) -> Result<FrameConfig> {
    let Some(path) = path else {
        return Ok(variant.config());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: FrameConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Decode backslash escapes into raw bytes.
pub fn unescape(text: &str) -> Result<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let escape = *bytes
            .get(i + 1)
            .ok_or_else(|| anyhow!("trailing backslash at offset {i}"))?;
        match escape {
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            b'n' => out.push(b'\n'),
            b'\\' => out.push(b'\\'),
            b'x' => {
                let hex = bytes
                    .get(i + 2..i + 4)
                    .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .ok_or_else(|| anyhow!("\\x escape at offset {i} needs two hex digits"))?;
                let byte = u8::from_str_radix(hex, 16)
                    .with_context(|| format!("bad \\x escape '{hex}' at offset {i}"))?;
                out.push(byte);
                i += 2;
            }
            other => bail!("unknown escape '\\{}' at offset {i}", other as char),
        }
        i += 2;
    }

    Ok(out)
}
