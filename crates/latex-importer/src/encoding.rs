//! Declared text encodings and decoding of raw LaTeX buffers.
//!
//! A caller hands the parser raw bytes together with a declared encoding.
//! Decoding never fails: byte sequences that are invalid under the declared
//! encoding are replaced by U+FFFD so that one bad byte cannot abort a whole
//! conversion. Supported encodings:
//! - UTF-8 (with and without BOM)
//! - UTF-16 (LE and BE)
//! - UTF-32 (LE and BE)
//! - Any WHATWG legacy encoding known to `encoding_rs` (ISO-8859-1,
//!   Windows-1252, Mac Roman, ...)
//! - Automatic detection via BOM, UTF-8 validation and `chardetng`

use std::borrow::Cow;
use std::fmt;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

use crate::error::{LatexError, Result};

/// Text encoding declared for a LaTeX buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// Detect the encoding from the buffer contents
    Auto,
    /// UTF-8; a leading BOM is skipped
    #[default]
    Utf8,
    /// UTF-16 Little Endian
    Utf16Le,
    /// UTF-16 Big Endian
    Utf16Be,
    /// UTF-32 Little Endian
    Utf32Le,
    /// UTF-32 Big Endian
    Utf32Be,
    /// Legacy single or multi byte encoding (e.g., ISO-8859-1, Windows-1252)
    Legacy(&'static Encoding),
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Auto => write!(f, "auto"),
            TextEncoding::Utf8 => write!(f, "UTF-8"),
            TextEncoding::Utf16Le => write!(f, "UTF-16LE"),
            TextEncoding::Utf16Be => write!(f, "UTF-16BE"),
            TextEncoding::Utf32Le => write!(f, "UTF-32LE"),
            TextEncoding::Utf32Be => write!(f, "UTF-32BE"),
            TextEncoding::Legacy(enc) => write!(f, "{}", enc.name()),
        }
    }
}

/// UTF-8 BOM: EF BB BF
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
/// UTF-16 LE BOM: FF FE
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
/// UTF-16 BE BOM: FE FF
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];
/// UTF-32 LE BOM: FF FE 00 00
const UTF32_LE_BOM: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
/// UTF-32 BE BOM: 00 00 FE FF
const UTF32_BE_BOM: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

impl TextEncoding {
    /// Resolve an encoding label such as `"utf-8"`, `"latin1"` or `"auto"`.
    ///
    /// Labels are matched case-insensitively. Anything that is not one of the
    /// Unicode encodings handled here is looked up in the WHATWG label table.
    ///
    /// # Errors
    ///
    /// Returns [`LatexError::UnknownEncoding`] if the label is not recognized.
    pub fn from_label(label: &str) -> Result<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "auto" | "detect" => return Ok(TextEncoding::Auto),
            "utf-32" | "utf32" | "utf-32le" | "utf32le" => return Ok(TextEncoding::Utf32Le),
            "utf-32be" | "utf32be" => return Ok(TextEncoding::Utf32Be),
            "utf8" => return Ok(TextEncoding::Utf8),
            _ => {}
        }

        Encoding::for_label(normalized.as_bytes())
            .map(Self::from_encoding)
            .ok_or_else(|| LatexError::UnknownEncoding(label.to_string()))
    }

    /// Map an `encoding_rs` encoding onto the declared encoding it stands for.
    #[must_use]
    pub fn from_encoding(encoding: &'static Encoding) -> Self {
        if encoding == UTF_8 {
            TextEncoding::Utf8
        } else if encoding == UTF_16LE {
            TextEncoding::Utf16Le
        } else if encoding == UTF_16BE {
            TextEncoding::Utf16Be
        } else {
            TextEncoding::Legacy(encoding)
        }
    }

    /// Decode `buffer` into a UTF-8 string.
    ///
    /// Invalid sequences become U+FFFD. A BOM matching the declared encoding
    /// is skipped. [`TextEncoding::Auto`] detects the encoding first.
    #[must_use]
    pub fn decode<'a>(&self, buffer: &'a [u8]) -> Cow<'a, str> {
        match self {
            TextEncoding::Auto => {
                let detected = detect_encoding(buffer);
                log::debug!("Detected LaTeX source encoding: {detected}");
                detected.decode(buffer)
            }
            TextEncoding::Utf8 => {
                let data = buffer.strip_prefix(UTF8_BOM).unwrap_or(buffer);
                let text = String::from_utf8_lossy(data);
                if matches!(text, Cow::Owned(_)) {
                    log::warn!("Replaced invalid UTF-8 sequences with U+FFFD");
                }
                text
            }
            TextEncoding::Utf16Le => {
                decode_with(UTF_16LE, buffer.strip_prefix(UTF16_LE_BOM).unwrap_or(buffer))
            }
            TextEncoding::Utf16Be => {
                decode_with(UTF_16BE, buffer.strip_prefix(UTF16_BE_BOM).unwrap_or(buffer))
            }
            TextEncoding::Utf32Le => Cow::Owned(decode_utf32(
                buffer.strip_prefix(UTF32_LE_BOM).unwrap_or(buffer),
                u32::from_le_bytes,
            )),
            TextEncoding::Utf32Be => Cow::Owned(decode_utf32(
                buffer.strip_prefix(UTF32_BE_BOM).unwrap_or(buffer),
                u32::from_be_bytes,
            )),
            TextEncoding::Legacy(enc) => decode_with(*enc, buffer),
        }
    }
}

fn decode_with<'a>(encoding: &'static Encoding, data: &'a [u8]) -> Cow<'a, str> {
    let (text, had_errors) = encoding.decode_without_bom_handling(data);
    if had_errors {
        log::warn!(
            "Replaced bytes not valid in {} with U+FFFD",
            encoding.name()
        );
    }
    text
}

/// Decode UTF-32 code units; a trailing partial unit is dropped.
fn decode_utf32(data: &[u8], to_u32: fn([u8; 4]) -> u32) -> String {
    let mut result = String::with_capacity(data.len() / 4);
    let mut replaced = false;
    for chunk in data.chunks_exact(4) {
        let codepoint = to_u32([chunk[0], chunk[1], chunk[2], chunk[3]]);
        if let Some(c) = char::from_u32(codepoint) {
            result.push(c);
        } else {
            result.push(char::REPLACEMENT_CHARACTER);
            replaced = true;
        }
    }
    if replaced {
        log::warn!("Replaced invalid UTF-32 code points with U+FFFD");
    }
    result
}

/// Detect the encoding of a byte buffer.
///
/// Detection priority:
/// 1. BOM (Byte Order Mark)
/// 2. Null byte patterns of BOM-less UTF-16
/// 3. UTF-8 validation
/// 4. `chardetng` statistical detection for legacy encodings
#[must_use]
pub fn detect_encoding(buffer: &[u8]) -> TextEncoding {
    if let Some(encoding) = detect_bom(buffer) {
        return encoding;
    }

    if let Some(encoding) = detect_utf16_without_bom(buffer) {
        return encoding;
    }

    if std::str::from_utf8(buffer).is_ok() {
        return TextEncoding::Utf8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(buffer, true);
    let (encoding, _confident) = detector.guess_assess(None, true);
    TextEncoding::from_encoding(encoding)
}

fn detect_bom(buffer: &[u8]) -> Option<TextEncoding> {
    // UTF-32 LE starts with the UTF-16 LE BOM, so it must be checked first
    if buffer.starts_with(UTF32_LE_BOM) {
        Some(TextEncoding::Utf32Le)
    } else if buffer.starts_with(UTF32_BE_BOM) {
        Some(TextEncoding::Utf32Be)
    } else if buffer.starts_with(UTF8_BOM) {
        Some(TextEncoding::Utf8)
    } else if buffer.starts_with(UTF16_LE_BOM) {
        Some(TextEncoding::Utf16Le)
    } else if buffer.starts_with(UTF16_BE_BOM) {
        Some(TextEncoding::Utf16Be)
    } else {
        None
    }
}

/// ASCII text in UTF-16 has a null byte in every other position.
fn detect_utf16_without_bom(buffer: &[u8]) -> Option<TextEncoding> {
    let total_pairs = buffer.len() / 2;
    if total_pairs <= 4 {
        return None;
    }

    let nulls_at_odd = buffer.iter().skip(1).step_by(2).filter(|&&b| b == 0).count();
    let nulls_at_even = buffer.iter().step_by(2).filter(|&&b| b == 0).count();

    if nulls_at_odd > total_pairs * 3 / 4 && nulls_at_even < total_pairs / 4 {
        Some(TextEncoding::Utf16Le)
    } else if nulls_at_even > total_pairs * 3 / 4 && nulls_at_odd < total_pairs / 4 {
        Some(TextEncoding::Utf16Be)
    } else {
        None
    }
}
