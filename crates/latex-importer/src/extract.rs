//! Brace-balanced argument extraction.
//!
//! All delimiters involved (`\`, `{`, `}`, `[`, `]`) are ASCII, so the
//! extractor walks bytes; UTF-8 continuation bytes never match them and every
//! slice boundary it produces falls on an ASCII delimiter.

/// Argument text following a command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentSpan<'a> {
    /// Text strictly between the outer braces
    pub text: &'a str,
    /// Offset just past the closing brace (end of input if unterminated)
    pub end: usize,
    /// Whether the closing brace was found
    pub terminated: bool,
}

/// Extract the brace-delimited argument starting at or after `pos`.
///
/// Whitespace before the opening brace is skipped. Returns `None` if the next
/// non-whitespace character is not `{`; the command then takes no argument
/// and the caller keeps its cursor at `pos`.
///
/// Unescaped braces are depth-counted, so `outer{inner}tail` comes back
/// whole. A backslash escapes the following character, which keeps `\{`,
/// `\}` and `\\` out of the count. If the braces never balance, the span runs
/// to the end of `source`.
#[must_use]
pub fn extract_argument(source: &str, pos: usize) -> Option<ArgumentSpan<'_>> {
    let bytes = source.as_bytes();
    let open = skip_whitespace(bytes, pos);
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let start = open + 1;
    let mut depth = 1usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(ArgumentSpan {
                        text: &source[start..i],
                        end: i + 1,
                        terminated: true,
                    });
                }
            }
            _ => {}
        }
        i += 1;
    }

    log::warn!("Unterminated argument at offset {open}, truncating at end of input");
    Some(ArgumentSpan {
        text: &source[start..],
        end: source.len(),
        terminated: false,
    })
}

/// Skip `[...]` optional arguments directly following a command name.
///
/// Only brackets that immediately follow `pos` (no whitespace) are treated as
/// optional arguments, and an unmatched `[` is left alone. Returns the offset
/// after the last optional argument, or `pos` if there is none.
#[must_use]
pub fn skip_optional_arguments(source: &str, pos: usize) -> usize {
    let bytes = source.as_bytes();
    let mut cursor = pos;
    while bytes.get(cursor) == Some(&b'[') {
        match matching_bracket(bytes, cursor) {
            Some(close) => cursor = close + 1,
            None => break,
        }
    }
    cursor
}

/// Offset of the `]` closing the `[` at `open`, ignoring brackets nested in
/// brace groups.
fn matching_bracket(bytes: &[u8], open: usize) -> Option<usize> {
    let mut brackets = 0usize;
    let mut braces = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => braces += 1,
            b'}' => braces = braces.saturating_sub(1),
            b'[' if braces == 0 => brackets += 1,
            b']' if braces == 0 => {
                brackets -= 1;
                if brackets == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}
