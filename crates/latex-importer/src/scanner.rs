//! Character-level scan over decoded LaTeX text.
//!
//! The scan is a small state machine:
//!
//! | State | Entered on | Leaves when |
//! |-------|------------|-------------|
//! | Literal | start of input, after every token | `\`, `%`, `{`, `}` |
//! | `CommandName` | `\` | the name ends; hands off to the dispatcher |
//! | `ArgumentScan(depth)` | `{` after a command | depth returns to 0 |
//! | Comment | unescaped `%` | end of line |
//!
//! End of input is accepted in every state, so truncated documents yield
//! whatever was accumulated up to that point.

use crate::registry::CommandRegistry;
use crate::state::DocumentState;

/// One scan pass: borrows the registry and the document state and carries
/// the copy gate and the current copy nesting depth.
pub(crate) struct Scan<'a> {
    pub(crate) registry: &'a CommandRegistry,
    pub(crate) state: &'a mut DocumentState,
    pub(crate) copy_text: bool,
    pub(crate) depth: usize,
    pub(crate) max_depth: usize,
    pub(crate) verbose: bool,
    /// `\begin{document}` and `\end{document}` switch `copy_text`
    pub(crate) document_body: bool,
}

impl<'a> Scan<'a> {
    pub(crate) fn new(
        registry: &'a CommandRegistry,
        state: &'a mut DocumentState,
        copy_text: bool,
        max_depth: usize,
        verbose: bool,
    ) -> Self {
        Self {
            registry,
            state,
            copy_text,
            depth: 0,
            max_depth,
            verbose,
            document_body: true,
        }
    }

    /// Whether the document environment markers gate literal text.
    pub(crate) fn with_document_body(mut self, document_body: bool) -> Self {
        self.document_body = document_body;
        self
    }

    /// Scan `text` from `start` to its end and return the final cursor.
    pub(crate) fn scan(&mut self, text: &str, start: usize) -> usize {
        let bytes = text.as_bytes();
        let mut pos = start;
        while pos < bytes.len() {
            match bytes[pos] {
                b'\\' => {
                    let (name, after) = read_command_name(text, pos + 1);
                    pos = if name.is_empty() {
                        after
                    } else {
                        self.dispatch(text, name, after)
                    };
                }
                b'%' => pos = skip_comment(bytes, pos),
                // Bare group delimiters are structure, not text
                b'{' | b'}' => pos += 1,
                _ => {
                    let end = literal_end(bytes, pos);
                    if self.copy_text {
                        self.state.push_text(&text[pos..end]);
                    }
                    pos = end;
                }
            }
        }
        pos
    }
}

/// Read the command name starting right after a backslash.
///
/// A control word is a run of ASCII letters, optionally followed by a `*`
/// that is consumed but not part of the name. Otherwise the name is the
/// single following character (a control symbol such as `\'` or `\%`).
/// Returns the name and the offset after it; the name is empty only at end
/// of input.
pub(crate) fn read_command_name(text: &str, start: usize) -> (&str, usize) {
    let bytes = text.as_bytes();
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
        end += 1;
    }

    if end > start {
        let after = if bytes.get(end) == Some(&b'*') { end + 1 } else { end };
        return (&text[start..end], after);
    }

    match text[start..].chars().next() {
        Some(c) => (&text[start..start + c.len_utf8()], start + c.len_utf8()),
        None => ("", start),
    }
}

/// Offset after the comment starting at `pos`, including the line break.
fn skip_comment(bytes: &[u8], pos: usize) -> usize {
    bytes[pos..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| pos + offset + 1)
}

/// End of the literal run starting at `pos`.
fn literal_end(bytes: &[u8], pos: usize) -> usize {
    bytes[pos..]
        .iter()
        .position(|b| matches!(b, b'\\' | b'%' | b'{' | b'}'))
        .map_or(bytes.len(), |offset| pos + offset)
}
