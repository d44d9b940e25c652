//! Built-in custom command handlers for title, author and citation
//! extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::registry::CommandHandler;
use crate::state::DocumentState;

static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static RE_AUTHOR_AND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\\and\b\s*").expect("valid author separator regex"));
static RE_LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\\\\\s*").expect("valid line break regex"));

/// Handlers that can be referenced by name from a command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinHandler {
    /// Overwrites the document title
    Title,
    /// Overwrites the author string
    Author,
    /// Adds comma-separated citation keys
    Cite,
}

impl BuiltinHandler {
    /// Look a handler up by the name used in command tables.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "title" => Some(Self::Title),
            "author" | "authors" => Some(Self::Author),
            "cite" | "citation" | "citations" => Some(Self::Cite),
            _ => None,
        }
    }

    /// Canonical name of the handler.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Cite => "cite",
        }
    }

    /// The handler as a registrable [`CommandHandler`].
    #[must_use]
    pub fn handler(self) -> CommandHandler {
        match self {
            Self::Title => CommandHandler::new(self.name(), title),
            Self::Author => CommandHandler::new(self.name(), author),
            Self::Cite => CommandHandler::new(self.name(), cite),
        }
    }
}

/// Overwrite the title with the argument, whitespace normalized.
pub fn title(state: &mut DocumentState, argument: &str) {
    let text = RE_LINE_BREAK.replace_all(argument, " ");
    state.set_title(normalize_whitespace(&text));
}

/// Overwrite the author string. `\and` separators become `", "`.
pub fn author(state: &mut DocumentState, argument: &str) {
    let text = RE_AUTHOR_AND.replace_all(argument, ", ");
    let text = RE_LINE_BREAK.replace_all(&text, " ");
    state.set_authors(normalize_whitespace(&text));
}

/// Split the argument on commas and add every non-empty key.
pub fn cite(state: &mut DocumentState, argument: &str) {
    for key in argument.split(',').map(str::trim).filter(|key| !key.is_empty()) {
        state.insert_citation(key);
    }
}

fn normalize_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text.trim(), " ").into_owned()
}
