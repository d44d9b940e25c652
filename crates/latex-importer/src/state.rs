//! Accumulated output of one conversion pass.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Plain text, title, authors and citation keys collected while scanning.
///
/// The scanner appends to `full_text`; custom command handlers overwrite the
/// title and authors and add citation keys. Citation keys form a set, so
/// duplicates collapse. The set happens to iterate in sorted order, but
/// callers should only rely on membership and count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentState {
    title: String,
    authors: String,
    full_text: String,
    citations: BTreeSet<String>,
}

impl DocumentState {
    /// Create an empty document state.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Document title, empty if none was found.
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Author string, empty if none was found.
    #[inline]
    #[must_use]
    pub fn authors(&self) -> &str {
        &self.authors
    }

    /// Plain text rendering accumulated so far.
    #[inline]
    #[must_use]
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Snapshot of the citation keys.
    #[must_use]
    pub fn citations(&self) -> Vec<String> {
        self.citations.iter().cloned().collect()
    }

    /// Number of distinct citation keys.
    #[inline]
    #[must_use]
    pub fn citation_count(&self) -> usize {
        self.citations.len()
    }

    /// Whether `key` has been cited.
    #[inline]
    #[must_use]
    pub fn has_citation(&self, key: &str) -> bool {
        self.citations.contains(key)
    }

    /// Overwrite the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Overwrite the author string.
    pub fn set_authors(&mut self, authors: impl Into<String>) {
        self.authors = authors.into();
    }

    /// Append text to the plain text rendering.
    #[inline]
    pub fn push_text(&mut self, text: &str) {
        self.full_text.push_str(text);
    }

    /// Add a citation key. Returns `false` if it was already present.
    pub fn insert_citation(&mut self, key: impl Into<String>) -> bool {
        self.citations.insert(key.into())
    }

    /// Forget everything accumulated so far.
    pub fn reset(&mut self) {
        self.title.clear();
        self.authors.clear();
        self.full_text.clear();
        self.citations.clear();
    }

    /// Serializable snapshot of the extracted metadata.
    #[must_use]
    pub fn metadata(&self) -> LatexMetadata {
        LatexMetadata {
            title: non_empty(&self.title),
            authors: non_empty(&self.authors),
            citations: self.citations(),
            num_characters: self.full_text.chars().count(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Metadata extracted from a LaTeX document, for hand-off to a host
/// application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatexMetadata {
    /// Document title (`\title`)
    pub title: Option<String>,
    /// Author string (`\author`)
    pub authors: Option<String>,
    /// Citation keys (`\cite` and friends)
    pub citations: Vec<String>,
    /// Length of the plain text rendering in characters
    pub num_characters: usize,
}
