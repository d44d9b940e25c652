//! Parser configuration and serializable command tables.
//!
//! Configuration can be built in code or loaded from JSON or YAML:
//!
//! ```yaml
//! encoding: latin1
//! verbose: false
//! max_depth: 32
//! commands:
//!   keywords: { kind: custom, handler: cite }
//!   textbf: { kind: copy }
//!   "'": { kind: substitute, replacement: "é" }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::encoding::TextEncoding;
use crate::error::{LatexError, Result};

/// Default bound on copy-command nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Serializable classification of one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CommandSpec {
    /// Copy the argument into the text
    Copy,
    /// Replace the command by a fixed string
    Substitute {
        /// Text emitted in place of the command
        replacement: String,
    },
    /// Route the argument to a built-in handler (`title`, `author`, `cite`)
    Custom {
        /// Handler name
        handler: String,
    },
}

impl FromStr for CommandSpec {
    type Err = LatexError;

    /// Parse the compact form `copy`, `substitute:<replacement>` or
    /// `custom:<handler>`.
    fn from_str(s: &str) -> Result<Self> {
        let (kind, value) = match s.split_once(':') {
            Some((kind, value)) => (kind.trim(), Some(value)),
            None => (s.trim(), None),
        };
        match (kind.to_ascii_lowercase().as_str(), value) {
            ("copy", None) => Ok(CommandSpec::Copy),
            ("substitute", Some(replacement)) => Ok(CommandSpec::Substitute {
                replacement: replacement.to_string(),
            }),
            ("custom", Some(handler)) if !handler.trim().is_empty() => Ok(CommandSpec::Custom {
                handler: handler.trim().to_string(),
            }),
            _ => Err(LatexError::InvalidConfig(format!(
                "invalid command type '{s}', expected copy, substitute:<text> or custom:<handler>"
            ))),
        }
    }
}

/// Command name to classification table.
///
/// Entries are kept sorted by name so registration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandTable {
    commands: BTreeMap<String, CommandSpec>,
}

impl CommandTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, name: impl Into<String>, spec: CommandSpec) -> Option<CommandSpec> {
        self.commands.insert(name.into(), spec)
    }

    /// Entry for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandSpec)> {
        self.commands.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Parse a table from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`LatexError::JsonError`] on malformed input.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a table from a YAML mapping.
    ///
    /// # Errors
    ///
    /// Returns [`LatexError::YamlError`] on malformed input.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

impl FromIterator<(String, CommandSpec)> for CommandTable {
    fn from_iter<I: IntoIterator<Item = (String, CommandSpec)>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

/// Settings for a [`LatexParser`](crate::LatexParser).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Declared encoding label (`"utf-8"`, `"latin1"`, `"auto"`, ...)
    pub encoding: String,
    /// Log every dispatched command at debug level
    pub verbose: bool,
    /// Maximum nesting of copy commands
    pub max_depth: usize,
    /// Only copy text between `\begin{document}` and `\end{document}` when
    /// the input has a document environment
    pub detect_document_body: bool,
    /// Seed the registry with the standard command tables
    pub standard_commands: bool,
    /// Additional commands, applied after the standard tables
    pub commands: CommandTable,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            encoding: "utf-8".to_string(),
            verbose: false,
            max_depth: DEFAULT_MAX_DEPTH,
            detect_document_body: true,
            standard_commands: true,
            commands: CommandTable::new(),
        }
    }
}

impl ParserConfig {
    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or fails validation.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, choosing the format by extension
    /// (`.json`, `.yaml`, `.yml`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unsupported
    /// extension, or does not parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Self::from_json_str(&std::fs::read_to_string(path)?),
            Some("yaml" | "yml") => Self::from_yaml_str(&std::fs::read_to_string(path)?),
            _ => Err(LatexError::InvalidConfig(format!(
                "unsupported configuration file: {}",
                path.display()
            ))),
        }
    }

    /// Resolved declared encoding.
    ///
    /// # Errors
    ///
    /// Returns [`LatexError::UnknownEncoding`] for an unknown label.
    pub fn text_encoding(&self) -> Result<TextEncoding> {
        TextEncoding::from_label(&self.encoding)
    }

    /// Check the settings that serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown encoding or a zero `max_depth`.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(LatexError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        self.text_encoding()?;
        Ok(())
    }
}
