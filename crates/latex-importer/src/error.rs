//! Error types for LaTeX import configuration.
//!
//! Scanning itself never fails: malformed LaTeX is recovered from on a best
//! effort basis. Errors only arise at the configuration boundary, when an
//! encoding label, a command table or a configuration file cannot be used.

use thiserror::Error;

/// Error types that can occur while configuring a [`LatexParser`](crate::LatexParser).
///
/// # Examples
///
/// ```rust
/// use latex_importer::{LatexError, TextEncoding};
///
/// match TextEncoding::from_label("klingon-8") {
///     Err(LatexError::UnknownEncoding(label)) => assert_eq!(label, "klingon-8"),
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum LatexError {
    /// The declared text encoding label is not known.
    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),

    /// A command table refers to a custom handler that does not exist.
    #[error("Unknown handler '{handler}' for command '{command}'")]
    UnknownHandler {
        /// Command the handler was requested for
        command: String,
        /// Requested handler name
        handler: String,
    },

    /// Configuration is structurally valid but semantically unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O error while reading a configuration file.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML deserialization error.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Type alias for [`Result<T, LatexError>`].
pub type Result<T> = std::result::Result<T, LatexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_encoding_display() {
        let error = LatexError::UnknownEncoding("ebcdic-xyz".to_string());
        assert_eq!(error.to_string(), "Unknown text encoding: ebcdic-xyz");
    }

    #[test]
    fn test_unknown_handler_display() {
        let error = LatexError::UnknownHandler {
            command: "keywords".to_string(),
            handler: "keyword".to_string(),
        };
        let display = format!("{error}");
        assert_eq!(display, "Unknown handler 'keyword' for command 'keywords'");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let latex_err: LatexError = io_err.into();

        match latex_err {
            LatexError::IoError(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("Expected IoError variant"),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let latex_err: LatexError = json_err.into();
        assert!(matches!(latex_err, LatexError::JsonError(_)));
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn inner() -> Result<()> {
            Err(LatexError::InvalidConfig("max_depth must be positive".to_string()))
        }

        fn outer() -> Result<String> {
            inner()?;
            Ok("unreachable".to_string())
        }

        match outer() {
            Err(LatexError::InvalidConfig(msg)) => assert!(msg.contains("max_depth")),
            _ => panic!("Expected InvalidConfig to propagate"),
        }
    }
}
