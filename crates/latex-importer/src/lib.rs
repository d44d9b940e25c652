//! # latex-importer
//!
//! Converts LaTeX source into plain text and extracts the document title,
//! author string and citation keys. Pure Rust, no TeX engine required.
//!
//! ## How Commands Are Handled
//!
//! Every command `\name{argument}` falls into exactly one of three classes,
//! looked up by name in a [`CommandRegistry`]:
//!
//! | Class | Effect | Examples |
//! |-------|--------|----------|
//! | Copy | Argument is re-scanned and appended to the text | `\emph`, `\textbf`, `\section` |
//! | Substitute | A fixed string replaces the command and its argument | `\ldots`, `\alpha`, `\\` |
//! | Custom | Raw argument goes to a handler that updates metadata | `\title`, `\author`, `\cite` |
//!
//! Commands that are not registered are dropped together with their
//! argument. Arguments are brace-balanced, so `\emph{a {b} c}` copies
//! `a b c`.
//!
//! ### Metadata
//!
//! | Command | Field |
//! |---------|-------|
//! | `\title{}` | title (last one wins) |
//! | `\author{}` | authors (last one wins, `\and` becomes `, `) |
//! | `\cite{}`, `\citep{}`, `\citet{}`, `\nocite{}` | citation key set |
//!
//! ## Quick Start
//!
//! ```rust
//! use latex_importer::{LatexParser, TextEncoding};
//!
//! let source = br"\title{Notes}
//! \begin{document}
//! Knuth \cite{knuth84,lamport94} wrote \emph{about} \TeX.
//! \end{document}";
//!
//! let parser = LatexParser::from_latex_data(source, TextEncoding::Utf8);
//! assert_eq!(parser.title(), "Notes");
//! assert!(parser.full_text().contains("wrote about TeX."));
//! assert_eq!(parser.citations().len(), 2);
//! ```
//!
//! ## Custom Commands
//!
//! ```rust
//! use latex_importer::{CommandHandler, LatexParser};
//!
//! let mut parser = LatexParser::new();
//! parser.add_handler(
//!     "keywords",
//!     CommandHandler::new("keywords", |state, arg| {
//!         for key in arg.split(',') {
//!             state.insert_citation(format!("kw:{}", key.trim()));
//!         }
//!     }),
//! );
//! parser.convert_str(r"\keywords{parsing, tex}");
//! assert!(parser.citations().contains(&"kw:tex".to_string()));
//! ```
//!
//! ## Robustness
//!
//! Conversion never fails. Unterminated arguments run to the end of input,
//! undecodable bytes become U+FFFD, and truncated documents yield whatever
//! was accumulated. Copy-command nesting is bounded by a configurable depth.
//!
//! ## Limitations
//!
//! LaTeX is Turing-complete. The following are not handled:
//!
//! - **Custom macros**: `\newcommand` definitions are not expanded
//! - **Conditionals**: `\if`, `\else` constructs
//! - **Math rendering**: math is passed through or dropped as plain commands
//! - **Bibliographies**: citation keys are collected, entries are not formatted

/// Parser configuration and command tables
pub mod config;
mod dispatch;
/// Declared encodings and decoding
pub mod encoding;
/// Error types
pub mod error;
/// Brace-balanced argument extraction
pub mod extract;
/// Built-in title, author and citation handlers
pub mod handlers;
/// The parser instance
pub mod parser;
/// Command name to classification registry
pub mod registry;
mod scanner;
/// Accumulated document state
pub mod state;

pub use config::{CommandSpec, CommandTable, ParserConfig, DEFAULT_MAX_DEPTH};
pub use encoding::{detect_encoding, TextEncoding};
pub use error::{LatexError, Result};
pub use extract::{extract_argument, ArgumentSpan};
pub use handlers::BuiltinHandler;
pub use parser::LatexParser;
pub use registry::{CommandHandler, CommandKind, CommandRegistry};
pub use state::{DocumentState, LatexMetadata};
