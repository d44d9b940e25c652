//! The parser instance: registry, declared encoding, flags and the document
//! state of one conversion.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{CommandSpec, CommandTable, ParserConfig, DEFAULT_MAX_DEPTH};
use crate::encoding::TextEncoding;
use crate::error::Result;
use crate::registry::{CommandHandler, CommandRegistry};
use crate::scanner::Scan;
use crate::state::{DocumentState, LatexMetadata};

// Only matches a marker that is not inside a `%` comment
static RE_DOCUMENT_BEGIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:\\%|[^%\n])*?\\begin\s*\{\s*document\s*\}")
        .expect("valid document begin regex")
});

/// LaTeX to plain text converter.
///
/// Feed it a byte buffer; afterwards the plain text, title, authors and
/// citation keys are available through accessors. Conversion never fails:
/// unknown commands are dropped, unterminated arguments run to the end of
/// input and undecodable bytes become U+FFFD.
///
/// An instance is meant for one document. Converting again resets the
/// document state first.
///
/// # Examples
///
/// ```rust
/// use latex_importer::LatexParser;
///
/// let mut parser = LatexParser::new();
/// let text = parser.convert_str(r"\title{On Sets}\begin{document}See \cite{cantor}.\end{document}");
/// assert_eq!(text, "See .");
/// assert_eq!(parser.title(), "On Sets");
/// assert_eq!(parser.citations(), vec!["cantor".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct LatexParser {
    registry: CommandRegistry,
    encoding: TextEncoding,
    copy_text: bool,
    verbose: bool,
    max_depth: usize,
    detect_document_body: bool,
    state: DocumentState,
}

impl Default for LatexParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LatexParser {
    /// Parser with the standard command tables, declared UTF-8.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(CommandRegistry::standard())
    }

    /// Parser using `registry` as its command tables.
    #[must_use]
    pub fn with_registry(registry: CommandRegistry) -> Self {
        Self {
            registry,
            encoding: TextEncoding::Utf8,
            copy_text: true,
            verbose: false,
            max_depth: DEFAULT_MAX_DEPTH,
            detect_document_body: true,
            state: DocumentState::new(),
        }
    }

    /// Build a parser from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation or names an
    /// unknown custom handler.
    pub fn from_config(config: &ParserConfig) -> Result<Self> {
        config.validate()?;
        let mut registry = if config.standard_commands {
            CommandRegistry::standard()
        } else {
            CommandRegistry::new()
        };
        registry.extend_from_table(&config.commands)?;

        Ok(Self::with_registry(registry)
            .with_encoding(config.text_encoding()?)
            .with_verbose(config.verbose)
            .with_max_depth(config.max_depth)
            .with_document_body_detection(config.detect_document_body))
    }

    /// Parser that has already converted `data`.
    #[must_use]
    pub fn from_latex_data(data: &[u8], encoding: TextEncoding) -> Self {
        let mut parser = Self::new().with_encoding(encoding);
        parser.load_latex_data(data);
        parser
    }

    /// Parser with `commands` added to the standard tables that has already
    /// converted `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if `commands` names an unknown custom handler.
    pub fn from_latex_data_with_commands(
        data: &[u8],
        encoding: TextEncoding,
        commands: &CommandTable,
    ) -> Result<Self> {
        let mut parser = Self::new().with_encoding(encoding);
        parser.load_latex_commands(commands)?;
        parser.load_latex_data(data);
        Ok(parser)
    }

    /// Parser with one extra custom command that has already converted
    /// `data`.
    #[must_use]
    pub fn from_latex_data_with_command(
        data: &[u8],
        encoding: TextEncoding,
        command: &str,
        handler: CommandHandler,
    ) -> Self {
        let mut parser = Self::new().with_encoding(encoding);
        parser.add_handler(command, handler);
        parser.load_latex_data(data);
        parser
    }

    /// Parser with one extra command given in compact form (`copy`,
    /// `substitute:<text>` or `custom:<handler>`) that has already converted
    /// `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if `command_type` does not parse or names an unknown
    /// handler.
    pub fn from_latex_data_with_command_type(
        data: &[u8],
        encoding: TextEncoding,
        command: &str,
        command_type: &str,
    ) -> Result<Self> {
        let mut parser = Self::new().with_encoding(encoding);
        parser.add_command(command, command_type)?;
        parser.load_latex_data(data);
        Ok(parser)
    }

    /// Set the declared encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Log every dispatched command at debug level.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Bound the nesting of copy commands.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether literal text outside the document environment is copied.
    /// Only consulted when document body detection does not apply.
    #[must_use]
    pub fn with_copy_text(mut self, copy_text: bool) -> Self {
        self.copy_text = copy_text;
        self
    }

    /// When enabled (the default) and the input contains
    /// `\begin{document}`, only the document body contributes text.
    #[must_use]
    pub fn with_document_body_detection(mut self, detect: bool) -> Self {
        self.detect_document_body = detect;
        self
    }

    /// Add commands from a table; later entries replace earlier ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the table names an unknown custom handler; the
    /// registry is left unchanged in that case.
    pub fn load_latex_commands(&mut self, commands: &CommandTable) -> Result<()> {
        self.registry.extend_from_table(commands)
    }

    /// Route the argument of `command` to `handler`.
    pub fn add_handler(&mut self, command: impl Into<String>, handler: CommandHandler) {
        self.registry.register_custom(command, handler);
    }

    /// Register `command` from its compact form, e.g. `"custom:cite"`.
    ///
    /// # Errors
    ///
    /// Returns an error if `command_type` does not parse or names an unknown
    /// handler; the registry is left unchanged in that case.
    pub fn add_command(&mut self, command: &str, command_type: &str) -> Result<()> {
        let spec: CommandSpec = command_type.parse()?;
        self.registry.register_spec(command, &spec)
    }

    /// Convert `data`, replacing any earlier result.
    pub fn load_latex_data(&mut self, data: &[u8]) {
        self.convert_latex(data);
    }

    /// Decode `data` under the declared encoding and convert it. Returns the
    /// plain text rendering.
    pub fn convert_latex(&mut self, data: &[u8]) -> &str {
        let encoding = self.encoding;
        let text = encoding.decode(data);
        log::debug!(
            "Converting {} bytes of LaTeX declared as {encoding}",
            data.len()
        );
        self.convert_str(&text)
    }

    /// Convert already decoded text. Returns the plain text rendering.
    pub fn convert_str(&mut self, text: &str) -> &str {
        self.state.reset();
        let copy_text = self.initial_copy_text(text);

        let mut scan = Scan::new(
            &self.registry,
            &mut self.state,
            copy_text,
            self.max_depth,
            self.verbose,
        )
        .with_document_body(self.detect_document_body);
        scan.scan(text, 0);

        log::debug!(
            "Converted LaTeX: {} chars of text, title {:?}, {} citations",
            self.state.full_text().len(),
            self.state.title(),
            self.state.citation_count()
        );
        self.state.full_text()
    }

    /// Copying starts off only when a `\begin{document}` marker will turn it
    /// on again, which a registered `begin` command would intercept.
    fn initial_copy_text(&self, text: &str) -> bool {
        if self.detect_document_body
            && !self.registry.contains("begin")
            && RE_DOCUMENT_BEGIN.is_match(text)
        {
            false
        } else {
            self.copy_text
        }
    }

    /// Document title, empty if none.
    #[must_use]
    pub fn title(&self) -> &str {
        self.state.title()
    }

    /// Author string, empty if none.
    #[must_use]
    pub fn authors(&self) -> &str {
        self.state.authors()
    }

    /// Plain text rendering.
    #[must_use]
    pub fn full_text(&self) -> &str {
        self.state.full_text()
    }

    /// Citation keys. Order is unspecified.
    #[must_use]
    pub fn citations(&self) -> Vec<String> {
        self.state.citations()
    }

    /// Override the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.state.set_title(title);
    }

    /// Override the author string.
    pub fn set_authors(&mut self, authors: impl Into<String>) {
        self.state.set_authors(authors);
    }

    /// Serializable metadata snapshot.
    #[must_use]
    pub fn metadata(&self) -> LatexMetadata {
        self.state.metadata()
    }

    /// The accumulated document state.
    #[must_use]
    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    /// Consume the parser, keeping only the document state.
    #[must_use]
    pub fn into_state(self) -> DocumentState {
        self.state
    }

    /// Command tables in use.
    #[must_use]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Mutable access to the command tables.
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    /// Declared encoding.
    #[must_use]
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Whether per-command logging is raised to debug level.
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}
