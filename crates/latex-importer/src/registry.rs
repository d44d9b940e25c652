//! Command registry: maps command names to their classification.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::{CommandSpec, CommandTable};
use crate::error::{LatexError, Result};
use crate::handlers::BuiltinHandler;
use crate::state::DocumentState;

/// Signature of a custom command handler: it receives the raw argument text.
pub type HandlerFn = dyn Fn(&mut DocumentState, &str) + Send + Sync;

/// A named custom command handler.
///
/// The name identifies the handler in logs and `Debug` output.
#[derive(Clone)]
pub struct CommandHandler {
    name: String,
    func: Arc<HandlerFn>,
}

impl CommandHandler {
    /// Wrap a function or closure as a handler.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut DocumentState, &str) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Handler identity.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the handler on a raw argument.
    #[inline]
    pub fn call(&self, state: &mut DocumentState, argument: &str) {
        (self.func)(state, argument);
    }
}

impl fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandler")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// How a recognized command is processed.
#[derive(Debug, Clone)]
pub enum CommandKind {
    /// Re-scan the argument and append the result to the text
    Copy,
    /// Emit a fixed replacement, discarding the argument
    Substitute(String),
    /// Pass the raw argument to a handler
    Custom(CommandHandler),
}

impl CommandKind {
    /// Short label used in log messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            CommandKind::Copy => "copy",
            CommandKind::Substitute(_) => "substitute",
            CommandKind::Custom(_) => "custom",
        }
    }
}

/// Commands whose argument is copied into the text.
const STANDARD_COPY: &[&str] = &[
    "emph", "textbf", "textit", "texttt", "textsc", "textrm", "textsf", "textsl", "textup",
    "textmd", "text", "underline", "mbox", "chapter", "section", "subsection", "subsubsection",
    "paragraph", "subparagraph", "caption", "footnote", "abstract",
];

/// Commands replaced by a fixed string.
const STANDARD_SUBSTITUTE: &[(&str, &str)] = &[
    // Control symbols
    ("\\", "\n"),
    (" ", " "),
    ("%", "%"),
    ("&", "&"),
    ("$", "$"),
    ("#", "#"),
    ("_", "_"),
    ("{", "{"),
    ("}", "}"),
    ("par", "\n\n"),
    ("newline", "\n"),
    ("item", "\n-"),
    ("maketitle", ""),
    // Logos and punctuation
    ("LaTeX", "LaTeX"),
    ("TeX", "TeX"),
    ("ldots", "…"),
    ("dots", "…"),
    ("textendash", "–"),
    ("textemdash", "—"),
    ("S", "§"),
    ("P", "¶"),
    ("copyright", "©"),
    // Special letters
    ("ss", "ß"),
    ("ae", "æ"),
    ("AE", "Æ"),
    ("oe", "œ"),
    ("OE", "Œ"),
    ("aa", "å"),
    ("AA", "Å"),
    ("o", "ø"),
    ("O", "Ø"),
    ("l", "ł"),
    ("L", "Ł"),
    // Greek letters
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("zeta", "ζ"),
    ("eta", "η"),
    ("theta", "θ"),
    ("iota", "ι"),
    ("kappa", "κ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("nu", "ν"),
    ("xi", "ξ"),
    ("pi", "π"),
    ("rho", "ρ"),
    ("sigma", "σ"),
    ("tau", "τ"),
    ("upsilon", "υ"),
    ("phi", "φ"),
    ("chi", "χ"),
    ("psi", "ψ"),
    ("omega", "ω"),
];

/// Commands routed to built-in handlers.
const STANDARD_CUSTOM: &[(&str, BuiltinHandler)] = &[
    ("title", BuiltinHandler::Title),
    ("author", BuiltinHandler::Author),
    ("cite", BuiltinHandler::Cite),
    ("citep", BuiltinHandler::Cite),
    ("citet", BuiltinHandler::Cite),
    ("nocite", BuiltinHandler::Cite),
];

/// Name-keyed command table.
///
/// A name has exactly one classification: registering it again replaces the
/// previous entry, whatever kind that was.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandKind>,
}

impl CommandRegistry {
    /// Create an empty registry. Every command is unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the standard text styling, sectioning,
    /// substitution and metadata commands.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for name in STANDARD_COPY {
            registry.register_copy(*name);
        }
        for (name, replacement) in STANDARD_SUBSTITUTE {
            registry.register_substitute(*name, *replacement);
        }
        for (name, builtin) in STANDARD_CUSTOM {
            registry.register_custom(*name, builtin.handler());
        }
        registry
    }

    /// Mark `name` as a copy command.
    pub fn register_copy(&mut self, name: impl Into<String>) {
        self.register(name, CommandKind::Copy);
    }

    /// Mark `name` as producing `replacement`.
    pub fn register_substitute(&mut self, name: impl Into<String>, replacement: impl Into<String>) {
        self.register(name, CommandKind::Substitute(replacement.into()));
    }

    /// Route the argument of `name` to `handler`.
    pub fn register_custom(&mut self, name: impl Into<String>, handler: CommandHandler) {
        self.register(name, CommandKind::Custom(handler));
    }

    /// Register `name` with an explicit kind, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, kind: CommandKind) {
        let name = name.into();
        if let Some(previous) = self.commands.insert(name.clone(), kind) {
            log::trace!("Re-registered command \\{name} (was {})", previous.label());
        }
    }

    /// Classification of `name`, or `None` if it was never registered.
    #[inline]
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&CommandKind> {
        self.commands.get(name)
    }

    /// Whether `name` is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Unregister `name`, returning its previous classification.
    pub fn remove(&mut self, name: &str) -> Option<CommandKind> {
        self.commands.remove(name)
    }

    /// Number of registered commands.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered command names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Register every entry of `table`.
    ///
    /// Handler names are resolved before anything is registered, so a table
    /// with an unknown handler leaves the registry untouched.
    ///
    /// # Errors
    ///
    /// Returns [`LatexError::UnknownHandler`] if a custom entry names a
    /// handler that does not exist.
    pub fn extend_from_table(&mut self, table: &CommandTable) -> Result<()> {
        let resolved = table
            .iter()
            .map(|(name, spec)| Ok((name.to_string(), Self::resolve(name, spec)?)))
            .collect::<Result<Vec<_>>>()?;

        for (name, kind) in resolved {
            self.register(name, kind);
        }
        Ok(())
    }

    /// Register `name` as described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`LatexError::UnknownHandler`] if `spec` names a handler that
    /// does not exist; the registry is left unchanged in that case.
    pub fn register_spec(&mut self, name: impl Into<String>, spec: &CommandSpec) -> Result<()> {
        let name = name.into();
        let kind = Self::resolve(&name, spec)?;
        self.register(name, kind);
        Ok(())
    }

    fn resolve(name: &str, spec: &CommandSpec) -> Result<CommandKind> {
        match spec {
            CommandSpec::Copy => Ok(CommandKind::Copy),
            CommandSpec::Substitute { replacement } => {
                Ok(CommandKind::Substitute(replacement.clone()))
            }
            CommandSpec::Custom { handler } => BuiltinHandler::from_name(handler)
                .map(|builtin| CommandKind::Custom(builtin.handler()))
                .ok_or_else(|| LatexError::UnknownHandler {
                    command: name.to_string(),
                    handler: handler.clone(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_is_not_found() {
        let registry = CommandRegistry::new();
        assert!(registry.lookup("emph").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_kinds() {
        let mut registry = CommandRegistry::new();
        registry.register_copy("emph");
        registry.register_substitute("'", "é");
        registry.register_custom("title", BuiltinHandler::Title.handler());

        assert!(matches!(registry.lookup("emph"), Some(CommandKind::Copy)));
        assert!(matches!(
            registry.lookup("'"),
            Some(CommandKind::Substitute(s)) if s == "é"
        ));
        assert!(matches!(
            registry.lookup("title"),
            Some(CommandKind::Custom(h)) if h.name() == "title"
        ));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = CommandRegistry::new();
        registry.register_copy("foo");
        registry.register_substitute("foo", "bar");
        assert!(matches!(registry.lookup("foo"), Some(CommandKind::Substitute(_))));

        registry.register_copy("foo");
        assert!(matches!(registry.lookup("foo"), Some(CommandKind::Copy)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut registry = CommandRegistry::standard();
        assert!(registry.contains("emph"));
        assert!(matches!(registry.remove("emph"), Some(CommandKind::Copy)));
        assert!(!registry.contains("emph"));
    }

    #[test]
    fn test_standard_tables() {
        let registry = CommandRegistry::standard();
        assert!(matches!(registry.lookup("section"), Some(CommandKind::Copy)));
        assert!(matches!(
            registry.lookup("alpha"),
            Some(CommandKind::Substitute(s)) if s == "α"
        ));
        assert!(matches!(registry.lookup("citep"), Some(CommandKind::Custom(_))));
        assert!(registry.lookup("usepackage").is_none());
        assert!(registry.names().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_handler_debug_shows_name() {
        let handler = CommandHandler::new("keywords", |_state, _arg| {});
        let debug = format!("{handler:?}");
        assert!(debug.contains("keywords"));
    }

    #[test]
    fn test_extend_from_table() {
        let mut table = CommandTable::new();
        table.insert("textbf", CommandSpec::Substitute { replacement: "*".to_string() });
        table.insert("bibentry", CommandSpec::Custom { handler: "cite".to_string() });

        let mut registry = CommandRegistry::standard();
        registry.extend_from_table(&table).unwrap();
        assert!(matches!(registry.lookup("textbf"), Some(CommandKind::Substitute(_))));
        assert!(matches!(registry.lookup("bibentry"), Some(CommandKind::Custom(_))));
    }

    #[test]
    fn test_extend_from_table_is_atomic() {
        let mut table = CommandTable::new();
        table.insert("aaa", CommandSpec::Copy);
        table.insert("zzz", CommandSpec::Custom { handler: "nope".to_string() });

        let mut registry = CommandRegistry::new();
        let err = registry.extend_from_table(&table).unwrap_err();
        assert!(matches!(err, LatexError::UnknownHandler { ref handler, .. } if handler == "nope"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_spec() {
        let mut registry = CommandRegistry::new();
        registry.register_spec("nbsp", &"substitute: ".parse().unwrap()).unwrap();
        assert!(matches!(registry.lookup("nbsp"), Some(CommandKind::Substitute(r)) if r == " "));

        let err = registry
            .register_spec("bad", &CommandSpec::Custom { handler: "nope".to_string() })
            .unwrap_err();
        assert!(matches!(err, LatexError::UnknownHandler { ref command, .. } if command == "bad"));
        assert!(!registry.contains("bad"));
    }
}
