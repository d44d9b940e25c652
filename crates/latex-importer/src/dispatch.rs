//! Executes the behaviour registered for a recognized command.

use log::Level;

use crate::extract::{extract_argument, skip_optional_arguments};
use crate::registry::CommandKind;
use crate::scanner::Scan;

/// Environment that delimits the document body.
const DOCUMENT_ENVIRONMENT: &str = "document";

impl Scan<'_> {
    /// Process command `name` whose name ends at `pos`; returns the offset
    /// after the command and its argument, if any.
    pub(crate) fn dispatch(&mut self, text: &str, name: &str, pos: usize) -> usize {
        let pos = skip_optional_arguments(text, pos);
        let argument = extract_argument(text, pos);
        let end = argument.map_or(pos, |span| span.end);
        let raw = argument.map_or("", |span| span.text);
        if argument.is_some_and(|span| !span.terminated) {
            self.log_dispatch(name, "argument runs to end of input");
        }

        let registry = self.registry;
        match registry.lookup(name) {
            Some(CommandKind::Copy) => {
                self.log_dispatch(name, "copy");
                if argument.is_some() {
                    self.copy_argument(name, raw);
                }
            }
            Some(CommandKind::Substitute(replacement)) => {
                self.log_dispatch(name, "substitute");
                if self.copy_text {
                    self.state.push_text(replacement);
                }
            }
            Some(CommandKind::Custom(handler)) => {
                self.log_dispatch(name, handler.name());
                handler.call(self.state, raw);
            }
            None if name == "begin" || name == "end" => self.environment(name, raw),
            None => self.log_dispatch(name, "unknown, dropped"),
        }
        end
    }

    /// Re-scan a copy argument with copying forced on.
    fn copy_argument(&mut self, name: &str, argument: &str) {
        if self.depth >= self.max_depth {
            log::warn!(
                "Copy nesting exceeds {} levels at \\{name}, dropping its argument",
                self.max_depth
            );
            return;
        }

        let saved = self.copy_text;
        self.copy_text = true;
        self.depth += 1;
        self.scan(argument, 0);
        self.depth -= 1;
        self.copy_text = saved;
    }

    /// `\begin{document}` and `\end{document}` open and close the text when
    /// body detection is on; other environment markers are dropped while
    /// their bodies are scanned.
    fn environment(&mut self, marker: &str, environment: &str) {
        let environment = environment.trim();
        self.log_dispatch(marker, environment);
        if self.document_body && environment == DOCUMENT_ENVIRONMENT {
            self.copy_text = marker == "begin";
        }
    }

    fn log_dispatch(&self, name: &str, action: &str) {
        let level = if self.verbose { Level::Debug } else { Level::Trace };
        log::log!(level, "\\{name} at depth {}: {action}", self.depth);
    }
}
