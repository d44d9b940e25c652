//! Conversion Tests
//!
//! End-to-end behaviour of the scanner, extractor and dispatcher through the
//! public `LatexParser` API:
//! - Copy, substitute and custom command classes
//! - Metadata accumulation (title, authors, citations)
//! - Malformed and truncated input

use latex_importer::{
    CommandHandler, CommandRegistry, DocumentState, LatexParser, TextEncoding,
};

/// Parser with an empty registry plus the given setup.
fn bare_parser(setup: impl FnOnce(&mut CommandRegistry)) -> LatexParser {
    let mut registry = CommandRegistry::new();
    setup(&mut registry);
    LatexParser::with_registry(registry)
}

fn sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}

// ============================================================================
// Command Classes
// ============================================================================

#[test]
fn test_copy_transparency() {
    let mut parser = bare_parser(|r| r.register_copy("emph"));
    let text = parser.convert_str(r"\emph{hello}");
    assert_eq!(text, "hello");
    assert!(!text.contains("emph"));
    assert!(!text.contains('{'));
}

#[test]
fn test_substitution_independence() {
    let mut parser = bare_parser(|r| r.register_substitute("'", "é"));
    for input in [r"\'{anything}", r"\'{}", r"\'{a{b}c", r"\'{\'{x}}"] {
        assert_eq!(parser.convert_str(input), "é", "input: {input}");
    }
}

#[test]
fn test_balanced_nested_extraction() {
    let captured = std::sync::Arc::new(std::sync::Mutex::new(String::new()));
    let sink = std::sync::Arc::clone(&captured);
    let mut parser = bare_parser(|r| {
        r.register_custom(
            "cmd",
            CommandHandler::new("capture", move |_state: &mut DocumentState, arg: &str| {
                sink.lock().unwrap().push_str(arg);
            }),
        );
    });
    parser.convert_str(r"\cmd{outer{inner}tail} after");
    assert_eq!(captured.lock().unwrap().as_str(), "outer{inner}tail");
}

#[test]
fn test_copy_renders_inner_commands() {
    let mut parser = bare_parser(|r| {
        r.register_copy("cmd");
        r.register_copy("inner");
        r.register_substitute("ldots", "...");
    });
    let text = parser.convert_str(r"\cmd{outer \inner{deep\ldots} \gone{x}tail}");
    assert_eq!(text, "outer deep... tail");
}

#[test]
fn test_unknown_command_suppression() {
    let mut parser = LatexParser::new();
    parser.convert_str(r"before \unregisteredcmd{payload} after");
    assert_eq!(parser.full_text(), "before  after");
    assert_eq!(parser.title(), "");
    assert_eq!(parser.authors(), "");
    assert!(parser.citations().is_empty());
}

#[test]
fn test_re_registration_last_wins() {
    let mut parser = bare_parser(|r| {
        r.register_copy("x");
        r.register_substitute("x", "S");
    });
    assert_eq!(parser.convert_str(r"\x{arg}"), "S");

    parser.registry_mut().register_copy("x");
    assert_eq!(parser.convert_str(r"\x{arg}"), "arg");
}

// ============================================================================
// Metadata
// ============================================================================

#[test]
fn test_last_write_wins_title() {
    let mut parser = LatexParser::new();
    parser.convert_str(r"\title{A}\title{B}");
    assert_eq!(parser.title(), "B");
}

#[test]
fn test_citation_accumulation_and_dedup() {
    let mut parser = LatexParser::new();
    parser.convert_str(r"\cite{a,b}\cite{a}");
    let citations = sorted(parser.citations());
    assert_eq!(citations, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_citation_variants() {
    let mut parser = LatexParser::new();
    parser.convert_str(r"\citep[p.~3]{smith} \citet{jones, smith} \nocite{ doe }");
    let citations = sorted(parser.citations());
    assert_eq!(citations, vec!["doe", "jones", "smith"]);
}

#[test]
fn test_authors_with_and() {
    let mut parser = LatexParser::new();
    parser.convert_str(r"\author{Ada Lovelace \and Charles Babbage}");
    assert_eq!(parser.authors(), "Ada Lovelace, Charles Babbage");
}

#[test]
fn test_setter_after_scan_wins() {
    let mut parser = LatexParser::new();
    parser.convert_str(r"\title{Scanned}\author{Scanner}");
    parser.set_title("Edited");
    parser.set_authors("Editor");
    assert_eq!(parser.title(), "Edited");
    assert_eq!(parser.authors(), "Editor");
}

#[test]
fn test_idempotent_accessors() {
    let mut parser = LatexParser::new();
    parser.convert_str(r"\title{T}\author{A}\begin{document}Body \cite{k}\end{document}");
    assert_eq!(parser.title(), parser.title());
    assert_eq!(parser.authors(), parser.authors());
    assert_eq!(parser.full_text(), parser.full_text());
    assert_eq!(sorted(parser.citations()), sorted(parser.citations()));
    assert_eq!(parser.metadata(), parser.metadata());
}

// ============================================================================
// Full Documents
// ============================================================================

#[test]
fn test_article() {
    let latex = r"\documentclass[11pt]{article}
\usepackage{amsmath}
% The title is set in the preamble
\title{A Study of \LaTeX{} Parsing}
\author{Jane Smith \and John Doe}
\begin{document}
\maketitle
\begin{abstract}
We parse documents.% no newline here
\end{abstract}
\section{Introduction}
Prior work \cite{knuth84} exists\footnote{See also \cite{lamport94}.}.
\subsection*{Greek}
Angles $\alpha$ and \beta{}.
\end{document}
Stray text after the end.";

    let mut parser = LatexParser::new();
    let text = parser.convert_latex(latex.as_bytes()).to_string();

    assert_eq!(parser.title(), r"A Study of \LaTeX{} Parsing");
    assert_eq!(parser.authors(), "Jane Smith, John Doe");
    assert_eq!(sorted(parser.citations()), vec!["knuth84", "lamport94"]);

    assert!(text.contains("We parse documents."));
    assert!(!text.contains("no newline"));
    assert!(text.contains("Introduction"));
    assert!(text.contains("Prior work  existsSee also ."));
    assert!(text.contains("Greek"));
    assert!(text.contains("Angles $α$ and β."));
    assert!(!text.contains("amsmath"));
    assert!(!text.contains("Stray"));
    assert!(!text.contains("The title is set"));
}

#[test]
fn test_control_symbols() {
    let mut parser = LatexParser::new();
    let text = parser.convert_str(r"50\% of A\&B cost \$5 \#1 a\_b \{set\}");
    assert_eq!(text, "50% of A&B cost $5 #1 a_b {set}");
}

#[test]
fn test_list_items() {
    let mut parser = LatexParser::new();
    let text = parser.convert_str("\\begin{itemize}\n\\item One\n\\item[b)] Two\n\\end{itemize}");
    assert_eq!(text, "\n\n- One\n\n- Two\n");
}

// ============================================================================
// Malformed Input
// ============================================================================

#[test]
fn test_truncated_document() {
    let mut parser = LatexParser::new();
    let text = parser
        .convert_str(r"\title{Cut}\begin{document}Partial \emph{unfinished")
        .to_string();
    assert_eq!(text, "Partial unfinished");
    assert_eq!(parser.title(), "Cut");
}

#[test]
fn test_unterminated_title() {
    let mut parser = LatexParser::new();
    parser.convert_str(r"\title{Runs to the end");
    assert_eq!(parser.title(), "Runs to the end");
}

#[test]
fn test_stray_closing_braces() {
    let mut parser = LatexParser::new();
    assert_eq!(parser.convert_str("a}}b{c"), "abc");
}

#[test]
fn test_invalid_bytes_replaced() {
    let mut parser = LatexParser::new().with_encoding(TextEncoding::Utf8);
    let text = parser.convert_latex(b"ok \xFF\xFE done").to_string();
    assert_eq!(text, "ok \u{FFFD}\u{FFFD} done");
}

#[test]
fn test_embedded_nul_is_data() {
    let mut parser = LatexParser::new();
    let text = parser.convert_latex(b"a\0b \\emph{c\0d}").to_string();
    assert_eq!(text, "a\0b c\0d");
}

#[test]
fn test_utf16_input() {
    let source = r"\title{Wide}Text";
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(source.encode_utf16().flat_map(u16::to_le_bytes));

    let parser = LatexParser::from_latex_data(&bytes, TextEncoding::Utf16Le);
    assert_eq!(parser.title(), "Wide");
    assert_eq!(parser.full_text(), "Text");

    let detected = LatexParser::from_latex_data(&bytes, TextEncoding::Auto);
    assert_eq!(detected.full_text(), "Text");
}

#[test]
fn test_deep_nesting_is_bounded() {
    let depth = 10_000;
    let latex = format!("{}core{}", r"\emph{".repeat(depth), "}".repeat(depth));
    let mut parser = LatexParser::new().with_max_depth(32);
    let text = parser.convert_str(&latex);
    assert_eq!(text, "");
}

// ============================================================================
// Verbose Mode
// ============================================================================

#[test]
fn test_verbose_conversion_matches_quiet() {
    let _ = env_logger::builder().is_test(true).try_init();

    let latex = r"\title{Logged}\begin{document}\section{One} \unknown{x} \cite{k}\end{document}";
    let mut quiet = LatexParser::new();
    let mut verbose = LatexParser::new().with_verbose(true);
    assert!(verbose.is_verbose());

    assert_eq!(quiet.convert_str(latex), verbose.convert_str(latex));
    assert_eq!(quiet.metadata(), verbose.metadata());
}

// ============================================================================
// Document Body
// ============================================================================

#[test]
fn test_body_detection_off_keeps_trailing_text() {
    let mut parser = LatexParser::new().with_document_body_detection(false);
    let text = parser.convert_str(r"pre\begin{document}body\end{document}post");
    assert_eq!(text, "prebodypost");
}

#[test]
fn test_commented_document_marker_is_a_fragment() {
    let mut parser = LatexParser::new();
    let text = parser.convert_str("% \\begin{document}\nHello \\emph{world}");
    assert_eq!(text, "Hello world");
}

#[test]
fn test_custom_begin_handler_keeps_text() {
    let mut parser = LatexParser::new();
    parser.add_handler("begin", CommandHandler::new("ignore", |_state, _arg| {}));
    let text = parser.convert_str(r"\begin{document}Body\end{document}");
    assert_eq!(text, "Body");
}
