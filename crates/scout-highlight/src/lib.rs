//! Terminal rendering for scout.
//!
//! Two kinds of output are colored: documents (the effective settings and the `init` template as
//! TOML, result records as JSON) go through [`Highlighter`]; everything else is a short label
//! painted in one of a handful of tones.

#![warn(missing_docs)]

use syntect::{
    easy::HighlightLines,
    highlighting::Style,
    parsing::{SyntaxReference, SyntaxSet},
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};
use two_face::theme::{EmbeddedLazyThemeSet, EmbeddedThemeName};

/// Resets all SGR attributes.
const RESET: &str = "\x1b[0m";

/// Document formats scout prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Document {
    /// `.scout.toml` settings.
    Toml,
    /// A result record.
    Json,
}

impl Document {
    /// File extension syntect knows the format by.
    fn extension(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
        }
    }
}

/// Highlights settings and result records for the terminal.
pub struct Highlighter {
    /// Language definitions, including TOML which syntect lacks on its own.
    syntax_set: SyntaxSet,
    /// Embedded color themes.
    theme_set: EmbeddedLazyThemeSet,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Creates a highlighter.
    pub fn new() -> Self {
        Self {
            syntax_set: two_face::syntax::extra_newlines(),
            theme_set: two_face::theme::extra(),
        }
    }

    /// Highlights a TOML document.
    pub fn highlight_toml(&self, content: &str) -> String {
        self.render(content, Document::Toml)
    }

    /// Highlights a JSON document.
    pub fn highlight_json(&self, content: &str) -> String {
        self.render(content, Document::Json)
    }

    /// Renders `content` with 24-bit escapes, always ending with a reset.
    ///
    /// Lines the highlighter cannot parse are copied through unstyled.
    fn render(&self, content: &str, document: Document) -> String {
        let theme = self.theme_set.get(EmbeddedThemeName::Dracula);
        let mut lines = HighlightLines::new(self.syntax(document), theme);

        let mut output = String::with_capacity(content.len() * 2);
        for line in LinesWithEndings::from(content) {
            let ranges: Vec<(Style, &str)> = lines
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_else(|_| vec![(Style::default(), line)]);
            output.push_str(&as_24_bit_terminal_escaped(&ranges, false));
        }
        output.push_str(RESET);
        output
    }

    /// Syntax definition for `document`, or plain text if the set lacks it.
    fn syntax(&self, document: Document) -> &SyntaxReference {
        self.syntax_set
            .find_syntax_by_extension(document.extension())
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }
}

/// Styles for short labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    /// Bold cyan: the heading of a search's results.
    Header,
    /// Bold: section labels.
    Subheader,
    /// Faint: hints, scores, empty markers.
    Dim,
    /// Green.
    Success,
    /// Yellow: configuration warnings and truncation notices.
    Warning,
}

impl Tone {
    /// SGR sequence that starts the style.
    fn escape(self) -> &'static str {
        match self {
            Self::Header => "\x1b[1;36m",
            Self::Subheader => "\x1b[1m",
            Self::Dim => "\x1b[2m",
            Self::Success => "\x1b[32m",
            Self::Warning => "\x1b[33m",
        }
    }

    /// Wraps `text` in this style.
    fn paint(self, text: &str) -> String {
        format!("{}{text}{RESET}", self.escape())
    }
}

/// Bold cyan heading.
pub fn header(text: &str) -> String {
    Tone::Header.paint(text)
}

/// Bold section label.
pub fn subheader(text: &str) -> String {
    Tone::Subheader.paint(text)
}

/// Faint text.
pub fn dim(text: &str) -> String {
    Tone::Dim.paint(text)
}

/// Green text.
pub fn success(text: &str) -> String {
    Tone::Success.paint(text)
}

/// Yellow text.
pub fn warning(text: &str) -> String {
    Tone::Warning.paint(text)
}

/// Indents a rendered block so it sits under a subheader.
pub fn indent(block: &str) -> String {
    block
        .lines()
        .map(|line| format!("   {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
