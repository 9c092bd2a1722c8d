//! Syntax highlighting of fenced code blocks.

use ratatui::style::{Color, Modifier, Style};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SynStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::debug;

use crate::{Error, Result};

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Tokenizes code into styled fragments.
///
/// Concatenating the fragment texts must reproduce the input. Fragments may
/// contain `\n`; callers split on it.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, language: Option<&str>) -> Result<Vec<(String, Style)>>;
}

/// Highlighter backed by syntect's bundled syntaxes and themes.
///
/// The language tag is tried first, then detection from the first line of
/// the code. When neither finds a syntax the code is returned unstyled.
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl SyntectHighlighter {
    pub fn new() -> Self {
        let theme = ThemeSet::load_defaults()
            .themes
            .remove(DEFAULT_THEME)
            .unwrap_or_default();
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    /// Use one of syntect's bundled themes.
    pub fn with_theme(name: &str) -> Result<Self> {
        let theme = ThemeSet::load_defaults()
            .themes
            .remove(name)
            .ok_or_else(|| Error::highlight(format!("Unknown theme: {}", name)))?;
        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    fn find_syntax(&self, code: &str, language: Option<&str>) -> Option<&SyntaxReference> {
        language
            .and_then(|lang| self.syntaxes.find_syntax_by_token(lang))
            .or_else(|| self.syntaxes.find_syntax_by_first_line(code))
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: Option<&str>) -> Result<Vec<(String, Style)>> {
        let Some(syntax) = self.find_syntax(code, language) else {
            debug!(language = ?language, "No syntax found, leaving code unstyled");
            return Ok(vec![(code.to_string(), Style::default())]);
        };
        debug!(syntax = %syntax.name, "Highlighting code block");

        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let mut fragments = Vec::new();
        for line in LinesWithEndings::from(code) {
            let ranges = highlighter.highlight_line(line, &self.syntaxes)?;
            fragments.extend(
                ranges
                    .into_iter()
                    .map(|(style, text)| (text.to_string(), syntect_to_ratatui_style(style))),
            );
        }

        Ok(fragments)
    }
}

/// Convert syntect style to ratatui style
fn syntect_to_ratatui_style(style: SynStyle) -> Style {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

/// Emits the whole block as a single fragment in a fixed style.
#[derive(Debug, Clone, Default)]
pub struct PlainHighlighter {
    style: Style,
}

impl PlainHighlighter {
    pub fn new(style: Style) -> Self {
        Self { style }
    }
}

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _language: Option<&str>) -> Result<Vec<(String, Style)>> {
        Ok(vec![(code.to_string(), self.style)])
    }
}
