//! Rendering entry points.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::enrich::{NoEnrichment, Shortcodes, TextEnricher};
use crate::highlight::{Highlighter, PlainHighlighter, SyntectHighlighter, DEFAULT_THEME};
use crate::style::MarkdownStyle;
use crate::tree::Node;
use crate::walker::Walker;
use crate::Result;

/// How images would be drawn. Has no effect on text layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageDithering {
    #[default]
    None,
    Blocks,
}

fn default_true() -> bool {
    true
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

/// Options recognized by [`render`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    #[serde(default)]
    pub image_dithering: ImageDithering,

    /// Syntax-highlight code blocks.
    #[serde(default = "default_true")]
    pub highlight: bool,

    /// Name of one of syntect's bundled themes.
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Expand `:name:` emoji shortcodes.
    #[serde(default = "default_true")]
    pub emoji: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            image_dithering: ImageDithering::default(),
            highlight: default_true(),
            theme: default_theme(),
            emoji: default_true(),
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_dithering(mut self, image_dithering: ImageDithering) -> Self {
        self.image_dithering = image_dithering;
        self
    }

    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn with_emoji(mut self, emoji: bool) -> Self {
        self.emoji = emoji;
        self
    }
}

/// A rendered document and its physical line count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    text: String,
    lines: usize,
}

impl Rendered {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.text.into_bytes()
    }

    /// Number of `\n` in the output.
    pub fn line_count(&self) -> usize {
        self.lines
    }
}

/// Lays out render trees at a fixed width.
///
/// A renderer holds no per-document state and may render any number of
/// trees; each call walks with fresh state.
pub struct Renderer {
    line_width: usize,
    left_pad: usize,
    options: RenderOptions,
    style: MarkdownStyle,
    highlighter: Box<dyn Highlighter>,
    enricher: Box<dyn TextEnricher>,
}

impl Renderer {
    /// `line_width` is the total width including the `left_pad` margin.
    pub fn new(line_width: usize, left_pad: usize) -> Self {
        Self::with_options(line_width, left_pad, RenderOptions::default())
    }

    pub fn with_options(line_width: usize, left_pad: usize, options: RenderOptions) -> Self {
        let style = MarkdownStyle::default();
        let highlighter: Box<dyn Highlighter> = if options.highlight {
            let syntect = SyntectHighlighter::with_theme(&options.theme).unwrap_or_else(|e| {
                warn!(error = %e, theme = %options.theme, "Falling back to the default theme");
                SyntectHighlighter::new()
            });
            Box::new(syntect)
        } else {
            Box::new(PlainHighlighter::new(style.code_block))
        };
        let enricher: Box<dyn TextEnricher> = if options.emoji {
            Box::new(Shortcodes)
        } else {
            Box::new(NoEnrichment)
        };
        debug!(
            highlight = options.highlight,
            theme = %options.theme,
            emoji = options.emoji,
            "Selected highlighter and enricher"
        );

        Self {
            line_width,
            left_pad,
            options,
            style,
            highlighter,
            enricher,
        }
    }

    pub fn highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Box::new(highlighter);
        self
    }

    pub fn enricher(mut self, enricher: impl TextEnricher + 'static) -> Self {
        self.enricher = Box::new(enricher);
        self
    }

    pub fn style(mut self, style: MarkdownStyle) -> Self {
        self.style = style;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render `tree`, which must be rooted at a document node.
    ///
    /// A width too small for the margin is clamped so that at least one
    /// column of text fits on each line.
    pub fn render(&self, tree: &Node) -> Result<Rendered> {
        debug!(
            line_width = self.line_width,
            left_pad = self.left_pad,
            image_dithering = ?self.options.image_dithering,
            "Rendering document"
        );

        let walker = Walker::new(
            self.line_width.max(1),
            self.left_pad,
            &self.style,
            self.highlighter.as_ref(),
            self.enricher.as_ref(),
        );
        let text = walker.run(tree)?;
        let lines = text.bytes().filter(|&b| b == b'\n').count();

        debug!(lines, bytes = text.len(), "Rendered document");
        Ok(Rendered { text, lines })
    }
}

/// Render `tree` at `line_width` columns with a fixed `left_pad` margin.
pub fn render(
    tree: &Node,
    line_width: usize,
    left_pad: usize,
    options: &RenderOptions,
) -> Result<Rendered> {
    Renderer::with_options(line_width, left_pad, options.clone()).render(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::escape::extract;
    use crate::tree::{Alignment, ItemKind, ListKind, NodeKind};
    use ratatui::style::Style;

    fn renderer(line_width: usize, left_pad: usize) -> Renderer {
        let options = RenderOptions::new().with_highlight(false).with_emoji(false);
        Renderer::with_options(line_width, left_pad, options)
    }

    fn plain(rendered: &Rendered) -> String {
        extract(rendered.as_str()).0
    }

    fn para(text: &str) -> Node {
        Node::paragraph(vec![Node::text(text)])
    }

    fn bullets(items: &[&str]) -> Node {
        Node::list(
            ListKind::Unordered,
            items
                .iter()
                .map(|t| Node::item(ItemKind::Bullet, vec![para(t)]))
                .collect(),
        )
    }

    #[test]
    fn test_render_paragraph() {
        let tree = Node::document(vec![para("Hello world")]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(out.as_str(), "Hello world\n");
        assert_eq!(out.line_count(), 1);
    }

    #[test]
    fn test_blank_line_between_paragraphs() {
        let tree = Node::document(vec![para("A"), para("B")]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(out.as_str(), "A\n\nB\n");
        assert_eq!(out.line_count(), 3);
    }

    #[test]
    fn test_margin_prefixes_lines() {
        let tree = Node::document(vec![para("hi")]);
        let out = renderer(80, 4).render(&tree).unwrap();
        assert_eq!(out.as_str(), "    hi\n");
    }

    #[test]
    fn test_headings_are_numbered() {
        let tree = Node::document(vec![
            Node::heading(1, vec![Node::text("Title")]),
            Node::heading(2, vec![Node::text("Sub")]),
            para("x"),
        ]);
        let out = renderer(20, 0).render(&tree).unwrap();
        let expected = format!("1 Title\n{}\n\n1.1 Sub\n\nx\n", "─".repeat(20));
        assert_eq!(plain(&out), expected);
        assert_eq!(out.line_count(), 6);
    }

    #[test]
    fn test_heading_level_out_of_range() {
        let tree = Node::document(vec![Node::heading(7, vec![Node::text("deep")])]);
        let err = renderer(80, 0).render(&tree).unwrap_err();
        assert!(matches!(err, Error::MalformedTree(_)));
    }

    #[test]
    fn test_horizontal_rule_spans_width() {
        let tree = Node::document(vec![Node::new(NodeKind::HorizontalRule)]);
        let out = renderer(10, 2).render(&tree).unwrap();
        assert_eq!(out.as_str(), "  ────────\n\n");
    }

    #[test]
    fn test_bullet_list() {
        let tree = Node::document(vec![bullets(&["one", "two"])]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(plain(&out), "• one\n• two\n");
    }

    #[test]
    fn test_ordered_list_numbers_by_position() {
        let items = ["a", "b"]
            .iter()
            .map(|t| Node::item(ItemKind::Ordered, vec![para(t)]))
            .collect();
        let tree = Node::document(vec![Node::list(ListKind::Ordered, items)]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(plain(&out), "1. a\n2. b\n");
    }

    #[test]
    fn test_list_continuation_aligns_under_text() {
        let tree = Node::document(vec![bullets(&["alpha beta gamma"])]);
        let out = renderer(10, 0).render(&tree).unwrap();
        assert_eq!(plain(&out), "• alpha\n  beta\n  gamma\n");
    }

    #[test]
    fn test_nested_list_spacing() {
        let inner = bullets(&["inner"]);
        let outer = Node::list(
            ListKind::Unordered,
            vec![Node::item(ItemKind::Bullet, vec![para("outer"), inner])],
        );
        let tree = Node::document(vec![outer, para("after")]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(plain(&out), "• outer\n  • inner\n\nafter\n");
    }

    #[test]
    fn test_paragraph_before_list() {
        let tree = Node::document(vec![para("intro"), bullets(&["x"])]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(plain(&out), "intro\n\n• x\n");
    }

    #[test]
    fn test_definition_list() {
        let tree = Node::document(vec![Node::list(
            ListKind::Definition,
            vec![
                Node::item(ItemKind::Term, vec![para("Term")]),
                Node::item(ItemKind::Definition, vec![para("Meaning")]),
            ],
        )]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(plain(&out), "Term\n  Meaning\n\n");
        assert!(out.as_str().starts_with("\x1b[32mTerm"));
    }

    #[test]
    fn test_block_quote_keeps_line_breaks() {
        let tree = Node::document(vec![Node::block_quote(vec![para("a\n  b")])]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(plain(&out), "┃ a\n┃   b\n");
    }

    #[test]
    fn test_text_breaks_collapse_outside_quotes() {
        let tree = Node::document(vec![para("a\n  b")]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(out.as_str(), "a b\n");
    }

    #[test]
    fn test_nested_quotes_use_different_bars() {
        let tree = Node::document(vec![Node::block_quote(vec![Node::block_quote(vec![
            para("deep"),
        ])])]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(plain(&out), "┃ ┃ deep\n");

        let style = MarkdownStyle::default();
        let outer = crate::style::paint(style.quote_bar(1), "┃ ");
        let inner = crate::style::paint(style.quote_bar(2), "┃ ");
        assert!(out.as_str().starts_with(&format!("{}{}", outer, inner)));
    }

    #[test]
    fn test_inline_markers() {
        let tree = Node::document(vec![Node::paragraph(vec![
            Node::text("a "),
            Node::with_children(NodeKind::Strong, vec![Node::text("b")]),
            Node::text(" "),
            Node::with_children(NodeKind::Emphasis, vec![Node::text("c")]),
        ])]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(out.as_str(), "a \x1b[1mb\x1b[22m \x1b[3mc\x1b[23m\n");
    }

    #[test]
    fn test_link_label_and_title() {
        let tree = Node::document(vec![Node::paragraph(vec![
            Node::text("see "),
            Node::link("https://x.y", "", vec![Node::text("docs")]),
            Node::text(" and "),
            Node::link("https://a.b", "T", vec![Node::text("more")]),
        ])]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(
            plain(&out),
            "see [docs](https://x.y) and [more](https://a.b T)\n"
        );
    }

    #[test]
    fn test_image_renders_alt_text() {
        let image = Node::with_children(
            NodeKind::Image {
                destination: "cat.png".to_string(),
                title: String::new(),
            },
            vec![Node::text("a cat")],
        );
        let tree = Node::document(vec![Node::paragraph(vec![image])]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(out.as_str(), "a cat\n");
    }

    #[test]
    fn test_code_block_with_bar() {
        let tree = Node::document(vec![
            Node::code_block(Some("rust"), "let x = 1;\n"),
            para("after"),
        ]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(plain(&out), "┃ let x = 1;\n\nafter\n");
    }

    #[test]
    fn test_code_block_is_highlighted() {
        let tree = Node::document(vec![Node::code_block(Some("rust"), "fn main() {}\n")]);
        let out = Renderer::new(80, 0).render(&tree).unwrap();
        assert_eq!(plain(&out), "┃ fn main() {}\n\n");
        assert!(out.as_str().contains("\x1b[38;2;"));
    }

    struct FailingHighlighter;

    impl Highlighter for FailingHighlighter {
        fn highlight(&self, _code: &str, _language: Option<&str>) -> Result<Vec<(String, Style)>> {
            Err(Error::highlight("tokenizer failed"))
        }
    }

    #[test]
    fn test_highlight_failure_falls_back() {
        let tree = Node::document(vec![Node::code_block(None, "x\ny\n")]);
        let out = renderer(80, 0)
            .highlighter(FailingHighlighter)
            .render(&tree)
            .unwrap();
        assert_eq!(plain(&out), "┃ x\n┃ y\n\n");
        assert!(out.as_str().contains("\x1b[33mx\x1b[0m"));
    }

    fn people_table() -> Node {
        let header = |text: &str, alignment| {
            Node::table_cell(alignment, true, vec![Node::text(text)])
        };
        let cell = |text: &str| Node::table_cell(Alignment::None, false, vec![Node::text(text)]);
        let row = |cells| Node::with_children(NodeKind::TableRow, cells);

        Node::with_children(
            NodeKind::Table,
            vec![
                Node::with_children(
                    NodeKind::TableHead,
                    vec![row(vec![
                        header("Name", Alignment::Left),
                        header("Age", Alignment::Right),
                    ])],
                ),
                Node::with_children(
                    NodeKind::TableBody,
                    vec![
                        row(vec![cell("Ann"), cell("30")]),
                        row(vec![cell("Bob"), cell("7")]),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn test_table() {
        let tree = Node::document(vec![people_table()]);
        let out = renderer(80, 2).render(&tree).unwrap();
        assert_eq!(
            plain(&out),
            "   Name │ Age \n  ──────┼─────\n   Ann  │  30 \n   Bob  │   7 \n\n"
        );
    }

    #[test]
    fn test_table_cell_outside_table() {
        let cell = Node::table_cell(Alignment::None, false, vec![Node::text("x")]);
        let tree = Node::document(vec![cell]);
        let err = renderer(80, 0).render(&tree).unwrap_err();
        assert!(matches!(err, Error::MalformedTree(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_root_must_be_document() {
        let err = renderer(80, 0).render(&para("x")).unwrap_err();
        assert!(matches!(err, Error::MalformedTree(_)));
    }

    #[test]
    fn test_html() {
        let tree = Node::document(vec![
            Node::new(NodeKind::HtmlBlock {
                literal: "<div>\nhi\n</div>\n".to_string(),
            }),
            Node::paragraph(vec![Node::new(NodeKind::HtmlInline {
                literal: "<br>".to_string(),
            })]),
        ]);
        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(plain(&out), "<div>\nhi\n</div>\n\n<br>\n");
        assert!(out.as_str().starts_with("\x1b[31m<div>\x1b[0m"));
    }

    #[test]
    fn test_emoji_shortcodes() {
        let tree = Node::document(vec![para("done :tada:")]);
        let options = RenderOptions::new().with_highlight(false);
        let out = render(&tree, 80, 0, &options).unwrap();
        assert_eq!(out.as_str(), "done 🎉\n");

        let out = renderer(80, 0).render(&tree).unwrap();
        assert_eq!(out.as_str(), "done :tada:\n");
    }

    #[test]
    fn test_degenerate_width_is_clamped() {
        let tree = Node::document(vec![para("hello")]);
        let out = renderer(1, 4).render(&tree).unwrap();
        assert_eq!(out.as_str(), "    h\n    e\n    l\n    l\n    o\n");
        assert_eq!(out.line_count(), 5);
    }

    #[test]
    fn test_tree_reused_across_renders() {
        let tree = Node::document(vec![Node::heading(1, vec![Node::text("T")])]);
        let renderer = renderer(10, 0);
        let first = renderer.render(&tree).unwrap();
        let second = renderer.render(&tree).unwrap();
        assert_eq!(first, second);
        assert!(plain(&first).starts_with("1 T\n"));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: RenderOptions = serde_json::from_str(r#"{"emoji": false}"#).unwrap();
        assert!(options.highlight);
        assert!(!options.emoji);
        assert_eq!(options.image_dithering, ImageDithering::None);
        assert_eq!(options.theme, DEFAULT_THEME);

        let options: RenderOptions =
            serde_json::from_str(r#"{"image_dithering": "blocks"}"#).unwrap();
        assert_eq!(options.image_dithering, ImageDithering::Blocks);
    }

    #[test]
    fn test_unknown_theme_still_highlights() {
        let options = RenderOptions::new().with_theme("no such theme");
        let tree = Node::document(vec![Node::code_block(Some("rust"), "fn main() {}\n")]);
        let rendered = Renderer::with_options(40, 0, options).render(&tree).unwrap();
        assert!(plain(&rendered).contains("fn main() {}"));
        assert!(rendered.as_str().contains("\x1b[38;2;"));
    }
}
