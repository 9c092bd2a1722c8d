//! Depth-first traversal of the render tree.
//!
//! Block nodes write finished lines to the output; inline nodes append to an
//! accumulator that is threaded through the recursion and flushed when the
//! enclosing block exits.

use std::borrow::Cow;

use tracing::warn;

use crate::enrich::TextEnricher;
use crate::escape::visible_width;
use crate::heading::HeadingNumbering;
use crate::highlight::Highlighter;
use crate::paragraph;
use crate::style::{paint, paint_lines, MarkdownStyle, BOLD, CROSSED_OUT, ITALIC, TERM};
use crate::table::TableRenderer;
use crate::tree::{ItemKind, Node, NodeKind};
use crate::{Error, Result};

const BULLET: &str = "• ";
const QUOTE_BAR: &str = "┃ ";
const CODE_BAR: &str = "┃ ";
const RULE: &str = "─";
const DEFINITION_PAD: &str = "  ";

/// Position of a node among its siblings.
#[derive(Debug, Clone, Copy)]
struct Siblings<'a> {
    index: usize,
    next: Option<&'a Node>,
}

enum Flow {
    Continue,
    SkipChildren,
}

pub(crate) struct Walker<'a> {
    line_width: usize,
    left_pad: usize,
    style: &'a MarkdownStyle,
    highlighter: &'a dyn Highlighter,
    enricher: &'a dyn TextEnricher,

    pads: Vec<String>,
    /// One-shot prefix for the next paragraph's first line.
    indent: String,
    quote_level: usize,
    headings: HeadingNumbering,
    table: Option<TableRenderer>,
    ancestors: Vec<&'a NodeKind>,
    out: String,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(
        line_width: usize,
        left_pad: usize,
        style: &'a MarkdownStyle,
        highlighter: &'a dyn Highlighter,
        enricher: &'a dyn TextEnricher,
    ) -> Self {
        Self {
            line_width,
            left_pad,
            style,
            highlighter,
            enricher,
            pads: Vec::new(),
            indent: String::new(),
            quote_level: 0,
            headings: HeadingNumbering::new(),
            table: None,
            ancestors: Vec::new(),
            out: String::new(),
        }
    }

    /// Walk the whole tree and return the rendered text.
    pub(crate) fn run(mut self, root: &'a Node) -> Result<String> {
        if root.kind != NodeKind::Document {
            return Err(Error::malformed_tree(format!(
                "root must be a document, found {}",
                root.kind.name()
            )));
        }

        let mut inline = String::new();
        let root_siblings = Siblings {
            index: 0,
            next: None,
        };
        self.walk(root, root_siblings, &mut inline)?;
        Ok(self.out)
    }

    fn walk(&mut self, node: &'a Node, siblings: Siblings<'a>, inline: &mut String) -> Result<()> {
        if let Flow::SkipChildren = self.enter(node, siblings, inline)? {
            return Ok(());
        }

        self.ancestors.push(&node.kind);
        for (index, child) in node.children.iter().enumerate() {
            let child_siblings = Siblings {
                index,
                next: node.children.get(index + 1),
            };
            self.walk(child, child_siblings, inline)?;
        }
        self.ancestors.pop();

        self.exit(node, siblings, inline)
    }

    fn enter(&mut self, node: &'a Node, siblings: Siblings<'a>, inline: &mut String) -> Result<Flow> {
        match &node.kind {
            NodeKind::Document | NodeKind::List { .. } | NodeKind::Paragraph => {}
            NodeKind::BlockQuote => {
                self.quote_level += 1;
                let bar = paint(self.style.quote_bar(self.quote_level), QUOTE_BAR);
                self.pads.push(bar);
            }
            NodeKind::Item { kind } => self.enter_item(*kind, siblings, inline),
            NodeKind::Heading { level } => {
                if !(1..=6).contains(level) {
                    return Err(Error::malformed_tree(format!(
                        "heading level {} outside 1..=6",
                        level
                    )));
                }
            }
            NodeKind::HorizontalRule => {
                let rule = format!("{}{}\n\n", self.pad(), self.rule());
                self.out.push_str(&rule);
            }
            NodeKind::Emphasis => inline.push_str(ITALIC.on),
            NodeKind::Strong => inline.push_str(BOLD.on),
            NodeKind::Strikethrough => inline.push_str(CROSSED_OUT.on),
            NodeKind::Link { destination, title } => {
                inline.push('[');
                inline.push_str(&node.plain_text());
                inline.push_str("](");
                inline.push_str(&paint(self.style.link, destination));
                if !title.is_empty() {
                    inline.push(' ');
                    inline.push_str(title);
                }
                inline.push(')');
                return Ok(Flow::SkipChildren);
            }
            // alt text is rendered by the children
            NodeKind::Image { .. } => {}
            NodeKind::Text { literal } => {
                let text = if self.collapses_breaks() {
                    collapse_breaks(literal)
                } else {
                    Cow::Borrowed(literal.as_str())
                };
                inline.push_str(&self.enricher.enrich(&text));
            }
            NodeKind::HtmlBlock { literal } => {
                let content = paint_lines(self.style.html, literal.trim_end_matches('\n'));
                let formatted = paragraph::format_padded(&content, self.line_width, &self.pad());
                self.out.push_str(&formatted.text);
                self.out.push_str("\n\n");
            }
            NodeKind::HtmlInline { literal } => inline.push_str(&paint(self.style.html, literal)),
            NodeKind::CodeBlock { info, literal } => self.code_block(info.as_deref(), literal),
            NodeKind::InlineCode { literal } => {
                inline.push_str(&paint(self.style.inline_code, literal))
            }
            NodeKind::SoftBreak | NodeKind::HardBreak => inline.push('\n'),
            NodeKind::Table => self.table = Some(TableRenderer::new()),
            NodeKind::TableHead | NodeKind::TableBody | NodeKind::TableCell { .. } => {
                self.table_mut(&node.kind)?;
            }
            NodeKind::TableRow => {
                let in_body = matches!(self.parent(), Some(NodeKind::TableBody));
                let table = self.table_mut(&node.kind)?;
                if in_body {
                    table.next_body_row();
                }
            }
        }

        Ok(Flow::Continue)
    }

    fn exit(&mut self, node: &'a Node, siblings: Siblings<'a>, inline: &mut String) -> Result<()> {
        match &node.kind {
            NodeKind::BlockQuote => {
                self.quote_level = self.quote_level.saturating_sub(1);
                self.pads.pop();
            }
            NodeKind::List { .. } => {
                if let Some(next) = siblings.next {
                    let nested = matches!(self.parent(), Some(NodeKind::Item { .. }));
                    if !matches!(next.kind, NodeKind::List { .. }) && !nested {
                        self.out.push('\n');
                    }
                }
            }
            NodeKind::Item { kind } => match kind {
                ItemKind::Bullet | ItemKind::Ordered => {
                    self.pads.pop();
                }
                ItemKind::Term => inline.push_str(TERM.off),
                ItemKind::Definition => {
                    self.pads.pop();
                    self.out.push('\n');
                }
            },
            NodeKind::Paragraph => {
                self.flush_paragraph(inline);
                if siblings.next.is_some_and(|next| self.blank_line_before(next)) {
                    self.out.push('\n');
                }
            }
            NodeKind::Heading { level } => self.heading(*level, inline),
            NodeKind::Emphasis => inline.push_str(ITALIC.off),
            NodeKind::Strong => inline.push_str(BOLD.off),
            NodeKind::Strikethrough => inline.push_str(CROSSED_OUT.off),
            NodeKind::Table => {
                if let Some(table) = self.table.take() {
                    let pad = self.pad();
                    let width = self.line_width.saturating_sub(visible_width(&pad)).max(1);
                    for line in table.render(width) {
                        self.out.push_str(&pad);
                        self.out.push_str(&line);
                        self.out.push('\n');
                    }
                    self.out.push('\n');
                }
            }
            NodeKind::TableCell { alignment, header } => {
                let content = std::mem::take(inline);
                let table = self.table_mut(&node.kind)?;
                if *header {
                    table.add_header_cell(content, *alignment);
                } else {
                    table.add_body_cell(content);
                }
            }
            NodeKind::Document
            | NodeKind::HorizontalRule
            | NodeKind::Link { .. }
            | NodeKind::Image { .. }
            | NodeKind::Text { .. }
            | NodeKind::HtmlBlock { .. }
            | NodeKind::HtmlInline { .. }
            | NodeKind::CodeBlock { .. }
            | NodeKind::InlineCode { .. }
            | NodeKind::SoftBreak
            | NodeKind::HardBreak
            | NodeKind::TableHead
            | NodeKind::TableBody
            | NodeKind::TableRow => {}
        }

        Ok(())
    }

    fn enter_item(&mut self, kind: ItemKind, siblings: Siblings<'_>, inline: &mut String) {
        match kind {
            ItemKind::Bullet => {
                self.indent = format!("{}{}", self.pad(), paint(self.style.bullet, BULLET));
                self.pads.push(" ".repeat(visible_width(BULLET)));
            }
            ItemKind::Ordered => {
                let marker = format!("{}. ", siblings.index + 1);
                self.indent = format!("{}{}", self.pad(), paint(self.style.bullet, &marker));
                self.pads.push(" ".repeat(visible_width(&marker)));
            }
            ItemKind::Term => inline.push_str(TERM.on),
            ItemKind::Definition => self.pads.push(DEFINITION_PAD.to_string()),
        }
    }

    fn flush_paragraph(&mut self, inline: &mut String) {
        let content = std::mem::take(inline);
        let pad = self.pad();
        let indent = if self.indent.is_empty() {
            pad.clone()
        } else {
            std::mem::take(&mut self.indent)
        };

        let formatted = paragraph::format(&content, self.line_width, &indent, &pad);
        self.out.push_str(&formatted.text);
        self.out.push('\n');
    }

    fn blank_line_before(&self, next: &Node) -> bool {
        match next.kind {
            NodeKind::Paragraph
            | NodeKind::Heading { .. }
            | NodeKind::HorizontalRule
            | NodeKind::CodeBlock { .. }
            | NodeKind::HtmlBlock { .. } => true,
            NodeKind::List { .. } => !matches!(self.parent(), Some(NodeKind::Item { .. })),
            _ => false,
        }
    }

    fn heading(&mut self, level: u8, inline: &mut String) {
        let content = std::mem::take(inline);
        self.headings.observe(level);

        let pad = self.pad();
        let line = format!("{}{} {}", pad, self.headings.render(), content);
        let wrapped = paragraph::wrap(&line, self.line_width);
        self.out
            .push_str(&paint_lines(self.style.heading(level), &wrapped.text));
        self.out.push('\n');

        if level == 1 {
            let rule = format!("{}{}\n", pad, self.rule());
            self.out.push_str(&rule);
        }
        self.out.push('\n');
    }

    fn code_block(&mut self, info: Option<&str>, code: &str) {
        let language = info.and_then(|info| info.split_whitespace().next());
        let highlighted = match self.highlighter.highlight(code, language) {
            Ok(fragments) => fragments
                .iter()
                .map(|(text, style)| paint_lines(*style, text))
                .collect::<String>(),
            Err(e) => {
                warn!(error = %e, language = ?language, "Highlighting failed, rendering code block unhighlighted");
                paint_lines(self.style.code_block, code)
            }
        };

        self.pads.push(paint(self.style.code_bar, CODE_BAR));
        let pad = self.pad();
        self.pads.pop();

        let formatted =
            paragraph::format_padded(highlighted.trim_end_matches('\n'), self.line_width, &pad);
        self.out.push_str(&formatted.text);
        self.out.push_str("\n\n");
    }

    /// Effective left pad: the fixed margin plus every pushed fragment.
    fn pad(&self) -> String {
        format!("{}{}", " ".repeat(self.left_pad), self.pads.concat())
    }

    fn rule(&self) -> String {
        RULE.repeat(self.line_width.saturating_sub(self.left_pad).max(1))
    }

    fn parent(&self) -> Option<&'a NodeKind> {
        self.ancestors.last().copied()
    }

    fn table_mut(&mut self, kind: &NodeKind) -> Result<&mut TableRenderer> {
        self.table
            .as_mut()
            .ok_or_else(|| Error::malformed_tree(format!("{} outside of a table", kind.name())))
    }

    /// Whether text line breaks collapse to spaces. The innermost block
    /// quote, heading, link, image, table cell or item decides.
    fn collapses_breaks(&self) -> bool {
        for kind in self.ancestors.iter().rev() {
            match kind {
                NodeKind::BlockQuote => return false,
                NodeKind::Heading { .. }
                | NodeKind::Image { .. }
                | NodeKind::Link { .. }
                | NodeKind::TableCell { .. }
                | NodeKind::Item { .. }
                | NodeKind::Document => return true,
                _ => {}
            }
        }
        true
    }
}

/// Join the lines of `text` with single spaces, trimming whitespace around
/// each break.
fn collapse_breaks(text: &str) -> Cow<'_, str> {
    if !text.contains('\n') {
        return Cow::Borrowed(text);
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    let joined = lines
        .iter()
        .enumerate()
        .map(|(i, line)| match i {
            0 => line.trim_end(),
            i if i == last => line.trim_start(),
            _ => line.trim(),
        })
        .collect::<Vec<_>>()
        .join(" ");

    Cow::Owned(joined)
}
