//! The render tree consumed by the layout engine.
//!
//! The tree is produced by an external markdown parser and is read-only for
//! the duration of a render. Every node type the walker understands is a
//! variant of [`NodeKind`], so an unclassified node cannot be constructed.

use serde::Serialize;

/// Column alignment of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    None,
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Unordered,
    Ordered,
    Definition,
}

/// Role of an item inside its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Bullet,
    Ordered,
    /// The term being defined in a definition list.
    Term,
    /// The body of a definition.
    Definition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Document,
    BlockQuote,
    List {
        kind: ListKind,
    },
    Item {
        kind: ItemKind,
    },
    Paragraph,
    Heading {
        level: u8,
    },
    HorizontalRule,
    Emphasis,
    Strong,
    Strikethrough,
    Link {
        destination: String,
        title: String,
    },
    Image {
        destination: String,
        title: String,
    },
    Text {
        literal: String,
    },
    HtmlBlock {
        literal: String,
    },
    HtmlInline {
        literal: String,
    },
    CodeBlock {
        /// Declared language tag, if any.
        info: Option<String>,
        literal: String,
    },
    InlineCode {
        literal: String,
    },
    SoftBreak,
    HardBreak,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableCell {
        alignment: Alignment,
        header: bool,
    },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::BlockQuote => "block quote",
            NodeKind::List { .. } => "list",
            NodeKind::Item { .. } => "item",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading { .. } => "heading",
            NodeKind::HorizontalRule => "horizontal rule",
            NodeKind::Emphasis => "emphasis",
            NodeKind::Strong => "strong",
            NodeKind::Strikethrough => "strikethrough",
            NodeKind::Link { .. } => "link",
            NodeKind::Image { .. } => "image",
            NodeKind::Text { .. } => "text",
            NodeKind::HtmlBlock { .. } => "html block",
            NodeKind::HtmlInline { .. } => "inline html",
            NodeKind::CodeBlock { .. } => "code block",
            NodeKind::InlineCode { .. } => "inline code",
            NodeKind::SoftBreak => "soft break",
            NodeKind::HardBreak => "hard break",
            NodeKind::Table => "table",
            NodeKind::TableHead => "table head",
            NodeKind::TableBody => "table body",
            NodeKind::TableRow => "table row",
            NodeKind::TableCell { .. } => "table cell",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    pub fn document(children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::Document, children)
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::Paragraph, children)
    }

    pub fn heading(level: u8, children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::Heading { level }, children)
    }

    pub fn block_quote(children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::BlockQuote, children)
    }

    pub fn list(kind: ListKind, items: Vec<Node>) -> Self {
        Self::with_children(NodeKind::List { kind }, items)
    }

    pub fn item(kind: ItemKind, children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::Item { kind }, children)
    }

    pub fn text(literal: impl Into<String>) -> Self {
        Self::new(NodeKind::Text {
            literal: literal.into(),
        })
    }

    pub fn inline_code(literal: impl Into<String>) -> Self {
        Self::new(NodeKind::InlineCode {
            literal: literal.into(),
        })
    }

    pub fn code_block(info: Option<&str>, literal: impl Into<String>) -> Self {
        Self::new(NodeKind::CodeBlock {
            info: info.map(str::to_string),
            literal: literal.into(),
        })
    }

    pub fn link(destination: impl Into<String>, title: impl Into<String>, children: Vec<Node>) -> Self {
        Self::with_children(
            NodeKind::Link {
                destination: destination.into(),
                title: title.into(),
            },
            children,
        )
    }

    pub fn table_cell(alignment: Alignment, header: bool, children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::TableCell { alignment, header }, children)
    }

    /// Concatenated literal text of all descendants, used for link labels.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text { literal } | NodeKind::InlineCode { literal } => out.push_str(literal),
            NodeKind::SoftBreak | NodeKind::HardBreak => out.push(' '),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}
