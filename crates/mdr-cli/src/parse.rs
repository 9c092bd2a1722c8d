//! Markdown parsing: pulldown-cmark events folded into a render tree.

use pulldown_cmark::{
    Alignment as CmarkAlignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag,
    TagEnd,
};

use mdr_core::{Alignment, ItemKind, ListKind, Node, NodeKind};

/// Parse `source` into a render tree rooted at a document node.
pub fn parse(source: &str) -> Node {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_DEFINITION_LIST;

    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(source, options) {
        builder.push_event(event);
    }
    builder.finish()
}

/// A node still receiving children. Synthetic nodes have no matching end
/// event and are closed implicitly.
struct Open {
    node: Node,
    synthetic: bool,
}

struct TreeBuilder {
    stack: Vec<Open>,
    lists: Vec<ListKind>,
    alignments: Vec<Alignment>,
    column: usize,
    in_head: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Open {
                node: Node::document(Vec::new()),
                synthetic: false,
            }],
            lists: Vec::new(),
            alignments: Vec::new(),
            column: 0,
            in_head: false,
        }
    }

    fn push_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => match self.open_literal() {
                Some(literal) => literal.push_str(&text),
                None => self.text(&text),
            },
            Event::Html(html) => match self.open_literal() {
                Some(literal) => literal.push_str(&html),
                None => self.block(Node::new(NodeKind::HtmlBlock {
                    literal: html.to_string(),
                })),
            },
            Event::Code(code) => self.inline(Node::inline_code(code.to_string())),
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.inline(Node::inline_code(math.to_string()))
            }
            Event::InlineHtml(html) => self.inline(Node::new(NodeKind::HtmlInline {
                literal: html.to_string(),
            })),
            Event::FootnoteReference(name) => self.inline(Node::text(format!("[^{}]", name))),
            // kept in the literal so the renderer decides whether it collapses
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.inline(Node::new(NodeKind::HardBreak)),
            Event::Rule => self.block(Node::new(NodeKind::HorizontalRule)),
            Event::TaskListMarker(checked) => {
                self.inline(Node::text(if checked { "[x] " } else { "[ ] " }))
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.open_block(NodeKind::Paragraph),
            Tag::Heading { level, .. } => self.open_block(NodeKind::Heading {
                level: heading_level(level),
            }),
            Tag::BlockQuote(_) => self.open_block(NodeKind::BlockQuote),
            Tag::CodeBlock(kind) => {
                let info = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().map(str::to_string)
                    }
                    CodeBlockKind::Indented => None,
                };
                self.open_block(NodeKind::CodeBlock {
                    info,
                    literal: String::new(),
                });
            }
            Tag::HtmlBlock => self.open_block(NodeKind::HtmlBlock {
                literal: String::new(),
            }),
            Tag::List(start) => {
                let kind = if start.is_some() {
                    ListKind::Ordered
                } else {
                    ListKind::Unordered
                };
                self.lists.push(kind);
                self.open_block(NodeKind::List { kind });
            }
            Tag::Item => {
                let kind = match self.lists.last() {
                    Some(ListKind::Ordered) => ItemKind::Ordered,
                    _ => ItemKind::Bullet,
                };
                self.open_block(NodeKind::Item { kind });
            }
            Tag::DefinitionList => {
                self.lists.push(ListKind::Definition);
                self.open_block(NodeKind::List {
                    kind: ListKind::Definition,
                });
            }
            Tag::DefinitionListTitle => self.open_block(NodeKind::Item {
                kind: ItemKind::Term,
            }),
            Tag::DefinitionListDefinition => self.open_block(NodeKind::Item {
                kind: ItemKind::Definition,
            }),
            Tag::Table(alignments) => {
                self.alignments = alignments.into_iter().map(convert_alignment).collect();
                self.open_block(NodeKind::Table);
            }
            Tag::TableHead => {
                // header cells arrive without a row of their own
                self.in_head = true;
                self.column = 0;
                self.open(NodeKind::TableHead);
                self.open(NodeKind::TableRow);
            }
            Tag::TableRow => {
                if self.top_is(|kind| *kind == NodeKind::Table) {
                    self.open(NodeKind::TableBody);
                }
                self.column = 0;
                self.open(NodeKind::TableRow);
            }
            Tag::TableCell => {
                let alignment = self.alignments.get(self.column).copied().unwrap_or_default();
                self.open(NodeKind::TableCell {
                    alignment,
                    header: self.in_head,
                });
            }
            Tag::Emphasis => self.open_inline(NodeKind::Emphasis),
            Tag::Strong => self.open_inline(NodeKind::Strong),
            Tag::Strikethrough => self.open_inline(NodeKind::Strikethrough),
            Tag::Link {
                dest_url, title, ..
            } => self.open_inline(NodeKind::Link {
                destination: dest_url.to_string(),
                title: title.to_string(),
            }),
            Tag::Image {
                dest_url, title, ..
            } => self.open_inline(NodeKind::Image {
                destination: dest_url.to_string(),
                title: title.to_string(),
            }),
            // Footnotes, metadata, super/subscript: content flows into the parent
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::CodeBlock
            | TagEnd::HtmlBlock
            | TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Link
            | TagEnd::Image
            | TagEnd::TableRow => self.close(),
            TagEnd::TableCell => {
                self.close();
                self.column += 1;
            }
            TagEnd::Item | TagEnd::DefinitionListTitle | TagEnd::DefinitionListDefinition => {
                self.close_synthetic();
                self.close();
            }
            TagEnd::List(_) | TagEnd::DefinitionList => {
                self.close_synthetic();
                self.lists.pop();
                self.close();
            }
            TagEnd::TableHead => {
                self.close(); // row
                self.close(); // head
                self.in_head = false;
            }
            TagEnd::Table => {
                if self.top_is(|kind| *kind == NodeKind::TableBody) {
                    self.close();
                }
                self.close();
                self.alignments.clear();
            }
            _ => {}
        }
    }

    fn top_is(&self, pred: impl Fn(&NodeKind) -> bool) -> bool {
        self.stack.last().is_some_and(|open| pred(&open.node.kind))
    }

    /// Literal of an open code or HTML block, which absorbs text events.
    fn open_literal(&mut self) -> Option<&mut String> {
        match &mut self.stack.last_mut()?.node.kind {
            NodeKind::CodeBlock { literal, .. } | NodeKind::HtmlBlock { literal } => Some(literal),
            _ => None,
        }
    }

    fn open(&mut self, kind: NodeKind) {
        self.stack.push(Open {
            node: Node::new(kind),
            synthetic: false,
        });
    }

    fn open_block(&mut self, kind: NodeKind) {
        self.close_synthetic();
        self.open(kind);
    }

    fn open_inline(&mut self, kind: NodeKind) {
        self.ensure_paragraph();
        self.open(kind);
    }

    fn inline(&mut self, node: Node) {
        self.ensure_paragraph();
        self.append(node);
    }

    /// Append to the trailing text node, so a source paragraph split into
    /// several text and break events stays one literal.
    fn text(&mut self, text: &str) {
        self.ensure_paragraph();
        let last = self
            .stack
            .last_mut()
            .and_then(|open| open.node.children.last_mut());
        match last {
            Some(Node {
                kind: NodeKind::Text { literal },
                ..
            }) => literal.push_str(text),
            _ => self.append(Node::text(text)),
        }
    }

    fn block(&mut self, node: Node) {
        self.close_synthetic();
        self.append(node);
    }

    fn append(&mut self, node: Node) {
        if let Some(open) = self.stack.last_mut() {
            open.node.children.push(node);
        }
    }

    /// Tight list items and definitions hold inline content directly; give
    /// it a paragraph so it is flushed like any other block.
    fn ensure_paragraph(&mut self) {
        if self.top_is(|kind| matches!(kind, NodeKind::Item { .. })) {
            self.stack.push(Open {
                node: Node::paragraph(Vec::new()),
                synthetic: true,
            });
        }
    }

    fn close_synthetic(&mut self) {
        while self.stack.last().is_some_and(|open| open.synthetic) {
            self.close();
        }
    }

    fn close(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some(open) = self.stack.pop() {
            self.append(open.node);
        }
    }

    fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.close();
        }
        self.stack
            .pop()
            .map(|open| open.node)
            .unwrap_or_else(|| Node::document(Vec::new()))
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn convert_alignment(alignment: CmarkAlignment) -> Alignment {
    match alignment {
        CmarkAlignment::None => Alignment::None,
        CmarkAlignment::Left => Alignment::Left,
        CmarkAlignment::Center => Alignment::Center,
        CmarkAlignment::Right => Alignment::Right,
    }
}
