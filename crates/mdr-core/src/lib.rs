//! mdr-core: terminal markdown layout engine
//!
//! Converts a parsed markdown render tree into word-wrapped, padded,
//! ANSI-colored text sized to a terminal width. Parsing and terminal I/O
//! are left to the caller.

pub mod enrich;
pub mod error;
pub mod escape;
pub mod heading;
pub mod highlight;
pub mod pager;
pub mod paragraph;
pub mod render;
pub mod style;
pub mod table;
pub mod tree;
pub mod wrap;

mod walker;

pub use enrich::{NoEnrichment, Shortcodes, TextEnricher};
pub use error::Error;
pub use heading::HeadingNumbering;
pub use highlight::{Highlighter, PlainHighlighter, SyntectHighlighter, DEFAULT_THEME};
pub use pager::Pager;
pub use render::{render, ImageDithering, RenderOptions, Rendered, Renderer};
pub use style::MarkdownStyle;
pub use table::TableRenderer;
pub use tree::{Alignment, ItemKind, ListKind, Node, NodeKind};

pub type Result<T> = std::result::Result<T, Error>;
