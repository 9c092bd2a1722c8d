//! Property-based invariant tests for escape handling and wrapping.
//!
//! 1. extract/apply round-trips any mix of text and SGR sequences
//! 2. wrapped lines never exceed the target width
//! 3. lines that already fit are returned unchanged
//! 4. wrapping short words preserves the word sequence
//! 5. heading labels have one component per level
//! 6. rendered documents respect the width and report their line count

use mdr_core::escape::{apply, extract, visible_width};
use mdr_core::paragraph;
use mdr_core::wrap::soft_wrap_line;
use mdr_core::{HeadingNumbering, Node, RenderOptions, Renderer};
use proptest::prelude::*;

// ── Helpers ──────────────────────────────────────────────────────────

fn arb_sgr() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "\x1b[0m",
        "\x1b[1m",
        "\x1b[3m",
        "\x1b[22m",
        "\x1b[31m",
        "\x1b[44m",
        "\x1b[38;2;10;20;30m",
    ])
    .prop_map(str::to_string)
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-zA-Z0-9 .,!]{1,8}",
        1 => "[日本語中文]{1,3}",
        1 => "[éàü ]{1,3}",
    ]
}

/// A single line mixing printable runes and color sequences.
fn arb_line() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![3 => arb_text(), 1 => arb_sgr()], 0..12)
        .prop_map(|parts| parts.concat())
}

/// Words separated by single spaces, optionally colored.
fn arb_sentence() -> impl Strategy<Value = String> {
    prop::collection::vec(
        ("[a-z日本]{1,6}", prop::option::of(arb_sgr())).prop_map(|(word, sgr)| {
            let mut out = sgr.unwrap_or_default();
            out.push_str(&word);
            out
        }),
        1..8,
    )
    .prop_map(|words| words.join(" "))
}

fn is_single_rune(line: &str) -> bool {
    extract(line).0.chars().count() == 1
}

// ═════════════════════════════════════════════════════════════════════════
// 1. extract/apply round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn escape_round_trip(line in arb_line()) {
        let (clean, items) = extract(&line);
        prop_assert_eq!(apply(&clean, &items), line);
        prop_assert!(!clean.contains('\x1b'));
        for pair in items.windows(2) {
            prop_assert!(pair[0].pos < pair[1].pos, "positions must be strictly increasing");
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. wrapped lines never exceed the width
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn wrapped_lines_fit(line in arb_line(), width in 1usize..40) {
        let formatted = paragraph::wrap(&line, width);
        for out in formatted.text.split('\n') {
            let w = visible_width(out);
            prop_assert!(
                w <= width || (width == 1 && is_single_rune(out)),
                "line {:?} is {} wide, limit {}", out, w, width
            );
        }
    }

    #[test]
    fn soft_wrap_only_inserts_breaks(line in arb_line(), width in 1usize..40) {
        let wrapped = soft_wrap_line(&line, width);
        prop_assert_eq!(wrapped.replace('\n', ""), line);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. idempotence for lines that fit
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn fitting_line_unchanged(line in arb_sentence(), extra in 0usize..10) {
        let width = visible_width(&line) + extra;
        prop_assert_eq!(soft_wrap_line(&line, width), line.clone());

        let formatted = paragraph::format_padded(&line, width + 2, "> ");
        prop_assert_eq!(formatted.text, format!("> {}", line));
        prop_assert_eq!(formatted.lines, 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. word sequence preserved
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn words_preserved(
        words in prop::collection::vec("[a-z]{1,8}", 1..20),
        width in 8usize..60,
    ) {
        let line = words.join(" ");
        let formatted = paragraph::wrap(&line, width);

        let rewrapped: Vec<&str> = formatted.text.split_whitespace().collect();
        prop_assert_eq!(rewrapped, words.iter().map(String::as_str).collect::<Vec<_>>());

        for out in formatted.text.split('\n') {
            prop_assert!(visible_width(out) <= width);
        }
        prop_assert_eq!(formatted.lines, formatted.text.split('\n').count());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. heading labels
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn heading_label_depth(levels in prop::collection::vec(1u8..=6, 1..30)) {
        let mut numbering = HeadingNumbering::new();
        for level in levels {
            numbering.observe(level);
            let label = numbering.render();
            let parts: Vec<&str> = label.split('.').collect();
            prop_assert_eq!(parts.len(), usize::from(level));
            prop_assert_ne!(parts[parts.len() - 1], "0");
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. rendered documents
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rendered_paragraphs_fit(
        paragraphs in prop::collection::vec(prop::collection::vec("[a-z]{1,8}", 1..15), 1..5),
        margin in 0usize..6,
        extra in 8usize..50,
    ) {
        let width = margin + extra;
        let children = paragraphs
            .iter()
            .map(|words| Node::paragraph(vec![Node::text(words.join(" "))]))
            .collect();
        let tree = Node::document(children);

        let options = RenderOptions::new().with_highlight(false).with_emoji(false);
        let rendered = Renderer::with_options(width, margin, options).render(&tree).unwrap();

        let text = rendered.as_str();
        prop_assert_eq!(rendered.line_count(), text.matches('\n').count());
        for line in text.lines() {
            prop_assert!(visible_width(line) <= width);
            if !line.is_empty() {
                prop_assert!(line.starts_with(&" ".repeat(margin)));
            }
        }
    }
}
