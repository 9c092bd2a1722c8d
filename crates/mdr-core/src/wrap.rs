//! Soft-wrapping of a single line.
//!
//! The line is broken into non-breakable chunks, then line breaks are
//! inserted between chunks so that no line exceeds the requested width.
//! Chunks wider than a whole line are split to fill the remaining space.
//! Nothing is removed from the input: the result with its inserted `\n`s
//! removed is the original line.

use crate::escape::{extract, rune_width, split_at_width, visible_width, EscapeItem};

/// Rune categories. Each category forms a non-breakable chunk; these are
/// not Unicode general categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuneClass {
    WideChar,
    Invisible,
    ShortUnicode,
    Space,
    VisibleAscii,
}

fn classify(c: char) -> RuneClass {
    match rune_width(c) {
        w if w > 1 => RuneClass::WideChar,
        0 => RuneClass::Invisible,
        _ if c as u32 > 127 => RuneClass::ShortUnicode,
        _ if c == ' ' => RuneClass::Space,
        _ => RuneClass::VisibleAscii,
    }
}

/// Segment an escape-free line into maximal runs of same-class runes.
/// Every wide rune is a chunk of its own.
pub fn segment(s: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut current: Option<RuneClass> = None;

    for (idx, c) in s.char_indices() {
        let class = classify(c);
        if class == RuneClass::WideChar {
            if current.is_some() {
                chunks.push(&s[start..idx]);
            }
            chunks.push(&s[idx..idx + c.len_utf8()]);
            current = None;
            start = idx + c.len_utf8();
            continue;
        }
        match current {
            Some(prev) if prev == class => {}
            Some(_) => {
                chunks.push(&s[start..idx]);
                start = idx;
                current = Some(class);
            }
            None => {
                start = idx;
                current = Some(class);
            }
        }
    }
    if current.is_some() {
        chunks.push(&s[start..]);
    }

    chunks
}

/// Writes escape-free text while interleaving the extracted escapes at
/// their recorded rune positions. Inserted line breaks are not counted, so
/// the positions never need to be offset.
struct EscapeWriter<'a> {
    out: String,
    escapes: &'a [EscapeItem],
    next: usize,
    pos: usize,
}

impl<'a> EscapeWriter<'a> {
    fn new(capacity: usize, escapes: &'a [EscapeItem]) -> Self {
        Self {
            out: String::with_capacity(capacity),
            escapes,
            next: 0,
            pos: 0,
        }
    }

    fn write(&mut self, s: &str) {
        for c in s.chars() {
            while self.next < self.escapes.len() && self.escapes[self.next].pos <= self.pos {
                self.out.push_str(&self.escapes[self.next].item);
                self.next += 1;
            }
            self.out.push(c);
            self.pos += 1;
        }
    }

    fn line_break(&mut self) {
        self.out.push('\n');
    }

    /// True when the current line follows a break and holds only `filled`
    /// spaces of indentation.
    fn indent_only(&self, filled: usize) -> bool {
        let suffix = format!("\n{}", " ".repeat(filled));
        self.out.ends_with(&suffix)
    }

    fn finish(mut self) -> String {
        // Don't forget the trailing escapes, if any.
        for item in &self.escapes[self.next..] {
            self.out.push_str(&item.item);
        }
        self.out
    }
}

/// Break `line` so that each line consumes at most `width` cells.
///
/// `line` must not contain `\n`. Lines break between chunks; chunks longer
/// than `width` are split mid-token. A `width` of zero is treated as one.
/// A line that already fits is returned unchanged.
pub fn soft_wrap_line(line: &str, width: usize) -> String {
    let width = width.max(1);
    if visible_width(line) <= width {
        return line.to_string();
    }

    let (clean, escapes) = extract(line);

    // Reversed so it can be used as a stack.
    let mut chunks = segment(&clean);
    chunks.reverse();

    let mut out = EscapeWriter::new(line.len() + 8, &escapes);
    let mut filled = 0;

    while let Some(chunk) = chunks.pop() {
        let chunk_width = visible_width(chunk);

        if filled + chunk_width <= width {
            out.write(chunk);
            filled += chunk_width;
            if filled == width && !chunks.is_empty() {
                // only break when more chunks are to come
                out.line_break();
                filled = 0;
            }
        } else if chunk_width > width {
            // Too long for a full line: fill the remaining space. Spaces that
            // only indent a continuation line are not counted, they get
            // trimmed downstream.
            let mut budget = width - filled;
            if filled > 0 && out.indent_only(filled) {
                budget += filled;
            }

            let (left, right) = split_at_width(chunk, budget);
            if left.is_empty() {
                if filled > 0 {
                    chunks.push(chunk);
                    out.line_break();
                    filled = 0;
                    continue;
                }
                // A wide rune on a one-column line: emit it alone rather
                // than drop it.
                let first = chunk.chars().next().map_or(0, char::len_utf8);
                let (head, tail) = chunk.split_at(first);
                out.write(head);
                if !tail.is_empty() {
                    chunks.push(tail);
                }
                if !chunks.is_empty() {
                    out.line_break();
                }
                continue;
            }

            // remainder goes back on the stack for the next line
            if !right.is_empty() {
                chunks.push(right);
            }
            out.write(left);
            out.line_break();
            filled = 0;
        } else {
            // normal overflow, break and try again
            chunks.push(chunk);
            out.line_break();
            filled = 0;
        }
    }

    out.finish()
}
