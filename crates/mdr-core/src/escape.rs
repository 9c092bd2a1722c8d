//! SGR escape sequence handling.
//!
//! Wrapping works on escape-free text. [`extract`] pulls the escapes out of a
//! line, recording where each one belongs in the clean string's rune index
//! space, and [`apply`] puts them back. Widths are measured in terminal
//! cells, with escapes occupying none.

use unicode_width::UnicodeWidthChar;

pub const ESC: char = '\x1b';

/// An escape sequence and the rune index in the clean string it precedes.
///
/// For `"F\x1b[33mox"` the item is `{ item: "\x1b[33m", pos: 1 }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeItem {
    pub item: String,
    pub pos: usize,
}

/// Display width of a single rune. East-Asian ambiguous runes are narrow,
/// control runes are zero.
pub fn rune_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Split `line` into its escape-free text and the escapes removed from it.
///
/// An escape runs from `ESC` through the next `m`. Escapes that end up at the
/// same position are merged, so item positions are strictly increasing. An
/// unterminated escape is kept as a trailing item.
pub fn extract(line: &str) -> (String, Vec<EscapeItem>) {
    let mut clean = String::with_capacity(line.len());
    let mut items: Vec<EscapeItem> = Vec::new();
    let mut clean_runes = 0;
    let mut pending: Option<String> = None;

    for c in line.chars() {
        if c == ESC {
            if let Some(partial) = pending.take() {
                push_item(&mut items, partial, clean_runes);
            }
            pending = Some(c.to_string());
            continue;
        }
        if let Some(seq) = pending.as_mut() {
            seq.push(c);
            if c == 'm' {
                if let Some(seq) = pending.take() {
                    push_item(&mut items, seq, clean_runes);
                }
            }
            continue;
        }
        clean.push(c);
        clean_runes += 1;
    }

    if let Some(partial) = pending {
        push_item(&mut items, partial, clean_runes);
    }

    (clean, items)
}

fn push_item(items: &mut Vec<EscapeItem>, seq: String, pos: usize) {
    match items.last_mut() {
        Some(last) if last.pos == pos => last.item.push_str(&seq),
        _ => items.push(EscapeItem { item: seq, pos }),
    }
}

/// Reinsert escapes extracted by [`extract`].
///
/// Each item goes before the rune at its position; items at or past the end
/// are appended. The only edit allowed on `clean` in between is inserting
/// runes that were never counted, which callers must guarantee.
pub fn apply(clean: &str, items: &[EscapeItem]) -> String {
    if items.is_empty() {
        return clean.to_string();
    }

    let extra: usize = items.iter().map(|i| i.item.len()).sum();
    let mut out = String::with_capacity(clean.len() + extra);
    let mut pending = items.iter().peekable();

    for (pos, c) in clean.chars().enumerate() {
        while let Some(item) = pending.next_if(|item| item.pos <= pos) {
            out.push_str(&item.item);
        }
        out.push(c);
    }

    // Trailing escapes, if any.
    for item in pending {
        out.push_str(&item.item);
    }

    out
}

/// Visible width of `s` in terminal cells, ignoring escape sequences.
pub fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut escape = false;

    for c in s.chars() {
        if c == ESC {
            escape = true;
        }
        if !escape {
            width += rune_width(c);
        }
        if c == 'm' {
            escape = false;
        }
    }

    width
}

/// Split `word` so that the left part is at most `width` cells wide.
///
/// Wide runes are never split and escape sequences are never cut in half.
/// A `width` of zero yields `("", word)`.
pub fn split_at_width(word: &str, width: usize) -> (&str, &str) {
    if width == 0 {
        return ("", word);
    }

    let mut added = 0;
    let mut escape = false;
    let mut end = 0;

    for (idx, c) in word.char_indices() {
        if c == ESC {
            escape = true;
        }
        if escape {
            end = idx + c.len_utf8();
            if c == 'm' {
                escape = false;
            }
            continue;
        }

        let w = rune_width(c);
        if added + w > width {
            // wide rune would overflow
            break;
        }
        added += w;
        end = idx + c.len_utf8();
        if added >= width {
            break;
        }
    }

    word.split_at(end)
}
