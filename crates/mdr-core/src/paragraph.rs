//! Multi-line wrapping with a first-line indent and a continuation pad.

use crate::escape::visible_width;
use crate::wrap::soft_wrap_line;

/// Lines produced by [`format`], joined by `\n`, and how many there are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub text: String,
    pub lines: usize,
}

/// Wrap `text` to `width` cells.
///
/// The first line is prefixed by `indent`, every other line by `pad`; the
/// prefix counts against the width. Tabs become four spaces. Blank input
/// lines are emitted as the prefix with trailing spaces removed. Leading
/// whitespace of continuation lines produced by wrapping is dropped, so
/// wrapped text aligns under the pad.
pub fn format(text: &str, width: usize, indent: &str, pad: &str) -> Formatted {
    let text = text.replace('\t', "    ");
    let mut lines = Vec::new();
    let mut prefix = indent;

    for (i, line) in text.split('\n').enumerate() {
        if i == 1 {
            prefix = pad;
        }

        if line.trim().is_empty() {
            lines.push(prefix.trim_end_matches(' ').to_string());
            continue;
        }

        let mut line = line;
        if i == 0 {
            let wrapped = soft_wrap_line(line, budget(width, prefix));
            if let Some((first, _)) = wrapped.split_once('\n') {
                // The indent only applies to the very first output line: emit
                // it, then rewrap the remainder with the pad.
                lines.push(format!("{}{}", prefix, first.trim_end_matches(' ')));
                // wrapping only inserts breaks, so `first` prefixes `line`
                line = line.strip_prefix(first).unwrap_or("").trim_start_matches(' ');
                prefix = pad;
            }
        }

        let wrapped = soft_wrap_line(line, budget(width, prefix));
        for (j, seg) in wrapped.split('\n').enumerate() {
            let seg = if j == 0 {
                seg.trim_end_matches(' ')
            } else {
                seg.trim()
            };
            lines.push(format!("{}{}", prefix, seg));
        }
    }

    Formatted {
        lines: lines.len(),
        text: lines.join("\n"),
    }
}

/// Wrap with the same prefix on every line.
pub fn format_padded(text: &str, width: usize, pad: &str) -> Formatted {
    format(text, width, pad, pad)
}

/// Wrap without any prefix.
pub fn wrap(text: &str, width: usize) -> Formatted {
    format(text, width, "", "")
}

fn budget(width: usize, prefix: &str) -> usize {
    width.saturating_sub(visible_width(prefix)).max(1)
}
