//! Table layout.
//!
//! Cells are collected while the walker visits a table, then laid out in a
//! single pass once the table is complete and every column width is known.

use crate::escape::{extract, rune_width, visible_width};
use crate::paragraph;
use crate::style::BOLD;
use crate::tree::Alignment;

/// Column separator.
const SEPARATOR: &str = "│";
/// Horizontal rule between the header and the body.
const RULE: &str = "─";
const RULE_CROSS: &str = "┼";

#[derive(Debug, Clone, Default)]
pub struct TableRenderer {
    header: Vec<(String, Alignment)>,
    rows: Vec<Vec<String>>,
}

impl TableRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header cell. The header defines the columns.
    pub fn add_header_cell(&mut self, content: String, alignment: Alignment) {
        self.header.push((content, alignment));
    }

    /// Start a new body row.
    pub fn next_body_row(&mut self) {
        self.rows.push(Vec::new());
    }

    /// Append a cell to the current body row.
    pub fn add_body_cell(&mut self, content: String) {
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        if let Some(row) = self.rows.last_mut() {
            row.push(content);
        }
    }

    pub fn num_cols(&self) -> usize {
        self.header.len()
    }

    /// Lay out the table in at most `width` cells per line.
    ///
    /// Rows with missing cells are padded with empty ones and extra cells
    /// are dropped. Columns keep their natural width when the table fits,
    /// and are shrunk proportionally otherwise, wrapping their content.
    pub fn render(&self, width: usize) -> Vec<String> {
        let num_cols = self.num_cols();
        if num_cols == 0 {
            return Vec::new();
        }

        let rows: Vec<Vec<&str>> = self
            .rows
            .iter()
            .map(|row| {
                (0..num_cols)
                    .map(|i| row.get(i).map_or("", String::as_str))
                    .collect()
            })
            .collect();

        let natural: Vec<usize> = (0..num_cols)
            .map(|i| {
                rows.iter()
                    .map(|row| visible_width(row[i]))
                    .chain(std::iter::once(visible_width(&self.header[i].0)))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let minimum: Vec<usize> = (0..num_cols)
            .map(|i| {
                rows.iter()
                    .map(|row| row[i])
                    .chain(std::iter::once(self.header[i].0.as_str()))
                    .map(widest_rune)
                    .max()
                    .unwrap_or(0)
                    .max(1)
            })
            .collect();
        let widths = calculate_col_widths(&natural, &minimum, width);

        let mut lines = Vec::new();

        let header: Vec<&str> = self.header.iter().map(|(c, _)| c.as_str()).collect();
        lines.extend(self.render_row(&header, &widths, true));

        lines.push(
            widths
                .iter()
                .map(|w| RULE.repeat(w + 2))
                .collect::<Vec<_>>()
                .join(RULE_CROSS),
        );

        for row in &rows {
            lines.extend(self.render_row(row, &widths, false));
        }

        lines
    }

    fn render_row(&self, cells: &[&str], widths: &[usize], header: bool) -> Vec<String> {
        let wrapped: Vec<Vec<String>> = cells
            .iter()
            .zip(widths)
            .map(|(cell, &w)| wrap_cell(cell, w))
            .collect();
        let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);

        (0..height)
            .map(|line| {
                wrapped
                    .iter()
                    .enumerate()
                    .map(|(col, cell_lines)| {
                        let content = cell_lines.get(line).map_or("", String::as_str);
                        let aligned = align(content, widths[col], self.header[col].1);
                        if header && !content.is_empty() {
                            format!(" {} ", BOLD.wrap(&aligned))
                        } else {
                            format!(" {} ", aligned)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(SEPARATOR)
            })
            .collect()
    }
}

/// Column widths for `width` total cells. Each cell is padded by one space
/// on each side and columns are joined by a one-cell separator.
///
/// A shrunk column never drops below its `minimum`, the widest rune it
/// holds, so wide runes are never split across a narrower column.
fn calculate_col_widths(natural: &[usize], minimum: &[usize], width: usize) -> Vec<usize> {
    let num_cols = natural.len();
    let overhead = num_cols * 2 + num_cols.saturating_sub(1);
    let usable = width.saturating_sub(overhead).max(num_cols);

    let total: usize = natural.iter().sum();
    if total <= usable {
        return natural.to_vec();
    }

    let mut widths: Vec<usize> = natural
        .iter()
        .zip(minimum)
        .map(|(&w, &min)| (w * usable / total).max(min))
        .collect();

    // take what the minimums added back from the columns with the most slack
    let mut excess = widths.iter().sum::<usize>().saturating_sub(usable);
    while excess > 0 {
        let Some(col) = (0..num_cols)
            .filter(|&i| widths[i] > minimum[i])
            .max_by_key(|&i| widths[i] - minimum[i])
        else {
            break;
        };
        widths[col] -= 1;
        excess -= 1;
    }

    widths
}

fn widest_rune(cell: &str) -> usize {
    extract(cell).0.chars().map(rune_width).max().unwrap_or(0)
}

fn wrap_cell(content: &str, width: usize) -> Vec<String> {
    if visible_width(content) <= width {
        return vec![content.to_string()];
    }
    paragraph::wrap(content, width)
        .text
        .split('\n')
        .map(str::to_string)
        .collect()
}

fn align(content: &str, width: usize, alignment: Alignment) -> String {
    let gap = width.saturating_sub(visible_width(content));
    match alignment {
        Alignment::Right => format!("{}{}", " ".repeat(gap), content),
        Alignment::Center => {
            let left = gap / 2;
            format!("{}{}{}", " ".repeat(left), content, " ".repeat(gap - left))
        }
        Alignment::Left | Alignment::None => format!("{}{}", content, " ".repeat(gap)),
    }
}
