//! Colors and SGR sequences used by the renderer.
//!
//! Styles are expressed as ratatui [`Style`] values and converted to SGR
//! escape sequences when painted. Inline formatting that can nest (emphasis,
//! strong, strike-through) uses explicit on/off [`Marker`]s instead, so that
//! closing one does not reset the others.

use ratatui::style::{Color, Modifier, Style};

pub const RESET: &str = "\x1b[0m";

/// A pair of SGR sequences that switch one attribute on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub on: &'static str,
    pub off: &'static str,
}

impl Marker {
    pub fn wrap(&self, text: &str) -> String {
        format!("{}{}{}", self.on, text, self.off)
    }
}

pub const ITALIC: Marker = Marker {
    on: "\x1b[3m",
    off: "\x1b[23m",
};

pub const BOLD: Marker = Marker {
    on: "\x1b[1m",
    off: "\x1b[22m",
};

pub const CROSSED_OUT: Marker = Marker {
    on: "\x1b[9m",
    off: "\x1b[29m",
};

/// Green foreground for definition terms, reset to the default foreground.
pub const TERM: Marker = Marker {
    on: "\x1b[32m",
    off: "\x1b[39m",
};

/// Style definitions for rendered elements.
#[derive(Debug, Clone)]
pub struct MarkdownStyle {
    pub h1: Style,
    pub h2: Style,
    pub h3: Style,
    pub h4_h6: Style,
    pub bullet: Style,
    pub link: Style,
    pub inline_code: Style,
    pub html: Style,
    pub code_bar: Style,
    /// Applied to code blocks that are not highlighted.
    pub code_block: Style,
    /// Quote bar colors, cycled by nesting depth.
    pub quote_bars: Vec<Style>,
}

impl Default for MarkdownStyle {
    fn default() -> Self {
        Self {
            h1: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            h2: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            h3: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            h4_h6: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            bullet: Style::default().fg(Color::Green),
            link: Style::default().fg(Color::Blue),
            inline_code: Style::default()
                .bg(Color::Blue)
                .add_modifier(Modifier::ITALIC),
            html: Style::default().fg(Color::Red),
            code_bar: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            code_block: Style::default().fg(Color::Yellow),
            quote_bars: vec![
                Style::default().fg(Color::Green),
                Style::default().fg(Color::Yellow),
                Style::default().fg(Color::Magenta),
                Style::default().fg(Color::Cyan),
            ],
        }
    }
}

impl MarkdownStyle {
    pub fn heading(&self, level: u8) -> Style {
        match level {
            1 => self.h1,
            2 => self.h2,
            3 => self.h3,
            _ => self.h4_h6,
        }
    }

    /// Bar style for a quote nested `depth` levels deep, starting at 1.
    pub fn quote_bar(&self, depth: usize) -> Style {
        if self.quote_bars.is_empty() {
            return Style::default();
        }
        self.quote_bars[depth.saturating_sub(1) % self.quote_bars.len()]
    }
}

/// Wrap `text` in the SGR sequence for `style` and a reset. An empty style
/// leaves the text untouched.
pub fn paint(style: Style, text: &str) -> String {
    let sgr = style_to_ansi(&style);
    if sgr.is_empty() {
        text.to_string()
    } else {
        format!("{}{}{}", sgr, text, RESET)
    }
}

/// Paint each line of `text` separately, keeping the line breaks bare so
/// that styles never span a break.
pub fn paint_lines(style: Style, text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                paint(style, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert a ratatui Style to an ANSI SGR escape sequence.
pub fn style_to_ansi(style: &Style) -> String {
    let mut codes = Vec::new();

    for (modifier, code) in [
        (Modifier::BOLD, "1"),
        (Modifier::ITALIC, "3"),
        (Modifier::UNDERLINED, "4"),
        (Modifier::CROSSED_OUT, "9"),
    ] {
        if style.add_modifier.contains(modifier) {
            codes.push(code.to_string());
        }
    }

    if let Some(code) = style.fg.and_then(|c| color_code(c, Layer::Foreground)) {
        codes.push(code);
    }
    if let Some(code) = style.bg.and_then(|c| color_code(c, Layer::Background)) {
        codes.push(code);
    }

    if codes.is_empty() {
        String::new()
    } else {
        format!("\x1b[{}m", codes.join(";"))
    }
}

#[derive(Debug, Clone, Copy)]
enum Layer {
    Foreground,
    Background,
}

/// Map a ratatui Color to an SGR color parameter.
fn color_code(color: Color, layer: Layer) -> Option<String> {
    let (base, bright, extended) = match layer {
        Layer::Foreground => (30, 90, 38),
        Layer::Background => (40, 100, 48),
    };

    let code = match color {
        Color::Black => base.to_string(),
        Color::Red => (base + 1).to_string(),
        Color::Green => (base + 2).to_string(),
        Color::Yellow => (base + 3).to_string(),
        Color::Blue => (base + 4).to_string(),
        Color::Magenta => (base + 5).to_string(),
        Color::Cyan => (base + 6).to_string(),
        Color::White | Color::Gray => (base + 7).to_string(),
        Color::DarkGray => bright.to_string(),
        Color::LightRed => (bright + 1).to_string(),
        Color::LightGreen => (bright + 2).to_string(),
        Color::LightYellow => (bright + 3).to_string(),
        Color::LightBlue => (bright + 4).to_string(),
        Color::LightMagenta => (bright + 5).to_string(),
        Color::LightCyan => (bright + 6).to_string(),
        Color::Indexed(n) => format!("{};5;{}", extended, n),
        Color::Rgb(r, g, b) => format!("{};2;{};{};{}", extended, r, g, b),
        _ => return None,
    };

    Some(code)
}
