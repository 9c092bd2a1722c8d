//! Text post-processing applied to every text literal.

use std::borrow::Cow;

/// Transforms text literals before they are laid out.
pub trait TextEnricher: Send + Sync {
    fn enrich<'a>(&self, text: &'a str) -> Cow<'a, str>;
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnrichment;

impl TextEnricher for NoEnrichment {
    fn enrich<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }
}

/// Expands `:name:` shortcodes to emoji, using the GitHub shortcode set.
///
/// Unknown names are left as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shortcodes;

impl Shortcodes {
    pub fn lookup(name: &str) -> Option<&'static str> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'));
        if !valid {
            return None;
        }
        emojis::get_by_shortcode(name).map(|emoji| emoji.as_str())
    }
}

impl TextEnricher for Shortcodes {
    fn enrich<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if !text.contains(':') {
            return Cow::Borrowed(text);
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        let mut changed = false;

        while let Some(start) = rest.find(':') {
            let after = &rest[start + 1..];
            let Some(len) = after.find(':') else {
                break;
            };
            match Self::lookup(&after[..len]) {
                Some(emoji) => {
                    out.push_str(&rest[..start]);
                    out.push_str(emoji);
                    rest = &after[len + 1..];
                    changed = true;
                }
                None => {
                    // the closing colon may open the next code
                    out.push_str(&rest[..=start]);
                    rest = after;
                }
            }
        }

        if !changed {
            return Cow::Borrowed(text);
        }
        out.push_str(rest);
        Cow::Owned(out)
    }
}
