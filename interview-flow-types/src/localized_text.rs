//! Inline translation markup.
//!
//! Question and option texts carry their translations inline, each wrapped
//! in braces after the primary text:
//!
//! ```text
//! What is your age? {आपकी उम्र क्या है?} {আপনার বয়স কত?}
//! ```
//!
//! Nested groups (`"A {B {C}}"`) are flattened in reading order.

use serde::{Deserialize, Serialize};

/// A text split into its primary language and inline translations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    primary: String,
    translations: Vec<String>,
}

impl LocalizedText {
    /// Parse inline translation markup.
    ///
    /// An unmatched `{` opens a translation that runs to the end of the text;
    /// a stray `}` outside any group is kept as a literal character.
    pub fn parse(raw: &str) -> Self {
        let mut segments = vec![String::new()];
        let mut open: Vec<usize> = vec![0];

        for ch in raw.chars() {
            match ch {
                '{' => {
                    segments.push(String::new());
                    open.push(segments.len() - 1);
                }
                '}' if open.len() > 1 => {
                    open.pop();
                }
                _ => {
                    let current = open.last().copied().unwrap_or(0);
                    segments[current].push(ch);
                }
            }
        }

        let mut segments = segments.into_iter().map(|s| collapse_whitespace(&s));
        let primary = segments.next().unwrap_or_default();
        let translations = segments.filter(|s| !s.is_empty()).collect();

        Self {
            primary,
            translations,
        }
    }

    /// The primary-language text with all translation markup removed.
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// The inline translations in order of appearance.
    pub fn translations(&self) -> &[String] {
        &self.translations
    }

    /// Text for a language index: `0` is the primary language, `n` the n-th translation.
    ///
    /// Falls back to the primary text when the translation does not exist.
    pub fn select(&self, language: usize) -> &str {
        match language {
            0 => &self.primary,
            n => self
                .translations
                .get(n - 1)
                .map(String::as_str)
                .unwrap_or(&self.primary),
        }
    }
}

/// Strip translation markup, keeping only the primary text.
pub fn strip_translations(raw: &str) -> String {
    LocalizedText::parse(raw).primary
}

/// Canonical form used for comparisons: primary text, single spaces, lowercase.
pub fn normalize(raw: &str) -> String {
    strip_translations(raw).to_lowercase()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
