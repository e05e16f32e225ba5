//! Enumeration-marker tokenizer.
//!
//! Each style has one pattern. A trimmed line can match more than one style
//! (`i.` is both a letter and a roman numeral), so [`candidates`] returns
//! every match in table order and leaves the choice to the parser.

use std::sync::LazyLock;

use regex::Regex;

/// The punctuation style of an enumeration marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerStyle {
    /// `(a)`
    LetterParen,
    /// `a.`
    LetterDot,
    /// `1.`
    DigitDot,
    /// `(1)`
    DigitParen,
    /// `ii.`
    RomanDot,
}

/// A marker found at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'a> {
    /// Which pattern matched.
    pub style: MarkerStyle,
    /// The token without punctuation (`a`, `1`, `iv`).
    pub label: &'a str,
    /// Remainder of the line after the marker, trimmed.
    pub rest: &'a str,
}

// Group 1 is the label, group 2 the remainder (absent for a bare marker).
static PATTERNS: LazyLock<[(MarkerStyle, Regex); 5]> = LazyLock::new(|| {
    let pattern = |re: &str| Regex::new(re).expect("marker regex is valid");
    [
        (MarkerStyle::LetterParen, pattern(r"^\(([a-z])\)(?:\s*(.*))?$")),
        (MarkerStyle::DigitParen, pattern(r"^\((\d{1,2})\)(?:\s*(.*))?$")),
        (MarkerStyle::LetterDot, pattern(r"^([a-z])\.(?:\s+(.*))?$")),
        (MarkerStyle::DigitDot, pattern(r"^(\d{1,2})\.(?:\s+(.*))?$")),
        (
            MarkerStyle::RomanDot,
            pattern(r"^(x{0,3}(?:ix|iv|v?i{0,3}))\.(?:\s+(.*))?$"),
        ),
    ]
});

/// Returns every marker that `line` starts with, in table order.
///
/// The line should already be trimmed. An empty result means the line is
/// plain prose.
#[must_use]
pub fn candidates(line: &str) -> Vec<Marker<'_>> {
    PATTERNS
        .iter()
        .filter_map(|(style, regex)| {
            let caps = regex.captures(line)?;
            let label = caps.get(1)?.as_str();
            if label.is_empty() {
                return None;
            }
            let rest = caps.get(2).map_or("", |m| m.as_str().trim());
            Some(Marker {
                style: *style,
                label,
                rest,
            })
        })
        .collect()
}
