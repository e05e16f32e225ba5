use std::{convert::Infallible, fmt, ops::Deref, str::FromStr, sync::LazyLock};

use regex::{Captures, Regex};

/// `1.2`, `3.1.22`, ... (NIST 800-171 style)
static DOTTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)*$").expect("dotted regex is valid"));

/// `ac-1`
static SIMPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]{2})-(\d+)$").expect("simple regex is valid"));

/// `ac-2(1)`, `ac-2 (1)`
static EXTENDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]{2})-(\d+)\s*\((\d+)\)$").expect("extended regex is valid")
});

/// `ac-1.a`
static PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]{2})-(\d+)\.([a-z]+)$").expect("part regex is valid"));

/// `ac-2(1).b`
static EXTENDED_PART: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]{2})-(\d+)\s*\((\d+)\)\.([a-z]+)$").expect("extended part regex is valid")
});

/// `ac-02.01`, the dotted form produced for enhancements
static ENHANCEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]{2})-(\d+)\.(\d+)$").expect("enhancement regex is valid")
});

static HYPHEN_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("hyphen run regex is valid"));

static MISSING_HYPHEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]{2})(\d{2})").expect("missing hyphen regex is valid")
});

static SI_TYPO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Ss]1-").expect("si typo regex is valid"));

/// The recognised shape of a control identifier.
///
/// Produced by [`classify`]; numeric components have already been re-parsed
/// so leading zeros are gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape<'a> {
    Dotted(&'a str),
    Control {
        family: &'a str,
        number: u64,
    },
    Enhancement {
        family: &'a str,
        number: u64,
        extension: u64,
    },
    ControlPart {
        family: &'a str,
        number: u64,
        part: &'a str,
    },
    EnhancementPart {
        family: &'a str,
        number: u64,
        extension: u64,
        part: &'a str,
    },
    Unrecognised(&'a str),
}

fn group<'h>(caps: &Captures<'h>, index: usize) -> &'h str {
    caps.get(index).map_or("", |m| m.as_str())
}

/// Runs the pattern cascade against an already trimmed, lower-cased id.
///
/// The first matching pattern wins. A numeric component that does not fit in
/// a `u64` disqualifies the pattern, so the id falls through to
/// [`Shape::Unrecognised`].
fn classify(id: &str) -> Shape<'_> {
    if DOTTED.is_match(id) {
        return Shape::Dotted(id);
    }

    if let Some(caps) = SIMPLE.captures(id) {
        if let Ok(number) = caps[2].parse() {
            return Shape::Control {
                family: group(&caps, 1),
                number,
            };
        }
    }

    if let Some(caps) = EXTENDED.captures(id) {
        if let (Ok(number), Ok(extension)) = (caps[2].parse(), caps[3].parse()) {
            return Shape::Enhancement {
                family: group(&caps, 1),
                number,
                extension,
            };
        }
    }

    if let Some(caps) = PART.captures(id) {
        if let Ok(number) = caps[2].parse() {
            return Shape::ControlPart {
                family: group(&caps, 1),
                number,
                part: group(&caps, 3),
            };
        }
    }

    if let Some(caps) = EXTENDED_PART.captures(id) {
        if let (Ok(number), Ok(extension)) = (caps[2].parse(), caps[3].parse()) {
            return Shape::EnhancementPart {
                family: group(&caps, 1),
                number,
                extension,
                part: group(&caps, 4),
            };
        }
    }

    if let Some(caps) = ENHANCEMENT.captures(id) {
        if let (Ok(number), Ok(extension)) = (caps[2].parse(), caps[3].parse()) {
            return Shape::Enhancement {
                family: group(&caps, 1),
                number,
                extension,
            };
        }
    }

    Shape::Unrecognised(id)
}

/// A canonical control identifier, e.g. `ac-2.1` or `3.1.1`.
///
/// Construct one with [`normalize`] (or [`str::parse`], which never fails).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlId(String);

impl ControlId {
    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the family prefix of the identifier.
    ///
    /// This is the segment before the first `-` (`ac` for `ac-2.1`), or
    /// before the first `.` for dotted-numeric ids (`3` for `3.1.1`).
    #[must_use]
    pub fn family(&self) -> &str {
        let end = self
            .0
            .find('-')
            .or_else(|| self.0.find('.'))
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl AsRef<str> for ControlId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ControlId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ControlId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(normalize(s))
    }
}

/// An OSCAL statement identifier, e.g. `ac-2.1_smt` or `ac-1_smt.a`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatementId(String);

impl StatementId {
    /// Suffix marking the statement part of a control.
    pub const SUFFIX: &'static str = "_smt";

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives a sibling part id by swapping the `_smt` marker for `suffix`.
    ///
    /// `ac-1_smt` with `_imp` gives `ac-1_imp`; `ac-1_smt.a` gives
    /// `ac-1_imp.a`.
    #[must_use]
    pub fn sibling(&self, suffix: &str) -> String {
        self.0.replacen(Self::SUFFIX, suffix, 1)
    }
}

impl AsRef<str> for StatementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for StatementId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StatementId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(to_statement_id(s))
    }
}

/// Canonicalizes a control identifier.
///
/// Input is trimmed and lower-cased, numeric components lose their leading
/// zeros and parenthesized enhancements become a dot suffix. Part suffixes
/// are dropped. Anything unrecognised passes through (trimmed and
/// lower-cased), so this never fails.
///
/// # Examples
///
/// ```
/// use compliance_io::normalize;
///
/// assert_eq!(normalize("AC-1").as_str(), "ac-1");
/// assert_eq!(normalize("AC-02 (01)").as_str(), "ac-2.1");
/// assert_eq!(normalize("ac-2(1).b").as_str(), "ac-2.1");
/// assert_eq!(normalize(" 3.1.1 ").as_str(), "3.1.1");
/// ```
#[must_use]
pub fn normalize(raw: &str) -> ControlId {
    let id = raw.trim().to_lowercase();
    let canonical = match classify(&id) {
        Shape::Dotted(s) | Shape::Unrecognised(s) => s.to_string(),
        Shape::Control { family, number } | Shape::ControlPart { family, number, .. } => {
            format!("{family}-{number}")
        }
        Shape::Enhancement {
            family,
            number,
            extension,
        }
        | Shape::EnhancementPart {
            family,
            number,
            extension,
            ..
        } => format!("{family}-{number}.{extension}"),
    };
    ControlId(canonical)
}

/// Derives the OSCAL statement id for a control identifier.
///
/// Uses the same cascade as [`normalize`], then appends `_smt`. For part
/// forms the marker goes before the part suffix.
///
/// # Examples
///
/// ```
/// use compliance_io::to_statement_id;
///
/// assert_eq!(to_statement_id("AC-1").as_str(), "ac-1_smt");
/// assert_eq!(to_statement_id("AC-2(1).b").as_str(), "ac-2.1_smt.b");
/// ```
#[must_use]
pub fn to_statement_id(raw: &str) -> StatementId {
    let id = raw.trim().to_lowercase();
    let suffix = StatementId::SUFFIX;
    let statement = match classify(&id) {
        Shape::Dotted(s) | Shape::Unrecognised(s) => format!("{s}{suffix}"),
        Shape::Control { family, number } => format!("{family}-{number}{suffix}"),
        Shape::Enhancement {
            family,
            number,
            extension,
        } => format!("{family}-{number}.{extension}{suffix}"),
        Shape::ControlPart {
            family,
            number,
            part,
        } => format!("{family}-{number}{suffix}.{part}"),
        Shape::EnhancementPart {
            family,
            number,
            extension,
            part,
        } => format!("{family}-{number}.{extension}{suffix}.{part}"),
    };
    StatementId(statement)
}

/// Repairs irregularities seen in source spreadsheets before normalization.
///
/// - runs of hyphens collapse to one (`ac--09` → `ac-09`)
/// - a missing hyphen after a two-letter family is inserted (`au14` →
///   `au-14`)
/// - the `S1-` family typo becomes `si-`
///
/// This is deliberately separate from [`normalize`]; callers opt in.
#[must_use]
pub fn clean_raw_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let collapsed = HYPHEN_RUN.replace_all(trimmed, "-");
    let hyphenated = MISSING_HYPHEN.replace(&collapsed, "$1-$2");
    SI_TYPO.replace(&hyphenated, "si-").into_owned()
}
