//! Structural parser for control prose.
//!
//! Turns text such as
//!
//! ```text
//! (a) Develop a policy that:
//!     1. Addresses purpose;
//!         a. and scope.
//! ```
//!
//! into a tree of [`OutlineNode`]s, one per enumeration marker, at most
//! [`MAX_DEPTH`] levels deep. The grammar is a heuristic tuned for NIST
//! 800-53 and CMS ARS spreadsheets rather than a formal one.
//!
//! Classification is a single pass over the lines driven by an explicit
//! state machine: the first marker style seen at a level locks that level
//! for the rest of the block. Parsing never fails; lines that do not look like markers are
//! prose.

use std::fmt;

use tracing::warn;

/// Marker tokenizer.
pub mod marker;
use marker::{Marker, MarkerStyle};

/// Maximum nesting depth below the root.
pub const MAX_DEPTH: usize = 3;

/// Marker styles each level accepts, shallowest first.
///
/// Adding a row here is all a fourth level needs.
const LEVEL_STYLES: [&[MarkerStyle]; MAX_DEPTH] = [
    &[MarkerStyle::LetterParen, MarkerStyle::LetterDot],
    &[
        MarkerStyle::DigitDot,
        MarkerStyle::DigitParen,
        MarkerStyle::RomanDot,
    ],
    &[MarkerStyle::LetterDot, MarkerStyle::LetterParen],
];

/// A node of parsed control prose.
///
/// Children keep the order in which their markers were first seen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutlineNode {
    label: String,
    prose: String,
    children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Creates a childless node.
    #[must_use]
    pub fn new(label: impl Into<String>, prose: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prose: prose.into(),
            children: Vec::new(),
        }
    }

    /// The marker token (or the statement id, for the root).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Text owned directly by this node; empty if none.
    #[must_use]
    pub fn prose(&self) -> &str {
        &self.prose
    }

    /// Child nodes in discovery order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Looks up a direct child by label.
    #[must_use]
    pub fn child(&self, label: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.label == label)
    }

    /// Number of levels below this node.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Splits the node into its label, prose and children.
    #[must_use]
    pub fn into_parts(self) -> (String, String, Vec<Self>) {
        (self.label, self.prose, self.children)
    }

    fn push_line(&mut self, line: &str) {
        if !self.prose.is_empty() {
            self.prose.push('\n');
        }
        self.prose.push_str(line);
    }

    /// Inserts `child`, replacing (in place) any existing child with the same
    /// label. Returns the child's index and whether a node was replaced.
    fn upsert(&mut self, child: Self) -> (usize, bool) {
        if let Some(index) = self.children.iter().position(|c| c.label == child.label) {
            self.children[index] = child;
            (index, true)
        } else {
            self.children.push(child);
            (self.children.len() - 1, false)
        }
    }

    fn descendant_mut(&mut self, path: &[usize]) -> &mut Self {
        path.iter()
            .fold(self, |node, &index| &mut node.children[index])
    }
}

/// Something odd the parser recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A marker for `level` appeared with no open parent at `level - 1`.
    ///
    /// The node was attached to the nearest open ancestor instead.
    Orphan {
        /// The marker's label.
        label: String,
        /// The 1-based level the marker's style is locked to.
        level: usize,
        /// Label of the node it was attached to.
        attached_to: String,
    },
    /// A label was repeated under the same parent; the later node replaced
    /// the earlier one.
    DuplicateLabel {
        /// The repeated label.
        label: String,
        /// Label of the shared parent.
        parent: String,
    },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Orphan {
                label,
                level,
                attached_to,
            } => write!(
                f,
                "level {level} marker '{label}' has no open parent; attached to '{attached_to}'"
            ),
            Self::DuplicateLabel { label, parent } => {
                write!(f, "duplicate label '{label}' under '{parent}'; later entry wins")
            }
        }
    }
}

/// An open node on the current path: its level (1-based) and its index in
/// its parent's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Open {
    level: usize,
    index: usize,
}

/// Explicit single-pass classifier state.
///
/// `styles[k]` is the style locked for level `k + 1`; `open` is the path
/// from the root to the deepest open node.
#[derive(Debug, Default)]
struct ParserState {
    styles: [Option<MarkerStyle>; MAX_DEPTH],
    open: Vec<Open>,
}

impl ParserState {
    fn locked_level(&self, style: MarkerStyle) -> Option<usize> {
        self.styles
            .iter()
            .position(|locked| *locked == Some(style))
            .map(|k| k + 1)
    }

    fn is_open(&self, level: usize) -> bool {
        level == 0 || self.open.iter().any(|open| open.level == level)
    }

    /// Chooses the level for one of the candidate markers, locking a level
    /// style if this is the first marker of its kind.
    ///
    /// A style may be locked at more than one level (`a.` at levels 1 and
    /// 3). Among those, a level that is currently open keeps its run going;
    /// otherwise the shallowest level whose parent is open and does not
    /// already hold the label wins. A label that would repeat at its locked
    /// level is moved to a deeper level accepting the style when that
    /// level's parent is open.
    fn classify<'a>(
        &mut self,
        root: &OutlineNode,
        markers: &[Marker<'a>],
    ) -> Option<(usize, Marker<'a>)> {
        for marker in markers {
            let locked: Vec<usize> = (1..=MAX_DEPTH)
                .filter(|&level| self.styles[level - 1] == Some(marker.style))
                .collect();
            let Some(&shallowest) = locked.first() else {
                continue;
            };

            let level = locked
                .iter()
                .rev()
                .copied()
                .find(|&level| self.is_open(level) && self.fits(root, level, marker.label))
                .or_else(|| {
                    locked
                        .iter()
                        .copied()
                        .find(|&level| self.fits(root, level, marker.label))
                })
                .or_else(|| {
                    (shallowest + 1..=MAX_DEPTH).find(|&level| {
                        self.styles[level - 1].is_none()
                            && LEVEL_STYLES[level - 1].contains(&marker.style)
                            && self.fits(root, level, marker.label)
                    })
                })
                .unwrap_or(shallowest);

            if self.styles[level - 1].is_none() {
                self.styles[level - 1] = Some(marker.style);
            }
            return Some((level, *marker));
        }

        for marker in markers {
            let free = (1..=MAX_DEPTH).find(|&level| {
                self.styles[level - 1].is_none()
                    && LEVEL_STYLES[level - 1].contains(&marker.style)
                    && self.is_open(level - 1)
            });
            if let Some(level) = free {
                self.styles[level - 1] = Some(marker.style);
                return Some((level, *marker));
            }
        }

        None
    }

    /// Whether `level`'s parent is open and has no child labelled `label`.
    fn fits(&self, root: &OutlineNode, level: usize, label: &str) -> bool {
        if !self.is_open(level - 1) {
            return false;
        }
        let mut parent = root;
        for open in self.open.iter().take_while(|open| open.level < level) {
            parent = &parent.children[open.index];
        }
        parent.child(label).is_none()
    }

    fn path(&self) -> Vec<usize> {
        self.open.iter().map(|open| open.index).collect()
    }

    /// Opens a node at `level`, closing anything at that level or deeper.
    fn open_node(
        &mut self,
        root: &mut OutlineNode,
        level: usize,
        marker: Marker<'_>,
        warnings: &mut Vec<ParseWarning>,
    ) {
        while self.open.last().is_some_and(|open| open.level >= level) {
            self.open.pop();
        }

        let parent_level = self.open.last().map_or(0, |open| open.level);
        let parent = root.descendant_mut(&self.path());

        if parent_level + 1 != level {
            warnings.push(ParseWarning::Orphan {
                label: marker.label.to_string(),
                level,
                attached_to: parent.label.clone(),
            });
        }

        let (index, replaced) = parent.upsert(OutlineNode::new(marker.label, marker.rest));
        if replaced {
            warnings.push(ParseWarning::DuplicateLabel {
                label: marker.label.to_string(),
                parent: parent.label.clone(),
            });
        }

        self.open.push(Open { level, index });
    }
}

/// Parses control prose into an outline rooted at `root_id`.
///
/// Parse warnings are logged and otherwise discarded; see
/// [`parse_with_warnings`] to inspect them.
#[must_use]
pub fn parse(text: &str, root_id: &str) -> OutlineNode {
    let (root, warnings) = parse_with_warnings(text, root_id);
    for warning in &warnings {
        warn!(root = root_id, "{warning}");
    }
    root
}

/// Parses control prose into an outline, returning any recovery warnings.
///
/// Rules:
/// - a line whose marker is classified (see the module docs) opens a node;
///   the marker is stripped and the rest of the line, trimmed, becomes the
///   node's first prose line
/// - any other line is prose for the deepest open node: kept verbatim on the
///   root (line endings included, so text without markers comes back
///   unchanged), trimmed (and dropped if blank) on item nodes
#[must_use]
pub fn parse_with_warnings(text: &str, root_id: &str) -> (OutlineNode, Vec<ParseWarning>) {
    let mut root = OutlineNode::new(root_id.trim(), String::new());
    let mut state = ParserState::default();
    let mut warnings = Vec::new();
    // Nothing closes back to the root, so its prose is everything before the
    // first marker.
    let mut preamble = String::new();

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        let markers = marker::candidates(trimmed);

        if let Some((level, marker)) = state.classify(&root, &markers) {
            state.open_node(&mut root, level, marker, &mut warnings);
        } else if state.open.is_empty() {
            preamble.push_str(line);
        } else if !trimmed.is_empty() {
            root.descendant_mut(&state.path()).push_line(trimmed);
        }
    }

    root.prose = if root.children.is_empty() {
        preamble
    } else {
        preamble.trim_end().to_string()
    };

    (root, warnings)
}
