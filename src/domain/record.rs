use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    Config,
    control_id::{self, ControlId, StatementId},
    outline,
    part::{self, Part},
};

/// One spreadsheet row describing a control.
///
/// Every column is optional; which ones are required depends on the
/// operation (see [`ControlRecord::from_row`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlRow {
    /// Family title, e.g. "Access Control".
    pub family: Option<String>,
    /// Raw control identifier, e.g. `AC-2(1)`.
    pub control_id: Option<String>,
    /// Control title.
    pub name: Option<String>,
    /// Control statement prose.
    pub control_text: Option<String>,
    /// Implementation standards.
    pub implementation: Option<String>,
    /// Comma-separated related control ids.
    pub related: Option<String>,
    /// Baseline(s) the control belongs to.
    pub baseline: Option<String>,
    /// High-value-asset standards.
    pub hva_standards: Option<String>,
    /// Privacy standards.
    pub privacy_standards: Option<String>,
    /// Discussion / supplemental guidance.
    pub discussion: Option<String>,
}

/// Narrative fields that become sibling parts (or links) of a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxiliaryFields {
    /// Implementation standards.
    pub implementation: Option<String>,
    /// High-value-asset standards.
    pub hva_standards: Option<String>,
    /// Privacy standards.
    pub privacy_standards: Option<String>,
    /// Discussion / supplemental guidance.
    pub discussion: Option<String>,
    /// Comma-separated related control ids.
    pub related: Option<String>,
}

impl From<&ControlRow> for AuxiliaryFields {
    fn from(row: &ControlRow) -> Self {
        Self {
            implementation: row.implementation.clone(),
            hva_standards: row.hva_standards.clone(),
            privacy_standards: row.privacy_standards.clone(),
            discussion: row.discussion.clone(),
            related: row.related.clone(),
        }
    }
}

/// Kinds of auxiliary part, in the order they follow the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auxiliary {
    /// Implementation standards (`_imp`).
    Implementation,
    /// High-value-asset standards (`_hva`).
    Hva,
    /// Privacy standards (`_prv`).
    Privacy,
    /// Guidance / discussion (`_gdn`).
    Guidance,
}

impl Auxiliary {
    /// All kinds, in output order.
    pub const ALL: [Self; 4] = [Self::Implementation, Self::Hva, Self::Privacy, Self::Guidance];

    /// The suffix that replaces `_smt` in the part id.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Implementation => "_imp",
            Self::Hva => "_hva",
            Self::Privacy => "_prv",
            Self::Guidance => "_gdn",
        }
    }

    /// The OSCAL part name.
    #[must_use]
    pub const fn part_name(self) -> &'static str {
        match self {
            Self::Implementation => "implementation",
            Self::Hva => "hva",
            Self::Privacy => "privacy",
            Self::Guidance => "guidance",
        }
    }

    fn field(self, fields: &AuxiliaryFields) -> Option<&str> {
        match self {
            Self::Implementation => fields.implementation.as_deref(),
            Self::Hva => fields.hva_standards.as_deref(),
            Self::Privacy => fields.privacy_standards.as_deref(),
            Self::Guidance => fields.discussion.as_deref(),
        }
    }
}

/// A reference from one OSCAL object to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Link {
    /// Target, e.g. `#ac-2`.
    pub href: String,
    /// Relationship, e.g. `reference`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    /// Display text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Link {
    /// A `reference` link to another control in the same catalog.
    #[must_use]
    pub fn reference(raw_id: &str) -> Self {
        Self {
            href: format!("#{}", control_id::normalize(raw_id)),
            rel: Some("reference".to_string()),
            text: Some(raw_id.to_string()),
        }
    }
}

/// Splits a comma-separated related-controls field into reference links.
///
/// Blank entries and anything mentioning "redacted" (in any case) are
/// dropped.
#[must_use]
pub fn related_links(related: &str) -> Vec<Link> {
    related
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty() && !token.to_lowercase().contains("redacted"))
        .map(Link::reference)
        .collect()
}

/// The fully documented content of one control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRecord {
    id: StatementId,
    control_id: ControlId,
    parts: Vec<Part>,
    links: Vec<Link>,
}

impl ControlRecord {
    /// Builds a record from a control id, its statement prose and auxiliary
    /// narrative.
    ///
    /// The statement part comes first, followed by one part per non-blank
    /// auxiliary field in [`Auxiliary::ALL`] order. Related controls become
    /// [`links`](Self::links).
    #[must_use]
    pub fn assemble(control_id_raw: &str, control_text: &str, fields: &AuxiliaryFields) -> Self {
        let id = control_id::to_statement_id(control_id_raw);
        let statement = part::build(outline::parse(control_text, &id));

        let auxiliary = Auxiliary::ALL.into_iter().filter_map(|kind| {
            let prose = kind.field(fields)?.trim();
            (!prose.is_empty())
                .then(|| Part::new(id.sibling(kind.suffix()), kind.part_name()).with_prose(prose))
        });

        let parts = std::iter::once(statement).chain(auxiliary).collect();
        let links = fields
            .related
            .as_deref()
            .map(related_links)
            .unwrap_or_default();

        Self {
            control_id: control_id::normalize(control_id_raw),
            id,
            parts,
            links,
        }
    }

    /// Builds a record from a spreadsheet row.
    ///
    /// Returns `None` (the row is skipped) when the row has no baseline, no
    /// control id or no control text. When [`Config::clean_ids`] is set the
    /// id is passed through [`control_id::clean_raw_id`] first.
    #[must_use]
    pub fn from_row(row: &ControlRow, config: &Config) -> Option<Self> {
        let raw_id = non_blank(row.control_id.as_deref())?;

        if non_blank(row.baseline.as_deref()).is_none() {
            debug!(control = raw_id, "skipping row without baseline");
            return None;
        }

        let Some(text) = non_blank(row.control_text.as_deref()) else {
            debug!(control = raw_id, "skipping row without control text");
            return None;
        };

        let raw_id = if config.clean_ids {
            control_id::clean_raw_id(raw_id)
        } else {
            raw_id.to_string()
        };

        Some(Self::assemble(&raw_id, text, &AuxiliaryFields::from(row)))
    }

    /// The statement id.
    #[must_use]
    pub const fn id(&self) -> &StatementId {
        &self.id
    }

    /// The canonical control id.
    #[must_use]
    pub const fn control_id(&self) -> &ControlId {
        &self.control_id
    }

    /// The statement part followed by any auxiliary parts.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// The statement part.
    #[must_use]
    pub fn statement(&self) -> &Part {
        &self.parts[0]
    }

    /// Links to related controls.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Splits the record into its parts and links.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Part>, Vec<Link>) {
        (self.parts, self.links)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
