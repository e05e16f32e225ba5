//! OSCAL catalog documents.
//!
//! The [`CatalogBuilder`] turns spreadsheet rows into a [`Catalog`], grouping
//! controls by family. A [`Catalog`] read back from JSON can be queried by
//! any control id form.

use chrono::{DateTime, Utc};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    domain::{Config, ControlRecord, ControlRow, Link, Part, Property, normalize},
    oscal::Baseline,
};

/// An OSCAL catalog: metadata plus groups of controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Catalog {
    /// Document identifier.
    pub uuid: Uuid,
    /// Title and version information.
    pub metadata: Metadata,
    /// Control families.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
}

/// Catalog metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Metadata {
    /// Catalog title.
    pub title: String,
    /// When the catalog was generated.
    pub last_modified: DateTime<Utc>,
    /// Catalog content version.
    pub version: String,
    /// OSCAL model version.
    pub oscal_version: String,
}

/// A family of controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Group {
    /// Family id, e.g. `ac`.
    pub id: String,
    /// Always `family` for generated catalogs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Family title, e.g. "Access Control".
    pub title: String,
    /// Controls in the family.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<Control>,
}

/// A control, possibly with nested enhancements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Control {
    /// Canonical control id, e.g. `ac-2.1`.
    pub id: String,
    /// Control class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Control title.
    pub title: String,
    /// Properties (`label`, `sort-id`, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<Property>,
    /// Links to related controls.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    /// Statement, guidance and other parts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Part>,
    /// Enhancements nested under this control.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<Control>,
}

impl Control {
    /// Builds a control from an assembled record and the row it came from.
    #[must_use]
    pub fn from_record(record: ControlRecord, row: &ControlRow, config: &Config) -> Self {
        let id = record.control_id().to_string();
        let raw_id = row.control_id.as_deref().unwrap_or(&id).trim().to_string();
        let title = row
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&raw_id)
            .to_string();
        let sort_id = raw_id.to_lowercase();
        let (parts, links) = record.into_parts();

        Self {
            id,
            class: Some(config.control_class.clone()),
            title,
            props: vec![Property::label(raw_id), Property::new("sort-id", sort_id)],
            links,
            parts,
            controls: Vec::new(),
        }
    }

    /// Value of the named property, if present.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.props
            .iter()
            .find(|prop| prop.name == name)
            .map(|prop| prop.value.as_str())
    }

    /// The first part with the given name (`statement`, `guidance`, ...).
    #[must_use]
    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|part| part.name() == name)
    }

    /// This control followed by its enhancements, depth first.
    fn flatten(&self) -> Box<dyn Iterator<Item = &Self> + '_> {
        Box::new(std::iter::once(self).chain(self.controls.iter().flat_map(Self::flatten)))
    }
}

/// The `{"catalog": ...}` document wrapper.
#[derive(Debug, Deserialize)]
struct Document {
    catalog: Catalog,
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    catalog: &'a Catalog,
}

impl Catalog {
    /// Renders the catalog as pretty JSON wrapped in a `catalog` object.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&DocumentRef { catalog: self })
    }

    /// Parses a catalog from JSON wrapped in a `catalog` object.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or is not a catalog.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Document>(json).map(|document| document.catalog)
    }

    /// Every control in the catalog, enhancements included.
    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.groups
            .iter()
            .flat_map(|group| group.controls.iter())
            .flat_map(Control::flatten)
    }

    /// Finds a control by any id form (`AC-2(1)`, `ac-02.01`, ...).
    #[must_use]
    pub fn control(&self, raw_id: &str) -> Option<&Control> {
        let id = normalize(raw_id);
        self.controls().find(|control| control.id == id.as_str())
    }

    /// Finds the group containing a control.
    #[must_use]
    pub fn group_for_control(&self, raw_id: &str) -> Option<&Group> {
        let id = normalize(raw_id);
        self.groups.iter().find(|group| {
            group
                .controls
                .iter()
                .flat_map(Control::flatten)
                .any(|control| control.id == id.as_str())
        })
    }

    /// Finds a group by id.
    #[must_use]
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }
}

/// Builds a [`Catalog`] from spreadsheet rows.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    title: String,
    config: Config,
    baseline: Option<Baseline>,
}

impl CatalogBuilder {
    /// Creates a builder for a catalog with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>, config: Config) -> Self {
        Self {
            title: title.into(),
            config,
            baseline: None,
        }
    }

    /// Keeps only controls selected by `baseline`.
    #[must_use]
    pub fn with_baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Assembles the rows and groups the resulting controls by family.
    ///
    /// Rows are assembled in parallel; output order follows row order. Rows
    /// without a baseline or control text are skipped. Groups appear in the
    /// order their first control appears; the group id is the family prefix
    /// of the canonical control id and the title is the row's `family`
    /// column (falling back to the upper-cased id).
    #[must_use]
    pub fn build(&self, rows: &[ControlRow]) -> Catalog {
        let records: Vec<(&ControlRow, ControlRecord)> = rows
            .par_iter()
            .filter_map(|row| ControlRecord::from_row(row, &self.config).map(|record| (row, record)))
            .collect();

        let mut groups: Vec<Group> = Vec::new();
        let mut skipped = 0usize;
        for (row, record) in records {
            if let Some(baseline) = &self.baseline {
                if !baseline.contains_id(record.control_id()) {
                    debug!(control = %record.control_id(), "not in baseline");
                    skipped += 1;
                    continue;
                }
            }

            let group_id = record.control_id().family().to_string();
            let control = Control::from_record(record, row, &self.config);

            if let Some(group) = groups.iter_mut().find(|group| group.id == group_id) {
                group.controls.push(control);
            } else {
                let title = row
                    .family
                    .as_deref()
                    .map(str::trim)
                    .filter(|family| !family.is_empty())
                    .map_or_else(|| group_id.to_uppercase(), str::to_string);
                groups.push(Group {
                    id: group_id,
                    class: Some("family".to_string()),
                    title,
                    controls: vec![control],
                });
            }
        }

        let controls: usize = groups.iter().map(|group| group.controls.len()).sum();
        info!(
            groups = groups.len(),
            controls,
            skipped,
            "Built catalog '{}'",
            self.title
        );

        Catalog {
            uuid: Uuid::new_v4(),
            metadata: Metadata {
                title: self.title.clone(),
                last_modified: Utc::now(),
                version: self.config.catalog_version.clone(),
                oscal_version: self.config.oscal_version.clone(),
            },
            groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(family: &str, control_id: &str, text: &str, baseline: Option<&str>) -> ControlRow {
        ControlRow {
            family: Some(family.to_string()),
            control_id: Some(control_id.to_string()),
            name: Some(format!("{control_id} title")),
            control_text: Some(text.to_string()),
            baseline: baseline.map(str::to_string),
            ..ControlRow::default()
        }
    }

    fn rows() -> Vec<ControlRow> {
        vec![
            row("Access Control", "AC-1", "(a) Do X.\n(b) Do Y.", Some("Low")),
            row("Access Control", "AC-2", "Manage accounts.", Some("Low")),
            row("Access Control", "AC-2(1)", "Automate it.", None),
            row("Audit", "AU-2", "Log events.", Some("Moderate")),
            row("Access Control", "AC-3", "Enforce access.", Some("High")),
        ]
    }

    #[test]
    fn groups_controls_by_family() {
        let catalog = CatalogBuilder::new("Test", Config::default()).build(&rows());

        let ids: Vec<_> = catalog.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["ac", "au"]);

        let ac = catalog.group("ac").unwrap();
        assert_eq!(ac.title, "Access Control");
        assert_eq!(ac.class.as_deref(), Some("family"));
        let controls: Vec<_> = ac.controls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(controls, ["ac-1", "ac-2", "ac-3"]);
    }

    #[test]
    fn control_carries_props_and_parts() {
        let catalog = CatalogBuilder::new("Test", Config::default()).build(&rows());
        let control = catalog.control("AC-01").unwrap();

        assert_eq!(control.title, "AC-1 title");
        assert_eq!(control.class.as_deref(), Some("ARS-5.0-Mandatory"));
        assert_eq!(control.property("label"), Some("AC-1"));
        assert_eq!(control.property("sort-id"), Some("ac-1"));

        let statement = control.part("statement").unwrap();
        assert_eq!(statement.id(), "ac-1_smt");
        assert_eq!(statement.parts().map(<[Part]>::len), Some(2));
    }

    #[test]
    fn baseline_filters_controls() {
        let baseline = Baseline::from_ids(["ac-2", "AU-2"]);
        let catalog = CatalogBuilder::new("Test", Config::default())
            .with_baseline(baseline)
            .build(&rows());

        let ids: Vec<_> = catalog.controls().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["ac-2", "au-2"]);
    }

    #[test]
    fn json_round_trip_and_queries() {
        let catalog = CatalogBuilder::new("Test", Config::default()).build(&rows());
        let json = catalog.to_json().unwrap();
        assert!(json.starts_with("{\n  \"catalog\""));
        assert!(json.contains("\"oscal-version\": \"1.0.0\""));
        assert!(!json.contains("\"parts\": []"));

        let parsed = Catalog::from_json(&json).unwrap();
        assert_eq!(parsed, catalog);
        assert_eq!(parsed.group_for_control("AU-02").map(|g| g.id.as_str()), Some("au"));
        assert!(parsed.control("pm-1").is_none());
    }

    #[test]
    fn nested_enhancements_are_searchable() {
        let json = r#"{
            "catalog": {
                "uuid": "0f4d7a1e-3c2b-4a7e-9d2e-1b2c3d4e5f60",
                "metadata": {
                    "title": "Nested",
                    "last-modified": "2024-01-01T00:00:00Z",
                    "version": "1",
                    "oscal-version": "1.0.0"
                },
                "groups": [{
                    "id": "ac",
                    "title": "Access Control",
                    "controls": [{
                        "id": "ac-2",
                        "title": "Account Management",
                        "controls": [{"id": "ac-2.1", "title": "Automated Management"}]
                    }]
                }]
            }
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(
            catalog.control("AC-2(1)").map(|c| c.title.as_str()),
            Some("Automated Management")
        );
        assert_eq!(
            catalog.group_for_control("ac-2 (1)").map(|g| g.title.as_str()),
            Some("Access Control")
        );
    }
}
