use std::{collections::BTreeSet, path::Path};

use serde::Deserialize;
use tracing::debug;

use crate::domain::{ControlId, normalize};

/// The set of controls a profile selects, keyed by canonical control id.
///
/// Membership checks normalize their input, so `AC-02(01)`, `ac-2.1` and
/// `ac-2(1).a` all match a profile listing `ac-2.1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baseline {
    ids: BTreeSet<ControlId>,
    include_all: bool,
}

impl Baseline {
    /// Builds a baseline from raw control ids.
    #[must_use]
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ids: ids.into_iter().map(|id| normalize(id.as_ref())).collect(),
            include_all: false,
        }
    }

    /// Parses an OSCAL profile and collects the `with-ids` of every import.
    ///
    /// An import with `include-all` selects every control.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or is not a profile.
    pub fn from_profile_json(json: &str) -> Result<Self, ProfileError> {
        let document: ProfileDocument = serde_json::from_str(json)?;
        let imports = document.profile.imports;

        let include_all = imports.iter().any(|import| import.include_all.is_some());
        let mut baseline = Self::from_ids(
            imports
                .iter()
                .flat_map(|import| &import.include_controls)
                .flat_map(|selection| &selection.with_ids),
        );
        baseline.include_all = include_all;
        Ok(baseline)
    }

    /// Loads a profile from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)?;
        let baseline = Self::from_profile_json(&content)?;
        debug!(
            "Loaded profile from {} ({} controls)",
            path.display(),
            baseline.len()
        );
        Ok(baseline)
    }

    /// Whether the control named by `raw_id` (any form) is selected.
    #[must_use]
    pub fn contains(&self, raw_id: &str) -> bool {
        self.contains_id(&normalize(raw_id))
    }

    /// Whether a canonical control id is selected.
    #[must_use]
    pub fn contains_id(&self, id: &ControlId) -> bool {
        self.include_all || self.ids.contains(id)
    }

    /// Whether the profile selects every control.
    #[must_use]
    pub const fn includes_all(&self) -> bool {
        self.include_all
    }

    /// Number of explicitly selected controls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no control is explicitly selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Explicitly selected control ids, sorted.
    pub fn iter(&self) -> impl Iterator<Item = &ControlId> {
        self.ids.iter()
    }
}

/// Errors raised while reading a profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The profile file could not be read.
    #[error("failed to read profile: {0}")]
    Io(#[from] std::io::Error),

    /// The profile is not valid OSCAL profile JSON.
    #[error("failed to parse profile: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ProfileDocument {
    profile: Profile,
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(default)]
    imports: Vec<Import>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Import {
    #[serde(default)]
    include_all: Option<serde_json::Value>,
    #[serde(default)]
    include_controls: Vec<Selection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Selection {
    #[serde(default)]
    with_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const PROFILE: &str = r#"{
        "profile": {
            "uuid": "8b3beca1-fcdc-43e0-aebb-ffc0a080c486",
            "imports": [{
                "href": "NIST_SP-800-53_rev5_catalog.json",
                "include-controls": [
                    {"with-ids": ["ac-1", "ac-2", "ac-2.1"]},
                    {"with-ids": ["AU-02"]}
                ]
            }]
        }
    }"#;

    #[test]
    fn collects_with_ids() {
        let baseline = Baseline::from_profile_json(PROFILE).unwrap();
        assert_eq!(baseline.len(), 4);
        assert!(!baseline.includes_all());

        let ids: Vec<_> = baseline.iter().map(ControlId::as_str).collect();
        assert_eq!(ids, ["ac-1", "ac-2", "ac-2.1", "au-2"]);
    }

    #[test]
    fn membership_normalizes_input() {
        let baseline = Baseline::from_profile_json(PROFILE).unwrap();
        assert!(baseline.contains("AC-2(1)"));
        assert!(baseline.contains("ac-02 (01)"));
        assert!(baseline.contains("AC-1.a"));
        assert!(baseline.contains("au-2"));
        assert!(!baseline.contains("AC-3"));
    }

    #[test]
    fn include_all_selects_everything() {
        let json = r#"{"profile": {"imports": [{"href": "cat.json", "include-all": {}}]}}"#;
        let baseline = Baseline::from_profile_json(json).unwrap();
        assert!(baseline.is_empty());
        assert!(baseline.contains("pm-99"));
    }

    #[test]
    fn not_a_profile_is_an_error() {
        let error = Baseline::from_profile_json(r#"{"catalog": {}}"#).unwrap_err();
        assert!(matches!(error, ProfileError::Json(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PROFILE.as_bytes()).unwrap();
        let baseline = Baseline::load(file.path()).unwrap();
        assert!(baseline.contains("ac-1"));

        let missing = Baseline::load(&file.path().with_extension("missing")).unwrap_err();
        assert!(matches!(missing, ProfileError::Io(_)));
    }
}
