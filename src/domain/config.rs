use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for catalog generation.
///
/// Stored as TOML. Every field has a default, so an empty file (apart from
/// the `_version` tag) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The OSCAL `class` given to every generated control.
    pub control_class: String,

    /// The `version` written to catalog metadata.
    pub catalog_version: String,

    /// The `oscal-version` written to catalog metadata.
    pub oscal_version: String,

    /// Whether raw control ids are repaired (doubled hyphens, missing
    /// hyphens, the `S1-` typo) before normalization.
    pub clean_ids: bool,

    /// Which row-file column feeds which row field.
    pub columns: Columns,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            control_class: default_control_class(),
            catalog_version: default_catalog_version(),
            oscal_version: default_oscal_version(),
            clean_ids: true,
            columns: Columns::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        toml::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content).map_err(ConfigError::Write)
    }
}

/// Errors raised while loading or saving a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Read(#[source] std::io::Error),

    /// The file is not valid configuration TOML.
    #[error("failed to parse config file: {0}")]
    Parse(#[source] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] toml::ser::Error),

    /// The file could not be written.
    #[error("failed to write config file: {0}")]
    Write(#[source] std::io::Error),
}

/// Column headers in a row file, one per row field.
///
/// Defaults to the field names themselves, so a row file whose headers
/// already read `control_id`, `control_text`, ... needs no mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Columns {
    /// Header of the family title column.
    pub family: String,
    /// Header of the control id column.
    pub control_id: String,
    /// Header of the control title column.
    pub name: String,
    /// Header of the control statement column.
    pub control_text: String,
    /// Header of the implementation standards column.
    pub implementation: String,
    /// Header of the related controls column.
    pub related: String,
    /// Header of the baseline column.
    pub baseline: String,
    /// Header of the HVA standards column.
    pub hva_standards: String,
    /// Header of the privacy standards column.
    pub privacy_standards: String,
    /// Header of the discussion column.
    pub discussion: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            family: "family".to_string(),
            control_id: "control_id".to_string(),
            name: "name".to_string(),
            control_text: "control_text".to_string(),
            implementation: "implementation".to_string(),
            related: "related".to_string(),
            baseline: "baseline".to_string(),
            hva_standards: "hva_standards".to_string(),
            privacy_standards: "privacy_standards".to_string(),
            discussion: "discussion".to_string(),
        }
    }
}

fn default_control_class() -> String {
    "ARS-5.0-Mandatory".to_string()
}

fn default_catalog_version() -> String {
    "1.0".to_string()
}

fn default_oscal_version() -> String {
    "1.0.0".to_string()
}

const fn default_clean_ids() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_control_class")]
        control_class: String,

        #[serde(default = "default_catalog_version")]
        catalog_version: String,

        #[serde(default = "default_oscal_version")]
        oscal_version: String,

        #[serde(default = "default_clean_ids")]
        clean_ids: bool,

        #[serde(default)]
        columns: Columns,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                control_class,
                catalog_version,
                oscal_version,
                clean_ids,
                columns,
            } => Self {
                control_class,
                catalog_version,
                oscal_version,
                clean_ids,
                columns,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            control_class: config.control_class,
            catalog_version: config.catalog_version,
            oscal_version: config.oscal_version,
            clean_ids: config.clean_ids,
            columns: config.columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\ncontrol_class = \"NIST-Moderate\"\nclean_ids = false\n\n[columns]\ncontrol_id = \"Control Number\"\ncontrol_text = \"Control\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.control_class, "NIST-Moderate");
        assert_eq!(config.catalog_version, "1.0");
        assert!(!config.clean_ids);
        assert_eq!(config.columns.control_id, "Control Number");
        assert_eq!(config.columns.control_text, "Control");
        assert_eq!(config.columns.baseline, "baseline");
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(matches!(error, ConfigError::Read(_)));
        assert!(error.to_string().starts_with("failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nclean_ids = \"yes\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.oscal_version = "1.1.2".to_string();
        config.columns.family = "Family".to_string();
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
