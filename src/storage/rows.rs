//! Row files.
//!
//! A row file is a YAML (or JSON, which is a subset) sequence of maps from
//! column header to cell value, typically exported from a control
//! spreadsheet:
//!
//! ```yaml
//! - family: Access Control
//!   control_id: AC-1
//!   control_text: |
//!     (a) Develop a policy.
//!     (b) Review it.
//!   baseline: Low
//! ```
//!
//! Headers are mapped to [`ControlRow`] fields through [`Columns`].

use std::{collections::BTreeMap, path::Path};

use serde_yaml::Value;

use crate::domain::{Columns, ControlRow};

/// Errors raised while reading a row file.
#[derive(Debug, thiserror::Error)]
pub enum RowsError {
    /// The file could not be read.
    #[error("failed to read row file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid YAML/JSON.
    #[error("failed to parse row file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document is not a sequence of maps.
    #[error("row {row}: expected a map of column headers to values")]
    NotAMap {
        /// 1-based row number.
        row: usize,
    },

    /// A cell holds a nested sequence or map.
    #[error("row {row}, column '{column}': expected a scalar value")]
    NotAScalar {
        /// 1-based row number.
        row: usize,
        /// The offending column header.
        column: String,
    },
}

/// Loads rows from a YAML or JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a sequence of maps,
/// or contains a non-scalar cell.
pub fn load_rows(path: &Path, columns: &Columns) -> Result<Vec<ControlRow>, RowsError> {
    let content = std::fs::read_to_string(path)?;
    let rows = rows_from_str(&content, columns)?;
    tracing::debug!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Parses rows from YAML or JSON text.
///
/// Scalar cells (numbers, booleans) are converted to strings; `null` cells
/// are treated as absent. An empty document yields no rows.
///
/// # Errors
///
/// Returns an error if the text is not a sequence of maps or contains a
/// non-scalar cell.
pub fn rows_from_str(content: &str, columns: &Columns) -> Result<Vec<ControlRow>, RowsError> {
    let records: Option<Vec<Value>> = serde_yaml::from_str(content)?;

    records
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let cells = cells(index + 1, value)?;
            Ok(to_row(cells, columns))
        })
        .collect()
}

fn cells(row: usize, value: Value) -> Result<BTreeMap<String, String>, RowsError> {
    let Value::Mapping(mapping) = value else {
        return Err(RowsError::NotAMap { row });
    };

    let mut cells = BTreeMap::new();
    for (key, value) in mapping {
        let Ok(Some(column)) = scalar(key) else {
            continue;
        };
        let cell = scalar(value).map_err(|()| RowsError::NotAScalar {
            row,
            column: column.clone(),
        })?;
        if let Some(cell) = cell {
            cells.insert(column, cell);
        }
    }
    Ok(cells)
}

/// Renders a scalar as a string; `Ok(None)` for null, `Err` for collections.
fn scalar(value: Value) -> Result<Option<String>, ()> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) => Ok(Some(s)),
        Value::Tagged(tagged) => scalar(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => Err(()),
    }
}

fn to_row(mut cells: BTreeMap<String, String>, columns: &Columns) -> ControlRow {
    let mut take = |header: &str| cells.remove(header);
    ControlRow {
        family: take(&columns.family),
        control_id: take(&columns.control_id),
        name: take(&columns.name),
        control_text: take(&columns.control_text),
        implementation: take(&columns.implementation),
        related: take(&columns.related),
        baseline: take(&columns.baseline),
        hva_standards: take(&columns.hva_standards),
        privacy_standards: take(&columns.privacy_standards),
        discussion: take(&columns.discussion),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_yaml_rows() {
        let yaml = "\
- family: Access Control
  control_id: AC-1
  control_text: |
    (a) Develop a policy.
    (b) Review it.
  baseline: Low
- control_id: AC-2
  baseline: ~
";
        let rows = rows_from_str(yaml, &Columns::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].family.as_deref(), Some("Access Control"));
        assert_eq!(
            rows[0].control_text.as_deref(),
            Some("(a) Develop a policy.\n(b) Review it.\n")
        );
        assert_eq!(rows[1].baseline, None);
    }

    #[test]
    fn maps_custom_headers() {
        let json = r#"[{"Control Number": "SI-4", "Control": "Monitor.", "Baseline": "High"}]"#;
        let columns = Columns {
            control_id: "Control Number".to_string(),
            control_text: "Control".to_string(),
            baseline: "Baseline".to_string(),
            ..Columns::default()
        };
        let rows = rows_from_str(json, &columns).unwrap();
        assert_eq!(rows[0].control_id.as_deref(), Some("SI-4"));
        assert_eq!(rows[0].control_text.as_deref(), Some("Monitor."));
        assert_eq!(rows[0].baseline.as_deref(), Some("High"));
    }

    #[test]
    fn unmapped_columns_are_ignored() {
        let yaml = "- control_id: AC-1\n  responsibility: Shared\n  reference: NIST SP 800-12\n";
        let rows = rows_from_str(yaml, &Columns::default()).unwrap();
        assert_eq!(
            rows[0],
            ControlRow {
                control_id: Some("AC-1".to_string()),
                ..ControlRow::default()
            }
        );
    }

    #[test]
    fn scalars_become_strings() {
        let rows = rows_from_str("- control_id: 3.1\n  baseline: true\n", &Columns::default())
            .unwrap();
        assert_eq!(rows[0].control_id.as_deref(), Some("3.1"));
        assert_eq!(rows[0].baseline.as_deref(), Some("true"));
    }

    #[test]
    fn empty_document_has_no_rows() {
        assert!(rows_from_str("", &Columns::default()).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_map_rows() {
        let error = rows_from_str("- just a string\n", &Columns::default()).unwrap_err();
        assert!(matches!(error, RowsError::NotAMap { row: 1 }));
    }

    #[test]
    fn rejects_nested_cells() {
        let error =
            rows_from_str("- control_id: [AC-1, AC-2]\n", &Columns::default()).unwrap_err();
        assert!(matches!(
            error,
            RowsError::NotAScalar { row: 1, ref column } if column == "control_id"
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"- control_id: AC-1\n  baseline: Low\n")
            .unwrap();
        let rows = load_rows(file.path(), &Columns::default()).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
