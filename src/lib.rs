//! Control text to OSCAL
//!
//! Normalizes security control identifiers, parses free-form control prose
//! into nested statement parts, and assembles OSCAL catalogs from
//! spreadsheet rows.

pub mod domain;
pub use domain::{
    Config, ControlId, ControlRecord, ControlRow, OutlineNode, Part, ParseWarning, StatementId,
    build, clean_raw_id, normalize, parse, parse_with_warnings, to_statement_id,
};

pub mod oscal;
pub use oscal::{Baseline, Catalog, CatalogBuilder};

/// Filesystem input and output.
pub mod storage;
