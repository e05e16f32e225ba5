//! Domain models for control text.
//!
//! This module contains the core, pure transformations: control id
//! normalization, the structural prose parser, the part-tree builder and the
//! per-row control record assembler, plus configuration.

/// Control and statement identifier normalization.
pub mod control_id;
pub use control_id::{ControlId, StatementId, clean_raw_id, normalize, to_statement_id};

mod config;
pub use config::{Columns, Config, ConfigError};

/// Structural parsing of control prose into an outline.
pub mod outline;
pub use outline::{OutlineNode, ParseWarning, parse, parse_with_warnings};

/// OSCAL part trees built from outlines.
pub mod part;
pub use part::{Part, Property, build};

/// Assembly of complete control records from spreadsheet rows.
pub mod record;
pub use record::{AuxiliaryFields, ControlRecord, ControlRow, Link};
