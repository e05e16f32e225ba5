/// Catalog JSON files.
mod catalog;
/// Spreadsheet rows exported as YAML or JSON.
pub mod rows;

pub use catalog::{CatalogError, load_catalog, save_catalog};
pub use rows::{RowsError, load_rows, rows_from_str};
