use std::path::Path;

use tracing::debug;

use crate::oscal::Catalog;

/// Errors raised while reading or writing a catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog file could not be read or written.
    #[error("catalog I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog could not be (de)serialized.
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes a catalog as pretty JSON, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_catalog(catalog: &Catalog, path: &Path) -> Result<(), CatalogError> {
    let json = catalog.to_json()?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json + "\n")?;
    debug!("Wrote catalog to {}", path.display());
    Ok(())
}

/// Reads a catalog from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a catalog.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let content = std::fs::read_to_string(path)?;
    let catalog = Catalog::from_json(&content)?;
    debug!("Read catalog from {}", path.display());
    Ok(catalog)
}
