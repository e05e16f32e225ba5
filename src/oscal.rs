//! OSCAL document models built on the domain types.

pub mod catalog;
pub use catalog::{Catalog, CatalogBuilder, Control, Group, Metadata};

mod profile;
pub use profile::{Baseline, ProfileError};
