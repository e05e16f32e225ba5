use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use compliance_io::{
    Baseline, CatalogBuilder, Config,
    storage::{load_rows, save_catalog},
};
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Build an OSCAL catalog from a row file")]
pub struct Catalog {
    /// Catalog title
    #[arg(long, short)]
    title: String,

    /// Only include controls selected by this OSCAL profile (JSON)
    #[arg(long, short)]
    profile: Option<PathBuf>,

    /// Row file (YAML or JSON)
    rows: PathBuf,

    /// Write the catalog here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl Catalog {
    #[instrument(level = "debug", skip(self, config), fields(rows = %self.rows.display()))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let rows = load_rows(&self.rows, &config.columns)
            .with_context(|| format!("failed to load rows from {}", self.rows.display()))?;

        let mut builder = CatalogBuilder::new(self.title, config.clone());
        if let Some(profile) = &self.profile {
            let baseline = Baseline::load(profile)
                .with_context(|| format!("failed to load profile {}", profile.display()))?;
            builder = builder.with_baseline(baseline);
        }

        let catalog = builder.build(&rows);

        match &self.output {
            Some(path) => {
                save_catalog(&catalog, path)?;
                let controls = catalog.controls().count();
                println!(
                    "Wrote {controls} controls in {} groups to {}",
                    catalog.groups.len(),
                    path.display()
                );
            }
            None => println!("{}", catalog.to_json()?),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use compliance_io::storage::load_catalog;
    use tempfile::tempdir;

    use super::*;

    const ROWS: &str = "\
- family: Access Control
  control_id: AC-1
  name: Policy and Procedures
  control_text: |
    (a) Develop a policy.
    (b) Review it.
  baseline: Low
- family: Access Control
  control_id: AC-2
  control_text: Manage accounts.
  baseline: Low
- family: Audit and Accountability
  control_id: AU-2
  control_text: Log events.
  baseline: Moderate
";

    #[test]
    fn writes_catalog_restricted_to_profile() {
        let tmp = tempdir().unwrap();
        let rows = tmp.path().join("rows.yaml");
        std::fs::write(&rows, ROWS).unwrap();
        let profile = tmp.path().join("profile.json");
        std::fs::write(
            &profile,
            r#"{"profile": {"imports": [{"include-controls": [{"with-ids": ["ac-1", "au-2"]}]}]}}"#,
        )
        .unwrap();
        let output = tmp.path().join("catalog.json");

        Catalog {
            title: "Test Catalog".to_string(),
            profile: Some(profile),
            rows,
            output: Some(output.clone()),
        }
        .run(&Config::default())
        .expect("catalog command should succeed");

        let catalog = load_catalog(&output).unwrap();
        assert_eq!(catalog.metadata.title, "Test Catalog");
        let ids: Vec<_> = catalog.controls().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["ac-1", "au-2"]);
        assert_eq!(
            catalog.control("AC-1").map(|c| c.title.as_str()),
            Some("Policy and Procedures")
        );
    }

    #[test]
    fn missing_rows_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let error = Catalog {
            title: "Missing".to_string(),
            profile: None,
            rows: tmp.path().join("nope.yaml"),
            output: None,
        }
        .run(&Config::default())
        .unwrap_err();

        assert!(error.to_string().contains("failed to load rows"));
    }
}
