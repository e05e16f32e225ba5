use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use compliance_io::normalize;
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Check control ids against a profile")]
pub struct Baseline {
    /// OSCAL profile (JSON)
    #[arg(long, short)]
    profile: PathBuf,

    /// Raw control ids to check
    #[arg(required = true)]
    ids: Vec<String>,
}

impl Baseline {
    #[instrument(level = "debug", skip(self), fields(profile = %self.profile.display()))]
    pub fn run(self) -> anyhow::Result<()> {
        let baseline = compliance_io::Baseline::load(&self.profile)
            .with_context(|| format!("failed to load profile {}", self.profile.display()))?;

        for line in report(&baseline, &self.ids) {
            println!("{line}");
        }
        Ok(())
    }
}

fn report(baseline: &compliance_io::Baseline, ids: &[String]) -> Vec<String> {
    let width = ids.iter().map(String::len).max().unwrap_or(0);
    ids.iter()
        .map(|raw| {
            let status = if baseline.contains(raw) {
                "included"
            } else {
                "excluded"
            };
            format!("{raw:<width$}  {:<12}  {status}", normalize(raw).as_str())
        })
        .collect()
}
