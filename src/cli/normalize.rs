use clap::Parser;
use compliance_io::{normalize, to_statement_id};
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Normalize control ids and show their statement ids")]
pub struct Normalize {
    /// Raw control ids, e.g. `AC-02(01)` or `si-4.a`
    #[arg(required = true)]
    ids: Vec<String>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct Normalized {
    raw: String,
    control_id: String,
    statement_id: String,
}

impl Normalized {
    fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            control_id: normalize(raw).to_string(),
            statement_id: to_statement_id(raw).to_string(),
        }
    }
}

impl Normalize {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let results: Vec<Normalized> = self.ids.iter().map(|id| Normalized::new(id)).collect();

        match self.output {
            OutputFormat::Pretty => {
                let width = results.iter().map(|r| r.raw.len()).max().unwrap_or(0);
                for result in &results {
                    println!(
                        "{:<width$}  {:<12}  {}",
                        result.raw, result.control_id, result.statement_id
                    );
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
        }
        Ok(())
    }
}
