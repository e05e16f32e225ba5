use std::{io::Read, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use compliance_io::{Part, build, parse, to_statement_id};
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Parse control prose into a statement part")]
pub struct Parse {
    /// The control id the prose belongs to, e.g. `AC-2`
    #[arg(long)]
    id: String,

    /// File containing the prose (stdin if omitted)
    file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "json")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    /// The statement part as OSCAL JSON
    #[default]
    Json,
    /// The statement flattened to indented `label. prose` lines
    Text,
}

impl Parse {
    #[instrument(level = "debug", skip(self), fields(id = %self.id))]
    pub fn run(self) -> anyhow::Result<()> {
        let text = match &self.file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            None => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("failed to read stdin")?;
                text
            }
        };

        let statement = statement(&self.id, &text);
        println!("{}", render(&statement, self.output)?);
        Ok(())
    }
}

fn statement(id: &str, text: &str) -> Part {
    build(parse(text, to_statement_id(id).as_str()))
}

fn render(statement: &Part, output: OutputFormat) -> serde_json::Result<String> {
    match output {
        OutputFormat::Json => serde_json::to_string_pretty(statement),
        OutputFormat::Text => Ok(statement.to_text()),
    }
}
