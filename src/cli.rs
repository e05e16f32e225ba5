use std::path::{Path, PathBuf};

mod baseline;
mod catalog;
mod normalize;
mod parse;

use anyhow::Context;
use baseline::Baseline;
use catalog::Catalog;
use clap::ArgAction;
use compliance_io::Config;
use normalize::Normalize;
use parse::Parse;
use tracing::instrument;

/// Default config file name written by `init`.
const CONFIG_FILE: &str = "cio.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a config file (defaults are used if omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => Config::default(),
        };

        self.command.run(&config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Write a default config file
    Init(Init),

    /// Normalize control ids and show their statement ids
    Normalize(Normalize),

    /// Parse control prose into a statement part
    ///
    /// Reads from FILE, or from stdin if no file is given.
    Parse(Parse),

    /// Build an OSCAL catalog from a row file
    ///
    /// The row file is a YAML or JSON sequence of maps from column header to
    /// value. Headers are mapped through the `columns` table of the config.
    Catalog(Catalog),

    /// Check control ids against a profile
    Baseline(Baseline),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run()?,
            Self::Normalize(command) => command.run()?,
            Self::Parse(command) => command.run()?,
            Self::Catalog(command) => command.run(config)?,
            Self::Baseline(command) => command.run()?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {
    /// Where to write the config file
    #[arg(default_value = CONFIG_FILE)]
    path: PathBuf,
}

impl Init {
    #[instrument]
    fn run(self) -> anyhow::Result<()> {
        write_default_config(&self.path)?;

        println!("Wrote default config to {}", self.path.display());
        println!();
        println!("Next steps:");
        println!("  edit the [columns] table to match your spreadsheet headers");
        println!(
            "  cio --config {} catalog --title \"My Catalog\" rows.yaml",
            self.path.display()
        );
        Ok(())
    }
}

fn write_default_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("Config file already exists: {}", path.display());
    }

    Config::default()
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn init_writes_loadable_config() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);

        Init { path: path.clone() }.run().expect("init should succeed");

        let config = Config::load(&path).expect("config should load");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        std::fs::write(&path, "keep me").unwrap();

        let error = Init { path: path.clone() }.run().unwrap_err();
        assert!(error.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["cio", "normalize", "AC-2(1)", "-vv", "--config", "x.toml"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Command::Normalize(_)));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["cio"]).is_err());
    }
}
