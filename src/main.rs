//! `cio`: normalize control ids, parse control prose and build OSCAL catalogs.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
