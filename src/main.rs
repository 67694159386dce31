use anyhow::Result;
use castor::logging::configure_logging;
use castor::matching::{MatchConfig, MatchMode};
use castor::pipeline;
use castor::report::{ConsoleSink, JsonSink, ReportSink};
use castor::source::{DataSource, JsonFileSource};
use clap::Parser;
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[clap(name = "castor", about = "Find duplicate company records in a dataset")]
struct Cli {
    /// Input file: a JSON array of company records
    input: PathBuf,

    /// Minimum name-similarity score (0-100) for phone-based matches
    #[clap(short, long, default_value = "80")]
    threshold: u8,

    /// Use transitive (union-find) clustering instead of the seeded pass
    #[clap(long)]
    transitive: bool,

    /// Emit the full report as JSON instead of tables
    #[clap(long)]
    json: bool,
}

fn main() -> Result<()> {
    configure_logging();

    let cli = Cli::parse();
    if cli.threshold > 100 {
        error!("--threshold must be between 0 and 100, got {}", cli.threshold);
        std::process::exit(2);
    }

    let mode = if cli.transitive {
        MatchMode::Transitive
    } else {
        MatchMode::Seeded
    };
    let config = MatchConfig::new()
        .with_threshold(cli.threshold)
        .with_mode(mode);

    let table = JsonFileSource::new(&cli.input).load()?;
    let report = pipeline::run(&table, &config)?;

    if cli.json {
        JsonSink::new(std::io::stdout()).report(&report)?;
    } else {
        ConsoleSink::stdout().report(&report)?;
    }

    Ok(())
}
