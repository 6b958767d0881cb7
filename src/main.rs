use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use sqlite_practice::config::PipelineConfig;
use sqlite_practice::fetch::HttpSource;
use sqlite_practice::logging::init_logging;
use sqlite_practice::Pipeline;

/// Download the fungi records and load them into SQLite
#[derive(Debug, Parser)]
#[command(name = "sqlite_practice", version, about)]
struct Cli {
    /// TOML config file; missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dataset URL
    #[arg(long)]
    url: Option<String>,

    /// SQLite database path, or :memory:
    #[arg(long)]
    database: Option<String>,

    /// Number of data rows to load
    #[arg(long)]
    rows: Option<usize>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            PipelineConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };
    if let Some(url) = cli.url {
        config.url = url;
    }
    if let Some(database) = cli.database {
        config.database = database;
    }
    if let Some(rows) = cli.rows {
        config.data_rows = rows;
    }

    let source = HttpSource::new(config.url.clone()).context("building HTTP client")?;
    let pipeline = Pipeline::new(config);
    let (_conn, report) = pipeline
        .run_with_database(&source)
        .with_context(|| format!("loading {}", source.url()))?;

    let verify = &pipeline.config().verify;
    let column: Vec<String> = report.verification.column.iter().map(ToString::to_string).collect();
    let lookup: Vec<String> = report.verification.lookup.iter().map(ToString::to_string).collect();
    info!(table = %report.table.name(), rows = report.inserted, "done");
    info!("{}: {}", verify.column, column.join(", "));
    info!(
        "{} where {} = {}: {}",
        verify.lookup_column,
        verify.key_column,
        verify.key_value,
        lookup.join(", ")
    );
    Ok(())
}
