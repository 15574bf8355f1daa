use anyhow::{Context, Result};
use clap::Parser;
use ride::record;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ride-results")]
#[command(about = "Summarise a run log as JSON, keyed by run date")]
struct Cli {
    #[arg(default_value = "results.txt")]
    log: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Cli { log } = Cli::parse();
    let records =
        record::read(&log).with_context(|| format!("cannot read run log {}", log.display()))?;
    info!(records = records.len(), "run log parsed");

    let summary = record::summarize(&records)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
