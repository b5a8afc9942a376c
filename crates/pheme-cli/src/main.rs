use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use pheme_client::CdpDriver;
use pheme_core::traits::CheckpointSink;
use pheme_core::{
    AppError, Entity, RandomJitter, RetryCoordinator, RetryPolicy, ScrapeOrchestrator,
    ScrapedEntity, WorkState,
};

#[derive(Parser)]
#[command(name = "pheme", version, about = "Review scraper for JS-rendered listing pages")]
struct Cli {
    /// CSV file listing the targets (columns: Name, Ranking, Url)
    input: PathBuf,

    /// Path the JSON result artifact is written to
    output: PathBuf,

    /// Whole-run attempts before giving up and checkpointing
    #[arg(long, default_value_t = 5)]
    max_attempts: u32,

    /// Run the browser with a visible window (debugging)
    #[arg(long, default_value_t = false)]
    headful: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pheme=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let entities = load_entities(&cli.input)?;
    anyhow::ensure!(
        !entities.is_empty(),
        "no entities in {}",
        cli.input.display()
    );
    tracing::info!(count = entities.len(), "loaded target entities");

    let driver = CdpDriver::launch(!cli.headful)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    let coordinator = RetryCoordinator::new(
        ScrapeOrchestrator::new(driver, RandomJitter),
        JsonFileSink::new(cli.output.clone()),
        RetryPolicy::default().with_max_attempts(cli.max_attempts),
    );

    let mut state = WorkState::new(entities);
    match coordinator.run(&mut state).await {
        Ok(records) => {
            tracing::info!(
                entities = records.len(),
                skipped = state.remaining_count(),
                output = %cli.output.display(),
                "scrape complete"
            );
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(e)).with_context(|| {
            format!(
                "scrape failed; partial results checkpointed to {}",
                cli.output.display()
            )
        }),
    }
}

/// One row of the input file.
#[derive(Debug, Deserialize)]
struct InputRecord {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Ranking")]
    ranking: String,
    #[serde(rename = "Url")]
    url: String,
}

/// Load and validate the target list. Rows with an unparsable URL are
/// rejected up front — better than failing halfway into a scrape.
fn load_entities(path: &Path) -> Result<Vec<Entity>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    let mut entities = Vec::new();
    for row in reader.deserialize() {
        let record: InputRecord = row.context("Malformed input row")?;
        url::Url::parse(&record.url)
            .with_context(|| format!("Invalid url for {}: {}", record.name, record.url))?;
        entities.push(Entity::new(record.name, record.ranking, record.url));
    }
    Ok(entities)
}

/// Writes the checkpoint artifact as a pretty-printed JSON array.
struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CheckpointSink for JsonFileSink {
    fn flush(&self, records: &[ScrapedEntity]) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(records)?;
        std::fs::write(&self.path, json)
            .map_err(|e| AppError::Checkpoint(format!("{}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_entities_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Name,Ranking,Url").unwrap();
        writeln!(file, "Trattoria,#3 of 120,https://example.com/r/3").unwrap();
        writeln!(file, "Osteria,#7 of 120,https://example.com/r/7").unwrap();

        let entities = load_entities(file.path()).unwrap();

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].name, "Trattoria");
        assert_eq!(entities[1].url, "https://example.com/r/7");
        assert!(entities[0].address.is_none());
    }

    #[test]
    fn rejects_invalid_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Name,Ranking,Url").unwrap();
        writeln!(file, "Broken,#1,not a url").unwrap();

        assert!(load_entities(file.path()).is_err());
    }

    #[test]
    fn sink_writes_parseable_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let sink = JsonFileSink::new(path.clone());

        let entity = Entity::new("A", "#1", "https://example.com/a");
        sink.flush(&[ScrapedEntity::new(entity, vec![])]).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed[0]["Name"], "A");
        assert_eq!(parsed[0]["Reviews"], serde_json::json!([]));
    }
}
