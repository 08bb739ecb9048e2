//! Summarize every sales file of a dataset in parallel.
//!
//! ```text
//! sales-summary --type sml
//! sales-summary --type bg --config pipeline.json
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use sales_pipeline::batch::Orchestrator;
use sales_pipeline::config::{Dataset, PipelineConfig};
use sales_pipeline::sink::FsSink;
use sales_pipeline::{dataset, logging, metrics};

#[derive(Debug, Parser)]
#[command(
    name = "sales-summary",
    about = "Per-file revenue summaries, computed in parallel",
    long_about = "Summarize total and per-region revenue for every file of a dataset, \
                  writing one JSON summary and one bar chart per file."
)]
struct Cli {
    #[arg(
        long = "type",
        value_enum,
        help = "Dataset to process [default: tst, or the configured dataset]"
    )]
    dataset: Option<Dataset>,
    #[arg(
        long,
        value_name = "PATH",
        help = "Optional JSON configuration file"
    )]
    config: Option<PathBuf>,
}

impl Cli {
    /// Configuration file (or defaults), with `--type` taking precedence when given
    fn load_config(&self) -> sales_pipeline::Result<PipelineConfig> {
        let config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        Ok(match self.dataset {
            Some(dataset) => config.with_dataset(dataset),
            None => config,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    logging::init(&config.log_filter);

    let start = Instant::now();
    info!(dataset = %config.dataset, workers = config.workers, "Starting run");

    let data_dir = config.data_dir();
    let files = dataset::list_files(&data_dir, &config.extension)
        .with_context(|| format!("cannot list input files in {}", data_dir.display()))?;
    let output_dir = dataset::create_output_dir(&config.output_root, config.dataset)
        .context("cannot create output directory")?;

    let sink = Arc::new(FsSink::new(&output_dir));
    let orchestrator = Orchestrator::new(&config, sink, &output_dir)?;
    let summaries = orchestrator.run(files).await?;

    info!(
        summaries = summaries.len(),
        output_dir = %output_dir.display(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Run complete"
    );
    debug!(metrics = %metrics::gather(), "Run metrics");

    Ok(())
}
