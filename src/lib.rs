//! # Sales Pipeline
//!
//! Parallel per-file revenue summaries for directories of tabular sales data.
//!
//! ## Overview
//!
//! Input files are split into balanced batches, one per worker. Each worker walks its
//! batch sequentially and builds a [`batch::RevenueSummary`] per file. The orchestrator
//! waits for every worker, flattens the per-batch results in batch order and hands each
//! summary to a [`sink::ResultSink`] for persistence and charting.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sales_pipeline::config::PipelineConfig;
//! use sales_pipeline::batch::Orchestrator;
//! use sales_pipeline::sink::FsSink;
//!
//! # async fn example() -> sales_pipeline::Result<()> {
//! let config = PipelineConfig::default().with_workers(4);
//! let files = sales_pipeline::dataset::list_files(&config.data_dir(), &config.extension)?;
//! let output_dir = sales_pipeline::dataset::create_output_dir(&config.output_root, config.dataset)?;
//!
//! let sink = Arc::new(FsSink::new(&output_dir));
//! let orchestrator = Orchestrator::new(&config, sink, output_dir)?;
//! let summaries = orchestrator.run(files).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`batch`]: partitioning, worker loop, orchestration and summaries
//! - [`source`]: CSV row source with numeric conversion, aggregation and statistics
//! - [`sink`]: JSON persistence and SVG bar charts
//! - [`config`]: pipeline configuration
//! - [`dataset`]: input listing and output directory helpers

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use std::path::PathBuf;

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid worker configuration
    #[error("Partition error: {0}")]
    Partition(#[from] batch::PartitionError),

    /// Row source failure outside of a worker batch
    #[error("Source error: {0}")]
    Source(#[from] source::SourceError),

    /// A file in a worker's batch failed; the whole batch is abandoned
    #[error("Worker {worker_id} failed on {}: {source}", .file.display())]
    Worker {
        /// Batch index of the failing worker
        worker_id: usize,
        /// File being summarized when the failure occurred
        file: PathBuf,
        /// Underlying failure
        #[source]
        source: source::SourceError,
    },

    /// One or more summaries could not be written by the sink
    #[error("Failed to publish {} of {total} summaries (first: {})", .failures.len(), first_failure(.failures))]
    Publish {
        /// Every sink failure, in summary order
        failures: Vec<sink::SinkError>,
        /// Number of summaries handed to the sink
        total: usize,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Two input files map to the same output artifacts
    #[error("Duplicate output name '{0}': two input files share a file stem")]
    DuplicateOutput(String),

    /// Filesystem error outside of the row source and sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Join error from worker tasks
    #[error("Async join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn first_failure(failures: &[sink::SinkError]) -> String {
    failures
        .first()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// Batch partitioning, worker loop and orchestration
pub mod batch;

/// Pipeline configuration
pub mod config;

/// Input discovery and output directory helpers
pub mod dataset;

/// Logging setup
pub mod logging;

/// Prometheus metrics
pub mod metrics;

/// Result persistence and visualization
pub mod sink;

/// CSV row source
pub mod source;
