//! Fan-out/fan-in over worker batches
//!
//! One blocking task per non-empty batch, bounded by the configured worker count.
//! Results are only used after every task has finished, and are flattened by batch
//! index so completion order never shows in the output.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};

use crate::batch::partition::PartitionStrategy;
use crate::batch::summary::{RevenueSummary, SummaryBuilder};
use crate::batch::worker::run_batch;
use crate::config::PipelineConfig;
use crate::metrics;
use crate::sink::{ResultSink, CHART_EXTENSION};
use crate::{PipelineError, Result};

/// Runs batches concurrently and publishes the ordered summaries
pub struct Orchestrator {
    /// Fixed worker count for the run
    workers: usize,
    /// Batch assignment rule
    strategy: PartitionStrategy,
    /// Shared, read-only summary builder
    builder: Arc<SummaryBuilder>,
    /// Destination for summaries and charts
    sink: Arc<dyn ResultSink>,
    /// Directory receiving charts
    output_dir: PathBuf,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("workers", &self.workers)
            .field("strategy", &self.strategy)
            .field("builder", &self.builder)
            .field("sink", &"ResultSink")
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl Orchestrator {
    /// Create an orchestrator from a validated configuration
    pub fn new(
        config: &PipelineConfig,
        sink: Arc<dyn ResultSink>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            workers: config.workers,
            strategy: config.partition_strategy,
            builder: Arc::new(SummaryBuilder::from_config(config)),
            sink,
            output_dir: output_dir.into(),
        })
    }

    /// Worker count used for partitioning
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Summarize `files` and hand every summary to the sink
    pub async fn run(&self, files: Vec<PathBuf>) -> Result<Vec<RevenueSummary>> {
        let summaries = self.collect(files).await?;
        self.publish(&summaries)?;
        Ok(summaries)
    }

    /// Summarize `files` across the workers.
    ///
    /// Output order is (batch index, position in batch). When any batch fails, the
    /// error of the lowest failing batch index is returned once all workers have
    /// finished.
    #[instrument(skip(self, files), fields(file_count = files.len(), workers = self.workers))]
    pub async fn collect(&self, files: Vec<PathBuf>) -> Result<Vec<RevenueSummary>> {
        let start = Instant::now();

        let batches = self.strategy.apply(&files, self.workers)?;
        if batches.is_empty() {
            warn!(
                file_count = files.len(),
                workers = self.workers,
                "More workers than files, no batches dispatched"
            );
            return Ok(Vec::new());
        }

        info!(batch_count = batches.len(), "Dispatching batches");

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = Vec::with_capacity(batches.len());

        for (worker_id, batch) in batches.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .expect("Semaphore should not be closed");
            let builder = Arc::clone(&self.builder);

            debug!(worker_id, files = batch.len(), "Spawning worker");
            tasks.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                run_batch(&batch, worker_id, &builder)
            }));
        }

        // Barrier: nothing is consumed until every worker is done.
        let outcomes = join_all(tasks).await;

        let mut summaries = Vec::with_capacity(files.len());
        for (worker_id, outcome) in outcomes.into_iter().enumerate() {
            let failure = match outcome {
                Ok(Ok(batch)) => {
                    summaries.extend(batch);
                    continue;
                }
                Ok(Err(e)) => e,
                Err(join_error) => {
                    error!(worker_id, error = %join_error, "Worker task did not complete");
                    join_error.into()
                }
            };
            error!(
                worker_id,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Overall time taken, run failed"
            );
            return Err(failure);
        }

        info!(
            summaries = summaries.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Overall time taken"
        );

        Ok(summaries)
    }

    /// Persist and chart every summary, each exactly once.
    ///
    /// A sink failure does not stop the remaining summaries; all failures are
    /// returned together once every summary has been attempted. Nothing is written
    /// when two summaries share a file name.
    #[instrument(skip(self, summaries), fields(count = summaries.len()))]
    pub fn publish(&self, summaries: &[RevenueSummary]) -> Result<()> {
        let mut seen = HashSet::with_capacity(summaries.len());
        for summary in summaries {
            if !seen.insert(summary.file_name.as_str()) {
                error!(file_name = %summary.file_name, "Two inputs share an output name");
                return Err(PipelineError::DuplicateOutput(summary.file_name.clone()));
            }
        }

        let mut failures = Vec::new();

        for summary in summaries {
            let persisted = self.sink.persist(&summary.file_name, summary);
            metrics::record_sink_write("persist", persisted.is_ok());
            if let Err(e) = persisted {
                error!(file_name = %summary.file_name, error = %e, "Failed to persist summary");
                failures.push(e);
            }

            let destination = self.chart_path(&summary.file_name);
            let rendered = self.sink.visualize(
                &summary.revenue_per_region,
                &summary.file_name,
                &destination,
            );
            metrics::record_sink_write("visualize", rendered.is_ok());
            if let Err(e) = rendered {
                error!(file_name = %summary.file_name, error = %e, "Failed to render chart");
                failures.push(e);
            }
        }

        if failures.is_empty() {
            debug!("All summaries published");
            Ok(())
        } else {
            Err(PipelineError::Publish {
                failures,
                total: summaries.len(),
            })
        }
    }

    fn chart_path(&self, file_name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", file_name, CHART_EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn test_new_rejects_zero_workers() {
        let config = PipelineConfig::default().with_workers(0);
        let result = Orchestrator::new(&config, Arc::new(MemorySink::new()), "out");
        assert!(matches!(result, Err(PipelineError::Partition(_))));
    }

    #[test]
    fn test_chart_path() {
        let config = PipelineConfig::default();
        let orchestrator = Orchestrator::new(&config, Arc::new(MemorySink::new()), "out/run").unwrap();
        assert_eq!(orchestrator.workers(), 3);
        assert_eq!(
            orchestrator.chart_path("2021"),
            PathBuf::from("out/run/2021.svg")
        );
    }

    #[test]
    fn test_failed_run_still_reports_elapsed_time() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default().with_workers(1);
        let orchestrator = Orchestrator::new(&config, Arc::new(MemorySink::new()), "out").unwrap();

        let (result, logs) = crate::logging::capture(tracing::Level::INFO, || {
            tokio_test::block_on(orchestrator.collect(vec![dir.path().join("missing.csv")]))
        });

        assert!(matches!(result, Err(PipelineError::Worker { worker_id: 0, .. })));
        assert!(logs.contains("Overall time taken, run failed"));
        assert!(logs.contains("elapsed_ms="));
    }

    #[test]
    fn test_publish_rejects_duplicate_names() {
        let sink = Arc::new(MemorySink::new());
        let config = PipelineConfig::default();
        let orchestrator = Orchestrator::new(&config, sink.clone(), "out").unwrap();
        let summary = RevenueSummary {
            total_revenue: 1.0,
            revenue_per_region: Default::default(),
            file_name: "2020".to_string(),
        };

        let result = orchestrator.publish(&[summary.clone(), summary]);

        assert!(matches!(result, Err(PipelineError::DuplicateOutput(name)) if name == "2020"));
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn test_collect_without_files() {
        let config = PipelineConfig::default();
        let orchestrator = Orchestrator::new(&config, Arc::new(MemorySink::new()), "out").unwrap();

        let summaries = tokio_test::block_on(orchestrator.collect(Vec::new())).unwrap();
        assert!(summaries.is_empty());
    }
}
