//! Sequential per-worker batch loop

use std::path::PathBuf;
use std::time::Instant;

use tracing::{error, info};

use crate::batch::summary::{RevenueSummary, SummaryBuilder};
use crate::metrics;
use crate::{PipelineError, Result};

/// Summarize every file of one batch, in order.
///
/// Runs on the calling thread with blocking I/O. The first failing file abandons the
/// rest of the batch.
pub fn run_batch(
    files: &[PathBuf],
    worker_id: usize,
    builder: &SummaryBuilder,
) -> Result<Vec<RevenueSummary>> {
    let start = Instant::now();
    info!(worker_id, files = files.len(), "Worker starting batch");

    let mut summaries = Vec::with_capacity(files.len());
    for file in files {
        match builder.summarize(file) {
            Ok(summary) => summaries.push(summary),
            Err(source) => {
                error!(
                    worker_id,
                    file = %file.display(),
                    error = %source,
                    "Batch aborted"
                );
                return Err(PipelineError::Worker {
                    worker_id,
                    file: file.clone(),
                    source,
                });
            }
        }
    }

    let elapsed = start.elapsed();
    metrics::record_batch(worker_id, elapsed);
    info!(
        worker_id,
        files = summaries.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Batch completed"
    );

    Ok(summaries)
}
