//! Destinations for finished summaries

mod chart;
mod fs;
mod memory;

pub use chart::render_bar_chart;
pub use fs::FsSink;
pub use memory::{MemorySink, SinkCall};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::batch::RevenueSummary;

/// File extension of rendered charts
pub const CHART_EXTENSION: &str = "svg";

/// Errors related to persisting or rendering summaries
#[derive(Error, Debug)]
pub enum SinkError {
    /// Filesystem write failed
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        /// Target path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Summary could not be encoded
    #[error("Failed to serialize summary {key}: {source}")]
    Serialize {
        /// Summary key
        key: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The sink refused the write
    #[error("Sink unavailable for {key}: {reason}")]
    Unavailable {
        /// Summary key
        key: String,
        /// Why the write was refused
        reason: String,
    },
}

/// Persistence and visualization of summaries
pub trait ResultSink: Send + Sync {
    /// Store `summary` as structured data under `key`
    fn persist(&self, key: &str, summary: &RevenueSummary) -> Result<(), SinkError>;

    /// Render `region_revenue` as a bar chart titled `label` at `destination`
    fn visualize(
        &self,
        region_revenue: &BTreeMap<String, f64>,
        label: &str,
        destination: &Path,
    ) -> Result<(), SinkError>;
}
