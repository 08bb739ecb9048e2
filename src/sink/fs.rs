use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::batch::RevenueSummary;
use crate::sink::{render_bar_chart, ResultSink, SinkError};

/// Writes `<key>.json` summaries and SVG charts to disk
#[derive(Debug, Clone)]
pub struct FsSink {
    dir: PathBuf,
}

impl FsSink {
    /// Sink persisting into `dir`, which must already exist
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the JSON file for `key`
    pub fn summary_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn write(path: &Path, contents: &[u8]) -> Result<(), SinkError> {
        std::fs::write(path, contents).map_err(|source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ResultSink for FsSink {
    fn persist(&self, key: &str, summary: &RevenueSummary) -> Result<(), SinkError> {
        let json = serde_json::to_vec(summary).map_err(|source| SinkError::Serialize {
            key: key.to_string(),
            source,
        })?;

        let path = self.summary_path(key);
        Self::write(&path, &json)?;
        debug!(path = %path.display(), "Summary persisted");
        Ok(())
    }

    fn visualize(
        &self,
        region_revenue: &BTreeMap<String, f64>,
        label: &str,
        destination: &Path,
    ) -> Result<(), SinkError> {
        let svg = render_bar_chart(region_revenue, label);
        Self::write(destination, svg.as_bytes())?;
        debug!(path = %destination.display(), "Chart rendered");
        Ok(())
    }
}
