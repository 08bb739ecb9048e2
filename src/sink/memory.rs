use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::batch::RevenueSummary;
use crate::sink::{ResultSink, SinkError};

/// One recorded sink invocation
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    /// `persist(key, summary)`
    Persist {
        /// Summary key
        key: String,
        /// Persisted summary
        summary: RevenueSummary,
    },
    /// `visualize(region_revenue, label, destination)`
    Visualize {
        /// Chart label
        label: String,
        /// Charted values
        region_revenue: BTreeMap<String, f64>,
        /// Requested output path
        destination: PathBuf,
    },
}

/// In-memory sink recording every call, with optional injected failures
#[derive(Debug, Default)]
pub struct MemorySink {
    calls: Mutex<Vec<SinkCall>>,
    failing_keys: HashSet<String>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every persist and visualize for `key`
    pub fn failing_on(mut self, key: impl Into<String>) -> Self {
        self.failing_keys.insert(key.into());
        self
    }

    /// Calls recorded so far, in call order
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().clone()
    }

    /// Summaries persisted so far, in call order
    pub fn persisted(&self) -> Vec<RevenueSummary> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                SinkCall::Persist { summary, .. } => Some(summary.clone()),
                SinkCall::Visualize { .. } => None,
            })
            .collect()
    }

    fn check(&self, key: &str) -> Result<(), SinkError> {
        if self.failing_keys.contains(key) {
            return Err(SinkError::Unavailable {
                key: key.to_string(),
                reason: "configured to fail".to_string(),
            });
        }
        Ok(())
    }
}

impl ResultSink for MemorySink {
    fn persist(&self, key: &str, summary: &RevenueSummary) -> Result<(), SinkError> {
        self.check(key)?;
        self.calls.lock().push(SinkCall::Persist {
            key: key.to_string(),
            summary: summary.clone(),
        });
        Ok(())
    }

    fn visualize(
        &self,
        region_revenue: &BTreeMap<String, f64>,
        label: &str,
        destination: &Path,
    ) -> Result<(), SinkError> {
        self.check(label)?;
        self.calls.lock().push(SinkCall::Visualize {
            label: label.to_string(),
            region_revenue: region_revenue.clone(),
            destination: destination.to_path_buf(),
        });
        Ok(())
    }
}
