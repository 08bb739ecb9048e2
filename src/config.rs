//! Pipeline configuration
//!
//! Everything the run needs (input location, worker count, column names) travels in
//! one [`PipelineConfig`] handed to the orchestrator.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::batch::{PartitionError, PartitionStrategy};
use crate::{PipelineError, Result};

/// Input dataset category, one sub-directory of the data root each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Dataset {
    /// Handful of files for smoke runs
    #[default]
    #[serde(rename = "tst")]
    #[value(name = "tst")]
    Test,
    /// Small dataset
    #[serde(rename = "sml")]
    #[value(name = "sml")]
    Small,
    /// Full dataset
    #[serde(rename = "bg")]
    #[value(name = "bg")]
    Big,
}

impl Dataset {
    /// Directory name under the data and output roots
    pub fn dir_name(&self) -> &'static str {
        match self {
            Dataset::Test => "tst",
            Dataset::Small => "sml",
            Dataset::Big => "bg",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// How the first row of every file is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    /// Row 0 is taken as column labels without checking
    #[default]
    Skip,
    /// Row 0 must name every required column, checked when the file is opened
    Validate,
}

/// Names of the columns the summaries read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Grouping column (country)
    pub region: String,
    /// Per-unit price
    pub unit_price: String,
    /// Line total, the revenue column
    pub total_price: String,
}

impl ColumnNames {
    /// Every column a summary touches
    pub fn required(&self) -> [&str; 3] {
        [
            self.region.as_str(),
            self.unit_price.as_str(),
            self.total_price.as_str(),
        ]
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            region: "Country".to_string(),
            unit_price: "UnitPrice".to_string(),
            total_price: "TotalPrice".to_string(),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding one sub-directory per dataset
    pub data_root: PathBuf,
    /// Directory receiving `<dataset>/<timestamp>/` run folders
    pub output_root: PathBuf,
    /// Dataset to process
    pub dataset: Dataset,
    /// Number of concurrent workers, fixed for the run
    pub workers: usize,
    /// Extension of input files, without the dot
    pub extension: String,
    /// Column names
    pub columns: ColumnNames,
    /// Header handling
    pub header_mode: HeaderMode,
    /// Batch assignment rule
    pub partition_strategy: PartitionStrategy,
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            output_root: PathBuf::from("output"),
            dataset: Dataset::default(),
            workers: 3,
            extension: "csv".to_string(),
            columns: ColumnNames::default(),
            header_mode: HeaderMode::default(),
            partition_strategy: PartitionStrategy::default(),
            log_filter: "sales_pipeline=info,sales_summary=info".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON configuration file; absent fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            PipelineError::Config(format!("invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run can use
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(PartitionError::InvalidWorkerCount(self.workers).into());
        }
        if self.extension.is_empty() {
            return Err(PipelineError::Config("extension must not be empty".to_string()));
        }
        Ok(())
    }

    /// Directory of the selected dataset
    pub fn data_dir(&self) -> PathBuf {
        self.data_root.join(self.dataset.dir_name())
    }

    /// Set the dataset
    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.dataset = dataset;
        self
    }

    /// Set the worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the data root
    pub fn with_data_root(mut self, data_root: impl Into<PathBuf>) -> Self {
        self.data_root = data_root.into();
        self
    }

    /// Set the output root
    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    /// Set header handling
    pub fn with_header_mode(mut self, header_mode: HeaderMode) -> Self {
        self.header_mode = header_mode;
        self
    }

    /// Set the batch assignment rule
    pub fn with_partition_strategy(mut self, strategy: PartitionStrategy) -> Self {
        self.partition_strategy = strategy;
        self
    }

    /// Set column names
    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }
}
