//! Per-file revenue summaries

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::config::{ColumnNames, HeaderMode, PipelineConfig};
use crate::metrics;
use crate::source::{SalesReader, SourceError};

/// Total and per-region revenue of one input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    /// Sum of the total-price column
    pub total_revenue: f64,
    /// Revenue keyed by the regions present in the file
    pub revenue_per_region: BTreeMap<String, f64>,
    /// Base name of the file, without extension
    pub file_name: String,
}

/// Builds [`RevenueSummary`] values from sales files
#[derive(Debug, Clone, Default)]
pub struct SummaryBuilder {
    columns: ColumnNames,
    header_mode: HeaderMode,
}

impl SummaryBuilder {
    /// Create a builder for the given columns and header handling
    pub fn new(columns: ColumnNames, header_mode: HeaderMode) -> Self {
        Self {
            columns,
            header_mode,
        }
    }

    /// Builder matching a pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.columns.clone(), config.header_mode)
    }

    /// Summarize the file at `path`
    #[instrument(skip(self, path), fields(file = %path.display()))]
    pub fn summarize(&self, path: &Path) -> Result<RevenueSummary, SourceError> {
        let result = SalesReader::open(path, self.columns.clone(), self.header_mode)
            .and_then(|reader| summarize(&reader));

        metrics::record_file(result.is_ok());
        result
    }
}

/// Summarize the file behind `reader`.
///
/// Logs column statistics for the price columns, then takes the total from the
/// reader's own aggregate and the per-region split from a row pass.
pub fn summarize(reader: &SalesReader) -> Result<RevenueSummary, SourceError> {
    let columns = reader.columns();

    reader.describe(&[columns.unit_price.as_str(), columns.total_price.as_str()])?;

    let total_revenue = reader.aggregate(&columns.total_price)?;
    let revenue_per_region = revenue_per_region(reader)?;

    let file_name = file_stem(reader.path());
    debug!(
        file_name = %file_name,
        total_revenue = total_revenue,
        regions = revenue_per_region.len(),
        "File summarized"
    );

    Ok(RevenueSummary {
        total_revenue,
        revenue_per_region,
        file_name,
    })
}

/// Rows between two progress events of [`revenue_per_region`]
pub const PROGRESS_INTERVAL: u64 = 100_000;

/// Revenue of every region observed in the file
pub fn revenue_per_region(reader: &SalesReader) -> Result<BTreeMap<String, f64>, SourceError> {
    let columns = reader.columns();
    let mut aggregate = BTreeMap::new();
    let mut rows: u64 = 0;

    for row in reader.rows()? {
        let row = row?;
        let region = reader.field(&row, &columns.region)?;
        let revenue = reader.float_field(&row, &columns.total_price)?;

        *aggregate.entry(region.to_string()).or_insert(0.0) += revenue;

        rows += 1;
        if rows % PROGRESS_INTERVAL == 0 {
            trace!(path = %reader.path().display(), rows, "Aggregating regions");
        }
    }

    debug!(path = %reader.path().display(), rows, regions = aggregate.len(), "Regions aggregated");
    Ok(aggregate)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_summary_totals() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "2019.csv",
            "Country,UnitPrice,TotalPrice\nA,5,10.0\nB,1,5.0\nA,2.5,2.5\n",
        );

        let summary = SummaryBuilder::default().summarize(&path).unwrap();

        assert_eq!(summary.file_name, "2019");
        assert_eq!(summary.total_revenue, 17.5);
        assert_eq!(
            summary.revenue_per_region,
            BTreeMap::from([("A".to_string(), 12.5), ("B".to_string(), 5.0)])
        );
    }

    #[test]
    fn test_total_matches_region_sum_and_aggregate() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "2020.csv",
            "Country,UnitPrice,TotalPrice\nFrance,1,0.1\nIndia,1,0.2\nFrance,1,0.3\nJapan,1,1e3\n",
        );
        let reader = SalesReader::open(&path, ColumnNames::default(), HeaderMode::Skip).unwrap();

        let summary = summarize(&reader).unwrap();
        let region_sum: f64 = summary.revenue_per_region.values().sum();

        assert_eq!(summary.total_revenue, reader.aggregate("TotalPrice").unwrap());
        assert!((summary.total_revenue - region_sum).abs() < 1e-9);
    }

    #[test]
    fn test_header_only_file_is_empty_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "empty.csv", "Country,UnitPrice,TotalPrice\n");

        let summary = SummaryBuilder::default().summarize(&path).unwrap();
        assert_eq!(summary.total_revenue, 0.0);
        assert!(summary.revenue_per_region.is_empty());
    }

    #[test]
    fn test_non_numeric_total_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "bad.csv",
            "Country,UnitPrice,TotalPrice\nA,1,ten\n",
        );

        let result = SummaryBuilder::default().summarize(&path);
        assert!(matches!(result, Err(SourceError::Conversion { .. })));
    }

    #[test]
    fn test_custom_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "custom.csv", "region,price,total\nNorth,1,4\nSouth,1,6\n");
        let columns = ColumnNames {
            region: "region".to_string(),
            unit_price: "price".to_string(),
            total_price: "total".to_string(),
        };

        let summary = SummaryBuilder::new(columns, HeaderMode::Validate)
            .summarize(&path)
            .unwrap();
        assert_eq!(summary.total_revenue, 10.0);
        assert_eq!(summary.revenue_per_region["South"], 6.0);
    }

    #[test]
    fn test_json_round_trip() {
        let summary = RevenueSummary {
            total_revenue: 1234.5678,
            revenue_per_region: BTreeMap::from([
                ("United Kingdom".to_string(), 1000.0),
                ("Italy".to_string(), 234.5678),
            ]),
            file_name: "2018".to_string(),
        };

        let json = serde_json::to_string(&summary).unwrap();
        let back: RevenueSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn test_region_progress_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let mut contents = String::from("Country,UnitPrice,TotalPrice\n");
        for i in 0..PROGRESS_INTERVAL + 5 {
            contents.push_str(if i % 2 == 0 { "A,1,1\n" } else { "B,1,2\n" });
        }
        let path = write_csv(&dir, "big.csv", &contents);
        let reader = SalesReader::open(&path, ColumnNames::default(), HeaderMode::Skip).unwrap();

        let (regions, logs) =
            crate::logging::capture(tracing::Level::TRACE, || revenue_per_region(&reader));

        let regions = regions.unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(logs.matches("Aggregating regions").count(), 1);
        assert!(logs.contains(&format!("rows={}", PROGRESS_INTERVAL + 5)));
    }
}
