//! Row source over CSV sales files
//!
//! A [`SalesReader`] is a handle to one file. Every call to [`SalesReader::rows`],
//! [`SalesReader::aggregate`] or [`SalesReader::describe`] opens a fresh forward-only
//! pass; the first physical row is always consumed as column labels.

mod stats;

pub use stats::ColumnStats;

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ColumnNames, HeaderMode};

/// Errors raised while reading sales rows
#[derive(Error, Debug)]
pub enum SourceError {
    /// The file could not be opened or a record could not be read
    #[error("Cannot read {}: {source}", .path.display())]
    DataAccess {
        /// File being read
        path: PathBuf,
        /// Underlying reader error
        #[source]
        source: csv::Error,
    },

    /// A row (or the header, at line 1) lacks a required column
    #[error("Line {line} of {} has no `{column}` column", .path.display())]
    MalformedRow {
        /// File being read
        path: PathBuf,
        /// Line number in the file
        line: u64,
        /// Missing column
        column: String,
    },

    /// A field expected to be numeric could not be parsed
    #[error("Cannot convert {value:?} to a number: {source}")]
    Conversion {
        /// Offending text
        value: String,
        /// Parser error
        #[source]
        source: std::num::ParseFloatError,
    },
}

/// One column-keyed data row
#[derive(Debug, Clone)]
pub struct SalesRow {
    line: u64,
    record: csv::StringRecord,
    index: Arc<HashMap<String, usize>>,
}

impl SalesRow {
    /// Line number of this row in its file (the header is line 1)
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Raw text of `column`, if the header names it and the row has that field
    pub fn get(&self, column: &str) -> Option<&str> {
        self.index
            .get(column)
            .and_then(|&position| self.record.get(position))
    }
}

/// Lazy iterator over the data rows of one pass
pub struct Rows {
    path: PathBuf,
    records: csv::StringRecordsIntoIter<File>,
    index: Arc<HashMap<String, usize>>,
}

impl Iterator for Rows {
    type Item = Result<SalesRow, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(
            record
                .map(|record| SalesRow {
                    line: record.position().map(|p| p.line()).unwrap_or_default(),
                    record,
                    index: Arc::clone(&self.index),
                })
                .map_err(|source| SourceError::DataAccess {
                    path: self.path.clone(),
                    source,
                }),
        )
    }
}

/// Handle to a single sales file
#[derive(Debug, Clone)]
pub struct SalesReader {
    path: PathBuf,
    columns: ColumnNames,
}

impl SalesReader {
    /// Open `path`, checking that it is readable.
    ///
    /// With [`HeaderMode::Validate`] the header must name every column in `columns`;
    /// with [`HeaderMode::Skip`] the header is trusted and a missing column only
    /// surfaces when a row is looked up.
    pub fn open(
        path: impl Into<PathBuf>,
        columns: ColumnNames,
        header_mode: HeaderMode,
    ) -> Result<Self, SourceError> {
        let reader = Self {
            path: path.into(),
            columns,
        };

        let mut csv_reader = reader.csv_reader()?;
        let index = reader.header_index(&mut csv_reader)?;

        if header_mode == HeaderMode::Validate {
            for column in reader.columns.required() {
                if !index.contains_key(column) {
                    return Err(SourceError::MalformedRow {
                        path: reader.path.clone(),
                        line: 1,
                        column: column.to_string(),
                    });
                }
            }
        }

        debug!(file = %reader.path.display(), columns = index.len(), "Opened sales file");
        Ok(reader)
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Column names used for lookups
    pub fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    /// Start a new pass over the data rows, header already consumed
    pub fn rows(&self) -> Result<Rows, SourceError> {
        let mut csv_reader = self.csv_reader()?;
        let index = self.header_index(&mut csv_reader)?;

        Ok(Rows {
            path: self.path.clone(),
            records: csv_reader.into_records(),
            index,
        })
    }

    /// Text of `column` in `row`, or `MalformedRow` when absent
    pub fn field<'a>(&self, row: &'a SalesRow, column: &str) -> Result<&'a str, SourceError> {
        row.get(column).ok_or_else(|| SourceError::MalformedRow {
            path: self.path.clone(),
            line: row.line(),
            column: column.to_string(),
        })
    }

    /// Numeric value of `column` in `row`
    pub fn float_field(&self, row: &SalesRow, column: &str) -> Result<f64, SourceError> {
        Self::to_float(self.field(row, column)?)
    }

    /// Parse a numeric field, ignoring surrounding whitespace
    pub fn to_float(value: &str) -> Result<f64, SourceError> {
        value
            .trim()
            .parse::<f64>()
            .map_err(|source| SourceError::Conversion {
                value: value.to_string(),
                source,
            })
    }

    /// Sum of `column` over every data row, in its own pass
    pub fn aggregate(&self, column: &str) -> Result<f64, SourceError> {
        let mut total = 0.0;
        for row in self.rows()? {
            total += self.float_field(&row?, column)?;
        }
        Ok(total)
    }

    /// Descriptive statistics for `columns`, logged and returned
    pub fn describe(&self, columns: &[&str]) -> Result<Vec<ColumnStats>, SourceError> {
        let mut stats: Vec<ColumnStats> = columns.iter().map(|c| ColumnStats::new(*c)).collect();

        for row in self.rows()? {
            let row = row?;
            for column_stats in stats.iter_mut() {
                let value = self.float_field(&row, &column_stats.column)?;
                column_stats.observe(value);
            }
        }

        for s in &stats {
            info!(
                file = %self.path.display(),
                column = %s.column,
                count = s.count,
                mean = ?s.mean(),
                std = ?s.std(),
                min = ?s.min,
                max = ?s.max,
                "Column statistics"
            );
        }

        Ok(stats)
    }

    fn csv_reader(&self) -> Result<csv::Reader<File>, SourceError> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|source| SourceError::DataAccess {
                path: self.path.clone(),
                source,
            })
    }

    fn header_index(
        &self,
        csv_reader: &mut csv::Reader<File>,
    ) -> Result<Arc<HashMap<String, usize>>, SourceError> {
        let headers = csv_reader
            .headers()
            .map_err(|source| SourceError::DataAccess {
                path: self.path.clone(),
                source,
            })?;

        Ok(Arc::new(
            headers
                .iter()
                .enumerate()
                .map(|(position, name)| (name.trim().to_string(), position))
                .collect(),
        ))
    }
}
