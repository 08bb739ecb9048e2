//! Splitting an ordered file list into balanced worker batches

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Partitioning error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    /// Worker count must be at least one
    #[error("Invalid worker count: {0} (must be at least 1)")]
    InvalidWorkerCount(usize),
}

/// Rule for placing the `len % workers` leftover files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategy {
    /// Every batch takes `len / workers` consecutive files first; the leftovers are
    /// then appended one each to the first batches, in order.
    #[default]
    RemainderAppended,
    /// Same batch sizes, but each batch is one contiguous run of the input so the
    /// concatenated batches equal the input.
    Contiguous,
}

impl PartitionStrategy {
    /// Partition `files` for `workers` workers with this rule
    pub fn apply<T: Clone>(&self, files: &[T], workers: usize) -> Result<Vec<Vec<T>>, PartitionError> {
        match self {
            PartitionStrategy::RemainderAppended => partition(files, workers),
            PartitionStrategy::Contiguous => partition_contiguous(files, workers),
        }
    }
}

/// Split `files` into exactly `workers` batches.
///
/// Returns no batches at all when there are more workers than files. Batch sizes
/// differ by at most one, every file lands in exactly one batch and each batch keeps
/// the input's relative order.
///
/// ```
/// use sales_pipeline::batch::partition;
///
/// let files: Vec<u32> = (0..10).collect();
/// let batches = partition(&files, 3).unwrap();
/// assert_eq!(batches, vec![vec![0, 1, 2, 9], vec![3, 4, 5], vec![6, 7, 8]]);
/// ```
pub fn partition<T: Clone>(files: &[T], workers: usize) -> Result<Vec<Vec<T>>, PartitionError> {
    let Some((base, remainder)) = shape(files.len(), workers)? else {
        return Ok(Vec::new());
    };

    let mut remaining = files.iter().cloned();
    let mut batches: Vec<Vec<T>> = (0..workers)
        .map(|_| remaining.by_ref().take(base).collect())
        .collect();

    for (batch, leftover) in batches.iter_mut().take(remainder).zip(remaining) {
        batch.push(leftover);
    }

    Ok(batches)
}

/// Split `files` into exactly `workers` contiguous batches.
///
/// Sizes match [`partition`]; the first `len % workers` batches hold one extra file.
pub fn partition_contiguous<T: Clone>(
    files: &[T],
    workers: usize,
) -> Result<Vec<Vec<T>>, PartitionError> {
    let Some((base, remainder)) = shape(files.len(), workers)? else {
        return Ok(Vec::new());
    };

    let mut start = 0;
    let batches = (0..workers)
        .map(|index| {
            let size = base + usize::from(index < remainder);
            let batch = files[start..start + size].to_vec();
            start += size;
            batch
        })
        .collect();

    Ok(batches)
}

/// `(base, remainder)` for a run, or `None` when no batches should be made
fn shape(len: usize, workers: usize) -> Result<Option<(usize, usize)>, PartitionError> {
    if workers == 0 {
        return Err(PartitionError::InvalidWorkerCount(workers));
    }
    if workers > len {
        return Ok(None);
    }
    Ok(Some((len / workers, len % workers)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn test_even_split() {
        let batches = partition(&names(9), 3).unwrap();
        assert_eq!(
            batches,
            vec![
                vec!["f0", "f1", "f2"],
                vec!["f3", "f4", "f5"],
                vec!["f6", "f7", "f8"],
            ]
        );
    }

    #[test]
    fn test_remainder_appended_to_first_batches() {
        let batches = partition(&names(10), 3).unwrap();
        assert_eq!(
            batches,
            vec![
                vec!["f0", "f1", "f2", "f9"],
                vec!["f3", "f4", "f5"],
                vec!["f6", "f7", "f8"],
            ]
        );

        let batches = partition(&names(11), 3).unwrap();
        assert_eq!(
            batches,
            vec![
                vec!["f0", "f1", "f2", "f9"],
                vec!["f3", "f4", "f5", "f10"],
                vec!["f6", "f7", "f8"],
            ]
        );
    }

    #[test]
    fn test_more_workers_than_files() {
        assert!(partition(&names(2), 5).unwrap().is_empty());
        assert!(partition_contiguous(&names(2), 5).unwrap().is_empty());
        assert!(partition::<String>(&[], 1).unwrap().is_empty());
    }

    #[test]
    fn test_zero_workers() {
        assert_eq!(
            partition(&names(4), 0),
            Err(PartitionError::InvalidWorkerCount(0))
        );
        assert_eq!(
            PartitionStrategy::Contiguous.apply(&names(4), 0),
            Err(PartitionError::InvalidWorkerCount(0))
        );
    }

    #[test]
    fn test_one_file_per_worker() {
        let batches = partition(&names(4), 4).unwrap();
        assert_eq!(batches, vec![vec!["f0"], vec!["f1"], vec!["f2"], vec!["f3"]]);
    }

    #[test]
    fn test_contiguous_split() {
        let batches = partition_contiguous(&names(10), 3).unwrap();
        assert_eq!(
            batches,
            vec![
                vec!["f0", "f1", "f2", "f3"],
                vec!["f4", "f5", "f6"],
                vec!["f7", "f8", "f9"],
            ]
        );
    }

    #[test]
    fn test_strategy_dispatch() {
        let files = names(10);
        assert_eq!(
            PartitionStrategy::default().apply(&files, 3).unwrap(),
            partition(&files, 3).unwrap()
        );
        assert_eq!(
            PartitionStrategy::Contiguous.apply(&files, 3).unwrap(),
            partition_contiguous(&files, 3).unwrap()
        );
    }
}
