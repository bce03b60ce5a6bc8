use crate::error::ConfigError;

/// A half-open interval `[first, last)` of string indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchRange {
    pub first: u64,
    pub last: u64,
}

impl SearchRange {
    pub fn new(first: u64, last: u64) -> Self {
        debug_assert!(first <= last);
        SearchRange { first, last }
    }

    pub fn len(&self) -> u64 {
        self.last - self.first
    }

    pub fn is_empty(&self) -> bool {
        self.first >= self.last
    }

    pub fn contains(&self, index: u64) -> bool {
        self.first <= index && index < self.last
    }

    /// Number of index pairs `(i, j)` with `i < j` inside the range
    pub fn pair_count(&self) -> u128 {
        let n = self.len() as u128;
        n * n.saturating_sub(1) / 2
    }
}

/// Splits `[0, total_space)` into `worker_count` contiguous ranges
///
/// Every range but the last holds `total_space / worker_count` indices, the last one absorbs the
/// remainder. When there are more workers than indices the leading ranges are empty.
pub fn plan(total_space: u64, worker_count: usize) -> Result<Vec<SearchRange>, ConfigError> {
    if worker_count == 0 {
        return Err(ConfigError::InvalidWorkerCount(worker_count));
    }

    let chunk = total_space / worker_count as u64;
    let ranges = (0..worker_count as u64)
        .map(|worker| {
            let first = worker * chunk;
            let last = if worker + 1 == worker_count as u64 { total_space } else { first + chunk };
            SearchRange::new(first, last)
        })
        .collect();

    Ok(ranges)
}
