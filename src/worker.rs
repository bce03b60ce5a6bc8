use std::time::{Duration, Instant};

use crate::cancel::CancellationToken;
use crate::codec::StringCodec;
use crate::digest::StringHasher;
use crate::partition::SearchRange;

// Reading the clock on every comparison costs more than the comparison itself
const CLOCK_STRIDE: u64 = 1 << 10;

/// Lifecycle of a worker slot, as tracked by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Found,
    Exhausted,
    Cancelled,
    Faulted,
}

impl WorkerState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerState::Idle | WorkerState::Running)
    }
}

/// One unit of work: all pairs `(i, j)` with `i` in `rows` and `i < j < end`, skipping the pairs
/// of the first row below `inner_start`
///
/// The rows are a slice of the string space while `end` is the end of the whole space, so the
/// tasks of a plan together compare every pair of the space exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTask {
    pub worker_id: usize,
    pub rows: SearchRange,
    pub inner_start: u64,
    pub end: u64,
}

impl ScanTask {
    pub fn new(worker_id: usize, rows: SearchRange, end: u64) -> Self {
        debug_assert!(rows.last <= end);
        ScanTask { worker_id, rows, inner_start: rows.first.saturating_add(1), end }
    }

    /// The task covering every pair after `(outer, inner)` in scan order, or None when that pair
    /// was the last one of the task
    pub fn resume_after(&self, outer: u64, inner: u64) -> Option<ScanTask> {
        let ScanTask { worker_id, rows, end, .. } = *self;

        if inner + 1 < end {
            return Some(ScanTask {
                worker_id,
                rows: SearchRange::new(outer, rows.last),
                inner_start: inner + 1,
                end,
            });
        }

        if outer + 1 < rows.last && outer + 2 < end {
            return Some(ScanTask {
                worker_id,
                rows: SearchRange::new(outer + 1, rows.last),
                inner_start: outer + 2,
                end,
            });
        }

        None
    }

    /// Number of pairs this task will compare if it runs to the end
    pub fn remaining_pairs(&self) -> u128 {
        if self.rows.is_empty() {
            return 0;
        }

        let first_row = self.end.saturating_sub(self.inner_start.max(self.rows.first + 1));
        // Pairs whose smaller index lies in the later rows
        let later_rows = SearchRange::new(self.rows.first + 1, self.end).pair_count()
            - SearchRange::new(self.rows.last, self.end).pair_count();
        first_row as u128 + later_rows
    }
}

/// Two distinct strings sharing a digest, with the indices they were decoded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision<D> {
    pub outer: u64,
    pub inner: u64,
    pub first: String,
    pub second: String,
    pub digest: D,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome<D> {
    Found(Collision<D>),
    Exhausted,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ScanReport<D> {
    pub task: ScanTask,
    pub outcome: ScanOutcome<D>,
    pub comparisons: u64,
}

/// Compares the digests of every index pair of `task` until one collides
///
/// Stops at the first collision. The cancellation token is checked before the first comparison
/// and then whenever `check_interval` has elapsed, sampled every few thousand comparisons.
pub fn scan<H>(
    task: &ScanTask,
    codec: &StringCodec,
    hasher: &H,
    cancel: &CancellationToken,
    check_interval: Duration,
) -> ScanReport<H::Digest>
where
    H: StringHasher + ?Sized,
{
    let report = |outcome, comparisons| ScanReport { task: *task, outcome, comparisons };

    if cancel.is_cancelled() {
        return report(ScanOutcome::Cancelled, 0);
    }

    let SearchRange { first, last } = task.rows;
    let end = task.end;
    let mut left = String::with_capacity(codec.length());
    let mut right = String::with_capacity(codec.length());
    let mut comparisons: u64 = 0;
    let mut last_check = Instant::now();

    for outer in first..last.min(end.saturating_sub(1)) {
        codec.decode_into(outer, &mut left);
        let left_digest = hasher.digest(&left);

        let inner_start = if outer == first { task.inner_start.max(outer + 1) } else { outer + 1 };
        for inner in inner_start..end {
            codec.decode_into(inner, &mut right);
            let right_digest = hasher.digest(&right);
            comparisons += 1;

            if left_digest == right_digest && left != right {
                let collision = Collision {
                    outer,
                    inner,
                    first: left,
                    second: right,
                    digest: left_digest,
                };
                return report(ScanOutcome::Found(collision), comparisons);
            }

            if comparisons % CLOCK_STRIDE == 0 && last_check.elapsed() >= check_interval {
                if cancel.is_cancelled() {
                    return report(ScanOutcome::Cancelled, comparisons);
                }
                last_check = Instant::now();
            }
        }
    }

    report(ScanOutcome::Exhausted, comparisons)
}
