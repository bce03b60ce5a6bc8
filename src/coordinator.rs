use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Select, TryRecvError};
use rayon::ThreadPool;
use tracing::{debug, info, trace, warn};

use crate::cancel::CancellationToken;
use crate::codec::StringCodec;
use crate::collision::{CollisionGroup, CollisionSet, Merge};
use crate::config::SearchConfig;
use crate::digest::StringHasher;
use crate::error::{SearchError, WorkerFault};
use crate::partition;
use crate::worker::{self, ScanOutcome, ScanReport, ScanTask, WorkerState};

/// Everything a search found, split by group size
#[derive(Debug, Clone)]
pub struct SearchReport<D> {
    pub pairs: Vec<CollisionGroup<D>>,
    pub triples: Vec<CollisionGroup<D>>,
    pub elapsed: Duration,
    /// Digest comparisons made. The sequential search looks each new digest up once in its
    /// first-seen map, so there this is the number of strings hashed.
    pub comparisons: u64,
    /// Tasks handed back to a worker after it reported a collision
    pub reissues: usize,
    pub faults: Vec<WorkerFault>,
    /// Final state of every worker slot. Empty for searches that never launched workers.
    pub worker_states: Vec<WorkerState>,
    pub goal_met: bool,
}

impl<D> SearchReport<D> {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.triples.is_empty()
    }

    pub(crate) fn from_set(found: CollisionSet<D>, elapsed: Duration, goal_met: bool) -> Self
    where
        D: Clone + Eq + std::hash::Hash,
    {
        let (pairs, triples) = found.into_groups();
        SearchReport {
            pairs,
            triples,
            elapsed,
            comparisons: 0,
            reissues: 0,
            faults: Vec::new(),
            worker_states: Vec::new(),
            goal_met,
        }
    }
}

type TaskResult<D> = Result<ScanReport<D>, WorkerFault>;

struct PendingTask<D> {
    worker_id: usize,
    receiver: Receiver<TaskResult<D>>,
}

/// Read-only state shared by every task
struct ScanContext<H> {
    codec: Arc<StringCodec>,
    hasher: Arc<H>,
    cancel: CancellationToken,
    check_interval: Duration,
}

impl<H> Clone for ScanContext<H> {
    fn clone(&self) -> Self {
        ScanContext {
            codec: Arc::clone(&self.codec),
            hasher: Arc::clone(&self.hasher),
            cancel: self.cancel.clone(),
            check_interval: self.check_interval,
        }
    }
}

/// Parallel search for strings sharing a digest under `hasher`
///
/// The string space is split into one contiguous slice of rows per worker. A worker pairs every
/// index of its rows with every later index of the whole space and reports the first colliding
/// pair, after which it is handed the rest of its task. Every pair of the space is compared by
/// exactly one worker. The coordinator merges what workers report on this thread only, and
/// cancels everyone once `config.goal` is met. If every task runs out first, the search ends
/// with whatever was found.
///
/// Configuration errors are returned before any worker starts. A worker that panics is logged,
/// recorded in [`SearchReport::faults`] and never rescheduled.
pub fn run<H>(config: &SearchConfig, hasher: H) -> Result<SearchReport<H::Digest>, SearchError>
where
    H: StringHasher + 'static,
{
    let start = Instant::now();

    let codec = config.codec()?;
    let workers = if config.workers == 0 {
        warn!("worker count of 0 requested, using a single worker");
        1
    } else {
        config.workers
    };
    let ranges = partition::plan(codec.space(), workers)?;

    let mut found = CollisionSet::new();
    if config.goal.is_met(&found) {
        return Ok(SearchReport::from_set(found, start.elapsed(), true));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("samehash-worker-{}", i))
        .build()?;

    info!(
        "Searching {} strings of length {} over {:?} with {} worker(s) for {}",
        codec.space(),
        codec.length(),
        config.alphabet.to_string(),
        workers,
        config.goal
    );

    let context = ScanContext {
        codec: Arc::new(codec),
        hasher: Arc::new(hasher),
        cancel: CancellationToken::new(),
        check_interval: config.cancel_check_interval,
    };

    let space = context.codec.space();
    let mut roster = vec![WorkerState::Idle; workers];
    let mut pending = Vec::with_capacity(workers);
    for (worker_id, rows) in ranges.into_iter().enumerate() {
        pending.push(launch(&pool, ScanTask::new(worker_id, rows, space), &context));
        roster[worker_id] = WorkerState::Running;
    }

    let mut comparisons: u64 = 0;
    let mut reissues = 0;
    let mut faults = Vec::new();

    while !pending.is_empty() {
        let ready = match wait_for_completion(&pending, config.poll_interval) {
            Some(ready) => ready,
            None => continue,
        };
        let PendingTask { worker_id, receiver } = pending.swap_remove(ready);

        let report = match receiver.try_recv() {
            Ok(Ok(report)) => report,
            Ok(Err(fault)) => {
                warn!("{}, excluding it from the rest of the search", fault);
                roster[worker_id] = WorkerState::Faulted;
                faults.push(fault);
                continue;
            }
            Err(TryRecvError::Disconnected) => {
                let fault = WorkerFault {
                    worker_id,
                    message: "task ended without reporting".to_owned(),
                };
                warn!("{}, excluding it from the rest of the search", fault);
                roster[worker_id] = WorkerState::Faulted;
                faults.push(fault);
                continue;
            }
            Err(TryRecvError::Empty) => {
                // Select woke us spuriously, keep waiting on this task
                pending.push(PendingTask { worker_id, receiver });
                continue;
            }
        };

        comparisons += report.comparisons;

        match report.outcome {
            ScanOutcome::Found(collision) => {
                roster[worker_id] = WorkerState::Found;
                let (outer, inner) = (collision.outer, collision.inner);
                let rendered = context.hasher.render(&collision.digest);

                match found.merge(collision.digest, collision.first, collision.second) {
                    Merge::Escalated => {
                        info!("Worker {} completed a triple for {}", worker_id, rendered)
                    }
                    merge => debug!("Worker {} reported {:?} for {}", worker_id, merge, rendered),
                }

                if config.goal.is_met(&found) && context.cancel.cancel() {
                    info!("Found {}, asking the remaining workers to stop", config.goal);
                }

                if context.cancel.is_cancelled() {
                    continue;
                }

                match report.task.resume_after(outer, inner) {
                    Some(next) => {
                        debug!(
                            "Reissuing worker {} from ({}, {}), {} pair(s) left",
                            worker_id,
                            next.rows.first,
                            next.inner_start,
                            next.remaining_pairs()
                        );
                        pending.push(launch(&pool, next, &context));
                        roster[worker_id] = WorkerState::Running;
                        reissues += 1;
                    }
                    None => {
                        debug!("Worker {} reached the end of its rows", worker_id);
                        roster[worker_id] = WorkerState::Exhausted;
                    }
                }
            }
            ScanOutcome::Exhausted => {
                debug!("Worker {} exhausted its rows without a collision", worker_id);
                roster[worker_id] = WorkerState::Exhausted;
            }
            ScanOutcome::Cancelled => {
                trace!("Worker {} stopped after cancellation", worker_id);
                roster[worker_id] = WorkerState::Cancelled;
            }
        }
    }

    let elapsed = start.elapsed();
    let goal_met = config.goal.is_met(&found);
    if !goal_met {
        info!("Every worker ran out of work before finding {}", config.goal);
    }
    info!(
        "Completed {} comparisons in {} seconds, {} comparisons / s",
        comparisons,
        elapsed.as_secs_f32(),
        comparisons as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );

    let mut report = SearchReport::from_set(found, elapsed, goal_met);
    report.comparisons = comparisons;
    report.reissues = reissues;
    report.faults = faults;
    report.worker_states = roster;
    Ok(report)
}

/// Spawns `task` on the pool with its own one-shot completion channel
fn launch<H>(pool: &ThreadPool, task: ScanTask, context: &ScanContext<H>) -> PendingTask<H::Digest>
where
    H: StringHasher + 'static,
{
    let (sender, receiver) = crossbeam_channel::bounded(1);
    let context = context.clone();
    let worker_id = task.worker_id;
    trace!("Launching worker {} on rows {:?}", worker_id, task.rows);

    pool.spawn(move || {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            worker::scan(
                &task,
                &context.codec,
                context.hasher.as_ref(),
                &context.cancel,
                context.check_interval,
            )
        }))
        .map_err(|payload| WorkerFault { worker_id, message: panic_message(payload.as_ref()) });

        // The receiver only goes away if the coordinator itself is gone
        let _ = sender.send(result);
    });

    PendingTask { worker_id, receiver }
}

/// Blocks for at most `timeout` until one of the pending tasks has completed
fn wait_for_completion<D>(pending: &[PendingTask<D>], timeout: Duration) -> Option<usize> {
    let mut select = Select::new();
    for task in pending {
        select.recv(&task.receiver);
    }
    select.ready_timeout(timeout).ok()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_owned();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic".to_owned()
}
