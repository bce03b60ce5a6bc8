use std::collections::HashMap;
use std::time;

use tracing::info;

use crate::collision::CollisionSet;
use crate::config::SearchConfig;
use crate::coordinator::SearchReport;
use crate::digest::StringHasher;
use crate::error::SearchError;

const TIMED_ITERATIONS: u64 = 1_000_000;

/// Single threaded collision search over the whole string space
///
/// Uses a hashmap to keep track of the first index that produced each digest, so every string is
/// hashed exactly once and collisions between any two strings of the space are found, not only
/// those within one partition. Memory grows with the number of distinct digests seen.
pub fn find_collisions<H: StringHasher>(
    config: &SearchConfig,
    hasher: &H,
) -> Result<SearchReport<H::Digest>, SearchError> {
    let codec = config.codec()?;
    let mut found = CollisionSet::new();

    let start = time::Instant::now();
    let mut loop_start = time::Instant::now();

    if config.goal.is_met(&found) {
        return Ok(SearchReport::from_set(found, start.elapsed(), true));
    }

    let mut first_seen: HashMap<H::Digest, u64> = HashMap::new();
    let mut current = String::with_capacity(codec.length());
    let mut scanned: u64 = 0;

    for index in 0..codec.space() {
        if index > 0 && index % TIMED_ITERATIONS == 0 {
            let iter_rate = TIMED_ITERATIONS as f32 / loop_start.elapsed().as_secs_f32();
            info!("Reached {} strings, running {} strings / s", index, iter_rate);
            loop_start = time::Instant::now();
        }

        codec.decode_into(index, &mut current);
        let digest = hasher.digest(&current);
        scanned += 1;

        match first_seen.get(&digest) {
            Some(&previous) => {
                let previous = codec.decode(previous)?;
                found.merge(digest, previous, current.clone());
                if config.goal.is_met(&found) {
                    break;
                }
            }
            None => {
                first_seen.insert(digest, index);
            }
        }
    }

    let elapsed = start.elapsed();
    info!("Completed hashing {} strings in {} seconds", scanned, elapsed.as_secs_f32());

    let goal_met = config.goal.is_met(&found);
    let mut report = SearchReport::from_set(found, elapsed, goal_met);
    // One map lookup per string hashed
    report.comparisons = scanned;
    Ok(report)
}
