//! Configuration for a collision search.

use std::fmt;
use std::time::Duration;

use tracing::warn;

use crate::codec::{Alphabet, StringCodec};
use crate::collision::CollisionSet;
use crate::error::ConfigError;

/// When the search may stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// Stop after this many distinct colliding digests
    Pairs(usize),
    /// Stop after this many digests shared by three strings or more
    Triples(usize),
    /// Stop once both counts are reached. Triples count towards `pairs` as well.
    Both { pairs: usize, triples: usize },
}

impl Goal {
    pub fn is_met<D: Clone + Eq + std::hash::Hash>(&self, found: &CollisionSet<D>) -> bool {
        match *self {
            Goal::Pairs(count) => found.pair_count() >= count,
            Goal::Triples(count) => found.triple_count() >= count,
            Goal::Both { pairs, triples } => {
                found.pair_count() >= pairs && found.triple_count() >= triples
            }
        }
    }
}

impl Default for Goal {
    fn default() -> Self {
        Goal::Triples(1)
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Pairs(count) => write!(f, "{} pair(s)", count),
            Goal::Triples(count) => write!(f, "{} triple(s)", count),
            Goal::Both { pairs, triples } => {
                write!(f, "{} pair(s) including {} triple(s)", pairs, triples)
            }
        }
    }
}

/// One worker per logical core, keeping one core for the coordinator
pub fn default_workers() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

/// Everything the coordinator needs besides the hash function
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub alphabet: Alphabet,
    /// Length of every candidate string
    pub length: usize,
    pub workers: usize,
    pub goal: Goal,
    /// Longest the coordinator blocks waiting for a worker to finish
    pub poll_interval: Duration,
    /// Minimum wall time between two cancellation checks inside a worker
    pub cancel_check_interval: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            alphabet: Alphabet::lowercase(),
            length: 4,
            workers: default_workers(),
            goal: Goal::default(),
            poll_interval: Duration::from_millis(10),
            cancel_check_interval: Duration::from_millis(1),
        }
    }
}

impl SearchConfig {
    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// A count of zero is corrected to one worker
    pub fn with_workers(mut self, workers: usize) -> Self {
        if workers == 0 {
            warn!("{}, using a single worker", ConfigError::InvalidWorkerCount(workers));
        }
        self.workers = workers.max(1);
        self
    }

    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goal = goal;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_cancel_check_interval(mut self, interval: Duration) -> Self {
        self.cancel_check_interval = interval;
        self
    }

    pub fn codec(&self) -> Result<StringCodec, ConfigError> {
        StringCodec::new(self.alphabet.clone(), self.length)
    }
}
