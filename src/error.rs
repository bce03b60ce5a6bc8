use thiserror::Error;

/// Errors raised when converting between indices and strings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("symbol {symbol:?} at position {position} is not in the alphabet")]
    InvalidSymbol { symbol: char, position: usize },

    #[error("expected a string of length {expected}, got {found}")]
    InvalidLength { expected: usize, found: usize },

    #[error("index {index} is outside of the string space [0, {space})")]
    IndexOutOfRange { index: u64, space: u64 },
}

/// Errors in the search configuration, all detected before any worker starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("an alphabet needs at least 2 symbols, got {0}")]
    AlphabetTooSmall(usize),

    #[error("symbol {0:?} appears more than once in the alphabet")]
    DuplicateSymbol(char),

    #[error("string length must be at least 1")]
    ZeroLength,

    #[error("{alphabet_size}^{length} strings do not fit in a 64-bit index")]
    PartitionOverflow { alphabet_size: usize, length: usize },

    #[error("worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),

    #[error("there are only 16 hex digits on each side of an MD5 hash, got a width of {0}")]
    InvalidDigestWidth(u8),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("failed to build the worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// A worker whose scan panicked. Recorded in the search report, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("worker {worker_id} faulted: {message}")]
pub struct WorkerFault {
    pub worker_id: usize,
    pub message: String,
}
