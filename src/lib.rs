//! Parallel search for strings that share a hash
//!
//! Candidate strings are every string of a fixed length over a fixed alphabet. Each one is
//! addressed by its index in `[0, A^L)` through [`codec::StringCodec`]. The first index of each
//! pair is cut into contiguous ranges, one per worker, while the second runs over the whole
//! space, so together the workers compare every pair once. A worker picks up its task again from
//! where it last stopped. [`coordinator::run`] drives the workers until enough pairs or triples
//! of colliding strings are found, or until every task is exhausted.
//!
//! ```
//! use samehash::config::{Goal, SearchConfig};
//! use samehash::coordinator;
//! use samehash::digest::FnHasher;
//!
//! let config = SearchConfig::default()
//!     .with_alphabet("abcd".parse().unwrap())
//!     .with_length(2)
//!     .with_workers(2)
//!     .with_goal(Goal::Pairs(1));
//!
//! // Only four possible digests over sixteen strings
//! let hasher = FnHasher::new(|input: &str| input.bytes().map(u32::from).sum::<u32>() % 4);
//! let report = coordinator::run(&config, hasher).unwrap();
//! assert!(report.goal_met);
//! ```

pub mod cancel;
pub mod codec;
pub mod collision;
pub mod config;
pub mod coordinator;
pub mod digest;
pub mod error;
pub mod nth_root;
pub mod partition;
pub mod sequential;
pub mod worker;

pub use crate::codec::{Alphabet, StringCodec};
pub use crate::collision::{CollisionGroup, CollisionSet};
pub use crate::config::{Goal, SearchConfig};
pub use crate::coordinator::{run, SearchReport};
pub use crate::digest::StringHasher;
pub use crate::error::{CodecError, ConfigError, SearchError, WorkerFault};
