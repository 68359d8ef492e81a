//! # shrinkfuzz-core
//!
//! The shrinker engine behind a coverage-free, behavior-partitioning
//! fuzzer. Given an opaque classifier (an external program or any
//! `Fn(&[u8]) -> HashSet<String>`), this crate maintains a corpus of
//! byte-string witnesses, each the smallest known input that exhibits some
//! labeled behavior, and continually shrinks them while discovering new
//! labels.
//!
//! The core makes no assumptions about what produces labels or what
//! happens when the corpus changes: both are supplied through the
//! [`Classifier`] and [`ShrinkObserver`] traits. Everything here is
//! single-threaded and synchronous — see the crate's design notes for why.
//!
//! ## Quick start
//!
//! ```rust
//! use shrinkfuzz_core::Shrinker;
//! use std::collections::HashSet;
//!
//! let classify = |s: &[u8]| {
//!     let mut labels = HashSet::new();
//!     if s.contains(&b'A') {
//!         labels.insert("has-a".to_string());
//!     }
//!     labels
//! };
//!
//! let mut shrinker = Shrinker::new([b"xxxAxxx".to_vec()], classify);
//! shrinker.run();
//! assert_eq!(shrinker.corpus().exemplar("has-a"), Some(b"A".as_slice()));
//! ```

pub mod classifier;
pub mod corpus;
pub mod debug;
pub mod observer;
pub mod order;
pub mod partition;
pub mod seen;
pub mod shrinker;

pub use classifier::Classifier;
pub use corpus::CorpusIndex;
pub use debug::{DebugSink, NullSink, StderrSink};
pub use observer::{NullObserver, ShrinkObserver};
pub use partition::{find_large_n, partition_on, partition_to_string, shrink, shrink_sequence, Interval};
pub use seen::{fingerprint, SeenSet};
pub use shrinker::Shrinker;
