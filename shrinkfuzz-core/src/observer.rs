//! The shrinker's single observer capability, replacing four independently
//! nullable callback fields with one object the caller supplies.

use std::collections::HashSet;

/// Notified synchronously as the corpus changes. Implementations must not
/// call back into the shrinker: all of `classify`'s corpus mutations are
/// already in flight when these fire.
pub trait ShrinkObserver {
    /// `s` has just entered the corpus.
    fn on_add(&mut self, _s: &[u8]) {}

    /// `s` has just been evicted from the corpus (its last label migrated
    /// to a smaller witness).
    fn on_remove(&mut self, _s: &[u8]) {}

    /// `s` is the exemplar for exactly `labels` (the full set, not a delta).
    fn on_change(&mut self, _labels: &HashSet<String>, _s: &[u8]) {}

    /// `s` was dropped: its classification was not reproducible.
    fn on_unstable(&mut self, _s: &[u8]) {}
}

/// An observer that does nothing. The default when the caller supplies none.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ShrinkObserver for NullObserver {}

impl ShrinkObserver for () {}
