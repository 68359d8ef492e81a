//! The classifier interface: an opaque function from a byte string to a
//! finite set of labels. Implementations (subprocess driving, timeouts,
//! output hashing) are the caller's concern — the shrinker only needs this
//! trait.

use std::collections::HashSet;

/// Classifies a candidate input, returning the set of labels it exhibits.
/// The empty set is a valid, meaningful result: "nothing observable."
///
/// Implementations are expected to be deterministic up to the stability
/// tolerance the shrinker enforces (three consecutive calls agreeing)
/// before a result is allowed to change corpus state.
pub trait Classifier {
    fn classify(&mut self, input: &[u8]) -> HashSet<String>;
}

/// Adapts a plain closure to [`Classifier`], useful for tests and for
/// embedding the engine in-process against a pure function rather than a
/// subprocess.
impl<F> Classifier for F
where
    F: FnMut(&[u8]) -> HashSet<String>,
{
    fn classify(&mut self, input: &[u8]) -> HashSet<String> {
        self(input)
    }
}
