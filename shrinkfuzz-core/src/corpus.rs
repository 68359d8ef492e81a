//! The corpus index: `exemplars` / `best` / `corpus` / `exhausted`, coupled
//! by the invariants in spec §3 and mutated only through [`CorpusIndex::integrate`]
//! and [`CorpusIndex::mark_exhausted`], per the encapsulation suggested in
//! the design notes — keeping the invariants enforced in one place rather
//! than scattered across the shrinker.

use crate::debug::DebugSink;
use crate::observer::ShrinkObserver;
use crate::order::is_smaller;
use std::collections::{HashMap, HashSet};

/// Maps discovered labels to their smallest witness and back, and tracks
/// which witnesses a shrink pass has already failed to reduce.
#[derive(Default)]
pub struct CorpusIndex {
    exemplars: HashMap<String, Vec<u8>>,
    best: HashMap<Vec<u8>, HashSet<String>>,
    corpus: Vec<Vec<u8>>,
    exhausted: HashSet<Vec<u8>>,
}

impl CorpusIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current smallest witness for `label`, if any label has been discovered.
    pub fn exemplar(&self, label: &str) -> Option<&[u8]> {
        self.exemplars.get(label).map(Vec::as_slice)
    }

    /// Labels for which `s` is currently the exemplar. Empty if `s` is not
    /// (or is no longer) in the corpus.
    pub fn best_for(&self, s: &[u8]) -> Option<&HashSet<String>> {
        self.best.get(s)
    }

    /// Witnesses currently in the corpus, in the order they were added.
    pub fn corpus(&self) -> &[Vec<u8>] {
        &self.corpus
    }

    pub fn is_exhausted(&self, s: &[u8]) -> bool {
        self.exhausted.contains(s)
    }

    /// Record that a full shrink pass over `s` made no progress. `s` must
    /// currently be in the corpus.
    pub fn mark_exhausted(&mut self, s: &[u8]) {
        debug_assert!(self.corpus.iter().any(|w| w == s));
        self.exhausted.insert(s.to_vec());
    }

    /// `true` once every witness in the corpus is exhausted (vacuously true
    /// for an empty corpus, matching spec §4.3's loop condition).
    pub fn all_exhausted(&self) -> bool {
        self.exhausted.len() >= self.corpus.len()
    }

    /// The largest (by shrink order) unexhausted witness, ties broken in
    /// favor of the one that appears later in insertion order.
    pub fn select_next(&self) -> Option<&[u8]> {
        let mut chosen: Option<&Vec<u8>> = None;
        for s in &self.corpus {
            if self.exhausted.contains(s) {
                continue;
            }
            chosen = match chosen {
                None => Some(s),
                Some(current) if !is_smaller(s, current) => Some(s),
                Some(current) => Some(current),
            };
        }
        chosen.map(Vec::as_slice)
    }

    /// Integrate a stable classification result for `s` (which must never
    /// have been integrated before — `classify` only calls this once per
    /// input, enforced by the seen-set). For each label:
    /// - if undiscovered, `s` becomes its exemplar;
    /// - if `s` beats the current exemplar, `s` replaces it and the old
    ///   exemplar is evicted from the corpus once it holds no more labels.
    ///
    /// If `s` ends up the exemplar for at least one label, it is appended
    /// to the corpus. Callback order follows spec §5: any `remove` calls
    /// triggered by displaced exemplars fire as they occur, then (if `s`
    /// was promoted) `add` followed by `change`.
    pub fn integrate(
        &mut self,
        s: &[u8],
        labels: &HashSet<String>,
        observer: &mut dyn ShrinkObserver,
        sink: &mut dyn DebugSink,
    ) {
        let mut sorted_labels: Vec<&String> = labels.iter().collect();
        sorted_labels.sort();

        let mut discovered = Vec::new();
        let mut improved = Vec::new();

        for &label in &sorted_labels {
            match self.exemplars.get(label) {
                None => {
                    self.exemplars.insert(label.clone(), s.to_vec());
                    self.best.entry(s.to_vec()).or_default().insert(label.clone());
                    discovered.push(label.clone());
                }
                Some(existing) if is_smaller(s, existing) => {
                    let existing = existing.clone();
                    self.exemplars.insert(label.clone(), s.to_vec());
                    self.best.entry(s.to_vec()).or_default().insert(label.clone());
                    improved.push(label.clone());

                    if let Some(set) = self.best.get_mut(&existing) {
                        set.remove(label);
                        if set.is_empty() {
                            self.best.remove(&existing);
                            self.corpus.retain(|w| w != &existing);
                            self.exhausted.remove(&existing);
                            observer.on_remove(&existing);
                        }
                    }
                }
                _ => {}
            }
        }

        for label in &discovered {
            sink.event(&format!("Discovered new label {label:?}"));
        }
        if !improved.is_empty() {
            sink.event(&format!(
                "Improved labels {} to {} bytes",
                improved.join(", "),
                s.len()
            ));
        }

        if let Some(labels_for_s) = self.best.get(s) {
            if !labels_for_s.is_empty() {
                debug_assert!(
                    !self.corpus.iter().any(|w| w == s),
                    "classify must never integrate the same witness twice"
                );
                self.corpus.push(s.to_vec());
                observer.on_add(s);
                observer.on_change(labels_for_s, s);
            }
        }
    }

    /// Debug-only self-check of the invariants in spec §3. A no-op cost in
    /// release builds.
    pub fn check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        for (label, s) in &self.exemplars {
            debug_assert!(
                self.best.get(s).is_some_and(|set| set.contains(label)),
                "exemplars[{label}] = {s:?} but best[{s:?}] does not contain {label}"
            );
        }
        for (s, labels) in &self.best {
            debug_assert!(!labels.is_empty(), "best[{s:?}] is present but empty");
            for l in labels {
                debug_assert_eq!(self.exemplars.get(l).map(Vec::as_slice), Some(s.as_slice()));
            }
            debug_assert!(self.corpus.iter().any(|w| w == s));
        }
        for s in &self.corpus {
            debug_assert!(self.best.get(s).is_some_and(|set| !set.is_empty()));
        }
        for s in &self.exhausted {
            debug_assert!(self.corpus.iter().any(|w| w == s));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::NullSink;
    use crate::observer::NullObserver;

    fn labels(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn a_fresh_label_gets_its_first_witness_as_exemplar() {
        let mut index = CorpusIndex::new();
        let mut observer = NullObserver;
        let mut sink = NullSink;
        index.integrate(b"hello", &labels(&["greeting"]), &mut observer, &mut sink);
        assert_eq!(index.exemplar("greeting"), Some(b"hello".as_slice()));
        assert_eq!(index.corpus(), &[b"hello".to_vec()]);
        index.check_invariants();
    }

    #[test]
    fn a_smaller_witness_displaces_the_existing_exemplar() {
        let mut index = CorpusIndex::new();
        let mut observer = NullObserver;
        let mut sink = NullSink;
        index.integrate(b"hello world", &labels(&["x"]), &mut observer, &mut sink);
        index.integrate(b"hi", &labels(&["x"]), &mut observer, &mut sink);
        assert_eq!(index.exemplar("x"), Some(b"hi".as_slice()));
        assert_eq!(index.corpus(), &[b"hi".to_vec()]);
        index.check_invariants();
    }

    #[test]
    fn a_larger_witness_never_displaces_a_smaller_exemplar() {
        let mut index = CorpusIndex::new();
        let mut observer = NullObserver;
        let mut sink = NullSink;
        index.integrate(b"hi", &labels(&["x"]), &mut observer, &mut sink);
        index.integrate(b"hello world", &labels(&["x"]), &mut observer, &mut sink);
        assert_eq!(index.exemplar("x"), Some(b"hi".as_slice()));
        index.check_invariants();
    }

    #[test]
    fn label_migration_evicts_an_exemplar_once_it_holds_no_labels() {
        let mut index = CorpusIndex::new();
        let mut observer = NullObserver;
        let mut sink = NullSink;
        index.integrate(b"AABB", &labels(&["p", "q"]), &mut observer, &mut sink);
        // A smaller witness takes over "p" only; "AABB" should survive since it
        // still holds "q".
        index.integrate(b"A", &labels(&["p"]), &mut observer, &mut sink);
        assert!(index.corpus().contains(&b"AABB".to_vec()));
        assert_eq!(index.best_for(b"AABB").unwrap(), &labels(&["q"]));

        // Now something smaller takes "q" too; "AABB" must be evicted.
        index.integrate(b"B", &labels(&["q"]), &mut observer, &mut sink);
        assert!(!index.corpus().contains(&b"AABB".to_vec()));
        index.check_invariants();
    }

    #[test]
    fn select_next_prefers_the_largest_unexhausted_witness() {
        let mut index = CorpusIndex::new();
        let mut observer = NullObserver;
        let mut sink = NullSink;
        index.integrate(b"a", &labels(&["p"]), &mut observer, &mut sink);
        index.integrate(b"bbb", &labels(&["q"]), &mut observer, &mut sink);
        assert_eq!(index.select_next(), Some(b"bbb".as_slice()));
        index.mark_exhausted(b"bbb");
        assert_eq!(index.select_next(), Some(b"a".as_slice()));
        index.mark_exhausted(b"a");
        assert_eq!(index.select_next(), None);
        assert!(index.all_exhausted());
    }
}
