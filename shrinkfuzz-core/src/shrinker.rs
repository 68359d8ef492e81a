//! The shrinker object: wires the corpus index, the stability-guarded
//! classifier wrapper, and the delta-debugger into the scheduling loop
//! described in spec §4.3.

use crate::classifier::Classifier;
use crate::corpus::CorpusIndex;
use crate::debug::{DebugSink, NullSink};
use crate::observer::{NullObserver, ShrinkObserver};
use crate::order::is_smaller;
use crate::partition;
use crate::seen::SeenSet;
use std::collections::HashSet;

/// Collects debug events into an owned buffer rather than borrowing the
/// shrinker's sink directly, so the delta-debugger's `sink` parameter and
/// the predicate closure's borrow of `self` never alias. Flushed into the
/// real sink once the borrow of `self` has ended.
struct EventBuffer(Vec<String>);

impl DebugSink for EventBuffer {
    fn event(&mut self, message: &str) {
        self.0.push(message.to_string());
    }
}

/// Ties together the corpus index, the classifier, the observer, and a
/// debug sink. This is the only stateful object in the core.
pub struct Shrinker<C, O = NullObserver, D = NullSink>
where
    C: Classifier,
    O: ShrinkObserver,
    D: DebugSink,
{
    classifier: C,
    observer: O,
    sink: D,
    seen: SeenSet,
    corpus: CorpusIndex,
}

impl<C> Shrinker<C, NullObserver, NullSink>
where
    C: Classifier,
{
    /// Construct a shrinker with no observer and no debug output, seeding
    /// the corpus by classifying each of `initial_examples` (deduplicated,
    /// classified smallest-first for reproducibility).
    ///
    /// Per spec §6, the caller is still responsible for submitting the
    /// empty string to [`Shrinker::classify`] after construction if it was
    /// not already among the initial examples.
    pub fn new(initial_examples: impl IntoIterator<Item = Vec<u8>>, classifier: C) -> Self {
        Self::with_observer_and_sink(initial_examples, classifier, NullObserver, NullSink)
    }
}

impl<C, O, D> Shrinker<C, O, D>
where
    C: Classifier,
    O: ShrinkObserver,
    D: DebugSink,
{
    pub fn with_observer_and_sink(
        initial_examples: impl IntoIterator<Item = Vec<u8>>,
        classifier: C,
        observer: O,
        sink: D,
    ) -> Self {
        let mut shrinker = Self {
            classifier,
            observer,
            sink,
            seen: SeenSet::new(),
            corpus: CorpusIndex::new(),
        };

        let mut examples: Vec<Vec<u8>> = initial_examples.into_iter().collect::<HashSet<_>>().into_iter().collect();
        examples.sort_by(|a, b| crate::order::sort_key(a).cmp(&crate::order::sort_key(b)));
        for s in examples {
            if !shrinker.seen(&s) {
                shrinker.classify(&s);
            }
        }
        shrinker
    }

    pub fn seen(&self, s: &[u8]) -> bool {
        self.seen.contains(s)
    }

    pub fn corpus(&self) -> &CorpusIndex {
        &self.corpus
    }

    pub fn sink_mut(&mut self) -> &mut D {
        &mut self.sink
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// The stability-guarded classify wrapper (spec §4.2). Must not be
    /// called on an already-seen input.
    pub fn classify(&mut self, s: &[u8]) -> HashSet<String> {
        debug_assert!(
            !self.seen(s),
            "classify called on an already-seen input: {s:?}"
        );
        self.seen.insert(s);

        let result = self.classifier.classify(s);

        let would_improve = result.iter().any(|label| match self.corpus.exemplar(label) {
            None => true,
            Some(existing) => is_smaller(s, existing),
        });

        if would_improve {
            for _ in 0..2 {
                let rerun = self.classifier.classify(s);
                if rerun != result {
                    self.observer.on_unstable(s);
                    return HashSet::new();
                }
            }
        }

        self.corpus
            .integrate(s, &result, &mut self.observer, &mut self.sink);
        self.corpus.check_invariants();
        result
    }

    /// Run until every corpus witness is exhausted (spec §4.3).
    pub fn run(&mut self) {
        while !self.corpus.all_exhausted() {
            let target = self
                .corpus
                .select_next()
                .expect("all_exhausted is false, so an unexhausted witness exists")
                .to_vec();

            let objectives: HashSet<String> = self
                .corpus
                .best_for(&target)
                .cloned()
                .expect("a corpus member always has a non-empty best set");
            debug_assert!(!objectives.is_empty());

            let desc = describe_objectives(&objectives);
            self.sink
                .event(&format!("Shrinking {} bytes for {desc}", target.len()));

            let original_len = target.len();
            let mut events = EventBuffer(Vec::new());
            let shrunk = partition::shrink(
                target.clone(),
                |t| {
                    debug_assert!(t.len() < target.len());
                    if self.seen(t) {
                        return false;
                    }
                    let markers = self.classify(t);
                    objectives.iter().any(|o| markers.contains(o))
                },
                &mut events,
            );
            for message in events.0 {
                self.sink.event(&message);
            }

            if shrunk == target {
                self.corpus.mark_exhausted(&shrunk);
            } else {
                self.sink.event(&format!(
                    "Shrink pass deleted {} bytes out of {}",
                    original_len - shrunk.len(),
                    original_len
                ));
            }
        }
    }
}

fn describe_objectives(objectives: &HashSet<String>) -> String {
    let mut sorted: Vec<&String> = objectives.iter().collect();
    sorted.sort();
    if sorted.len() > 1 {
        format!(
            "any of {}",
            sorted
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    } else {
        sorted[0].clone()
    }
}
