//! The delta-debugger: alphabet-partition shrinking over byte strings with
//! exponential-probe binary search for maximal deletable runs.
//!
//! This module is a pure algorithmic layer. It knows nothing about labels,
//! corpora, or classifiers — only about byte strings and a caller-supplied
//! predicate.

use crate::debug::DebugSink;
use std::collections::HashMap;

/// A half-open interval `[start, end)` into some byte string, used as the
/// atom that [`shrink_sequence`] deletes runs of.
pub type Interval = (usize, usize);

/// Largest `k <= max_n` such that `f(k)` holds and `f` was observed true
/// for every probed value on the way there.
///
/// Returns 0 if `f(1)` is false. Otherwise probes exponentially
/// (`1, 2, 4, 8, ...`) until `f` fails or the probe exceeds `max_n`, then
/// binary-searches the gap. Assumes `f` is a true-prefix-then-false
/// predicate on `1..=max_n`; `O(log max_n)` calls to `f`.
pub fn find_large_n(max_n: usize, mut f: impl FnMut(usize) -> bool) -> usize {
    debug_assert!(max_n >= 1, "find_large_n requires max_n >= 1");

    if !f(1) {
        return 0;
    }

    let mut lo = 1usize;
    let mut hi = 2usize;
    while hi <= max_n && f(hi) {
        lo = hi;
        hi *= 2;
    }

    if hi > max_n {
        if f(max_n) {
            return max_n;
        }
        hi = max_n;
    }

    while lo + 1 < hi {
        let mid = lo + (hi - lo) / 2;
        if f(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Single left-to-right pass of greedy deletion over a sequence of atoms.
///
/// At each position `i`, finds the largest run `[i, i+k)` that can be
/// deleted while `predicate` still holds on the reconstructed sequence,
/// deletes it, and keeps `i` fixed; otherwise advances `i`. `predicate` is
/// only ever invoked on strictly shorter sequences than its current input.
pub fn shrink_sequence<T: Clone>(
    mut target: Vec<T>,
    mut predicate: impl FnMut(&[T]) -> bool,
) -> Vec<T> {
    let mut i = 0;
    while i < target.len() {
        let max_n = target.len() - i;
        let k = find_large_n(max_n, |k| {
            let mut candidate = Vec::with_capacity(target.len() - k);
            candidate.extend_from_slice(&target[..i]);
            candidate.extend_from_slice(&target[i + k..]);
            debug_assert!(candidate.len() < target.len());
            predicate(&candidate)
        });
        if k > 0 {
            target.drain(i..i + k);
        } else {
            i += 1;
        }
    }
    target
}

/// Partitions `s` into maximal contiguous runs separated by occurrences of
/// `c`: a new interval begins at every position where `s[i] == c`
/// (including position 0 if `s[0] == c`). Empty input yields an empty
/// partition.
pub fn partition_on(s: &[u8], c: u8) -> Vec<Interval> {
    if s.is_empty() {
        return Vec::new();
    }
    let mut partition = vec![(0usize, 1usize)];
    for (i, &byte) in s.iter().enumerate().skip(1) {
        if byte != c {
            partition.last_mut().unwrap().1 = i + 1;
        } else {
            partition.push((i, i + 1));
        }
    }
    debug_assert_eq!(partition.first().unwrap().0, 0);
    debug_assert_eq!(partition.last().unwrap().1, s.len());
    debug_assert!(partition.windows(2).all(|w| w[0].1 == w[1].0));
    partition
}

/// Reconstructs the byte string covered by `partition`, concatenating the
/// byte ranges of `s` for each surviving interval, in order.
pub fn partition_to_string(s: &[u8], partition: &[Interval]) -> Vec<u8> {
    let mut result = Vec::with_capacity(partition.iter().map(|&(u, v)| v - u).sum());
    for &(u, v) in partition {
        result.extend_from_slice(&s[u..v]);
    }
    result
}

/// Alphabet-partition shrinking: the main `shrink` entry point.
///
/// Repeatedly picks the least-frequent byte not yet used as a delimiter,
/// partitions the current target on it, and runs [`shrink_sequence`] over
/// the partition's intervals (deleting whole delimited regions at once).
/// Once every byte value present has been used as a delimiter, runs one
/// final bytewise [`shrink_sequence`] over the residual target.
pub fn shrink(
    mut target: Vec<u8>,
    mut predicate: impl FnMut(&[u8]) -> bool,
    sink: &mut dyn DebugSink,
) -> Vec<u8> {
    let mut used_alphabet: [bool; 256] = [false; 256];

    loop {
        let mut counts: HashMap<u8, usize> = HashMap::new();
        for &b in &target {
            *counts.entry(b).or_insert(0) += 1;
        }

        let candidate = counts
            .iter()
            .filter(|(b, _)| !used_alphabet[**b as usize])
            .min_by_key(|(b, count)| (**count, **b))
            .map(|(b, _)| *b);

        let Some(c) = candidate else {
            break;
        };

        let partition = partition_on(&target, c);
        sink.event(&format!(
            "Partitioning by {:?} into {} parts",
            c as char,
            partition.len()
        ));
        used_alphabet[c as usize] = true;

        let shrunk_partition = shrink_sequence(partition, |parts| {
            predicate(&partition_to_string(&target, parts))
        });
        target = partition_to_string(&target, &shrunk_partition);
    }

    sink.event("Partitioning bytewise");
    shrink_sequence(target, predicate)
}
