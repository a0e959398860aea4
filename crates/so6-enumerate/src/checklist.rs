//! Pattern Checklist
//!
//! The search target: a set of patterns still waiting for a witness
//! matrix. A pattern is "hit" when any generated matrix projects onto it;
//! the hit then erases the pattern's entire orbit (every row permutation
//! combined with every row-mod combination), the pattern-level analogue of
//! matrix canonicalisation.

use std::collections::HashSet;

use parking_lot::RwLock;
use so6_core::Pattern;

/// Concurrent checklist of unexplained patterns.
pub struct PatternChecklist {
    patterns: RwLock<HashSet<Pattern>>,
}

impl PatternChecklist {
    /// An empty checklist: every hit test fails fast.
    pub fn empty() -> Self {
        PatternChecklist {
            patterns: RwLock::new(HashSet::new()),
        }
    }

    /// Build a checklist from parsed patterns.
    ///
    /// Case-0 (identity-like) patterns are not worth searching for and are
    /// skipped, and the identity pattern plus its row-mod are removed
    /// outright: the identity's orbit is hit by construction at T-count 0.
    pub fn from_patterns(patterns: impl IntoIterator<Item = Pattern>) -> Self {
        let mut set: HashSet<Pattern> =
            patterns.into_iter().filter(|p| p.case_num() != 0).collect();
        set.remove(&Pattern::identity());
        set.remove(&Pattern::identity().modded());
        PatternChecklist {
            patterns: RwLock::new(set),
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.read().is_empty()
    }

    pub fn contains(&self, pattern: &Pattern) -> bool {
        self.patterns.read().contains(pattern)
    }

    /// Record a witness for `pattern`.
    ///
    /// Misses (the overwhelmingly common case) cost one read lock.
    /// Returns true exactly once per orbit: the winning caller re-checks
    /// under the write lock and removes all permutation-and-mod
    /// equivalents there, so a racing caller sees the orbit already gone.
    pub fn hit(&self, pattern: &Pattern) -> bool {
        if !self.patterns.read().contains(pattern) {
            return false;
        }
        let mut guard = self.patterns.write();
        if !guard.contains(pattern) {
            return false;
        }
        for equivalent in pattern_orbit(pattern) {
            guard.remove(&equivalent);
        }
        true
    }
}

/// The full orbit of a pattern: all 6! row permutations, each combined
/// with all 2^6 row-mod selections.
pub fn pattern_orbit(pattern: &Pattern) -> HashSet<Pattern> {
    let mut orbit = HashSet::new();
    let mut rows: [usize; 6] = [0, 1, 2, 3, 4, 5];
    loop {
        let permuted = pattern.with_rows_permuted(&rows);
        for selection in 0u32..64 {
            let mut modded = permuted.clone();
            for row in 0..6 {
                if selection >> row & 1 == 1 {
                    modded = modded.with_row_modded(row);
                }
            }
            orbit.insert(modded);
        }
        if !next_permutation(&mut rows) {
            break;
        }
    }
    orbit
}

fn next_permutation(seq: &mut [usize; 6]) -> bool {
    let mut i = seq.len() - 1;
    while i > 0 && seq[i - 1] >= seq[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = seq.len() - 1;
    while seq[j] <= seq[i - 1] {
        j -= 1;
    }
    seq.swap(i - 1, j);
    seq[i..].reverse();
    true
}
