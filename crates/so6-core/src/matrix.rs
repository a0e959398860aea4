//! 6×6 Orthogonal Matrices over Z[1/√2]
//!
//! `So6` stores the physical entry table column-major and never reorders
//! it. The canonical view (row permutation, column permutation, and sign
//! convention) is layered on top by the canonicaliser, and equality,
//! hashing, and ordering are all defined through that view.
//!
//! Per-row and per-column frequency maps (multisets of absolute entry
//! values) are maintained in lock-step with every entry mutation; they are
//! what partitions rows and columns into the equivalence classes the
//! canonicaliser permutes within.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::circuit::CircuitHistory;
use crate::ring::{self, Zroot2};
use crate::sign::{SignMask, NEG};

/// Multiset of absolute entry values in one row or column.
///
/// A sorted array of `(value, count)` pairs: with at most six distinct
/// small entries this beats a tree map, and deriving `Ord` gives the
/// deterministic class-key ordering the canonicaliser wants for free.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrequencyMap {
    entries: Vec<(Zroot2, u8)>,
}

impl FrequencyMap {
    fn increment(&mut self, value: Zroot2) {
        match self.entries.binary_search_by(|(key, _)| key.cmp(&value)) {
            Ok(at) => self.entries[at].1 += 1,
            Err(at) => self.entries.insert(at, (value, 1)),
        }
    }

    fn decrement(&mut self, value: Zroot2) {
        if let Ok(at) = self.entries.binary_search_by(|(key, _)| key.cmp(&value)) {
            if self.entries[at].1 == 1 {
                self.entries.remove(at);
            } else {
                self.entries[at].1 -= 1;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn count(&self, value: Zroot2) -> u8 {
        self.entries
            .binary_search_by(|(key, _)| key.cmp(&value))
            .map(|at| self.entries[at].1)
            .unwrap_or(0)
    }
}

/// An orthogonal 6×6 matrix over Z[1/√2], with its build history and
/// canonical view.
#[derive(Clone, Debug)]
pub struct So6 {
    /// Physical entries, column-major: `cols[c][r]` is the entry at row
    /// `r`, column `c`. Never reordered.
    pub(crate) cols: [[Zroot2; 6]; 6],
    /// Generator indices this matrix was built from.
    pub(crate) history: CircuitHistory,
    /// Canonical row order: canonical position `p` shows physical row
    /// `row[p]`.
    pub(crate) row: [u8; 6],
    /// Canonical column order.
    pub(crate) col: [u8; 6],
    /// Row-sign convention of the canonical view, indexed by canonical
    /// position.
    pub(crate) sign: SignMask,
    /// Multiset of absolute values per physical row.
    pub(crate) row_freq: [FrequencyMap; 6],
    /// Multiset of absolute values per physical column.
    pub(crate) col_freq: [FrequencyMap; 6],
}

const IDENTITY_PERM: [u8; 6] = [0, 1, 2, 3, 4, 5];

impl So6 {
    /// All-zero matrix with a trivial view. Only useful as a multiplication
    /// accumulator; not orthogonal.
    pub(crate) fn zero() -> Self {
        let mut matrix = So6 {
            cols: [[ring::ZERO; 6]; 6],
            history: CircuitHistory::new(),
            row: IDENTITY_PERM,
            col: IDENTITY_PERM,
            sign: SignMask::all_positive(),
            row_freq: Default::default(),
            col_freq: Default::default(),
        };
        matrix.recompute_frequency_maps();
        matrix
    }

    /// The identity matrix with an empty history.
    pub fn identity() -> Self {
        let mut matrix = So6::zero();
        for k in 0..6 {
            matrix.set_entry(k, k, ring::ONE);
        }
        matrix
    }

    /// Build a matrix from a row-major entry table, with an empty history
    /// and a trivial view. The caller vouches for orthogonality.
    pub fn from_entries(entries: [[Zroot2; 6]; 6]) -> Self {
        let mut matrix = So6::zero();
        for (r, row) in entries.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                matrix.cols[c][r] = value;
            }
        }
        matrix.recompute_frequency_maps();
        matrix
    }

    /// Entry at `(row, col)` in the physical (unpermuted) table.
    #[inline]
    pub fn entry(&self, row: usize, col: usize) -> &Zroot2 {
        &self.cols[col][row]
    }

    /// Overwrite an entry, keeping the row and column frequency maps
    /// consistent.
    pub(crate) fn set_entry(&mut self, row: usize, col: usize, value: Zroot2) {
        let old = self.cols[col][row];
        self.row_freq[row].decrement(old.abs());
        self.col_freq[col].decrement(old.abs());
        self.row_freq[row].increment(value.abs());
        self.col_freq[col].increment(value.abs());
        self.cols[col][row] = value;
    }

    /// Rebuild both frequency map arrays from the entry table. For bulk
    /// construction paths (multiplication, transpose) where per-entry
    /// bookkeeping would be wasted work.
    pub(crate) fn recompute_frequency_maps(&mut self) {
        self.row_freq = Default::default();
        self.col_freq = Default::default();
        for c in 0..6 {
            for r in 0..6 {
                let value = self.cols[c][r].abs();
                self.row_freq[r].increment(value);
                self.col_freq[c].increment(value);
            }
        }
    }

    /// The generator history this matrix was built from.
    pub fn history(&self) -> &CircuitHistory {
        &self.history
    }

    /// Multiset of absolute values in physical row `row`.
    pub fn row_frequency(&self, row: usize) -> &FrequencyMap {
        &self.row_freq[row]
    }

    /// Multiset of absolute values in physical column `col`.
    pub fn col_frequency(&self, col: usize) -> &FrequencyMap {
        &self.col_freq[col]
    }

    /// Canonical row order, valid after `canonical_form`.
    pub fn canonical_rows(&self) -> [u8; 6] {
        self.row
    }

    /// Canonical column order, valid after `canonical_form`.
    pub fn canonical_cols(&self) -> [u8; 6] {
        self.col
    }

    /// Row-sign convention of the canonical view.
    pub fn sign_convention(&self) -> SignMask {
        self.sign
    }

    /// Largest denominator exponent over all entries (the LDE).
    pub fn max_exponent(&self) -> i32 {
        self.cols
            .iter()
            .flatten()
            .map(|entry| entry.exponent)
            .max()
            .expect("a 6x6 matrix always has entries")
    }

    /// Transposed copy. The history is not carried over; transposes exist
    /// for orthogonality checks, not as circuit products.
    pub fn transpose(&self) -> So6 {
        let mut out = So6::zero();
        for c in 0..6 {
            for r in 0..6 {
                out.cols[r][c] = self.cols[c][r];
            }
        }
        out.recompute_frequency_maps();
        out
    }

    /// True when `self · selfᵀ` is the identity over the ring.
    pub fn is_orthogonal(&self) -> bool {
        let product = self * &self.transpose();
        for c in 0..6 {
            for r in 0..6 {
                let expected = if r == c { ring::ONE } else { ring::ZERO };
                if product.cols[c][r] != expected {
                    return false;
                }
            }
        }
        true
    }

    /// Entry of the canonical view at (row position, column position),
    /// signs applied.
    pub fn canonical_entry(&self, row_position: usize, col_position: usize) -> Zroot2 {
        self.canonical_column(col_position)[row_position]
    }

    /// Column at canonical position `position`, rows in canonical order,
    /// with the sign convention applied and the column flipped as a whole
    /// so its leading non-zero entry is positive.
    ///
    /// Two matrices are equal exactly when these columns agree at
    /// positions 0..5; the rightmost column is determined by
    /// orthogonality.
    pub(crate) fn canonical_column(&self, position: usize) -> [Zroot2; 6] {
        let c = self.col[position] as usize;
        let mut out = [ring::ZERO; 6];
        for (p, &r) in self.row.iter().enumerate() {
            let mut value = self.cols[c][r as usize];
            if self.sign.at(p) == NEG {
                value = -value;
            }
            out[p] = value;
        }
        if let Some(first) = out.iter().find(|value| !value.is_zero()) {
            if first.int_part < 0 {
                for value in &mut out {
                    *value = -*value;
                }
            }
        }
        out
    }
}

impl PartialEq for So6 {
    fn eq(&self, other: &So6) -> bool {
        (0..5).all(|position| self.canonical_column(position) == other.canonical_column(position))
    }
}

impl Eq for So6 {}

impl Hash for So6 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for position in 0..5 {
            self.canonical_column(position).hash(state);
        }
    }
}

impl std::ops::Mul<&So6> for &So6 {
    type Output = So6;

    /// Ordinary O(n³) ring multiplication; inner loops skip ring-zero
    /// factors. The product's history is the right operand's followed by
    /// the left's, and its canonical view is left at the default until
    /// `canonical_form` runs.
    fn mul(self, other: &So6) -> So6 {
        let mut product = So6::zero();
        product.history = other.history.clone();
        product.history.extend_from(&self.history);

        for row in 0..6 {
            for k in 0..6 {
                let left = self.cols[k][row];
                if left.is_zero() {
                    continue;
                }
                for c in 0..6 {
                    let right = other.cols[c][k];
                    if right.is_zero() {
                        continue;
                    }
                    product.cols[c][row] += left * right;
                }
            }
        }
        product.recompute_frequency_maps();
        product
    }
}

impl fmt::Display for So6 {
    /// Renders the physical table row by row, entries in `a,b e k` form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<Vec<String>> = (0..6)
            .map(|r| (0..6).map(|c| self.entry(r, c).to_string()).collect())
            .collect();
        let width = rendered
            .iter()
            .flatten()
            .map(String::len)
            .max()
            .unwrap_or(0);
        for row in &rendered {
            for cell in row {
                write!(f, " {cell:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
