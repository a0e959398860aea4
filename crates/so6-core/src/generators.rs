//! The Fifteen Transvection Generators
//!
//! Each generator differs from the identity only in a 2×2 block on one
//! pair of rows, and left-multiplying by it sends the row pair (v₁, v₂) to
//! ((v₁+v₂)/√2, (v₂−v₁)/√2). The fifteen row pairs enumerate the
//! unordered 2-subsets of {0..5} in lexicographic order, so generator 0
//! acts on rows {0,1} and generator 14 on rows {4,5}.

use crate::circuit::CircuitHistory;
use crate::error::{Error, Result};
use crate::matrix::So6;

/// Number of transvection generators.
pub const GENERATOR_COUNT: usize = 15;

/// Row pair acted on by each generator index.
pub const GENERATOR_ROW_PAIRS: [(usize, usize); GENERATOR_COUNT] = [
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 4),
    (0, 5),
    (1, 2),
    (1, 3),
    (1, 4),
    (1, 5),
    (2, 3),
    (2, 4),
    (2, 5),
    (3, 4),
    (3, 5),
    (4, 5),
];

impl So6 {
    /// Left-multiply by generator `index`, canonicalising the result.
    ///
    /// Errors with [`Error::InvalidGeneratorIndex`] outside `0..=14`.
    pub fn left_multiply_by_t(&self, index: usize) -> Result<So6> {
        let mut product = self.clone();
        product.apply_generator(index)?;
        product.canonical_form();
        Ok(product)
    }

    /// The raw transvection plus history bookkeeping, without
    /// canonicalising. Replay applies a whole sequence this way and
    /// canonicalises once at the end.
    fn apply_generator(&mut self, index: usize) -> Result<()> {
        let &(r1, r2) = GENERATOR_ROW_PAIRS
            .get(index)
            .ok_or(Error::InvalidGeneratorIndex(index))?;
        for c in 0..6 {
            let old1 = *self.entry(r1, c);
            let old2 = *self.entry(r2, c);
            // (v1, v2) -> ((v1+v2)/√2, (v2−v1)/√2); the division by √2 is
            // a denominator-exponent bump on each modified entry.
            let mut new1 = old1 + old2;
            let mut new2 = old2 - old1;
            new1.raise_exponent();
            new2.raise_exponent();
            self.set_entry(r1, c, new1);
            self.set_entry(r2, c, new2);
        }
        self.history.push(index as u8);
        Ok(())
    }

    /// Rebuild a matrix from a generator index sequence, starting at the
    /// identity and canonicalising once at the end.
    pub fn from_indices(indices: &[u8]) -> Result<So6> {
        let mut matrix = So6::identity();
        for &index in indices {
            matrix.apply_generator(index as usize)?;
        }
        matrix.canonical_form();
        Ok(matrix)
    }

    /// Rebuild a matrix from a packed history.
    pub fn from_history(history: &CircuitHistory) -> Result<So6> {
        let indices: Vec<u8> = history.indices().collect();
        So6::from_indices(&indices)
    }

    /// Rebuild a matrix from an output-file line of decimal indices.
    pub fn from_circuit_line(line: &str) -> Result<So6> {
        So6::from_indices(&CircuitHistory::parse_line(line)?)
    }
}

/// The generator at `index` as a matrix (T-count 1, history of length 1).
pub fn generator(index: usize) -> Result<So6> {
    So6::identity().left_multiply_by_t(index)
}
