//! Exact Arithmetic over the Ring Z[1/√2]
//!
//! Every entry of an SO(6) Clifford+T product lives in the ring of dyadic
//! numbers extended by √2. An element is stored as a triple
//!
//! ```text
//! (int_part + sqrt2_part · √2) / √2^exponent
//! ```
//!
//! with small signed integer components. Eight bits would hold every value
//! this enumeration produces; `i32` components keep intermediate products
//! comfortably clear of wrapping.
//!
//! ## Reduced form
//!
//! Zero is represented as `(0, 0, 0)` exclusively. A reduced non-zero
//! element always carries an odd `int_part`: while both components are even
//! the pair is halved (exponent drops by 2), and an even `int_part` next to
//! an odd `sqrt2_part` is resolved by the identity
//! `(a + b√2)/√2^k = (b + (a/2)√2)/√2^(k-1)`. Reduced representations are
//! therefore unique, which is what makes `int_part == 0` a valid (and very
//! cheap) zero test on matrix entries.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::error::{Error, Result};

/// An element of Z[1/√2]: `(int_part + sqrt2_part·√2) / √2^exponent`.
///
/// Ordering is lexicographic on `(int_part, sqrt2_part, exponent)`, which is
/// all the canonicaliser needs from a total order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Zroot2 {
    pub int_part: i32,
    pub sqrt2_part: i32,
    pub exponent: i32,
}

/// The additive identity, `(0, 0, 0)`.
pub const ZERO: Zroot2 = Zroot2 {
    int_part: 0,
    sqrt2_part: 0,
    exponent: 0,
};

/// The multiplicative identity, `(1, 0, 0)`.
pub const ONE: Zroot2 = Zroot2 {
    int_part: 1,
    sqrt2_part: 0,
    exponent: 0,
};

/// `1/√2`, the entry every transvection generator introduces.
pub const INV_SQRT2: Zroot2 = Zroot2 {
    int_part: 1,
    sqrt2_part: 0,
    exponent: 1,
};

impl Zroot2 {
    /// Build an element from raw components without reducing.
    pub const fn new(int_part: i32, sqrt2_part: i32, exponent: i32) -> Self {
        Zroot2 {
            int_part,
            sqrt2_part,
            exponent,
        }
    }

    /// Ring-zero test.
    ///
    /// Valid on reduced elements, where a zero `int_part` implies the whole
    /// element is zero. Matrix code leans on this in every inner loop.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.int_part == 0
    }

    /// True when the element is negative under the natural ordering of the
    /// real number it denotes.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.int_part < 0 || (self.int_part == 0 && self.sqrt2_part < 0)
    }

    /// Magnitude: negates the element when its `int_part` is negative.
    pub fn abs(&self) -> Self {
        if self.int_part < 0 {
            -*self
        } else {
            *self
        }
    }

    /// Record a division by √2 by bumping the denominator exponent.
    ///
    /// No-op on zero so that `(0, 0, 0)` stays the unique zero.
    #[inline]
    pub fn raise_exponent(&mut self) {
        if self.int_part != 0 {
            self.exponent += 1;
        }
    }

    /// Normalise to reduced form (see the module docs).
    pub fn reduce(&mut self) {
        if self.int_part == 0 && self.sqrt2_part == 0 {
            self.exponent = 0;
            return;
        }
        while self.int_part & 1 == 0 && self.sqrt2_part & 1 == 0 {
            self.int_part >>= 1;
            self.sqrt2_part >>= 1;
            self.exponent -= 2;
        }
        if self.int_part & 1 == 0 {
            std::mem::swap(&mut self.int_part, &mut self.sqrt2_part);
            self.sqrt2_part >>= 1;
            self.exponent -= 1;
        }
    }

    /// Reduced copy, for call sites that want a value pipeline.
    pub fn reduced(mut self) -> Self {
        self.reduce();
        self
    }

    /// Exact division.
    ///
    /// Inverts the multiplication formula by solving the 2×2 linear system
    /// it induces on the components. Errors with [`Error::RingDomain`] when
    /// the divisor is not an exact factor of the dividend in the ring;
    /// call sites guarantee divisibility, so hitting the error is a
    /// programming mistake upstream.
    pub fn try_div(self, divisor: Zroot2) -> Result<Zroot2> {
        if self.int_part == 0 && self.sqrt2_part == 0 {
            return Ok(ZERO);
        }
        let det = divisor.int_part * divisor.int_part - 2 * divisor.sqrt2_part * divisor.sqrt2_part;
        if det == 0 {
            return Err(self.division_error(divisor));
        }
        let int_num = self.int_part * divisor.int_part - 2 * self.sqrt2_part * divisor.sqrt2_part;
        let sqrt2_num = self.sqrt2_part * divisor.int_part - self.int_part * divisor.sqrt2_part;
        if int_num % det != 0 || sqrt2_num % det != 0 {
            return Err(self.division_error(divisor));
        }
        Ok(Zroot2::new(
            int_num / det,
            sqrt2_num / det,
            self.exponent - divisor.exponent,
        ))
    }

    fn division_error(self, divisor: Zroot2) -> Error {
        Error::RingDomain {
            dividend: self.to_string(),
            divisor: divisor.to_string(),
        }
    }
}

impl AddAssign for Zroot2 {
    /// Addition aligns exponents by scaling the smaller-exponent operand:
    /// for an even difference Δ both components shift left by Δ/2, for an
    /// odd Δ the components additionally swap with the new `int_part`
    /// doubled (multiplying a numerator by √2). The sum is reduced only
    /// when the exponents already agreed.
    fn add_assign(&mut self, other: Zroot2) {
        if other.int_part == 0 {
            return;
        }
        if self.int_part == 0 {
            *self = other;
            return;
        }

        if other.exponent < self.exponent {
            // Scale `other` up to our exponent while accumulating.
            let diff = (self.exponent - other.exponent) as u32;
            if diff & 1 == 1 {
                self.int_part += other.sqrt2_part << ((diff + 1) >> 1);
                self.sqrt2_part += other.int_part << (diff >> 1);
            } else {
                self.int_part += other.int_part << (diff >> 1);
                self.sqrt2_part += other.sqrt2_part << (diff >> 1);
            }
        } else {
            // Scale ourselves up to `other`'s exponent.
            let diff = (other.exponent - self.exponent) as u32;
            if diff & 1 == 1 {
                std::mem::swap(&mut self.int_part, &mut self.sqrt2_part);
                self.int_part <<= 1;
            }
            self.int_part = (self.int_part << (diff >> 1)) + other.int_part;
            self.sqrt2_part = (self.sqrt2_part << (diff >> 1)) + other.sqrt2_part;
            self.exponent = other.exponent;
            if diff == 0 {
                self.reduce();
            }
        }
    }
}

impl Add for Zroot2 {
    type Output = Zroot2;

    fn add(mut self, other: Zroot2) -> Zroot2 {
        self += other;
        self
    }
}

impl Neg for Zroot2 {
    type Output = Zroot2;

    fn neg(self) -> Zroot2 {
        Zroot2::new(-self.int_part, -self.sqrt2_part, self.exponent)
    }
}

impl SubAssign for Zroot2 {
    fn sub_assign(&mut self, other: Zroot2) {
        *self += -other;
    }
}

impl Sub for Zroot2 {
    type Output = Zroot2;

    fn sub(mut self, other: Zroot2) -> Zroot2 {
        self -= other;
        self
    }
}

impl Mul for Zroot2 {
    type Output = Zroot2;

    /// `(a+b√2)/√2^k × (c+d√2)/√2^l = (ac + 2bd + (ad+bc)√2)/√2^(k+l)`.
    ///
    /// Products of reduced non-zero elements already carry an odd
    /// `int_part` (odd·odd + even), so no reduction is required here.
    fn mul(self, other: Zroot2) -> Zroot2 {
        Zroot2::new(
            self.int_part * other.int_part + ((self.sqrt2_part * other.sqrt2_part) << 1),
            self.int_part * other.sqrt2_part + self.sqrt2_part * other.int_part,
            self.exponent + other.exponent,
        )
    }
}

impl fmt::Display for Zroot2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}e{}", self.int_part, self.sqrt2_part, self.exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_reduced_to_canonical_form() {
        let mut z = Zroot2::new(0, 0, 7);
        z.reduce();
        assert_eq!(z, ZERO);
    }

    #[test]
    fn test_reduce_halves_even_pairs() {
        // (4 + 2√2)/√2^4 = (2 + √2)/√2^2 = (1 + (2/2)√2)/√2^1... one even
        // step then one swap step.
        let z = Zroot2::new(4, 2, 4).reduced();
        assert_eq!(z, Zroot2::new(1, 1, 1));
    }

    #[test]
    fn test_reduce_swaps_even_int_part() {
        // (2 + √2)/√2^3 = √2(1 + √2)/√2^3 = (1 + √2)/√2^2
        let z = Zroot2::new(2, 1, 3).reduced();
        assert_eq!(z, Zroot2::new(1, 1, 2));
    }

    #[test]
    fn test_reduce_is_a_fixed_point() {
        for (a, b, k) in [(3, 2, 5), (8, 4, 6), (0, 4, 2), (-6, -2, 3)] {
            let once = Zroot2::new(a, b, k).reduced();
            assert_eq!(once, once.reduced(), "reduce(reduce(x)) != reduce(x)");
        }
    }

    #[test]
    fn test_odd_int_part_round_trips() {
        // Reduced non-zero elements have odd int_part and are fixed points.
        for (a, b, k) in [(1, 0, 0), (3, 1, 4), (-5, 2, 2), (7, -3, 1)] {
            let z = Zroot2::new(a, b, k);
            assert_eq!(z, z.reduced());
        }
    }

    #[test]
    fn test_addition_with_equal_exponents_reduces() {
        // (1 + √2)/√2 + (1 - √2)/√2 = 2/√2 = √2 = (0 + 1·√2)/√2^0... which
        // reduces to (1, 0, -1).
        let sum = Zroot2::new(1, 1, 1) + Zroot2::new(1, -1, 1);
        assert_eq!(sum, Zroot2::new(1, 0, -1));
    }

    #[test]
    fn test_addition_aligns_even_exponent_difference() {
        // 1 + 1/2 represented as (1,0,0) + (1,0,2): scale the first by 2.
        let sum = Zroot2::new(1, 0, 2) + Zroot2::new(1, 0, 0);
        assert_eq!(sum, Zroot2::new(3, 0, 2));
        // Same result with the operands flipped.
        let sum = Zroot2::new(1, 0, 0) + Zroot2::new(1, 0, 2);
        assert_eq!(sum, Zroot2::new(3, 0, 2));
    }

    #[test]
    fn test_addition_aligns_odd_exponent_difference() {
        // 1 + 1/√2 = (√2 + 1)/√2: the smaller-exponent operand picks up a
        // component swap.
        let sum = Zroot2::new(1, 0, 1) + Zroot2::new(1, 0, 0);
        assert_eq!(sum, Zroot2::new(1, 1, 1));
        let sum = Zroot2::new(1, 0, 0) + Zroot2::new(1, 0, 1);
        assert_eq!(sum, Zroot2::new(1, 1, 1));
    }

    #[test]
    fn test_add_then_subtract_is_identity() {
        let samples = [
            Zroot2::new(3, 1, 2),
            Zroot2::new(-1, 2, 0),
            Zroot2::new(1, 0, 1),
            Zroot2::new(5, -3, 4),
        ];
        for &x in &samples {
            for &y in &samples {
                assert_eq!((x + y - y).reduced(), x.reduced(), "({x}) + ({y}) - ({y})");
            }
        }
    }

    #[test]
    fn test_reduction_distributes_over_addition() {
        let x = Zroot2::new(6, 2, 5);
        let y = Zroot2::new(2, 6, 5);
        assert_eq!((x + y).reduced(), (x.reduced() + y.reduced()).reduced());
    }

    #[test]
    fn test_multiplication_formula() {
        // (1 + √2)(1 + √2) = 3 + 2√2
        let z = Zroot2::new(1, 1, 0) * Zroot2::new(1, 1, 0);
        assert_eq!(z, Zroot2::new(3, 2, 0));
        // 1/√2 · 1/√2 = 1/2
        let z = INV_SQRT2 * INV_SQRT2;
        assert_eq!(z, Zroot2::new(1, 0, 2));
    }

    #[test]
    fn test_multiplying_by_one_is_identity() {
        let x = Zroot2::new(3, -1, 2);
        assert_eq!(x * ONE, x);
        assert_eq!(ONE * x, x);
    }

    #[test]
    fn test_exact_division_round_trips() {
        let samples = [Zroot2::new(3, 1, 2), Zroot2::new(1, -1, 0), INV_SQRT2];
        for &x in &samples {
            for &y in &samples {
                let product = x * y;
                let back = product.try_div(y).expect("divisor is a factor by construction");
                assert_eq!(back, x, "({x} * {y}) / {y}");
            }
        }
    }

    #[test]
    fn test_inexact_division_is_a_domain_error() {
        let err = Zroot2::new(3, 0, 0).try_div(Zroot2::new(2, 0, 0));
        assert!(matches!(err, Err(Error::RingDomain { .. })));
    }

    #[test]
    fn test_ordering_is_lexicographic_on_components() {
        assert!(Zroot2::new(1, 0, 0) < Zroot2::new(2, 0, 0));
        assert!(Zroot2::new(1, 1, 0) < Zroot2::new(1, 2, 0));
        assert!(Zroot2::new(1, 1, 1) < Zroot2::new(1, 1, 2));
        assert!(Zroot2::new(-1, 5, 5) < Zroot2::new(0, 0, 0));
    }

    #[test]
    fn test_abs_and_sign() {
        let neg = Zroot2::new(-3, 1, 2);
        assert!(neg.is_negative());
        assert_eq!(neg.abs(), Zroot2::new(3, -1, 2));
        assert!(!neg.abs().is_negative());
        assert!(Zroot2::new(0, -1, 0).is_negative());
        assert!(!ZERO.is_negative());
    }

    #[test]
    fn test_raise_exponent_skips_zero() {
        let mut z = ZERO;
        z.raise_exponent();
        assert_eq!(z, ZERO);

        let mut z = ONE;
        z.raise_exponent();
        assert_eq!(z, INV_SQRT2);
    }

    #[test]
    fn test_display_format() {
        assert_eq!(Zroot2::new(-1, 2, 3).to_string(), "-1,2e3");
    }

    #[test]
    fn test_random_odd_elements_are_reduction_fixed_points() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0x506);
        for _ in 0..200 {
            let a = rng.gen_range(-63..=63) | 1; // odd int part
            let b = rng.gen_range(-64..=64);
            let k = rng.gen_range(-4..=12);
            let z = Zroot2::new(a, b, k);
            assert_eq!(z, z.reduced(), "({a},{b},{k})");
        }
    }

    #[test]
    fn test_random_add_then_subtract_round_trips() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0x5062);
        for _ in 0..200 {
            let x = Zroot2::new(rng.gen_range(-31..=31) | 1, rng.gen_range(-32..=32), rng.gen_range(0..=8));
            let y = Zroot2::new(rng.gen_range(-31..=31) | 1, rng.gen_range(-32..=32), rng.gen_range(0..=8));
            assert_eq!((x + y - y).reduced(), x, "({x}) + ({y}) - ({y})");
        }
    }
}
