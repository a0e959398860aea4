//! # so6-core: Exact SO(6) Clifford+T Arithmetic and Canonical Forms
//!
//! The mathematical core of the T-count catalogue enumerator:
//!
//! - **Ring arithmetic**: exact `(a + b√2)/√2^k` numbers with reduction to
//!   a unique normal form
//! - **Matrices**: 6×6 orthogonal matrices over the ring with build
//!   histories, frequency maps, and a canonical view
//! - **Canonicalisation**: selection of the unique orbit representative
//!   under row/column permutations and sign flips
//! - **Patterns**: 72-bit leading-digit invariants with an 8-way case
//!   classifier
//! - **Generators**: the fifteen transvection generators and history replay
//!
//! No I/O and no concurrency; those live in `so6-enumerate`.
//!
//! ## Example
//!
//! ```
//! use so6_core::So6;
//!
//! // Generators 0 and 9 act on disjoint row pairs, so the two orders
//! // produce the same canonical matrix.
//! let a = So6::from_indices(&[0, 9]).unwrap();
//! let b = So6::from_indices(&[9, 0]).unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.history().to_line(), "0 9");
//! ```

pub mod canon;
pub mod circuit;
pub mod error;
pub mod generators;
pub mod matrix;
pub mod pattern;
pub mod ring;
pub mod sign;
pub mod u72;

pub use circuit::CircuitHistory;
pub use error::{Error, Result};
pub use generators::{generator, GENERATOR_COUNT, GENERATOR_ROW_PAIRS};
pub use matrix::{FrequencyMap, So6};
pub use pattern::{project, Pattern};
pub use ring::Zroot2;
pub use sign::SignMask;
pub use u72::U72;
