//! Canonical-Form Walkthrough
//!
//! Builds a few short generator words, prints their physical entry
//! tables, canonical views, and pattern cases. Run with:
//!
//! ```sh
//! cargo run -p so6-core --example canonical_demo
//! ```

use so6_core::{project, So6};

fn show(label: &str, word: &[u8]) {
    let matrix = So6::from_indices(word).expect("generator indices are in range");
    let pattern = project(&matrix);

    println!("=== {label} (history \"{}\") ===", matrix.history());
    println!("physical entries (a,b e k):\n{matrix}");
    println!("canonical rows: {:?}", matrix.canonical_rows());
    println!("canonical cols: {:?}", matrix.canonical_cols());
    println!("sign convention: {}", matrix.sign_convention());
    println!("max denominator exponent: {}", matrix.max_exponent());
    println!("pattern case: {}\n", pattern.case_num());
}

fn main() {
    show("identity", &[]);
    show("one generator", &[0]);
    show("two commuting generators", &[0, 9]);
    show("two overlapping generators", &[0, 5]);
    show("three disjoint generators", &[0, 9, 14]);

    // The two orders of commuting generators collapse to one class.
    let forward = So6::from_indices(&[0, 9]).expect("valid word");
    let backward = So6::from_indices(&[9, 0]).expect("valid word");
    println!(
        "T9·T0 and T0·T9 share a canonical form: {}",
        forward == backward
    );
}
