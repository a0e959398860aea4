//! Small End-to-End Search
//!
//! Enumerates to T-count 3 with a checklist seeded from two known
//! products, then prints the per-level summary. Run with:
//!
//! ```sh
//! cargo run -p so6-enumerate --example small_search
//! ```

use so6_core::{project, So6};
use so6_enumerate::{driver, SearchConfig};

fn main() -> anyhow::Result<()> {
    so6_tracing::init_global_tracing(&so6_tracing::TracingConfig::from_env())?;

    let dir = tempfile::tempdir()?;
    let output_dir = dir.path().join("data");

    // Plant the patterns of two products we know the search will visit.
    let checklist_path = dir.path().join("patterns.txt");
    let targets = [
        project(&So6::from_indices(&[0, 9])?),
        project(&So6::from_indices(&[0, 9, 14])?),
    ];
    let lines: Vec<String> = targets.iter().map(|p| p.to_binary_line()).collect();
    std::fs::write(&checklist_path, lines.join("\n"))?;

    let mut config = SearchConfig::new(3, 3);
    config.output_dir = output_dir.clone();
    config.pattern_file = Some(checklist_path);
    config.normalize()?;

    let summary = driver::run(&config)?;
    for level in &summary.levels {
        println!(
            "T={}: classes={:?} cases={:?} patterns remaining={}",
            level.t_count, level.new_matrices, level.case_counts, level.patterns_remaining
        );
        let witnesses =
            std::fs::read_to_string(output_dir.join(format!("{}.dat", level.t_count)))?;
        for line in witnesses.lines() {
            println!("  witness: {line}");
        }
    }
    Ok(())
}
