//! Breadth-First Enumeration Across T-Counts
//!
//! Two phases:
//!
//! - **Stored phase** (T-count 1..=stored_depth_max): every matrix of the
//!   previous level is left-multiplied by all fifteen generators, the
//!   canonical results are deduplicated concurrently against the level
//!   being built and the level before, and fresh matrices are run against
//!   the pattern checklist.
//! - **Free-multiply phase** (beyond the stored depth): full levels no
//!   longer fit in memory, so no deduplication set is kept. The first free
//!   level multiplies the retained frontier by T₀; later levels multiply
//!   by the retained generating sets. Products feed the checklist only.
//!
//! Pattern hits append the witness history to the level's `.dat` file.
//! Output line order is non-deterministic by design; duplicate products
//! are harmless because an erased pattern orbit cannot hit twice.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use so6_core::{project, So6, GENERATOR_COUNT};
use tracing::{debug, info, info_span};

/// Emit a progress event every this many processed source matrices.
const PROGRESS_STRIDE: u64 = 0x1000;

fn tick_progress(processed: &AtomicU64, total: usize) {
    let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
    if count % PROGRESS_STRIDE == 0 {
        debug!(processed = count, total, "level progress");
    }
}

use crate::checklist::PatternChecklist;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::io::{load_patterns, LevelWriter};
use crate::sets::CanonicalSet;

/// What one completed T-count looked like.
#[derive(Clone, Debug, serde::Serialize)]
pub struct LevelReport {
    pub t_count: usize,
    /// Canonical classes discovered (stored phase only; the free phase
    /// keeps no set to count).
    pub new_matrices: Option<usize>,
    /// How the discovered classes' patterns split across case numbers
    /// 0..=8 (stored phase only).
    pub case_counts: Option<[usize; 9]>,
    /// Patterns still unexplained once the level finished.
    pub patterns_remaining: usize,
}

/// Per-run regression vector: one report per T-count.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct SearchSummary {
    pub levels: Vec<LevelReport>,
}

/// Case census of a level: how many matrices project into each of the
/// nine pattern cases.
fn case_census(level: &[So6]) -> [usize; 9] {
    let mut counts = [0usize; 9];
    for matrix in level {
        counts[project(matrix).case_num() as usize] += 1;
    }
    counts
}

/// The stored phase's legacy to the free phase: the last in-memory level
/// plus the retained generating sets.
struct StoredFrontier {
    matrices: Vec<So6>,
    generating_sets: Vec<Vec<So6>>,
}

/// Run a full enumeration under `config`. The configuration must already
/// be normalised.
pub fn run(config: &SearchConfig) -> Result<SearchSummary> {
    let checklist = match &config.pattern_file {
        Some(path) => {
            let checklist = PatternChecklist::from_patterns(load_patterns(path)?);
            info!(
                patterns = checklist.len(),
                file = %path.display(),
                "loaded non-identity patterns"
            );
            checklist
        }
        None => PatternChecklist::empty(),
    };

    let mut summary = SearchSummary::default();
    let started = Instant::now();

    let frontier = stored_phase(config, &checklist, &mut summary)?;
    free_multiply_phase(config, &checklist, &frontier, &mut summary)?;

    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        patterns_remaining = checklist.len(),
        "enumeration complete"
    );
    Ok(summary)
}

/// Levels 1..=stored_depth_max, with full concurrent deduplication.
fn stored_phase(
    config: &SearchConfig,
    checklist: &PatternChecklist,
    summary: &mut SearchSummary,
) -> Result<StoredFrontier> {
    let mut prior: HashSet<So6> = HashSet::new();
    let mut current: Vec<So6> = vec![So6::identity()];
    let generating_sets_wanted = config.num_generating_sets();
    let mut generating_sets: Vec<Vec<So6>> = Vec::with_capacity(generating_sets_wanted);

    for level in 0..config.stored_depth_max {
        let t_count = level + 1;
        let span = info_span!("level", t_count);
        let _entered = span.enter();
        let started = Instant::now();

        let writer = LevelWriter::create(&config.output_dir, t_count)?;
        info!(
            sources = current.len(),
            output = %writer.path().display(),
            "beginning stored T-count level"
        );

        let next = CanonicalSet::new();
        let processed = AtomicU64::new(0);
        current.par_iter().try_for_each(|source| -> Result<()> {
            tick_progress(&processed, current.len());
            for index in 0..GENERATOR_COUNT {
                let candidate = source.left_multiply_by_t(index)?;
                if prior.contains(&candidate) {
                    continue;
                }
                let pattern = project(&candidate);
                let line = candidate.history().to_line();
                if next.insert(candidate) && checklist.hit(&pattern) {
                    writer.record(&line);
                }
            }
            Ok(())
        })?;
        writer.finish()?;

        prior = current.into_iter().collect();
        current = next.into_vec();
        // Insertion races pick arbitrary class representatives; a sorted
        // frontier at least makes the processing order reproducible.
        current.sort_unstable();
        let case_counts = case_census(&current);
        info!(
            new_matrices = current.len(),
            patterns_remaining = checklist.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            ?case_counts,
            "finished stored T-count level"
        );
        summary.levels.push(LevelReport {
            t_count,
            new_matrices: Some(current.len()),
            case_counts: Some(case_counts),
            patterns_remaining: checklist.len(),
        });

        if level < generating_sets_wanted {
            let generating_set = build_generating_set(&current)?;
            info!(
                index = level,
                members = generating_set.len(),
                "retained generating set"
            );
            generating_sets.push(generating_set);
        }
    }

    Ok(StoredFrontier {
        matrices: current,
        generating_sets,
    })
}

/// The coset `T₀·{level}`, restricted to members whose own last generator
/// was not T₀ (their T₀-product collapses back into a shorter word).
fn build_generating_set(level: &[So6]) -> Result<Vec<So6>> {
    let coset: so6_core::Result<Vec<So6>> = level
        .iter()
        .filter(|matrix| matrix.history().last_index() != Some(0))
        .map(|matrix| matrix.left_multiply_by_t(0))
        .collect();
    Ok(coset?)
}

/// Levels beyond the stored depth: no dedup set, checklist hits only.
fn free_multiply_phase(
    config: &SearchConfig,
    checklist: &PatternChecklist,
    frontier: &StoredFrontier,
    summary: &mut SearchSummary,
) -> Result<()> {
    for level in config.stored_depth_max..config.target_t_count {
        let t_count = level + 1;
        let span = info_span!("level", t_count);
        let _entered = span.enter();
        let started = Instant::now();

        let writer = LevelWriter::create(&config.output_dir, t_count)?;
        info!(
            sources = frontier.matrices.len(),
            output = %writer.path().display(),
            "beginning free-multiply T-count level"
        );

        let processed = AtomicU64::new(0);
        if level == config.stored_depth_max {
            // First free level: one step by T₀ from the stored frontier.
            frontier
                .matrices
                .par_iter()
                .try_for_each(|source| -> Result<()> {
                    tick_progress(&processed, frontier.matrices.len());
                    let product = source.left_multiply_by_t(0)?;
                    record_if_hit(&product, checklist, &writer);
                    Ok(())
                })?;
        } else {
            let generating_set = &frontier.generating_sets[level - config.stored_depth_max - 1];
            frontier.matrices.par_iter().for_each(|source| {
                tick_progress(&processed, frontier.matrices.len());
                for g in generating_set {
                    let product = g * source;
                    record_if_hit(&product, checklist, &writer);
                }
            });
        }
        writer.finish()?;

        info!(
            patterns_remaining = checklist.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "finished free-multiply T-count level"
        );
        summary.levels.push(LevelReport {
            t_count,
            new_matrices: None,
            case_counts: None,
            patterns_remaining: checklist.len(),
        });
    }
    Ok(())
}

fn record_if_hit(product: &So6, checklist: &PatternChecklist, writer: &LevelWriter) {
    let pattern = project(product);
    if checklist.hit(&pattern) {
        writer.record(&product.history().to_line());
    }
}

/// Replay a previously written `.dat` file: rebuild each line's matrix
/// and erase its pattern orbit from the checklist. A diagnostic for
/// resuming a search against a trimmed checklist.
pub fn replay_file(path: &std::path::Path, checklist: &PatternChecklist) -> Result<Vec<So6>> {
    let text = std::fs::read_to_string(path)?;
    let mut matrices = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let matrix = So6::from_circuit_line(line)?;
        checklist.hit(&project(&matrix));
        matrices.push(matrix);
    }
    info!(
        replayed = matrices.len(),
        patterns_remaining = checklist.len(),
        file = %path.display(),
        "replayed output file"
    );
    Ok(matrices)
}
