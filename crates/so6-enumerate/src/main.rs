//! Command-line entry point for the T-count catalogue search.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use so6_enumerate::{driver, SearchConfig};
use so6_tracing::{info, warn, TracingConfig};

/// Enumerate canonical SO(6) Clifford+T products and search their
/// patterns against a checklist.
#[derive(Parser, Debug)]
#[command(name = "so6-enumerate", version, about)]
struct Cli {
    /// Target T-count to enumerate to
    #[arg(short = 't', long, required_unless_present_any = ["config", "replay"])]
    target_t_count: Option<usize>,

    /// Highest T-count kept fully in memory (defaults to the target)
    #[arg(short = 's', long)]
    stored_depth: Option<usize>,

    /// Worker threads (defaults to the host's core count)
    #[arg(long)]
    threads: Option<usize>,

    /// Pattern checklist file, one binary pattern per line
    #[arg(short = 'p', long)]
    pattern_file: Option<PathBuf>,

    /// Directory for the per-T-count output files
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// JSON configuration file; flags override its fields
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Replay a previously written .dat file against the checklist
    /// instead of enumerating
    #[arg(long, value_name = "DAT_FILE")]
    replay: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    so6_tracing::init_global_tracing(&TracingConfig::from_env())
        .context("installing tracing subscriber")?;

    let cli = Cli::parse();

    if let Some(dat_file) = &cli.replay {
        use so6_enumerate::{io::load_patterns, PatternChecklist};
        let checklist = match &cli.pattern_file {
            Some(path) => PatternChecklist::from_patterns(load_patterns(path)?),
            None => PatternChecklist::empty(),
        };
        let matrices = driver::replay_file(dat_file, &checklist)
            .with_context(|| format!("replaying {}", dat_file.display()))?;
        for matrix in &matrices {
            info!(circuit = %matrix.history(), "replayed");
        }
        info!(patterns_remaining = checklist.len(), "replay complete");
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => SearchConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => {
            let target = cli
                .target_t_count
                .expect("clap requires --target-t-count unless --config or --replay is given");
            SearchConfig::new(target, cli.stored_depth.unwrap_or(target))
        }
    };
    if let Some(target) = cli.target_t_count {
        config.target_t_count = target;
    }
    if let Some(stored) = cli.stored_depth {
        config.stored_depth_max = stored;
    }
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }
    if let Some(pattern_file) = cli.pattern_file {
        config.pattern_file = Some(pattern_file);
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    config.normalize()?;

    if let Err(err) = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build_global()
    {
        warn!(%err, "thread pool already initialised; continuing with the existing one");
    }

    info!(
        target_t_count = config.target_t_count,
        stored_depth_max = config.stored_depth_max,
        threads = config.threads,
        output_dir = %config.output_dir.display(),
        "starting enumeration"
    );

    let summary = driver::run(&config)?;
    so6_enumerate::io::write_summary(&config.output_dir, &summary)?;
    for level in &summary.levels {
        match level.new_matrices {
            Some(count) => info!(
                t_count = level.t_count,
                classes = count,
                patterns_remaining = level.patterns_remaining,
                "level summary"
            ),
            None => info!(
                t_count = level.t_count,
                patterns_remaining = level.patterns_remaining,
                "level summary (free multiply)"
            ),
        }
    }
    Ok(())
}
