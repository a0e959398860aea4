//! Pattern-File Input and Per-Level Output
//!
//! The pattern file is UTF-8 text, one pattern per line (72 binary digits,
//! or 36 for the high-bit-only form; other characters are ignored). Each
//! completed T-count writes `<k>.dat` into the output directory: one
//! space-separated decimal generator history per discovered witness.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use so6_core::Pattern;
use tracing::debug;

use crate::error::{Error, Result};

/// Read and parse every pattern in a checklist file.
///
/// Blank lines are skipped; a line with the wrong digit count aborts
/// startup, pointing at the offending file.
pub fn load_patterns(path: &Path) -> Result<Vec<Pattern>> {
    let text = fs::read_to_string(path).map_err(|err| Error::PatternFile {
        path: path.to_path_buf(),
        source: Box::new(err.into()),
    })?;

    let mut patterns = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let pattern = Pattern::from_line(line).map_err(|err| Error::PatternFile {
            path: path.to_path_buf(),
            source: Box::new(err.into()),
        })?;
        patterns.push(pattern);
    }
    debug!(count = patterns.len(), path = %path.display(), "parsed pattern file");
    Ok(patterns)
}

/// Persist the run summary as `summary.json` next to the level files.
pub fn write_summary(output_dir: &Path, summary: &crate::driver::SearchSummary) -> Result<()> {
    fs::create_dir_all(output_dir)?;
    let file = File::create(output_dir.join("summary.json"))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)?;
    Ok(())
}

/// Serialised writer for one T-count's `.dat` file.
///
/// Workers call [`record`](LevelWriter::record) under a mutex; the first
/// I/O failure is latched and surfaces from [`finish`](LevelWriter::finish),
/// aborting the run.
pub struct LevelWriter {
    path: PathBuf,
    state: Mutex<WriterState>,
}

struct WriterState {
    writer: BufWriter<File>,
    error: Option<std::io::Error>,
}

impl LevelWriter {
    /// Create (truncating) `<output_dir>/<t_count>.dat`.
    pub fn create(output_dir: &Path, t_count: usize) -> Result<Self> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(format!("{t_count}.dat"));
        let file = File::create(&path)?;
        Ok(LevelWriter {
            path,
            state: Mutex::new(WriterState {
                writer: BufWriter::new(file),
                error: None,
            }),
        })
    }

    /// Path of the file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one history line. After a failure, further records become
    /// no-ops; the error is reported once at `finish`.
    pub fn record(&self, line: &str) {
        let mut state = self.state.lock();
        if state.error.is_some() {
            return;
        }
        if let Err(err) = writeln!(state.writer, "{line}") {
            state.error = Some(err);
        }
    }

    /// Flush and surface any latched write error.
    pub fn finish(self) -> Result<()> {
        let mut state = self.state.into_inner();
        if let Some(err) = state.error {
            return Err(err.into());
        }
        state.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use so6_core::{project, So6};

    #[test]
    fn test_load_patterns_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patterns.txt");
        let first = project(&So6::from_indices(&[0]).unwrap());
        let second = project(&So6::from_indices(&[0, 9]).unwrap());
        fs::write(
            &path,
            format!("{}\n\n{}\n", first.to_binary_line(), second.to_binary_line()),
        )
        .unwrap();

        let patterns = load_patterns(&path).unwrap();
        assert_eq!(patterns, vec![first, second]);
    }

    #[test]
    fn test_load_patterns_rejects_bad_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patterns.txt");
        fs::write(&path, "0101\n").unwrap();
        assert!(matches!(
            load_patterns(&path),
            Err(Error::PatternFile { .. })
        ));
    }

    #[test]
    fn test_load_patterns_missing_file() {
        assert!(matches!(
            load_patterns(Path::new("/nonexistent/patterns.txt")),
            Err(Error::PatternFile { .. })
        ));
    }

    #[test]
    fn test_level_writer_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let writer = LevelWriter::create(dir.path(), 3).unwrap();
        assert!(writer.path().ends_with("3.dat"));
        writer.record("0 9");
        writer.record("0 14");
        writer.finish().unwrap();

        let contents = fs::read_to_string(dir.path().join("3.dat")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["0 9", "0 14"]);
    }

    #[test]
    fn test_write_summary_emits_json() {
        use crate::driver::{LevelReport, SearchSummary};

        let dir = tempfile::tempdir().unwrap();
        let summary = SearchSummary {
            levels: vec![LevelReport {
                t_count: 1,
                new_matrices: Some(1),
                case_counts: Some([0, 1, 0, 0, 0, 0, 0, 0, 0]),
                patterns_remaining: 3,
            }],
        };
        write_summary(dir.path(), &summary).unwrap();
        let text = fs::read_to_string(dir.path().join("summary.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["levels"][0]["t_count"], 1);
        assert_eq!(value["levels"][0]["patterns_remaining"], 3);
    }

    #[test]
    fn test_level_writer_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("run1");
        let writer = LevelWriter::create(&nested, 1).unwrap();
        writer.finish().unwrap();
        assert!(nested.join("1.dat").exists());
    }
}
