//! # so6-enumerate: T-Count Catalogue Search
//!
//! Drives the breadth-first enumeration of canonical SO(6) Clifford+T
//! products on top of `so6-core`:
//!
//! - **Configuration**: an explicit [`SearchConfig`] record (CLI or JSON)
//! - **Checklist**: concurrent pattern set with orbit-wide erasure
//! - **Concurrent frontiers**: hash-sharded canonical-matrix sets
//! - **Driver**: the stored and free-multiply phases, parallel per level
//! - **I/O**: pattern-file parsing and per-T-count `.dat` writers
//!
//! ## Example
//!
//! ```no_run
//! use so6_enumerate::{driver, SearchConfig};
//!
//! let mut config = SearchConfig::new(4, 4);
//! config.normalize()?;
//! let summary = driver::run(&config)?;
//! for level in &summary.levels {
//!     println!("T={}: {:?} classes", level.t_count, level.new_matrices);
//! }
//! # Ok::<(), so6_enumerate::Error>(())
//! ```

pub mod checklist;
pub mod config;
pub mod driver;
pub mod error;
pub mod io;
pub mod sets;

pub use checklist::{pattern_orbit, PatternChecklist};
pub use config::SearchConfig;
pub use driver::{LevelReport, SearchSummary};
pub use error::{Error, Result};
pub use sets::CanonicalSet;
