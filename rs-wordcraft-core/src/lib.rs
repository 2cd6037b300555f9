//! Character-level statistical word generation library.
//!
//! This crate learns where characters sit inside training words and which
//! characters follow them, then synthesizes new plausible words:
//! - Positional and co-occurrence statistics per character
//! - Influence maps aggregated over a candidate sequence
//! - An aging reduction turning counts into recommendation weights
//! - A two-tier cache of reduced word endings
//! - Seedable weighted sampling of new words
//!
//! Everything is in-process and single-threaded. Trained libraries derive
//! `serde` traits so callers can persist them in any format.

/// Statistical model and generation pipeline.
pub mod model;

/// Generic containers (distance histograms, case-folding maps, weight maps).
pub mod structure;

/// Crate error type.
pub mod error;

pub use error::{Error, Result};
pub use model::CacheStats;
pub use model::cruncher::StatsCruncher;
pub use model::factors::{CrunchFactors, Factor};
pub use model::stats_library::StatsLibrary;
pub use model::word_builder::WordBuilder;
