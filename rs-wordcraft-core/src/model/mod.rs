//! Top-level module for the statistical word model.
//!
//! This module provides the character-level model and generation pipeline:
//! - Per-character statistics (`CharacterProfile`)
//! - The trained library and its influence-map queries (`StatsLibrary`)
//! - Tunables (`CrunchFactors`, `Factor`)
//! - The two-tier cache of reduced endings (internal, observable through `CacheStats`)
//! - Recommendation and end-of-word computations (`StatsCruncher`)
//! - Word generation (`WordBuilder`)

/// Word generation by weighted random sampling.
///
/// Draws a first character, then appends recommended characters until the
/// end-of-word test succeeds or the length limit is reached.
pub mod word_builder;

/// Aging reduction, recommendation assembly and end-of-word estimation.
pub mod cruncher;

/// Two-tier cache keyed by word ending.
mod endings_cache;

/// Validated tunables of the cruncher.
pub mod factors;

/// Training-text ingestion and influence-map queries.
pub mod stats_library;

/// Statistics of a single character.
pub mod profile;

pub use endings_cache::CacheStats;
