//! Generic containers shared by the statistical model.

/// Growable distance histogram.
pub mod occurrence_list;

/// Character-keyed map with case folding and pluggable merge strategies.
pub mod char_map;

/// Weight/count map aliases and their normalization helpers.
pub mod weights;
