/// Crate-level error type.
///
/// Every fallible operation of the library reports one of these variants.
/// Errors are returned synchronously and nothing is retried internally.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
	/// A tunable or argument is outside its documented range.
	#[error("{name} must be {expected}, got {value}")]
	OutOfRange {
		name: &'static str,
		value: f64,
		expected: &'static str,
	},

	/// Strict access past the end of an `OccurrenceList`.
	#[error("index {index} out of bounds for length {len}")]
	IndexOutOfBounds { index: usize, len: usize },

	/// Two entries collided in a map whose values cannot be combined pairwise
	/// (normalized weights need a full rebalance, not an addition).
	#[error("illegal merge of normalized weights for key '{0}'")]
	IllegalMerge(char),

	/// A profile was asked to observe a position holding another character.
	#[error("profile for '{expected}' cannot observe '{found}'")]
	ProfileMismatch { expected: char, found: char },

	/// Generation was requested before any first-character statistics exist.
	#[error("no first-character statistics, ingest text and call recalculate_metrics first")]
	EmptyDistribution,
}

impl Error {
	/// Shorthand for `OutOfRange`, widening the value to `f64`.
	pub(crate) fn out_of_range(name: &'static str, value: impl Into<f64>, expected: &'static str) -> Self {
		Error::OutOfRange { name, value: value.into(), expected }
	}
}

/// Result alias used by every fallible operation of the crate.
pub type Result<T> = std::result::Result<T, Error>;
