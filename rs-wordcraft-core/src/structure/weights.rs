use crate::error::{Error, Result};
use crate::structure::char_map::{Additive, CaseFoldingMap, Reject};
use crate::structure::occurrence_list::OccurrenceList;

/// Per-character floating weights (recommendations, distributions).
///
/// Once normalized, two weight maps cannot be merged pairwise, so collisions
/// are rejected.
pub type WeightMap = CaseFoldingMap<f32, Reject>;

/// Per-character integer counts.
pub type CountMap = CaseFoldingMap<u32, Additive>;

/// Candidate next character → counts indexed by distance from the end of the
/// queried sequence.
pub type InfluenceMap = CaseFoldingMap<OccurrenceList, Additive>;

impl<S> CaseFoldingMap<f32, S> {
	/// Sum of every weight.
	pub fn sum(&self) -> f32 {
		self.values().sum()
	}

	/// Scales every weight so the map sums to 1.0, keeping proportions.
	///
	/// Maps whose sum is not positive are left unchanged.
	pub fn rebalance(&mut self) {
		let sum = self.sum();
		if sum <= 0.0 {
			return;
		}
		self.values_mut().for_each(|w| *w /= sum);
	}

	/// Removes every entry whose weight is at most `threshold` × the current sum.
	///
	/// Returns the number of removed entries. The survivors are not rebalanced.
	///
	/// # Errors
	/// Returns `OutOfRange` if `threshold` is not strictly between 0.0 and 1.0.
	pub fn trim(&mut self, threshold: f32) -> Result<usize> {
		if !(threshold > 0.0 && threshold < 1.0) {
			return Err(Error::out_of_range("trim threshold", threshold, "strictly between 0.0 and 1.0"));
		}
		// Cutoff is relative to the sum before any removal
		let cutoff = threshold * self.sum();
		let before = self.len();
		self.retain(|_, w| *w > cutoff);
		Ok(before - self.len())
	}
}

impl<S> CaseFoldingMap<u32, S> {
	/// Sum of every count, widened so it cannot overflow.
	pub fn sum(&self) -> u64 {
		self.values().map(|&c| u64::from(c)).sum()
	}

	/// Adds `amount` to the count of `c`, creating the entry if needed.
	///
	/// The count saturates at `u32::MAX`.
	pub fn increment(&mut self, c: char, amount: u32) -> u32 {
		let slot = self.entry_or_insert_with(c, || 0);
		*slot = slot.saturating_add(amount);
		*slot
	}

	/// Converts counts into a weight map summing to 1.0.
	pub fn balanced(&self) -> WeightMap {
		let mut weights = WeightMap::new(self.is_case_sensitive());
		let sum = self.sum();
		if sum == 0 {
			return weights;
		}
		for (c, &count) in self.iter() {
			weights.insert(c, count as f32 / sum as f32);
		}
		weights
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn weights(pairs: &[(char, f32)]) -> WeightMap {
		let mut map = WeightMap::new(true);
		for &(c, w) in pairs {
			map.insert(c, w);
		}
		map
	}

	#[test]
	fn rebalance_normalizes_and_keeps_ratios() {
		let mut map = weights(&[('a', 2.0), ('b', 6.0), ('c', 0.5)]);
		map.rebalance();
		assert!((map.sum() - 1.0).abs() < 1e-6);
		let ratio = map.get('b').unwrap() / map.get('a').unwrap();
		assert!((ratio - 3.0).abs() < 1e-5);
	}

	#[test]
	fn rebalance_is_idempotent() {
		let mut map = weights(&[('x', 1.0), ('y', 3.0)]);
		map.rebalance();
		let once = map.clone();
		map.rebalance();
		for (c, w) in once.iter() {
			assert!((map.get(c).unwrap() - w).abs() < 1e-6);
		}
	}

	#[test]
	fn rebalance_ignores_empty_sum() {
		let mut map = weights(&[('a', 0.0)]);
		map.rebalance();
		assert_eq!(map.get('a'), Some(&0.0));
	}

	#[test]
	fn trim_removes_low_entries() {
		let mut map = weights(&[('a', 1.0), ('b', 2.0), ('c', 7.0)]);
		assert_eq!(map.trim(0.2).unwrap(), 2);
		assert_eq!(map.alphabet(), vec!['c']);
	}

	#[test]
	fn trim_then_rebalance_keeps_survivor_ratios() {
		let mut map = weights(&[('a', 0.5), ('b', 3.0), ('c', 6.0)]);
		assert_eq!(map.trim(0.1).unwrap(), 1);
		map.rebalance();
		assert!((map.sum() - 1.0).abs() < 1e-6);
		let ratio = map.get('c').unwrap() / map.get('b').unwrap();
		assert!((ratio - 2.0).abs() < 1e-5);
	}

	#[test]
	fn trim_threshold_is_validated() {
		let mut map = weights(&[('a', 1.0)]);
		assert!(map.trim(0.0).is_err());
		assert!(map.trim(1.0).is_err());
		assert!(map.trim(f32::NAN).is_err());
		assert_eq!(map.len(), 1);
	}

	#[test]
	fn count_increments_saturate() {
		let mut counts = CountMap::new(true);
		counts.increment('a', u32::MAX);
		assert_eq!(counts.increment('a', 1), u32::MAX);
		assert_eq!(counts.sum(), u64::from(u32::MAX));
	}

	#[test]
	fn balanced_counts() {
		let mut counts = CountMap::new(false);
		counts.increment('A', 1);
		counts.increment('a', 2);
		counts.increment('b', 1);
		let dist = counts.balanced();
		assert_eq!(dist.get('a'), Some(&0.75));
		assert_eq!(dist.get('b'), Some(&0.25));
	}
}
