use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Counts how many times an event happened at each distance.
///
/// Index `d` holds the number of observations at distance `d`. The list grows
/// on demand when a larger index is incremented and never shrinks.
///
/// ## Invariants
/// - `total` always equals the sum of `counts`
/// - Unobserved indices below `len()` hold zero
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct OccurrenceList {
	/// Observations per distance. Slots saturate at `u32::MAX`.
	counts: Vec<u32>,
	/// Running sum of `counts`, kept in `u64` so it cannot saturate first.
	total: u64,
}

impl OccurrenceList {
	/// Creates an empty list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a list holding `len` zeroed slots.
	pub fn with_len(len: usize) -> Self {
		Self { counts: vec![0; len], total: 0 }
	}

	/// Creates a list from literal counts.
	pub fn from_counts(counts: &[u32]) -> Self {
		let total = counts.iter().map(|&c| u64::from(c)).sum();
		Self { counts: counts.to_vec(), total }
	}

	/// Adds one observation at `index`, growing the list if needed.
	///
	/// Returns the new count at `index`.
	pub fn increment(&mut self, index: usize) -> u32 {
		self.increment_by(index, 1)
	}

	/// Adds `amount` observations at `index`, growing the list if needed.
	///
	/// A full slot saturates at `u32::MAX`; only the amount actually stored is
	/// added to the total.
	///
	/// Returns the new count at `index`.
	pub fn increment_by(&mut self, index: usize, amount: u32) -> u32 {
		if index >= self.counts.len() {
			self.counts.resize(index + 1, 0);
		}
		let slot = &mut self.counts[index];
		let before = *slot;
		*slot = slot.saturating_add(amount);
		self.total += u64::from(*slot - before);
		*slot
	}

	/// Zeroes the count at `index` without shrinking the list.
	///
	/// # Errors
	/// Returns `IndexOutOfBounds` if `index` is past the end.
	pub fn reset(&mut self, index: usize) -> Result<()> {
		let len = self.counts.len();
		let slot = self.counts.get_mut(index).ok_or(Error::IndexOutOfBounds { index, len })?;
		self.total -= u64::from(*slot);
		*slot = 0;
		Ok(())
	}

	/// Zeroes every count, keeping the current length.
	pub fn clear(&mut self) {
		self.counts.iter_mut().for_each(|c| *c = 0);
		self.total = 0;
	}

	/// Strict accessor.
	///
	/// # Errors
	/// Returns `IndexOutOfBounds` if `index` is past the end.
	pub fn get(&self, index: usize) -> Result<u32> {
		self.counts
			.get(index)
			.copied()
			.ok_or(Error::IndexOutOfBounds { index, len: self.counts.len() })
	}

	/// Tolerant accessor: out-of-range reads return 0.
	pub fn count(&self, index: usize) -> u32 {
		self.counts.get(index).copied().unwrap_or(0)
	}

	/// Number of observations across every distance.
	pub fn total(&self) -> u64 {
		self.total
	}

	/// Number of slots, observed or not.
	pub fn len(&self) -> usize {
		self.counts.len()
	}

	/// Whether the list has no slot at all.
	///
	/// A list of zeroed slots is not empty.
	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Raw counts, index `d` holding distance `d`.
	pub fn counts(&self) -> &[u32] {
		&self.counts
	}

	/// Adds every count of `other` into this list, growing to the larger length.
	///
	/// The operation is commutative and associative. Slots saturate like
	/// `increment_by`.
	pub fn merge(&mut self, other: &Self) {
		if other.counts.len() > self.counts.len() {
			self.counts.resize(other.counts.len(), 0);
		}
		let mut added = 0u64;
		for (slot, &count) in self.counts.iter_mut().zip(&other.counts) {
			let before = *slot;
			*slot = slot.saturating_add(count);
			added += u64::from(*slot - before);
		}
		self.total += added;
	}

	/// Index of the first non-zero count.
	pub fn first_nonzero(&self) -> Option<usize> {
		self.counts.iter().position(|&c| c != 0)
	}

	/// Index of the last non-zero count.
	pub fn last_nonzero(&self) -> Option<usize> {
		self.counts.iter().rposition(|&c| c != 0)
	}

	/// First index holding the largest count.
	pub fn index_of_max(&self) -> Option<usize> {
		let max = *self.counts.iter().max()?;
		self.counts.iter().position(|&c| c == max)
	}

	/// Mean count per slot, `E[x]`. Empty lists average to 0.
	pub fn average(&self) -> f32 {
		if self.counts.is_empty() {
			return 0.0;
		}
		self.total as f32 / self.counts.len() as f32
	}

	/// Population variance of the raw counts, `E[x²] - E[x]²`.
	pub fn variance(&self) -> f32 {
		if self.counts.is_empty() {
			return 0.0;
		}
		let len = self.counts.len() as f64;
		let (sum, sum_sq) = self.counts.iter().fold((0.0f64, 0.0f64), |(s, sq), &c| {
			let c = f64::from(c);
			(s + c, sq + c * c)
		});
		let mean = sum / len;
		(sum_sq / len - mean * mean) as f32
	}

	/// Share of all observations that happened at `index`.
	///
	/// - Out-of-range indices have no mass
	/// - A list with no observations is treated as uniform, `1 / len`
	pub fn probability_mass(&self, index: usize) -> f32 {
		if index >= self.counts.len() {
			return 0.0;
		}
		if self.total == 0 {
			return 1.0 / self.counts.len() as f32;
		}
		self.counts[index] as f32 / self.total as f32
	}
}

impl From<Vec<u32>> for OccurrenceList {
	fn from(counts: Vec<u32>) -> Self {
		let total = counts.iter().map(|&c| u64::from(c)).sum();
		Self { counts, total }
	}
}

impl fmt::Display for OccurrenceList {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[")?;
		for (i, count) in self.counts.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{}", count)?;
		}
		write!(f, "]")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn increment_grows_with_zeros() {
		let mut list = OccurrenceList::new();
		assert_eq!(list.increment(3), 1);
		assert_eq!(list.counts(), &[0, 0, 0, 1]);
		assert_eq!(list.increment_by(1, 4), 4);
		assert_eq!(list.total(), 5);
	}

	#[test]
	fn strict_and_tolerant_access() {
		let list = OccurrenceList::from_counts(&[2, 0, 5]);
		assert_eq!(list.get(2), Ok(5));
		assert_eq!(list.get(3), Err(Error::IndexOutOfBounds { index: 3, len: 3 }));
		assert_eq!(list.count(3), 0);
		assert_eq!(list.count(usize::MAX), 0);
	}

	#[test]
	fn reset_keeps_total_consistent() {
		let mut list = OccurrenceList::from_counts(&[2, 3, 4]);
		list.reset(1).unwrap();
		assert_eq!(list.counts(), &[2, 0, 4]);
		assert_eq!(list.total(), 6);
		assert!(list.reset(7).is_err());
	}

	#[test]
	fn merge_is_commutative_and_associative() {
		let a = OccurrenceList::from_counts(&[1, 2]);
		let b = OccurrenceList::from_counts(&[0, 1, 0, 7]);
		let c = OccurrenceList::from_counts(&[3]);

		let mut ab = a.clone();
		ab.merge(&b);
		let mut ba = b.clone();
		ba.merge(&a);
		assert_eq!(ab, ba);
		assert_eq!(ab.total(), 11);

		let mut ab_c = ab.clone();
		ab_c.merge(&c);
		let mut bc = b.clone();
		bc.merge(&c);
		let mut a_bc = a.clone();
		a_bc.merge(&bc);
		assert_eq!(ab_c, a_bc);
		assert_eq!(ab_c.counts(), &[4, 3, 0, 7]);
	}

	#[test]
	fn full_slots_saturate_and_keep_total() {
		let mut list = OccurrenceList::new();
		list.increment_by(0, u32::MAX);
		assert_eq!(list.increment(0), u32::MAX);
		assert_eq!(list.total(), u64::from(u32::MAX));

		let mut other = OccurrenceList::from_counts(&[5, 2]);
		other.merge(&list);
		assert_eq!(other.counts(), &[u32::MAX, 2]);
		assert_eq!(other.total(), u64::from(u32::MAX) + 2);
	}

	#[test]
	fn statistics() {
		let list = OccurrenceList::from_counts(&[1, 3]);
		assert_eq!(list.average(), 2.0);
		assert_eq!(list.variance(), 1.0);
		assert_eq!(list.probability_mass(1), 0.75);
		assert_eq!(list.probability_mass(2), 0.0);
	}

	#[test]
	fn empty_list_is_uniform() {
		let list = OccurrenceList::with_len(4);
		assert_eq!(list.probability_mass(2), 0.25);
		assert_eq!(OccurrenceList::new().average(), 0.0);
	}

	#[test]
	fn extremes_and_display() {
		let list = OccurrenceList::from_counts(&[0, 4, 1, 4, 0]);
		assert_eq!(list.first_nonzero(), Some(1));
		assert_eq!(list.last_nonzero(), Some(3));
		assert_eq!(list.index_of_max(), Some(1));
		assert_eq!(list.to_string(), "[0, 4, 1, 4, 0]");
		assert_eq!(OccurrenceList::new().index_of_max(), None);
	}
}
