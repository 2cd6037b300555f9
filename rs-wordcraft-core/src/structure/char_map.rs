use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::structure::occurrence_list::OccurrenceList;

/// Canonical (lower-case) form of a character.
///
/// Characters whose lower-case form spans several code points are kept as-is.
pub fn fold_char(c: char) -> char {
	let mut lower = c.to_lowercase();
	match (lower.next(), lower.next()) {
		(Some(l), None) => l,
		_ => c,
	}
}

/// Values that can absorb another value of the same type.
pub trait Accumulate {
	/// Adds `other` into `self`.
	fn accumulate(&mut self, other: &Self);
}

impl Accumulate for u32 {
	fn accumulate(&mut self, other: &Self) {
		*self = self.saturating_add(*other);
	}
}

impl Accumulate for f32 {
	fn accumulate(&mut self, other: &Self) {
		*self += *other;
	}
}

impl Accumulate for OccurrenceList {
	fn accumulate(&mut self, other: &Self) {
		self.merge(other);
	}
}

/// Policy applied when two entries of a `CaseFoldingMap` collide.
///
/// A collision happens when `compact` folds an upper-case key onto an existing
/// lower-case one, or when `merge_all` brings in a key already present.
pub trait MergeStrategy<V> {
	/// Combines `incoming` into `existing`, both stored under `key`.
	fn merge(&self, key: char, existing: &mut V, incoming: &V) -> Result<()>;
}

/// Sums colliding values.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Additive;

impl<V: Accumulate> MergeStrategy<V> for Additive {
	fn merge(&self, _key: char, existing: &mut V, incoming: &V) -> Result<()> {
		existing.accumulate(incoming);
		Ok(())
	}
}

/// The incoming value replaces the existing one.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overwrite;

impl<V: Clone> MergeStrategy<V> for Overwrite {
	fn merge(&self, _key: char, existing: &mut V, incoming: &V) -> Result<()> {
		*existing = incoming.clone();
		Ok(())
	}
}

/// Refuses every collision with `Error::IllegalMerge`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reject;

impl<V> MergeStrategy<V> for Reject {
	fn merge(&self, key: char, _existing: &mut V, _incoming: &V) -> Result<()> {
		Err(Error::IllegalMerge(key))
	}
}

/// Character-keyed ordered map with optional case folding.
///
/// When the map is case-insensitive, every read and write goes through
/// `fold_char` first, so `'A'` and `'a'` address the same entry. Keys written
/// while the map was case-sensitive keep their case until `compact` folds them
/// using the map's `MergeStrategy`.
///
/// Iteration is ordered by character code.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CaseFoldingMap<V, S = Additive> {
	/// Stored values, ordered by (possibly folded) key.
	entries: BTreeMap<char, V>,
	/// When false, keys go through `fold_char` before every access.
	case_sensitive: bool,
	/// Policy used by `compact` and `merge_all` on collisions.
	strategy: S,
}

impl<V, S: Default> CaseFoldingMap<V, S> {
	/// Creates an empty map with the strategy's default value.
	pub fn new(case_sensitive: bool) -> Self {
		Self::with_strategy(case_sensitive, S::default())
	}
}

impl<V, S: Default> Default for CaseFoldingMap<V, S> {
	fn default() -> Self {
		Self::new(true)
	}
}

impl<V, S> CaseFoldingMap<V, S> {
	/// Creates an empty map using an explicit strategy value.
	pub fn with_strategy(case_sensitive: bool, strategy: S) -> Self {
		Self { entries: BTreeMap::new(), case_sensitive, strategy }
	}

	/// Whether `'A'` and `'a'` are distinct keys.
	pub fn is_case_sensitive(&self) -> bool {
		self.case_sensitive
	}

	/// Switches key normalization. Stored keys are left untouched.
	pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
		self.case_sensitive = case_sensitive;
	}

	/// Normalized form of `c` under the current case policy.
	pub fn key(&self, c: char) -> char {
		if self.case_sensitive { c } else { fold_char(c) }
	}

	/// Value stored for `c` after normalization.
	pub fn get(&self, c: char) -> Option<&V> {
		self.entries.get(&self.key(c))
	}

	/// Mutable value stored for `c` after normalization.
	pub fn get_mut(&mut self, c: char) -> Option<&mut V> {
		let key = self.key(c);
		self.entries.get_mut(&key)
	}

	/// Whether an entry exists for `c` after normalization.
	pub fn contains_key(&self, c: char) -> bool {
		self.entries.contains_key(&self.key(c))
	}

	/// Stores `value` under the normalized key of `c`.
	///
	/// Returns the replaced value, if any. No strategy is involved.
	pub fn insert(&mut self, c: char, value: V) -> Option<V> {
		let key = self.key(c);
		self.entries.insert(key, value)
	}

	/// Removes and returns the value stored for `c`.
	pub fn remove(&mut self, c: char) -> Option<V> {
		let key = self.key(c);
		self.entries.remove(&key)
	}

	/// Returns the entry for `c`, creating it with `make` if absent.
	pub fn entry_or_insert_with<F: FnOnce() -> V>(&mut self, c: char, make: F) -> &mut V {
		let key = self.key(c);
		self.entries.entry(key).or_insert_with(make)
	}

	/// Entries in character order, with their stored keys.
	pub fn iter(&self) -> impl Iterator<Item = (char, &V)> {
		self.entries.iter().map(|(k, v)| (*k, v))
	}

	/// Values in character order.
	pub fn values(&self) -> impl Iterator<Item = &V> {
		self.entries.values()
	}

	/// Mutable values in character order.
	pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
		self.entries.values_mut()
	}

	/// Characters currently stored, in code order.
	pub fn alphabet(&self) -> Vec<char> {
		self.entries.keys().copied().collect()
	}

	/// Keeps only the entries for which `keep` returns true.
	pub fn retain<F: FnMut(char, &mut V) -> bool>(&mut self, mut keep: F) {
		self.entries.retain(|k, v| keep(*k, v));
	}

	/// Number of stored entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the map has no entry.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Removes every entry, keeping the case policy and strategy.
	pub fn clear(&mut self) {
		self.entries.clear();
	}
}

impl<V: Clone, S: MergeStrategy<V>> CaseFoldingMap<V, S> {
	/// Folds every upper-case key into its lower-case sibling.
	///
	/// - No sibling: the value is re-keyed
	/// - Sibling present: the strategy merges `(lower, upper)` under the lower key
	/// - The upper-case entry is always removed
	///
	/// # Errors
	/// Propagates the strategy's error. The colliding upper-case entry is left
	/// in place so nothing is lost.
	pub fn compact(&mut self) -> Result<()> {
		let uppers: Vec<char> = self
			.entries
			.keys()
			.copied()
			.filter(|&c| c.is_uppercase() && fold_char(c) != c)
			.collect();

		for upper in uppers {
			let lower = fold_char(upper);
			let Some(value) = self.entries.remove(&upper) else { continue };
			match self.entries.get_mut(&lower) {
				// Plain re-key
				None => {
					self.entries.insert(lower, value);
				}
				Some(existing) => {
					if let Err(e) = self.strategy.merge(lower, existing, &value) {
						// Put the refused entry back before reporting
						self.entries.insert(upper, value);
						return Err(e);
					}
				}
			}
		}
		Ok(())
	}

	/// Brings every entry of `other` into this map.
	///
	/// Missing keys are copied, present ones go through the strategy.
	///
	/// # Errors
	/// Propagates the strategy's error on the first refused collision.
	pub fn merge_all<T>(&mut self, other: &CaseFoldingMap<V, T>) -> Result<()> {
		for (c, value) in &other.entries {
			let key = self.key(*c);
			match self.entries.get_mut(&key) {
				Some(existing) => self.strategy.merge(key, existing, value)?,
				None => {
					self.entries.insert(key, value.clone());
				}
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn folding_routes_every_access() {
		let mut map: CaseFoldingMap<u32> = CaseFoldingMap::new(false);
		map.insert('A', 3);
		assert_eq!(map.get('a'), Some(&3));
		assert!(map.contains_key('A'));
		*map.entry_or_insert_with('a', || 0) += 1;
		assert_eq!(map.alphabet(), vec!['a']);
		assert_eq!(map.remove('A'), Some(4));
		assert!(map.is_empty());
	}

	#[test]
	fn sensitive_map_keeps_case() {
		let mut map: CaseFoldingMap<u32> = CaseFoldingMap::new(true);
		map.insert('A', 1);
		map.insert('a', 2);
		assert_eq!(map.len(), 2);
		assert_eq!(map.alphabet(), vec!['A', 'a']);
	}

	#[test]
	fn compact_merges_additively() {
		let mut map: CaseFoldingMap<u32> = CaseFoldingMap::new(true);
		map.insert('A', 1);
		map.insert('a', 2);
		map.insert('B', 5);
		map.set_case_sensitive(false);
		map.compact().unwrap();
		assert_eq!(map.iter().collect::<Vec<_>>(), vec![('a', &3), ('b', &5)]);
	}

	#[test]
	fn compact_with_overwrite_keeps_upper_value() {
		let mut map: CaseFoldingMap<u32, Overwrite> = CaseFoldingMap::new(true);
		map.insert('Q', 9);
		map.insert('q', 1);
		map.compact().unwrap();
		assert_eq!(map.get('q'), Some(&9));
		assert_eq!(map.len(), 1);
	}

	#[test]
	fn compact_with_reject_fails_loudly() {
		let mut map: CaseFoldingMap<f32, Reject> = CaseFoldingMap::new(true);
		map.insert('Z', 0.5);
		map.insert('z', 0.5);
		assert_eq!(map.compact(), Err(Error::IllegalMerge('z')));
		assert_eq!(map.len(), 2);
	}

	#[test]
	fn merge_all_combines_occurrence_lists() {
		let mut left: CaseFoldingMap<OccurrenceList> = CaseFoldingMap::new(false);
		left.insert('a', OccurrenceList::from_counts(&[1]));
		let mut right: CaseFoldingMap<OccurrenceList> = CaseFoldingMap::new(true);
		right.insert('A', OccurrenceList::from_counts(&[0, 2]));
		right.insert('c', OccurrenceList::from_counts(&[4]));

		left.merge_all(&right).unwrap();
		assert_eq!(left.get('a').unwrap().counts(), &[1, 2]);
		assert_eq!(left.get('c').unwrap().total(), 4);
	}

	#[test]
	fn additive_counts_saturate() {
		let mut map: CaseFoldingMap<u32> = CaseFoldingMap::new(true);
		map.insert('A', u32::MAX);
		map.insert('a', 3);
		map.compact().unwrap();
		assert_eq!(map.get('a'), Some(&u32::MAX));
	}

	#[test]
	fn fold_char_keeps_multi_char_lowercase() {
		assert_eq!(fold_char('Ä'), 'ä');
		assert_eq!(fold_char('x'), 'x');
		assert_eq!(fold_char('İ'), 'İ');
	}
}
