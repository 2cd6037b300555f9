use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::structure::char_map::{fold_char, Accumulate};
use crate::structure::occurrence_list::OccurrenceList;
use crate::structure::weights::InfluenceMap;

/// Positional and co-occurrence statistics of a single character.
///
/// A `CharacterProfile` records, for every training word containing its
/// character:
/// - the 0-based distance from the start of the word
/// - the 0-based distance from the end of the word
/// - for every character `C` found later in the word, the gap to `C`
///   (stored at index `gap - 1`, so an adjacent `C` lands at index 0)
///
/// ## Invariants
/// - `correlations` uses the same case policy as the owning library
/// - `occurrences` equals the total of `start_distances`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CharacterProfile {
	/// Character described by this profile, in the form it was first seen.
	character: char,
	/// Number of observations.
	occurrences: u64,
	/// Distance from the first character of the word.
	start_distances: OccurrenceList,
	/// Distance from the last character of the word (0 for the last one).
	end_distances: OccurrenceList,
	/// Later characters, each with the gaps it was found at.
	/// Example: in "abc", 'a' holds { 'b' => [1], 'c' => [0, 1] }
	correlations: InfluenceMap,
}

impl CharacterProfile {
	/// Creates an empty profile for `character`.
	pub fn new(character: char, case_sensitive: bool) -> Self {
		Self {
			character,
			occurrences: 0,
			start_distances: OccurrenceList::new(),
			end_distances: OccurrenceList::new(),
			correlations: InfluenceMap::new(case_sensitive),
		}
	}

	/// Character described by this profile.
	pub fn character(&self) -> char {
		self.character
	}

	/// Whether `c` is this profile's character under the current case policy.
	pub fn accepts(&self, c: char) -> bool {
		self.correlations.key(c) == self.correlations.key(self.character)
	}

	/// Number of times this character has been observed.
	pub fn occurrences(&self) -> u64 {
		self.occurrences
	}

	/// Case policy of the correlation keys.
	pub fn is_case_sensitive(&self) -> bool {
		self.correlations.is_case_sensitive()
	}

	/// Switches the case policy of the correlation keys. See `compact`.
	pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
		self.correlations.set_case_sensitive(case_sensitive);
	}

	/// Records the occurrence of this character at `word[index]`.
	///
	/// # Errors
	/// - `IndexOutOfBounds` if `index` is past the end of `word`
	/// - `ProfileMismatch` if `word[index]` is another character
	pub fn observe(&mut self, word: &[char], index: usize) -> Result<()> {
		let found = *word.get(index).ok_or(Error::IndexOutOfBounds { index, len: word.len() })?;
		if !self.accepts(found) {
			return Err(Error::ProfileMismatch { expected: self.character, found });
		}

		self.occurrences += 1;
		self.start_distances.increment(index);
		self.end_distances.increment(word.len() - index - 1);

		// Gap index 0 is the character right after this one
		for (gap, &next) in word[index + 1..].iter().enumerate() {
			self.correlations
				.entry_or_insert_with(next, OccurrenceList::new)
				.increment(gap);
		}
		Ok(())
	}

	/// Histogram of distances from the start of the word.
	pub fn start_distances(&self) -> &OccurrenceList {
		&self.start_distances
	}

	/// Histogram of distances from the end of the word.
	pub fn end_distances(&self) -> &OccurrenceList {
		&self.end_distances
	}

	/// Gaps recorded between this character and a later `c`.
	pub fn correlations(&self, c: char) -> Option<&OccurrenceList> {
		self.correlations.get(c)
	}

	/// Every correlation, keyed by the later character.
	pub fn all_correlations(&self) -> &InfluenceMap {
		&self.correlations
	}

	/// Correlations with a non-zero count at exactly `distance`.
	pub fn correlations_at_distance(&self, distance: usize) -> impl Iterator<Item = (char, &OccurrenceList)> {
		self.correlations
			.iter()
			.filter(move |(_, list)| list.count(distance) != 0)
	}

	/// Creates an empty correlation list for `c` if none exists yet.
	pub fn prepare(&mut self, c: char) {
		self.correlations.entry_or_insert_with(c, OccurrenceList::new);
	}

	/// Zeroes the correlation counts toward `c`.
	pub fn reset_correlation(&mut self, c: char) {
		if let Some(list) = self.correlations.get_mut(c) {
			list.clear();
		}
	}

	/// Drops every statistic, keeping the character and case policy.
	pub fn reset(&mut self) {
		self.occurrences = 0;
		self.start_distances.clear();
		self.end_distances.clear();
		self.correlations.clear();
	}

	/// Folds upper-case correlation keys into their lower-case siblings.
	///
	/// When the profile is case-insensitive, its own character is folded too,
	/// so it keeps matching the key it is stored under.
	pub fn compact(&mut self) -> Result<()> {
		self.correlations.compact()?;
		if !self.is_case_sensitive() {
			self.character = fold_char(self.character);
		}
		Ok(())
	}

	/// Adds every statistic of `other` into this profile.
	pub fn merge(&mut self, other: &Self) {
		self.occurrences += other.occurrences;
		self.start_distances.merge(&other.start_distances);
		self.end_distances.merge(&other.end_distances);
		for (c, list) in other.correlations.iter() {
			self.correlations
				.entry_or_insert_with(c, OccurrenceList::new)
				.merge(list);
		}
	}
}

impl Accumulate for CharacterProfile {
	fn accumulate(&mut self, other: &Self) {
		self.merge(other);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chars(s: &str) -> Vec<char> {
		s.chars().collect()
	}

	#[test]
	fn observe_records_positions_and_gaps() {
		let word = chars("abcb");
		let mut profile = CharacterProfile::new('b', true);
		profile.observe(&word, 1).unwrap();
		profile.observe(&word, 3).unwrap();

		assert_eq!(profile.occurrences(), 2);
		assert_eq!(profile.start_distances().counts(), &[0, 1, 0, 1]);
		assert_eq!(profile.end_distances().counts(), &[1, 0, 1]);
		assert_eq!(profile.correlations('c').unwrap().counts(), &[1]);
		assert_eq!(profile.correlations('b').unwrap().counts(), &[0, 1]);
		assert!(profile.correlations('a').is_none());
	}

	#[test]
	fn observe_rejects_other_characters() {
		let word = chars("xy");
		let mut profile = CharacterProfile::new('x', true);
		assert_eq!(
			profile.observe(&word, 1),
			Err(Error::ProfileMismatch { expected: 'x', found: 'y' })
		);
		assert_eq!(profile.observe(&word, 2), Err(Error::IndexOutOfBounds { index: 2, len: 2 }));
		assert_eq!(profile.occurrences(), 0);
	}

	#[test]
	fn observe_folds_case_when_insensitive() {
		let word = chars("Ab");
		let mut profile = CharacterProfile::new('a', false);
		profile.observe(&word, 0).unwrap();
		assert_eq!(profile.occurrences(), 1);
		assert!(profile.correlations('B').is_some());
	}

	#[test]
	fn compact_folds_own_character() {
		let mut profile = CharacterProfile::new('A', true);
		profile.observe(&chars("AB"), 0).unwrap();
		profile.set_case_sensitive(false);
		profile.compact().unwrap();
		assert_eq!(profile.character(), 'a');
		assert_eq!(profile.all_correlations().alphabet(), vec!['b']);

		profile.set_case_sensitive(true);
		assert!(profile.accepts('a'));
		assert!(!profile.accepts('A'));
	}

	#[test]
	fn correlations_at_distance_filters_zero_counts() {
		let mut profile = CharacterProfile::new('a', true);
		profile.observe(&chars("abc"), 0).unwrap();
		profile.observe(&chars("axb"), 0).unwrap();

		let at_zero: Vec<char> = profile.correlations_at_distance(0).map(|(c, _)| c).collect();
		assert_eq!(at_zero, vec!['b', 'x']);
		let at_one: Vec<char> = profile.correlations_at_distance(1).map(|(c, _)| c).collect();
		assert_eq!(at_one, vec!['b', 'c']);
	}

	#[test]
	fn merge_adds_everything() {
		let mut left = CharacterProfile::new('a', true);
		left.observe(&chars("ab"), 0).unwrap();
		let mut right = CharacterProfile::new('a', true);
		right.observe(&chars("xab"), 1).unwrap();
		right.observe(&chars("ac"), 0).unwrap();

		left.merge(&right);
		assert_eq!(left.occurrences(), 3);
		assert_eq!(left.start_distances().counts(), &[2, 1]);
		assert_eq!(left.correlations('b').unwrap().total(), 2);
		assert_eq!(left.correlations('c').unwrap().total(), 1);
	}

	#[test]
	fn reset_and_prepare() {
		let mut profile = CharacterProfile::new('a', true);
		profile.observe(&chars("ab"), 0).unwrap();
		profile.reset_correlation('b');
		assert_eq!(profile.correlations('b').unwrap().total(), 0);
		profile.prepare('z');
		assert!(profile.correlations('z').unwrap().is_empty());
		profile.reset();
		assert_eq!(profile.occurrences(), 0);
		assert!(profile.all_correlations().is_empty());
	}
}
