use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use super::profile::CharacterProfile;
use crate::error::{Error, Result};
use crate::structure::char_map::{fold_char, Additive, CaseFoldingMap};
use crate::structure::occurrence_list::OccurrenceList;
use crate::structure::weights::{CountMap, InfluenceMap};

/// Statistics learned from training text.
///
/// The library owns one `CharacterProfile` per observed character, the
/// distribution of word lengths and the counts of first characters.
///
/// # Responsibilities
/// - Ingest words and lines of training text
/// - Answer influence-map queries for candidate sequences
/// - Remember which words were seen, so generated words can be checked for novelty
///
/// # Invariants
/// - Every profile uses the library's case policy
/// - `word_lengths` is indexed by `length - 1`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StatsLibrary {
	/// One profile per observed character.
	profiles: CaseFoldingMap<CharacterProfile, Additive>,
	/// How many words started with each character.
	first_characters: CountMap,
	/// Word length distribution, index `n` holding words of length `n + 1`.
	word_lengths: OccurrenceList,
	/// Every distinct ingested word, normalized to the case policy.
	words: HashSet<String>,
}

impl Default for StatsLibrary {
	fn default() -> Self {
		Self::new(true)
	}
}

impl StatsLibrary {
	/// Creates an empty library.
	///
	/// With `case_sensitive == false` every ingested word and every query is
	/// folded to lower case.
	pub fn new(case_sensitive: bool) -> Self {
		Self {
			profiles: CaseFoldingMap::new(case_sensitive),
			first_characters: CountMap::new(case_sensitive),
			word_lengths: OccurrenceList::new(),
			words: HashSet::new(),
		}
	}

	/// Whether `'A'` and `'a'` are learned separately.
	pub fn is_case_sensitive(&self) -> bool {
		self.profiles.is_case_sensitive()
	}

	/// Changes the case policy of the library and every profile.
	///
	/// Entries stored under upper-case keys stay separate until `compact`.
	pub fn set_case_sensitive(&mut self, case_sensitive: bool) {
		self.profiles.set_case_sensitive(case_sensitive);
		self.first_characters.set_case_sensitive(case_sensitive);
		for profile in self.profiles.values_mut() {
			profile.set_case_sensitive(case_sensitive);
		}
	}

	/// Folds every upper-case entry into its lower-case counterpart.
	///
	/// Only meaningful after switching a populated library to case-insensitive.
	/// Profiles re-keyed under a folded character are folded as well.
	pub fn compact(&mut self) -> Result<()> {
		// Whole profiles first, then the correlation keys inside each one
		self.profiles.compact()?;
		for profile in self.profiles.values_mut() {
			profile.compact()?;
		}
		self.first_characters.compact()?;

		// Seen words are plain strings, fold them directly
		if !self.is_case_sensitive() {
			self.words = self.words.iter().map(|w| w.chars().map(fold_char).collect::<String>()).collect();
		}
		debug!("compacted library to {} characters", self.profiles.len());
		Ok(())
	}

	fn normalize(&self, text: &str) -> Vec<char> {
		if self.is_case_sensitive() {
			text.chars().collect()
		} else {
			text.chars().map(fold_char).collect()
		}
	}

	/// Adds a single word to the statistics.
	///
	/// Empty words are ignored. The word is either fully ingested or not at all.
	///
	/// # Errors
	/// Returns `ProfileMismatch` if a stored profile no longer matches the key
	/// it is filed under (a case switch without `compact`). Nothing is
	/// recorded in that case.
	pub fn parse_word(&mut self, word: &str) -> Result<()> {
		let chars = self.normalize(word);
		let Some(&first) = chars.first() else {
			return Ok(());
		};
		let case_sensitive = self.is_case_sensitive();

		// Check every profile before touching any counter
		for &c in &chars {
			if let Some(profile) = self.profiles.get(c).filter(|p| !p.accepts(c)) {
				return Err(Error::ProfileMismatch { expected: profile.character(), found: c });
			}
		}

		self.words.insert(chars.iter().collect());
		self.word_lengths.increment(chars.len() - 1);
		self.first_characters.increment(first, 1);

		for (index, &c) in chars.iter().enumerate() {
			self.profiles
				.entry_or_insert_with(c, || CharacterProfile::new(c, case_sensitive))
				.observe(&chars, index)?;
		}
		Ok(())
	}

	/// Splits `line` on whitespace and on any character of `delimiters`, then
	/// ingests every non-empty token.
	///
	/// Returns the number of ingested words.
	pub fn parse_line(&mut self, line: &str, delimiters: &str) -> Result<usize> {
		let mut count = 0;
		for word in line
			.split(|c: char| c.is_whitespace() || delimiters.contains(c))
			.filter(|w| !w.is_empty())
		{
			self.parse_word(word)?;
			count += 1;
		}
		Ok(count)
	}

	/// Same as `parse_line` with whitespace as the only separator.
	pub fn parse_line_whitespace(&mut self, line: &str) -> Result<usize> {
		self.parse_line(line, "")
	}

	/// Influence map of the whole `sequence`.
	pub fn influence_map(&self, sequence: &str) -> InfluenceMap {
		self.influence_map_with_offset(sequence, 0)
	}

	/// Aggregates the correlation data of `sequence` into candidate next
	/// characters.
	///
	/// Walking backward from the end, the character at distance `p` from the
	/// end contributes every correlation it has at gap index `p`, which is the
	/// slot right after the sequence. Counts land at index `p` of the result.
	///
	/// The last `offset` characters are skipped.
	pub fn influence_map_with_offset(&self, sequence: &str, offset: usize) -> InfluenceMap {
		let chars: Vec<char> = sequence.chars().collect();
		let len = chars.len();
		let mut results = InfluenceMap::new(self.is_case_sensitive());
		if offset >= len {
			return results;
		}

		// Distance from the end also selects the correlation gap to read
		for i in (0..len - offset).rev() {
			let position = len - 1 - i;
			let Some(profile) = self.profiles.get(chars[i]) else {
				continue;
			};
			for (c, list) in profile.correlations_at_distance(position) {
				results
					.entry_or_insert_with(c, OccurrenceList::new)
					.increment_by(position, list.count(position));
			}
		}
		results
	}

	/// Profile of `c`, folded when the library is case-insensitive.
	pub fn profile(&self, c: char) -> Option<&CharacterProfile> {
		self.profiles.get(c)
	}

	/// Every profile, in character order.
	pub fn profiles(&self) -> impl Iterator<Item = &CharacterProfile> {
		self.profiles.values()
	}

	/// Characters with a profile, in code order.
	pub fn alphabet(&self) -> Vec<char> {
		self.profiles.alphabet()
	}

	/// Word length distribution, index `n` holding words of length `n + 1`.
	pub fn word_lengths(&self) -> &OccurrenceList {
		&self.word_lengths
	}

	/// How many words started with each character.
	pub fn first_character_counts(&self) -> &CountMap {
		&self.first_characters
	}

	/// Number of ingested words, duplicates included.
	pub fn word_count(&self) -> u64 {
		self.word_lengths.total()
	}

	/// Whether `word` was part of the training text.
	pub fn contains_word(&self, word: &str) -> bool {
		let key: String = self.normalize(word).into_iter().collect();
		self.words.contains(&key)
	}

	/// Drops every statistic, keeping the case policy.
	pub fn clear(&mut self) {
		self.profiles.clear();
		self.first_characters.clear();
		self.word_lengths = OccurrenceList::new();
		self.words.clear();
		debug!("library cleared");
	}
}
