use log::debug;

use super::endings_cache::{CacheStats, EndingsCache};
use super::factors::{CrunchFactors, Factor};
use super::stats_library::StatsLibrary;
use crate::error::Result;
use crate::structure::char_map::fold_char;
use crate::structure::weights::{InfluenceMap, WeightMap};

/// Turns library statistics into next-character recommendations.
///
/// The cruncher reduces influence maps with an aging fold, caches the reduced
/// map of each word ending, and estimates how likely a sequence is to be a
/// complete word.
///
/// # Responsibilities
/// - Own the `StatsLibrary` and the tunables (`CrunchFactors`)
/// - Maintain the two-tier endings cache
/// - Precompute the first-character distribution
///
/// # Notes
/// The cache is not invalidated when the library changes. After ingesting more
/// text through `library_mut`, call `clear_cache` and `recalculate_metrics`.
#[derive(Debug, Clone)]
pub struct StatsCruncher {
	/// Trained statistics.
	library: StatsLibrary,
	/// Tunables, validated on every change.
	factors: CrunchFactors,
	/// Reduced maps of recently requested endings.
	cache: EndingsCache,
	/// First-character distribution, refreshed by `recalculate_metrics`.
	first_characters: WeightMap,
}

impl StatsCruncher {
	/// Creates a cruncher with default factors.
	pub fn new(library: StatsLibrary) -> Self {
		Self::with_factors(library, CrunchFactors::default())
	}

	/// Creates a cruncher with explicit factors.
	///
	/// The cache is sized from `factors` and the first-character distribution
	/// is computed right away.
	pub fn with_factors(library: StatsLibrary, factors: CrunchFactors) -> Self {
		let mut cruncher = Self {
			cache: EndingsCache::new(factors.primary_cache_size(), factors.secondary_cache_size()),
			first_characters: WeightMap::new(library.is_case_sensitive()),
			library,
			factors,
		};
		cruncher.recalculate_metrics();
		cruncher
	}

	/// Trained statistics.
	pub fn library(&self) -> &StatsLibrary {
		&self.library
	}

	/// Mutable access for further ingestion. See the notes on the cache.
	pub fn library_mut(&mut self) -> &mut StatsLibrary {
		&mut self.library
	}

	/// Consumes the cruncher, giving the library back.
	pub fn into_library(self) -> StatsLibrary {
		self.library
	}

	/// Current tunables.
	pub fn factors(&self) -> &CrunchFactors {
		&self.factors
	}

	/// Applies a named factor. Cache sizes take effect immediately.
	///
	/// # Errors
	/// Returns `OutOfRange` when the value is invalid; nothing is changed.
	pub fn configure(&mut self, factor: Factor) -> Result<()> {
		self.factors.apply(factor)?;
		self.sync_cache_capacities();
		debug!("configured {:?}", factor);
		Ok(())
	}

	/// Restores the default factors. The cache contents are kept.
	pub fn reset_factors(&mut self) {
		self.factors = CrunchFactors::default();
		self.sync_cache_capacities();
	}

	/// Pushes the configured cache sizes down to the cache.
	fn sync_cache_capacities(&mut self) {
		self.cache.set_primary_capacity(self.factors.primary_cache_size());
		self.cache.set_secondary_capacity(self.factors.secondary_cache_size());
	}

	/// Recomputes the first-character distribution from the library.
	///
	/// This is comparatively expensive, call it once after bulk ingestion.
	pub fn recalculate_metrics(&mut self) {
		self.first_characters = self.library.first_character_counts().balanced();
		debug!("first-character distribution over {} characters", self.first_characters.len());
	}

	/// Distribution of the first character of a word, summing to 1.0.
	pub fn first_character_distribution(&self) -> &WeightMap {
		&self.first_characters
	}

	/// Endings held by the permanent tier, in order.
	pub fn primary_cache_contents(&self) -> Vec<String> {
		self.cache.primary_contents()
	}

	/// Endings held by the evictable tier, newest first.
	pub fn secondary_cache_contents(&self) -> Vec<String> {
		self.cache.secondary_contents()
	}

	/// Empties both cache tiers, returning the number of dropped entries.
	pub fn clear_cache(&mut self) -> usize {
		let dropped = self.cache.clear();
		debug!("cleared {} cached endings", dropped);
		dropped
	}

	/// Hit, miss, promotion and eviction counters.
	pub fn cache_stats(&self) -> CacheStats {
		self.cache.stats()
	}

	/// Reduces each distance histogram of `map` to a single weight.
	///
	/// The fold runs from the farthest distance to the nearest:
	/// `w = w * (1 - pref) + pref * count[i]`.
	/// The resulting weights are not normalized.
	pub fn reduce_influence_map(&self, map: &InfluenceMap) -> WeightMap {
		let pref = self.factors.close_character_preference();
		let keep = 1.0 - pref;

		let mut results = WeightMap::new(map.is_case_sensitive());
		for (c, list) in map.iter() {
			// Farthest first, so the nearest distance is folded in last and weighs the most
			let weight = list
				.counts()
				.iter()
				.rev()
				.fold(0.0f32, |w, &count| w * keep + pref * count as f32);
			results.insert(c, weight);
		}
		results
	}

	/// Recommends the next character to append to `sequence`.
	///
	/// The trailing `ending_length` characters are reduced once and cached; the
	/// rest of the sequence is reduced on every call and added on top. The
	/// weight of the last character is then scaled by
	/// `same_character_weight_adjust`.
	///
	/// The result is not normalized, so callers may trim before rebalancing.
	pub fn generate_append_recommendations(&mut self, sequence: &str) -> WeightMap {
		let chars: Vec<char> = sequence.chars().collect();
		let Some(&last) = chars.last() else {
			return WeightMap::new(self.library.is_case_sensitive());
		};

		// Split off the ending, the only part worth caching
		let ending_length = self.factors.ending_length();
		let ending: String = chars[chars.len().saturating_sub(ending_length)..].iter().collect();
		let key = if self.library.is_case_sensitive() {
			ending.clone()
		} else {
			ending.chars().map(fold_char).collect()
		};

		// Reduced ending from the cache, computed and stored on a miss
		let mut results = match self.cache.get(&key) {
			Some(map) => map,
			None => {
				let map = self.reduce_influence_map(&self.library.influence_map(&ending));
				self.cache.insert(key, map.clone());
				map
			}
		};

		// The rest of the sequence is never cached, add it on top
		let rest = self.reduce_influence_map(&self.library.influence_map_with_offset(sequence, ending_length));
		for (c, weight) in rest.iter() {
			*results.entry_or_insert_with(c, || 0.0) += *weight;
		}

		// Dampen (or boost) runs of the same character
		if let Some(weight) = results.get_mut(last) {
			*weight *= self.factors.same_character_weight_adjust();
		}
		results
	}

	/// Probability in [0, 1] that `sequence` is a complete word.
	///
	/// Each character contributes the probability of sitting at its current
	/// distance from the end of a training word, folded left to right with the
	/// same aging as `reduce_influence_map`. The raw score is divided by
	/// `eow_factor_threshold` and clamped to 1.0.
	pub fn eow_factor(&self, sequence: &str) -> f32 {
		let pref = self.factors.close_character_preference();
		let keep = 1.0 - pref;
		let chars: Vec<char> = sequence.chars().collect();
		let len = chars.len();

		// Each character is scored at its distance from the end of the sequence.
		// Unknown characters have no mass.
		let raw = chars.iter().enumerate().fold(0.0f32, |score, (i, &c)| {
			let mass = self
				.library
				.profile(c)
				.map_or(0.0, |profile| profile.end_distances().probability_mass(len - i - 1));
			score * keep + pref * mass
		});

		// A zero threshold means every sequence may end
		let threshold = self.factors.eow_factor_threshold();
		if threshold <= 0.0 {
			return 1.0;
		}
		(raw / threshold).clamp(0.0, 1.0)
	}
}
