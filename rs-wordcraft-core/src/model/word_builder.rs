use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::cruncher::StatsCruncher;
use crate::error::{Error, Result};
use crate::structure::char_map::CaseFoldingMap;

/// Picks a key of `distribution` by weighted random sampling.
///
/// Walks the entries in character order accumulating weights and returns the
/// first key whose running sum reaches a uniform draw in [0, 1). If rounding
/// leaves the total short of the draw, the last key is returned.
///
/// The weights are expected to sum to 1.0. A map whose weights are all 0
/// would always yield its last key, so callers should not sample it.
///
/// Returns `None` for an empty distribution.
pub fn pick_from_distribution<S, R: Rng + ?Sized>(distribution: &CaseFoldingMap<f32, S>, rng: &mut R) -> Option<char> {
	let pick: f32 = rng.random();
	let mut sum = 0.0f32;
	let mut fallback = None;
	for (c, weight) in distribution.iter() {
		sum += weight;
		if sum >= pick {
			return Some(c);
		}
		fallback = Some(c);
	}
	fallback
}

/// Builds words one character at a time from a `StatsCruncher`.
///
/// # Behavior
/// - The first character is drawn from the first-character distribution
/// - Before each append, the last `WINDOW` characters are tested against the
///   end-of-word factor; a successful draw stops the word
/// - Otherwise the recommendations for the window are trimmed, rebalanced and
///   sampled
/// - Reaching `max_length` simply returns the word built so far
///
/// All randomness comes from the builder's own seedable generator.
#[derive(Debug)]
pub struct WordBuilder {
	/// Source of every recommendation and end-of-word factor.
	cruncher: StatsCruncher,
	/// Generator behind every draw, seedable for reproducible output.
	rng: StdRng,
}

impl WordBuilder {
	/// Number of trailing characters used to query the cruncher.
	pub const WINDOW: usize = 6;

	/// Creates a builder seeded from the operating system.
	pub fn new(cruncher: StatsCruncher) -> Self {
		Self { cruncher, rng: StdRng::from_os_rng() }
	}

	/// Creates a reproducible builder.
	pub fn with_seed(cruncher: StatsCruncher, seed: u64) -> Self {
		Self { cruncher, rng: StdRng::seed_from_u64(seed) }
	}

	/// Underlying cruncher, for cache and library inspection.
	pub fn cruncher(&self) -> &StatsCruncher {
		&self.cruncher
	}

	/// Mutable cruncher, for reconfiguration between words.
	pub fn cruncher_mut(&mut self) -> &mut StatsCruncher {
		&mut self.cruncher
	}

	/// Consumes the builder, giving the cruncher back.
	pub fn into_cruncher(self) -> StatsCruncher {
		self.cruncher
	}

	/// Samples a key of `distribution` with the builder's generator.
	pub fn pick_from_distribution<S>(&mut self, distribution: &CaseFoldingMap<f32, S>) -> Option<char> {
		pick_from_distribution(distribution, &mut self.rng)
	}

	/// Generates a single word of at most `max_length` characters.
	///
	/// # Parameters
	/// - `max_length`: hard limit on the word length, 0 yields an empty word.
	/// - `trim_threshold`: recommendations weighing at most this share of the
	///   total are dropped before sampling. Values of 1.0 or more disable trimming.
	///
	/// # Errors
	/// - `OutOfRange` if `trim_threshold` is not positive
	/// - `EmptyDistribution` if no first-character statistics are available
	pub fn generate_word(&mut self, max_length: usize, trim_threshold: f32) -> Result<String> {
		if !(trim_threshold > 0.0) {
			return Err(Error::out_of_range("trim threshold", trim_threshold, "greater than 0.0"));
		}
		if max_length == 0 {
			return Ok(String::new());
		}

		let first = pick_from_distribution(self.cruncher.first_character_distribution(), &mut self.rng)
			.ok_or(Error::EmptyDistribution)?;
		let mut word = vec![first];

		while word.len() < max_length {
			let window: String = word[word.len().saturating_sub(Self::WINDOW)..].iter().collect();

			// Bernoulli draw against the end-of-word factor
			if self.rng.random::<f32>() < self.cruncher.eow_factor(&window) {
				break;
			}

			let mut recommendations = self.cruncher.generate_append_recommendations(&window);
			if trim_threshold < 1.0 {
				recommendations.trim(trim_threshold)?;
			}

			// No candidate, or only candidates weighing 0: nothing to sample
			if !(recommendations.sum() > 0.0) {
				break;
			}
			recommendations.rebalance();

			let Some(next) = pick_from_distribution(&recommendations, &mut self.rng) else {
				break;
			};
			word.push(next);
		}

		let word: String = word.into_iter().collect();
		trace!("generated {:?}", word);
		Ok(word)
	}

	/// Generates `count` words with the same settings.
	pub fn generate_words(&mut self, count: usize, max_length: usize, trim_threshold: f32) -> Result<Vec<String>> {
		(0..count).map(|_| self.generate_word(max_length, trim_threshold)).collect()
	}

	/// Generates a word that is not part of the training text.
	///
	/// Retries up to `tries` times while the word already exists in the
	/// library, then returns the last attempt.
	pub fn generate_novel_word(&mut self, max_length: usize, trim_threshold: f32, tries: usize) -> Result<String> {
		let mut word = self.generate_word(max_length, trim_threshold)?;
		for _ in 0..tries {
			if !self.cruncher.library().contains_word(&word) {
				break;
			}
			word = self.generate_word(max_length, trim_threshold)?;
		}
		Ok(word)
	}
}
