use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single named tunable and its new value, for `StatsCruncher::configure`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Factor {
	/// Recency weighting of the aging fold, in [0, 1].
	CloseCharacterPreference(f32),
	/// Multiplier applied to the weight of the last character, >= 0.
	SameCharacterWeightAdjust(f32),
	/// Raw end-of-word score treated as certainty, in [0, 1].
	EowFactorThreshold(f32),
	/// Number of trailing characters used as cache key, >= 1.
	EndingLength(usize),
	/// Capacity of the permanent cache tier.
	PrimaryCacheSize(usize),
	/// Capacity of the evictable cache tier.
	SecondaryCacheSize(usize),
}

/// Tunables of the recommendation and end-of-word computations.
///
/// # Invariants
/// - Every field lies within the range checked by its setter
/// - A freshly created value holds the defaults
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CrunchFactors {
	/// Recency weighting of the aging fold, in [0, 1]. Default 0.5.
	close_character_preference: f32,
	/// Multiplier on the weight of the last character, >= 0. Default 0.85.
	same_character_weight_adjust: f32,
	/// Raw end-of-word score treated as certainty, in [0, 1]. Default 1.0.
	eow_factor_threshold: f32,
	/// Trailing characters reduced once and cached, >= 1. Default 2.
	ending_length: usize,
	/// Capacity of the permanent cache tier. Default 32.
	primary_cache_size: usize,
	/// Capacity of the evictable cache tier. Default 32.
	secondary_cache_size: usize,
}

impl Default for CrunchFactors {
	fn default() -> Self {
		Self {
			close_character_preference: 0.5,
			same_character_weight_adjust: 0.85,
			eow_factor_threshold: 1.0,
			ending_length: 2,
			primary_cache_size: 32,
			secondary_cache_size: 32,
		}
	}
}

impl CrunchFactors {
	/// Current recency weighting.
	pub fn close_character_preference(&self) -> f32 {
		self.close_character_preference
	}

	/// Current multiplier on the last character.
	pub fn same_character_weight_adjust(&self) -> f32 {
		self.same_character_weight_adjust
	}

	/// Current end-of-word threshold.
	pub fn eow_factor_threshold(&self) -> f32 {
		self.eow_factor_threshold
	}

	/// Current ending length.
	pub fn ending_length(&self) -> usize {
		self.ending_length
	}

	/// Current primary cache capacity.
	pub fn primary_cache_size(&self) -> usize {
		self.primary_cache_size
	}

	/// Current secondary cache capacity.
	pub fn secondary_cache_size(&self) -> usize {
		self.secondary_cache_size
	}

	/// Sets how strongly characters near the end of a sequence dominate.
	///
	/// 1.0 keeps only the nearest observation, values near 0.0 flatten every
	/// weight toward zero. The weight of the sample at distance `i` is roughly
	/// `pref * (1 - pref)^i`.
	///
	/// # Errors
	/// Returns an error if the value is outside [0.0, 1.0].
	pub fn set_close_character_preference(&mut self, value: f32) -> Result<()> {
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::out_of_range("close character preference", value, "between 0.0 and 1.0"));
		}
		self.close_character_preference = value;
		Ok(())
	}

	/// Sets the multiplier discouraging (< 1.0) or encouraging (> 1.0) runs of
	/// the same character.
	///
	/// # Errors
	/// Returns an error if the value is negative or NaN.
	pub fn set_same_character_weight_adjust(&mut self, value: f32) -> Result<()> {
		if !(value >= 0.0) {
			return Err(Error::out_of_range("same character weight adjust", value, "0.0 or greater"));
		}
		self.same_character_weight_adjust = value;
		Ok(())
	}

	/// Sets the raw end-of-word score mapped to 1.0.
	///
	/// Lower thresholds end words sooner.
	///
	/// # Errors
	/// Returns an error if the value is outside [0.0, 1.0].
	pub fn set_eow_factor_threshold(&mut self, value: f32) -> Result<()> {
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::out_of_range("end-of-word threshold", value, "between 0.0 and 1.0"));
		}
		self.eow_factor_threshold = value;
		Ok(())
	}

	/// Sets the length of the cached word ending.
	///
	/// # Errors
	/// Returns an error if `length` is 0.
	pub fn set_ending_length(&mut self, length: usize) -> Result<()> {
		if length < 1 {
			return Err(Error::out_of_range("ending length", length as f64, "1 or greater"));
		}
		self.ending_length = length;
		Ok(())
	}

	/// Sets the primary cache capacity. 0 disables promotion.
	pub fn set_primary_cache_size(&mut self, size: usize) {
		self.primary_cache_size = size;
	}

	/// Sets the secondary cache capacity. 0 disables caching altogether.
	pub fn set_secondary_cache_size(&mut self, size: usize) {
		self.secondary_cache_size = size;
	}

	/// Applies a named factor.
	///
	/// # Errors
	/// Returns the setter's error; the factors are left unchanged.
	pub fn apply(&mut self, factor: Factor) -> Result<()> {
		match factor {
			Factor::CloseCharacterPreference(v) => self.set_close_character_preference(v),
			Factor::SameCharacterWeightAdjust(v) => self.set_same_character_weight_adjust(v),
			Factor::EowFactorThreshold(v) => self.set_eow_factor_threshold(v),
			Factor::EndingLength(n) => self.set_ending_length(n),
			Factor::PrimaryCacheSize(n) => {
				self.set_primary_cache_size(n);
				Ok(())
			}
			Factor::SecondaryCacheSize(n) => {
				self.set_secondary_cache_size(n);
				Ok(())
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let factors = CrunchFactors::default();
		assert_eq!(factors.close_character_preference(), 0.5);
		assert_eq!(factors.same_character_weight_adjust(), 0.85);
		assert_eq!(factors.eow_factor_threshold(), 1.0);
		assert_eq!(factors.ending_length(), 2);
		assert_eq!(factors.primary_cache_size(), 32);
		assert_eq!(factors.secondary_cache_size(), 32);
	}

	#[test]
	fn out_of_range_values_leave_factors_unchanged() {
		let mut factors = CrunchFactors::default();
		assert!(factors.set_close_character_preference(1.5).is_err());
		assert!(factors.set_close_character_preference(f32::NAN).is_err());
		assert!(factors.set_same_character_weight_adjust(-0.1).is_err());
		assert!(factors.set_eow_factor_threshold(-1.0).is_err());
		assert!(factors.apply(Factor::EndingLength(0)).is_err());
		assert_eq!(factors, CrunchFactors::default());
	}

	#[test]
	fn apply_named_factors() {
		let mut factors = CrunchFactors::default();
		factors.apply(Factor::CloseCharacterPreference(0.9)).unwrap();
		factors.apply(Factor::SameCharacterWeightAdjust(2.0)).unwrap();
		factors.apply(Factor::EndingLength(3)).unwrap();
		factors.apply(Factor::SecondaryCacheSize(0)).unwrap();
		assert_eq!(factors.close_character_preference(), 0.9);
		assert_eq!(factors.same_character_weight_adjust(), 2.0);
		assert_eq!(factors.ending_length(), 3);
		assert_eq!(factors.secondary_cache_size(), 0);
	}
}
