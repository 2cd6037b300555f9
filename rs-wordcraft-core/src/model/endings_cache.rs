use std::collections::{BTreeMap, VecDeque};

use log::trace;

use crate::structure::weights::WeightMap;

/// Cache activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
	/// Lookups answered by the primary tier.
	pub primary_hits: u64,
	/// Lookups answered by the secondary tier, promoted or not.
	pub secondary_hits: u64,
	/// Lookups answered by neither tier.
	pub misses: u64,
	/// Entries moved from the secondary to the primary tier.
	pub promotions: u64,
	/// Entries dropped from the secondary tier.
	pub evictions: u64,
}

impl CacheStats {
	/// Share of lookups answered by either tier, 0.0 before any lookup.
	pub fn hit_rate(&self) -> f64 {
		let hits = self.primary_hits + self.secondary_hits;
		let total = hits + self.misses;
		if total == 0 { 0.0 } else { hits as f64 / total as f64 }
	}
}

/// Two-tier cache of reduced recommendation maps, keyed by word ending.
///
/// - Secondary tier: bounded, newest entry at the front, full inserts drop the
///   oldest entry
/// - Primary tier: kept until cleared, only filled by promoting a secondary hit
///   while it has room
///
/// An ending therefore has to be requested twice before it becomes permanent.
#[derive(Debug, Clone, Default)]
pub struct EndingsCache {
	/// Permanent tier, ordered by ending.
	primary: BTreeMap<String, WeightMap>,
	/// Evictable tier, newest entry at the front.
	secondary: VecDeque<(String, WeightMap)>,
	/// Promotions stop once `primary` holds this many entries.
	primary_capacity: usize,
	/// Maximum length of `secondary`.
	secondary_capacity: usize,
	/// Activity counters, never reset by `clear`.
	stats: CacheStats,
}

impl EndingsCache {
	/// Creates an empty cache with the given tier capacities.
	pub fn new(primary_capacity: usize, secondary_capacity: usize) -> Self {
		Self {
			primary: BTreeMap::new(),
			secondary: VecDeque::with_capacity(secondary_capacity),
			primary_capacity,
			secondary_capacity,
			stats: CacheStats::default(),
		}
	}

	/// Looks up `ending`, promoting a secondary hit into the primary tier when
	/// the primary tier has room.
	pub fn get(&mut self, ending: &str) -> Option<WeightMap> {
		if let Some(map) = self.primary.get(ending) {
			self.stats.primary_hits += 1;
			trace!("primary cache hit for {:?}", ending);
			return Some(map.clone());
		}

		// Linear scan, the secondary tier is small
		let Some(position) = self.secondary.iter().position(|(key, _)| key == ending) else {
			self.stats.misses += 1;
			return None;
		};
		self.stats.secondary_hits += 1;

		if self.primary.len() < self.primary_capacity {
			let (key, map) = self.secondary.remove(position)?;
			trace!("promoting {:?} to the primary cache", key);
			self.stats.promotions += 1;
			self.primary.insert(key, map.clone());
			return Some(map);
		}
		trace!("secondary cache hit for {:?}", ending);
		Some(self.secondary[position].1.clone())
	}

	/// Pushes a freshly computed map to the front of the secondary tier.
	pub fn insert(&mut self, ending: String, map: WeightMap) {
		if self.secondary_capacity == 0 {
			return;
		}
		self.secondary.push_front((ending, map));
		self.evict_overflow();
	}

	/// Drops entries from the back until the secondary tier fits its capacity.
	fn evict_overflow(&mut self) {
		while self.secondary.len() > self.secondary_capacity {
			if let Some((key, _)) = self.secondary.pop_back() {
				trace!("evicting {:?} from the secondary cache", key);
				self.stats.evictions += 1;
			}
		}
	}

	/// Changes the primary capacity. Existing entries are never evicted, the
	/// tier just stops accepting promotions while it is at or over the limit.
	pub fn set_primary_capacity(&mut self, capacity: usize) {
		self.primary_capacity = capacity;
	}

	/// Changes the secondary capacity, evicting the oldest entries at once when
	/// shrinking.
	pub fn set_secondary_capacity(&mut self, capacity: usize) {
		self.secondary_capacity = capacity;
		self.evict_overflow();
	}

	/// Keys of the primary tier, in order.
	pub fn primary_contents(&self) -> Vec<String> {
		self.primary.keys().cloned().collect()
	}

	/// Keys of the secondary tier, newest first.
	pub fn secondary_contents(&self) -> Vec<String> {
		self.secondary.iter().map(|(key, _)| key.clone()).collect()
	}

	/// Empties both tiers and returns the number of dropped entries.
	pub fn clear(&mut self) -> usize {
		let dropped = self.primary.len() + self.secondary.len();
		self.primary.clear();
		self.secondary.clear();
		dropped
	}

	/// Snapshot of the activity counters.
	pub fn stats(&self) -> CacheStats {
		self.stats
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn map(c: char) -> WeightMap {
		let mut map = WeightMap::new(true);
		map.insert(c, 1.0);
		map
	}

	#[test]
	fn second_request_promotes() {
		let mut cache = EndingsCache::new(4, 4);
		assert!(cache.get("ab").is_none());
		cache.insert("ab".to_owned(), map('c'));
		assert_eq!(cache.secondary_contents(), vec!["ab"]);
		assert!(cache.primary_contents().is_empty());

		assert_eq!(cache.get("ab"), Some(map('c')));
		assert_eq!(cache.primary_contents(), vec!["ab"]);
		assert!(cache.secondary_contents().is_empty());

		assert!(cache.get("ab").is_some());
		let stats = cache.stats();
		assert_eq!((stats.misses, stats.secondary_hits, stats.primary_hits), (1, 1, 1));
		assert_eq!(stats.promotions, 1);
	}

	#[test]
	fn full_primary_serves_from_secondary() {
		let mut cache = EndingsCache::new(0, 4);
		cache.insert("ab".to_owned(), map('c'));
		assert!(cache.get("ab").is_some());
		assert!(cache.get("ab").is_some());
		assert!(cache.primary_contents().is_empty());
		assert_eq!(cache.secondary_contents(), vec!["ab"]);
	}

	#[test]
	fn secondary_drops_oldest() {
		let mut cache = EndingsCache::new(4, 2);
		cache.insert("aa".to_owned(), map('a'));
		cache.insert("bb".to_owned(), map('b'));
		cache.insert("cc".to_owned(), map('c'));
		assert_eq!(cache.secondary_contents(), vec!["cc", "bb"]);
		assert_eq!(cache.stats().evictions, 1);
	}

	#[test]
	fn shrinking_secondary_evicts_immediately() {
		let mut cache = EndingsCache::new(4, 4);
		for key in ["aa", "bb", "cc"] {
			cache.insert(key.to_owned(), map('x'));
		}
		cache.set_secondary_capacity(1);
		assert_eq!(cache.secondary_contents(), vec!["cc"]);
		cache.set_secondary_capacity(0);
		assert!(cache.secondary_contents().is_empty());
		cache.insert("dd".to_owned(), map('x'));
		assert!(cache.secondary_contents().is_empty());
	}

	#[test]
	fn shrinking_primary_keeps_entries() {
		let mut cache = EndingsCache::new(4, 4);
		for key in ["aa", "bb"] {
			cache.insert(key.to_owned(), map('x'));
			cache.get(key);
		}
		cache.set_primary_capacity(1);
		assert_eq!(cache.primary_contents(), vec!["aa", "bb"]);

		cache.insert("cc".to_owned(), map('x'));
		cache.get("cc");
		assert_eq!(cache.primary_contents().len(), 2);
		assert_eq!(cache.secondary_contents(), vec!["cc"]);
		assert_eq!(cache.clear(), 3);
	}
}
