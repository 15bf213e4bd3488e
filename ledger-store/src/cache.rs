// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// 	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The two bounded LRU caches `LedgerTxnRoot` keeps in front of the backing
//! store (§4.2). A capacity of zero disables the respective cache entirely,
//! which must not change observable behavior (§8 property 6).

use lru::LruCache;

use ledger_core::{Asset, LedgerEntry, LedgerKey};

/// `LedgerKey → Option<LedgerEntry>` (present or known-absent).
pub struct EntryCache {
	inner: Option<LruCache<LedgerKey, Option<LedgerEntry>>>,
}

impl EntryCache {
	pub fn new(capacity: usize) -> Self {
		EntryCache { inner: if capacity == 0 { None } else { Some(LruCache::new(capacity)) } }
	}

	pub fn get(&mut self, key: &LedgerKey) -> Option<Option<LedgerEntry>> {
		self.inner.as_mut()?.get(key).cloned()
	}

	pub fn put(&mut self, key: LedgerKey, value: Option<LedgerEntry>) {
		if let Some(cache) = self.inner.as_mut() {
			cache.put(key, value);
		}
	}

	pub fn invalidate(&mut self, key: &LedgerKey) {
		if let Some(cache) = self.inner.as_mut() {
			cache.pop(key);
		}
	}
}

/// `(buying, selling) → offers sorted by price ascending, offer id ascending`.
pub struct BestOffersCache {
	inner: Option<LruCache<(Asset, Asset), Vec<LedgerEntry>>>,
}

impl BestOffersCache {
	pub fn new(capacity: usize) -> Self {
		BestOffersCache { inner: if capacity == 0 { None } else { Some(LruCache::new(capacity)) } }
	}

	/// Returns the cached ordered offer list for `(buying, selling)`, populating
	/// it from `fetch` on a miss. Bypasses the cache entirely when disabled.
	pub fn get_or_fetch(
		&mut self,
		buying: &Asset,
		selling: &Asset,
		fetch: impl FnOnce() -> Vec<LedgerEntry>,
	) -> Vec<LedgerEntry> {
		let cache = match self.inner.as_mut() {
			Some(cache) => cache,
			None => return fetch(),
		};
		let pair = (buying.clone(), selling.clone());
		if let Some(cached) = cache.get(&pair) {
			return cached.clone();
		}
		let fetched = fetch();
		cache.put(pair, fetched.clone());
		fetched
	}

	pub fn invalidate(&mut self, buying: &Asset, selling: &Asset) {
		if let Some(cache) = self.inner.as_mut() {
			cache.pop(&(buying.clone(), selling.clone()));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_capacity_entry_cache_never_caches() {
		let mut cache = EntryCache::new(0);
		cache.put(LedgerKey::Account(ledger_core::AccountId::from("GABC")), None);
		assert_eq!(cache.get(&LedgerKey::Account(ledger_core::AccountId::from("GABC"))), None);
	}

	#[test]
	fn best_offers_cache_hits_after_first_fetch() {
		let mut cache = BestOffersCache::new(8);
		let mut fetch_calls = 0;
		let pair = (Asset::Native, Asset::Native);
		for _ in 0..3 {
			cache.get_or_fetch(&pair.0, &pair.1, || {
				fetch_calls += 1;
				Vec::new()
			});
		}
		assert_eq!(fetch_calls, 1);
	}
}
