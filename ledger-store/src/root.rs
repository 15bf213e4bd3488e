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

//! `LedgerTxnRoot`: the concrete parent bound to a [`PersistentStore`], with
//! bounded LRU caches in front of it (§4.2).

use std::cell::RefCell;
use std::collections::HashSet;

use log::{debug, trace, warn};

use ledger_core::{
	AccountId, Asset, EntryStore, EntryStoreParent, LedgerEntry, LedgerHeader, LedgerKey, LedgerTxnDelta,
	LedgerTxnError, LedgerTxnResult,
};

use crate::backend::PersistentStore;
use crate::cache::{BestOffersCache, EntryCache};

fn offer_key(entry: &LedgerEntry) -> LedgerKey {
	let offer = entry.as_offer().expect("candidate is always an offer entry");
	LedgerKey::Offer(offer.seller_id.clone(), offer.offer_id)
}

/// The backing-store adapter every top-level `LedgerTxn` is opened against.
pub struct LedgerTxnRoot<S: PersistentStore> {
	store: S,
	entry_cache: RefCell<EntryCache>,
	best_offers_cache: RefCell<BestOffersCache>,
	has_child: RefCell<bool>,
}

impl<S: PersistentStore> LedgerTxnRoot<S> {
	/// The default entry cache size, used by [`Self::with_defaults`].
	pub const DEFAULT_ENTRY_CACHE_SIZE: usize = 4096;
	/// The default best-offers cache size, used by [`Self::with_defaults`].
	pub const DEFAULT_BEST_OFFERS_CACHE_SIZE: usize = 128;

	/// Builds a root over `store` with explicit cache sizes. `0` disables the
	/// respective cache (§4.2, §6 configuration surface).
	pub fn new(store: S, entry_cache_size: usize, best_offers_cache_size: usize) -> Self {
		LedgerTxnRoot {
			store,
			entry_cache: RefCell::new(EntryCache::new(entry_cache_size)),
			best_offers_cache: RefCell::new(BestOffersCache::new(best_offers_cache_size)),
			has_child: RefCell::new(false),
		}
	}

	/// Builds a root over `store` with the default cache sizes.
	pub fn with_defaults(store: S) -> Self {
		Self::new(store, Self::DEFAULT_ENTRY_CACHE_SIZE, Self::DEFAULT_BEST_OFFERS_CACHE_SIZE)
	}

	/// The wrapped store, for callers that need to inspect it directly (tests,
	/// diagnostics).
	pub fn store(&self) -> &S {
		&self.store
	}

	fn invalidate_for(&self, delta: &LedgerTxnDelta) {
		let mut entry_cache = self.entry_cache.borrow_mut();
		let mut best_offers_cache = self.best_offers_cache.borrow_mut();
		for (key, entry_delta) in &delta.entries {
			entry_cache.invalidate(key);
			trace!("invalidated entry cache for {:?}", key);
			for side in [&entry_delta.current, &entry_delta.previous] {
				if let Some(offer) = side.as_ref().and_then(LedgerEntry::as_offer) {
					best_offers_cache.invalidate(&offer.buying, &offer.selling);
				}
			}
		}
	}
}

impl<S: PersistentStore> EntryStore for LedgerTxnRoot<S> {
	fn get_header(&self) -> LedgerHeader {
		self.store.get_header()
	}

	fn get_entry(&self, key: &LedgerKey) -> Option<LedgerEntry> {
		if let Some(cached) = self.entry_cache.borrow_mut().get(key) {
			trace!("entry cache hit for {:?}", key);
			return cached;
		}
		debug!("entry cache miss for {:?}", key);
		let value = self.store.get_entry(key);
		self.entry_cache.borrow_mut().put(key.clone(), value.clone());
		value
	}

	fn get_best_offer(
		&self,
		buying: &Asset,
		selling: &Asset,
		excluding: &HashSet<LedgerKey>,
	) -> Option<LedgerEntry> {
		let store = &self.store;
		let candidates = self.best_offers_cache.borrow_mut().get_or_fetch(buying, selling, || {
			let mut offers = store.stream_offers_by_asset_pair(buying, selling);
			offers.retain(|entry| entry.as_offer().map_or(false, |o| !o.is_effectively_erased()));
			offers
		});
		candidates.into_iter().find(|entry| !excluding.contains(&offer_key(entry)))
	}

	fn get_offers_by_account_and_asset(&self, account: &AccountId, asset: &Asset) -> Vec<LedgerEntry> {
		self.store
			.stream_all_offers()
			.into_iter()
			.filter(|entry| {
				entry.as_offer().map_or(false, |o| {
					&o.seller_id == account && (&o.buying == asset || &o.selling == asset) && !o.is_effectively_erased()
				})
			})
			.collect()
	}

	fn get_all_offers(&self) -> Vec<LedgerEntry> {
		self.store
			.stream_all_offers()
			.into_iter()
			.filter(|entry| entry.as_offer().map_or(false, |o| !o.is_effectively_erased()))
			.collect()
	}

	fn get_inflation_winners(&self, max_winners: usize, min_votes: i64) -> Vec<(AccountId, i64)> {
		let mut winners = self.store.stream_inflation_winners(min_votes);
		winners.truncate(max_winners);
		winners
	}
}

impl<S: PersistentStore> EntryStoreParent for LedgerTxnRoot<S> {
	fn try_acquire_child(&self) -> LedgerTxnResult<()> {
		let mut has_child = self.has_child.borrow_mut();
		if *has_child {
			return Err(LedgerTxnError::ChildAlreadyActive);
		}
		*has_child = true;
		Ok(())
	}

	fn release_child(&self) {
		*self.has_child.borrow_mut() = false;
	}

	fn receive_commit(&self, delta: LedgerTxnDelta) -> LedgerTxnResult<()> {
		let result = self.store.commit_delta(&delta);
		// Invalidate regardless of outcome: on failure we don't know whether the
		// store partially applied the delta before rejecting it (§5).
		self.invalidate_for(&delta);
		match result {
			Ok(()) => {
				debug!("root commit applied");
				Ok(())
			}
			Err(err) => {
				warn!("root commit rejected by store: {}", err);
				Err(LedgerTxnError::StoreFailure(err))
			}
		}
	}
}
