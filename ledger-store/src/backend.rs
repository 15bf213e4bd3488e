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

//! The persistent store driver boundary (§4.2) and an in-memory reference
//! implementation of it.
//!
//! `PersistentStore` captures exactly the operations [`LedgerTxnRoot`](crate::root::LedgerTxnRoot)
//! needs from the external collaborator named "persistent store driver" in the
//! base spec — nothing about SQL, XDR, or schema design, which remain out of
//! scope. `InMemoryStore` is reference scaffolding for that trait, used by this
//! crate's own integration tests, analogous to `sp_state_machine::InMemoryBackend`.

use std::cell::RefCell;
use std::collections::HashMap;

use ledger_core::{AccountId, Asset, LedgerEntry, LedgerHeader, LedgerKey, LedgerTxnDelta, StoreError};

/// The read/write surface `LedgerTxnRoot` needs from the backing store.
pub trait PersistentStore {
	/// A read-only snapshot of the header as currently committed.
	fn get_header(&self) -> LedgerHeader;

	/// Returns `None` if the key is absent.
	fn get_entry(&self, key: &LedgerKey) -> Option<LedgerEntry>;

	/// Offers for `(buying, selling)`, sorted by price ratio ascending, ties
	/// broken by offer id ascending.
	fn stream_offers_by_asset_pair(&self, buying: &Asset, selling: &Asset) -> Vec<LedgerEntry>;

	/// Every offer in the store, unsorted. Backs `loadAllOffers` /
	/// `loadOffersByAccountAndAsset`, which are not asset-pair-scoped and so
	/// cannot use the price-ordered stream above.
	fn stream_all_offers(&self) -> Vec<LedgerEntry>;

	/// Aggregated votes by inflation destination across every account, filtered
	/// to `votes >= min_votes`, sorted by votes descending then `to_str_key`
	/// descending.
	fn stream_inflation_winners(&self, min_votes: i64) -> Vec<(AccountId, i64)>;

	/// Atomically applies a fully-sealed delta: all entries and the header, or
	/// none of it.
	fn commit_delta(&self, delta: &LedgerTxnDelta) -> Result<(), StoreError>;
}

/// A `HashMap`-backed `PersistentStore`, used by tests and as reference
/// scaffolding for the trait boundary — not a substitute for the SQL schema
/// the base spec explicitly excludes.
#[derive(Debug, Default)]
pub struct InMemoryStore {
	entries: RefCell<HashMap<LedgerKey, LedgerEntry>>,
	header: RefCell<LedgerHeader>,
}

impl InMemoryStore {
	/// An empty store at the given header.
	pub fn new(header: LedgerHeader) -> Self {
		InMemoryStore { entries: RefCell::new(HashMap::new()), header: RefCell::new(header) }
	}

	/// Seeds a single entry, bypassing `commit_delta`. Test/setup convenience.
	pub fn seed(&self, key: LedgerKey, entry: LedgerEntry) {
		self.entries.borrow_mut().insert(key, entry);
	}
}

impl PersistentStore for InMemoryStore {
	fn get_header(&self) -> LedgerHeader {
		self.header.borrow().clone()
	}

	fn get_entry(&self, key: &LedgerKey) -> Option<LedgerEntry> {
		self.entries.borrow().get(key).cloned()
	}

	fn stream_offers_by_asset_pair(&self, buying: &Asset, selling: &Asset) -> Vec<LedgerEntry> {
		let mut offers: Vec<LedgerEntry> = self
			.entries
			.borrow()
			.values()
			.filter(|e| e.as_offer().map_or(false, |o| &o.buying == buying && &o.selling == selling))
			.cloned()
			.collect();
		offers.sort_by(|a, b| {
			let oa = a.as_offer().expect("filtered to offers");
			let ob = b.as_offer().expect("filtered to offers");
			oa.price.cmp_ratio(&ob.price).then_with(|| oa.offer_id.cmp(&ob.offer_id))
		});
		offers
	}

	fn stream_all_offers(&self) -> Vec<LedgerEntry> {
		self.entries.borrow().values().filter(|e| e.as_offer().is_some()).cloned().collect()
	}

	fn stream_inflation_winners(&self, min_votes: i64) -> Vec<(AccountId, i64)> {
		let mut totals: HashMap<AccountId, i64> = HashMap::new();
		for entry in self.entries.borrow().values() {
			if let Some(account) = entry.as_account() {
				if let Some(dest) = &account.inflation_dest {
					*totals.entry(dest.clone()).or_insert(0) += account.balance;
				}
			}
		}
		let mut winners: Vec<(AccountId, i64)> = totals.into_iter().filter(|(_, v)| *v >= min_votes).collect();
		winners.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.to_str_key().cmp(a.0.to_str_key())));
		winners
	}

	fn commit_delta(&self, delta: &LedgerTxnDelta) -> Result<(), StoreError> {
		let mut entries = self.entries.borrow_mut();
		for (key, d) in &delta.entries {
			match &d.current {
				Some(entry) => {
					entries.insert(key.clone(), entry.clone());
				}
				None => {
					entries.remove(key);
				}
			}
		}
		drop(entries);
		*self.header.borrow_mut() = delta.header.current.clone();
		Ok(())
	}
}
