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

//! The nested transactional overlay (§4.1, §4.5).
//!
//! `LedgerTxn` borrows its parent as `&dyn EntryStoreParent` — a shared reference,
//! since the child needs the parent reachable for ancestor reads while it is open.
//! Because `&T` can be reborrowed freely, the borrow checker alone cannot reject a
//! second concurrent child; the "at most one active child" invariant (and the
//! related sealing/liveness invariants) are therefore runtime flags behind a
//! `RefCell`, checked on every call and surfaced as a `Misuse`-shaped `Result`.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{HashMap, HashSet};

use log::{debug, trace, warn};

use crate::delta::{EntryDelta, HeaderDelta, LedgerTxnDelta};
use crate::entry::LedgerEntry;
use crate::error::{LedgerTxnError, LedgerTxnResult};
use crate::handle::{ConstEntryHandle, EntryHandle, HeaderHandle};
use crate::header::LedgerHeader;
use crate::key::{AccountId, Asset, LedgerKey};
use crate::store::{EntryStore, EntryStoreParent};

fn key_for_entry(entry: &LedgerEntry) -> LedgerKey {
	match entry {
		LedgerEntry::Account(a, _) => LedgerKey::Account(a.account_id.clone()),
		LedgerEntry::TrustLine(t, _) => LedgerKey::TrustLine(t.account_id.clone(), t.asset.clone()),
		LedgerEntry::Offer(o, _) => LedgerKey::Offer(o.seller_id.clone(), o.offer_id),
		LedgerEntry::Data(d, _) => LedgerKey::Data(d.account_id.clone(), d.data_name.clone()),
	}
}

/// Folds one child delta entry onto the map representing the parent's own delta,
/// per the commit merge rules (§4.1).
fn merge_entry(entries: &mut HashMap<LedgerKey, EntryDelta>, key: LedgerKey, child: EntryDelta) {
	let merged = match entries.remove(&key) {
		None => child,
		Some(parent_delta) => EntryDelta { current: child.current, previous: parent_delta.previous },
	};
	if !merged.is_read_through() {
		entries.insert(key, merged);
	}
}

/// Stamps every present entry's `lastModifiedLedgerSeq` to this layer's own
/// header sequence, as of the moment the delta becomes externally observable
/// (§3 invariant 6). Deleted entries carry no `current` and are left alone.
fn stamp_modified_seq(state: &mut TxnState) {
	let seq = state.header.current.ledger_seq;
	for delta in state.entries.values_mut() {
		if let Some(entry) = delta.current.as_mut() {
			entry.set_last_modified_ledger_seq(seq);
		}
	}
}

/// The offer with the lower price ratio, ties broken by ascending offer id.
fn cheaper_offer(a: LedgerEntry, b: LedgerEntry) -> LedgerEntry {
	let oa = a.as_offer().expect("candidate is always an offer entry");
	let ob = b.as_offer().expect("candidate is always an offer entry");
	match oa.price.cmp_ratio(&ob.price) {
		std::cmp::Ordering::Greater => b,
		std::cmp::Ordering::Less => a,
		std::cmp::Ordering::Equal => {
			if oa.offer_id <= ob.offer_id {
				a
			} else {
				b
			}
		}
	}
}

struct TxnState {
	entries: HashMap<LedgerKey, EntryDelta>,
	header: HeaderDelta,
	sealed: bool,
	has_active_child: bool,
	live_keys: HashSet<LedgerKey>,
	header_active: bool,
}

/// A nested, transactional overlay over a parent [`EntryStore`] (§4.1).
pub struct LedgerTxn<'p> {
	parent: &'p dyn EntryStoreParent,
	enforce_meta: bool,
	state: RefCell<TxnState>,
}

impl<'p> LedgerTxn<'p> {
	/// Opens a child of `parent` with metadata self-checking enabled.
	pub fn open(parent: &'p dyn EntryStoreParent) -> LedgerTxnResult<Self> {
		Self::open_with(parent, true)
	}

	/// Opens a child of `parent`, gating the debug-only commit self-check behind
	/// `enforce_meta` (§1 Supplemented features).
	pub fn open_with(parent: &'p dyn EntryStoreParent, enforce_meta: bool) -> LedgerTxnResult<Self> {
		parent.try_acquire_child()?;
		let header = parent.get_header();
		debug!("ledger txn opened at seq {}", header.ledger_seq);
		Ok(LedgerTxn {
			parent,
			enforce_meta,
			state: RefCell::new(TxnState {
				entries: HashMap::new(),
				header: HeaderDelta { current: header.clone(), previous: header },
				sealed: false,
				has_active_child: false,
				live_keys: HashSet::new(),
				header_active: false,
			}),
		})
	}

	fn check_mutable(&self) -> LedgerTxnResult<()> {
		let state = self.state.borrow();
		if state.sealed {
			return Err(LedgerTxnError::Sealed);
		}
		if state.has_active_child {
			return Err(LedgerTxnError::ChildActive);
		}
		Ok(())
	}

	/// Creates `entry` at its natural key. Fails if the key is already visible.
	pub fn create(&self, entry: LedgerEntry) -> LedgerTxnResult<EntryHandle<'_, 'p>> {
		self.check_mutable()?;
		let key = key_for_entry(&entry);
		if self.get_entry(&key).is_some() {
			return Err(LedgerTxnError::AlreadyExists(key));
		}
		{
			let mut state = self.state.borrow_mut();
			// A prior local erase leaves (None, previous) behind; recreating in the
			// same layer must keep that previous rather than starting a fresh one,
			// or the commit self-check below will see a previous that disagrees
			// with the parent's (the key never left the parent's delta at all).
			let previous = state.entries.get(&key).map(|d| d.previous.clone()).unwrap_or(None);
			state.entries.insert(key.clone(), EntryDelta { current: Some(entry), previous });
			state.live_keys.insert(key.clone());
		}
		trace!("created key in layer");
		Ok(EntryHandle::new(self, key))
	}

	/// Removes the entry at `key`. Fails if the key is not currently visible.
	pub fn erase(&self, key: &LedgerKey) -> LedgerTxnResult<()> {
		self.check_mutable()?;
		if self.get_entry(key).is_none() {
			return Err(LedgerTxnError::NoSuchEntry(key.clone()));
		}
		{
			let mut state = self.state.borrow_mut();
			match state.entries.remove(key) {
				Some(delta) if delta.is_creation() => {
					// Created and erased within this layer: net zero, nothing to record.
				}
				Some(delta) => {
					state.entries.insert(key.clone(), EntryDelta { current: None, previous: delta.previous });
				}
				None => {
					let previous = self.parent.get_entry(key).expect("checked visible-as-present above");
					state.entries.insert(key.clone(), EntryDelta::deletion(previous));
				}
			}
			state.live_keys.remove(key);
		}
		trace!("erased key in layer");
		Ok(())
	}

	/// Loads `key`, recording a read-through delta entry if this layer has not
	/// already touched it. Fails if `key` already has a live handle in this layer.
	pub fn load(&self, key: &LedgerKey) -> LedgerTxnResult<Option<EntryHandle<'_, 'p>>> {
		self.check_mutable()?;
		if self.state.borrow().live_keys.contains(key) {
			return Err(LedgerTxnError::HandleAlreadyActive(key.clone()));
		}
		let already_in_self = self.state.borrow().entries.contains_key(key);
		if already_in_self {
			if self.state.borrow().entries.get(key).unwrap().current.is_none() {
				return Ok(None);
			}
		} else {
			match self.parent.get_entry(key) {
				Some(entry) => {
					self.state.borrow_mut().entries.insert(key.clone(), EntryDelta::read_through(entry));
				}
				None => return Ok(None),
			}
		}
		self.state.borrow_mut().live_keys.insert(key.clone());
		trace!("loaded key into live handle");
		Ok(Some(EntryHandle::new(self, key.clone())))
	}

	/// Same resolution as [`load`](Self::load), but never records a read-through
	/// delta entry and never marks the key live — the handle is read-only.
	pub fn load_without_record(&self, key: &LedgerKey) -> LedgerTxnResult<Option<ConstEntryHandle>> {
		self.check_mutable()?;
		Ok(self.get_entry(key).map(|entry| ConstEntryHandle::new(key.clone(), entry)))
	}

	/// Activates the header handle. Fails if it is already active.
	pub fn load_header(&self) -> LedgerTxnResult<HeaderHandle<'_, 'p>> {
		self.check_mutable()?;
		let mut state = self.state.borrow_mut();
		if state.header_active {
			return Err(LedgerTxnError::HeaderAlreadyActive);
		}
		state.header_active = true;
		drop(state);
		Ok(HeaderHandle::new(self))
	}

	/// Seals the transaction and returns its full delta.
	pub fn get_delta(&self) -> LedgerTxnResult<LedgerTxnDelta> {
		let mut state = self.state.borrow_mut();
		if state.has_active_child {
			return Err(LedgerTxnError::ChildActive);
		}
		state.sealed = true;
		stamp_modified_seq(&mut state);
		let delta = LedgerTxnDelta { entries: state.entries.clone(), header: state.header.clone() };
		drop(state);
		debug!("ledger txn sealed via getDelta");
		Ok(delta)
	}

	/// Seals the transaction and returns every currently-present entry as a live
	/// handle (§1 Supplemented features). Keys already live elsewhere are skipped,
	/// since a second live handle for the same key cannot be constructed.
	pub fn get_live_entries(&self) -> LedgerTxnResult<Vec<EntryHandle<'_, 'p>>> {
		{
			let mut state = self.state.borrow_mut();
			if state.has_active_child {
				return Err(LedgerTxnError::ChildActive);
			}
			state.sealed = true;
			stamp_modified_seq(&mut state);
		}
		debug!("ledger txn sealed via getLiveEntries");
		let keys: Vec<LedgerKey> = {
			let state = self.state.borrow();
			state
				.entries
				.iter()
				.filter(|(k, d)| d.current.is_some() && !state.live_keys.contains(*k))
				.map(|(k, _)| k.clone())
				.collect()
		};
		{
			let mut state = self.state.borrow_mut();
			for key in &keys {
				state.live_keys.insert(key.clone());
			}
		}
		Ok(keys.into_iter().map(|key| EntryHandle::new(self, key)).collect())
	}

	/// Temporarily reactivates the header of a sealed transaction for `f`.
	pub fn unseal_header(&self, f: impl FnOnce(&mut LedgerHeader)) -> LedgerTxnResult<()> {
		{
			let state = self.state.borrow();
			if !state.sealed {
				return Err(LedgerTxnError::NotSealed);
			}
			if state.header_active {
				return Err(LedgerTxnError::HeaderAlreadyActive);
			}
		}
		self.state.borrow_mut().header_active = true;
		f(&mut self.state.borrow_mut().header.current);
		self.state.borrow_mut().header_active = false;
		Ok(())
	}

	/// `loadAllOffers`: every visible offer grouped by seller (§4.4). Built on
	/// top of [`get_all_offers`](EntryStore::get_all_offers), which already does
	/// the overlay composition; this just partitions its result by `seller_id`.
	pub fn load_all_offers(&self) -> HashMap<AccountId, Vec<LedgerEntry>> {
		let mut by_seller: HashMap<AccountId, Vec<LedgerEntry>> = HashMap::new();
		for entry in self.get_all_offers() {
			let seller_id = entry.as_offer().expect("get_all_offers only yields offers").seller_id.clone();
			by_seller.entry(seller_id).or_insert_with(Vec::new).push(entry);
		}
		by_seller
	}

	fn check_meta_consistency(&self) {
		let state = self.state.borrow();
		for (key, delta) in state.entries.iter() {
			let ancestor_current = self.parent.get_entry(key);
			debug_assert_eq!(
				delta.previous, ancestor_current,
				"recorded previous for {:?} diverged from the parent's current view",
				key
			);
		}
	}

	/// Folds this layer's delta into the parent and destroys self.
	pub fn commit(self) -> LedgerTxnResult<()> {
		if self.state.borrow().has_active_child {
			return Err(LedgerTxnError::ChildActive);
		}
		if self.enforce_meta {
			self.check_meta_consistency();
		}
		let delta = {
			let mut state = self.state.borrow_mut();
			stamp_modified_seq(&mut state);
			LedgerTxnDelta { entries: state.entries.clone(), header: state.header.clone() }
		};
		let result = self.parent.receive_commit(delta);
		match &result {
			Ok(()) => debug!("ledger txn committed"),
			Err(err) => warn!("ledger txn commit rejected: {}", err),
		}
		result
	}

	/// Discards this layer's delta and destroys self.
	pub fn rollback(self) -> LedgerTxnResult<()> {
		if self.state.borrow().has_active_child {
			return Err(LedgerTxnError::ChildActive);
		}
		debug!("ledger txn rolled back");
		Ok(())
	}

	pub(crate) fn live_entry_mut(&self, key: &LedgerKey) -> RefMut<'_, LedgerEntry> {
		RefMut::map(self.state.borrow_mut(), |s| {
			s.entries
				.get_mut(key)
				.and_then(|d| d.current.as_mut())
				.expect("a live handle always points at a present delta entry")
		})
	}

	pub(crate) fn release_live_key(&self, key: &LedgerKey) {
		self.state.borrow_mut().live_keys.remove(key);
	}

	pub(crate) fn header_current_mut(&self) -> RefMut<'_, LedgerHeader> {
		RefMut::map(self.state.borrow_mut(), |s| &mut s.header.current)
	}

	pub(crate) fn header_current_ref(&self) -> Ref<'_, LedgerHeader> {
		Ref::map(self.state.borrow(), |s| &s.header.current)
	}

	pub(crate) fn release_header(&self) {
		self.state.borrow_mut().header_active = false;
	}
}

impl<'p> std::fmt::Debug for LedgerTxn<'p> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LedgerTxn").finish_non_exhaustive()
	}
}

impl<'p> Drop for LedgerTxn<'p> {
	fn drop(&mut self) {
		// Idempotent on the parent side, so this runs exactly as many times as
		// needed regardless of whether commit()/rollback() already ran: a plain
		// drop (no commit/rollback call) must still free the parent's child slot.
		self.parent.release_child();
	}
}

impl<'p> EntryStore for LedgerTxn<'p> {
	fn get_header(&self) -> LedgerHeader {
		self.state.borrow().header.current.clone()
	}

	fn get_entry(&self, key: &LedgerKey) -> Option<LedgerEntry> {
		if let Some(delta) = self.state.borrow().entries.get(key) {
			return delta.current.clone();
		}
		self.parent.get_entry(key)
	}

	fn get_best_offer(
		&self,
		buying: &Asset,
		selling: &Asset,
		excluding: &HashSet<LedgerKey>,
	) -> Option<LedgerEntry> {
		let state = self.state.borrow();

		let mut local_best: Option<LedgerEntry> = None;
		for (key, delta) in state.entries.iter() {
			if excluding.contains(key) {
				continue;
			}
			if let Some(entry) = &delta.current {
				if let Some(offer) = entry.as_offer() {
					if &offer.buying == buying && &offer.selling == selling && !offer.is_effectively_erased() {
						local_best = Some(match local_best {
							Some(best) => cheaper_offer(best, entry.clone()),
							None => entry.clone(),
						});
					}
				}
			}
		}

		// Every key this layer has touched must be hidden from the parent's own
		// search: a self-layer deletion or asset-changing edit can supersede what
		// the parent would otherwise surface for this pair.
		let mut combined_excluding = excluding.clone();
		combined_excluding.extend(state.entries.keys().cloned());
		drop(state);

		let parent_best = self.parent.get_best_offer(buying, selling, &combined_excluding);
		match (local_best, parent_best) {
			(Some(a), Some(b)) => Some(cheaper_offer(a, b)),
			(Some(a), None) => Some(a),
			(None, Some(b)) => Some(b),
			(None, None) => None,
		}
	}

	fn get_offers_by_account_and_asset(&self, account: &AccountId, asset: &Asset) -> Vec<LedgerEntry> {
		let state = self.state.borrow();
		let mut result: Vec<LedgerEntry> = self
			.parent
			.get_offers_by_account_and_asset(account, asset)
			.into_iter()
			.filter(|entry| {
				let key = key_for_entry(entry);
				!state.entries.contains_key(&key)
			})
			.collect();
		for delta in state.entries.values() {
			if let Some(entry) = &delta.current {
				if let Some(offer) = entry.as_offer() {
					if &offer.seller_id == account
						&& (&offer.buying == asset || &offer.selling == asset)
						&& !offer.is_effectively_erased()
					{
						result.push(entry.clone());
					}
				}
			}
		}
		result
	}

	fn get_all_offers(&self) -> Vec<LedgerEntry> {
		let state = self.state.borrow();
		let mut result: Vec<LedgerEntry> = self
			.parent
			.get_all_offers()
			.into_iter()
			.filter(|entry| {
				let key = key_for_entry(entry);
				!state.entries.contains_key(&key)
			})
			.collect();
		for delta in state.entries.values() {
			if let Some(entry) = &delta.current {
				if let Some(offer) = entry.as_offer() {
					if !offer.is_effectively_erased() {
						result.push(entry.clone());
					}
				}
			}
		}
		result
	}

	fn get_inflation_winners(&self, max_winners: usize, min_votes: i64) -> Vec<(AccountId, i64)> {
		// Ask the parent for its complete, unfiltered ranking, then adjust it
		// locally for the accounts this layer has touched, rather than walking
		// every visible account again — the parent's own ranking is already a
		// correct aggregate of everything below this layer.
		let mut totals: HashMap<AccountId, i64> =
			self.parent.get_inflation_winners(usize::MAX, i64::MIN).into_iter().collect();

		let state = self.state.borrow();
		for delta in state.entries.values() {
			if let Some(prev) = delta.previous.as_ref().and_then(LedgerEntry::as_account) {
				if let Some(dest) = &prev.inflation_dest {
					if let Some(v) = totals.get_mut(dest) {
						*v -= prev.balance;
					}
				}
			}
			if let Some(cur) = delta.current.as_ref().and_then(LedgerEntry::as_account) {
				if let Some(dest) = &cur.inflation_dest {
					*totals.entry(dest.clone()).or_insert(0) += cur.balance;
				}
			}
		}
		drop(state);

		let mut winners: Vec<(AccountId, i64)> = totals.into_iter().filter(|(_, v)| *v >= min_votes).collect();
		winners.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.to_str_key().cmp(a.0.to_str_key())));
		winners.truncate(max_winners);
		winners
	}
}

impl<'p> EntryStoreParent for LedgerTxn<'p> {
	fn try_acquire_child(&self) -> LedgerTxnResult<()> {
		let mut state = self.state.borrow_mut();
		if state.sealed {
			return Err(LedgerTxnError::Sealed);
		}
		if state.has_active_child {
			return Err(LedgerTxnError::ChildAlreadyActive);
		}
		state.has_active_child = true;
		Ok(())
	}

	fn release_child(&self) {
		self.state.borrow_mut().has_active_child = false;
	}

	fn receive_commit(&self, delta: LedgerTxnDelta) -> LedgerTxnResult<()> {
		let mut state = self.state.borrow_mut();
		for (key, child_delta) in delta.entries {
			merge_entry(&mut state.entries, key, child_delta);
		}
		state.header.current = delta.header.current;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::entry::{AccountEntry, OfferEntry, Price};
	use crate::key::OfferId;
	use pretty_assertions::assert_eq;
	use std::cell::RefCell as StdRefCell;

	/// A minimal in-memory `EntryStore`/`EntryStoreParent` double, standing in for
	/// `LedgerTxnRoot` so these tests do not depend on a backing store.
	struct TestRoot {
		entries: StdRefCell<HashMap<LedgerKey, LedgerEntry>>,
		header: StdRefCell<LedgerHeader>,
		has_child: StdRefCell<bool>,
	}

	impl TestRoot {
		fn new() -> Self {
			TestRoot {
				entries: StdRefCell::new(HashMap::new()),
				header: StdRefCell::new(LedgerHeader::new(1, 1)),
				has_child: StdRefCell::new(false),
			}
		}

		fn seed(&self, entry: LedgerEntry) {
			self.entries.borrow_mut().insert(key_for_entry(&entry), entry);
		}
	}

	impl EntryStore for TestRoot {
		fn get_header(&self) -> LedgerHeader {
			self.header.borrow().clone()
		}

		fn get_entry(&self, key: &LedgerKey) -> Option<LedgerEntry> {
			self.entries.borrow().get(key).cloned()
		}

		fn get_best_offer(
			&self,
			buying: &Asset,
			selling: &Asset,
			excluding: &HashSet<LedgerKey>,
		) -> Option<LedgerEntry> {
			self.entries
				.borrow()
				.iter()
				.filter(|(k, _)| !excluding.contains(*k))
				.filter_map(|(_, e)| e.as_offer().map(|o| (o, e)))
				.filter(|(o, _)| &o.buying == buying && &o.selling == selling && !o.is_effectively_erased())
				.fold(None, |acc, (_, e)| match acc {
					None => Some(e.clone()),
					Some(best) => Some(cheaper_offer(best, e.clone())),
				})
		}

		fn get_offers_by_account_and_asset(&self, account: &AccountId, asset: &Asset) -> Vec<LedgerEntry> {
			self.entries
				.borrow()
				.values()
				.filter(|e| {
					e.as_offer().map_or(false, |o| {
						&o.seller_id == account
							&& (&o.buying == asset || &o.selling == asset)
							&& !o.is_effectively_erased()
					})
				})
				.cloned()
				.collect()
		}

		fn get_all_offers(&self) -> Vec<LedgerEntry> {
			self.entries
				.borrow()
				.values()
				.filter(|e| e.as_offer().map_or(false, |o| !o.is_effectively_erased()))
				.cloned()
				.collect()
		}

		fn get_inflation_winners(&self, max_winners: usize, min_votes: i64) -> Vec<(AccountId, i64)> {
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
			winners.truncate(max_winners);
			winners
		}
	}

	impl EntryStoreParent for TestRoot {
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
			let mut entries = self.entries.borrow_mut();
			for (key, d) in delta.entries {
				match d.current {
					Some(entry) => {
						entries.insert(key, entry);
					}
					None => {
						entries.remove(&key);
					}
				}
			}
			*self.header.borrow_mut() = delta.header.current;
			Ok(())
		}
	}

	fn account(id: &str, balance: i64, dest: Option<&str>) -> LedgerEntry {
		LedgerEntry::Account(
			AccountEntry {
				account_id: AccountId::from(id),
				balance,
				inflation_dest: dest.map(AccountId::from),
			},
			0,
		)
	}

	fn offer(seller: &str, id: i64, buying: Asset, selling: Asset, amount: i64, price: Price) -> LedgerEntry {
		LedgerEntry::Offer(
			OfferEntry { seller_id: AccountId::from(seller), offer_id: OfferId(id), selling, buying, amount, price },
			0,
		)
	}

	#[test]
	fn s1_create_in_child_then_commit() {
		let root = TestRoot::new();
		let child = LedgerTxn::open(&root).unwrap();
		let e1 = account("GABC", 100, None);
		child.create(e1.clone()).unwrap();
		child.commit().unwrap();
		let mut expected = e1;
		expected.set_last_modified_ledger_seq(root.get_header().ledger_seq);
		assert_eq!(root.get_entry(&LedgerKey::Account(AccountId::from("GABC"))), Some(expected));
	}

	#[test]
	fn s2_load_modify_commit_preserves_original_previous() {
		let root = TestRoot::new();
		let key = LedgerKey::Account(AccountId::from("GABC"));
		let setup = LedgerTxn::open(&root).unwrap();
		setup.create(account("GABC", 100, None)).unwrap();
		setup.commit().unwrap();

		let child = LedgerTxn::open(&root).unwrap();
		let handle = child.load(&key).unwrap().unwrap();
		*handle.current() = account("GABC", 200, None);
		drop(handle);
		child.commit().unwrap();

		let mut expected = account("GABC", 200, None);
		expected.set_last_modified_ledger_seq(root.get_header().ledger_seq);
		assert_eq!(root.get_entry(&key), Some(expected));
	}

	#[test]
	fn s3_erase_then_recreate_in_grandchild_collapses() {
		let root = TestRoot::new();
		let key = LedgerKey::Account(AccountId::from("GABC"));
		let e1 = account("GABC", 100, None);
		root.seed(e1.clone());

		let child = LedgerTxn::open(&root).unwrap();
		child.erase(&key).unwrap();
		{
			let grandchild = LedgerTxn::open(&child).unwrap();
			grandchild.create(e1.clone()).unwrap();
			grandchild.commit().unwrap();
		}
		child.commit().unwrap();

		let mut expected = e1;
		expected.set_last_modified_ledger_seq(root.get_header().ledger_seq);
		assert_eq!(root.get_entry(&key), Some(expected));
	}

	#[test]
	fn s4_best_offer_overlay_price_override() {
		let root = TestRoot::new();
		root.seed(offer("G1", 1, Asset::Native, Asset::Native, 1, Price { n: 1, d: 1 }));
		root.seed(offer("G1", 2, Asset::Native, Asset::Native, 1, Price { n: 1, d: 1 }));

		let child = LedgerTxn::open(&root).unwrap();
		let key1 = LedgerKey::Offer(AccountId::from("G1"), OfferId(1));
		let handle = child.load(&key1).unwrap().unwrap();
		*handle.current() = offer("G1", 1, Asset::Native, Asset::Native, 7, Price { n: 2, d: 1 });
		drop(handle);

		let best = child.get_best_offer(&Asset::Native, &Asset::Native, &HashSet::new()).unwrap();
		assert_eq!(best.as_offer().unwrap().offer_id, OfferId(2));
	}

	#[test]
	fn s5_inflation_winners_boundary() {
		let root = TestRoot::new();
		root.seed(account("GA1", 1_000_000_003, Some("GA3")));
		root.seed(account("GA2", 1_000_000_007, Some("GA3")));
		root.seed(account("GA3", 0, None));

		assert_eq!(
			root.get_inflation_winners(1, 2_000_000_010),
			vec![(AccountId::from("GA3"), 2_000_000_010)]
		);
		assert_eq!(root.get_inflation_winners(1, 2_000_000_011), Vec::<(AccountId, i64)>::new());
	}

	#[test]
	fn s6_second_child_rejected_until_first_released() {
		let root = TestRoot::new();
		let c1 = LedgerTxn::open(&root).unwrap();
		let err = LedgerTxn::open(&root).unwrap_err();
		assert!(matches!(err, LedgerTxnError::ChildAlreadyActive));
		c1.rollback().unwrap();
		assert!(LedgerTxn::open(&root).is_ok());
	}

	#[test]
	fn commit_stamps_last_modified_seq_from_header() {
		let root = TestRoot::new();
		*root.header.borrow_mut() = LedgerHeader::new(1, 42);

		let txn = LedgerTxn::open(&root).unwrap();
		txn.create(account("GABC", 100, None)).unwrap();
		txn.commit().unwrap();

		let stored = root.get_entry(&LedgerKey::Account(AccountId::from("GABC"))).unwrap();
		assert_eq!(stored.last_modified_ledger_seq(), 42);
	}

	#[test]
	fn get_live_entries_stamps_last_modified_seq() {
		let root = TestRoot::new();
		*root.header.borrow_mut() = LedgerHeader::new(1, 9);

		let txn = LedgerTxn::open(&root).unwrap();
		txn.create(account("GABC", 1, None)).unwrap();
		let handles = txn.get_live_entries().unwrap();
		assert_eq!(handles[0].current().last_modified_ledger_seq(), 9);
	}

	#[test]
	fn load_all_offers_groups_by_seller() {
		let root = TestRoot::new();
		root.seed(offer("G1", 1, Asset::Native, Asset::Native, 5, Price { n: 1, d: 1 }));
		root.seed(offer("G1", 2, Asset::Native, Asset::Native, 5, Price { n: 2, d: 1 }));
		root.seed(offer("G2", 3, Asset::Native, Asset::Native, 5, Price { n: 3, d: 1 }));

		let txn = LedgerTxn::open(&root).unwrap();
		let grouped = txn.load_all_offers();

		assert_eq!(grouped.get(&AccountId::from("G1")).map(Vec::len), Some(2));
		assert_eq!(grouped.get(&AccountId::from("G2")).map(Vec::len), Some(1));
	}

	#[test]
	fn create_existing_key_is_misuse() {
		let root = TestRoot::new();
		root.seed(account("GABC", 1, None));
		let txn = LedgerTxn::open(&root).unwrap();
		let err = txn.create(account("GABC", 2, None)).unwrap_err();
		assert!(matches!(err, LedgerTxnError::AlreadyExists(_)));
	}

	#[test]
	fn erase_missing_key_is_misuse() {
		let root = TestRoot::new();
		let txn = LedgerTxn::open(&root).unwrap();
		let key = LedgerKey::Account(AccountId::from("GABC"));
		assert!(matches!(txn.erase(&key).unwrap_err(), LedgerTxnError::NoSuchEntry(_)));
	}

	#[test]
	fn loading_a_live_key_twice_is_misuse() {
		let root = TestRoot::new();
		root.seed(account("GABC", 1, None));
		let txn = LedgerTxn::open(&root).unwrap();
		let key = LedgerKey::Account(AccountId::from("GABC"));
		let _h = txn.load(&key).unwrap().unwrap();
		assert!(matches!(txn.load(&key).unwrap_err(), LedgerTxnError::HandleAlreadyActive(_)));
	}

	#[test]
	fn sealing_rejects_further_mutation() {
		let root = TestRoot::new();
		let txn = LedgerTxn::open(&root).unwrap();
		txn.get_delta().unwrap();
		assert!(matches!(txn.create(account("GABC", 1, None)).unwrap_err(), LedgerTxnError::Sealed));
	}

	#[test]
	fn loading_header_twice_is_misuse() {
		let root = TestRoot::new();
		let txn = LedgerTxn::open(&root).unwrap();
		let _h = txn.load_header().unwrap();
		assert!(matches!(txn.load_header().unwrap_err(), LedgerTxnError::HeaderAlreadyActive));
	}

	#[test]
	fn unseal_before_seal_is_misuse() {
		let root = TestRoot::new();
		let txn = LedgerTxn::open(&root).unwrap();
		assert!(matches!(txn.unseal_header(|_| {}).unwrap_err(), LedgerTxnError::NotSealed));
	}

	#[test]
	fn rollback_is_identity_on_parent_delta() {
		let root = TestRoot::new();
		root.seed(account("GABC", 1, None));
		let before = root.get_entry(&LedgerKey::Account(AccountId::from("GABC")));

		let child = LedgerTxn::open(&root).unwrap();
		child.erase(&LedgerKey::Account(AccountId::from("GABC"))).unwrap();
		child.rollback().unwrap();

		let after = root.get_entry(&LedgerKey::Account(AccountId::from("GABC")));
		assert_eq!(before, after);
	}

	#[test]
	fn checkvalid_style_rollback_is_read_only() {
		// Mimics an operation-frame checkValid: open a nested txn, mutate, always
		// roll back. Visible state must be unaffected regardless of cache sizing
		// (modeled here by the absence of any cache at all, since rollback never
		// touches one either way — see SPEC_FULL.md §9).
		let root = TestRoot::new();
		root.seed(account("GABC", 100, None));
		let before = root.get_entry(&LedgerKey::Account(AccountId::from("GABC")));

		for _ in 0..3 {
			let probe = LedgerTxn::open(&root).unwrap();
			let key = LedgerKey::Account(AccountId::from("GABC"));
			if let Some(handle) = probe.load(&key).unwrap() {
				*handle.current() = account("GABC", 999, None);
			}
			probe.rollback().unwrap();
		}

		let after = root.get_entry(&LedgerKey::Account(AccountId::from("GABC")));
		assert_eq!(before, after);
	}
}
