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

//! The abstract parent interface (§6) every [`LedgerTxn`](crate::txn::LedgerTxn)
//! reads through, and the narrower interface a parent needs to accept a child's
//! commit.
//!
//! Both [`LedgerTxn`] and `LedgerTxnRoot` (in the `ledger-store` crate) implement
//! [`EntryStore`] and [`EntryStoreParent`], so a transaction tree of arbitrary depth
//! is just a chain of trait objects — the recursion bottoms out wherever the
//! concrete backing-store adapter sits.

use std::collections::HashSet;

use crate::delta::LedgerTxnDelta;
use crate::entry::LedgerEntry;
use crate::error::LedgerTxnResult;
use crate::header::LedgerHeader;
use crate::key::{AccountId, Asset, LedgerKey};

/// Read-only lookup of committed entries, plus the iteration primitives the
/// overlay-aware derived queries (§4.4) need (§6).
pub trait EntryStore {
	/// A read-only snapshot of the header as seen by this layer.
	fn get_header(&self) -> LedgerHeader;

	/// Returns `None` if the key is absent, i.e. not visible-as-present.
	fn get_entry(&self, key: &LedgerKey) -> Option<LedgerEntry>;

	/// Returns the offer with the lowest price ratio for `(buying, selling)`,
	/// ties broken by ascending offer id, ignoring any key in `excluding`.
	///
	/// `excluding` lets a descendant layer ask "what would the *next* best
	/// offer be, if you pretend these keys (which I have already accounted
	/// for myself) don't exist" — the mechanism that makes single-winner
	/// overlay composition an O(depth) recursion instead of a full stream
	/// merge at every layer.
	fn get_best_offer(
		&self,
		buying: &Asset,
		selling: &Asset,
		excluding: &HashSet<LedgerKey>,
	) -> Option<LedgerEntry>;

	/// All visible offers where `seller_id == account` and `asset` is either
	/// the buying or selling asset.
	fn get_offers_by_account_and_asset(&self, account: &AccountId, asset: &Asset) -> Vec<LedgerEntry>;

	/// All visible offers, regardless of seller or asset, as a flat overlay
	/// composition. `loadAllOffers` (§4.4) groups this by seller — see
	/// `LedgerTxn::load_all_offers`.
	fn get_all_offers(&self) -> Vec<LedgerEntry>;

	/// Aggregated votes by inflation destination across every visible account,
	/// filtered to `votes >= min_votes`, the top `max_winners` by votes
	/// descending then `to_str_key` descending (§4.4).
	///
	/// Passing `usize::MAX` / `i64::MIN` asks for the complete unfiltered,
	/// untruncated ranking — what a descendant layer needs to correctly adjust
	/// the aggregate for its own touched accounts before re-filtering.
	fn get_inflation_winners(&self, max_winners: usize, min_votes: i64) -> Vec<(AccountId, i64)>;
}

/// The subset of parent behavior needed to host a child transaction: admission
/// control for the "at most one active child" invariant (§3 invariant 1) and the
/// commit sink a child folds its sealed delta into (§4.1 commit merge rules).
pub trait EntryStoreParent: EntryStore {
	/// Reserves the sole child slot, or fails if one is already active or this
	/// layer is sealed (§4.1 Construction).
	fn try_acquire_child(&self) -> LedgerTxnResult<()>;

	/// Releases the child slot. Called exactly once per child, regardless of
	/// whether it committed, rolled back, or was simply dropped.
	fn release_child(&self);

	/// Folds a fully-sealed child delta into this layer using the commit merge
	/// rules (§4.1).
	fn receive_commit(&self, delta: LedgerTxnDelta) -> LedgerTxnResult<()>;
}
