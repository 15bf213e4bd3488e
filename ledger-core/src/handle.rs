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

//! Activation tokens returned by `load`/`create`/`loadHeader` (§4.3).
//!
//! A handle is a borrow token binding `(owning transaction, key)` to the mutable
//! slot in the transaction's delta. Releasing it — by drop, or by the consuming
//! `erase()` — marks the key no-longer-active.

use std::cell::{Ref, RefMut};

use crate::entry::LedgerEntry;
use crate::error::LedgerTxnResult;
use crate::header::LedgerHeader;
use crate::key::LedgerKey;
use crate::txn::LedgerTxn;

/// A mutable handle to an entry that is live (exclusively borrowed) in its
/// owning transaction.
pub struct EntryHandle<'t, 'p> {
	txn: &'t LedgerTxn<'p>,
	key: LedgerKey,
}

impl<'t, 'p> EntryHandle<'t, 'p> {
	pub(crate) fn new(txn: &'t LedgerTxn<'p>, key: LedgerKey) -> Self {
		EntryHandle { txn, key }
	}

	/// The key this handle is bound to.
	pub fn key(&self) -> &LedgerKey {
		&self.key
	}

	/// A mutable projection into the transaction's delta slot for this key.
	pub fn current(&self) -> RefMut<'_, LedgerEntry> {
		self.txn.live_entry_mut(&self.key)
	}

	/// Equivalent to calling `erase(key)` on the owning transaction. Consumes
	/// the handle so it cannot be used afterwards; the handle's `Drop` still
	/// runs on the way out, but releasing an already-released key is a no-op.
	pub fn erase(self) -> LedgerTxnResult<()> {
		self.txn.erase(&self.key)
	}
}

impl<'t, 'p> std::fmt::Debug for EntryHandle<'t, 'p> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EntryHandle").field("key", &self.key).finish_non_exhaustive()
	}
}

impl<'t, 'p> Drop for EntryHandle<'t, 'p> {
	fn drop(&mut self) {
		self.txn.release_live_key(&self.key);
	}
}

/// A read-only handle: no mutation path (§4.3).
pub struct ConstEntryHandle {
	key: LedgerKey,
	entry: LedgerEntry,
}

impl ConstEntryHandle {
	pub(crate) fn new(key: LedgerKey, entry: LedgerEntry) -> Self {
		ConstEntryHandle { key, entry }
	}

	pub fn key(&self) -> &LedgerKey {
		&self.key
	}

	pub fn current(&self) -> &LedgerEntry {
		&self.entry
	}
}

/// A mutable handle to the header slot; only one may be live per layer.
pub struct HeaderHandle<'t, 'p> {
	txn: &'t LedgerTxn<'p>,
}

impl<'t, 'p> HeaderHandle<'t, 'p> {
	pub(crate) fn new(txn: &'t LedgerTxn<'p>) -> Self {
		HeaderHandle { txn }
	}

	pub fn current(&self) -> RefMut<'_, LedgerHeader> {
		self.txn.header_current_mut()
	}

	pub fn current_ref(&self) -> Ref<'_, LedgerHeader> {
		self.txn.header_current_ref()
	}
}

impl<'t, 'p> std::fmt::Debug for HeaderHandle<'t, 'p> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HeaderHandle").finish_non_exhaustive()
	}
}

impl<'t, 'p> Drop for HeaderHandle<'t, 'p> {
	fn drop(&mut self) {
		self.txn.release_header();
	}
}
