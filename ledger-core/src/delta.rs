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

//! The delta bookkeeping a [`LedgerTxn`](crate::txn::LedgerTxn) accumulates relative
//! to its parent (§3 `EntryDelta` / `LedgerTxnDelta`).

use std::collections::HashMap;

use crate::entry::LedgerEntry;
use crate::header::LedgerHeader;
use crate::key::LedgerKey;

/// One side of an [`EntryDelta`]: either an entry value, or absence.
pub type EntrySide = Option<LedgerEntry>;

/// A pair `(current, previous)` recording the net effect of a layer on one key.
///
/// Encodes creation (`previous` is `None`), modification (both `Some`, unequal),
/// deletion (`current` is `None`), and read-through (both `Some`, equal) — §3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDelta {
	pub current: EntrySide,
	pub previous: EntrySide,
}

impl EntryDelta {
	pub fn creation(entry: LedgerEntry) -> Self {
		EntryDelta { current: Some(entry), previous: None }
	}

	pub fn deletion(previous: LedgerEntry) -> Self {
		EntryDelta { current: None, previous: Some(previous) }
	}

	pub fn read_through(entry: LedgerEntry) -> Self {
		EntryDelta { current: Some(entry.clone()), previous: Some(entry) }
	}

	/// A read-through is a no-op delta entry: present on both sides and equal.
	pub fn is_read_through(&self) -> bool {
		self.current == self.previous
	}

	pub fn is_creation(&self) -> bool {
		self.previous.is_none() && self.current.is_some()
	}

	pub fn is_deletion(&self) -> bool {
		self.current.is_none() && self.previous.is_some()
	}
}

/// A `(current, previous)` pair for the per-layer header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDelta {
	pub current: LedgerHeader,
	pub previous: LedgerHeader,
}

/// The observable change of one transaction layer (§3).
///
/// Insertion order of `entries` is irrelevant; it is a plain map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTxnDelta {
	pub entries: HashMap<LedgerKey, EntryDelta>,
	pub header: HeaderDelta,
}
