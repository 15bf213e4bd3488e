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

//! A nested, transactional overlay over a persistent ledger store.
//!
//! [`txn::LedgerTxn`] stages tentative mutations to ledger entries (accounts,
//! trust lines, offers, data) and the ledger header, composes arbitrarily deep
//! nesting through [`store::EntryStore`]/[`store::EntryStoreParent`], and folds
//! into or discards from its parent on [`txn::LedgerTxn::commit`] /
//! [`txn::LedgerTxn::rollback`]. The concrete backing-store adapter
//! (`LedgerTxnRoot`) lives in the `ledger-store` crate; this crate only depends
//! on the abstract parent interface.

#![warn(missing_docs)]

mod delta;
mod entry;
mod error;
mod handle;
mod header;
mod key;
mod ops;
mod store;
mod txn;

pub use delta::{EntryDelta, EntrySide, HeaderDelta, LedgerTxnDelta};
pub use entry::{AccountEntry, DataEntry, LedgerEntry, OfferEntry, Price, TrustLineEntry};
pub use error::{LedgerTxnError, LedgerTxnResult, StoreError};
pub use handle::{ConstEntryHandle, EntryHandle, HeaderHandle};
pub use header::LedgerHeader;
pub use key::{AccountId, Asset, DataName, LedgerKey, OfferId};
pub use ops::{OperationFrame, OperationResultCode};
pub use store::{EntryStore, EntryStoreParent};
pub use txn::LedgerTxn;
