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

//! Structural error kinds (§7): misuse is a programming bug surfaced through a
//! `Result`, store failure is recoverable at the caller.

use thiserror::Error;

use crate::key::LedgerKey;

/// A failure reported by the persistent store driver (an external collaborator,
/// §1/§6). Opaque beyond a human-readable message: this crate does not know the
/// store's schema or transport.
#[derive(Debug, Error)]
#[error("persistent store rejected commit: {0}")]
pub struct StoreError(pub String);

/// Every way a caller can misuse a [`LedgerTxn`](crate::txn::LedgerTxn), plus the
/// one recoverable case (a backing-store commit failure).
#[derive(Debug, Error)]
pub enum LedgerTxnError {
	#[error("transaction already has an active child")]
	ChildAlreadyActive,

	#[error("transaction is sealed")]
	Sealed,

	#[error("key already exists: {0:?}")]
	AlreadyExists(LedgerKey),

	#[error("key does not exist: {0:?}")]
	NoSuchEntry(LedgerKey),

	#[error("key already has a live handle: {0:?}")]
	HandleAlreadyActive(LedgerKey),

	#[error("header already has a live handle")]
	HeaderAlreadyActive,

	#[error("cannot unseal before the transaction is sealed")]
	NotSealed,

	#[error("transaction has an active child")]
	ChildActive,

	#[error(transparent)]
	StoreFailure(#[from] StoreError),
}

/// Shorthand result type for fallible [`LedgerTxn`](crate::txn::LedgerTxn) operations.
pub type LedgerTxnResult<T> = Result<T, LedgerTxnError>;
