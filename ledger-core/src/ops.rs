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

//! The operation-frame contract exposed to the block-apply driver (§6).
//!
//! Kept minimal: signature checking, well-formedness rules and the mutation
//! logic of any concrete operation are out of scope (§1) and belong to
//! collaborators this crate does not implement. What remains is the umbilical
//! every concrete operation frame needs into this crate's own surface: the
//! enclosing [`LedgerTxn`] and a way to report its result.

use crate::error::LedgerTxnResult;
use crate::txn::LedgerTxn;

/// Result codes observable to callers of an operation frame (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResultCode {
	/// Operation-specific sub-result follows.
	Inner,
	/// Signature verification was insufficient for the operation's threshold.
	BadAuth,
	/// The source account does not exist.
	NoAccount,
	/// The current ledger version rejects this operation type.
	NotSupported,
}

/// The minimal operation-frame contract (§6).
///
/// For `ledger_version < 10`, signature verification happens inside
/// `check_valid`; for `ledger_version >= 10`, `check_valid` only requires that
/// the source account exists, and signature verification is driven by the
/// outer transaction frame. Neither check is implemented here — both live with
/// the signature-checking collaborator this crate does not own.
pub trait OperationFrame {
	/// Validates without mutating. A conforming implementation opens a nested
	/// `LedgerTxn` under `ltx`, performs its checks, and always rolls it back.
	fn check_valid(&self, ledger_version: u32, ltx: &LedgerTxn<'_>) -> LedgerTxnResult<OperationResultCode>;

	/// Re-runs `check_valid`, then on success performs the operation's
	/// mutations directly against `ltx`.
	fn apply(&self, ledger_version: u32, ltx: &LedgerTxn<'_>) -> LedgerTxnResult<OperationResultCode>;
}
