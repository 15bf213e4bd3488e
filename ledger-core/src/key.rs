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

//! Identity types for ledger entries.

use std::fmt;

/// An account identifier.
///
/// Opaque beyond equality, ordering and a string form (`to_str_key`), which is all
/// the overlay needs; key derivation and encoding live outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(pub String);

impl AccountId {
	/// The canonical string form used as an inflation-winner tie-breaker.
	pub fn to_str_key(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for AccountId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for AccountId {
	fn from(s: &str) -> Self {
		AccountId(s.to_owned())
	}
}

/// An offer identifier, unique per account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OfferId(pub i64);

/// A data entry name, scoped to an account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataName(pub String);

/// An asset: either the native asset or an issued one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Asset {
	/// The chain's native asset.
	Native,
	/// An asset issued by `issuer` under `code`.
	Issued { code: String, issuer: AccountId },
}

/// A tagged union identifying one ledger entry.
///
/// Keys are value-equal and hashable, matching the base spec's data model (§3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LedgerKey {
	Account(AccountId),
	TrustLine(AccountId, Asset),
	Offer(AccountId, OfferId),
	Data(AccountId, DataName),
}
