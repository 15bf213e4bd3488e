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

//! Global ledger metadata. Exactly one logical header per layer (§3).

/// Global ledger metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerHeader {
	pub ledger_version: u32,
	pub ledger_seq: u32,
}

impl LedgerHeader {
	pub fn new(ledger_version: u32, ledger_seq: u32) -> Self {
		LedgerHeader { ledger_version, ledger_seq }
	}
}
