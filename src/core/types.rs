// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Domain types shared by the upstream clients and the proof engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sender value the node reports for system-generated events.
pub const ZERO_SENDER: &str = "00000000000000000000000000000000";

/// Prefix turning an account address into its received-events stream key.
pub const RECEIVED_EVENTS_KEY_PREFIX: &str = "0000000000000000";

/// Address validation error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Blank after trimming.
    #[error("empty address")]
    Empty,
    /// Not a valid hex string.
    #[error("address is not hex")]
    NotHex,
}

/// Lowercase hex account address.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Parse and normalize an address (case-insensitive hex, stored lowercase).
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        let s = s.to_ascii_lowercase();
        hex::decode(&s).map_err(|_| AddressError::NotHex)?;
        Ok(Self(s))
    }

    /// Address as lowercase hex.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the account's received-events stream.
    pub fn received_events_key(&self) -> String {
        format!("{RECEIVED_EVENTS_KEY_PREFIX}{}", self.0)
    }

    /// Case-insensitive comparison against a raw address reported by the node.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload of a node event. Only the fields the engine reads are modeled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
    /// Event type tag, e.g. `receivedpayment`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Sending account, if any.
    #[serde(default)]
    pub sender: Option<String>,
    /// Receiving account, if any.
    #[serde(default)]
    pub receiver: Option<String>,
}

/// One event as returned by `get_events` or embedded in a transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event stream key.
    #[serde(default)]
    pub key: String,
    /// Sequence number within the stream.
    #[serde(default)]
    pub sequence_number: u64,
    /// Version of the transaction that emitted this event.
    #[serde(default)]
    pub transaction_version: u64,
    /// Event payload.
    #[serde(default)]
    pub data: EventData,
}

impl Event {
    /// True when the event carries a real (non-system) sender.
    pub fn has_nonzero_sender(&self) -> bool {
        match self.data.sender.as_deref() {
            Some(s) => s != ZERO_SENDER,
            None => true,
        }
    }
}

/// One on-chain transaction, flattened from the node's wire shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Global ledger version.
    pub version: u64,
    /// Hex rendering of the serialized transaction.
    pub bytes: String,
    /// Script function name for user transactions.
    pub function_name: Option<String>,
    /// `vm_status.type == "executed"`.
    pub executed: bool,
    /// Sender for user transactions.
    pub sender: Option<String>,
    /// Events, when requested with `include_events`.
    pub events: Vec<Event>,
}

/// Tower state snapshot for one account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerState {
    /// Authoritative count of verified proofs (height of the latest one).
    pub verified_tower_height: u64,
    /// Proofs counted toward the current epoch.
    #[serde(default)]
    pub actual_count_proofs_in_epoch: u64,
    /// Last epoch the account mined in.
    #[serde(default)]
    pub latest_epoch_mining: u64,
    /// Proofs submitted in the current epoch.
    #[serde(default)]
    pub count_proofs_in_epoch: u64,
    /// Epochs spent validating and mining.
    #[serde(default)]
    pub epochs_validating_and_mining: u64,
    /// Contiguous epochs spent validating and mining.
    #[serde(default)]
    pub contiguous_epochs_validating_and_mining: u64,
    /// Epochs since the account last created another account.
    #[serde(default)]
    pub epochs_since_last_account_creation: u64,
}

/// Validator node record from the permission tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorNode {
    /// Operator account submitting proofs for this validator.
    #[serde(default)]
    pub operator_address: Option<String>,
    /// Account that onboarded the validator.
    #[serde(default)]
    pub parent: Option<String>,
}

/// How an account came to exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Onboarding {
    /// Present since genesis.
    Genesis,
    /// Created as a validator by the given account.
    Validator(Option<String>),
    /// Onboarded as a plain miner by the given account.
    User(Option<String>),
}

/// Resolved role of a queried account. Never mutated after resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountRole {
    /// Queried account.
    pub address: Address,
    /// Operator account, for validators that delegate proof submission.
    pub operator_address: Option<Address>,
    /// Whether the account is a validator.
    pub is_validator: bool,
    /// Onboarding provenance.
    pub onboarded_by: Onboarding,
}

/// Wall-clock seconds every archived proof declares.
pub const VDF_ELAPSED_SECS: u64 = 2000;
/// VDF difficulty every archived proof declares.
pub const VDF_DIFFICULTY: u64 = 120_000_000;
/// VDF security parameter every archived proof declares.
pub const VDF_SECURITY: u64 = 512;

/// A reconstructed proof, serialized as one `proof_<height>.json` document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRecord {
    /// Tower height of this proof.
    pub height: u64,
    /// Preimage slice (hex text, verbatim from the payload).
    pub preimage: String,
    /// Proof slice (hex text, verbatim from the payload).
    pub proof: String,
    /// Constant, see [`VDF_ELAPSED_SECS`].
    pub elapsed_secs: u64,
    /// Constant, see [`VDF_DIFFICULTY`].
    pub difficulty: u64,
    /// Constant, see [`VDF_SECURITY`].
    pub security: u64,
}

impl ProofRecord {
    /// Build a record with the network-wide VDF parameters.
    pub fn new(height: u64, preimage: String, proof: String) -> Self {
        Self {
            height,
            preimage,
            proof,
            elapsed_secs: VDF_ELAPSED_SECS,
            difficulty: VDF_DIFFICULTY,
            security: VDF_SECURITY,
        }
    }

    /// Archive entry / attachment name.
    pub fn file_name(&self) -> String {
        format!("proof_{}.json", self.height)
    }
}
