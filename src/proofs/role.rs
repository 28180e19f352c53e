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

//! Validator / operator role resolution.
//!
//! Fast path is the permission tree. On a miss the account's received-events
//! stream is scanned for its onboarding transaction; accounts without one are
//! attributed to genesis, whose first transaction may still name an operator.

use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::core::types::{AccountRole, Address, Onboarding, TransactionRecord};
use crate::upstream::{Lookup, NodeApi, PermissionTreeApi, UpstreamError};

/// Script function creating a validator account.
pub const CREATE_VALIDATOR_FUNCTION: &str = "create_acc_val";
/// Script function onboarding a plain miner.
pub const CREATE_USER_FUNCTION: &str = "create_user_by_coin_tx";
/// Event type funding the operator account during validator creation.
pub const RECEIVED_PAYMENT_EVENT: &str = "receivedpayment";

/// Resolves an [`AccountRole`] once per request.
pub struct RoleResolver<'a> {
    node: &'a dyn NodeApi,
    tree: &'a dyn PermissionTreeApi,
    event_scan_limit: u64,
}

impl<'a> RoleResolver<'a> {
    /// Create a resolver.
    pub fn new(node: &'a dyn NodeApi, tree: &'a dyn PermissionTreeApi, event_scan_limit: u64) -> Self {
        Self { node, tree, event_scan_limit: event_scan_limit.max(1) }
    }

    /// Resolve the role of `address`. Remote errors propagate unchanged.
    pub async fn resolve(&self, address: &Address) -> Result<AccountRole, UpstreamError> {
        if let Lookup::Found(node) = self.tree.validator(address.as_str()).await? {
            debug!(address = %address, "validator found in permission tree");
            return Ok(AccountRole {
                address: address.clone(),
                operator_address: node.operator_address.as_deref().and_then(parse_related),
                is_validator: true,
                onboarded_by: Onboarding::Validator(node.parent),
            });
        }
        self.resolve_from_history(address).await
    }

    async fn resolve_from_history(&self, address: &Address) -> Result<AccountRole, UpstreamError> {
        let events = self
            .node
            .events(&address.received_events_key(), 0, self.event_scan_limit)
            .await?;
        let origins = try_join_all(
            events
                .iter()
                .filter(|e| e.has_nonzero_sender())
                .map(|e| self.node.transactions(e.transaction_version, 1, true)),
        )
        .await?;

        let mut onboarded_by = None;
        let mut operator = None;
        let mut is_validator = false;

        for tx in origins.into_iter().filter_map(|txs| txs.into_iter().next()) {
            match tx.function_name.as_deref() {
                Some(CREATE_VALIDATOR_FUNCTION) => {
                    if let Some(op) = funded_operator(&tx, address) {
                        operator = Some(op);
                    }
                    is_validator = true;
                    onboarded_by = Some(Onboarding::Validator(tx.sender.clone()));
                }
                Some(CREATE_USER_FUNCTION) => {
                    onboarded_by = Some(Onboarding::User(tx.sender.clone()));
                }
                _ => {}
            }
        }

        let onboarded_by = match onboarded_by {
            Some(o) => o,
            None => {
                operator = self.genesis_operator(address).await?;
                is_validator = operator.is_some();
                Onboarding::Genesis
            }
        };

        debug!(address = %address, ?onboarded_by, operator = ?operator, "role resolved from history");
        Ok(AccountRole {
            address: address.clone(),
            operator_address: operator,
            is_validator,
            onboarded_by,
        })
    }

    async fn genesis_operator(&self, address: &Address) -> Result<Option<Address>, UpstreamError> {
        let genesis = self.node.transactions(0, 1, true).await?;
        let Some(tx) = genesis.first() else {
            return Ok(None);
        };
        Ok(tx
            .events
            .iter()
            .find(|e| e.data.sender.as_deref().is_some_and(|s| address.matches(s)))
            .and_then(|e| e.data.receiver.as_deref())
            .and_then(parse_related))
    }
}

/// Receiver of a `receivedpayment` event that is not the queried account.
fn funded_operator(tx: &TransactionRecord, address: &Address) -> Option<Address> {
    tx.events
        .iter()
        .filter(|e| e.data.kind == RECEIVED_PAYMENT_EVENT)
        .filter_map(|e| e.data.receiver.as_deref())
        .find(|r| !address.matches(r))
        .and_then(parse_related)
}

fn parse_related(raw: &str) -> Option<Address> {
    if raw.trim().is_empty() {
        return None;
    }
    match Address::parse(raw) {
        Ok(a) => Some(a),
        Err(e) => {
            warn!(raw, error = %e, "ignoring malformed related address");
            None
        }
    }
}
