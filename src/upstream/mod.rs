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

//! Upstream service seams.
//!
//! Every remote call resolves to one of three explicit outcomes:
//! `Ok(Lookup::Found(_))`, `Ok(Lookup::NotFound)`, or `Err(UpstreamError)`.
//! List-shaped calls have no `NotFound` case: an empty list is a valid answer.
//! An `Err` always aborts the current scan; nothing here retries.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{Event, TowerState, TransactionRecord, ValidatorNode};

pub mod node_rpc;
pub mod permission_tree;

/// Upstream failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Non-success HTTP status.
    #[error("{service} answered http {status}")]
    Status {
        /// Service that answered.
        service: &'static str,
        /// HTTP status code.
        status: u16,
    },
    /// JSON-RPC error object on an otherwise successful response.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the node.
        message: String,
    },
    /// Connection / timeout failure.
    #[error("{service} transport: {detail}")]
    Transport {
        /// Service being called.
        service: &'static str,
        /// Client error text.
        detail: String,
    },
    /// Response body did not match the expected shape.
    #[error("{service} decode: {detail}")]
    Decode {
        /// Service that answered.
        service: &'static str,
        /// Decoder error text.
        detail: String,
    },
}

/// Result of a single-object lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    /// Object exists.
    Found(T),
    /// Service answered, object does not exist.
    NotFound,
}

impl<T> Lookup<T> {
    /// Convert to an option.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NotFound => None,
        }
    }
}

/// Full node JSON-RPC surface used by the proof engine.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// `get_account_transactions(account, start, limit, include_events)`.
    async fn account_transactions(
        &self,
        account: &str,
        start: u64,
        limit: u64,
        include_events: bool,
    ) -> Result<Vec<TransactionRecord>, UpstreamError>;

    /// `get_events(key, start, limit)`.
    async fn events(&self, key: &str, start: u64, limit: u64) -> Result<Vec<Event>, UpstreamError>;

    /// `get_transactions(start_version, limit, include_events)`.
    async fn transactions(
        &self,
        start_version: u64,
        limit: u64,
        include_events: bool,
    ) -> Result<Vec<TransactionRecord>, UpstreamError>;

    /// `get_tower_state_view(account)`; a null result is `NotFound`.
    async fn tower_state(&self, account: &str) -> Result<Lookup<TowerState>, UpstreamError>;
}

/// Permission tree lookups.
#[async_trait]
pub trait PermissionTreeApi: Send + Sync {
    /// `GET /permission-tree/validator/{address}`; HTTP 404 is `NotFound`.
    async fn validator(&self, address: &str) -> Result<Lookup<ValidatorNode>, UpstreamError>;
}
