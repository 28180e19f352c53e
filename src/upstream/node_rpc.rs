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

//! JSON-RPC 2.0 client for the full node.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{Lookup, NodeApi, UpstreamError};
use crate::core::{
    config::NodeRpcConfig,
    types::{Event, TowerState, TransactionRecord},
};

const SERVICE: &str = "node";
const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Default, Deserialize)]
struct WireScript {
    #[serde(default)]
    function_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireTxBody {
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    script: Option<WireScript>,
}

#[derive(Debug, Default, Deserialize)]
struct WireVmStatus {
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct WireTransaction {
    version: u64,
    #[serde(default)]
    bytes: String,
    #[serde(default)]
    transaction: WireTxBody,
    #[serde(default)]
    vm_status: WireVmStatus,
    #[serde(default)]
    events: Vec<Event>,
}

impl From<WireTransaction> for TransactionRecord {
    fn from(w: WireTransaction) -> Self {
        Self {
            version: w.version,
            bytes: w.bytes,
            function_name: w.transaction.script.and_then(|s| s.function_name),
            executed: w.vm_status.kind == "executed",
            sender: w.transaction.sender,
            events: w.events,
        }
    }
}

/// Typed JSON-RPC client for the full node.
#[derive(Clone)]
pub struct NodeRpcClient {
    inner: Client,
    url: String,
}

impl NodeRpcClient {
    /// Build a client from config.
    pub fn new(cfg: &NodeRpcConfig) -> Result<Self, UpstreamError> {
        let inner = Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| UpstreamError::Transport { service: SERVICE, detail: e.to_string() })?;
        Ok(Self { inner, url: cfg.rpc_url.clone() })
    }

    /// Endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.url
    }

    /// Issue a call and return the raw `result` (None when the node answers null).
    async fn request(&self, method: &str, params: Value) -> Result<Option<Value>, UpstreamError> {
        let payload = JsonRpcRequest { jsonrpc: JSONRPC_VERSION, id: 1, method, params };
        debug!(method, "node rpc call");

        let response = self
            .inner
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport { service: SERVICE, detail: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status { service: SERVICE, status: status.as_u16() });
        }

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode { service: SERVICE, detail: e.to_string() })?;
        if let Some(err) = body.error {
            return Err(UpstreamError::Rpc { code: err.code, message: err.message });
        }
        Ok(body.result.filter(|v| !v.is_null()))
    }

    async fn call<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<R>, UpstreamError> {
        match self.request(method, params).await? {
            None => Ok(None),
            Some(v) => serde_json::from_value(v)
                .map(Some)
                .map_err(|e| UpstreamError::Decode { service: SERVICE, detail: e.to_string() }),
        }
    }

    async fn call_list<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Vec<R>, UpstreamError> {
        Ok(self.call::<Vec<R>>(method, params).await?.unwrap_or_default())
    }
}

#[async_trait]
impl NodeApi for NodeRpcClient {
    async fn account_transactions(
        &self,
        account: &str,
        start: u64,
        limit: u64,
        include_events: bool,
    ) -> Result<Vec<TransactionRecord>, UpstreamError> {
        let txs: Vec<WireTransaction> = self
            .call_list("get_account_transactions", json!([account, start, limit, include_events]))
            .await?;
        Ok(txs.into_iter().map(TransactionRecord::from).collect())
    }

    async fn events(&self, key: &str, start: u64, limit: u64) -> Result<Vec<Event>, UpstreamError> {
        self.call_list("get_events", json!([key, start, limit])).await
    }

    async fn transactions(
        &self,
        start_version: u64,
        limit: u64,
        include_events: bool,
    ) -> Result<Vec<TransactionRecord>, UpstreamError> {
        let txs: Vec<WireTransaction> = self
            .call_list("get_transactions", json!([start_version, limit, include_events]))
            .await?;
        Ok(txs.into_iter().map(TransactionRecord::from).collect())
    }

    async fn tower_state(&self, account: &str) -> Result<Lookup<TowerState>, UpstreamError> {
        Ok(match self.call::<TowerState>("get_tower_state_view", json!([account])).await? {
            Some(ts) => Lookup::Found(ts),
            None => Lookup::NotFound,
        })
    }
}
