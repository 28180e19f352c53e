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

//! Service configuration (TOML file + environment overrides).
//!
//! ```text
//! [http]
//! listen_addr = "0.0.0.0:3027"
//!
//! [node]
//! rpc_url = "http://127.0.0.1:8080"
//! timeout_ms = 30000
//!
//! [permission_tree]
//! base_url = "http://127.0.0.1:3028"
//! timeout_ms = 10000
//!
//! [proofs]
//! page_size = 1000
//! event_scan_limit = 20
//! ```

use serde::{Deserialize, Serialize};
use std::{fs, time::Duration};
use thiserror::Error;

/// Transactions requested per page when scanning account history.
pub const DEFAULT_PAGE_SIZE: u64 = 1000;
/// Events inspected when resolving an account's onboarding transaction.
pub const DEFAULT_EVENT_SCAN_LIMIT: u64 = 20;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("read config")]
    Read,
    /// Malformed TOML.
    #[error("parse config: {0}")]
    Parse(String),
    /// Parsed but unusable.
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Configuration root.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP listener.
    #[serde(default)]
    pub http: HttpConfig,
    /// Full node JSON-RPC endpoint.
    #[serde(default)]
    pub node: NodeRpcConfig,
    /// Permission tree service.
    #[serde(default)]
    pub permission_tree: PermissionTreeConfig,
    /// Proof engine tuning.
    #[serde(default)]
    pub proofs: ProofSettings,
}

/// HTTP config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Listen address, e.g. 0.0.0.0:3027.
    pub listen_addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { listen_addr: "0.0.0.0:3027".to_string() }
    }
}

/// Full node config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeRpcConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Per-request timeout.
    #[serde(default = "default_node_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_node_timeout_ms() -> u64 {
    30_000
}

impl Default for NodeRpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8080".to_string(),
            timeout_ms: default_node_timeout_ms(),
        }
    }
}

impl NodeRpcConfig {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Permission tree config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PermissionTreeConfig {
    /// Base URL (private network address).
    pub base_url: String,
    /// Per-request timeout.
    #[serde(default = "default_tree_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_tree_timeout_ms() -> u64 {
    10_000
}

impl Default for PermissionTreeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3028".to_string(),
            timeout_ms: default_tree_timeout_ms(),
        }
    }
}

impl PermissionTreeConfig {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Proof engine tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProofSettings {
    /// Transactions per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Events inspected by the role fallback path.
    #[serde(default = "default_event_scan_limit")]
    pub event_scan_limit: u64,
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_event_scan_limit() -> u64 {
    DEFAULT_EVENT_SCAN_LIMIT
}

impl Default for ProofSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            event_scan_limit: DEFAULT_EVENT_SCAN_LIMIT,
        }
    }
}

impl ServiceConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.message().to_string()))
    }

    /// Load from an optional file, apply environment overrides, validate.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut cfg = match path {
            Some(p) => {
                let raw = fs::read_to_string(p).map_err(|_| ConfigError::Read)?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `NODE_HOSTNAME`, `PERMISSION_TREE_API_PRIVATE_URL` and `PORT`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        if let Some(host) = non_empty("NODE_HOSTNAME") {
            self.node.rpc_url = format!("http://{}:8080", host.trim());
        }
        if let Some(url) = non_empty("PERMISSION_TREE_API_PRIVATE_URL") {
            self.permission_tree.base_url = url.trim().to_string();
        }
        if let Some(port) = non_empty("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            let host = self
                .http
                .listen_addr
                .rsplit_once(':')
                .map(|(h, _)| h.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.http.listen_addr = format!("{host}:{port}");
        }
    }

    /// Reject unusable settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.proofs.page_size == 0 {
            return Err(ConfigError::Invalid("proofs.page_size must be > 0"));
        }
        if self.proofs.event_scan_limit == 0 {
            return Err(ConfigError::Invalid("proofs.event_scan_limit must be > 0"));
        }
        if self.node.rpc_url.trim().is_empty() {
            return Err(ConfigError::Invalid("node.rpc_url is empty"));
        }
        if self.permission_tree.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("permission_tree.base_url is empty"));
        }
        Ok(())
    }
}
