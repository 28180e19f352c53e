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

use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use thiserror::Error;

/// Metrics errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus")]
    Prom,
}

/// Metrics container.
#[derive(Clone)]
pub struct Metrics {
    /// Registry.
    pub registry: Registry,

    /// Full archive requests.
    pub archive_requests_total: IntCounter,
    /// Latest-proof requests.
    pub latest_requests_total: IntCounter,
    /// Proof records emitted (archive entries + latest documents).
    pub records_emitted_total: IntCounter,
    /// Transaction pages fetched by scans.
    pub scan_pages_total: IntCounter,
    /// Requests aborted by an upstream failure.
    pub upstream_failures_total: IntCounter,
    /// Reconstructions whose top height disagreed with the tower.
    pub tower_mismatch_total: IntCounter,
    /// Requests for accounts without any proof.
    pub no_proofs_total: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, MetricsError> {
    let c = IntCounter::new(name, help).map_err(|_| MetricsError::Prom)?;
    registry
        .register(Box::new(c.clone()))
        .map_err(|_| MetricsError::Prom)?;
    Ok(c)
}

impl Metrics {
    /// Create and register metrics.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let archive_requests_total =
            counter(&registry, "vdf_archive_requests_total", "Full proof archive requests")?;
        let latest_requests_total =
            counter(&registry, "vdf_latest_requests_total", "Latest proof requests")?;
        let records_emitted_total =
            counter(&registry, "vdf_records_emitted_total", "Proof records emitted")?;
        let scan_pages_total =
            counter(&registry, "vdf_scan_pages_total", "Transaction pages fetched")?;
        let upstream_failures_total = counter(
            &registry,
            "vdf_upstream_failures_total",
            "Requests aborted by upstream failures",
        )?;
        let tower_mismatch_total = counter(
            &registry,
            "vdf_tower_mismatch_total",
            "Reconstructed height differs from tower height",
        )?;
        let no_proofs_total =
            counter(&registry, "vdf_no_proofs_total", "Requests for accounts without proofs")?;

        Ok(Self {
            registry,
            archive_requests_total,
            latest_requests_total,
            records_emitted_total,
            scan_pages_total,
            upstream_failures_total,
            tower_mismatch_total,
            no_proofs_total,
        })
    }

    /// Prometheus text exposition of the registry.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .map_err(|_| MetricsError::Prom)?;
        String::from_utf8(buf).map_err(|_| MetricsError::Prom)
    }
}
