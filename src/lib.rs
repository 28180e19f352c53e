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

//! VDF proof history reconstruction and archival service.
//!
//! This crate provides:
//! - Paginated scans of an account's on-chain transaction history
//! - Validator / operator role resolution (permission tree + event history fallback)
//! - Fixed-offset extraction of VDF preimage/proof bytes from serialized transactions
//! - Height reconciliation against the chain's tower state
//! - Latest-proof JSON documents and streamed ZIP archives over HTTP
//! - Monitoring via Prometheus metrics and structured logging

/// HTTP surface (axum router and handlers).
pub mod api;
/// Core data model and configuration.
pub mod core;
/// Observability (metrics).
pub mod monitoring;
/// Proof history reconstruction engine.
pub mod proofs;
/// Clients and traits for the full node and permission-tree services.
pub mod upstream;
