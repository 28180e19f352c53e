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

//! HTTP surface.
//!
//! | route | response |
//! |---|---|
//! | `GET /proofs/:address` | streamed ZIP of every proof |
//! | `GET /api/proofs/:address` | latest proof as a JSON attachment |
//! | `POST /tower/inactive` | tower summaries for a list of accounts |
//! | `GET /metrics` | Prometheus text |
//! | `GET /health` | liveness |

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::{error, warn};

use crate::monitoring::metrics::Metrics;
use crate::proofs::{ProofError, ProofHistory};

mod proofs;
mod tower;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Reconstruction engine.
    pub history: Arc<ProofHistory>,
    /// Metrics registry.
    pub metrics: Arc<Metrics>,
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/proofs/:address", get(proofs::archive))
        .route("/api/proofs/:address", get(proofs::latest))
        .route("/tower/inactive", post(tower::inactive))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Error response: status plus a short plain-text diagnostic.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Explicit status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    /// Map an engine error, counting it and logging it.
    pub fn from_proof(err: ProofError, metrics: &Metrics) -> Self {
        let status = match &err {
            ProofError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            ProofError::TowerStateMissing | ProofError::NoProofs => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if err.is_upstream() {
            metrics.upstream_failures_total.inc();
        }
        if matches!(err, ProofError::NoProofs) {
            metrics.no_proofs_total.inc();
        }
        if status.is_server_error() {
            error!(error = %err, "proof request failed");
        } else {
            warn!(error = %err, "proof request rejected");
        }
        Self::new(status, err.to_string())
    }

    /// Status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}
