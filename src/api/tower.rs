// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0

//! Batch tower state lookup.

#![forbid(unsafe_code)]

use axum::{extract::State, http::StatusCode, Json};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{ApiError, AppState};
use crate::core::types::Address;
use crate::proofs::ProofError;

/// Tower counters reported per account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerSummary {
    /// Proofs counted toward the current epoch.
    pub actual_count_proofs_in_epoch: u64,
    /// Verified tower height.
    pub verified_tower_height: u64,
}

/// `POST /tower/inactive`: body is a JSON array of account addresses.
///
/// Accounts without tower state are left out of the response.
pub(super) async fn inactive(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<BTreeMap<String, TowerSummary>>, ApiError> {
    let Value::Array(items) = body else {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "expected a JSON array of accounts"));
    };
    let accounts = items
        .iter()
        .map(|v| v.as_str().and_then(|s| Address::parse(s).ok()))
        .collect::<Option<Vec<Address>>>()
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "invalid account address"))?;

    let history = &state.history;
    let found = try_join_all(accounts.iter().map(|account| async move {
        match history.tower_state(account).await {
            Ok(ts) => Ok(Some((account.to_string(), ts))),
            Err(ProofError::TowerStateMissing) => Ok(None),
            Err(e) => Err(e),
        }
    }))
    .await
    .map_err(|e| ApiError::from_proof(e, &state.metrics))?;

    Ok(Json(
        found
            .into_iter()
            .flatten()
            .map(|(account, ts)| {
                let summary = TowerSummary {
                    actual_count_proofs_in_epoch: ts.actual_count_proofs_in_epoch,
                    verified_tower_height: ts.verified_tower_height,
                };
                (account, summary)
            })
            .collect(),
    ))
}
