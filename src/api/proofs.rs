// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0

//! Proof download handlers.

#![forbid(unsafe_code)]

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{ApiError, AppState};
use crate::core::types::Address;
use crate::proofs::archive::{archive_file_name, latest_document, stream_archive};

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{file_name}\"")
}

fn parse_address(state: &AppState, raw: &str) -> Result<Address, ApiError> {
    Address::parse(raw).map_err(|e| ApiError::from_proof(e.into(), &state.metrics))
}

/// `GET /proofs/:address`: every proof as a streamed ZIP.
pub(super) async fn archive(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, ApiError> {
    state.metrics.archive_requests_total.inc();
    let address = parse_address(&state, &raw)?;

    let sequence = state
        .history
        .archive(&address)
        .await
        .map_err(|e| ApiError::from_proof(e, &state.metrics))?;
    state.metrics.records_emitted_total.inc_by(sequence.len() as u64);

    let file_name = archive_file_name(&address, unix_now());
    let body = Body::from_stream(stream_archive(address, sequence.into_records()));
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&file_name)),
        ],
        body,
    )
        .into_response())
}

/// `GET /api/proofs/:address`: latest proof, height forced to the tower height.
pub(super) async fn latest(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, ApiError> {
    state.metrics.latest_requests_total.inc();
    let address = parse_address(&state, &raw)?;

    let latest = state
        .history
        .latest(&address)
        .await
        .map_err(|e| ApiError::from_proof(e, &state.metrics))?;
    let doc = latest_document(&latest.record)
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    state.metrics.records_emitted_total.inc();

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&latest.record.file_name())),
        ],
        doc,
    )
        .into_response())
}
