// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0

//! REST client for the permission tree service.

#![forbid(unsafe_code)]

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::{Lookup, PermissionTreeApi, UpstreamError};
use crate::core::{config::PermissionTreeConfig, types::ValidatorNode};

const SERVICE: &str = "permission-tree";

/// Permission tree client.
#[derive(Clone)]
pub struct PermissionTreeClient {
    inner: Client,
    base_url: String,
}

impl PermissionTreeClient {
    /// Build a client from config.
    pub fn new(cfg: &PermissionTreeConfig) -> Result<Self, UpstreamError> {
        let inner = Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| UpstreamError::Transport { service: SERVICE, detail: e.to_string() })?;
        Ok(Self {
            inner,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn validator_url(&self, address: &str) -> String {
        format!("{}/permission-tree/validator/{}", self.base_url, address)
    }
}

#[async_trait]
impl PermissionTreeApi for PermissionTreeClient {
    async fn validator(&self, address: &str) -> Result<Lookup<ValidatorNode>, UpstreamError> {
        let response = self
            .inner
            .get(self.validator_url(address))
            .send()
            .await
            .map_err(|e| UpstreamError::Transport { service: SERVICE, detail: e.to_string() })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Lookup::NotFound);
        }
        if !status.is_success() {
            return Err(UpstreamError::Status { service: SERVICE, status: status.as_u16() });
        }

        let node: ValidatorNode = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode { service: SERVICE, detail: e.to_string() })?;
        Ok(Lookup::Found(node))
    }
}
