// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0

//! In-memory upstreams shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use vdf_proof_archive::core::config::ProofSettings;
use vdf_proof_archive::core::types::{Event, EventData, TowerState, TransactionRecord, ValidatorNode};
use vdf_proof_archive::monitoring::metrics::Metrics;
use vdf_proof_archive::proofs::extract::{ProofLayout, Submitter};
use vdf_proof_archive::proofs::ProofHistory;
use vdf_proof_archive::upstream::{Lookup, NodeApi, PermissionTreeApi, UpstreamError};

/// Deterministic 32-char hex address.
pub fn addr(n: u8) -> String {
    format!("{:032x}", 0xa000_0000_0000_0000_0000_0000_0000_0000u128 + n as u128)
}

/// Preimage text a mock payload carries for `version`.
pub fn preimage_for(layout: ProofLayout, version: u64) -> String {
    format!("{:0>width$x}", version, width = layout.preimage.len())
}

/// Proof text a mock payload carries for `version`.
pub fn proof_for(layout: ProofLayout, version: u64) -> String {
    let unit = format!("{:08x}", version);
    unit.repeat(layout.proof.len() / unit.len() + 1)[..layout.proof.len()].to_string()
}

/// Payload with preimage/proof placed at `layout`, padded with `e`.
pub fn payload(layout: ProofLayout, version: u64) -> String {
    let mut s = "e".repeat(layout.required_len() + 16);
    s.replace_range(layout.preimage.start..layout.preimage.end, &preimage_for(layout, version));
    s.replace_range(layout.proof.start..layout.proof.end, &proof_for(layout, version));
    s
}

/// Executed proof submission.
pub fn commit_tx(version: u64, submitter: Submitter, layout: ProofLayout) -> TransactionRecord {
    TransactionRecord {
        version,
        bytes: payload(layout, version),
        function_name: Some(submitter.function_name().to_string()),
        executed: true,
        ..Default::default()
    }
}

/// Any executed non-proof transaction.
pub fn transfer_tx(version: u64) -> TransactionRecord {
    TransactionRecord {
        version,
        bytes: "00".repeat(40),
        function_name: Some("balance_transfer".to_string()),
        executed: true,
        ..Default::default()
    }
}

/// Event with explicit sender / receiver.
pub fn event(version: u64, kind: &str, sender: &str, receiver: &str) -> Event {
    Event {
        key: String::new(),
        sequence_number: 0,
        transaction_version: version,
        data: EventData {
            kind: kind.to_string(),
            sender: Some(sender.to_string()),
            receiver: Some(receiver.to_string()),
        },
    }
}

/// Scripted full node.
#[derive(Default)]
pub struct MockNode {
    pub account_txs: HashMap<String, Vec<TransactionRecord>>,
    pub events: HashMap<String, Vec<Event>>,
    pub ledger: BTreeMap<u64, TransactionRecord>,
    pub towers: HashMap<String, TowerState>,
    /// Accounts whose `account_transactions` fails with an rpc error.
    pub failing_accounts: HashSet<String>,
    /// `(account, start, limit)` of every `account_transactions` call.
    pub calls: Mutex<Vec<(String, u64, u64)>>,
}

impl MockNode {
    pub fn with_account_txs(mut self, account: &str, txs: Vec<TransactionRecord>) -> Self {
        for tx in &txs {
            self.ledger.insert(tx.version, tx.clone());
        }
        self.account_txs.insert(account.to_string(), txs);
        self
    }

    pub fn with_tower(mut self, account: &str, height: u64) -> Self {
        self.towers.insert(
            account.to_string(),
            TowerState { verified_tower_height: height, actual_count_proofs_in_epoch: 3, ..Default::default() },
        );
        self
    }

    pub fn with_events(mut self, key: &str, events: Vec<Event>) -> Self {
        self.events.insert(key.to_string(), events);
        self
    }

    pub fn with_ledger_tx(mut self, tx: TransactionRecord) -> Self {
        self.ledger.insert(tx.version, tx);
        self
    }

    pub fn failing(mut self, account: &str) -> Self {
        self.failing_accounts.insert(account.to_string());
        self
    }

    pub fn calls_for(&self, account: &str) -> Vec<(u64, u64)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(a, _, _)| a == account)
            .map(|(_, s, l)| (*s, *l))
            .collect()
    }
}

#[async_trait]
impl NodeApi for MockNode {
    async fn account_transactions(
        &self,
        account: &str,
        start: u64,
        limit: u64,
        _include_events: bool,
    ) -> Result<Vec<TransactionRecord>, UpstreamError> {
        self.calls.lock().unwrap().push((account.to_string(), start, limit));
        if self.failing_accounts.contains(account) {
            return Err(UpstreamError::Rpc { code: -32000, message: "boom".into() });
        }
        let txs = self.account_txs.get(account).cloned().unwrap_or_default();
        Ok(txs.into_iter().skip(start as usize).take(limit as usize).collect())
    }

    async fn events(&self, key: &str, start: u64, limit: u64) -> Result<Vec<Event>, UpstreamError> {
        let evs = self.events.get(key).cloned().unwrap_or_default();
        Ok(evs.into_iter().skip(start as usize).take(limit as usize).collect())
    }

    async fn transactions(
        &self,
        start_version: u64,
        limit: u64,
        _include_events: bool,
    ) -> Result<Vec<TransactionRecord>, UpstreamError> {
        Ok(self
            .ledger
            .range(start_version..)
            .take(limit as usize)
            .map(|(_, tx)| tx.clone())
            .collect())
    }

    async fn tower_state(&self, account: &str) -> Result<Lookup<TowerState>, UpstreamError> {
        Ok(match self.towers.get(account) {
            Some(ts) => Lookup::Found(ts.clone()),
            None => Lookup::NotFound,
        })
    }
}

/// Scripted permission tree.
#[derive(Default)]
pub struct MockTree {
    pub validators: HashMap<String, ValidatorNode>,
    pub unavailable: bool,
}

impl MockTree {
    pub fn with_validator(mut self, address: &str, operator: &str) -> Self {
        self.validators.insert(
            address.to_string(),
            ValidatorNode { operator_address: Some(operator.to_string()), parent: Some(addr(0)) },
        );
        self
    }
}

#[async_trait]
impl PermissionTreeApi for MockTree {
    async fn validator(&self, address: &str) -> Result<Lookup<ValidatorNode>, UpstreamError> {
        if self.unavailable {
            return Err(UpstreamError::Status { service: "permission-tree", status: 502 });
        }
        Ok(match self.validators.get(address) {
            Some(v) => Lookup::Found(v.clone()),
            None => Lookup::NotFound,
        })
    }
}

/// Engine over the given mocks with default settings.
pub fn history(node: Arc<MockNode>, tree: MockTree) -> ProofHistory {
    history_with(node, tree, ProofSettings::default())
}

/// Engine over the given mocks.
pub fn history_with(node: Arc<MockNode>, tree: MockTree, settings: ProofSettings) -> ProofHistory {
    ProofHistory::new(node, Arc::new(tree), settings, Arc::new(Metrics::new().unwrap()))
}

/// Engine reporting into `metrics`, for tests that read counters back.
pub fn history_with_metrics(node: Arc<MockNode>, tree: MockTree, metrics: Arc<Metrics>) -> ProofHistory {
    ProofHistory::new(node, Arc::new(tree), ProofSettings::default(), metrics)
}
