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
#![deny(missing_docs)]

//! Per-request proof history reconstruction.
//!
//! Flow: role resolution and tower state lookup, then one scan per submitting
//! account (run concurrently, each strictly sequential internally), then
//! reconciliation. Nothing is cached; every request rescans from offset 0.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::{
    config::ProofSettings,
    types::{AccountRole, Address, AddressError, TowerState},
};
use crate::monitoring::metrics::Metrics;
use crate::proofs::{
    extract::{self, ExtractError, ExtractedProof, Position, ProofCandidate, Submitter},
    pager::{ScanError, TransactionPager},
    reconcile::{
        reconcile_full, reconcile_latest, GenesisPolicy, HeightCheck, LatestProof, LatestTracker,
        ProofSequence, ReconcileError,
    },
    role::RoleResolver,
};
use crate::upstream::{NodeApi, PermissionTreeApi, UpstreamError};

/// Request-level errors.
#[derive(Debug, Error)]
pub enum ProofError {
    /// Malformed account address.
    #[error("invalid account address")]
    InvalidAddress(#[from] AddressError),
    /// Role resolution hit an upstream failure.
    #[error("error resolving account role: {0}")]
    Role(UpstreamError),
    /// Tower state lookup hit an upstream failure.
    #[error("error fetching tower state: {0}")]
    Tower(UpstreamError),
    /// A transaction scan hit an upstream failure.
    #[error("error iterating through all {stream} account transactions: {source}")]
    Scan {
        /// `miner`, `validator` or `operator`.
        stream: &'static str,
        /// Underlying failure.
        source: UpstreamError,
    },
    /// A scan stopped before reaching the end of the account history.
    #[error("scan of {stream} account transactions stopped early")]
    ScanInterrupted {
        /// `miner`, `validator` or `operator`.
        stream: &'static str,
    },
    /// Node has no tower state for the account.
    #[error("tower state does not exist for provided account")]
    TowerStateMissing,
    /// Complete scan found no proof submissions.
    #[error("no proofs found for provided account")]
    NoProofs,
    /// A proof payload did not fit its layout.
    #[error("malformed proof payload: {0}")]
    Extract(#[from] ExtractError),
}

impl ProofError {
    /// True for failures caused by a remote service.
    pub fn is_upstream(&self) -> bool {
        matches!(self, ProofError::Role(_) | ProofError::Tower(_) | ProofError::Scan { .. })
    }
}

impl From<ReconcileError> for ProofError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::NoProofs => ProofError::NoProofs,
            ReconcileError::Extract(x) => ProofError::Extract(x),
        }
    }
}

/// Accumulates candidates found by one scan.
trait ProofSink: Default + Send {
    fn accept(&mut self, candidate: ProofCandidate) -> Result<(), ExtractError>;
}

impl ProofSink for Vec<ExtractedProof> {
    fn accept(&mut self, candidate: ProofCandidate) -> Result<(), ExtractError> {
        self.push(candidate.slice()?);
        Ok(())
    }
}

impl ProofSink for LatestTracker {
    fn accept(&mut self, candidate: ProofCandidate) -> Result<(), ExtractError> {
        self.observe(candidate);
        Ok(())
    }
}

/// Genesis handling implied by an account's role.
pub fn genesis_policy(role: &AccountRole) -> GenesisPolicy {
    if role.operator_address.is_some() {
        GenesisPolicy::Synthesize
    } else {
        GenesisPolicy::Embedded
    }
}

/// Proof history engine shared by all requests. Holds no per-account state.
pub struct ProofHistory {
    node: Arc<dyn NodeApi>,
    tree: Arc<dyn PermissionTreeApi>,
    settings: ProofSettings,
    metrics: Arc<Metrics>,
}

impl ProofHistory {
    /// Create an engine over the given upstreams.
    pub fn new(
        node: Arc<dyn NodeApi>,
        tree: Arc<dyn PermissionTreeApi>,
        settings: ProofSettings,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self { node, tree, settings, metrics }
    }

    /// Resolve the account's role.
    pub async fn resolve_role(&self, address: &Address) -> Result<AccountRole, ProofError> {
        RoleResolver::new(self.node.as_ref(), self.tree.as_ref(), self.settings.event_scan_limit)
            .resolve(address)
            .await
            .map_err(ProofError::Role)
    }

    /// Tower state, `TowerStateMissing` when the node has none.
    pub async fn tower_state(&self, address: &Address) -> Result<TowerState, ProofError> {
        self.lookup_tower(address).await?.ok_or(ProofError::TowerStateMissing)
    }

    async fn lookup_tower(&self, address: &Address) -> Result<Option<TowerState>, ProofError> {
        Ok(self.node.tower_state(address.as_str()).await.map_err(ProofError::Tower)?.found())
    }

    /// Latest proof, labeled with the tower height.
    ///
    /// An account without proofs is `NoProofs` whether or not it has tower state.
    pub async fn latest(&self, address: &Address) -> Result<LatestProof, ProofError> {
        let (role, tower) = self.prepare(address).await?;
        let genesis = genesis_policy(&role);
        let (validator, operator) = self.gather::<LatestTracker>(&role, genesis).await?;

        if validator.count() + operator.count() == 0 {
            return Err(ProofError::NoProofs);
        }
        let tower = tower.ok_or(ProofError::TowerStateMissing)?;

        let latest = reconcile_latest(validator, operator, genesis, tower.verified_tower_height)?;
        self.observe_check(Some(latest.check));
        info!(
            address = %address,
            height = latest.record.height,
            computed = latest.check.computed,
            "latest proof reconstructed"
        );
        Ok(latest)
    }

    /// Full reconciled history, ready for archiving.
    ///
    /// Tower state only feeds the height check here; it is not required.
    pub async fn archive(&self, address: &Address) -> Result<ProofSequence, ProofError> {
        let (role, tower) = self.prepare(address).await?;
        let genesis = genesis_policy(&role);
        let (validator, operator) = self.gather::<Vec<ExtractedProof>>(&role, genesis).await?;

        let tower_height = tower.map(|t| t.verified_tower_height);
        let sequence = reconcile_full(validator, operator, genesis, tower_height)?;
        self.observe_check(sequence.check());
        info!(
            address = %address,
            records = sequence.len(),
            duplicates = sequence.duplicates(),
            genesis = ?genesis,
            tower = ?tower_height,
            "proof history reconstructed"
        );
        Ok(sequence)
    }

    async fn prepare(&self, address: &Address) -> Result<(AccountRole, Option<TowerState>), ProofError> {
        let (role, tower) = futures::try_join!(self.resolve_role(address), self.lookup_tower(address))?;
        debug!(
            address = %address,
            is_validator = role.is_validator,
            operator = ?role.operator_address,
            tower = tower.is_some(),
            "account role"
        );
        Ok((role, tower))
    }

    async fn gather<S: ProofSink>(
        &self,
        role: &AccountRole,
        genesis: GenesisPolicy,
    ) -> Result<(S, S), ProofError> {
        let (own_stream, first_is_genesis) = match genesis {
            GenesisPolicy::Embedded => ("miner", true),
            GenesisPolicy::Synthesize => ("validator", false),
        };
        let own = self.scan::<S>(&role.address, Submitter::SelfSubmitted, first_is_genesis, own_stream);
        let operator = async {
            match &role.operator_address {
                Some(op) => self.scan::<S>(op, Submitter::Operator, false, "operator").await,
                None => Ok(S::default()),
            }
        };
        futures::try_join!(own, operator)
    }

    async fn scan<S: ProofSink>(
        &self,
        account: &Address,
        submitter: Submitter,
        first_is_genesis: bool,
        stream: &'static str,
    ) -> Result<S, ProofError> {
        let pager = TransactionPager::new(self.node.as_ref(), self.settings.page_size);
        let mut sink = S::default();
        let mut seen = 0u64;
        let mut failure: Option<ExtractError> = None;

        let res = pager
            .paginate(account.as_str(), |page| {
                for tx in page {
                    let position = if first_is_genesis && seen == 0 {
                        Position::First
                    } else {
                        Position::Subsequent
                    };
                    let Some(candidate) = extract::classify(tx, submitter, position) else {
                        continue;
                    };
                    seen += 1;
                    if let Err(e) = sink.accept(candidate) {
                        failure = Some(e);
                        return false;
                    }
                }
                true
            })
            .await;

        if let Some(e) = failure {
            return Err(e.into());
        }
        match res {
            Ok(summary) => {
                self.metrics.scan_pages_total.inc_by(summary.pages);
                debug!(
                    account = %account,
                    stream,
                    pages = summary.pages,
                    transactions = summary.transactions,
                    candidates = seen,
                    "scan complete"
                );
                Ok(sink)
            }
            Err(ScanError::Upstream(source)) => Err(ProofError::Scan { stream, source }),
            Err(ScanError::Halted) => Err(ProofError::ScanInterrupted { stream }),
        }
    }

    fn observe_check(&self, check: Option<HeightCheck>) {
        if check.is_some_and(|c| !c.is_consistent()) {
            self.metrics.tower_mismatch_total.inc();
        }
    }
}
