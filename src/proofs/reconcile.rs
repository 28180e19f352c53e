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

//! Merge of self- and operator-submitted proofs into one height-ordered sequence.
//!
//! Both inputs are complete before reconciliation starts. Candidates are ordered
//! by ledger version only; the stream a candidate came from does not matter.
//! Heights are contiguous from 0:
//! - `GenesisPolicy::Embedded`: the first candidate is the genesis proof (height 0).
//! - `GenesisPolicy::Synthesize`: a zero-filled genesis record takes height 0 and
//!   candidates start at 1.

use std::collections::{btree_map, BTreeMap};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::types::ProofRecord;
use crate::proofs::extract::{ExtractError, ExtractedProof, ProofCandidate};

/// Width of the synthetic genesis preimage.
pub const GENESIS_PREIMAGE_LEN: usize = 2048;
/// Width of the synthetic genesis proof.
pub const GENESIS_PROOF_LEN: usize = 2772;

/// Reconciliation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Neither stream produced a candidate.
    #[error("no proofs found")]
    NoProofs,
    /// Latest candidate could not be sliced.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Where the height-0 record comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenesisPolicy {
    /// First self submission carries the genesis proof.
    Embedded,
    /// Genesis proof is not in the history; emit a zero-filled stand-in.
    Synthesize,
}

impl GenesisPolicy {
    /// Top height implied by `count` real candidates (`count >= 1`).
    pub fn top_height(self, count: u64) -> u64 {
        match self {
            GenesisPolicy::Embedded => count.saturating_sub(1),
            GenesisPolicy::Synthesize => count,
        }
    }
}

/// Zero-filled genesis record used when the genesis proof is not recoverable.
pub fn genesis_record() -> ProofRecord {
    ProofRecord::new(0, "0".repeat(GENESIS_PREIMAGE_LEN), "0".repeat(GENESIS_PROOF_LEN))
}

/// Computed vs. authoritative top height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeightCheck {
    /// Height implied by the reconstructed sequence.
    pub computed: u64,
    /// `verified_tower_height` from the node.
    pub tower: u64,
}

impl HeightCheck {
    /// True when both heights agree.
    pub fn is_consistent(&self) -> bool {
        self.computed == self.tower
    }

    fn report(&self, mode: &'static str) {
        if !self.is_consistent() {
            warn!(
                mode,
                computed = self.computed,
                tower = self.tower,
                "reconstructed height differs from tower height"
            );
        }
    }
}

/// Running state for latest-only reconstruction: the highest-version candidate and a count.
#[derive(Clone, Debug, Default)]
pub struct LatestTracker {
    latest: Option<ProofCandidate>,
    count: u64,
}

impl LatestTracker {
    /// Record one candidate.
    pub fn observe(&mut self, candidate: ProofCandidate) {
        self.count += 1;
        let newer = match &self.latest {
            None => true,
            Some(cur) => candidate.version > cur.version,
        };
        if newer {
            self.latest = Some(candidate);
        }
    }

    /// Candidates observed so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Highest-version candidate so far.
    pub fn latest(&self) -> Option<&ProofCandidate> {
        self.latest.as_ref()
    }

    /// Combine two independently gathered trackers.
    pub fn merge(mut self, other: LatestTracker) -> LatestTracker {
        let count = self.count + other.count;
        if let Some(c) = other.latest {
            self.observe(c);
        }
        self.count = count;
        self
    }
}

/// Result of latest-only reconciliation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LatestProof {
    /// Record labeled with the tower height.
    pub record: ProofRecord,
    /// Height comparison.
    pub check: HeightCheck,
}

/// Latest-only mode: extract the newest candidate across both streams.
///
/// The emitted `height` is always the tower height; a disagreement with the
/// locally computed height is logged, not fatal.
pub fn reconcile_latest(
    validator: LatestTracker,
    operator: LatestTracker,
    genesis: GenesisPolicy,
    tower_height: u64,
) -> Result<LatestProof, ReconcileError> {
    let merged = validator.merge(operator);
    let Some(candidate) = merged.latest() else {
        return Err(ReconcileError::NoProofs);
    };

    let check = HeightCheck { computed: genesis.top_height(merged.count()), tower: tower_height };
    check.report("latest");

    let extracted = candidate.slice()?;
    Ok(LatestProof {
        record: ProofRecord::new(tower_height, extracted.preimage, extracted.proof),
        check,
    })
}

/// Reconciled full history, ready to be streamed.
#[derive(Debug)]
pub struct ProofSequence {
    merged: BTreeMap<u64, ExtractedProof>,
    genesis: GenesisPolicy,
    check: Option<HeightCheck>,
    duplicates: u64,
}

impl ProofSequence {
    /// Number of records the sequence will yield (including a synthetic genesis).
    pub fn len(&self) -> usize {
        match self.genesis {
            GenesisPolicy::Embedded => self.merged.len(),
            GenesisPolicy::Synthesize => self.merged.len() + 1,
        }
    }

    /// Never true for a reconciled sequence.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Height comparison; `None` when the node had no tower state.
    pub fn check(&self) -> Option<HeightCheck> {
        self.check
    }

    /// Candidates dropped because another one carried the same version.
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    /// Genesis handling applied.
    pub fn genesis(&self) -> GenesisPolicy {
        self.genesis
    }

    /// Lazily build records in height order.
    pub fn into_records(self) -> ProofRecords {
        let (genesis, next_height) = match self.genesis {
            GenesisPolicy::Embedded => (None, 0),
            GenesisPolicy::Synthesize => (Some(genesis_record()), 1),
        };
        ProofRecords { genesis, next_height, inner: self.merged.into_values() }
    }
}

/// Iterator over a reconciled sequence.
#[derive(Debug)]
pub struct ProofRecords {
    genesis: Option<ProofRecord>,
    next_height: u64,
    inner: btree_map::IntoValues<u64, ExtractedProof>,
}

impl Iterator for ProofRecords {
    type Item = ProofRecord;

    fn next(&mut self) -> Option<ProofRecord> {
        if let Some(g) = self.genesis.take() {
            return Some(g);
        }
        let p = self.inner.next()?;
        let height = self.next_height;
        self.next_height += 1;
        Some(ProofRecord::new(height, p.preimage, p.proof))
    }
}

/// Full-archive mode: merge both streams by ascending version.
///
/// A height mismatch is logged; archive heights stay contiguous local heights.
/// Without a tower height the comparison is skipped. A version reported twice
/// is one ledger transaction, so only its first candidate is kept.
pub fn reconcile_full(
    validator: Vec<ExtractedProof>,
    operator: Vec<ExtractedProof>,
    genesis: GenesisPolicy,
    tower_height: Option<u64>,
) -> Result<ProofSequence, ReconcileError> {
    let mut merged: BTreeMap<u64, ExtractedProof> = BTreeMap::new();
    let mut duplicates = 0u64;
    for p in validator.into_iter().chain(operator) {
        match merged.entry(p.version) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(p);
            }
            btree_map::Entry::Occupied(kept) => {
                duplicates += 1;
                warn!(
                    version = p.version,
                    kept = ?kept.get().submitter,
                    dropped = ?p.submitter,
                    "duplicate proof version"
                );
            }
        }
    }
    if merged.is_empty() {
        return Err(ReconcileError::NoProofs);
    }

    let computed = genesis.top_height(merged.len() as u64);
    let check = match tower_height {
        Some(tower) => {
            let check = HeightCheck { computed, tower };
            check.report("full");
            Some(check)
        }
        None => {
            debug!(computed, "no tower state, height check skipped");
            None
        }
    };

    Ok(ProofSequence { merged, genesis, check, duplicates })
}
