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

mod common;

use std::sync::Arc;

use common::{addr, commit_tx, history, preimage_for, proof_for, transfer_tx, MockNode, MockTree};
use vdf_proof_archive::core::config::ProofSettings;
use vdf_proof_archive::core::types::{Address, ProofRecord, TransactionRecord};
use vdf_proof_archive::monitoring::metrics::Metrics;
use vdf_proof_archive::proofs::extract::{
    ExtractError, Submitter, OPERATOR_LAYOUT, SELF_FIRST_LAYOUT, SELF_SUBSEQUENT_LAYOUT,
};
use vdf_proof_archive::proofs::reconcile::{genesis_record, GenesisPolicy};
use vdf_proof_archive::proofs::{ProofError, ProofHistory};

fn miner_history(versions: &[u64]) -> Vec<TransactionRecord> {
    versions
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let layout = if i == 0 { SELF_FIRST_LAYOUT } else { SELF_SUBSEQUENT_LAYOUT };
            commit_tx(*v, Submitter::SelfSubmitted, layout)
        })
        .collect()
}

fn parse(a: &str) -> Address {
    Address::parse(a).unwrap()
}

#[tokio::test]
async fn self_only_account_embeds_genesis() {
    let a = addr(1);
    let mut txs = miner_history(&[5, 9, 14]);
    txs.insert(1, transfer_tx(7));
    let node = Arc::new(MockNode::default().with_account_txs(&a, txs).with_tower(&a, 2));
    let engine = history(node, MockTree::default());

    let seq = engine.archive(&parse(&a)).await.unwrap();
    assert_eq!(seq.genesis(), GenesisPolicy::Embedded);
    assert!(seq.check().is_some_and(|c| c.is_consistent()));

    let records: Vec<ProofRecord> = seq.into_records().collect();
    assert_eq!(records.iter().map(|r| r.height).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(records[0].preimage, preimage_for(SELF_FIRST_LAYOUT, 5));
    assert_eq!(records[0].preimage.len(), 2048);
    assert_eq!(records[0].proof, proof_for(SELF_FIRST_LAYOUT, 5));
    assert_eq!(records[1].preimage, preimage_for(SELF_SUBSEQUENT_LAYOUT, 9));
    assert_eq!(records[2].proof, proof_for(SELF_SUBSEQUENT_LAYOUT, 14));
}

#[tokio::test]
async fn operator_paired_account_synthesizes_genesis() {
    let a = addr(1);
    let op = addr(2);
    let node = Arc::new(
        MockNode::default()
            .with_account_txs(
                &a,
                vec![
                    commit_tx(10, Submitter::SelfSubmitted, SELF_SUBSEQUENT_LAYOUT),
                    commit_tx(30, Submitter::SelfSubmitted, SELF_SUBSEQUENT_LAYOUT),
                ],
            )
            .with_account_txs(
                &op,
                vec![transfer_tx(15), commit_tx(20, Submitter::Operator, OPERATOR_LAYOUT)],
            )
            .with_tower(&a, 3),
    );
    let engine = history(node, MockTree::default().with_validator(&a, &op));

    let records: Vec<ProofRecord> = engine.archive(&parse(&a)).await.unwrap().into_records().collect();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0], genesis_record());
    assert_eq!(records[1].height, 1);
    assert_eq!(records[1].preimage, preimage_for(SELF_SUBSEQUENT_LAYOUT, 10));
    assert_eq!(records[2].height, 2);
    assert_eq!(records[2].preimage, preimage_for(OPERATOR_LAYOUT, 20));
    assert_eq!(records[3].height, 3);
    assert_eq!(records[3].proof, proof_for(SELF_SUBSEQUENT_LAYOUT, 30));
}

#[tokio::test]
async fn failed_and_foreign_submissions_are_skipped() {
    let a = addr(3);
    let mut failed = commit_tx(8, Submitter::SelfSubmitted, SELF_SUBSEQUENT_LAYOUT);
    failed.executed = false;
    // Operator-style submission sent from the account itself.
    let foreign = commit_tx(11, Submitter::Operator, OPERATOR_LAYOUT);
    let mut txs = miner_history(&[4, 12]);
    txs.insert(1, failed);
    txs.insert(2, foreign);
    let node = Arc::new(MockNode::default().with_account_txs(&a, txs).with_tower(&a, 1));

    let seq = history(node, MockTree::default()).archive(&parse(&a)).await.unwrap();
    assert_eq!(seq.len(), 2);
    let records: Vec<ProofRecord> = seq.into_records().collect();
    assert_eq!(records[1].preimage, preimage_for(SELF_SUBSEQUENT_LAYOUT, 12));
}

#[tokio::test]
async fn latest_is_labeled_with_tower_height() {
    let a = addr(4);
    let node = Arc::new(
        MockNode::default()
            .with_account_txs(&a, miner_history(&[1, 2, 3]))
            .with_tower(&a, 40),
    );
    let metrics = Arc::new(Metrics::new().unwrap());
    let engine = ProofHistory::new(node, Arc::new(MockTree::default()), ProofSettings::default(), metrics.clone());

    let latest = engine.latest(&parse(&a)).await.unwrap();
    assert_eq!(latest.record.height, 40);
    assert_eq!(latest.record.file_name(), "proof_40.json");
    assert_eq!(latest.record.preimage, preimage_for(SELF_SUBSEQUENT_LAYOUT, 3));
    assert_eq!(latest.check.computed, 2);
    assert!(!latest.check.is_consistent());
    assert_eq!(metrics.tower_mismatch_total.get(), 1);
}

#[tokio::test]
async fn latest_of_a_single_proof_uses_the_genesis_layout() {
    let a = addr(5);
    let node = Arc::new(
        MockNode::default()
            .with_account_txs(&a, miner_history(&[77]))
            .with_tower(&a, 0),
    );

    let latest = history(node, MockTree::default()).latest(&parse(&a)).await.unwrap();
    assert_eq!(latest.record.height, 0);
    assert_eq!(latest.record.preimage.len(), 2048);
    assert!(latest.check.is_consistent());
}

#[tokio::test]
async fn latest_spans_both_streams() {
    let a = addr(6);
    let op = addr(7);
    let node = Arc::new(
        MockNode::default()
            .with_account_txs(&a, vec![commit_tx(10, Submitter::SelfSubmitted, SELF_SUBSEQUENT_LAYOUT)])
            .with_account_txs(&op, vec![commit_tx(25, Submitter::Operator, OPERATOR_LAYOUT)])
            .with_tower(&a, 2),
    );

    let latest = history(node, MockTree::default().with_validator(&a, &op))
        .latest(&parse(&a))
        .await
        .unwrap();
    assert_eq!(latest.record.preimage, preimage_for(OPERATOR_LAYOUT, 25));
    assert!(latest.check.is_consistent());
}

#[tokio::test]
async fn full_mode_keeps_contiguous_heights_on_mismatch() {
    let a = addr(8);
    let node = Arc::new(
        MockNode::default()
            .with_account_txs(&a, miner_history(&[1, 2]))
            .with_tower(&a, 9),
    );

    let seq = history(node, MockTree::default()).archive(&parse(&a)).await.unwrap();
    assert!(seq.check().is_some_and(|c| !c.is_consistent()));
    let heights: Vec<u64> = seq.into_records().map(|r| r.height).collect();
    assert_eq!(heights, vec![0, 1]);
}

#[tokio::test]
async fn no_proofs_and_missing_tower_are_distinct() {
    let a = addr(9);
    let node = Arc::new(MockNode::default().with_account_txs(&a, vec![transfer_tx(1)]).with_tower(&a, 0));
    let err = history(node, MockTree::default()).archive(&parse(&a)).await.unwrap_err();
    assert!(matches!(err, ProofError::NoProofs));

    let node = Arc::new(MockNode::default().with_account_txs(&a, miner_history(&[1])));
    let err = history(node, MockTree::default()).latest(&parse(&a)).await.unwrap_err();
    assert!(matches!(err, ProofError::TowerStateMissing));
}

#[tokio::test]
async fn unknown_account_has_no_proofs_in_both_modes() {
    let a = parse(&addr(42));
    let node = Arc::new(MockNode::default());

    let err = history(node.clone(), MockTree::default()).archive(&a).await.unwrap_err();
    assert!(matches!(err, ProofError::NoProofs));
    let err = history(node, MockTree::default()).latest(&a).await.unwrap_err();
    assert!(matches!(err, ProofError::NoProofs));
}

#[tokio::test]
async fn archive_does_not_need_tower_state() {
    let a = addr(13);
    let node = Arc::new(MockNode::default().with_account_txs(&a, miner_history(&[4, 9])));

    let seq = history(node, MockTree::default()).archive(&parse(&a)).await.unwrap();
    assert_eq!(seq.check(), None);
    let heights: Vec<u64> = seq.into_records().map(|r| r.height).collect();
    assert_eq!(heights, vec![0, 1]);
}

#[tokio::test]
async fn operator_scan_failure_aborts_the_request() {
    let a = addr(10);
    let op = addr(11);
    let node = Arc::new(
        MockNode::default()
            .with_account_txs(&a, vec![commit_tx(3, Submitter::SelfSubmitted, SELF_SUBSEQUENT_LAYOUT)])
            .with_tower(&a, 1)
            .failing(&op),
    );

    let err = history(node, MockTree::default().with_validator(&a, &op))
        .archive(&parse(&a))
        .await
        .unwrap_err();
    assert!(err.is_upstream());
    assert!(matches!(err, ProofError::Scan { stream: "operator", .. }));
}

#[tokio::test]
async fn truncated_payload_is_an_error() {
    let a = addr(12);
    let mut short = commit_tx(6, Submitter::SelfSubmitted, SELF_SUBSEQUENT_LAYOUT);
    short.bytes.truncate(1000);
    let mut txs = miner_history(&[2]);
    txs.push(short);
    let node = Arc::new(MockNode::default().with_account_txs(&a, txs).with_tower(&a, 1));

    let err = history(node, MockTree::default()).archive(&parse(&a)).await.unwrap_err();
    assert!(matches!(err, ProofError::Extract(ExtractError::Truncated { version: 6, .. })));
    assert!(!err.is_upstream());
}
