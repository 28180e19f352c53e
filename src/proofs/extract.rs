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

//! Proof submission detection and fixed-offset payload slicing.
//!
//! ## Payload layout
//! The node renders each serialized transaction as hex text. A proof submission
//! carries its VDF preimage and proof at fixed character offsets which depend on
//! who submitted it and whether it is the account's first ever submission:
//!
//! ```text
//! submitter  position     preimage        proof
//! self       first        [168, 2216)     [2224, 4996)
//! self       subsequent   [164, 228)      [236, 3008)
//! operator   any          [222, 286)      [294, 3066)
//! ```
//!
//! The first self submission embeds the full genesis preimage chained from the VDF
//! seed, hence the wider window. The offsets belong to the node's serialization
//! format; a format revision only touches [`layout`].

use thiserror::Error;

use crate::core::types::TransactionRecord;

/// Script function of a self-submitted proof.
pub const SELF_SUBMIT_FUNCTION: &str = "minerstate_commit";
/// Script function of an operator-submitted proof.
pub const OPERATOR_SUBMIT_FUNCTION: &str = "minerstate_commit_by_operator";

/// Extraction errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Payload too short (or not ASCII) for the selected layout.
    #[error("payload of tx {version} has {len} chars, layout needs {needed}")]
    Truncated {
        /// Offending transaction version.
        version: u64,
        /// Payload length.
        len: usize,
        /// Required length.
        needed: usize,
    },
}

/// Who submitted a proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Submitter {
    /// The miner / validator account itself.
    SelfSubmitted,
    /// The validator's operator account.
    Operator,
}

impl Submitter {
    /// Script function that submits proofs for this role.
    pub fn function_name(self) -> &'static str {
        match self {
            Submitter::SelfSubmitted => SELF_SUBMIT_FUNCTION,
            Submitter::Operator => OPERATOR_SUBMIT_FUNCTION,
        }
    }
}

/// Position of a submission in the account's history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    /// First ever proof submission (genesis proof).
    First,
    /// Any later submission.
    Subsequent,
}

/// Half-open character range within the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    /// Inclusive start.
    pub start: usize,
    /// Exclusive end.
    pub end: usize,
}

impl Span {
    const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of characters covered.
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for an empty span.
    pub const fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Preimage and proof spans of one payload layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofLayout {
    /// Preimage span.
    pub preimage: Span,
    /// Proof span.
    pub proof: Span,
}

impl ProofLayout {
    /// Minimum payload length able to hold both spans.
    pub const fn required_len(&self) -> usize {
        if self.preimage.end > self.proof.end {
            self.preimage.end
        } else {
            self.proof.end
        }
    }
}

/// Self submission, first ever.
pub const SELF_FIRST_LAYOUT: ProofLayout = ProofLayout {
    preimage: Span::new(168, 2216),
    proof: Span::new(2224, 4996),
};

/// Self submission, after the first.
pub const SELF_SUBSEQUENT_LAYOUT: ProofLayout = ProofLayout {
    preimage: Span::new(164, 228),
    proof: Span::new(236, 3008),
};

/// Operator submission, any position.
pub const OPERATOR_LAYOUT: ProofLayout = ProofLayout {
    preimage: Span::new(222, 286),
    proof: Span::new(294, 3066),
};

/// Layout table keyed by submitter and position.
pub fn layout(submitter: Submitter, position: Position) -> ProofLayout {
    match (submitter, position) {
        (Submitter::SelfSubmitted, Position::First) => SELF_FIRST_LAYOUT,
        (Submitter::SelfSubmitted, Position::Subsequent) => SELF_SUBSEQUENT_LAYOUT,
        (Submitter::Operator, _) => OPERATOR_LAYOUT,
    }
}

/// A transaction identified as a proof submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofCandidate {
    /// Ledger version, used for ordering.
    pub version: u64,
    /// Submitting role.
    pub submitter: Submitter,
    /// Position in the submitter's history.
    pub position: Position,
    /// Raw payload (hex text).
    pub payload: String,
}

/// Preimage/proof slices recovered from one candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedProof {
    /// Ledger version, used for ordering.
    pub version: u64,
    /// Submitting role.
    pub submitter: Submitter,
    /// Preimage slice.
    pub preimage: String,
    /// Proof slice.
    pub proof: String,
}

/// True if `tx` is an executed proof submission for `submitter`.
pub fn qualifies(tx: &TransactionRecord, submitter: Submitter) -> bool {
    tx.executed && tx.function_name.as_deref() == Some(submitter.function_name())
}

/// Turn a qualifying transaction into a candidate; `None` means skip.
pub fn classify(tx: &TransactionRecord, submitter: Submitter, position: Position) -> Option<ProofCandidate> {
    if !qualifies(tx, submitter) {
        return None;
    }
    Some(ProofCandidate {
        version: tx.version,
        submitter,
        position,
        payload: tx.bytes.clone(),
    })
}

impl ProofCandidate {
    /// Layout selected by this candidate's role and position.
    pub fn layout(&self) -> ProofLayout {
        layout(self.submitter, self.position)
    }

    /// Slice preimage and proof out of the payload.
    pub fn slice(&self) -> Result<ExtractedProof, ExtractError> {
        let l = self.layout();
        let cut = |s: Span| {
            self.payload.get(s.start..s.end).ok_or(ExtractError::Truncated {
                version: self.version,
                len: self.payload.len(),
                needed: l.required_len(),
            })
        };
        Ok(ExtractedProof {
            version: self.version,
            submitter: self.submitter,
            preimage: cut(l.preimage)?.to_string(),
            proof: cut(l.proof)?.to_string(),
        })
    }
}

/// Classify and slice in one step.
pub fn extract(
    tx: &TransactionRecord,
    submitter: Submitter,
    position: Position,
) -> Result<Option<ExtractedProof>, ExtractError> {
    classify(tx, submitter, position).map(|c| c.slice()).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_with(len: usize, marks: &[(Span, char)]) -> String {
        let mut chars = vec!['0'; len];
        for (span, c) in marks {
            for ch in chars.iter_mut().take(span.end).skip(span.start) {
                *ch = *c;
            }
        }
        chars.into_iter().collect()
    }

    fn tx(version: u64, func: &str, executed: bool, bytes: String) -> TransactionRecord {
        TransactionRecord {
            version,
            bytes,
            function_name: Some(func.to_string()),
            executed,
            ..Default::default()
        }
    }

    #[test]
    fn layout_widths_are_fixed() {
        assert_eq!(SELF_FIRST_LAYOUT.preimage.len(), 2048);
        assert_eq!(SELF_FIRST_LAYOUT.proof.len(), 2772);
        assert_eq!(SELF_SUBSEQUENT_LAYOUT.preimage.len(), 64);
        assert_eq!(SELF_SUBSEQUENT_LAYOUT.proof.len(), 2772);
        assert_eq!(OPERATOR_LAYOUT.preimage.len(), 64);
        assert_eq!(OPERATOR_LAYOUT.proof.len(), 2772);
        assert_eq!(layout(Submitter::Operator, Position::First), OPERATOR_LAYOUT);
    }

    #[test]
    fn first_self_submission_uses_wide_window() {
        let l = SELF_FIRST_LAYOUT;
        let bytes = payload_with(5000, &[(l.preimage, 'a'), (l.proof, 'b')]);
        let got = extract(&tx(9, SELF_SUBMIT_FUNCTION, true, bytes), Submitter::SelfSubmitted, Position::First)
            .unwrap()
            .unwrap();
        assert_eq!(got.preimage, "a".repeat(2048));
        assert_eq!(got.proof, "b".repeat(2772));
    }

    #[test]
    fn operator_submission_uses_operator_window() {
        let l = OPERATOR_LAYOUT;
        let bytes = payload_with(3100, &[(l.preimage, 'c'), (l.proof, 'd')]);
        let got = extract(
            &tx(11, OPERATOR_SUBMIT_FUNCTION, true, bytes),
            Submitter::Operator,
            Position::Subsequent,
        )
        .unwrap()
        .unwrap();
        assert_eq!(got.preimage, "c".repeat(64));
        assert_eq!(got.proof, "d".repeat(2772));
    }

    #[test]
    fn non_qualifying_transactions_are_skipped() {
        let bytes = payload_with(3100, &[]);
        let failed = tx(1, SELF_SUBMIT_FUNCTION, false, bytes.clone());
        let wrong_role = tx(2, OPERATOR_SUBMIT_FUNCTION, true, bytes.clone());
        let transfer = tx(3, "balance_transfer", true, bytes);
        for t in [&failed, &wrong_role, &transfer] {
            assert_eq!(extract(t, Submitter::SelfSubmitted, Position::Subsequent), Ok(None));
        }
    }

    #[test]
    fn short_payload_is_an_error() {
        let t = tx(5, SELF_SUBMIT_FUNCTION, true, payload_with(3000, &[]));
        let err = extract(&t, Submitter::SelfSubmitted, Position::Subsequent).unwrap_err();
        assert_eq!(err, ExtractError::Truncated { version: 5, len: 3000, needed: 3008 });
    }
}
