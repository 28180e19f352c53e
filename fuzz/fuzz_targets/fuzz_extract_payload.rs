// Copyright (c) 2026 Amunchain
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vdf_proof_archive::core::types::TransactionRecord;
use vdf_proof_archive::proofs::extract::{self, Position, Submitter};

#[derive(Arbitrary, Debug)]
struct Input {
    operator: bool,
    first: bool,
    payload: String,
}

fuzz_target!(|input: Input| {
    // Slicing arbitrary (possibly multi-byte) payloads must error, never panic.
    let submitter = if input.operator { Submitter::Operator } else { Submitter::SelfSubmitted };
    let position = if input.first { Position::First } else { Position::Subsequent };
    let tx = TransactionRecord {
        version: 1,
        bytes: input.payload,
        function_name: Some(submitter.function_name().to_string()),
        executed: true,
        ..Default::default()
    };
    if let Ok(Some(p)) = extract::extract(&tx, submitter, position) {
        let l = extract::layout(submitter, position);
        assert_eq!(p.preimage.len(), l.preimage.len());
        assert_eq!(p.proof.len(), l.proof.len());
    }
});
