#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! VDF proof history: pagination, role resolution, extraction, reconciliation, archiving.

pub mod archive;
pub mod extract;
pub mod history;
pub mod pager;
pub mod reconcile;
pub mod role;

pub use history::{ProofError, ProofHistory};
