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

//! Sequential fixed-window pagination over an account's transaction history.

use thiserror::Error;
use tracing::debug;

use crate::core::types::TransactionRecord;
use crate::upstream::{NodeApi, UpstreamError};

/// Scan errors.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Remote call failed; the scan is aborted.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    /// Page handler asked to stop.
    #[error("scan halted by page handler")]
    Halted,
}

/// Counters for a completed scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageSummary {
    /// Non-empty pages handed to the page handler.
    pub pages: u64,
    /// Transactions seen across all pages.
    pub transactions: u64,
}

/// Paginates one account's history in windows of `page_size`.
pub struct TransactionPager<'a> {
    node: &'a dyn NodeApi,
    page_size: u64,
}

impl<'a> TransactionPager<'a> {
    /// Create a pager. `page_size` must be non-zero.
    pub fn new(node: &'a dyn NodeApi, page_size: u64) -> Self {
        Self { node, page_size: page_size.max(1) }
    }

    /// Walk the whole history from offset 0.
    ///
    /// Each page's offset is the previous offset plus the number of records
    /// actually returned, so pages are fetched strictly one after another.
    /// A page shorter than `page_size` ends the scan; an account with no
    /// transactions succeeds with zero pages.
    pub async fn paginate<F>(&self, account: &str, mut on_page: F) -> Result<PageSummary, ScanError>
    where
        F: FnMut(&[TransactionRecord]) -> bool + Send,
    {
        let mut summary = PageSummary::default();
        let mut start = 0u64;

        loop {
            let page = self
                .node
                .account_transactions(account, start, self.page_size, false)
                .await?;
            let returned = page.len() as u64;
            debug!(account, start, returned, "transaction page");

            if returned == 0 {
                break;
            }
            summary.pages += 1;
            summary.transactions += returned;

            if !on_page(&page) {
                return Err(ScanError::Halted);
            }
            if returned < self.page_size {
                break;
            }
            start += returned;
        }

        Ok(summary)
    }
}
