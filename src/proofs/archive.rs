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

//! Serialization of reconstructed proofs.
//!
//! Full archives are written entry by entry into a streaming ZIP writer whose
//! output is chunked into a bounded channel, so memory stays flat no matter how
//! many proofs an account has.

use futures::Stream;
use std::io::{self, Write};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::core::types::{Address, ProofRecord};

/// Bytes buffered before a chunk is handed to the HTTP body.
const CHUNK_SIZE: usize = 64 * 1024;
/// Chunks in flight between the writer task and the HTTP body.
const CHANNEL_DEPTH: usize = 8;

/// Archive errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Record serialization.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// Archive framing.
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),
    /// Output sink.
    #[error("io: {0}")]
    Io(#[from] io::Error),
}

/// Attachment name of a full archive.
pub fn archive_file_name(address: &Address, unix_secs: u64) -> String {
    format!("vdf_proofs_{address}_{unix_secs}.zip")
}

/// JSON document for a single proof.
pub fn latest_document(record: &ProofRecord) -> Result<Vec<u8>, ArchiveError> {
    Ok(serde_json::to_vec(record)?)
}

/// Write one `proof_<height>.json` entry per record. Returns the entry count.
pub fn write_archive<I, W>(records: I, out: W) -> Result<u64, ArchiveError>
where
    I: IntoIterator<Item = ProofRecord>,
    W: Write,
{
    let mut zip = ZipWriter::new_stream(out);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = 0u64;
    for record in records {
        zip.start_file(record.file_name(), options)?;
        serde_json::to_writer(&mut zip, &record)?;
        entries += 1;
    }

    let mut sink = zip.finish()?;
    sink.flush()?;
    Ok(entries)
}

/// `Write` adapter that forwards fixed-size chunks into a channel.
struct ChannelWriter {
    tx: mpsc::Sender<io::Result<Vec<u8>>>,
    buf: Vec<u8>,
}

impl ChannelWriter {
    fn new(tx: mpsc::Sender<io::Result<Vec<u8>>>) -> Self {
        Self { tx, buf: Vec::with_capacity(CHUNK_SIZE) }
    }

    fn send_buffered(&mut self) -> io::Result<()> {
        let chunk = std::mem::replace(&mut self.buf, Vec::with_capacity(CHUNK_SIZE));
        self.tx
            .blocking_send(Ok(chunk))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "archive receiver dropped"))
    }
}

impl Write for ChannelWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        if self.buf.len() >= CHUNK_SIZE {
            self.send_buffered()?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            self.send_buffered()?;
        }
        Ok(())
    }
}

/// Stream a ZIP archive of `records` as byte chunks.
///
/// Compression runs on the blocking pool. A failure mid-archive ends the stream
/// with an error item, which aborts the HTTP response. Must be called inside a
/// tokio runtime.
pub fn stream_archive<I>(address: Address, records: I) -> impl Stream<Item = io::Result<Vec<u8>>> + Send + 'static
where
    I: Iterator<Item = ProofRecord> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);

    tokio::task::spawn_blocking(move || {
        let err_tx = tx.clone();
        let mut writer = ChannelWriter::new(tx);
        match write_archive(records, &mut writer) {
            Ok(entries) => info!(address = %address, entries, "proof archive written"),
            Err(e) => {
                warn!(address = %address, error = %e, "proof archive aborted");
                let _ = err_tx.blocking_send(Err(io::Error::new(io::ErrorKind::Other, e.to_string())));
            }
        }
    });

    futures::stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) })
}
