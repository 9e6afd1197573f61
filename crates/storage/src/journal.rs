// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefixed on-disk journal
//!
//! Record layout: 4-byte big-endian payload length, then the JSON-encoded
//! [`EventRecord`] (self-describing: type tag + fields in declared order).

use crate::log::EventSink;
use bh_core::EventRecord;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upper bound for one record's payload. A length prefix beyond this is
/// treated as corruption, not an allocation request.
const MAX_RECORD_LEN: u32 = 16 * 1024 * 1024;

/// How many rotated corrupt backups to keep (.bak, .bak.2, .bak.3).
const MAX_BACKUPS: u32 = 3;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("record too large: {0} bytes")]
    RecordTooLarge(usize),
}

/// Append-only journal of event records.
///
/// `open` tolerates a corrupt or truncated tail: the valid prefix is
/// preserved, the damaged file is rotated to `.bak`, and a clean file is
/// rewritten in its place.
pub struct Journal {
    path: PathBuf,
    writer: BufWriter<File>,
    /// Records recovered (and kept) by `open`.
    recovered: usize,
}

impl Journal {
    pub fn open(path: &Path) -> Result<Self, JournalError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let (records, valid_len) = scan(&bytes);
        if valid_len < bytes.len() {
            tracing::warn!(
                path = %path.display(),
                valid_records = records.len(),
                dropped_bytes = bytes.len() - valid_len,
                "journal corrupt; rotating to .bak and keeping valid prefix"
            );
            rotate_backups(path)?;
            let mut writer = BufWriter::new(File::create(path)?);
            writer.write_all(&bytes[..valid_len])?;
            writer.flush()?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { path: path.to_path_buf(), writer: BufWriter::new(file), recovered: records.len() })
    }

    /// Number of valid records present when the journal was opened.
    pub fn recovered(&self) -> usize {
        self.recovered
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record to the write buffer.
    pub fn append(&mut self, record: &EventRecord) -> Result<(), JournalError> {
        let payload = serde_json::to_vec(record)?;
        if payload.len() > MAX_RECORD_LEN as usize {
            return Err(JournalError::RecordTooLarge(payload.len()));
        }
        self.writer.write_all(&(payload.len() as u32).to_be_bytes())?;
        self.writer.write_all(&payload)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), JournalError> {
        self.writer.flush()?;
        Ok(())
    }

    /// All valid records currently on disk, stopping at the first corrupt
    /// entry. Flushes buffered writes first.
    pub fn records(&mut self) -> Result<Vec<EventRecord>, JournalError> {
        self.flush()?;
        let bytes = std::fs::read(&self.path)?;
        Ok(scan(&bytes).0)
    }

    /// Read a journal file without opening it for writing.
    pub fn replay(path: &Path) -> Result<Vec<EventRecord>, JournalError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(scan(&bytes).0)
    }
}

/// Decode as many valid records as the buffer holds.
///
/// Returns the records and the byte length of the valid prefix. Stops (never
/// fails) at a short header, an implausible length, or an undecodable
/// payload.
fn scan(bytes: &[u8]) -> (Vec<EventRecord>, usize) {
    let mut records = Vec::new();
    let mut pos = 0usize;
    loop {
        let Some(header) = bytes.get(pos..pos + 4) else {
            break;
        };
        let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        if len == 0 || len > MAX_RECORD_LEN {
            break;
        }
        let Some(payload) = bytes.get(pos + 4..pos + 4 + len as usize) else {
            break;
        };
        match serde_json::from_slice::<EventRecord>(payload) {
            Ok(record) => {
                records.push(record);
                pos += 4 + len as usize;
            }
            Err(_) => break,
        }
    }
    (records, pos)
}

/// Shift `.bak` → `.bak.2` → `.bak.3` (dropping the oldest), then move the
/// corrupt file to `.bak`.
fn rotate_backups(path: &Path) -> Result<(), JournalError> {
    let backup = |n: u32| -> PathBuf {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };
    let _ = std::fs::remove_file(backup(MAX_BACKUPS));
    for n in (1..MAX_BACKUPS).rev() {
        let from = backup(n);
        if from.exists() {
            let _ = std::fs::rename(&from, backup(n + 1));
        }
    }
    std::fs::rename(path, backup(1))?;
    Ok(())
}

/// Adapts a [`Journal`] to the log's sink interface: every appended event is
/// journaled and flushed immediately.
pub struct JournalSink {
    journal: Mutex<Journal>,
}

impl JournalSink {
    pub fn new(journal: Journal) -> Self {
        Self { journal: Mutex::new(journal) }
    }
}

impl EventSink for JournalSink {
    fn accept(&self, record: &EventRecord) {
        let mut journal = self.journal.lock();
        if let Err(e) = journal.append(record).and_then(|()| journal.flush()) {
            tracing::error!(seq = record.seq, error = %e, "journal append failed");
        }
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
