// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use bh_core::test_support::{file_changed_event, record, validated_event};
use std::io::Write as _;
use tempfile::tempdir;

#[test]
fn open_creates_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.journal");

    let journal = Journal::open(&path).unwrap();

    assert!(path.exists());
    assert_eq!(journal.recovered(), 0);
}

#[test]
fn append_flush_records_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.journal");

    let mut journal = Journal::open(&path).unwrap();
    let a = record(1, file_changed_event("A"));
    let b = record(2, validated_event("A"));
    journal.append(&a).unwrap();
    journal.append(&b).unwrap();

    let records = journal.records().unwrap();
    assert_eq!(records, vec![a, b]);
}

#[test]
fn record_layout_is_length_prefixed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.journal");

    let mut journal = Journal::open(&path).unwrap();
    journal.append(&record(1, file_changed_event("A"))).unwrap();
    journal.flush().unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    assert_eq!(bytes.len(), 4 + len);
    // Payload is self-describing JSON with the type tag
    let json: serde_json::Value = serde_json::from_slice(&bytes[4..]).unwrap();
    assert_eq!(json["event"]["type"], "class:file_changed");
}

#[test]
fn reopen_preserves_history() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.journal");

    {
        let mut journal = Journal::open(&path).unwrap();
        journal.append(&record(1, file_changed_event("A"))).unwrap();
        journal.append(&record(2, validated_event("A"))).unwrap();
        journal.flush().unwrap();
    }

    let mut journal = Journal::open(&path).unwrap();
    assert_eq!(journal.recovered(), 2);

    journal.append(&record(3, file_changed_event("B"))).unwrap();
    assert_eq!(journal.records().unwrap().len(), 3);
}

#[test]
fn replay_without_write_handle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.journal");

    {
        let mut journal = Journal::open(&path).unwrap();
        journal.append(&record(1, file_changed_event("A"))).unwrap();
        journal.flush().unwrap();
    }

    let records = Journal::replay(&path).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn replay_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    assert!(Journal::replay(&dir.path().join("absent.journal")).unwrap().is_empty());
}

#[test]
fn corrupt_tail_keeps_valid_prefix_and_rotates_bak() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.journal");

    {
        let mut journal = Journal::open(&path).unwrap();
        journal.append(&record(1, file_changed_event("A"))).unwrap();
        journal.append(&record(2, validated_event("A"))).unwrap();
        journal.flush().unwrap();
    }
    {
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b"not-a-framed-record").unwrap();
    }

    let mut journal = Journal::open(&path).unwrap();
    assert_eq!(journal.recovered(), 2);

    let bak = path.with_extension("bak");
    assert!(bak.exists());

    // Clean file holds only the valid prefix and accepts new appends
    journal.append(&record(3, file_changed_event("B"))).unwrap();
    let records = journal.records().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].seq, 3);
}

#[test]
fn fully_corrupt_file_rotates_and_starts_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.journal");
    std::fs::write(&path, [0x80, 0x81, 0xff, 0xfe, 0x00]).unwrap();

    let journal = Journal::open(&path).unwrap();
    assert_eq!(journal.recovered(), 0);
    assert!(path.with_extension("bak").exists());
}

#[test]
fn repeated_corruption_rotates_up_to_three_backups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.journal");

    for round in 1..=4u8 {
        std::fs::write(&path, [round; 8]).unwrap();
        let journal = Journal::open(&path).unwrap();
        assert_eq!(journal.recovered(), 0);
    }

    // Most recent corruption in .bak, older in .bak.2/.bak.3, oldest evicted
    assert_eq!(std::fs::read(path.with_extension("bak")).unwrap(), vec![4u8; 8]);
    assert_eq!(std::fs::read(path.with_extension("bak.2")).unwrap(), vec![3u8; 8]);
    assert_eq!(std::fs::read(path.with_extension("bak.3")).unwrap(), vec![2u8; 8]);
    assert!(!path.with_extension("bak.4").exists());
}

#[test]
fn oversized_length_prefix_is_corruption_not_allocation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.journal");
    let mut bytes = u32::MAX.to_be_bytes().to_vec();
    bytes.extend_from_slice(b"whatever");
    std::fs::write(&path, &bytes).unwrap();

    let journal = Journal::open(&path).unwrap();
    assert_eq!(journal.recovered(), 0);
    assert!(path.with_extension("bak").exists());
}

#[test]
fn zero_length_prefix_is_corruption() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.journal");

    {
        let mut journal = Journal::open(&path).unwrap();
        journal.append(&record(1, file_changed_event("A"))).unwrap();
        journal.flush().unwrap();
    }
    {
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(&[0, 0, 0, 0]).unwrap();
    }

    let journal = Journal::open(&path).unwrap();
    assert_eq!(journal.recovered(), 1);
}

#[test]
fn journal_sink_persists_appends() {
    use crate::log::EventLog;
    use bh_core::{CorrelationId, FakeClock};
    use std::sync::Arc;

    let dir = tempdir().unwrap();
    let path = dir.path().join("events.journal");

    let log = EventLog::new(FakeClock::new());
    log.subscribe(Arc::new(JournalSink::new(Journal::open(&path).unwrap())));

    log.append(CorrelationId::new(), None, file_changed_event("A"));
    log.append(CorrelationId::new(), None, validated_event("A"));

    let records = Journal::replay(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].seq, 1);
    assert_eq!(records[1].seq, 2);
}

mod round_trip {
    use super::*;
    use bh_core::test_support::strategies::arb_record;
    use proptest::prelude::*;

    proptest! {
        /// Encoding then decoding any record through the journal format
        /// yields the original.
        #[test]
        fn journal_round_trips_any_record(records in proptest::collection::vec(arb_record(), 1..8)) {
            let dir = tempdir().unwrap();
            let path = dir.path().join("events.journal");

            {
                let mut journal = Journal::open(&path).unwrap();
                for record in &records {
                    journal.append(record).unwrap();
                }
                journal.flush().unwrap();
            }

            let decoded = Journal::replay(&path).unwrap();
            prop_assert_eq!(decoded, records);
        }
    }
}
