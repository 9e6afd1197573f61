// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn lock_is_exclusive_per_state_dir() {
    let dir = tempdir().unwrap();

    let first = acquire_lock(dir.path()).unwrap();
    let second = acquire_lock(dir.path());
    assert!(second.is_err(), "second lock on the same state dir must fail");

    drop(first);
    // Lock is released with the handle
    acquire_lock(dir.path()).unwrap();
}

#[test]
fn distinct_state_dirs_do_not_contend() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    let _lock_a = acquire_lock(a.path()).unwrap();
    let _lock_b = acquire_lock(b.path()).unwrap();
}

#[test]
fn lock_creates_missing_state_dir() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("deep").join("state");
    acquire_lock(&nested).unwrap();
    assert!(nested.join("bhd.lock").exists());
}

#[test]
fn default_state_dir_is_nonempty() {
    let path = default_state_dir();
    assert!(path.ends_with("bytehot"));
}
