// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process bootstrap: tracing, state directory, single-instance lock

use fs2::FileExt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable controlling the log filter (default `info`).
pub const LOG_ENV: &str = "BYTEHOT_LOG";

/// Default state directory: `~/.local/state/bytehot` (or a temp fallback
/// when no home directory exists).
pub fn default_state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("bytehot")
}

/// Initialize tracing. With a log directory, output rolls daily into
/// `bytehot.log.*`; otherwise it goes to stderr. The returned guard must
/// stay alive for the process lifetime.
pub fn init_tracing(log_dir: Option<&Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "bytehot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

/// Take the single-instance lock under `state_dir`.
///
/// The lock file stays locked for as long as the returned handle lives;
/// a second daemon on the same state directory fails fast.
pub fn acquire_lock(state_dir: &Path) -> io::Result<File> {
    std::fs::create_dir_all(state_dir)?;
    let path = state_dir.join("bhd.lock");
    let file = File::create(&path)?;
    file.try_lock_exclusive().map_err(|_| {
        io::Error::new(
            io::ErrorKind::WouldBlock,
            format!("another bhd already holds {}", path.display()),
        )
    })?;
    Ok(file)
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
