// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bhd`: the ByteHot agent daemon

use bh_daemon::bootstrap;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "bhd", about = "ByteHot class-redefinition agent", version)]
struct Options {
    /// Configuration file (default: ./bytehot.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// State directory for the journal and lock file
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Write logs to daily-rolling files in this directory instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> std::process::ExitCode {
    let options = Options::parse();
    let _log_guard = bootstrap::init_tracing(options.log_dir.as_deref());

    let state_dir = options.state_dir.clone().unwrap_or_else(bootstrap::default_state_dir);
    let _lock = match bootstrap::acquire_lock(&state_dir) {
        Ok(lock) => lock,
        Err(e) => {
            tracing::error!(error = %e, "failed to take the daemon lock");
            return std::process::ExitCode::FAILURE;
        }
    };

    let config = match bh_daemon::daemon::load_config(options.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "failed to start tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(async {
        let cancel = CancellationToken::new();
        tokio::spawn(shutdown_signal(cancel.clone()));
        bh_daemon::run(config, state_dir, cancel).await
    });

    match outcome {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "daemon exited with error");
            std::process::ExitCode::FAILURE
        }
    }
}

/// Cancel on SIGINT or SIGTERM.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut term = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            Ok(term) => term,
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                let _ = ctrl_c.await;
                cancel.cancel();
                return;
            }
        };
        tokio::select! {
            _ = ctrl_c => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
    cancel.cancel();
}
