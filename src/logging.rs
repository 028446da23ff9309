//! Log output for the docinsight server.
//!
//! Events go to the terminal and to a log file at the same time. The file is
//! `DOCINSIGHT_LOG_FILE` when that variable is set, else `logs/docinsight.log`. File writes
//! happen on a background worker so uploads and model calls never wait on disk.
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::CONFIG;

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "docinsight.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the level is `info`, lowered to `debug` when the loaded
/// config runs in development mode, so call this after `init_config`. A file that cannot be
/// opened only costs the file layer; terminal output still works.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive()));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    if let Some(writer) = log_file_writer() {
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact();

        registry.with(file_layer).init();
    } else {
        registry.init();
    }
}

fn default_directive() -> &'static str {
    match CONFIG.get() {
        Some(config) if config.debug => "debug",
        _ => "info",
    }
}

/// Background writer for the log file, or `None` when it cannot be opened.
fn log_file_writer() -> Option<NonBlocking> {
    let path = match std::env::var("DOCINSIGHT_LOG_FILE") {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => Path::new(DEFAULT_LOG_DIR).join(DEFAULT_LOG_FILE),
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {err}", parent.display());
            return None;
        }
    }

    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            return None;
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);
    Some(writer)
}
