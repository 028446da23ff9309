//! Upload persistence with collision-free names and age-based eviction.

use crate::extraction::DocumentKind;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tokio::task::JoinHandle;
use walkdir::WalkDir;

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);
const FALLBACK_STEM: &str = "document";

/// Reduce a client-supplied file name to a safe ASCII basename.
///
/// Non-ASCII characters are dropped, path separators and whitespace runs become `_`, only
/// `[A-Za-z0-9_.-]` survive, and leading or trailing `.`/`_` are stripped. The result may be
/// empty.
pub fn sanitize_filename(name: &str) -> String {
    let ascii: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// A file written by [`UploadStore::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Sanitized client file name.
    pub filename: String,
    /// Name on disk, `<uuid>-<filename>`.
    pub stored_as: String,
    /// Full path on disk.
    pub path: PathBuf,
}

/// Directory of uploaded documents.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    retention: Option<Duration>,
}

impl UploadStore {
    /// Store files under `dir`; `retention_secs == 0` keeps files forever.
    pub fn new(dir: impl Into<PathBuf>, retention_secs: u64) -> Self {
        Self {
            dir: dir.into(),
            retention: (retention_secs > 0).then(|| Duration::from_secs(retention_secs)),
        }
    }

    /// Create the upload directory if needed.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Persist `bytes` under a unique name derived from the client's `filename`.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<StoredUpload> {
        let filename = safe_name(filename);
        let stored_as = format!("{}-{}", uuid::Uuid::new_v4().simple(), filename);
        let path = self.dir.join(&stored_as);

        self.ensure_dir().await?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Stored upload");
        Ok(StoredUpload {
            filename,
            stored_as,
            path,
        })
    }

    /// Delete files older than the retention window, returning how many were removed.
    ///
    /// Blocking; run on a blocking thread from async code.
    pub fn sweep_expired(&self) -> io::Result<usize> {
        let Some(retention) = self.retention else {
            return Ok(0);
        };
        if !self.dir.exists() {
            return Ok(0);
        }

        // a window reaching past the earliest representable date expires nothing
        let Some(cutoff) = time::Duration::try_from(retention)
            .ok()
            .and_then(|window| OffsetDateTime::now_utc().checked_sub(window))
        else {
            return Ok(0);
        };
        let mut removed = 0;
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(io::Error::other)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let metadata = entry.metadata().map_err(io::Error::other)?;
            let modified = OffsetDateTime::from(metadata.modified()?);
            if modified >= cutoff {
                continue;
            }
            match std::fs::remove_file(entry.path()) {
                Ok(()) => {
                    removed += 1;
                    tracing::debug!(
                        path = %entry.path().display(),
                        modified = %modified.format(&Rfc3339).unwrap_or_default(),
                        "Evicted expired upload"
                    );
                }
                // a concurrent sweep got there first
                Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                Err(error) => return Err(error),
            }
        }
        Ok(removed)
    }

    /// Sweep once now and then periodically in the background.
    ///
    /// Returns `None` when retention is disabled.
    pub fn spawn_sweeper(&self) -> Option<JoinHandle<()>> {
        let retention = self.retention?;
        let period = (retention / 4).clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL);
        let store = self.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let sweep_store = store.clone();
                match tokio::task::spawn_blocking(move || sweep_store.sweep_expired()).await {
                    Ok(Ok(0)) => {}
                    Ok(Ok(removed)) => tracing::info!(removed, "Evicted expired uploads"),
                    Ok(Err(error)) => tracing::warn!(error = %error, "Upload sweep failed"),
                    Err(error) => tracing::warn!(error = %error, "Upload sweep task panicked"),
                }
            }
        }))
    }
}

/// Sanitized name that keeps the client's document extension.
fn safe_name(filename: &str) -> String {
    let sanitized = sanitize_filename(filename);
    if DocumentKind::from_filename(&sanitized).is_ok() {
        return sanitized;
    }
    match filename.rsplit_once('.') {
        Some((_, extension)) if DocumentKind::from_extension(extension).is_some() => {
            format!("{FALLBACK_STEM}.{}", extension.to_ascii_lowercase())
        }
        _ => FALLBACK_STEM.to_string(),
    }
}
