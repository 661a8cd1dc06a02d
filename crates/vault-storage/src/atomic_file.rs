// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crash-safe JSON file writes: serialize, write to a sibling `.tmp` file,
//! `fsync`, then `rename` over the destination. Used for worker status
//! files, the adapter-engine YAML, and anything else outside the
//! relational store that must never be observed half-written.
//!
//! Mirrors the snapshot-then-rename discipline the supervisor relies on
//! for crash recovery, generalized to any serializable payload.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum AtomicWriteError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn io_err(path: &Path, source: std::io::Error) -> AtomicWriteError {
    AtomicWriteError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Writes `value` as pretty JSON to `path` atomically: the temp file uses a
/// `.tmp` suffix alongside the destination so a reader racing the rename
/// sees either the old contents or the new ones, never a partial write.
pub async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), AtomicWriteError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp_path = tmp_path_for(path);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(|e| io_err(parent, e))?;
    }

    let mut file = fs::File::create(&tmp_path).await.map_err(|e| io_err(&tmp_path, e))?;
    file.write_all(&bytes).await.map_err(|e| io_err(&tmp_path, e))?;
    file.sync_all().await.map_err(|e| io_err(&tmp_path, e))?;
    drop(file);

    fs::rename(&tmp_path, path).await.map_err(|e| io_err(path, e))?;

    if let Some(parent) = path.parent() {
        if let Ok(dir) = std::fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

fn tmp_path_for(path: &Path) -> std::path::PathBuf {
    let mut os_string = path.as_os_str().to_owned();
    os_string.push(".tmp");
    std::path::PathBuf::from(os_string)
}

/// Reads and parses a JSON status file, tolerating the two transient
/// shapes a concurrent writer can leave behind: a file that does not yet
/// exist, and one mid-rename (briefly absent, never half-written thanks to
/// the temp-then-rename discipline above). Both are reported as `Ok(None)`
/// rather than an error so pollers can retry on the next tick.
pub async fn read_json_tolerant<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, AtomicWriteError> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(_) => Ok(None),
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(path, e)),
    }
}

#[cfg(test)]
#[path = "atomic_file_tests.rs"]
mod tests;
