// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bundle manifest: read from the archive's `vault-update-{version}/manifest.json`
//! member without extracting the rest of the archive.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFileEntry {
    pub path: String,
    pub sha256: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub min_compatible_version: String,
    pub created_at: DateTime<Utc>,
    pub changelog: String,
    pub components: BTreeMap<String, bool>,
    pub files: Vec<ManifestFileEntry>,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read bundle archive: {0}")]
    Io(#[from] std::io::Error),
    #[error("bundle archive does not contain a manifest.json under its top-level directory")]
    Missing,
    #[error("manifest.json is not valid: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Reads `manifest.json` from the single top-level `vault-update-{version}/`
/// directory inside an uncompressed tar archive, without extracting any
/// other member.
pub fn read_manifest(archive_path: &Path) -> Result<Manifest, ManifestError> {
    let file = File::open(archive_path)?;
    let mut archive = tar::Archive::new(file);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name != "manifest.json" {
            continue;
        }
        let mut contents = String::new();
        entry.read_to_string(&mut contents)?;
        let manifest: Manifest = serde_json::from_str(&contents)?;
        return Ok(manifest);
    }

    Err(ManifestError::Missing)
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
