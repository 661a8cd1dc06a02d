// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filtered extraction and manifest checksum verification. No member that
//! is absolute, traverses via `..`, or names a device/special file is ever
//! allowed to land under the staging root.

use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};
use tar::EntryType;
use thiserror::Error;

use crate::manifest::Manifest;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("i/o error during extraction: {0}")]
    Io(#[from] std::io::Error),
    #[error("bundle member rejected by the extraction filter: {0}")]
    UnsafeMember(String),
    #[error("checksum mismatch for {path}: manifest says {expected}, extracted file is {actual}")]
    ChecksumMismatch { path: String, expected: String, actual: String },
    #[error("file listed in the manifest is missing from the extracted bundle: {0}")]
    MissingFile(String),
}

/// True only for a relative path with no `..` component and no root/prefix
/// component (rejects absolute paths on both Unix and Windows layouts).
fn is_safe_relative_path(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && !path.components().any(|c| matches!(c, Component::ParentDir))
}

fn is_safe_entry_type(entry_type: EntryType) -> bool {
    matches!(entry_type, EntryType::Regular | EntryType::Directory)
}

/// Extracts `archive_path` into `staging_dir`, skipping the manifest's
/// own top-level directory prefix so files land directly under
/// `staging_dir`. Returns an error (and leaves nothing unsafe written) on
/// the first non-conforming member.
pub fn extract_filtered(archive_path: &Path, staging_dir: &Path) -> Result<(), ExtractError> {
    std::fs::create_dir_all(staging_dir)?;
    let file = std::fs::File::open(archive_path)?;
    let mut archive = tar::Archive::new(file);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_type = entry.header().entry_type();
        let raw_path = entry.path()?.into_owned();

        if !is_safe_entry_type(entry_type) {
            return Err(ExtractError::UnsafeMember(raw_path.display().to_string()));
        }
        if !is_safe_relative_path(&raw_path) {
            return Err(ExtractError::UnsafeMember(raw_path.display().to_string()));
        }

        let relative = strip_top_level_dir(&raw_path);
        if relative.as_os_str().is_empty() {
            continue;
        }
        let destination = staging_dir.join(&relative);
        if !destination.starts_with(staging_dir) {
            return Err(ExtractError::UnsafeMember(raw_path.display().to_string()));
        }

        match entry_type {
            EntryType::Directory => {
                std::fs::create_dir_all(&destination)?;
            }
            EntryType::Regular => {
                if let Some(parent) = destination.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let mut out = std::fs::File::create(&destination)?;
                std::io::copy(&mut entry, &mut out)?;
            }
            _ => unreachable!("filtered above"),
        }
    }

    Ok(())
}

fn strip_top_level_dir(path: &Path) -> PathBuf {
    let mut components = path.components();
    components.next();
    components.as_path().to_path_buf()
}

/// Recomputes SHA-256 for every file the manifest lists and compares
/// against the recorded digest. Any mismatch or missing file rejects the
/// bundle before apply.
pub fn verify_checksums(staging_dir: &Path, manifest: &Manifest) -> Result<(), ExtractError> {
    for file_entry in &manifest.files {
        let path = staging_dir.join(&file_entry.path);
        if !path.exists() {
            return Err(ExtractError::MissingFile(file_entry.path.clone()));
        }
        let bytes = std::fs::read(&path)?;
        let actual = hex::encode(Sha256::digest(&bytes));
        if actual != file_entry.sha256 {
            return Err(ExtractError::ChecksumMismatch {
                path: file_entry.path.clone(),
                expected: file_entry.sha256.clone(),
                actual,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
