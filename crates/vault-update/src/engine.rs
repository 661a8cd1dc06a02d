// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The update engine: staged bundle verification plus the apply/rollback
//! background jobs. Apply and rollback are mutually exclusive — callers
//! are expected to hold a single in-process lock (e.g. an `AppState`
//! mutex) across the whole sequence; this module does not take that lock
//! itself so it stays testable without a daemon around it.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use vault_core::ids::UpdateJobId;
use vault_core::update_job::{UpdateJob, UpdateStepName, APPLY_CONFIRMATION, ROLLBACK_CONFIRMATION};
use vault_storage::repo::update_jobs as repo;

use crate::extract::{extract_filtered, verify_checksums, ExtractError};
use crate::manifest::{read_manifest, Manifest, ManifestError};
use crate::signature::{verify_detached_signature, SignatureError};

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("confirmation phrase did not match; expected exact literal \"{expected}\"")]
    BadConfirmation { expected: &'static str },
    #[error("invalid bundle: {0}")]
    InvalidManifest(#[from] ManifestError),
    #[error("signature verification failed: {0}")]
    InvalidSignature(#[from] SignatureError),
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
    #[error("i/o error applying update: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Storage(#[from] vault_storage::StorageError),
    #[error("no backup exists to roll back to")]
    NoBackup,
}

impl From<UpdateError> for vault_core::error::CoreError {
    fn from(err: UpdateError) -> Self {
        use vault_core::error::CoreError;
        match err {
            UpdateError::BadConfirmation { .. } => CoreError::validation(err.to_string()),
            UpdateError::InvalidManifest(_) | UpdateError::InvalidSignature(_) | UpdateError::Extract(_) => {
                CoreError::validation(err.to_string())
            }
            UpdateError::NoBackup => CoreError::conflict(err.to_string()),
            UpdateError::Io(_) | UpdateError::Storage(_) => CoreError::internal(err.to_string()),
        }
    }
}

pub struct UpdatePaths {
    pub staging_root: PathBuf,
    pub backup_root: PathBuf,
    pub install_root: PathBuf,
    pub public_key_path: PathBuf,
}

/// Stage 1 of apply: archive-without-extracting manifest read, detached
/// signature verification, filtered extraction, and per-file checksum
/// verification. Returns the parsed manifest on success; the bundle is
/// rejected (nothing under `install_root` is touched) on any failure.
pub fn parse_and_verify_bundle(
    paths: &UpdatePaths,
    bundle_path: &Path,
    signature_path: &Path,
) -> Result<Manifest, UpdateError> {
    let manifest = read_manifest(bundle_path)?;
    verify_detached_signature(bundle_path, signature_path, &paths.public_key_path)?;
    extract_filtered(bundle_path, &paths.staging_root)?;
    verify_checksums(&paths.staging_root, &manifest)?;
    Ok(manifest)
}

fn component_enabled(manifest: &Manifest, name: UpdateStepName) -> bool {
    let key = match name {
        UpdateStepName::Migrations => "database",
        UpdateStepName::Code => "code",
        UpdateStepName::Configuration => "configuration",
        UpdateStepName::Containers => "containers",
        UpdateStepName::Signatures => "signatures",
    };
    manifest.components.get(key).copied().unwrap_or(false)
}

fn component_dir(name: UpdateStepName) -> &'static str {
    match name {
        UpdateStepName::Migrations => "migrations",
        UpdateStepName::Code => "code",
        UpdateStepName::Configuration => "configuration",
        UpdateStepName::Containers => "containers",
        UpdateStepName::Signatures => "signatures",
    }
}

/// Copies `install_root/component_dir` into `backup_root/component_dir`
/// for every enabled component, so a failed apply can be undone.
fn snapshot_backup(paths: &UpdatePaths, manifest: &Manifest) -> std::io::Result<()> {
    std::fs::create_dir_all(&paths.backup_root)?;
    for name in UpdateStepName::ORDER {
        if !component_enabled(manifest, name) {
            continue;
        }
        let source = paths.install_root.join(component_dir(name));
        if !source.exists() {
            continue;
        }
        let destination = paths.backup_root.join(component_dir(name));
        copy_dir_recursive(&source, &destination)?;
    }
    Ok(())
}

fn restore_backup(paths: &UpdatePaths) -> std::io::Result<()> {
    if !paths.backup_root.exists() {
        return Ok(());
    }
    for entry in std::fs::read_dir(&paths.backup_root)? {
        let entry = entry?;
        let destination = paths.install_root.join(entry.file_name());
        if destination.exists() {
            std::fs::remove_dir_all(&destination)?;
        }
        copy_dir_recursive(&entry.path(), &destination)?;
    }
    Ok(())
}

fn copy_dir_recursive(source: &Path, destination: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(destination)?;
    for entry in std::fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

fn replace_component(paths: &UpdatePaths, name: UpdateStepName) -> std::io::Result<()> {
    let source = paths.staging_root.join(component_dir(name));
    let destination = paths.install_root.join(component_dir(name));
    if !source.exists() {
        return Ok(());
    }
    if destination.exists() {
        std::fs::remove_dir_all(&destination)?;
    }
    copy_dir_recursive(&source, &destination)
}

/// Applies an already-verified bundle. Steps run in the fixed order from
/// `UpdateStepName::ORDER`; the first failure aborts, restores the backup
/// (if one was taken), and marks the job `failed`.
pub async fn apply(
    pool: &SqlitePool,
    paths: &UpdatePaths,
    job_id: UpdateJobId,
    manifest: &Manifest,
    create_backup: bool,
    confirmation: &str,
) -> Result<UpdateJob, UpdateError> {
    if confirmation != APPLY_CONFIRMATION {
        return Err(UpdateError::BadConfirmation {
            expected: APPLY_CONFIRMATION,
        });
    }

    let components: Vec<(String, bool)> = manifest.components.iter().map(|(k, v)| (k.clone(), *v)).collect();
    let mut job = UpdateJob::new(
        job_id,
        manifest.version.clone(),
        manifest.min_compatible_version.clone(),
        manifest.changelog.clone(),
        components,
        Utc::now(),
    );
    repo::insert(pool, &job).await?;

    if create_backup {
        if let Err(e) = snapshot_backup(paths, manifest) {
            job.fail(UpdateStepName::Migrations, format!("backup snapshot failed: {e}"), Utc::now());
            repo::update(pool, &job).await?;
            return Ok(job);
        }
        job.backup_path = Some(paths.backup_root.display().to_string());
    }

    for step in UpdateStepName::ORDER {
        if !component_enabled(manifest, step) {
            continue;
        }
        job.begin_step(step);
        repo::update(pool, &job).await?;

        if let Err(e) = replace_component(paths, step) {
            job.fail(step, format!("{step:?} step failed: {e}"), Utc::now());
            if create_backup {
                let _ = restore_backup(paths);
            }
            repo::update(pool, &job).await?;
            return Ok(job);
        }

        job.complete_step(step, format!("{step:?} applied"));
        repo::update(pool, &job).await?;
    }

    job.complete(Utc::now());
    repo::update(pool, &job).await?;
    Ok(job)
}

/// Restores the most recent backup and records a new `UpdateJob` marked
/// `rolled_back` on success.
pub async fn rollback(
    pool: &SqlitePool,
    paths: &UpdatePaths,
    job_id: UpdateJobId,
    from_job: &UpdateJob,
    confirmation: &str,
) -> Result<UpdateJob, UpdateError> {
    if confirmation != ROLLBACK_CONFIRMATION {
        return Err(UpdateError::BadConfirmation {
            expected: ROLLBACK_CONFIRMATION,
        });
    }
    if from_job.backup_path.is_none() || !paths.backup_root.exists() {
        return Err(UpdateError::NoBackup);
    }

    restore_backup(paths)?;

    let mut job = UpdateJob::new(
        job_id,
        from_job.from_version.clone(),
        from_job.bundle_version.clone(),
        "rollback".to_string(),
        from_job.components.clone(),
        Utc::now(),
    );
    job.mark_rolled_back(Utc::now());
    repo::insert(pool, &job).await?;
    Ok(job)
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
