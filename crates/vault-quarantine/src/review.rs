// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The human review workflow: a `held` file is either approved (copied to
//! its destination) or rejected (deleted everywhere). Both outcomes write
//! an audit log entry.

use std::path::Path;

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use vault_core::audit::AuditLogEntry;
use vault_core::ids::{AuditLogEntryId, QuarantineFileId};
use vault_core::quarantine::{IllegalFileTransition, QuarantineFileStatus};
use vault_storage::repo::{audit_log, quarantine as repo};

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("quarantine file not found")]
    NotFound,
    #[error("file is not in held status: {0}")]
    NotHeld(#[from] IllegalFileTransition),
    #[error("storage error: {0}")]
    Storage(#[from] vault_storage::StorageError),
    #[error("i/o error moving reviewed file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ReviewError> for vault_core::error::CoreError {
    fn from(err: ReviewError) -> Self {
        use vault_core::error::CoreError;
        match err {
            ReviewError::NotFound => CoreError::not_found(err.to_string()),
            ReviewError::NotHeld(_) => CoreError::conflict(err.to_string()),
            ReviewError::Storage(_) | ReviewError::Io(_) => CoreError::internal(err.to_string()),
        }
    }
}

/// Approves a held file: transitions it to `approved`, copies it from its
/// sanitized path (falling back to the quarantine path) to `destination`,
/// and appends an audit log entry.
pub async fn approve(
    pool: &SqlitePool,
    audit_id: AuditLogEntryId,
    file_id: &QuarantineFileId,
    destination: &Path,
    reason: impl Into<String>,
    reviewer: impl Into<String>,
) -> Result<(), ReviewError> {
    let Some(mut file) = repo::get_file(pool, file_id).await? else {
        return Err(ReviewError::NotFound);
    };
    let now = Utc::now();
    let reviewer = reviewer.into();
    file.review(true, reason, reviewer.clone(), now)?;
    file.paths.destination = Some(destination.display().to_string());

    let source = file
        .paths
        .sanitized
        .clone()
        .unwrap_or_else(|| file.paths.quarantine.clone());
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(&source, destination).await?;

    repo::update_file(pool, &file).await?;

    let entry = AuditLogEntry::new(audit_id, "quarantine.file.approved", now)
        .with_details(serde_json::json!({
            "file_id": file.id.as_str(),
            "job_id": file.job_id.as_str(),
            "reviewed_by": reviewer,
        }));
    audit_log::append(pool, &entry).await?;
    Ok(())
}

/// Rejects a held file: transitions it to `rejected`, deletes every
/// on-disk copy, and appends an audit log entry.
pub async fn reject(
    pool: &SqlitePool,
    audit_id: AuditLogEntryId,
    file_id: &QuarantineFileId,
    reason: impl Into<String>,
    reviewer: impl Into<String>,
) -> Result<(), ReviewError> {
    let Some(mut file) = repo::get_file(pool, file_id).await? else {
        return Err(ReviewError::NotFound);
    };
    let now = Utc::now();
    let reviewer = reviewer.into();
    file.review(false, reason, reviewer.clone(), now)?;

    for path in [
        Some(file.paths.quarantine.clone()),
        file.paths.sanitized.clone(),
        file.paths.destination.clone(),
    ]
    .into_iter()
    .flatten()
    {
        let _ = tokio::fs::remove_file(&path).await;
    }

    repo::update_file(pool, &file).await?;

    let entry = AuditLogEntry::new(audit_id, "quarantine.file.rejected", now).with_details(serde_json::json!({
        "file_id": file.id.as_str(),
        "job_id": file.job_id.as_str(),
        "reviewed_by": reviewer,
    }));
    audit_log::append(pool, &entry).await?;
    Ok(())
}

/// True only for files currently awaiting review; callers use this to
/// short-circuit before attempting a transition that would otherwise
/// surface as an `IllegalFileTransition`.
pub fn is_reviewable(status: QuarantineFileStatus) -> bool {
    status == QuarantineFileStatus::Held
}

#[cfg(test)]
#[path = "review_tests.rs"]
mod tests;
