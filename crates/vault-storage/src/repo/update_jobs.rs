// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed row ↔ domain mapping for `update_jobs`.

use sqlx::{Row, SqlitePool};
use vault_core::ids::UpdateJobId;
use vault_core::update_job::{UpdateJob, UpdateJobStatus, UpdateStepName};

use crate::StorageError;

fn status_to_str(s: UpdateJobStatus) -> &'static str {
    match s {
        UpdateJobStatus::Pending => "pending",
        UpdateJobStatus::Running => "running",
        UpdateJobStatus::Completed => "completed",
        UpdateJobStatus::Failed => "failed",
        UpdateJobStatus::RolledBack => "rolled_back",
    }
}

fn status_from_str(s: &str) -> Result<UpdateJobStatus, StorageError> {
    Ok(match s {
        "pending" => UpdateJobStatus::Pending,
        "running" => UpdateJobStatus::Running,
        "completed" => UpdateJobStatus::Completed,
        "failed" => UpdateJobStatus::Failed,
        "rolled_back" => UpdateJobStatus::RolledBack,
        other => return Err(StorageError::Decode(format!("unknown update job status {other}"))),
    })
}

fn step_to_str(s: UpdateStepName) -> &'static str {
    match s {
        UpdateStepName::Migrations => "migrations",
        UpdateStepName::Code => "code",
        UpdateStepName::Configuration => "configuration",
        UpdateStepName::Containers => "containers",
        UpdateStepName::Signatures => "signatures",
    }
}

fn step_from_str(s: &str) -> Result<UpdateStepName, StorageError> {
    Ok(match s {
        "migrations" => UpdateStepName::Migrations,
        "code" => UpdateStepName::Code,
        "configuration" => UpdateStepName::Configuration,
        "containers" => UpdateStepName::Containers,
        "signatures" => UpdateStepName::Signatures,
        other => return Err(StorageError::Decode(format!("unknown update step {other}"))),
    })
}

fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> Result<UpdateJob, StorageError> {
    Ok(UpdateJob {
        id: UpdateJobId::new(row.try_get::<String, _>("id")?),
        status: status_from_str(row.try_get::<String, _>("status")?.as_str())?,
        bundle_version: row.try_get("bundle_version")?,
        from_version: row.try_get("from_version")?,
        bundle_path: row.try_get("bundle_path")?,
        progress_pct: row.try_get("progress_pct")?,
        current_step: row
            .try_get::<Option<String>, _>("current_step")?
            .map(|s| step_from_str(&s))
            .transpose()?,
        steps: serde_json::from_str(row.try_get::<String, _>("steps_blob")?.as_str())?,
        log: serde_json::from_str(row.try_get::<String, _>("log_blob")?.as_str())?,
        changelog: row.try_get("changelog")?,
        components: serde_json::from_str(row.try_get::<String, _>("components_blob")?.as_str())?,
        backup_path: row.try_get("backup_path")?,
        error: row.try_get("error")?,
        created_at: row.try_get("created_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}

pub async fn insert(pool: &SqlitePool, job: &UpdateJob) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO update_jobs
         (id, status, bundle_version, from_version, bundle_path, progress_pct, current_step,
          steps_blob, log_blob, changelog, components_blob, backup_path, error, created_at, completed_at)
         VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(job.id.as_str())
    .bind(status_to_str(job.status))
    .bind(&job.bundle_version)
    .bind(&job.from_version)
    .bind(&job.bundle_path)
    .bind(job.progress_pct)
    .bind(job.current_step.map(step_to_str))
    .bind(serde_json::to_string(&job.steps)?)
    .bind(serde_json::to_string(&job.log)?)
    .bind(&job.changelog)
    .bind(serde_json::to_string(&job.components)?)
    .bind(&job.backup_path)
    .bind(&job.error)
    .bind(job.created_at)
    .bind(job.completed_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update(pool: &SqlitePool, job: &UpdateJob) -> Result<(), StorageError> {
    sqlx::query(
        "UPDATE update_jobs SET status=?, progress_pct=?, current_step=?, steps_blob=?, log_blob=?,
         backup_path=?, error=?, completed_at=? WHERE id=?",
    )
    .bind(status_to_str(job.status))
    .bind(job.progress_pct)
    .bind(job.current_step.map(step_to_str))
    .bind(serde_json::to_string(&job.steps)?)
    .bind(serde_json::to_string(&job.log)?)
    .bind(&job.backup_path)
    .bind(&job.error)
    .bind(job.completed_at)
    .bind(job.id.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get(pool: &SqlitePool, id: &UpdateJobId) -> Result<Option<UpdateJob>, StorageError> {
    let row = sqlx::query("SELECT * FROM update_jobs WHERE id = ?")
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_job).transpose()
}

pub async fn history(pool: &SqlitePool) -> Result<Vec<UpdateJob>, StorageError> {
    let rows = sqlx::query("SELECT * FROM update_jobs ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    rows.iter().map(row_to_job).collect()
}

#[cfg(test)]
#[path = "update_jobs_tests.rs"]
mod tests;
