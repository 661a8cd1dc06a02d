// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed row ↔ domain mapping for `training_jobs`. The supervisor is the
//! sole writer of job rows at runtime; handlers only read.

use serde_json::Value;
use sqlx::{Row, SqlitePool};
use vault_core::ids::{AdapterId, TrainingJobId};
use vault_core::job::{AdapterType, TrainingJob, TrainingJobStatus};

use crate::StorageError;

fn status_to_str(status: TrainingJobStatus) -> &'static str {
    match status {
        TrainingJobStatus::Queued => "queued",
        TrainingJobStatus::Running => "running",
        TrainingJobStatus::Paused => "paused",
        TrainingJobStatus::Completed => "completed",
        TrainingJobStatus::Cancelled => "cancelled",
        TrainingJobStatus::Failed => "failed",
    }
}

fn status_from_str(s: &str) -> Result<TrainingJobStatus, StorageError> {
    Ok(match s {
        "queued" => TrainingJobStatus::Queued,
        "running" => TrainingJobStatus::Running,
        "paused" => TrainingJobStatus::Paused,
        "completed" => TrainingJobStatus::Completed,
        "cancelled" => TrainingJobStatus::Cancelled,
        "failed" => TrainingJobStatus::Failed,
        other => return Err(StorageError::Decode(format!("unknown training job status {other}"))),
    })
}

fn adapter_type_to_str(t: AdapterType) -> &'static str {
    match t {
        AdapterType::Full => "full",
        AdapterType::Lora => "lora",
        AdapterType::Qlora => "qlora",
    }
}

fn adapter_type_from_str(s: &str) -> Result<AdapterType, StorageError> {
    Ok(match s {
        "full" => AdapterType::Full,
        "lora" => AdapterType::Lora,
        "qlora" => AdapterType::Qlora,
        other => return Err(StorageError::Decode(format!("unknown adapter type {other}"))),
    })
}

fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> Result<TrainingJob, StorageError> {
    Ok(TrainingJob {
        id: TrainingJobId::new(row.try_get::<String, _>("id")?),
        name: row.try_get("name")?,
        status: status_from_str(row.try_get::<String, _>("status")?.as_str())?,
        progress: row.try_get("progress")?,
        model: row.try_get("model")?,
        dataset: row.try_get("dataset")?,
        config_blob: serde_json::from_str(row.try_get::<String, _>("config_blob")?.as_str())?,
        metrics_blob: serde_json::from_str(row.try_get::<String, _>("metrics_blob")?.as_str())?,
        resource_blob: serde_json::from_str(row.try_get::<String, _>("resource_blob")?.as_str())?,
        error: row.try_get("error")?,
        adapter_type: adapter_type_from_str(row.try_get::<String, _>("adapter_type")?.as_str())?,
        adapter_config_blob: row
            .try_get::<Option<String>, _>("adapter_config_blob")?
            .map(|s| serde_json::from_str::<Value>(&s))
            .transpose()?,
        adapter_id: row.try_get::<Option<String>, _>("adapter_id")?.map(AdapterId::new),
        created_at: row.try_get("created_at")?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}

pub async fn insert(pool: &SqlitePool, job: &TrainingJob) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO training_jobs
         (id, name, status, progress, model, dataset, config_blob, metrics_blob, resource_blob,
          error, adapter_type, adapter_config_blob, adapter_id, created_at, started_at, completed_at)
         VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(job.id.as_str())
    .bind(&job.name)
    .bind(status_to_str(job.status))
    .bind(job.progress)
    .bind(&job.model)
    .bind(&job.dataset)
    .bind(serde_json::to_string(&job.config_blob)?)
    .bind(serde_json::to_string(&job.metrics_blob)?)
    .bind(serde_json::to_string(&job.resource_blob)?)
    .bind(&job.error)
    .bind(adapter_type_to_str(job.adapter_type))
    .bind(job.adapter_config_blob.as_ref().map(serde_json::to_string).transpose()?)
    .bind(job.adapter_id.as_ref().map(|a| a.as_str()))
    .bind(job.created_at)
    .bind(job.started_at)
    .bind(job.completed_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update(pool: &SqlitePool, job: &TrainingJob) -> Result<(), StorageError> {
    sqlx::query(
        "UPDATE training_jobs SET status=?, progress=?, metrics_blob=?, resource_blob=?, error=?,
         adapter_id=?, started_at=?, completed_at=? WHERE id=?",
    )
    .bind(status_to_str(job.status))
    .bind(job.progress)
    .bind(serde_json::to_string(&job.metrics_blob)?)
    .bind(serde_json::to_string(&job.resource_blob)?)
    .bind(&job.error)
    .bind(job.adapter_id.as_ref().map(|a| a.as_str()))
    .bind(job.started_at)
    .bind(job.completed_at)
    .bind(job.id.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get(pool: &SqlitePool, id: &TrainingJobId) -> Result<Option<TrainingJob>, StorageError> {
    let row = sqlx::query("SELECT * FROM training_jobs WHERE id = ?")
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_job).transpose()
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<TrainingJob>, StorageError> {
    let rows = sqlx::query("SELECT * FROM training_jobs ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    rows.iter().map(row_to_job).collect()
}

/// The single currently-active job, if any, used by the scheduler to
/// reconstruct `GpuState` on restart.
pub async fn active(pool: &SqlitePool) -> Result<Option<TrainingJob>, StorageError> {
    let row = sqlx::query("SELECT * FROM training_jobs WHERE status IN ('running','paused') LIMIT 1")
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_job).transpose()
}

/// Removes a job record. Callers are expected to only do this for jobs
/// already in a terminal state.
pub async fn delete(pool: &SqlitePool, id: &TrainingJobId) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM training_jobs WHERE id = ?")
        .bind(id.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "training_jobs_tests.rs"]
mod tests;
