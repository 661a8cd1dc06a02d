// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed row ↔ domain mapping for `eval_jobs`.

use sqlx::{Row, SqlitePool};
use vault_core::ids::{AdapterId, EvalJobId};
use vault_core::job::{DatasetType, EvalJob, EvalJobStatus};

use crate::StorageError;

fn status_to_str(s: EvalJobStatus) -> &'static str {
    match s {
        EvalJobStatus::Queued => "queued",
        EvalJobStatus::Running => "running",
        EvalJobStatus::Completed => "completed",
        EvalJobStatus::Cancelled => "cancelled",
        EvalJobStatus::Failed => "failed",
    }
}

fn status_from_str(s: &str) -> Result<EvalJobStatus, StorageError> {
    Ok(match s {
        "queued" => EvalJobStatus::Queued,
        "running" => EvalJobStatus::Running,
        "completed" => EvalJobStatus::Completed,
        "cancelled" => EvalJobStatus::Cancelled,
        "failed" => EvalJobStatus::Failed,
        other => return Err(StorageError::Decode(format!("unknown eval job status {other}"))),
    })
}

fn dataset_type_to_str(t: DatasetType) -> &'static str {
    match t {
        DatasetType::Builtin => "builtin",
        DatasetType::Custom => "custom",
    }
}

fn dataset_type_from_str(s: &str) -> Result<DatasetType, StorageError> {
    Ok(match s {
        "builtin" => DatasetType::Builtin,
        "custom" => DatasetType::Custom,
        other => return Err(StorageError::Decode(format!("unknown dataset type {other}"))),
    })
}

fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> Result<EvalJob, StorageError> {
    Ok(EvalJob {
        id: EvalJobId::new(row.try_get::<String, _>("id")?),
        name: row.try_get("name")?,
        status: status_from_str(row.try_get::<String, _>("status")?.as_str())?,
        progress: row.try_get("progress")?,
        model_id: row.try_get("model_id")?,
        adapter_id: row.try_get::<Option<String>, _>("adapter_id")?.map(AdapterId::new),
        dataset_id: row.try_get("dataset_id")?,
        dataset_type: dataset_type_from_str(row.try_get::<String, _>("dataset_type")?.as_str())?,
        config_blob: serde_json::from_str(row.try_get::<String, _>("config_blob")?.as_str())?,
        results_blob: row
            .try_get::<Option<String>, _>("results_blob")?
            .map(|s| serde_json::from_str(&s))
            .transpose()?,
        total_examples: row.try_get::<i64, _>("total_examples")? as u64,
        examples_completed: row.try_get::<i64, _>("examples_completed")? as u64,
        created_at: row.try_get("created_at")?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}

pub async fn insert(pool: &SqlitePool, job: &EvalJob) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO eval_jobs
         (id, name, status, progress, model_id, adapter_id, dataset_id, dataset_type, config_blob,
          results_blob, total_examples, examples_completed, created_at, started_at, completed_at)
         VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(job.id.as_str())
    .bind(&job.name)
    .bind(status_to_str(job.status))
    .bind(job.progress)
    .bind(&job.model_id)
    .bind(job.adapter_id.as_ref().map(|a| a.as_str()))
    .bind(&job.dataset_id)
    .bind(dataset_type_to_str(job.dataset_type))
    .bind(serde_json::to_string(&job.config_blob)?)
    .bind(job.results_blob.as_ref().map(serde_json::to_string).transpose()?)
    .bind(job.total_examples as i64)
    .bind(job.examples_completed as i64)
    .bind(job.created_at)
    .bind(job.started_at)
    .bind(job.completed_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update(pool: &SqlitePool, job: &EvalJob) -> Result<(), StorageError> {
    sqlx::query(
        "UPDATE eval_jobs SET status=?, progress=?, results_blob=?, examples_completed=?,
         started_at=?, completed_at=? WHERE id=?",
    )
    .bind(status_to_str(job.status))
    .bind(job.progress)
    .bind(job.results_blob.as_ref().map(serde_json::to_string).transpose()?)
    .bind(job.examples_completed as i64)
    .bind(job.started_at)
    .bind(job.completed_at)
    .bind(job.id.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get(pool: &SqlitePool, id: &EvalJobId) -> Result<Option<EvalJob>, StorageError> {
    let row = sqlx::query("SELECT * FROM eval_jobs WHERE id = ?")
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_job).transpose()
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<EvalJob>, StorageError> {
    let rows = sqlx::query("SELECT * FROM eval_jobs ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    rows.iter().map(row_to_job).collect()
}

/// Removes a job record. Callers are expected to only do this for jobs
/// already in a terminal state.
pub async fn delete(pool: &SqlitePool, id: &EvalJobId) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM eval_jobs WHERE id = ?")
        .bind(id.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "eval_jobs_tests.rs"]
mod tests;
