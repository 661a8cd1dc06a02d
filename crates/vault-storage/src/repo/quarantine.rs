// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed row ↔ domain mapping for `quarantine_jobs` and `quarantine_files`.

use sqlx::{Row, SqlitePool};
use vault_core::ids::{QuarantineFileId, QuarantineJobId};
use vault_core::quarantine::{
    QuarantineFile, QuarantineFilePaths, QuarantineFileStatus, QuarantineJob, QuarantineJobStatus, Severity,
    SourceType,
};

use crate::StorageError;

fn job_status_to_str(s: QuarantineJobStatus) -> &'static str {
    match s {
        QuarantineJobStatus::Pending => "pending",
        QuarantineJobStatus::Scanning => "scanning",
        QuarantineJobStatus::Completed => "completed",
    }
}

fn job_status_from_str(s: &str) -> Result<QuarantineJobStatus, StorageError> {
    Ok(match s {
        "pending" => QuarantineJobStatus::Pending,
        "scanning" => QuarantineJobStatus::Scanning,
        "completed" => QuarantineJobStatus::Completed,
        other => return Err(StorageError::Decode(format!("unknown quarantine job status {other}"))),
    })
}

fn source_type_to_str(s: SourceType) -> &'static str {
    match s {
        SourceType::Upload => "upload",
        SourceType::UsbPath => "usb_path",
        SourceType::ModelImport => "model_import",
    }
}

fn source_type_from_str(s: &str) -> Result<SourceType, StorageError> {
    Ok(match s {
        "upload" => SourceType::Upload,
        "usb_path" => SourceType::UsbPath,
        "model_import" => SourceType::ModelImport,
        other => return Err(StorageError::Decode(format!("unknown source type {other}"))),
    })
}

fn file_status_to_str(s: QuarantineFileStatus) -> &'static str {
    match s {
        QuarantineFileStatus::Pending => "pending",
        QuarantineFileStatus::Scanning => "scanning",
        QuarantineFileStatus::Clean => "clean",
        QuarantineFileStatus::Held => "held",
        QuarantineFileStatus::Approved => "approved",
        QuarantineFileStatus::Rejected => "rejected",
    }
}

fn file_status_from_str(s: &str) -> Result<QuarantineFileStatus, StorageError> {
    Ok(match s {
        "pending" => QuarantineFileStatus::Pending,
        "scanning" => QuarantineFileStatus::Scanning,
        "clean" => QuarantineFileStatus::Clean,
        "held" => QuarantineFileStatus::Held,
        "approved" => QuarantineFileStatus::Approved,
        "rejected" => QuarantineFileStatus::Rejected,
        other => return Err(StorageError::Decode(format!("unknown quarantine file status {other}"))),
    })
}

fn severity_to_str(s: Severity) -> &'static str {
    match s {
        Severity::None => "none",
        Severity::Low => "low",
        Severity::Medium => "medium",
        Severity::High => "high",
        Severity::Critical => "critical",
    }
}

fn severity_from_str(s: &str) -> Result<Severity, StorageError> {
    Ok(match s {
        "none" => Severity::None,
        "low" => Severity::Low,
        "medium" => Severity::Medium,
        "high" => Severity::High,
        "critical" => Severity::Critical,
        other => return Err(StorageError::Decode(format!("unknown severity {other}"))),
    })
}

fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> Result<QuarantineJob, StorageError> {
    Ok(QuarantineJob {
        id: QuarantineJobId::new(row.try_get::<String, _>("id")?),
        status: job_status_from_str(row.try_get::<String, _>("status")?.as_str())?,
        total_files: row.try_get::<i64, _>("total_files")? as u32,
        files_completed: row.try_get::<i64, _>("files_completed")? as u32,
        files_flagged: row.try_get::<i64, _>("files_flagged")? as u32,
        files_clean: row.try_get::<i64, _>("files_clean")? as u32,
        source_type: source_type_from_str(row.try_get::<String, _>("source_type")?.as_str())?,
        submitted_by: row.try_get("submitted_by")?,
        created_at: row.try_get("created_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}

pub async fn insert_job(pool: &SqlitePool, job: &QuarantineJob) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO quarantine_jobs
         (id, status, total_files, files_completed, files_flagged, files_clean, source_type,
          submitted_by, created_at, completed_at) VALUES (?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(job.id.as_str())
    .bind(job_status_to_str(job.status))
    .bind(job.total_files as i64)
    .bind(job.files_completed as i64)
    .bind(job.files_flagged as i64)
    .bind(job.files_clean as i64)
    .bind(source_type_to_str(job.source_type))
    .bind(&job.submitted_by)
    .bind(job.created_at)
    .bind(job.completed_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_job(pool: &SqlitePool, job: &QuarantineJob) -> Result<(), StorageError> {
    sqlx::query(
        "UPDATE quarantine_jobs SET status=?, files_completed=?, files_flagged=?, files_clean=?,
         completed_at=? WHERE id=?",
    )
    .bind(job_status_to_str(job.status))
    .bind(job.files_completed as i64)
    .bind(job.files_flagged as i64)
    .bind(job.files_clean as i64)
    .bind(job.completed_at)
    .bind(job.id.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_job(pool: &SqlitePool, id: &QuarantineJobId) -> Result<Option<QuarantineJob>, StorageError> {
    let row = sqlx::query("SELECT * FROM quarantine_jobs WHERE id = ?")
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_job).transpose()
}

fn row_to_file(row: &sqlx::sqlite::SqliteRow) -> Result<QuarantineFile, StorageError> {
    Ok(QuarantineFile {
        id: QuarantineFileId::new(row.try_get::<String, _>("id")?),
        job_id: QuarantineJobId::new(row.try_get::<String, _>("job_id")?),
        original_filename: row.try_get("original_filename")?,
        file_size: row.try_get::<i64, _>("file_size")? as u64,
        mime_type: row.try_get("mime_type")?,
        sha256_hash: row.try_get("sha256_hash")?,
        status: file_status_from_str(row.try_get::<String, _>("status")?.as_str())?,
        current_stage: row.try_get("current_stage")?,
        risk_severity: severity_from_str(row.try_get::<String, _>("risk_severity")?.as_str())?,
        findings: serde_json::from_str(row.try_get::<String, _>("findings_blob")?.as_str())?,
        paths: QuarantineFilePaths {
            quarantine: row.try_get("quarantine_path")?,
            sanitized: row.try_get("sanitized_path")?,
            destination: row.try_get("destination_path")?,
        },
        review_reason: row.try_get("review_reason")?,
        reviewed_by: row.try_get("reviewed_by")?,
        reviewed_at: row.try_get("reviewed_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn insert_file(pool: &SqlitePool, file: &QuarantineFile) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO quarantine_files
         (id, job_id, original_filename, file_size, mime_type, sha256_hash, status, current_stage,
          risk_severity, findings_blob, quarantine_path, sanitized_path, destination_path,
          review_reason, reviewed_by, reviewed_at, created_at, updated_at)
         VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(file.id.as_str())
    .bind(file.job_id.as_str())
    .bind(&file.original_filename)
    .bind(file.file_size as i64)
    .bind(&file.mime_type)
    .bind(&file.sha256_hash)
    .bind(file_status_to_str(file.status))
    .bind(&file.current_stage)
    .bind(severity_to_str(file.risk_severity))
    .bind(serde_json::to_string(&file.findings)?)
    .bind(&file.paths.quarantine)
    .bind(&file.paths.sanitized)
    .bind(&file.paths.destination)
    .bind(&file.review_reason)
    .bind(&file.reviewed_by)
    .bind(file.reviewed_at)
    .bind(file.created_at)
    .bind(file.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_file(pool: &SqlitePool, file: &QuarantineFile) -> Result<(), StorageError> {
    sqlx::query(
        "UPDATE quarantine_files SET status=?, current_stage=?, risk_severity=?, findings_blob=?,
         sanitized_path=?, destination_path=?, review_reason=?, reviewed_by=?, reviewed_at=?,
         updated_at=? WHERE id=?",
    )
    .bind(file_status_to_str(file.status))
    .bind(&file.current_stage)
    .bind(severity_to_str(file.risk_severity))
    .bind(serde_json::to_string(&file.findings)?)
    .bind(&file.paths.sanitized)
    .bind(&file.paths.destination)
    .bind(&file.review_reason)
    .bind(&file.reviewed_by)
    .bind(file.reviewed_at)
    .bind(file.updated_at)
    .bind(file.id.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_file(pool: &SqlitePool, id: &QuarantineFileId) -> Result<Option<QuarantineFile>, StorageError> {
    let row = sqlx::query("SELECT * FROM quarantine_files WHERE id = ?")
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_file).transpose()
}

pub async fn files_for_job(pool: &SqlitePool, job_id: &QuarantineJobId) -> Result<Vec<QuarantineFile>, StorageError> {
    let rows = sqlx::query("SELECT * FROM quarantine_files WHERE job_id = ? ORDER BY created_at")
        .bind(job_id.as_str())
        .fetch_all(pool)
        .await?;
    rows.iter().map(row_to_file).collect()
}

pub async fn held_files(pool: &SqlitePool) -> Result<Vec<QuarantineFile>, StorageError> {
    let rows = sqlx::query("SELECT * FROM quarantine_files WHERE status = 'held' ORDER BY created_at")
        .fetch_all(pool)
        .await?;
    rows.iter().map(row_to_file).collect()
}

#[cfg(test)]
#[path = "quarantine_tests.rs"]
mod tests;
