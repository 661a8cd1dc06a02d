// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only writer/reader for `audit_log`. No update or delete path is
//! exposed here on purpose.

use sqlx::{Row, SqlitePool};
use vault_core::audit::AuditLogEntry;
use vault_core::ids::AuditLogEntryId;

use crate::StorageError;

fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<AuditLogEntry, StorageError> {
    Ok(AuditLogEntry {
        id: AuditLogEntryId::new(row.try_get::<String, _>("id")?),
        timestamp: row.try_get("timestamp")?,
        action: row.try_get("action")?,
        method: row.try_get("method")?,
        path: row.try_get("path")?,
        user_key_prefix: row.try_get("user_key_prefix")?,
        model: row.try_get("model")?,
        status_code: row.try_get::<Option<i64>, _>("status_code")?.map(|v| v as u16),
        latency_ms: row.try_get::<Option<i64>, _>("latency_ms")?.map(|v| v as u64),
        tokens_input: row.try_get::<Option<i64>, _>("tokens_input")?.map(|v| v as u64),
        tokens_output: row.try_get::<Option<i64>, _>("tokens_output")?.map(|v| v as u64),
        details: row
            .try_get::<Option<String>, _>("details")?
            .map(|s| serde_json::from_str(&s))
            .transpose()?,
    })
}

pub async fn append(pool: &SqlitePool, entry: &AuditLogEntry) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO audit_log
         (id, timestamp, action, method, path, user_key_prefix, model, status_code, latency_ms,
          tokens_input, tokens_output, details) VALUES (?,?,?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(entry.id.as_str())
    .bind(entry.timestamp)
    .bind(&entry.action)
    .bind(&entry.method)
    .bind(&entry.path)
    .bind(&entry.user_key_prefix)
    .bind(&entry.model)
    .bind(entry.status_code.map(|v| v as i64))
    .bind(entry.latency_ms.map(|v| v as i64))
    .bind(entry.tokens_input.map(|v| v as i64))
    .bind(entry.tokens_output.map(|v| v as i64))
    .bind(entry.details.as_ref().map(serde_json::to_string).transpose()?)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<AuditLogEntry>, StorageError> {
    let rows = sqlx::query("SELECT * FROM audit_log ORDER BY timestamp DESC LIMIT ?")
        .bind(limit)
        .fetch_all(pool)
        .await?;
    rows.iter().map(row_to_entry).collect()
}

#[cfg(test)]
#[path = "audit_log_tests.rs"]
mod tests;
