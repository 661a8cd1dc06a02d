// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed row ↔ domain mapping for `adapters`.

use sqlx::{Row, SqlitePool};
use vault_core::adapter::{Adapter, AdapterStatus};
use vault_core::ids::{AdapterId, TrainingJobId};
use vault_core::job::AdapterType;

use crate::StorageError;

fn type_to_str(t: AdapterType) -> &'static str {
    match t {
        AdapterType::Full => "full",
        AdapterType::Lora => "lora",
        AdapterType::Qlora => "qlora",
    }
}

fn type_from_str(s: &str) -> Result<AdapterType, StorageError> {
    Ok(match s {
        "full" => AdapterType::Full,
        "lora" => AdapterType::Lora,
        "qlora" => AdapterType::Qlora,
        other => return Err(StorageError::Decode(format!("unknown adapter type {other}"))),
    })
}

fn status_to_str(s: AdapterStatus) -> &'static str {
    match s {
        AdapterStatus::Ready => "ready",
        AdapterStatus::Active => "active",
    }
}

fn status_from_str(s: &str) -> Result<AdapterStatus, StorageError> {
    Ok(match s {
        "ready" => AdapterStatus::Ready,
        "active" => AdapterStatus::Active,
        other => return Err(StorageError::Decode(format!("unknown adapter status {other}"))),
    })
}

fn row_to_adapter(row: &sqlx::sqlite::SqliteRow) -> Result<Adapter, StorageError> {
    Ok(Adapter {
        id: AdapterId::new(row.try_get::<String, _>("id")?),
        name: row.try_get("name")?,
        base_model: row.try_get("base_model")?,
        adapter_type: type_from_str(row.try_get::<String, _>("adapter_type")?.as_str())?,
        status: status_from_str(row.try_get::<String, _>("status")?.as_str())?,
        path: row.try_get("path")?,
        training_job_id: row
            .try_get::<Option<String>, _>("training_job_id")?
            .map(TrainingJobId::new),
        config_blob: serde_json::from_str(row.try_get::<String, _>("config_blob")?.as_str())?,
        metrics_blob: serde_json::from_str(row.try_get::<String, _>("metrics_blob")?.as_str())?,
        size_bytes: row.try_get::<i64, _>("size_bytes")? as u64,
        version: row.try_get::<i64, _>("version")? as u32,
        created_at: row.try_get("created_at")?,
        activated_at: row.try_get("activated_at")?,
    })
}

pub async fn insert(pool: &SqlitePool, adapter: &Adapter) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO adapters
         (id, name, base_model, adapter_type, status, path, training_job_id, config_blob,
          metrics_blob, size_bytes, version, created_at, activated_at)
         VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(adapter.id.as_str())
    .bind(&adapter.name)
    .bind(&adapter.base_model)
    .bind(type_to_str(adapter.adapter_type))
    .bind(status_to_str(adapter.status))
    .bind(&adapter.path)
    .bind(adapter.training_job_id.as_ref().map(|t| t.as_str()))
    .bind(serde_json::to_string(&adapter.config_blob)?)
    .bind(serde_json::to_string(&adapter.metrics_blob)?)
    .bind(adapter.size_bytes as i64)
    .bind(adapter.version as i64)
    .bind(adapter.created_at)
    .bind(adapter.activated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_activation(pool: &SqlitePool, adapter: &Adapter) -> Result<(), StorageError> {
    sqlx::query("UPDATE adapters SET status=?, activated_at=? WHERE id=?")
        .bind(status_to_str(adapter.status))
        .bind(adapter.activated_at)
        .bind(adapter.id.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: &AdapterId) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM adapters WHERE id = ?")
        .bind(id.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn get(pool: &SqlitePool, id: &AdapterId) -> Result<Option<Adapter>, StorageError> {
    let row = sqlx::query("SELECT * FROM adapters WHERE id = ?")
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_adapter).transpose()
}

/// All adapters sharing `name`, for enforcing "at most one active" before
/// activating a candidate.
pub async fn by_name(pool: &SqlitePool, name: &str) -> Result<Vec<Adapter>, StorageError> {
    let rows = sqlx::query("SELECT * FROM adapters WHERE name = ?")
        .bind(name)
        .fetch_all(pool)
        .await?;
    rows.iter().map(row_to_adapter).collect()
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<Adapter>, StorageError> {
    let rows = sqlx::query("SELECT * FROM adapters ORDER BY created_at DESC")
        .fetch_all(pool)
        .await?;
    rows.iter().map(row_to_adapter).collect()
}

#[cfg(test)]
#[path = "adapters_tests.rs"]
mod tests;
