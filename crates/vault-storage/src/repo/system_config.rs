// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence for `SystemConfig`: one row per set key, JSON-encoded value.

use sqlx::{Row, SqlitePool};
use vault_core::config::SystemConfig;

use crate::StorageError;

pub async fn load(pool: &SqlitePool) -> Result<SystemConfig, StorageError> {
    let rows = sqlx::query("SELECT key, value FROM system_config").fetch_all(pool).await?;
    let mut config = SystemConfig::new();
    for row in &rows {
        let key: String = row.try_get("key")?;
        let raw: String = row.try_get("value")?;
        config.set(key, serde_json::from_str(&raw)?);
    }
    Ok(config)
}

pub async fn set(pool: &SqlitePool, key: &str, value: &serde_json::Value) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO system_config (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(serde_json::to_string(value)?)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
#[path = "system_config_tests.rs"]
mod tests;
