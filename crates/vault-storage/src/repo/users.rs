// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed row ↔ domain mapping for `users` and `api_keys`.

use sqlx::{Row, SqlitePool};
use vault_core::ids::{ApiKeyId, UserId};
use vault_core::user::{ApiKey, ApiKeyScope, AuthSource, Role, User, UserStatus};

use crate::StorageError;

fn role_to_str(r: Role) -> &'static str {
    match r {
        Role::Admin => "admin",
        Role::User => "user",
    }
}

fn role_from_str(s: &str) -> Result<Role, StorageError> {
    Ok(match s {
        "admin" => Role::Admin,
        "user" => Role::User,
        other => return Err(StorageError::Decode(format!("unknown role {other}"))),
    })
}

fn status_to_str(s: UserStatus) -> &'static str {
    match s {
        UserStatus::Active => "active",
        UserStatus::Disabled => "disabled",
    }
}

fn status_from_str(s: &str) -> Result<UserStatus, StorageError> {
    Ok(match s {
        "active" => UserStatus::Active,
        "disabled" => UserStatus::Disabled,
        other => return Err(StorageError::Decode(format!("unknown user status {other}"))),
    })
}

fn auth_source_to_str(s: AuthSource) -> &'static str {
    match s {
        AuthSource::Local => "local",
        AuthSource::Directory => "directory",
    }
}

fn auth_source_from_str(s: &str) -> Result<AuthSource, StorageError> {
    Ok(match s {
        "local" => AuthSource::Local,
        "directory" => AuthSource::Directory,
        other => return Err(StorageError::Decode(format!("unknown auth source {other}"))),
    })
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, StorageError> {
    Ok(User {
        id: UserId::new(row.try_get::<String, _>("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role: role_from_str(row.try_get::<String, _>("role")?.as_str())?,
        status: status_from_str(row.try_get::<String, _>("status")?.as_str())?,
        auth_source: auth_source_from_str(row.try_get::<String, _>("auth_source")?.as_str())?,
        credential_hash: row.try_get("credential_hash")?,
        directory_dn: row.try_get("directory_dn")?,
        created_at: row.try_get("created_at")?,
        last_active: row.try_get("last_active")?,
    })
}

pub async fn insert_user(pool: &SqlitePool, user: &User) -> Result<(), StorageError> {
    user.check_invariant()
        .map_err(|e| StorageError::Decode(e.to_string()))?;
    sqlx::query(
        "INSERT INTO users (id, name, email, role, status, auth_source, credential_hash,
         directory_dn, created_at, last_active) VALUES (?,?,?,?,?,?,?,?,?,?)",
    )
    .bind(user.id.as_str())
    .bind(&user.name)
    .bind(&user.email)
    .bind(role_to_str(user.role))
    .bind(status_to_str(user.status))
    .bind(auth_source_to_str(user.auth_source))
    .bind(&user.credential_hash)
    .bind(&user.directory_dn)
    .bind(user.created_at)
    .bind(user.last_active)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, StorageError> {
    let row = sqlx::query("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_user).transpose()
}

pub async fn get_user(pool: &SqlitePool, id: &UserId) -> Result<Option<User>, StorageError> {
    let row = sqlx::query("SELECT * FROM users WHERE id = ?")
        .bind(id.as_str())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_user).transpose()
}

pub async fn touch_last_active(pool: &SqlitePool, id: &UserId, now: chrono::DateTime<chrono::Utc>) -> Result<(), StorageError> {
    sqlx::query("UPDATE users SET last_active = ? WHERE id = ?")
        .bind(now)
        .bind(id.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, StorageError> {
    let rows = sqlx::query("SELECT * FROM users ORDER BY created_at DESC").fetch_all(pool).await?;
    rows.iter().map(row_to_user).collect()
}

pub async fn delete_user(pool: &SqlitePool, id: &UserId) -> Result<(), StorageError> {
    sqlx::query("DELETE FROM users WHERE id = ?").bind(id.as_str()).execute(pool).await?;
    Ok(())
}

fn key_scope_to_str(s: ApiKeyScope) -> &'static str {
    match s {
        ApiKeyScope::User => "user",
        ApiKeyScope::Admin => "admin",
    }
}

fn key_scope_from_str(s: &str) -> Result<ApiKeyScope, StorageError> {
    Ok(match s {
        "user" => ApiKeyScope::User,
        "admin" => ApiKeyScope::Admin,
        other => return Err(StorageError::Decode(format!("unknown api key scope {other}"))),
    })
}

fn row_to_api_key(row: &sqlx::sqlite::SqliteRow) -> Result<ApiKey, StorageError> {
    Ok(ApiKey {
        id: ApiKeyId::new(row.try_get::<i64, _>("id")?.to_string()),
        key_hash: row.try_get("key_hash")?,
        key_prefix: row.try_get("key_prefix")?,
        label: row.try_get("label")?,
        scope: key_scope_from_str(row.try_get::<String, _>("scope")?.as_str())?,
        is_active: row.try_get::<i64, _>("is_active")? != 0,
        user_id: row.try_get::<Option<String>, _>("user_id")?.map(UserId::new),
        created_at: row.try_get("created_at")?,
        last_used_at: row.try_get("last_used_at")?,
        notes: row.try_get("notes")?,
    })
}

/// Inserts a new key; the autoincrement id is assigned by SQLite so the
/// caller's `key.id` is ignored on write and must be re-read afterward.
pub async fn insert_api_key(pool: &SqlitePool, key: &ApiKey) -> Result<i64, StorageError> {
    let result = sqlx::query(
        "INSERT INTO api_keys (key_hash, key_prefix, label, scope, is_active, user_id, created_at,
         last_used_at, notes) VALUES (?,?,?,?,?,?,?,?,?)",
    )
    .bind(&key.key_hash)
    .bind(&key.key_prefix)
    .bind(&key.label)
    .bind(key_scope_to_str(key.scope))
    .bind(key.is_active as i64)
    .bind(key.user_id.as_ref().map(|u| u.as_str()))
    .bind(key.created_at)
    .bind(key.last_used_at)
    .bind(&key.notes)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn find_by_hash(pool: &SqlitePool, key_hash: &str) -> Result<Option<ApiKey>, StorageError> {
    let row = sqlx::query("SELECT * FROM api_keys WHERE key_hash = ? AND is_active = 1")
        .bind(key_hash)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_api_key).transpose()
}

pub async fn touch_last_used(pool: &SqlitePool, id: &ApiKeyId, now: chrono::DateTime<chrono::Utc>) -> Result<(), StorageError> {
    sqlx::query("UPDATE api_keys SET last_used_at = ? WHERE id = ?")
        .bind(now)
        .bind(id.as_str().parse::<i64>().map_err(|_| StorageError::Decode("invalid api key id".into()))?)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_api_keys(pool: &SqlitePool) -> Result<Vec<ApiKey>, StorageError> {
    let rows = sqlx::query("SELECT * FROM api_keys ORDER BY created_at DESC").fetch_all(pool).await?;
    rows.iter().map(row_to_api_key).collect()
}

pub async fn revoke_api_key(pool: &SqlitePool, id: &ApiKeyId) -> Result<(), StorageError> {
    sqlx::query("UPDATE api_keys SET is_active = 0 WHERE id = ?")
        .bind(id.as_str().parse::<i64>().map_err(|_| StorageError::Decode("invalid api key id".into()))?)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
