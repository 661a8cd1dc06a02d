// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin admin CRUD: users, API keys, and the `SystemConfig` groups the
//! dashboard edits (network, models, TLS, directory auth). None of these
//! own business logic beyond validating shape and persisting the row —
//! the interesting behavior (training, quarantine, updates) lives in its
//! own route module.

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use vault_core::error::CoreError;
use vault_core::id::IdGen;
use vault_core::ids::{ApiKeyId, LdapGroupMappingId, UserId};
use vault_core::ldap::LdapGroupMapping;
use vault_core::user::{ApiKey, ApiKeyScope, Role, User};
use vault_storage::repo::{ldap, system_config, users};

use crate::auth::{hash_api_key, hash_password, Principal};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vault/admin/users", get(list_users).post(create_user))
        .route("/vault/admin/users/:id", delete(delete_user))
        .route("/vault/admin/keys", get(list_keys).post(create_key))
        .route("/vault/admin/keys/:id", delete(revoke_key))
        .route("/vault/admin/directory-mappings", get(list_mappings).post(create_mapping))
        .route("/vault/admin/config/:group", get(get_config_group).put(put_config_group))
}

async fn list_users(principal: Principal, State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    principal.require_admin()?;
    let rows = users::list_users(&state.pool).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

async fn create_user(
    principal: Principal,
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<User>, ApiError> {
    principal.require_admin()?;
    let user = User::new_local(
        UserId::new(state.id_gen.next()),
        req.name,
        req.email,
        req.role,
        hash_password(&req.password),
        Utc::now(),
    );
    users::insert_user(&state.pool, &user).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(user))
}

async fn delete_user(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    users::delete_user(&state.pool, &UserId::new(id)).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

async fn list_keys(principal: Principal, State(state): State<AppState>) -> Result<Json<Vec<ApiKey>>, ApiError> {
    principal.require_admin()?;
    let rows = users::list_api_keys(&state.pool).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct CreateKeyRequest {
    pub label: String,
    pub scope: ApiKeyScope,
    pub user_id: Option<String>,
}

async fn create_key(
    principal: Principal,
    State(state): State<AppState>,
    Json(req): Json<CreateKeyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let raw_key = state.id_gen.next();
    let key = ApiKey {
        id: ApiKeyId::new("0"),
        key_hash: hash_api_key(&raw_key),
        key_prefix: raw_key.chars().take(ApiKey::PREFIX_LEN).collect(),
        label: req.label,
        scope: req.scope,
        is_active: true,
        user_id: req.user_id.map(UserId::new),
        created_at: Utc::now(),
        last_used_at: None,
        notes: None,
    };
    users::insert_api_key(&state.pool, &key).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(serde_json::json!({ "label": key.label, "key": raw_key })))
}

async fn revoke_key(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    users::revoke_api_key(&state.pool, &ApiKeyId::new(id)).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(serde_json::json!({ "revoked": true })))
}

async fn list_mappings(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<Vec<LdapGroupMapping>>, ApiError> {
    principal.require_admin()?;
    let rows = ldap::all(&state.pool).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct CreateMappingRequest {
    pub directory_group_identifier: String,
    pub role: Role,
    pub priority: i32,
}

async fn create_mapping(
    principal: Principal,
    State(state): State<AppState>,
    Json(req): Json<CreateMappingRequest>,
) -> Result<Json<LdapGroupMapping>, ApiError> {
    principal.require_admin()?;
    let mapping = LdapGroupMapping {
        id: LdapGroupMappingId::new(state.id_gen.next()),
        directory_group_identifier: req.directory_group_identifier,
        role: req.role,
        priority: req.priority,
    };
    ldap::insert(&state.pool, &mapping).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(mapping))
}

/// `group` namespaces the flat `SystemConfig` key space (e.g. `network`,
/// `models`, `tls`, `directory-auth`); callers set/read `{group}.*` keys.
async fn get_config_group(
    principal: Principal,
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let config = system_config::load(&state.pool).await.map_err(|e| CoreError::internal(e.to_string()))?;
    let mut out = serde_json::Map::new();
    for (key, value) in config.namespace(&group) {
        out.insert(key.to_string(), value.clone());
    }
    Ok(Json(serde_json::Value::Object(out)))
}

async fn put_config_group(
    principal: Principal,
    State(state): State<AppState>,
    Path(group): Path<String>,
    Json(updates): Json<serde_json::Map<String, serde_json::Value>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    for (key, value) in &updates {
        system_config::set(&state.pool, &format!("{group}.{key}"), value)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?;
    }
    Ok(Json(serde_json::json!({ "updated": true })))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
