// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Login and the calling-identity introspection endpoint.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use vault_core::error::CoreError;
use vault_storage::repo::{system_config, users};

use crate::auth::{hash_password, Principal};
use crate::error::ApiError;
use crate::session;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vault/auth/login", post(login))
        .route("/vault/auth/me", get(me))
        .route("/vault/auth/ldap-enabled", get(ldap_enabled))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub role: vault_core::user::Role,
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = users::get_user_by_email(&state.pool, &req.email)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?
        .ok_or_else(|| CoreError::authentication("invalid email or password"))?;

    if !user.is_active() {
        return Err(CoreError::authentication("account is disabled").into());
    }
    let expected = user.credential_hash.as_deref().ok_or_else(|| CoreError::authentication("invalid email or password"))?;
    if hash_password(&req.password) != expected {
        return Err(CoreError::authentication("invalid email or password").into());
    }

    let now = Utc::now();
    let _ = users::touch_last_active(&state.pool, &user.id, now).await;
    let token = session::issue(&state.session_secret, user.id.as_str(), user.role, now);

    Ok(Json(LoginResponse {
        token,
        user_id: user.id.as_str().to_string(),
        role: user.role,
    }))
}

async fn me(principal: Principal) -> Json<serde_json::Value> {
    Json(match principal {
        Principal::Session { user_id, role } => serde_json::json!({ "kind": "session", "user_id": user_id, "role": role }),
        Principal::ApiKey { key_id, scope } => serde_json::json!({ "kind": "api_key", "key_id": key_id, "scope": scope }),
    })
}

async fn ldap_enabled(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let config = system_config::load(&state.pool).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(serde_json::json!({ "enabled": config.get_bool("ldap.enabled", false) })))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
