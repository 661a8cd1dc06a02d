// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-scheme authentication: bearer session token (stateless, signed) or
//! API key (looked up by salted hash, `last_used_at` touched on success).
//! Admin-only handlers additionally check [`Principal::is_admin`].

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use chrono::Utc;
use sha2::{Digest, Sha256};
use vault_core::error::CoreError;
use vault_core::user::{ApiKeyScope, Role};
use vault_storage::repo::users;

use crate::error::ApiError;
use crate::session;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub enum Principal {
    Session { user_id: String, role: Role },
    ApiKey { key_id: String, scope: ApiKeyScope },
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        match self {
            Principal::Session { role, .. } => matches!(role, Role::Admin),
            Principal::ApiKey { scope, .. } => matches!(scope, ApiKeyScope::Admin),
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CoreError::authorization("this endpoint requires the admin scope").into())
        }
    }
}

pub fn hash_api_key(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Local-account credential hash. Shares the API key's SHA-256 scheme;
/// both are operator-issued high-entropy secrets, not user-chosen
/// low-entropy passwords, so a slow KDF buys nothing here.
pub fn hash_password(raw: &str) -> String {
    hash_api_key(raw)
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

#[async_trait::async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let State(state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError(CoreError::internal("missing application state")))?;

        let token = bearer_token(parts).ok_or_else(|| CoreError::authentication("missing bearer credential"))?;

        if let Ok(claims) = session::verify(&state.session_secret, token, Utc::now()) {
            return Ok(Principal::Session {
                user_id: claims.user_id,
                role: claims.role,
            });
        }

        let hash = hash_api_key(token);
        let key = users::find_by_hash(&state.pool, &hash)
            .await
            .map_err(|e| CoreError::internal(e.to_string()))?
            .ok_or_else(|| CoreError::authentication("invalid credential"))?;
        let _ = users::touch_last_used(&state.pool, &key.id, Utc::now()).await;

        Ok(Principal::ApiKey {
            key_id: key.id.as_str().to_string(),
            scope: key.scope,
        })
    }
}

/// Verifies a WebSocket query-string token against the same key universe
/// bearer auth uses, without requiring an `Authorization` header (browsers
/// cannot set custom headers on a `WebSocket` handshake).
pub async fn verify_ws_token(state: &AppState, token: &str) -> Result<Principal, StatusCode> {
    if let Ok(claims) = session::verify(&state.session_secret, token, Utc::now()) {
        return Ok(Principal::Session {
            user_id: claims.user_id,
            role: claims.role,
        });
    }
    let hash = hash_api_key(token);
    match users::find_by_hash(&state.pool, &hash).await {
        Ok(Some(key)) => {
            let _ = users::touch_last_used(&state.pool, &key.id, Utc::now()).await;
            Ok(Principal::ApiKey {
                key_id: key.id.as_str().to_string(),
                scope: key.scope,
            })
        }
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
