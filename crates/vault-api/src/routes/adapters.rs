// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter registry: list/inspect/activate/deactivate/delete, delegating
//! all the coordinated-restart work to [`vault_ops::adapters::AdapterManager`].

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use vault_core::adapter::Adapter;
use vault_core::error::CoreError;
use vault_core::ids::AdapterId;
use vault_storage::repo::adapters;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vault/training/adapters", get(list_adapters))
        .route("/vault/training/adapters/:id", get(get_adapter).delete(delete_adapter))
        .route("/vault/training/adapters/:id/activate", post(activate))
        .route("/vault/training/adapters/:id/deactivate", post(deactivate))
}

async fn list_adapters(_: Principal, State(state): State<AppState>) -> Result<Json<Vec<Adapter>>, ApiError> {
    let rows = adapters::list(&state.pool).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(rows))
}

async fn get_adapter(
    _: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Adapter>, ApiError> {
    let adapter = adapters::get(&state.pool, &AdapterId::new(&id))
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?
        .ok_or_else(|| CoreError::not_found(format!("adapter {id} not found")))?;
    Ok(Json(adapter))
}

async fn activate(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Adapter>, ApiError> {
    principal.require_admin()?;
    let adapter = state.adapter_manager.activate(&AdapterId::new(id)).await.map_err(CoreError::from)?;
    Ok(Json(adapter))
}

async fn deactivate(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Adapter>, ApiError> {
    principal.require_admin()?;
    let adapter = state.adapter_manager.deactivate(&AdapterId::new(id)).await.map_err(CoreError::from)?;
    Ok(Json(adapter))
}

async fn delete_adapter(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    state.adapter_manager.delete(&AdapterId::new(id)).await.map_err(CoreError::from)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[cfg(test)]
#[path = "adapters_tests.rs"]
mod tests;
