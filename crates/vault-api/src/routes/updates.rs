// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bundle scan/apply/rollback and job history. Apply and rollback share
//! one process-wide lock so at most one is ever in flight.

use std::path::PathBuf;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use vault_core::error::CoreError;
use vault_core::id::IdGen;
use vault_core::ids::UpdateJobId;
use vault_core::update_job::UpdateJob;
use vault_update::engine::{apply, parse_and_verify_bundle, rollback};
use vault_storage::repo::update_jobs;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vault/updates/status", get(status))
        .route("/vault/updates/pending", get(pending))
        .route("/vault/updates/history", get(history))
        .route("/vault/updates/scan", post(scan))
        .route("/vault/updates/apply", post(apply_update))
        .route("/vault/updates/rollback", post(rollback_update))
        .route("/vault/updates/progress/:job_id", get(progress))
}

async fn status(_: Principal, State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let latest = update_jobs::history(&state.pool).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(serde_json::json!({ "latest": latest.first() })))
}

async fn pending(_: Principal, State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let staged = state.update_paths.staging_root.exists();
    Ok(Json(serde_json::json!({ "bundle_staged": staged })))
}

async fn history(_: Principal, State(state): State<AppState>) -> Result<Json<Vec<UpdateJob>>, ApiError> {
    let jobs = update_jobs::history(&state.pool).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(jobs))
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub bundle_path: String,
    pub signature_path: String,
}

async fn scan(
    principal: Principal,
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let manifest = parse_and_verify_bundle(
        &state.update_paths,
        &PathBuf::from(req.bundle_path),
        &PathBuf::from(req.signature_path),
    )
    .map_err(CoreError::from)?;
    Ok(Json(serde_json::json!({
        "version": manifest.version,
        "min_compatible_version": manifest.min_compatible_version,
        "changelog": manifest.changelog,
        "components": manifest.components,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub bundle_path: String,
    pub signature_path: String,
    pub create_backup: bool,
    pub confirmation: String,
}

async fn apply_update(
    principal: Principal,
    State(state): State<AppState>,
    Json(req): Json<ApplyRequest>,
) -> Result<Json<UpdateJob>, ApiError> {
    principal.require_admin()?;
    let manifest = parse_and_verify_bundle(
        &state.update_paths,
        &PathBuf::from(&req.bundle_path),
        &PathBuf::from(&req.signature_path),
    )
    .map_err(CoreError::from)?;

    let job_id = UpdateJobId::new(state.id_gen.next());
    let job = apply(&state.pool, &state.update_paths, job_id, &manifest, req.create_backup, &req.confirmation)
        .await
        .map_err(CoreError::from)?;
    Ok(Json(job))
}

#[derive(Debug, Deserialize)]
pub struct RollbackRequest {
    pub from_job_id: String,
    pub confirmation: String,
}

async fn rollback_update(
    principal: Principal,
    State(state): State<AppState>,
    Json(req): Json<RollbackRequest>,
) -> Result<Json<UpdateJob>, ApiError> {
    principal.require_admin()?;
    let from_job = update_jobs::get(&state.pool, &UpdateJobId::new(&req.from_job_id))
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?
        .ok_or_else(|| CoreError::not_found(format!("update job {} not found", req.from_job_id)))?;

    let job_id = UpdateJobId::new(state.id_gen.next());
    let job = rollback(&state.pool, &state.update_paths, job_id, &from_job, &req.confirmation)
        .await
        .map_err(CoreError::from)?;
    Ok(Json(job))
}

async fn progress(
    _: Principal,
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<UpdateJob>, ApiError> {
    let job = update_jobs::get(&state.pool, &UpdateJobId::new(&job_id))
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?
        .ok_or_else(|| CoreError::not_found(format!("update job {job_id} not found")))?;
    Ok(Json(job))
}

#[cfg(test)]
#[path = "updates_tests.rs"]
mod tests;
