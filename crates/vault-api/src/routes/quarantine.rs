// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quarantine submission, held-file review, and the config the admin
//! panel edits.

use std::path::PathBuf;

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use vault_core::error::CoreError;
use vault_core::id::IdGen;
use vault_core::ids::{AuditLogEntryId, QuarantineFileId, QuarantineJobId};
use vault_core::quarantine::{QuarantineJob, SourceType};
use vault_quarantine::pipeline::StagedFile;
use vault_quarantine::review;
use vault_storage::repo::quarantine as repo;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vault/quarantine/scan", post(submit_scan))
        .route("/vault/quarantine/scan/:id", get(get_job))
        .route("/vault/quarantine/held", get(list_held))
        .route("/vault/quarantine/held/:id", get(get_held_file))
        .route("/vault/quarantine/held/:id/approve", post(approve_file))
        .route("/vault/quarantine/held/:id/reject", post(reject_file))
        .route("/vault/quarantine/signatures", get(signatures))
        .route("/vault/quarantine/stats", get(stats))
        .route("/vault/admin/config/quarantine", get(get_config).put(put_config))
}

#[derive(Debug, Deserialize)]
pub struct SubmitScanRequest {
    pub paths: Vec<String>,
    pub source_type: SourceType,
    pub submitted_by: Option<String>,
}

/// Path-based submission variant: every entry in `paths` must already be
/// readable by the daemon (e.g. staged under a USB mount or the admin
/// upload directory); this endpoint does not itself receive file bytes.
async fn submit_scan(
    principal: Principal,
    State(state): State<AppState>,
    Json(req): Json<SubmitScanRequest>,
) -> Result<Json<QuarantineJob>, ApiError> {
    principal.require_admin()?;
    if req.paths.is_empty() {
        return Err(CoreError::validation("at least one path must be submitted").into());
    }

    let job_id = QuarantineJobId::new(state.id_gen.next());
    let job = QuarantineJob::new(job_id.clone(), req.paths.len() as u32, req.source_type, req.submitted_by, Utc::now());
    repo::insert_job(&state.pool, &job).await.map_err(|e| CoreError::internal(e.to_string()))?;

    let files: Vec<StagedFile> = req
        .paths
        .iter()
        .map(|p| StagedFile {
            id: QuarantineFileId::new(state.id_gen.next()),
            original_filename: PathBuf::from(p).file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| p.clone()),
            staged_path: PathBuf::from(p),
        })
        .collect();

    let driver = state.quarantine_pipeline.clone();
    tokio::spawn(async move {
        let _ = driver.run(job_id, files).await;
    });

    Ok(Json(job))
}

async fn get_job(
    _: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuarantineJob>, ApiError> {
    let job = repo::get_job(&state.pool, &QuarantineJobId::new(&id))
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?
        .ok_or_else(|| CoreError::not_found(format!("quarantine job {id} not found")))?;
    Ok(Json(job))
}

async fn list_held(_: Principal, State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let files = repo::held_files(&state.pool).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(serde_json::json!({ "files": files })))
}

async fn get_held_file(
    _: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file = repo::get_file(&state.pool, &QuarantineFileId::new(&id))
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?
        .ok_or_else(|| CoreError::not_found(format!("quarantine file {id} not found")))?;
    Ok(Json(serde_json::json!(file)))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub reason: String,
    pub destination: Option<String>,
}

async fn approve_file(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reviewer = require_reviewer(&principal)?;
    let destination = req.destination.unwrap_or_else(|| format!("/var/lib/vault/released/{id}"));
    review::approve(
        &state.pool,
        AuditLogEntryId::new(state.id_gen.next()),
        &QuarantineFileId::new(&id),
        std::path::Path::new(&destination),
        req.reason,
        reviewer,
    )
    .await
    .map_err(CoreError::from)?;
    Ok(Json(serde_json::json!({ "approved": true })))
}

async fn reject_file(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reviewer = require_reviewer(&principal)?;
    review::reject(
        &state.pool,
        AuditLogEntryId::new(state.id_gen.next()),
        &QuarantineFileId::new(&id),
        req.reason,
        reviewer,
    )
    .await
    .map_err(CoreError::from)?;
    Ok(Json(serde_json::json!({ "rejected": true })))
}

fn require_reviewer(principal: &Principal) -> Result<String, ApiError> {
    principal.require_admin()?;
    Ok(match principal {
        Principal::Session { user_id, .. } => user_id.clone(),
        Principal::ApiKey { key_id, .. } => key_id.clone(),
    })
}

/// Thin stub: signature-set metadata, not the full rule bodies.
async fn signatures(_: Principal) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "signatures": [] }))
}

async fn stats(_: Principal, State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let held = repo::held_files(&state.pool).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(serde_json::json!({ "held_count": held.len() })))
}

async fn get_config(principal: Principal, State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let config = state.quarantine.read();
    Ok(Json(serde_json::json!({
        "max_file_size_bytes": config.max_file_size_bytes,
        "max_batch_count": config.max_batch_count,
        "auto_approve_clean": config.auto_approve_clean,
        "strictness": config.strictness,
    })))
}

#[derive(Debug, Deserialize)]
pub struct QuarantineConfigUpdate {
    pub max_file_size_bytes: Option<u64>,
    pub max_batch_count: Option<u32>,
    pub auto_approve_clean: Option<bool>,
}

async fn put_config(
    principal: Principal,
    State(state): State<AppState>,
    Json(req): Json<QuarantineConfigUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let mut config = state.quarantine.write();
    if let Some(v) = req.max_file_size_bytes {
        config.max_file_size_bytes = v;
    }
    if let Some(v) = req.max_batch_count {
        config.max_batch_count = v;
    }
    if let Some(v) = req.auto_approve_clean {
        config.auto_approve_clean = v;
    }
    Ok(Json(serde_json::json!({ "updated": true, "note": "takes effect on next restart" })))
}

#[cfg(test)]
#[path = "quarantine_tests.rs"]
mod tests;
