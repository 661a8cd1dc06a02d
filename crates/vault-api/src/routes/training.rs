// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Training job lifecycle: create, list, inspect, pause/resume/cancel,
//! delete. GPU admission is acquired at creation time and released back
//! to the scheduler whenever the worker reaches a terminal state.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vault_core::error::CoreError;
use vault_core::id::IdGen;
use vault_core::ids::{TrainingJobId, WorkloadId};
use vault_core::job::{AdapterType, TrainingJob, TrainingJobStatus};
use vault_scheduler::gpu::workload;
use vault_scheduler::runner::RunConfig;
use vault_storage::repo::training_jobs;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vault/training/jobs", get(list_jobs).post(create_job))
        .route("/vault/training/jobs/:id", get(get_job).delete(delete_job))
        .route("/vault/training/jobs/:id/pause", post(pause_job))
        .route("/vault/training/jobs/:id/resume", post(resume_job))
        .route("/vault/training/jobs/:id/cancel", post(cancel_job))
        .route("/vault/training/validate", post(validate_config))
        .route("/vault/training/gpu-allocation", get(gpu_allocation))
}

async fn list_jobs(_: Principal, State(state): State<AppState>) -> Result<Json<Vec<TrainingJob>>, ApiError> {
    let jobs = training_jobs::list(&state.pool).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(jobs))
}

async fn get_job(
    _: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TrainingJob>, ApiError> {
    let job = fetch(&state, &id).await?;
    Ok(Json(job))
}

async fn fetch(state: &AppState, id: &str) -> Result<TrainingJob, ApiError> {
    training_jobs::get(&state.pool, &TrainingJobId::new(id))
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?
        .ok_or_else(|| CoreError::not_found(format!("training job {id} not found")).into())
}

#[derive(Debug, Deserialize)]
pub struct CreateTrainingJobRequest {
    pub name: String,
    pub model: String,
    pub dataset: String,
    pub adapter_type: AdapterType,
    pub config: Value,
}

async fn create_job(
    principal: Principal,
    State(state): State<AppState>,
    Json(req): Json<CreateTrainingJobRequest>,
) -> Result<Json<TrainingJob>, ApiError> {
    principal.require_admin()?;

    let job_id = TrainingJobId::new(state.id_gen.next());
    let workload_id = workload(job_id.clone());

    let decision = state.gpu.can_start().await;
    if !decision.allowed {
        return Err(CoreError::conflict(decision.reason.unwrap_or_else(|| "admission denied".to_string())).into());
    }

    let job = TrainingJob::new(
        job_id.clone(),
        &req.name,
        &req.model,
        &req.dataset,
        req.adapter_type,
        req.config.clone(),
        Utc::now(),
    );
    training_jobs::insert(&state.pool, &job).await.map_err(|e| CoreError::internal(e.to_string()))?;

    let gpu_index = state
        .gpu
        .acquire(workload_id.clone())
        .await
        .map_err(|decision| CoreError::conflict(decision.reason.unwrap_or_else(|| "admission denied".to_string())))?;

    let status_dir = PathBuf::from("/var/lib/vault/training").join(job_id.as_str());
    let run_config = RunConfig {
        job_id: workload_id.to_string(),
        status_dir,
        interpreter: PathBuf::from("/usr/bin/python3"),
        script_args: vec!["-m".to_string(), "vault_worker.train".to_string()],
        env: Vec::new(),
        is_training: true,
    };

    if let Err(e) = Arc::clone(&state.runner)
        .start_job(run_config, &req.config, Some(gpu_index))
        .await
    {
        state.gpu.release(&workload_id);
        let _ = training_jobs::delete(&state.pool, &job.id).await;
        return Err(CoreError::internal(e.to_string()).into());
    }

    Ok(Json(job))
}

async fn pause_job(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let job_id = WorkloadId::Training(TrainingJobId::new(&id)).to_string();
    if state.runner.pause_job(&job_id) {
        Ok(Json(serde_json::json!({ "accepted": true })))
    } else {
        Err(CoreError::conflict(format!("training job {id} is not running")).into())
    }
}

async fn resume_job(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TrainingJob>, ApiError> {
    principal.require_admin()?;
    let job = fetch(&state, &id).await?;
    if job.status != TrainingJobStatus::Paused {
        return Err(CoreError::conflict(format!("training job {id} is not paused")).into());
    }

    let workload_id = workload(job.id.clone());
    let gpu_index = state
        .gpu
        .acquire(workload_id.clone())
        .await
        .map_err(|decision| CoreError::conflict(decision.reason.unwrap_or_else(|| "admission denied".to_string())))?;

    let status_dir = PathBuf::from("/var/lib/vault/training").join(job.id.as_str());
    let run_config = RunConfig {
        job_id: workload_id.to_string(),
        status_dir,
        interpreter: PathBuf::from("/usr/bin/python3"),
        script_args: vec![
            "-m".to_string(),
            "vault_worker.train".to_string(),
            "--resume".to_string(),
        ],
        env: Vec::new(),
        is_training: true,
    };

    Arc::clone(&state.runner)
        .start_job(run_config, &job.config_blob, Some(gpu_index))
        .await
        .map_err(|e| {
            state.gpu.release(&workload_id);
            CoreError::internal(e.to_string())
        })?;

    let job = fetch(&state, &id).await?;
    Ok(Json(job))
}

async fn cancel_job(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let job_id = WorkloadId::Training(TrainingJobId::new(&id)).to_string();
    if state.runner.cancel_job(&job_id) {
        Ok(Json(serde_json::json!({ "accepted": true })))
    } else {
        Err(CoreError::conflict(format!("training job {id} is not running")).into())
    }
}

async fn delete_job(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let job = fetch(&state, &id).await?;
    if !job.status.is_terminal() {
        return Err(CoreError::conflict("cannot delete a job that has not reached a terminal state").into());
    }
    training_jobs::delete(&state.pool, &job.id).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Thin structural validation: confirms the config carries the fields a
/// worker needs before a caller commits to actually starting a job.
#[derive(Debug, Serialize)]
struct ValidationResult {
    valid: bool,
    errors: Vec<String>,
}

async fn validate_config(principal: Principal, Json(req): Json<CreateTrainingJobRequest>) -> Json<ValidationResult> {
    let _ = &principal;
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push("name must not be empty".to_string());
    }
    if req.model.trim().is_empty() {
        errors.push("model must not be empty".to_string());
    }
    if req.dataset.trim().is_empty() {
        errors.push("dataset must not be empty".to_string());
    }
    Json(ValidationResult {
        valid: errors.is_empty(),
        errors,
    })
}

async fn gpu_allocation(_: Principal, State(state): State<AppState>) -> Json<serde_json::Value> {
    let allocations = state.gpu.allocation_view().await;
    Json(serde_json::json!({ "allocations": allocations.len() }))
}

#[cfg(test)]
#[path = "training_tests.rs"]
mod tests;
