// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evaluation job lifecycle, plus the thin comparison/quick-eval/dataset
//! listing surfaces that sit alongside it.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vault_core::error::CoreError;
use vault_core::id::IdGen;
use vault_core::ids::{EvalJobId, WorkloadId};
use vault_core::job::{DatasetType, EvalJob};
use vault_scheduler::runner::RunConfig;
use vault_storage::repo::eval_jobs;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vault/eval/jobs", get(list_jobs).post(create_job))
        .route("/vault/eval/jobs/:id", get(get_job).delete(delete_job))
        .route("/vault/eval/jobs/:id/cancel", post(cancel_job))
        .route("/vault/eval/compare", get(compare))
        .route("/vault/eval/quick", post(quick_eval))
        .route("/vault/eval/datasets", get(datasets))
}

async fn list_jobs(_: Principal, State(state): State<AppState>) -> Result<Json<Vec<EvalJob>>, ApiError> {
    let jobs = eval_jobs::list(&state.pool).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(jobs))
}

async fn get_job(
    _: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EvalJob>, ApiError> {
    Ok(Json(fetch(&state, &id).await?))
}

async fn fetch(state: &AppState, id: &str) -> Result<EvalJob, ApiError> {
    eval_jobs::get(&state.pool, &EvalJobId::new(id))
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?
        .ok_or_else(|| CoreError::not_found(format!("eval job {id} not found")).into())
}

#[derive(Debug, Deserialize)]
pub struct CreateEvalJobRequest {
    pub name: String,
    pub model_id: String,
    pub adapter_id: Option<String>,
    pub dataset_id: String,
    pub dataset_type: DatasetType,
    pub config: Value,
    pub total_examples: u64,
}

async fn create_job(
    principal: Principal,
    State(state): State<AppState>,
    Json(req): Json<CreateEvalJobRequest>,
) -> Result<Json<EvalJob>, ApiError> {
    principal.require_admin()?;

    let job_id = EvalJobId::new(state.id_gen.next());
    let workload_id = WorkloadId::Eval(job_id.clone());

    let gpu_index = state
        .gpu
        .acquire(workload_id.clone())
        .await
        .map_err(|decision| CoreError::conflict(decision.reason.unwrap_or_else(|| "admission denied".to_string())))?;

    let mut job = EvalJob::new(
        job_id.clone(),
        &req.name,
        &req.model_id,
        &req.dataset_id,
        req.dataset_type,
        req.config.clone(),
        req.total_examples,
        Utc::now(),
    );
    job.adapter_id = req.adapter_id.map(vault_core::ids::AdapterId::new);
    eval_jobs::insert(&state.pool, &job).await.map_err(|e| CoreError::internal(e.to_string()))?;

    let status_dir = PathBuf::from("/var/lib/vault/eval").join(job_id.as_str());
    let run_config = RunConfig {
        job_id: workload_id.to_string(),
        status_dir,
        interpreter: PathBuf::from("/usr/bin/python3"),
        script_args: vec!["-m".to_string(), "vault_worker.eval".to_string()],
        env: Vec::new(),
        is_training: false,
    };

    if let Err(e) = Arc::clone(&state.runner)
        .start_job(run_config, &req.config, Some(gpu_index))
        .await
    {
        state.gpu.release(&workload_id);
        let _ = eval_jobs::delete(&state.pool, &job.id).await;
        return Err(CoreError::internal(e.to_string()).into());
    }

    Ok(Json(job))
}

async fn cancel_job(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let job_id = WorkloadId::Eval(EvalJobId::new(&id)).to_string();
    if state.runner.cancel_job(&job_id) {
        Ok(Json(serde_json::json!({ "accepted": true })))
    } else {
        Err(CoreError::conflict(format!("eval job {id} is not running")).into())
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
    eval_jobs::delete(&state.pool, &job.id).await.map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub job_ids: String,
}

#[derive(Debug, Serialize)]
struct ComparisonRow {
    job_id: String,
    name: String,
    results: Option<Value>,
}

/// Side-by-side results for a comma-separated list of already-completed
/// eval jobs. Jobs that are missing or still running are simply omitted.
async fn compare(
    _: Principal,
    State(state): State<AppState>,
    Query(q): Query<CompareQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut rows = Vec::new();
    for raw_id in q.job_ids.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if let Ok(Some(job)) = eval_jobs::get(&state.pool, &EvalJobId::new(raw_id)).await {
            rows.push(ComparisonRow {
                job_id: job.id.to_string(),
                name: job.name,
                results: job.results_blob,
            });
        }
    }
    Ok(Json(serde_json::json!({ "jobs": rows })))
}

#[derive(Debug, Deserialize)]
pub struct QuickEvalRequest {
    pub model_id: String,
    pub prompt: String,
}

/// Single-prompt smoke check that bypasses the job queue entirely,
/// passed straight through to the inference backend.
async fn quick_eval(
    _: Principal,
    State(state): State<AppState>,
    Json(req): Json<QuickEvalRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let url = format!("{}/v1/completions", state.inference_base_url);
    let response = state
        .http_client
        .post(&url)
        .json(&serde_json::json!({ "model": req.model_id, "prompt": req.prompt, "max_tokens": 64 }))
        .send()
        .await
        .map_err(|e| CoreError::backend_unavailable(e.to_string(), "check the inference engine process"))?;
    let body: Value = response
        .json()
        .await
        .map_err(|e| CoreError::backend_unavailable(e.to_string(), "inference engine returned a malformed response"))?;
    Ok(Json(body))
}

/// Built-in evaluation dataset catalog. Custom datasets are uploaded
/// out of band and referenced by id at job-creation time.
async fn datasets() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "datasets": [
            { "id": "mmlu", "type": "builtin" },
            { "id": "truthful_qa", "type": "builtin" },
            { "id": "gsm8k", "type": "builtin" },
        ]
    }))
}

#[cfg(test)]
#[path = "eval_tests.rs"]
mod tests;
