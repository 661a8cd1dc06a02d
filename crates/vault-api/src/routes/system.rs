// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! System facets: health, Prometheus exposition, GPU allocation view,
//! service status/restart, synthesized logs, and uptime/availability.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use vault_core::error::CoreError;
use vault_ops::service_manager::{LogFilter, LogSeverity, ServiceManager};
use vault_storage::repo::uptime_events;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vault/health", get(health))
        .route("/metrics", get(metrics))
        .route("/vault/system/gpu", get(gpu_allocation))
        .route("/vault/system/services", get(list_services))
        .route("/vault/system/services/:name/restart", post(restart_service))
        .route("/vault/system/logs", get(logs))
        .route("/vault/system/uptime", get(uptime_summary))
        .route("/vault/system/uptime/events", get(uptime_events_route))
        .route("/vault/system/uptime/availability", get(availability))
        .route("/vault/system/inference", get(inference_health))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Prometheus exposition. The handful of gauges here are the ones this
/// control plane itself owns; engine-specific metrics are scraped
/// directly from the inference backend by the operator's Prometheus.
async fn metrics(State(state): State<AppState>) -> String {
    let allocations = state.gpu.allocation_view().await;
    let mut body = String::new();
    body.push_str("# HELP vault_gpu_memory_used_pct GPU memory utilization percentage\n");
    body.push_str("# TYPE vault_gpu_memory_used_pct gauge\n");
    for alloc in allocations {
        body.push_str(&format!(
            "vault_gpu_memory_used_pct{{gpu=\"{}\"}} {}\n",
            alloc.gpu_index, alloc.memory_used_pct
        ));
    }
    body
}

async fn gpu_allocation(_: Principal, State(state): State<AppState>) -> Json<serde_json::Value> {
    let allocations = state.gpu.allocation_view().await;
    Json(serde_json::json!({ "allocations": allocations.iter().map(|a| serde_json::json!({
        "gpu_index": a.gpu_index,
        "assigned_to": match a.assigned_to {
            vault_scheduler::gpu::AssignedTo::Inference => "inference",
            vault_scheduler::gpu::AssignedTo::Training => "training",
        },
        "job_id": a.job_id.as_ref().map(|j| j.to_string()),
        "memory_used_pct": a.memory_used_pct,
    })).collect::<Vec<_>>() }))
}

async fn list_services(_: Principal, State(state): State<AppState>) -> Json<serde_json::Value> {
    let statuses = state.service_manager.list().await;
    Json(serde_json::json!({ "services": statuses }))
}

async fn restart_service(
    principal: Principal,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let outcome = state.service_manager.restart(&name).await.map_err(CoreError::from)?;
    Ok(Json(serde_json::json!({ "outcome": outcome })))
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub service: Option<String>,
    pub severity: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

async fn logs(
    principal: Principal,
    State(state): State<AppState>,
    Query(q): Query<LogsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    principal.require_admin()?;
    let severity = q.severity.as_deref().and_then(parse_severity);
    let filter = LogFilter {
        service: q.service,
        severity,
        since: None,
        limit: q.limit,
        offset: q.offset.unwrap_or(0),
    };
    let records = state.service_manager.logs(filter).await;
    Ok(Json(serde_json::json!({ "logs": records })))
}

fn parse_severity(s: &str) -> Option<LogSeverity> {
    match s {
        "critical" => Some(LogSeverity::Critical),
        "error" => Some(LogSeverity::Error),
        "warning" => Some(LogSeverity::Warning),
        "info" => Some(LogSeverity::Info),
        "debug" => Some(LogSeverity::Debug),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct UptimeSummary {
    services: Vec<String>,
}

async fn uptime_summary() -> Json<UptimeSummary> {
    Json(UptimeSummary {
        services: vault_ops::service_manager::ALLOWLIST.iter().map(|s| s.to_string()).collect(),
    })
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub service: String,
    pub window_hours: Option<f64>,
}

async fn uptime_events_route(
    State(state): State<AppState>,
    Query(q): Query<EventsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let since = Utc::now() - chrono::Duration::hours(q.window_hours.unwrap_or(24.0) as i64);
    let events = uptime_events::for_service(&state.pool, &q.service, since)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;
    Ok(Json(serde_json::json!({ "events": events })))
}

async fn availability(
    State(state): State<AppState>,
    Query(q): Query<EventsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let window_hours = q.window_hours.unwrap_or(24.0);
    let since = Utc::now() - chrono::Duration::hours(window_hours as i64);
    let events = uptime_events::for_service(&state.pool, &q.service, since)
        .await
        .map_err(|e| CoreError::internal(e.to_string()))?;
    let pct = vault_core::uptime::availability_pct(&events, window_hours, Utc::now());
    Ok(Json(serde_json::json!({ "service": q.service, "window_hours": window_hours, "availability_pct": pct })))
}

async fn inference_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let url = format!("{}/health", state.inference_base_url);
    let healthy = state
        .http_client
        .get(&url)
        .send()
        .await
        .map(|r| r.status().is_success())
        .unwrap_or(false);
    Json(serde_json::json!({ "healthy": healthy }))
}

#[cfg(test)]
#[path = "system_tests.rs"]
mod tests;
