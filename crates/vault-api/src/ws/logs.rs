// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/ws/logs`: streamed service log entries. Requires the admin scope in
//! addition to a valid token — ordinary users cannot tail other services'
//! logs. `ServiceManager::logs` is a one-shot query, so this polls it on
//! a short interval and forwards only records newer than the last push,
//! the same poll-and-diff shape the job supervisor uses for progress.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use vault_ops::service_manager::{LogFilter, LogSeverity, ServiceManager};

use super::authenticate;
use crate::state::AppState;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
pub struct LogsWsQuery {
    pub token: String,
    pub service: Option<String>,
    pub severity: Option<String>,
}

pub async fn handler(
    State(state): State<AppState>,
    Query(q): Query<LogsWsQuery>,
    upgrade: WebSocketUpgrade,
) -> Response {
    let principal = match authenticate(&state, &q.token).await {
        Ok(p) => p,
        Err(rejection) => return rejection,
    };
    if !principal.is_admin() {
        return StatusCode::FORBIDDEN.into_response();
    }
    upgrade.on_upgrade(move |socket| run(socket, state, q.service, q.severity.as_deref().and_then(parse_severity)))
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

async fn run(mut socket: WebSocket, state: AppState, service: Option<String>, severity: Option<LogSeverity>) {
    let mut since: Option<DateTime<Utc>> = None;
    let mut ticker = tokio::time::interval(POLL_INTERVAL);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let filter = LogFilter {
                    service: service.clone(),
                    severity,
                    since,
                    limit: None,
                    offset: 0,
                };
                let records = state.service_manager.logs(filter).await;
                for record in &records {
                    if since.map_or(true, |s| record.timestamp > s) {
                        if socket.send(Message::Text(serde_json::to_string(record).unwrap_or_default())).await.is_err() {
                            return;
                        }
                    }
                }
                if let Some(latest) = records.iter().map(|r| r.timestamp).max() {
                    since = Some(latest);
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(_)) => continue,
                    _ => return,
                }
            }
        }
    }
}
