// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/ws/system`: a gauge snapshot pushed every 2 s until the client
//! disconnects.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use vault_ops::service_manager::ServiceManager;

use super::{authenticate, TokenQuery};
use crate::state::AppState;

const PUSH_INTERVAL: Duration = Duration::from_secs(2);

pub async fn handler(
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
    upgrade: WebSocketUpgrade,
) -> Response {
    if let Err(rejection) = authenticate(&state, &q.token).await {
        return rejection;
    }
    upgrade.on_upgrade(move |socket| run(socket, state))
}

async fn run(mut socket: WebSocket, state: AppState) {
    let mut ticker = tokio::time::interval(PUSH_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = snapshot(&state).await;
                if socket.send(Message::Text(snapshot.to_string())).await.is_err() {
                    return;
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

async fn snapshot(state: &AppState) -> serde_json::Value {
    let allocations = state.gpu.allocation_view().await;
    let gpu: Vec<_> = allocations
        .iter()
        .map(|a| {
            serde_json::json!({
                "gpu_index": a.gpu_index,
                "assigned_to": match a.assigned_to {
                    vault_scheduler::gpu::AssignedTo::Inference => "inference",
                    vault_scheduler::gpu::AssignedTo::Training => "training",
                },
                "job_id": a.job_id.as_ref().map(|j| j.to_string()),
                "memory_used_pct": a.memory_used_pct,
            })
        })
        .collect();
    let services = state.service_manager.list().await;
    serde_json::json!({ "gpu": gpu, "services": services })
}
