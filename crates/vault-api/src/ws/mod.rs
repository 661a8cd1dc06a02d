// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The four WebSocket endpoints. Every handler authenticates the
//! query-string `token` against the same principal universe bearer auth
//! uses, before the upgrade is accepted — browsers cannot set a custom
//! `Authorization` header on a WS handshake.

mod logs;
mod python;
mod system;
mod terminal;

use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::auth::{verify_ws_token, Principal};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws/system", get(system::handler))
        .route("/ws/logs", get(logs::handler))
        .route("/ws/terminal", get(terminal::handler))
        .route("/ws/python", get(python::handler))
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

pub(crate) async fn authenticate(state: &AppState, token: &str) -> Result<Principal, Response> {
    verify_ws_token(state, token)
        .await
        .map_err(|status| Response::builder().status(status).body(axum::body::Body::empty()).unwrap())
}
