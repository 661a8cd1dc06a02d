// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/ws/python`: an interactive Python REPL, bridged the same way
//! `/ws/terminal` bridges a shell.

use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;

use super::terminal;
use super::{authenticate, TokenQuery};
use crate::state::AppState;

const PYTHON: &str = "python3";

pub async fn handler(
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
    upgrade: WebSocketUpgrade,
) -> Response {
    if let Err(rejection) = authenticate(&state, &q.token).await {
        return rejection;
    }
    upgrade.on_upgrade(move |socket| terminal::run(socket, PYTHON, &["-i", "-q"]))
}

#[cfg(test)]
#[path = "python_tests.rs"]
mod tests;
