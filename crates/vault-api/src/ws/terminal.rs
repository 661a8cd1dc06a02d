// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/ws/terminal`: an interactive shell bridged over the subprocess pipe
//! session in [`crate::pty`]. Binary frames carry raw output bytes in both
//! directions; a `{"resize":{"cols":_,"rows":_}}` JSON frame is accepted
//! without interrupting the session (see `PtySession::resize`).

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use serde::Deserialize;
use tokio::io::AsyncReadExt;

use super::{authenticate, TokenQuery};
use crate::pty::PtySession;
use crate::state::AppState;

const SHELL: &str = "/bin/bash";

pub async fn handler(
    State(state): State<AppState>,
    Query(q): Query<TokenQuery>,
    upgrade: WebSocketUpgrade,
) -> Response {
    if let Err(rejection) = authenticate(&state, &q.token).await {
        return rejection;
    }
    upgrade.on_upgrade(move |socket| run(socket, SHELL, &[]))
}

#[derive(Debug, Deserialize)]
struct ResizeFrame {
    resize: WindowSize,
}

#[derive(Debug, Deserialize)]
struct WindowSize {
    cols: u16,
    rows: u16,
}

/// Shared by `/ws/terminal` and `/ws/python`: spawns `program`, then
/// cooperatively selects over (PTY output readable, client message
/// available, child exited) until either side closes.
pub(super) async fn run(mut socket: WebSocket, program: &str, args: &[&str]) {
    let mut pty = match PtySession::spawn(program, args, 80, 24) {
        Ok(pty) => pty,
        Err(e) => {
            let _ = socket.send(Message::Text(format!("failed to start session: {e}"))).await;
            return;
        }
    };

    let mut buf = [0u8; 4096];
    loop {
        tokio::select! {
            read = pty.stdout.read(&mut buf) => {
                match read {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        if socket.send(Message::Binary(buf[..n].to_vec())).await.is_err() {
                            break;
                        }
                    }
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Binary(bytes))) => {
                        if pty.write(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(frame) = serde_json::from_str::<ResizeFrame>(&text) {
                            let _ = pty.resize(frame.resize.cols, frame.resize.rows);
                        } else if pty.write(text.as_bytes()).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => continue,
                    _ => break,
                }
            }
            status = pty.child.wait() => {
                let _ = status;
                break;
            }
        }
    }
    pty.kill();
}

#[cfg(test)]
#[path = "terminal_tests.rs"]
mod tests;
