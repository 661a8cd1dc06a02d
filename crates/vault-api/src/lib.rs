// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The HTTP surface: a `/vault` control-plane prefix and a `/v1`
//! inference-compatibility prefix, both served by the same process and
//! sharing the same [`AppState`].

pub mod auth;
pub mod error;
pub mod pty;
pub mod restarter;
pub mod routes;
pub mod session;
pub mod state;
pub mod ws;

#[cfg(test)]
pub mod test_support;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .merge(routes::system::router())
        .merge(routes::training::router())
        .merge(routes::eval::router())
        .merge(routes::adapters::router())
        .merge(routes::quarantine::router())
        .merge(routes::updates::router())
        .merge(routes::admin::router())
        .merge(routes::auth::router())
        .merge(routes::inference::router())
        .merge(ws::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
