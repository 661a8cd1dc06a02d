// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Byte-for-byte passthrough to the inference backend's OpenAI-compatible
//! surface. The wire format is not ours to define: request bodies are
//! forwarded unparsed, and streaming responses are relayed chunk-for-chunk
//! so `data: ...\n\n` framing (including the terminal `data: [DONE]`)
//! reaches the client exactly as the backend emitted it.

use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use futures_util::StreamExt;
use vault_core::error::CoreError;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::state::AppState;

/// Overall request timeout, generous enough to cover a full non-streaming
/// generation; the connect timeout is configured once on `AppState`'s
/// shared `reqwest::Client` at daemon startup.
const READ_TIMEOUT: Duration = Duration::from_secs(120);

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/v1/completions", post(completions))
        .route("/v1/embeddings", post(embeddings))
        .route("/v1/models", get(list_models))
        .route("/v1/models/:id", get(get_model))
}

/// Forwards the request body as a stream rather than buffering it, so a
/// large payload never sits fully in memory on its way to the backend.
async fn proxy_post(state: &AppState, path: &str, body: Body) -> Result<Response, ApiError> {
    let url = format!("{}{path}", state.inference_base_url);

    let response = state
        .http_client
        .post(&url)
        .timeout(READ_TIMEOUT)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(reqwest::Body::wrap_stream(body.into_data_stream()))
        .send()
        .await
        .map_err(|e| CoreError::backend_unavailable(e.to_string(), "check the inference engine process"))?;

    relay(response)
}

async fn proxy_get(state: &AppState, path: &str) -> Result<Response, ApiError> {
    let url = format!("{}{path}", state.inference_base_url);
    let response = state
        .http_client
        .get(&url)
        .timeout(READ_TIMEOUT)
        .send()
        .await
        .map_err(|e| CoreError::backend_unavailable(e.to_string(), "check the inference engine process"))?;
    relay(response)
}

/// Forwards status, content-type, and the body stream as-is. Streaming
/// responses (`text/event-stream`) pass through chunk-by-chunk rather than
/// buffering, so the first `data:` line reaches the client before the
/// backend has finished generating.
fn relay(response: reqwest::Response) -> Result<Response, ApiError> {
    let status = StatusCode::from_u16(response.status().as_u16())
        .map_err(|e| CoreError::internal(e.to_string()))?;
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| HeaderValue::from_str(v).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    let stream = response.bytes_stream().map(|chunk| {
        chunk.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    });
    let body = Body::from_stream(stream);

    let mut builder = Response::builder().status(status);
    builder.headers_mut().unwrap().insert(axum::http::header::CONTENT_TYPE, content_type);
    builder
        .body(body)
        .map(IntoResponse::into_response)
        .map_err(|e| CoreError::internal(e.to_string()).into())
}

async fn chat_completions(_: Principal, State(state): State<AppState>, body: Body) -> Result<Response, ApiError> {
    proxy_post(&state, "/v1/chat/completions", body).await
}

async fn completions(_: Principal, State(state): State<AppState>, body: Body) -> Result<Response, ApiError> {
    proxy_post(&state, "/v1/completions", body).await
}

async fn embeddings(_: Principal, State(state): State<AppState>, body: Body) -> Result<Response, ApiError> {
    proxy_post(&state, "/v1/embeddings", body).await
}

async fn list_models(_: Principal, State(state): State<AppState>) -> Result<Response, ApiError> {
    proxy_get(&state, "/v1/models").await
}

async fn get_model(_: Principal, State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    proxy_get(&state, &format!("/v1/models/{id}")).await
}

#[cfg(test)]
#[path = "inference_tests.rs"]
mod tests;
