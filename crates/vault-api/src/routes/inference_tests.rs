use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use crate::{build_router, session, test_support};
use vault_core::user::Role;

#[tokio::test]
async fn chat_completions_requires_a_credential() {
    let state = test_support::state().await;
    let app = build_router(state);
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/chat/completions")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::json!({"model": "llama"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

/// `AppState::inference_base_url` points nowhere reachable in tests, so
/// every passthrough route degrades to a backend-unavailable response
/// instead of a live relay — this is what that degradation looks like.
#[tokio::test]
async fn chat_completions_surfaces_backend_unavailable_when_the_engine_is_unreachable() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "u1", Role::User, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/chat/completions")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::json!({"model": "llama", "messages": []}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn list_models_surfaces_backend_unavailable_when_the_engine_is_unreachable() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "u1", Role::User, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/v1/models")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
