use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::{build_router, session, test_support};
use vault_core::user::Role;

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn list_jobs_requires_a_credential() {
    let state = test_support::state().await;
    let app = build_router(state);
    let resp = app
        .oneshot(Request::builder().uri("/vault/training/jobs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_job_requires_admin() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "u1", Role::User, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/vault/training/jobs")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "run1", "model": "llama", "dataset": "ds1",
                        "adapter_type": "lora", "config": {}
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn pause_on_a_job_that_is_not_running_is_a_conflict() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "admin", Role::Admin, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/vault/training/jobs/does-not-exist/pause")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn get_job_that_does_not_exist_is_not_found() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "u1", Role::User, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/vault/training/jobs/does-not-exist")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn validate_flags_missing_fields() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "u1", Role::User, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/vault/training/validate")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "name": "", "model": "", "dataset": "ds1",
                        "adapter_type": "lora", "config": {}
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn gpu_allocation_view_is_available_to_any_authenticated_principal() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "u1", Role::User, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/vault/training/gpu-allocation")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
