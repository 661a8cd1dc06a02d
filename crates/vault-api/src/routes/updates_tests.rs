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
async fn status_requires_a_credential() {
    let state = test_support::state().await;
    let app = build_router(state);
    let resp = app
        .oneshot(Request::builder().uri("/vault/updates/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn pending_reports_no_staged_bundle_by_default() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "u1", Role::User, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/vault/updates/pending")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["bundle_staged"], false);
}

#[tokio::test]
async fn history_starts_empty() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "u1", Role::User, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/vault/updates/history")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn scan_requires_admin() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "u1", Role::User, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/vault/updates/scan")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"bundle_path": "/tmp/bundle.tar", "signature_path": "/tmp/bundle.sig"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn scan_rejects_a_bundle_that_does_not_exist() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "admin", Role::Admin, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/vault/updates/scan")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"bundle_path": "/tmp/does-not-exist.tar", "signature_path": "/tmp/does-not-exist.sig"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(resp.status().is_client_error() || resp.status().is_server_error());
}

#[tokio::test]
async fn rollback_rejects_an_unknown_job() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "admin", Role::Admin, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/vault/updates/rollback")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"from_job_id": "does-not-exist", "confirmation": "ROLLBACK"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn progress_rejects_an_unknown_job() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "u1", Role::User, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/vault/updates/progress/does-not-exist")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
