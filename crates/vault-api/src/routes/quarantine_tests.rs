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
async fn submit_scan_requires_admin() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "u1", Role::User, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/vault/quarantine/scan")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"paths": ["/mnt/usb/model.bin"], "source_type": "usb_path"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn submit_scan_rejects_an_empty_path_list() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "admin", Role::Admin, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/vault/quarantine/scan")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"paths": [], "source_type": "usb_path"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
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
                .uri("/vault/quarantine/scan/does-not-exist")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn held_list_starts_empty() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "u1", Role::User, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/vault/quarantine/held")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["files"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn get_config_requires_admin() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "u1", Role::User, chrono::Utc::now());

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/vault/admin/config/quarantine")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn put_config_updates_batch_count() {
    let state = test_support::state().await;
    let secret = state.session_secret.clone();
    let app = build_router(state);
    let token = session::issue(&secret, "admin", Role::Admin, chrono::Utc::now());

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/vault/admin/config/quarantine")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::json!({"max_batch_count": 7}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/vault/admin/config/quarantine")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["max_batch_count"], 7);
}
