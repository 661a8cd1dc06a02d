use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use crate::{build_router, test_support};

#[tokio::test]
async fn missing_token_query_param_is_rejected_before_upgrade() {
    let state = test_support::state().await;
    let app = build_router(state);
    let resp = app
        .oneshot(Request::builder().uri("/ws/python").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_token_is_rejected_before_the_handshake_completes() {
    let state = test_support::state().await;
    let app = build_router(state);
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/ws/python?token=not-a-real-token")
                .header("connection", "Upgrade")
                .header("upgrade", "websocket")
                .header("sec-websocket-version", "13")
                .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
