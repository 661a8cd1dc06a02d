use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::auth::hash_password;
use crate::{build_router, test_support};
use vault_core::user::{Role, User};
use vault_storage::repo::users;

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn login_succeeds_with_correct_password_and_returns_a_usable_token() {
    let state = test_support::state().await;
    let user = User::new_local(
        vault_core::ids::UserId::new("u1"),
        "Ada",
        "ada@example.com",
        Role::Admin,
        hash_password("correct horse"),
        chrono::Utc::now(),
    );
    users::insert_user(&state.pool, &user).await.unwrap();

    let app = build_router(state);
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/vault/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"email": "ada@example.com", "password": "correct horse"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/vault/auth/me")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let state = test_support::state().await;
    let user = User::new_local(
        vault_core::ids::UserId::new("u1"),
        "Ada",
        "ada@example.com",
        Role::User,
        hash_password("correct horse"),
        chrono::Utc::now(),
    );
    users::insert_user(&state.pool, &user).await.unwrap();

    let app = build_router(state);
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/vault/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({"email": "ada@example.com", "password": "wrong"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_requires_a_credential() {
    let state = test_support::state().await;
    let app = build_router(state);
    let resp = app
        .oneshot(Request::builder().uri("/vault/auth/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
