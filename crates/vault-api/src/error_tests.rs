use super::*;
use axum::response::IntoResponse;

#[tokio::test]
async fn conflict_kind_projects_to_409() {
    let err = ApiError(CoreError::conflict("adapter already active"));
    let response = err.into_response();
    assert_eq!(response.status(), axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn backend_unavailable_projects_to_503_with_details() {
    let err = ApiError(CoreError::backend_unavailable("inference backend unreachable", "check the engine process"));
    let response = err.into_response();
    assert_eq!(response.status(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
}
