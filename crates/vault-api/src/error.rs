// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Projects [`vault_core::error::CoreError`] (and the narrower subsystem
//! errors that convert into it) onto the HTTP error envelope
//! `{error: {code, message, status, details?}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use vault_core::error::{CoreError, CoreErrorKind};

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn code_for(kind: CoreErrorKind) -> &'static str {
    match kind {
        CoreErrorKind::Validation => "validation_error",
        CoreErrorKind::Authentication => "authentication_error",
        CoreErrorKind::Authorization => "authorization_error",
        CoreErrorKind::NotFound => "not_found",
        CoreErrorKind::Conflict => "conflict",
        CoreErrorKind::BackendUnavailable => "backend_unavailable",
        CoreErrorKind::Internal => "internal_error",
    }
}

/// Wraps a `CoreError` for use as an axum handler return type. Handlers
/// return `Result<Json<T>, ApiError>` and convert subsystem errors into
/// this with `?` via `From<SubsystemError> for CoreError`.
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        if matches!(err.kind, CoreErrorKind::Internal) {
            tracing::error!(message = %err.message, "internal error");
        }
        let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: ErrorDetail {
                code: code_for(err.kind),
                message: err.message,
                status: status.as_u16(),
                details: err.details,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
