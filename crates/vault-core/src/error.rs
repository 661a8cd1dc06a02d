// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared error taxonomy every subsystem's narrower error enums map
//! into. `vault-api` projects a [`CoreErrorKind`] into the HTTP envelope;
//! subsystem crates implement `From<SubsystemError> for CoreError` so a
//! handler can propagate with `?` regardless of which crate raised it.

use thiserror::Error;

/// Coarse classification used for HTTP status projection and logging.
/// Does not carry a message; see [`CoreError`] for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    BackendUnavailable,
    Internal,
}

/// A classified error with a human-readable message and optional
/// actionable detail (surfaced verbatim for `BackendUnavailable`).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CoreError {
    pub kind: CoreErrorKind,
    pub message: String,
    pub details: Option<String>,
}

impl CoreError {
    pub fn new(kind: CoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Validation, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Authentication, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Authorization, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Conflict, message)
    }

    pub fn backend_unavailable(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::BackendUnavailable, message).with_details(suggestion)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Internal, message)
    }

    /// The HTTP status code this kind projects to.
    pub fn status_code(&self) -> u16 {
        match self.kind {
            CoreErrorKind::Validation => 422,
            CoreErrorKind::Authentication => 401,
            CoreErrorKind::Authorization => 403,
            CoreErrorKind::NotFound => 404,
            CoreErrorKind::Conflict => 409,
            CoreErrorKind::BackendUnavailable => 503,
            CoreErrorKind::Internal => 500,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
