// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The relational store: a single SQLite file managed through embedded
//! migrations, plus the atomic-JSON-file helper every subsystem that
//! bridges to a worker process over the filesystem reuses.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod atomic_file;
pub mod pool;
pub mod repo;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("row decode error: {0}")]
    Decode(String),
}

impl From<StorageError> for vault_core::error::CoreError {
    fn from(err: StorageError) -> Self {
        vault_core::error::CoreError::internal(err.to_string())
    }
}
