// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only audit log entries. Nothing in this module mutates an entry
//! once constructed; the storage layer enforces the append-only discipline
//! by never exposing an update path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::AuditLogEntryId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: AuditLogEntryId,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub method: Option<String>,
    pub path: Option<String>,
    pub user_key_prefix: Option<String>,
    pub model: Option<String>,
    pub status_code: Option<u16>,
    pub latency_ms: Option<u64>,
    pub tokens_input: Option<u64>,
    pub tokens_output: Option<u64>,
    pub details: Option<Value>,
}

impl AuditLogEntry {
    pub fn new(id: AuditLogEntryId, action: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        AuditLogEntry {
            id,
            timestamp,
            action: action.into(),
            method: None,
            path: None,
            user_key_prefix: None,
            model: None,
            status_code: None,
            latency_ms: None,
            tokens_input: None,
            tokens_output: None,
            details: None,
        }
    }

    pub fn with_request(mut self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self.path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
