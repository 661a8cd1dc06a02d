// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fine-tuned adapters produced by training jobs and activated against the
//! inference engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{AdapterId, TrainingJobId};
use crate::job::AdapterType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterStatus {
    Ready,
    Active,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adapter {
    pub id: AdapterId,
    pub name: String,
    pub base_model: String,
    pub adapter_type: AdapterType,
    pub status: AdapterStatus,
    pub path: String,
    pub training_job_id: Option<TrainingJobId>,
    pub config_blob: Value,
    pub metrics_blob: Value,
    pub size_bytes: u64,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
}

impl Adapter {
    pub fn new(
        id: AdapterId,
        name: impl Into<String>,
        base_model: impl Into<String>,
        adapter_type: AdapterType,
        path: impl Into<String>,
        size_bytes: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Adapter {
            id,
            name: name.into(),
            base_model: base_model.into(),
            adapter_type,
            status: AdapterStatus::Ready,
            path: path.into(),
            training_job_id: None,
            config_blob: Value::Null,
            metrics_blob: Value::Null,
            size_bytes,
            version: 1,
            created_at,
            activated_at: None,
        }
    }

    pub fn activate(&mut self, now: DateTime<Utc>) {
        self.status = AdapterStatus::Active;
        self.activated_at = Some(now);
    }

    pub fn deactivate(&mut self) {
        self.status = AdapterStatus::Ready;
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, AdapterStatus::Active)
    }
}

/// Enforces "at most one adapter active with a given `name` at any time"
/// across a set of candidate adapters sharing that name. Callers pass the
/// adapters currently registered under the same `name` (typically the
/// result of a storage lookup) before activating `candidate_id`.
pub fn at_most_one_active_by_name<'a>(
    siblings: impl IntoIterator<Item = &'a Adapter>,
    candidate_id: &AdapterId,
) -> Result<(), AdapterId> {
    for sibling in siblings {
        if sibling.is_active() && &sibling.id != candidate_id {
            return Err(sibling.id.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
