// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Training and evaluation job records and their status-machine transitions.
//!
//! Both job kinds are "queued then run to a terminal state"; terminal
//! states are absorbing. `TrainingJob` additionally supports `paused`,
//! since only training workers checkpoint on the portable pause signal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::ids::{AdapterId, EvalJobId, TrainingJobId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingJobStatus {
    Queued,
    Running,
    Paused,
    Completed,
    Cancelled,
    Failed,
}

impl TrainingJobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition per spec.md 3's table.
    pub fn can_transition_to(self, next: Self) -> bool {
        use TrainingJobStatus::*;
        matches!(
            (self, next),
            (Queued, Running)
                | (Running, Paused)
                | (Running, Completed)
                | (Running, Cancelled)
                | (Running, Failed)
                | (Paused, Running)
                | (Paused, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterType {
    Full,
    Lora,
    Qlora,
}

#[derive(Debug, Error)]
#[error("illegal transition from {from:?} to {to:?}")]
pub struct IllegalTransition<S: std::fmt::Debug> {
    pub from: S,
    pub to: S,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingJob {
    pub id: TrainingJobId,
    pub name: String,
    pub status: TrainingJobStatus,
    pub progress: f64,
    pub model: String,
    pub dataset: String,
    pub config_blob: Value,
    pub metrics_blob: Value,
    pub resource_blob: Value,
    pub error: Option<String>,
    pub adapter_type: AdapterType,
    pub adapter_config_blob: Option<Value>,
    pub adapter_id: Option<AdapterId>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Truncation length applied to worker error text before it is persisted.
pub const MAX_ERROR_LEN: usize = 2000;

impl TrainingJob {
    pub fn new(
        id: TrainingJobId,
        name: impl Into<String>,
        model: impl Into<String>,
        dataset: impl Into<String>,
        adapter_type: AdapterType,
        config_blob: Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        TrainingJob {
            id,
            name: name.into(),
            status: TrainingJobStatus::Queued,
            progress: 0.0,
            model: model.into(),
            dataset: dataset.into(),
            config_blob,
            metrics_blob: Value::Null,
            resource_blob: Value::Null,
            error: None,
            adapter_type,
            adapter_config_blob: None,
            adapter_id: None,
            created_at,
            started_at: None,
            completed_at: None,
        }
    }

    /// Applies a status transition, enforcing the legal-edge table and the
    /// absorbing-terminal-state rule. Progress is clamped into `[0, 100]`
    /// whenever this is called with a running-adjacent status.
    pub fn transition(
        &mut self,
        next: TrainingJobStatus,
        now: DateTime<Utc>,
    ) -> Result<(), IllegalTransition<TrainingJobStatus>> {
        if !self.status.can_transition_to(next) {
            return Err(IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        if next == TrainingJobStatus::Running && self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if next.is_terminal() {
            self.completed_at = Some(now);
        }
        self.status = next;
        Ok(())
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = progress.clamp(0.0, 100.0);
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        let mut msg = message.into();
        if msg.len() > MAX_ERROR_LEN {
            msg.truncate(MAX_ERROR_LEN);
        }
        self.error = Some(msg);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalJobStatus {
    Queued,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl EvalJobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        use EvalJobStatus::*;
        matches!(
            (self, next),
            (Queued, Running) | (Running, Completed) | (Running, Cancelled) | (Running, Failed)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetType {
    Builtin,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalJob {
    pub id: EvalJobId,
    pub name: String,
    pub status: EvalJobStatus,
    pub progress: f64,
    pub model_id: String,
    pub adapter_id: Option<AdapterId>,
    pub dataset_id: String,
    pub dataset_type: DatasetType,
    pub config_blob: Value,
    pub results_blob: Option<Value>,
    pub total_examples: u64,
    pub examples_completed: u64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl EvalJob {
    pub fn new(
        id: EvalJobId,
        name: impl Into<String>,
        model_id: impl Into<String>,
        dataset_id: impl Into<String>,
        dataset_type: DatasetType,
        config_blob: Value,
        total_examples: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        EvalJob {
            id,
            name: name.into(),
            status: EvalJobStatus::Queued,
            progress: 0.0,
            model_id: model_id.into(),
            adapter_id: None,
            dataset_id: dataset_id.into(),
            dataset_type,
            config_blob,
            results_blob: None,
            total_examples,
            examples_completed: 0,
            created_at,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn transition(
        &mut self,
        next: EvalJobStatus,
        now: DateTime<Utc>,
    ) -> Result<(), IllegalTransition<EvalJobStatus>> {
        if !self.status.can_transition_to(next) {
            return Err(IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        if next == EvalJobStatus::Running && self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if next.is_terminal() {
            self.completed_at = Some(now);
        }
        self.status = next;
        Ok(())
    }

    pub fn record_progress(&mut self, examples_completed: u64) {
        self.examples_completed = examples_completed.min(self.total_examples);
        self.progress = if self.total_examples == 0 {
            100.0
        } else {
            (self.examples_completed as f64 / self.total_examples as f64) * 100.0
        };
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
