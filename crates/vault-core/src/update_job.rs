// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Update job record: tracks a single bundle apply/rollback run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UpdateJobId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateJobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    RolledBack,
}

/// One step in the fixed apply order: migrations, code, configuration,
/// containers, signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStepName {
    Migrations,
    Code,
    Configuration,
    Containers,
    Signatures,
}

impl UpdateStepName {
    /// Fixed apply order, per the component-replacement contract.
    pub const ORDER: [UpdateStepName; 5] = [
        UpdateStepName::Migrations,
        UpdateStepName::Code,
        UpdateStepName::Configuration,
        UpdateStepName::Containers,
        UpdateStepName::Signatures,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStepStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStep {
    pub name: UpdateStepName,
    pub status: UpdateStepStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateJob {
    pub id: UpdateJobId,
    pub status: UpdateJobStatus,
    pub bundle_version: String,
    pub from_version: String,
    pub bundle_path: Option<String>,
    pub progress_pct: f64,
    pub current_step: Option<UpdateStepName>,
    pub steps: Vec<UpdateStep>,
    pub log: Vec<String>,
    pub changelog: String,
    pub components: Vec<(String, bool)>,
    pub backup_path: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl UpdateJob {
    pub fn new(
        id: UpdateJobId,
        bundle_version: impl Into<String>,
        from_version: impl Into<String>,
        changelog: impl Into<String>,
        components: Vec<(String, bool)>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let steps = UpdateStepName::ORDER
            .iter()
            .filter(|name| {
                let key = step_component_key(**name);
                components
                    .iter()
                    .any(|(comp, enabled)| comp == key && *enabled)
            })
            .map(|name| UpdateStep {
                name: *name,
                status: UpdateStepStatus::Pending,
            })
            .collect();
        UpdateJob {
            id,
            status: UpdateJobStatus::Pending,
            bundle_version: bundle_version.into(),
            from_version: from_version.into(),
            bundle_path: None,
            progress_pct: 0.0,
            current_step: None,
            steps,
            log: Vec::new(),
            changelog: changelog.into(),
            components,
            backup_path: None,
            error: None,
            created_at,
            completed_at: None,
        }
    }

    /// Advances to the next pending step, recomputing `progress_pct` from
    /// completed-step count. Progress is monotonic: a step is never
    /// revisited once marked `completed` or `failed`.
    pub fn begin_step(&mut self, name: UpdateStepName) {
        if let Some(step) = self.steps.iter_mut().find(|s| s.name == name) {
            step.status = UpdateStepStatus::Running;
        }
        self.current_step = Some(name);
        self.status = UpdateJobStatus::Running;
    }

    pub fn complete_step(&mut self, name: UpdateStepName, log_line: impl Into<String>) {
        if let Some(step) = self.steps.iter_mut().find(|s| s.name == name) {
            step.status = UpdateStepStatus::Completed;
        }
        self.log.push(log_line.into());
        let done = self
            .steps
            .iter()
            .filter(|s| s.status == UpdateStepStatus::Completed)
            .count();
        self.progress_pct = if self.steps.is_empty() {
            100.0
        } else {
            (done as f64 / self.steps.len() as f64) * 100.0
        };
    }

    pub fn fail(&mut self, name: UpdateStepName, message: impl Into<String>, now: DateTime<Utc>) {
        if let Some(step) = self.steps.iter_mut().find(|s| s.name == name) {
            step.status = UpdateStepStatus::Failed;
        }
        self.status = UpdateJobStatus::Failed;
        self.error = Some(message.into());
        self.completed_at = Some(now);
    }

    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = UpdateJobStatus::Completed;
        self.progress_pct = 100.0;
        self.completed_at = Some(now);
    }

    pub fn mark_rolled_back(&mut self, now: DateTime<Utc>) {
        self.status = UpdateJobStatus::RolledBack;
        self.completed_at = Some(now);
    }
}

fn step_component_key(name: UpdateStepName) -> &'static str {
    match name {
        UpdateStepName::Migrations => "database",
        UpdateStepName::Code => "code",
        UpdateStepName::Configuration => "configuration",
        UpdateStepName::Containers => "containers",
        UpdateStepName::Signatures => "signatures",
    }
}

/// Literal confirmation strings the update/rollback endpoints require.
pub const APPLY_CONFIRMATION: &str = "APPLY UPDATE";
pub const ROLLBACK_CONFIRMATION: &str = "ROLLBACK UPDATE";

#[cfg(test)]
#[path = "update_job_tests.rs"]
mod tests;
