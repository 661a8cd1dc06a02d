// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker → supervisor status-file shape (spec §6). Workers write
//! this atomically; the supervisor polls and projects it into the job
//! row.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkerStatus {
    pub state: Option<String>,
    pub step: Option<u64>,
    pub total_steps: Option<u64>,
    pub epoch: Option<u64>,
    pub total_epochs: Option<u64>,
    pub loss: Option<f64>,
    pub lr: Option<f64>,
    #[serde(default)]
    pub tokens_processed: u64,
    pub eta_seconds: Option<u64>,
    #[serde(default)]
    pub loss_history: Vec<f64>,
    pub error: Option<String>,
    pub adapter_id: Option<String>,
    pub results: Option<Value>,
}

impl WorkerStatus {
    /// `step / total_steps * 100`, or `0.0` when either is absent or
    /// `total_steps` is zero.
    pub fn progress_pct(&self) -> f64 {
        match (self.step, self.total_steps) {
            (Some(step), Some(total)) if total > 0 => {
                (step as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
            }
            _ => 0.0,
        }
    }

    /// Caps the loss history kept in memory/DB at the last 100 samples,
    /// matching spec's "last-100 loss history" projection.
    pub fn recent_loss_history(&self) -> &[f64] {
        let len = self.loss_history.len();
        let start = len.saturating_sub(100);
        &self.loss_history[start..]
    }
}

#[cfg(test)]
#[path = "status_file_tests.rs"]
mod tests;
