// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive GPU admission controller.
//!
//! Mirrors the daemon's mutex-protected shared-state pattern: one
//! `Mutex<GpuState>` is the single critical section for admission,
//! assignment and release, so at most one training-or-eval job ever
//! holds a GPU.

use std::sync::Arc;

use parking_lot::Mutex;
use vault_adapters::gpu_probe::GpuProbe;
use vault_core::admission::AdmissionDecision;
use vault_core::ids::{TrainingJobId, WorkloadId};

/// `training.*` knobs read from `SystemConfig`.
#[derive(Debug, Clone)]
pub struct GpuSchedulerConfig {
    pub training_enabled: bool,
    pub gpu_index: u32,
    pub max_memory_pct: f64,
}

impl Default for GpuSchedulerConfig {
    fn default() -> Self {
        Self {
            training_enabled: true,
            gpu_index: 0,
            max_memory_pct: 90.0,
        }
    }
}

#[derive(Debug, Default)]
struct GpuState {
    active_job_id: Option<WorkloadId>,
    active_gpu_index: Option<u32>,
}

/// One entry in [`GpuScheduler::allocation_view`].
#[derive(Debug, Clone, PartialEq)]
pub struct GpuAllocation {
    pub gpu_index: u32,
    pub assigned_to: AssignedTo,
    pub job_id: Option<WorkloadId>,
    pub memory_used_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignedTo {
    Inference,
    Training,
}

pub struct GpuScheduler<P: GpuProbe> {
    state: Mutex<GpuState>,
    probe: P,
    config: Arc<Mutex<GpuSchedulerConfig>>,
}

impl<P: GpuProbe> GpuScheduler<P> {
    pub fn new(probe: P, config: GpuSchedulerConfig) -> Self {
        Self {
            state: Mutex::new(GpuState::default()),
            probe,
            config: Arc::new(Mutex::new(config)),
        }
    }

    pub fn set_config(&self, config: GpuSchedulerConfig) {
        *self.config.lock() = config;
    }

    /// Checks admission without reserving anything.
    pub async fn can_start(&self) -> AdmissionDecision {
        let config = self.config.lock().clone();
        if !config.training_enabled {
            return AdmissionDecision::deny("training is disabled");
        }
        if self.state.lock().active_job_id.is_some() {
            return AdmissionDecision::deny("a training or evaluation job is already active");
        }

        let gpus = self.probe.detect().await;
        if gpus.is_empty() {
            // Developer machine: no GPU to gate on, admit unconditionally.
            return AdmissionDecision::allow();
        }

        let Some(gpu) = gpus.iter().find(|g| g.index == config.gpu_index) else {
            return AdmissionDecision::deny(format!(
                "configured gpu index {} not detected",
                config.gpu_index
            ));
        };
        if gpu.memory_used_pct > config.max_memory_pct {
            return AdmissionDecision::deny(format!(
                "gpu {} memory utilization {:.1}% exceeds limit {:.1}%",
                gpu.index, gpu.memory_used_pct, config.max_memory_pct
            ));
        }
        AdmissionDecision::allow()
    }

    /// Re-checks admission under the lock and, on success, reserves the
    /// configured GPU for `job_id`.
    pub async fn acquire(&self, job_id: WorkloadId) -> Result<u32, AdmissionDecision> {
        let decision = self.can_start().await;
        if !decision.allowed {
            return Err(decision);
        }
        let mut state = self.state.lock();
        if state.active_job_id.is_some() {
            return Err(AdmissionDecision::deny(
                "a training or evaluation job is already active",
            ));
        }
        let gpu_index = self.config.lock().gpu_index;
        state.active_job_id = Some(job_id);
        state.active_gpu_index = Some(gpu_index);
        Ok(gpu_index)
    }

    /// No-op if `job_id` does not hold the GPU.
    pub fn release(&self, job_id: &WorkloadId) {
        let mut state = self.state.lock();
        if state.active_job_id.as_ref() == Some(job_id) {
            state.active_job_id = None;
            state.active_gpu_index = None;
        }
    }

    pub async fn allocation_view(&self) -> Vec<GpuAllocation> {
        let gpus = self.probe.detect().await;
        let state = self.state.lock();
        if gpus.is_empty() {
            return vec![GpuAllocation {
                gpu_index: 0,
                assigned_to: AssignedTo::Inference,
                job_id: None,
                memory_used_pct: 0.0,
            }];
        }
        gpus.into_iter()
            .map(|gpu| {
                let assigned_to_this = state.active_gpu_index == Some(gpu.index);
                GpuAllocation {
                    gpu_index: gpu.index,
                    assigned_to: if assigned_to_this {
                        AssignedTo::Training
                    } else {
                        AssignedTo::Inference
                    },
                    job_id: if assigned_to_this {
                        state.active_job_id.clone()
                    } else {
                        None
                    },
                    memory_used_pct: gpu.memory_used_pct,
                }
            })
            .collect()
    }
}

/// Convenience alias used by call sites that only need to name a job by
/// its training identifier.
pub fn workload(job_id: TrainingJobId) -> WorkloadId {
    WorkloadId::Training(job_id)
}

#[cfg(test)]
#[path = "gpu_tests.rs"]
mod tests;
