// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The [`StatusSink`](crate::runner::StatusSink) implementation that
//! projects worker progress onto the `training_jobs`/`eval_jobs` tables.
//!
//! `JobRunner` is job-kind agnostic; it only knows a `job_id: &str`. This
//! sink recovers the kind from that string, which callers are expected to
//! format with [`vault_core::ids::WorkloadId`]'s `Display` impl
//! (`"training:<id>"` / `"eval:<id>"`), and routes to the matching repo.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use vault_adapters::gpu_probe::NvidiaSmiProbe;
use vault_core::adapter::Adapter;
use vault_core::ids::{AdapterId, EvalJobId, TrainingJobId, WorkloadId};
use vault_core::job::{EvalJobStatus, TrainingJobStatus};
use vault_storage::repo::{adapters, eval_jobs, training_jobs};

use crate::gpu::GpuScheduler;
use crate::runner::StatusSink;
use crate::status_file::WorkerStatus;

enum Workload {
    Training(TrainingJobId),
    Eval(EvalJobId),
}

fn parse(job_id: &str) -> Option<Workload> {
    if let Some(rest) = job_id.strip_prefix("training:") {
        return Some(Workload::Training(TrainingJobId::new(rest)));
    }
    if let Some(rest) = job_id.strip_prefix("eval:") {
        return Some(Workload::Eval(EvalJobId::new(rest)));
    }
    None
}

pub struct WorkloadStatusSink {
    pool: SqlitePool,
    gpu: Arc<GpuScheduler<NvidiaSmiProbe>>,
}

impl WorkloadStatusSink {
    pub fn new(pool: SqlitePool, gpu: Arc<GpuScheduler<NvidiaSmiProbe>>) -> Self {
        Self { pool, gpu }
    }

    async fn transition_training(&self, id: &TrainingJobId, next: TrainingJobStatus, now: DateTime<Utc>) {
        let Ok(Some(mut job)) = training_jobs::get(&self.pool, id).await else {
            return;
        };
        if job.transition(next, now).is_ok() {
            let _ = training_jobs::update(&self.pool, &job).await;
        }
    }

    async fn transition_eval(&self, id: &EvalJobId, next: EvalJobStatus, now: DateTime<Utc>) {
        let Ok(Some(mut job)) = eval_jobs::get(&self.pool, id).await else {
            return;
        };
        if job.transition(next, now).is_ok() {
            let _ = eval_jobs::update(&self.pool, &job).await;
        }
    }
}

#[async_trait]
impl StatusSink for WorkloadStatusSink {
    async fn mark_running(&self, job_id: &str, started_at: DateTime<Utc>, gpu_index: Option<u32>) {
        match parse(job_id) {
            Some(Workload::Training(id)) => {
                if let Ok(Some(mut job)) = training_jobs::get(&self.pool, &id).await {
                    if job.transition(TrainingJobStatus::Running, started_at).is_ok() {
                        job.resource_blob = serde_json::json!({ "gpu_index": gpu_index });
                        let _ = training_jobs::update(&self.pool, &job).await;
                    }
                }
            }
            Some(Workload::Eval(id)) => {
                self.transition_eval(&id, EvalJobStatus::Running, started_at).await;
            }
            None => {}
        }
    }

    async fn apply_progress(&self, job_id: &str, status: &WorkerStatus) {
        match parse(job_id) {
            Some(Workload::Training(id)) => {
                if let Ok(Some(mut job)) = training_jobs::get(&self.pool, &id).await {
                    job.set_progress(status.progress_pct());
                    job.metrics_blob = serde_json::json!({
                        "loss": status.loss,
                        "lr": status.lr,
                        "loss_history": status.recent_loss_history(),
                        "tokens_processed": status.tokens_processed,
                    });
                    let _ = training_jobs::update(&self.pool, &job).await;
                }
            }
            Some(Workload::Eval(id)) => {
                if let Ok(Some(mut job)) = eval_jobs::get(&self.pool, &id).await {
                    job.record_progress(status.step.unwrap_or(job.examples_completed));
                    let _ = eval_jobs::update(&self.pool, &job).await;
                }
            }
            None => {}
        }
    }

    async fn mark_completed(&self, job_id: &str, status: &WorkerStatus) {
        let now = Utc::now();
        match parse(job_id) {
            Some(Workload::Training(id)) => {
                self.gpu.release(&WorkloadId::Training(id.clone()));
                if let Ok(Some(mut job)) = training_jobs::get(&self.pool, &id).await {
                    job.set_progress(100.0);
                    if job.transition(TrainingJobStatus::Completed, now).is_ok() {
                        let _ = training_jobs::update(&self.pool, &job).await;
                    }
                }
            }
            Some(Workload::Eval(id)) => {
                self.gpu.release(&WorkloadId::Eval(id.clone()));
                if let Ok(Some(mut job)) = eval_jobs::get(&self.pool, &id).await {
                    job.results_blob = status.results.clone();
                    job.record_progress(job.total_examples);
                    if job.transition(EvalJobStatus::Completed, now).is_ok() {
                        let _ = eval_jobs::update(&self.pool, &job).await;
                    }
                }
            }
            None => {}
        }
    }

    async fn mark_paused(&self, job_id: &str) {
        if let Some(Workload::Training(id)) = parse(job_id) {
            self.gpu.release(&WorkloadId::Training(id.clone()));
            self.transition_training(&id, TrainingJobStatus::Paused, Utc::now()).await;
        }
    }

    async fn mark_cancelled(&self, job_id: &str) {
        let now = Utc::now();
        match parse(job_id) {
            Some(Workload::Training(id)) => {
                self.gpu.release(&WorkloadId::Training(id.clone()));
                self.transition_training(&id, TrainingJobStatus::Cancelled, now).await;
            }
            Some(Workload::Eval(id)) => {
                self.gpu.release(&WorkloadId::Eval(id.clone()));
                self.transition_eval(&id, EvalJobStatus::Cancelled, now).await;
            }
            None => {}
        }
    }

    async fn mark_failed(&self, job_id: &str, error: String) {
        let now = Utc::now();
        match parse(job_id) {
            Some(Workload::Training(id)) => {
                self.gpu.release(&WorkloadId::Training(id.clone()));
                if let Ok(Some(mut job)) = training_jobs::get(&self.pool, &id).await {
                    job.set_error(error);
                    if job.transition(TrainingJobStatus::Failed, now).is_ok() {
                        let _ = training_jobs::update(&self.pool, &job).await;
                    }
                }
            }
            Some(Workload::Eval(id)) => {
                self.gpu.release(&WorkloadId::Eval(id.clone()));
                self.transition_eval(&id, EvalJobStatus::Failed, now).await;
            }
            None => {}
        }
    }

    async fn register_adapter(&self, job_id: &str, worker_adapter_id: &str, output_dir: &PathBuf) {
        let Some(Workload::Training(id)) = parse(job_id) else {
            return;
        };
        let Ok(Some(mut job)) = training_jobs::get(&self.pool, &id).await else {
            return;
        };
        let adapter = Adapter::new(
            AdapterId::new(worker_adapter_id),
            &job.name,
            &job.model,
            job.adapter_type,
            output_dir.to_string_lossy().to_string(),
            0,
            Utc::now(),
        );
        if adapters::insert(&self.pool, &adapter).await.is_ok() {
            job.adapter_id = Some(adapter.id);
            let _ = training_jobs::update(&self.pool, &job).await;
        }
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
