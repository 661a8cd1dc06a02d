// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-job background driver: runs every file through the stage
//! chain sequentially, tracks the maximum finding severity, and persists
//! terminal status through `vault-storage`'s quarantine repo.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use vault_core::ids::{QuarantineFileId, QuarantineJobId};
use vault_core::quarantine::{Finding, QuarantineFile, QuarantineFileStatus, Severity};
use vault_storage::repo::quarantine as repo;

use crate::config::QuarantineConfig;
use crate::stage::Stage;
use crate::stages::sha256_hex;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("storage error: {0}")]
    Storage(#[from] vault_storage::StorageError),
}

impl From<PipelineError> for vault_core::error::CoreError {
    fn from(err: PipelineError) -> Self {
        vault_core::error::CoreError::internal(err.to_string())
    }
}

/// One staged file submitted as part of a job, already written under
/// `{staging_root}/{job_id}/{file_id}` by the submission handler.
pub struct StagedFile {
    pub id: QuarantineFileId,
    pub original_filename: String,
    pub staged_path: PathBuf,
}

pub struct PipelineDriver {
    pool: SqlitePool,
    stages: Vec<Box<dyn Stage>>,
    config: QuarantineConfig,
}

impl PipelineDriver {
    pub fn new(pool: SqlitePool, stages: Vec<Box<dyn Stage>>, config: QuarantineConfig) -> Self {
        Self { pool, stages, config }
    }

    /// Runs the full pipeline for `job_id` over `files`, updating each
    /// file row and the job's counters as it goes. Intended to be spawned
    /// onto its own task per job submission.
    pub async fn run(&self, job_id: QuarantineJobId, files: Vec<StagedFile>) -> Result<(), PipelineError> {
        let Some(mut job) = repo::get_job(&self.pool, &job_id).await? else {
            return Ok(());
        };
        job.start_scanning();
        repo::update_job(&self.pool, &job).await?;

        for staged in files {
            let flagged = self.run_one_file(&job_id, staged).await?;
            job.record_file_outcome(flagged, Utc::now());
            repo::update_job(&self.pool, &job).await?;
        }

        Ok(())
    }

    async fn run_one_file(&self, job_id: &QuarantineJobId, staged: StagedFile) -> Result<bool, PipelineError> {
        let now = Utc::now();
        let mut file = QuarantineFile::new(
            staged.id.clone(),
            job_id.clone(),
            staged.original_filename.clone(),
            file_size(&staged.staged_path).await,
            staged.staged_path.display().to_string(),
            now,
        );
        repo::insert_file(&self.pool, &file).await?;

        file.transition(QuarantineFileStatus::Scanning, now).ok();
        repo::update_file(&self.pool, &file).await?;

        file.sha256_hash = sha256_hex(&staged.staged_path).await.ok();

        let mut held = false;
        let mut sanitized_path: Option<PathBuf> = None;

        for stage in &self.stages {
            file.current_stage = Some(stage.name().to_string());
            let outcome = stage
                .scan(&staged.staged_path, &staged.original_filename, &self.config)
                .await;

            for finding in outcome.findings {
                file.record_finding(finding);
            }
            if let Some(path) = outcome.sanitized_path {
                sanitized_path = Some(path);
            }
            if !outcome.passed {
                held = true;
                break;
            }
        }

        let terminal_at = Utc::now();
        if let Some(path) = sanitized_path {
            file.paths.sanitized = Some(path.display().to_string());
        }

        if held {
            file.transition(QuarantineFileStatus::Held, terminal_at).ok();
            copy_into_held(&staged.staged_path, &self.config.held_root, &staged.id)
                .await
                .ok();
        } else if self.config.auto_approve_clean {
            file.transition(QuarantineFileStatus::Clean, terminal_at).ok();
        } else {
            file.record_finding(Finding {
                stage: "pipeline".to_string(),
                severity: Severity::None,
                code: "manual_review_required".to_string(),
                message: "auto-approval disabled; manual review required".to_string(),
                details: serde_json::Value::Null,
            });
            file.transition(QuarantineFileStatus::Held, terminal_at).ok();
            held = true;
        }

        repo::update_file(&self.pool, &file).await?;
        Ok(held)
    }
}

async fn file_size(path: &Path) -> u64 {
    tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0)
}

async fn copy_into_held(staged_path: &Path, held_root: &Path, file_id: &QuarantineFileId) -> std::io::Result<()> {
    tokio::fs::create_dir_all(held_root).await?;
    let destination = held_root.join(file_id.as_str());
    tokio::fs::copy(staged_path, destination).await.map(|_| ())
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
