// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quarantine data model: the submission (`QuarantineJob`) and its files
//! (`QuarantineFile`). The stage DAG and pipeline driver that mutate these
//! records live in `vault-quarantine`; this module only owns the record
//! shapes and their lifecycle rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{QuarantineFileId, QuarantineJobId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineJobStatus {
    Pending,
    Scanning,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Upload,
    UsbPath,
    ModelImport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarantineJob {
    pub id: QuarantineJobId,
    pub status: QuarantineJobStatus,
    pub total_files: u32,
    pub files_completed: u32,
    pub files_flagged: u32,
    pub files_clean: u32,
    pub source_type: SourceType,
    pub submitted_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl QuarantineJob {
    pub fn new(
        id: QuarantineJobId,
        total_files: u32,
        source_type: SourceType,
        submitted_by: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        QuarantineJob {
            id,
            status: QuarantineJobStatus::Pending,
            total_files,
            files_completed: 0,
            files_flagged: 0,
            files_clean: 0,
            source_type,
            submitted_by,
            created_at,
            completed_at: None,
        }
    }

    pub fn start_scanning(&mut self) {
        self.status = QuarantineJobStatus::Scanning;
    }

    /// Records one file's final disposition and, once every file has been
    /// accounted for, marks the job `completed`.
    pub fn record_file_outcome(&mut self, flagged: bool, now: DateTime<Utc>) {
        self.files_completed += 1;
        if flagged {
            self.files_flagged += 1;
        } else {
            self.files_clean += 1;
        }
        if self.files_completed >= self.total_files {
            self.status = QuarantineJobStatus::Completed;
            self.completed_at = Some(now);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub stage: String,
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineFileStatus {
    Pending,
    Scanning,
    Clean,
    Held,
    Approved,
    Rejected,
}

impl QuarantineFileStatus {
    pub fn can_transition_to(self, next: Self) -> bool {
        use QuarantineFileStatus::*;
        matches!(
            (self, next),
            (Pending, Scanning) | (Scanning, Clean) | (Scanning, Held) | (Held, Approved) | (Held, Rejected)
        )
    }
}

#[derive(Debug, Error)]
#[error("illegal quarantine file transition from {from:?} to {to:?}")]
pub struct IllegalFileTransition {
    pub from: QuarantineFileStatus,
    pub to: QuarantineFileStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarantineFilePaths {
    pub quarantine: String,
    pub sanitized: Option<String>,
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarantineFile {
    pub id: QuarantineFileId,
    pub job_id: QuarantineJobId,
    pub original_filename: String,
    pub file_size: u64,
    pub mime_type: Option<String>,
    pub sha256_hash: Option<String>,
    pub status: QuarantineFileStatus,
    pub current_stage: Option<String>,
    pub risk_severity: Severity,
    pub findings: Vec<Finding>,
    pub paths: QuarantineFilePaths,
    pub review_reason: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuarantineFile {
    pub fn new(
        id: QuarantineFileId,
        job_id: QuarantineJobId,
        original_filename: impl Into<String>,
        file_size: u64,
        quarantine_path: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        QuarantineFile {
            id,
            job_id,
            original_filename: original_filename.into(),
            file_size,
            mime_type: None,
            sha256_hash: None,
            status: QuarantineFileStatus::Pending,
            current_stage: None,
            risk_severity: Severity::None,
            findings: Vec::new(),
            paths: QuarantineFilePaths {
                quarantine: quarantine_path.into(),
                sanitized: None,
                destination: None,
            },
            review_reason: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    pub fn transition(
        &mut self,
        next: QuarantineFileStatus,
        now: DateTime<Utc>,
    ) -> Result<(), IllegalFileTransition> {
        if !self.status.can_transition_to(next) {
            return Err(IllegalFileTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    pub fn record_finding(&mut self, finding: Finding) {
        if finding.severity > self.risk_severity {
            self.risk_severity = finding.severity;
        }
        self.findings.push(finding);
    }

    /// Human review of a `held` file. `reason` must be non-empty per the
    /// review-workflow contract; this is the sole guard, callers enforce
    /// length elsewhere (e.g. request validation) if a stronger bound is
    /// wanted.
    pub fn review(
        &mut self,
        approve: bool,
        reason: impl Into<String>,
        reviewer: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), IllegalFileTransition> {
        let reason = reason.into();
        let next = if approve {
            QuarantineFileStatus::Approved
        } else {
            QuarantineFileStatus::Rejected
        };
        self.transition(next, now)?;
        self.review_reason = Some(reason);
        self.reviewed_by = Some(reviewer.into());
        self.reviewed_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
#[path = "quarantine_tests.rs"]
mod tests;
