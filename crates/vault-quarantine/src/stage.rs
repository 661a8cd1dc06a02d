// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The stage DAG contract. Each stage inspects a file on disk and returns
//! a verdict; a `passed=false` verdict halts the pipeline for that file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use vault_core::quarantine::Finding;

use crate::config::QuarantineConfig;

#[derive(Debug, Clone, Default)]
pub struct StageOutcome {
    pub passed: bool,
    pub findings: Vec<Finding>,
    pub sanitized_path: Option<PathBuf>,
}

impl StageOutcome {
    pub fn pass() -> Self {
        StageOutcome {
            passed: true,
            findings: Vec::new(),
            sanitized_path: None,
        }
    }

    pub fn pass_with_findings(findings: Vec<Finding>) -> Self {
        StageOutcome {
            passed: true,
            findings,
            sanitized_path: None,
        }
    }

    pub fn hold(findings: Vec<Finding>) -> Self {
        StageOutcome {
            passed: false,
            findings,
            sanitized_path: None,
        }
    }
}

#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn scan(
        &self,
        path: &Path,
        original_filename: &str,
        config: &QuarantineConfig,
    ) -> StageOutcome;
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
