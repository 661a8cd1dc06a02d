// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Submission-time limits and stage behavior knobs, read from
//! `SystemConfig`'s `quarantine.*` namespace on every submission. A hot
//! reload never interrupts a job already in flight — the driver snapshots
//! its config once at submission time.

use std::path::PathBuf;

/// Whether an `unavailable` AV/rule result is a soft pass or itself a
/// hold-worthy finding. Resolves the strictness open question named in
/// spec.md §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    Lenient,
    #[default]
    Standard,
    Strict,
}

impl Strictness {
    pub fn from_config_str(s: &str) -> Self {
        match s {
            "lenient" => Strictness::Lenient,
            "strict" => Strictness::Strict,
            _ => Strictness::Standard,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuarantineConfig {
    pub max_file_size_bytes: u64,
    pub max_batch_count: u32,
    pub auto_approve_clean: bool,
    pub strictness: Strictness,
    pub staging_root: PathBuf,
    pub held_root: PathBuf,
    pub signatures_root: PathBuf,
    pub av_socket_path: Option<PathBuf>,
}

impl Default for QuarantineConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 5 * 1024 * 1024 * 1024,
            max_batch_count: 500,
            auto_approve_clean: true,
            strictness: Strictness::Standard,
            staging_root: PathBuf::from("quarantine/staging"),
            held_root: PathBuf::from("quarantine/held"),
            signatures_root: PathBuf::from("quarantine/signatures"),
            av_socket_path: None,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
