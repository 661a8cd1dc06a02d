// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signature store freshness classification and bundle install. The
//! store is a directory per artifact kind (`av/`, `rules/`, the single
//! `blacklist.json`) under `QuarantineConfig::signatures_root`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::hash_blacklist::HashBlacklist;

const FRESH_THRESHOLD_HOURS: i64 = 24;
const STALE_THRESHOLD_HOURS: i64 = 168;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Fresh,
    Stale,
    Outdated,
    Missing,
}

pub fn classify_age(newest_artifact_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Freshness {
    let Some(at) = newest_artifact_at else {
        return Freshness::Missing;
    };
    let age_hours = (now - at).num_hours();
    if age_hours < FRESH_THRESHOLD_HOURS {
        Freshness::Fresh
    } else if age_hours < STALE_THRESHOLD_HOURS {
        Freshness::Stale
    } else {
        Freshness::Outdated
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SignatureReport {
    pub av: Freshness,
    pub rules: Freshness,
    pub hash_blacklist: Freshness,
}

/// Newest-mtime-in-directory helper; returns `None` for a missing or
/// empty directory.
async fn newest_mtime_in_dir(dir: &Path) -> Option<DateTime<Utc>> {
    let mut entries = tokio::fs::read_dir(dir).await.ok()?;
    let mut newest: Option<DateTime<Utc>> = None;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        let Ok(modified) = metadata.modified() else {
            continue;
        };
        let modified: DateTime<Utc> = modified.into();
        newest = Some(match newest {
            Some(current) if current >= modified => current,
            _ => modified,
        });
    }
    newest
}

async fn mtime_of_file(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = tokio::fs::metadata(path).await.ok()?;
    let modified = metadata.modified().ok()?;
    Some(modified.into())
}

pub async fn signature_report(signatures_root: &Path, now: DateTime<Utc>) -> SignatureReport {
    let av_dir = signatures_root.join("av");
    let rules_dir = signatures_root.join("rules");
    let blacklist_path = signatures_root.join("blacklist.json");

    SignatureReport {
        av: classify_age(newest_mtime_in_dir(&av_dir).await, now),
        rules: classify_age(newest_mtime_in_dir(&rules_dir).await, now),
        hash_blacklist: classify_age(mtime_of_file(&blacklist_path).await, now),
    }
}

#[derive(Debug, Error)]
pub enum BundleInstallError {
    #[error("i/o error reading source bundle directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("blacklist file in bundle does not match the expected shape: {0}")]
    InvalidBlacklistShape(serde_json::Error),
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct BundleInstallReport {
    pub av_files_installed: u32,
    pub rule_files_installed: u32,
    pub blacklist_installed: bool,
}

/// Copies recognized artifact files from a USB-supplied directory into
/// the signature store. `*.yar`/`*.yara` go to `rules/`, everything else
/// in an `av/` subdirectory goes to `av/`, and `blacklist.json` is
/// accepted only if it parses as `{hashes: [...]}`.
pub async fn install_bundle(source_dir: &Path, signatures_root: &Path) -> Result<BundleInstallReport, BundleInstallError> {
    let mut report = BundleInstallReport::default();

    let rules_dest = signatures_root.join("rules");
    let av_dest = signatures_root.join("av");
    tokio::fs::create_dir_all(&rules_dest).await?;
    tokio::fs::create_dir_all(&av_dest).await?;

    let mut entries = tokio::fs::read_dir(source_dir).await?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if matches!(path.extension().and_then(|e| e.to_str()), Some("yar") | Some("yara")) {
            copy_into(&path, &rules_dest.join(name)).await?;
            report.rule_files_installed += 1;
        } else if name == "blacklist.json" {
            let bytes = tokio::fs::read(&path).await?;
            HashBlacklist::validate_shape(&bytes).map_err(BundleInstallError::InvalidBlacklistShape)?;
            tokio::fs::write(signatures_root.join("blacklist.json"), &bytes).await?;
            report.blacklist_installed = true;
        } else if name.starts_with("av") {
            copy_into(&path, &av_dest.join(name)).await?;
            report.av_files_installed += 1;
        }
    }

    Ok(report)
}

async fn copy_into(source: &Path, destination: &PathBuf) -> std::io::Result<()> {
    tokio::fs::copy(source, destination).await.map(|_| ())
}

#[cfg(test)]
#[path = "signatures_tests.rs"]
mod tests;
