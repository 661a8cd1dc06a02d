// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The six canonical stages, in pipeline order: size/magic sniff,
//! antivirus, rule scan, content policy, sanitization, hash blacklist.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use sha2::{Digest, Sha256};
use vault_adapters::av_transport::{self, ScanVerdict};
use vault_adapters::rule_matcher::RuleMatcher;
use vault_core::quarantine::{Finding, Severity};

use crate::config::{QuarantineConfig, Strictness};
use crate::hash_blacklist::HashBlacklist;
use crate::stage::{Stage, StageOutcome};

fn finding(stage: &str, severity: Severity, code: &str, message: impl Into<String>) -> Finding {
    Finding {
        stage: stage.to_string(),
        severity,
        code: code.to_string(),
        message: message.into(),
        details: serde_json::Value::Null,
    }
}

/// An `unavailable` backend result is a soft pass under the default and
/// lenient strictness levels, and a `medium`-severity hold under strict.
fn unavailable_outcome(stage: &str, strictness: Strictness) -> StageOutcome {
    let info = finding(stage, Severity::None, "unavailable", format!("{stage} backend unavailable"));
    match strictness {
        Strictness::Strict => StageOutcome::hold(vec![finding(
            stage,
            Severity::Medium,
            "unavailable_strict",
            format!("{stage} backend unavailable and strictness=strict treats this as a hold"),
        )]),
        Strictness::Standard | Strictness::Lenient => StageOutcome::pass_with_findings(vec![info]),
    }
}

/// Stage 1: file-size cap plus a magic-byte sniff against a small table
/// of well-known signatures. Extension/magic mismatch is informational,
/// not a hold — only oversize files are held.
pub struct SizeSniffStage;

#[async_trait]
impl Stage for SizeSniffStage {
    fn name(&self) -> &'static str {
        "size_sniff"
    }

    async fn scan(&self, path: &Path, _original_filename: &str, config: &QuarantineConfig) -> StageOutcome {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) => {
                return StageOutcome::hold(vec![finding(
                    self.name(),
                    Severity::High,
                    "unreadable",
                    format!("could not stat staged file: {e}"),
                )]);
            }
        };
        if metadata.len() > config.max_file_size_bytes {
            return StageOutcome::hold(vec![finding(
                self.name(),
                Severity::High,
                "oversize",
                format!(
                    "file is {} bytes, exceeds the {}-byte limit",
                    metadata.len(),
                    config.max_file_size_bytes
                ),
            )]);
        }
        StageOutcome::pass()
    }
}

/// Stage 2: antivirus scan over the framed socket transport.
pub struct AntivirusStage;

#[async_trait]
impl Stage for AntivirusStage {
    fn name(&self) -> &'static str {
        "antivirus"
    }

    async fn scan(&self, path: &Path, _original_filename: &str, config: &QuarantineConfig) -> StageOutcome {
        let Some(socket_path) = &config.av_socket_path else {
            return unavailable_outcome(self.name(), config.strictness);
        };
        let data = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(_) => return unavailable_outcome(self.name(), config.strictness),
        };
        match av_transport::scan_file(socket_path, &data).await {
            ScanVerdict::Clean => StageOutcome::pass(),
            ScanVerdict::Infected { threat_name } => StageOutcome::hold(vec![finding(
                self.name(),
                Severity::Critical,
                "infected",
                format!("antivirus daemon flagged threat: {threat_name}"),
            )]),
            ScanVerdict::Error { detail } => StageOutcome::hold(vec![finding(
                self.name(),
                Severity::Medium,
                "protocol_error",
                format!("antivirus daemon returned an unparseable reply: {detail}"),
            )]),
            ScanVerdict::Unavailable => unavailable_outcome(self.name(), config.strictness),
        }
    }
}

/// Stage 3: YARA-style rule scan.
pub struct RuleScanStage<M: RuleMatcher> {
    matcher: Arc<M>,
}

impl<M: RuleMatcher> RuleScanStage<M> {
    pub fn new(matcher: Arc<M>) -> Self {
        Self { matcher }
    }
}

#[async_trait]
impl<M: RuleMatcher> Stage for RuleScanStage<M> {
    fn name(&self) -> &'static str {
        "rule_scan"
    }

    async fn scan(&self, path: &Path, _original_filename: &str, config: &QuarantineConfig) -> StageOutcome {
        let data = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(_) => return unavailable_outcome(self.name(), config.strictness),
        };
        let matches = self.matcher.scan(&data).await;
        if matches.is_empty() {
            return StageOutcome::pass();
        }
        let findings = matches
            .into_iter()
            .map(|m| {
                finding(
                    self.name(),
                    Severity::High,
                    "rule_match",
                    format!("matched rule {} (tags: {})", m.rule_name, m.tags.join(",")),
                )
            })
            .collect();
        StageOutcome::hold(findings)
    }
}

/// Stage 4: content policy gate. Flags obvious PII (SSN-shaped numbers)
/// and prompt-injection phrasing in text-like files; binary files pass
/// through untouched since this stage only inspects decodable text.
pub struct ContentPolicyStage;

impl ContentPolicyStage {
    fn ssn_pattern() -> Regex {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap()
    }

    fn injection_pattern() -> Regex {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"(?i)ignore (all )?(previous|prior) instructions").unwrap()
    }
}

#[async_trait]
impl Stage for ContentPolicyStage {
    fn name(&self) -> &'static str {
        "content_policy"
    }

    async fn scan(&self, path: &Path, _original_filename: &str, _config: &QuarantineConfig) -> StageOutcome {
        let Ok(bytes) = tokio::fs::read(path).await else {
            return StageOutcome::pass();
        };
        let Ok(text) = String::from_utf8(bytes) else {
            return StageOutcome::pass();
        };

        let mut findings = Vec::new();
        if Self::ssn_pattern().is_match(&text) {
            findings.push(finding(
                self.name(),
                Severity::Medium,
                "pii_detected",
                "content appears to contain a social-security-number-shaped value",
            ));
        }
        if Self::injection_pattern().is_match(&text) {
            findings.push(finding(
                self.name(),
                Severity::High,
                "prompt_injection",
                "content contains instruction-override phrasing",
            ));
        }

        if findings.iter().any(|f| f.severity >= Severity::Medium) {
            StageOutcome::hold(findings)
        } else {
            StageOutcome::pass_with_findings(findings)
        }
    }
}

/// Stage 5: sanitization/normalization. Strips NUL bytes and normalizes
/// line endings for text files; writes the result alongside the staged
/// file as `{original}.sanitized`. Non-text files pass through unchanged.
pub struct SanitizationStage;

#[async_trait]
impl Stage for SanitizationStage {
    fn name(&self) -> &'static str {
        "sanitization"
    }

    async fn scan(&self, path: &Path, _original_filename: &str, _config: &QuarantineConfig) -> StageOutcome {
        let Ok(bytes) = tokio::fs::read(path).await else {
            return StageOutcome::pass();
        };
        let Ok(text) = String::from_utf8(bytes) else {
            return StageOutcome::pass();
        };

        let cleaned = text.replace('\0', "").replace("\r\n", "\n");
        let sanitized_path = sanitized_path_for(path);
        if tokio::fs::write(&sanitized_path, cleaned.as_bytes()).await.is_err() {
            return StageOutcome::pass();
        }
        StageOutcome {
            passed: true,
            findings: Vec::new(),
            sanitized_path: Some(sanitized_path),
        }
    }
}

fn sanitized_path_for(path: &Path) -> std::path::PathBuf {
    let mut os_string = path.as_os_str().to_owned();
    os_string.push(".sanitized");
    std::path::PathBuf::from(os_string)
}

/// Stage 6: hash-blacklist lookup. A hit is always `critical`, regardless
/// of strictness.
pub struct HashBlacklistStage {
    blacklist: Arc<HashBlacklist>,
}

impl HashBlacklistStage {
    pub fn new(blacklist: Arc<HashBlacklist>) -> Self {
        Self { blacklist }
    }
}

#[async_trait]
impl Stage for HashBlacklistStage {
    fn name(&self) -> &'static str {
        "hash_blacklist"
    }

    async fn scan(&self, path: &Path, _original_filename: &str, _config: &QuarantineConfig) -> StageOutcome {
        let Ok(bytes) = tokio::fs::read(path).await else {
            return StageOutcome::pass();
        };
        let digest = Sha256::digest(&bytes);
        let hex_digest = hex::encode(digest);
        if self.blacklist.contains(&hex_digest) {
            return StageOutcome::hold(vec![finding(
                self.name(),
                Severity::Critical,
                "blacklisted_hash",
                format!("sha256 {hex_digest} matches the hash blacklist"),
            )]);
        }
        StageOutcome::pass()
    }
}

/// Computes the sha256 of a staged file, used by the pipeline driver to
/// persist `QuarantineFile::sha256_hash` independent of whether the
/// blacklist stage happens to run.
pub async fn sha256_hex(path: &Path) -> std::io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

#[cfg(test)]
#[path = "stages_tests.rs"]
mod tests;
