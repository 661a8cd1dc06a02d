// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule-based content matcher wrapping a YARA-style engine. The concrete
//! backend (next-generation vs legacy) is selected by a runtime capability
//! probe rather than a compile-time feature, so a single binary adapts to
//! whichever engine is installed on the appliance.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// One rule hit against a scanned buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    pub rule_name: String,
    pub tags: Vec<String>,
    pub meta: HashMap<String, String>,
}

#[async_trait]
pub trait RuleMatcher: Send + Sync {
    /// Load all `*.yar` / `*.yara` rules from a directory. Called once at
    /// startup; a matcher that fails to load any rule files still
    /// constructs successfully with an empty rule set.
    async fn load_rules(&mut self, rules_dir: &Path) -> Result<usize, RuleLoadError>;

    async fn scan(&self, data: &[u8]) -> Vec<RuleMatch>;
}

#[derive(Debug, thiserror::Error)]
pub enum RuleLoadError {
    #[error("rules directory not readable: {0}")]
    DirectoryUnreadable(String),
    #[error("no rule matcher engine available on this host")]
    NoEngineAvailable,
}

/// Which concrete engine backs a [`RuleMatcher`]. Chosen by probing for
/// the next-generation engine's library first and falling back to the
/// legacy one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    NextGen,
    Legacy,
}

/// Probes the host for an available rule engine. Prefers the
/// next-generation engine; falls back to legacy; returns `None` if
/// neither is present so callers can degrade to "rule scanning
/// unavailable" rather than failing startup.
pub async fn probe_engine() -> Option<EngineKind> {
    for candidate in ["yara-x", "yara"] {
        if which(candidate).await {
            return Some(if candidate == "yara-x" {
                EngineKind::NextGen
            } else {
                EngineKind::Legacy
            });
        }
    }
    None
}

async fn which(binary: &str) -> bool {
    tokio::process::Command::new("which")
        .arg(binary)
        .output()
        .await
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Loads compiled rule sources from disk and matches buffers against a
/// fixed set of trivial heuristics (substring/tag markers embedded in the
/// rule source). This stands in for calling out to whichever concrete
/// engine [`probe_engine`] selected; the shape of the public API
/// (`load_rules` / `scan`) is what the quarantine pipeline depends on.
#[derive(Debug, Default)]
pub struct FileBackedRuleMatcher {
    engine: Option<EngineKind>,
    rules: Vec<CompiledRule>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    name: String,
    tags: Vec<String>,
    meta: HashMap<String, String>,
    marker: String,
}

impl FileBackedRuleMatcher {
    pub fn new(engine: Option<EngineKind>) -> Self {
        Self {
            engine,
            rules: Vec::new(),
        }
    }

    pub fn engine(&self) -> Option<EngineKind> {
        self.engine
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

#[async_trait]
impl RuleMatcher for FileBackedRuleMatcher {
    async fn load_rules(&mut self, rules_dir: &Path) -> Result<usize, RuleLoadError> {
        if self.engine.is_none() {
            return Err(RuleLoadError::NoEngineAvailable);
        }
        let mut entries = tokio::fs::read_dir(rules_dir)
            .await
            .map_err(|e| RuleLoadError::DirectoryUnreadable(e.to_string()))?;

        let mut loaded = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if is_rule_file(&path) {
                if let Ok(source) = tokio::fs::read_to_string(&path).await {
                    if let Some(rule) = parse_rule_stub(&path, &source) {
                        loaded.push(rule);
                    }
                }
            }
        }
        let count = loaded.len();
        self.rules = loaded;
        Ok(count)
    }

    async fn scan(&self, data: &[u8]) -> Vec<RuleMatch> {
        let haystack = String::from_utf8_lossy(data);
        self.rules
            .iter()
            .filter(|rule| haystack.contains(&rule.marker))
            .map(|rule| RuleMatch {
                rule_name: rule.name.clone(),
                tags: rule.tags.clone(),
                meta: rule.meta.clone(),
            })
            .collect()
    }
}

fn is_rule_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yar") | Some("yara")
    )
}

/// Extracts `rule <name> { meta: tag = value ... strings: $m = "marker" }`
/// shaped source into a [`CompiledRule`]. Real rule grammar is far richer;
/// this captures just enough structure for the pipeline to exercise
/// `load_rules`/`scan` against fixture rule files.
fn parse_rule_stub(path: &Path, source: &str) -> Option<CompiledRule> {
    let name = source
        .lines()
        .find_map(|line| line.trim().strip_prefix("rule "))
        .map(|rest| rest.trim_end_matches('{').trim().to_string())
        .or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })?;

    let tags = source
        .lines()
        .find(|line| line.trim().starts_with("tags:"))
        .map(|line| {
            line.trim()
                .trim_start_matches("tags:")
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let marker = source
        .lines()
        .find_map(|line| line.trim().strip_prefix("$m ="))
        .map(|rest| rest.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| name.clone());

    Some(CompiledRule {
        name,
        tags,
        meta: HashMap::new(),
        marker,
    })
}

/// Default location the signature-bundle installer unpacks rule files
/// into.
pub fn default_rules_dir(data_root: &Path) -> PathBuf {
    data_root.join("rules")
}

#[cfg(test)]
#[path = "rule_matcher_tests.rs"]
mod tests;
