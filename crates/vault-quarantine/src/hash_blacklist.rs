// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hash blacklist: `{hashes: [hex, ...]}`, lowercased on load, O(1)
//! membership via a `HashSet`.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize)]
struct BlacklistFile {
    hashes: Vec<String>,
}

#[derive(Debug, Error)]
pub enum BlacklistLoadError {
    #[error("failed to read blacklist file: {0}")]
    Io(#[from] std::io::Error),
    #[error("blacklist file is not the expected {{hashes: [...]}} shape: {0}")]
    Shape(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default)]
pub struct HashBlacklist {
    hashes: HashSet<String>,
}

impl HashBlacklist {
    pub fn empty() -> Self {
        Self::default()
    }

    pub async fn load(path: &Path) -> Result<Self, BlacklistLoadError> {
        let bytes = tokio::fs::read(path).await?;
        let parsed: BlacklistFile = serde_json::from_slice(&bytes)?;
        Ok(Self {
            hashes: parsed
                .hashes
                .into_iter()
                .map(|h| h.to_lowercase())
                .collect(),
        })
    }

    /// Validates a candidate file's bytes parse as the expected shape
    /// without installing it, used by the signature-bundle installer to
    /// decide whether to accept a USB-supplied blacklist file.
    pub fn validate_shape(bytes: &[u8]) -> Result<(), serde_json::Error> {
        serde_json::from_slice::<BlacklistFile>(bytes).map(|_| ())
    }

    pub fn contains(&self, sha256_hex: &str) -> bool {
        self.hashes.contains(&sha256_hex.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

#[cfg(test)]
#[path = "hash_blacklist_tests.rs"]
mod tests;
