// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Settings`: the one place startup configuration is assembled. Layered
//! environment variables over fixed defaults rooted at a single state
//! directory, mirroring the teacher daemon's `OJ_STATE_DIR` convention.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use rand::RngCore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("VAULT_HTTP_BIND is not a valid socket address: {0}")]
    BadBindAddr(#[source] std::net::AddrParseError),
    #[error("VAULT_SESSION_SECRET must be at least 32 bytes, got {0}")]
    SessionSecretTooShort(usize),
    #[error("could not read or persist the generated session secret at {path}: {source}")]
    SessionSecretPersist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Startup configuration, populated once from the environment. Values
/// that change behavior per-request (LDAP mappings, quarantine limits)
/// are deliberately not here — those are re-read from `SystemConfig` on
/// every relevant operation instead of cached at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub state_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub http_bind: SocketAddr,
    pub inference_base_url: String,
    pub session_secret: Vec<u8>,
    pub rules_dir: PathBuf,
    pub hash_blacklist_path: PathBuf,
    pub engine_config_path: PathBuf,
    pub update_staging_root: PathBuf,
    pub update_backup_root: PathBuf,
    pub update_install_root: PathBuf,
    pub update_public_key_path: PathBuf,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = env_path("VAULT_STATE_DIR").unwrap_or_else(|| PathBuf::from("/var/lib/vault"));

        let http_bind = env_string("VAULT_HTTP_BIND")
            .unwrap_or_else(|| "0.0.0.0:8443".to_string())
            .parse()
            .map_err(ConfigError::BadBindAddr)?;

        let session_secret = match env_string("VAULT_SESSION_SECRET") {
            Some(s) => s.into_bytes(),
            None => load_or_generate_session_secret(&state_dir)?,
        };
        if session_secret.len() < 32 {
            return Err(ConfigError::SessionSecretTooShort(session_secret.len()));
        }

        Ok(Settings {
            db_path: env_path("VAULT_DB_PATH").unwrap_or_else(|| state_dir.join("vault.db")),
            log_path: env_path("VAULT_LOG_PATH").unwrap_or_else(|| state_dir.join("log/vaultd.log")),
            inference_base_url: env_string("VAULT_INFERENCE_BASE_URL")
                .unwrap_or_else(|| "http://127.0.0.1:8000".to_string()),
            session_secret,
            rules_dir: env_path("VAULT_RULES_DIR").unwrap_or_else(|| state_dir.join("rules")),
            hash_blacklist_path: env_path("VAULT_HASH_BLACKLIST_PATH")
                .unwrap_or_else(|| state_dir.join("signatures/hash_blacklist.json")),
            engine_config_path: env_path("VAULT_ENGINE_CONFIG_PATH")
                .unwrap_or_else(|| state_dir.join("engine.yaml")),
            update_staging_root: env_path("VAULT_UPDATE_STAGING_ROOT").unwrap_or_else(|| state_dir.join("updates/staging")),
            update_backup_root: env_path("VAULT_UPDATE_BACKUP_ROOT").unwrap_or_else(|| state_dir.join("updates/backup")),
            update_install_root: env_path("VAULT_UPDATE_INSTALL_ROOT").unwrap_or_else(|| PathBuf::from("/opt/vault")),
            update_public_key_path: env_path("VAULT_UPDATE_PUBLIC_KEY_PATH")
                .unwrap_or_else(|| state_dir.join("update_signing_key.pub")),
            http_bind,
            state_dir,
        })
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_string(key).map(PathBuf::from)
}

/// Reads the session-signing secret persisted under `state_dir` from a
/// previous run, or generates a fresh one and persists it. Keeping this
/// stable across restarts means a daemon restart doesn't invalidate every
/// issued session token.
fn load_or_generate_session_secret(state_dir: &Path) -> Result<Vec<u8>, ConfigError> {
    let path = state_dir.join("session_secret");

    if let Ok(existing) = std::fs::read(&path) {
        if existing.len() >= 32 {
            return Ok(existing);
        }
    }

    let mut secret = vec![0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::SessionSecretPersist {
            path: path.display().to_string(),
            source,
        })?;
    }
    std::fs::write(&path, &secret).map_err(|source| ConfigError::SessionSecretPersist {
        path: path.display().to_string(),
        source,
    })?;

    Ok(secret)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
