// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter registry operations and the YAML engine configuration they
//! keep in sync. The engine config is a single file the manager owns
//! exclusively; nothing else is expected to write it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use vault_core::adapter::{at_most_one_active_by_name, Adapter};
use vault_core::ids::AdapterId;
use vault_storage::repo::adapters as repo;

#[derive(Debug, Error)]
pub enum AdapterOpsError {
    #[error("adapter {0} not found")]
    NotFound(String),
    #[error("another adapter is already active under the name {0}")]
    NameConflict(AdapterId),
    #[error("cannot delete an active adapter; deactivate first")]
    DeleteWhileActive,
    #[error("engine config i/o error: {0}")]
    ConfigIo(#[from] std::io::Error),
    #[error("engine config is not valid yaml: {0}")]
    ConfigFormat(#[from] serde_yaml::Error),
    #[error("coordinated restart did not observe a healthy engine: {0}")]
    RestartHealthCheckFailed(String),
    #[error("storage error: {0}")]
    Storage(#[from] vault_storage::StorageError),
}

impl From<AdapterOpsError> for vault_core::error::CoreError {
    fn from(err: AdapterOpsError) -> Self {
        use vault_core::error::CoreError;
        match err {
            AdapterOpsError::NotFound(_) => CoreError::not_found(err.to_string()),
            AdapterOpsError::NameConflict(_) | AdapterOpsError::DeleteWhileActive => CoreError::conflict(err.to_string()),
            AdapterOpsError::ConfigIo(_) | AdapterOpsError::ConfigFormat(_) | AdapterOpsError::Storage(_) => {
                CoreError::internal(err.to_string())
            }
            AdapterOpsError::RestartHealthCheckFailed(_) => {
                CoreError::backend_unavailable(err.to_string(), "check the inference engine process and its health endpoint")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveAdapterEntry {
    pub name: String,
    pub path: String,
    pub base_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    pub active_adapters: Vec<ActiveAdapterEntry>,
    /// Model placement policy, kept opaque here since it is inference-
    /// engine-specific; the adapter manager only ever rewrites
    /// `active_adapters`.
    #[serde(default)]
    pub model_placement: serde_yaml::Value,
}

pub fn load_engine_config(path: &Path) -> Result<EngineConfig, AdapterOpsError> {
    if !path.exists() {
        return Ok(EngineConfig::default());
    }
    let text = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&text)?)
}

pub fn write_engine_config(path: &Path, config: &EngineConfig) -> Result<(), AdapterOpsError> {
    let text = serde_yaml::to_string(config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}

/// Coordinated engine restart: waits for a health probe to succeed before
/// returning, idempotently (calling it when the engine is already healthy
/// just returns immediately).
#[async_trait]
pub trait EngineRestarter: Send + Sync {
    async fn restart_and_wait_healthy(&self) -> Result<(), String>;
}

/// Polls a health probe closure on an interval until it succeeds or the
/// deadline elapses.
pub struct PollingRestarter<F> {
    pub probe: F,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

#[async_trait]
impl<F> EngineRestarter for PollingRestarter<F>
where
    F: Fn() -> bool + Send + Sync,
{
    async fn restart_and_wait_healthy(&self) -> Result<(), String> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            if (self.probe)() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err("engine health probe did not succeed before the coordinated-restart timeout".to_string());
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

pub struct AdapterManager<R: EngineRestarter> {
    pool: SqlitePool,
    engine_config_path: PathBuf,
    restarter: R,
}

impl<R: EngineRestarter> AdapterManager<R> {
    pub fn new(pool: SqlitePool, engine_config_path: PathBuf, restarter: R) -> Self {
        Self {
            pool,
            engine_config_path,
            restarter,
        }
    }

    /// Activates `adapter_id`: no-op if already active, otherwise rewrites
    /// the engine config's `active_adapters` entry for this name, triggers
    /// a coordinated restart, then flips the row to `active`.
    pub async fn activate(&self, adapter_id: &AdapterId) -> Result<Adapter, AdapterOpsError> {
        let mut adapter = repo::get(&self.pool, adapter_id)
            .await?
            .ok_or_else(|| AdapterOpsError::NotFound(adapter_id.to_string()))?;
        if adapter.is_active() {
            return Ok(adapter);
        }

        let siblings = repo::by_name(&self.pool, &adapter.name).await?;
        at_most_one_active_by_name(&siblings, adapter_id).map_err(AdapterOpsError::NameConflict)?;

        let mut config = load_engine_config(&self.engine_config_path)?;
        config.active_adapters.retain(|entry| entry.name != adapter.name);
        config.active_adapters.push(ActiveAdapterEntry {
            name: adapter.name.clone(),
            path: adapter.path.clone(),
            base_model: adapter.base_model.clone(),
        });
        write_engine_config(&self.engine_config_path, &config)?;

        self.restarter
            .restart_and_wait_healthy()
            .await
            .map_err(AdapterOpsError::RestartHealthCheckFailed)?;

        adapter.activate(Utc::now());
        repo::update_activation(&self.pool, &adapter).await?;
        Ok(adapter)
    }

    /// Deactivates `adapter_id`: removes its engine-config entry, triggers
    /// a coordinated restart, then flips the row back to `ready`.
    pub async fn deactivate(&self, adapter_id: &AdapterId) -> Result<Adapter, AdapterOpsError> {
        let mut adapter = repo::get(&self.pool, adapter_id)
            .await?
            .ok_or_else(|| AdapterOpsError::NotFound(adapter_id.to_string()))?;
        if !adapter.is_active() {
            return Ok(adapter);
        }

        let mut config = load_engine_config(&self.engine_config_path)?;
        config.active_adapters.retain(|entry| entry.name != adapter.name);
        write_engine_config(&self.engine_config_path, &config)?;

        self.restarter
            .restart_and_wait_healthy()
            .await
            .map_err(AdapterOpsError::RestartHealthCheckFailed)?;

        adapter.deactivate();
        repo::update_activation(&self.pool, &adapter).await?;
        Ok(adapter)
    }

    /// Deletes an adapter's on-disk artifact tree and row. Refuses while
    /// `active` — callers must deactivate first.
    pub async fn delete(&self, adapter_id: &AdapterId) -> Result<(), AdapterOpsError> {
        let adapter = repo::get(&self.pool, adapter_id)
            .await?
            .ok_or_else(|| AdapterOpsError::NotFound(adapter_id.to_string()))?;
        if adapter.is_active() {
            return Err(AdapterOpsError::DeleteWhileActive);
        }
        let _ = std::fs::remove_dir_all(&adapter.path);
        repo::delete(&self.pool, adapter_id).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "adapters_tests.rs"]
mod tests;
